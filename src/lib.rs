pub mod config;
pub mod consensus;
pub mod contacts;
pub mod error;
pub mod identity;
pub mod labels;
pub mod merge;
pub mod residue;
pub mod translate;

#[cfg(feature = "python")]
pub mod python_bindings;

// Re-export commonly used types and traits
pub use config::{LabelConfig, MergeConfig};
pub use consensus::{build_consensus, merge_frequency_files, save_consensus_to_tsv, ConsensusRow};
pub use contacts::{FrequencyRecord, FrequencyTable, TableLoader, TsvTableLoader};
pub use error::{ConsensusError, Result};
pub use identity::{canonicalize, IdentityKey};
pub use labels::{generate_label_table, load_label_map, save_label_table, LabelEntry, LabelMap};
pub use merge::{merge, reconcile, MergedRow, MergedTable, ReconciledRow};
pub use translate::{label_contacts, load_raw_contacts, ResidueTranslator};
