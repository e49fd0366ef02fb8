//! N-way outer join of frequency tables and reconciliation of the per-table
//! observations into one authoritative row per contact.
//!
//! Every merged row carries a slot per input table, indexed by the table's
//! position in the input sequence. Reconciliation walks those slots in order
//! and keeps the first value present, so no column naming convention is
//! involved at any point.

use std::collections::HashMap;

use crate::contacts::{FrequencyRecord, FrequencyTable};
use crate::error::{ConsensusError, Result};
use crate::identity::IdentityKey;

/// What one table recorded for one contact
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub residue_1: String,
    pub residue_2: String,
    pub residue_1_label: Option<String>,
    pub residue_2_label: Option<String>,
    pub contact_frequency: f64,
}

impl From<FrequencyRecord> for Observation {
    fn from(record: FrequencyRecord) -> Self {
        Self {
            residue_1: record.residue_1,
            residue_2: record.residue_2,
            residue_1_label: record.residue_1_label,
            residue_2_label: record.residue_2_label,
            contact_frequency: record.contact_frequency,
        }
    }
}

/// One contact after the join, before reconciliation
#[derive(Debug, Clone)]
pub struct MergedRow {
    pub key: IdentityKey,
    /// `observations[k]` is what table `k` recorded, `None` if it never saw the contact
    pub observations: Vec<Option<Observation>>,
}

/// Result of joining N tables
#[derive(Debug, Clone)]
pub struct MergedTable {
    pub table_count: usize,
    /// Rows in the order their identity was first seen
    pub rows: Vec<MergedRow>,
}

/// Full outer join of `tables` on the orientation-independent identity key.
///
/// Fails with `MalformedInput` when a single table lists the same contact twice.
pub fn merge(tables: Vec<FrequencyTable>) -> Result<MergedTable> {
    let table_count = tables.len();
    let mut rows: Vec<MergedRow> = Vec::new();
    let mut index: HashMap<IdentityKey, usize> = HashMap::new();

    for (ordinal, table) in tables.into_iter().enumerate() {
        let source = table.source;
        for record in table.records {
            let key = IdentityKey::new(&record.residue_1, &record.residue_2);
            let row_idx = *index.entry(key.clone()).or_insert_with(|| {
                rows.push(MergedRow {
                    key: key.clone(),
                    observations: vec![None; table_count],
                });
                rows.len() - 1
            });

            let slot = &mut rows[row_idx].observations[ordinal];
            if slot.is_some() {
                return Err(ConsensusError::malformed(
                    &source,
                    format!("contact {} appears more than once", key),
                ));
            }
            *slot = Some(record.into());
        }
        log::debug!(
            "Merged table {} ({}), {} distinct contacts so far",
            ordinal,
            source,
            rows.len()
        );
    }

    Ok(MergedTable { table_count, rows })
}

/// A merged row with its text fields collapsed to one value each
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledRow {
    pub key: IdentityKey,
    pub residue_1: String,
    pub residue_2: String,
    pub residue_1_label: Option<String>,
    pub residue_2_label: Option<String>,
    /// Per-table frequency, `None` where the table did not observe the contact
    pub frequencies: Vec<Option<f64>>,
}

/// Labels of `obs` as `(label of residue_1, label of residue_2)` in the
/// orientation of the authoritative row
fn aligned_labels<'a>(
    obs: &'a Observation,
    residue_1: &str,
) -> (Option<&'a str>, Option<&'a str>) {
    let labels = (obs.residue_1_label.as_deref(), obs.residue_2_label.as_deref());
    if obs.residue_1 == residue_1 {
        labels
    } else {
        (labels.1, labels.0)
    }
}

/// Collapse the per-table observations of `row`.
///
/// The residues come from the first table that observed the contact. Each
/// label takes the first non-missing value in input order, after the
/// observation is turned to match that orientation. A later label that
/// disagrees with the chosen one is reported with a warning and discarded.
pub fn reconcile(row: MergedRow) -> ReconciledRow {
    let present: Vec<(usize, &Observation)> = row
        .observations
        .iter()
        .enumerate()
        .filter_map(|(ordinal, obs)| obs.as_ref().map(|o| (ordinal, o)))
        .collect();

    // a merged row is only created for an observed contact
    let (residue_1, residue_2) = match present.first() {
        Some((_, obs)) => (obs.residue_1.clone(), obs.residue_2.clone()),
        None => {
            let (lo, hi) = row.key.residues();
            (lo.to_string(), hi.to_string())
        }
    };

    let mut residue_1_label: Option<&str> = None;
    let mut residue_2_label: Option<&str> = None;
    for (ordinal, obs) in &present {
        let (label_1, label_2) = aligned_labels(obs, &residue_1);
        for (kept, label, residue) in [
            (&mut residue_1_label, label_1, &residue_1),
            (&mut residue_2_label, label_2, &residue_2),
        ] {
            match (*kept, label) {
                (None, Some(label)) => *kept = Some(label),
                (Some(existing), Some(label)) if existing != label => log::warn!(
                    "Contact {}: table {} labels {} as '{}', keeping '{}'",
                    row.key,
                    ordinal,
                    residue,
                    label,
                    existing
                ),
                _ => {}
            }
        }
    }

    let frequencies = row
        .observations
        .iter()
        .map(|o| o.as_ref().map(|o| o.contact_frequency))
        .collect();

    ReconciledRow {
        residue_1_label: residue_1_label.map(str::to_string),
        residue_2_label: residue_2_label.map(str::to_string),
        residue_1,
        residue_2,
        frequencies,
        key: row.key,
    }
}
