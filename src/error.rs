use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, labeling or merging contact frequency tables
#[derive(Debug, Error)]
pub enum ConsensusError {
    /// An input path does not exist. Raised before any table is read.
    #[error("{} does not exist", .path.display())]
    MissingFile { path: PathBuf },

    /// A required column is absent or a value cannot be parsed
    #[error("Malformed input in {source_name}: {message}")]
    MalformedInput { source_name: String, message: String },

    /// A residue name outside the recognized three-letter vocabulary
    #[error("Unknown residue: {0}")]
    UnknownResidue(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
}

impl ConsensusError {
    pub fn malformed(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn csv(source_name: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            source_name: source_name.into(),
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConsensusError>;

/// Fail fast when any of the given paths is missing
pub fn ensure_paths_exist<P: AsRef<std::path::Path>>(paths: &[P]) -> Result<()> {
    for path in paths {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConsensusError::MissingFile {
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_reported_before_anything_else() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("run_0.tsv");
        std::fs::write(&present, "").unwrap();
        let absent = dir.path().join("run_1.tsv");

        let err = ensure_paths_exist(&[present.clone(), absent.clone()]).unwrap_err();
        match err {
            ConsensusError::MissingFile { path } => assert_eq!(path, absent),
            other => panic!("unexpected error: {other}"),
        }
        assert!(ensure_paths_exist(&[present]).is_ok());
    }

    #[test]
    fn test_malformed_message_names_source() {
        let err = ConsensusError::malformed("run_0.tsv", "missing column 'residue_1'");
        assert_eq!(
            err.to_string(),
            "Malformed input in run_0.tsv: missing column 'residue_1'"
        );
    }
}
