use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConsensusError, Result};

/// Columns every frequency table must carry
pub const REQUIRED_COLUMNS: [&str; 3] = ["residue_1", "residue_2", "contact_frequency"];

/// One contact row from one simulation run
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyRecord {
    pub residue_1: String,
    pub residue_2: String,
    pub residue_1_label: Option<String>,
    pub residue_2_label: Option<String>,
    pub contact_frequency: f64,
}

impl FrequencyRecord {
    pub fn new(residue_1: &str, residue_2: &str, contact_frequency: f64) -> Self {
        Self {
            residue_1: residue_1.to_string(),
            residue_2: residue_2.to_string(),
            residue_1_label: None,
            residue_2_label: None,
            contact_frequency,
        }
    }

    pub fn with_labels(mut self, residue_1_label: &str, residue_2_label: &str) -> Self {
        self.residue_1_label = Some(residue_1_label.to_string());
        self.residue_2_label = Some(residue_2_label.to_string());
        self
    }
}

/// All records of one run, in file order
#[derive(Debug, Clone)]
pub struct FrequencyTable {
    pub source: String,
    pub records: Vec<FrequencyRecord>,
}

impl FrequencyTable {
    pub fn new(source: impl Into<String>, records: Vec<FrequencyRecord>) -> Self {
        Self {
            source: source.into(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Row layout of a labeled frequency TSV
#[derive(Debug, Deserialize, Serialize)]
struct FrequencyRow {
    #[serde(default)]
    residue_1_bw: Option<String>,
    #[serde(default)]
    residue_2_bw: Option<String>,
    residue_1: String,
    residue_2: String,
    contact_frequency: f64,
}

/// Source of frequency tables
pub trait TableLoader {
    /// Load every record of the table at `path`.
    ///
    /// Fails with `MalformedInput` when a required column is missing or a
    /// value does not parse.
    fn load(&self, path: &Path) -> Result<FrequencyTable>;
}

/// Loader for tab-separated tables with a header row
#[derive(Debug, Default, Clone, Copy)]
pub struct TsvTableLoader;

impl TableLoader for TsvTableLoader {
    fn load(&self, path: &Path) -> Result<FrequencyTable> {
        let source = path.display().to_string();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| ConsensusError::csv(&source, e))?;

        let headers = reader
            .headers()
            .map_err(|e| ConsensusError::csv(&source, e))?
            .clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(ConsensusError::malformed(
                    &source,
                    format!("missing required column '{}'", column),
                ));
            }
        }

        let mut records = Vec::new();
        for (idx, result) in reader.deserialize::<FrequencyRow>().enumerate() {
            // header is line 1
            let line = idx + 2;
            let row = result.map_err(|e| {
                ConsensusError::malformed(&source, format!("line {}: {}", line, e))
            })?;
            records.push(validate_row(row, &source, line)?);
        }

        log::debug!("Loaded {} records from {}", records.len(), source);
        Ok(FrequencyTable::new(source, records))
    }
}

fn validate_row(row: FrequencyRow, source: &str, line: usize) -> Result<FrequencyRecord> {
    if row.residue_1.is_empty() || row.residue_2.is_empty() {
        return Err(ConsensusError::malformed(
            source,
            format!("line {}: empty residue identifier", line),
        ));
    }
    let freq = row.contact_frequency;
    if !freq.is_finite() || !(0.0..=1.0).contains(&freq) {
        return Err(ConsensusError::malformed(
            source,
            format!("line {}: contact_frequency {} is not in [0, 1]", line, freq),
        ));
    }

    Ok(FrequencyRecord {
        residue_1: row.residue_1,
        residue_2: row.residue_2,
        residue_1_label: row.residue_1_bw.filter(|s| !s.is_empty()),
        residue_2_label: row.residue_2_bw.filter(|s| !s.is_empty()),
        contact_frequency: freq,
    })
}

/// Save a labeled frequency table in the merge input layout
pub fn save_frequency_table(table: &FrequencyTable, output_path: &Path) -> Result<()> {
    let target = output_path.display().to_string();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output_path)
        .map_err(|e| ConsensusError::csv(&target, e))?;

    for record in &table.records {
        writer
            .serialize(FrequencyRow {
                residue_1_bw: record.residue_1_label.clone(),
                residue_2_bw: record.residue_2_label.clone(),
                residue_1: record.residue_1.clone(),
                residue_2: record.residue_2.clone(),
                contact_frequency: record.contact_frequency,
            })
            .map_err(|e| ConsensusError::csv(&target, e))?;
    }

    // a run with no remaining contacts must still load as a table
    if table.records.is_empty() {
        writer
            .write_record([
                "residue_1_bw",
                "residue_2_bw",
                "residue_1",
                "residue_2",
                "contact_frequency",
            ])
            .map_err(|e| ConsensusError::csv(&target, e))?;
    }

    writer
        .flush()
        .map_err(|e| ConsensusError::io(output_path, e))?;

    Ok(())
}
