//! Structural-position label tables.
//!
//! A label table maps a simulation residue (`A:THR:32`) to a generic,
//! cross-receptor position label (`1x28`) and a display color. Tables are
//! generated from a reference numbering CSV with one column per receptor.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConsensusError, Result};
use crate::residue::three_letter_code;

/// Display color per transmembrane helix number
static HELIX_COLORS: [(u32, &str); 8] = [
    (1, "red"),
    (2, "orange"),
    (3, "yellow"),
    (4, "lightgreen"),
    (5, "green"),
    (6, "blue"),
    (7, "navy"),
    (8, "purple"),
];

const DEFAULT_COLOR: &str = "white";

/// One line of a label table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEntry {
    pub native: String,
    pub label: String,
    pub color: Option<String>,
}

/// Lookup from native residue identifier to structural-position label
#[derive(Debug, Clone, Default)]
pub struct LabelMap {
    labels: HashMap<String, String>,
}

impl LabelMap {
    pub fn from_entries(entries: impl IntoIterator<Item = LabelEntry>) -> Self {
        Self {
            labels: entries.into_iter().map(|e| (e.native, e.label)).collect(),
        }
    }

    pub fn get(&self, native: &str) -> Option<&str> {
        self.labels.get(native).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Load a headerless `native<TAB>label[<TAB>color]` table
pub fn load_label_map(path: &Path) -> Result<LabelMap> {
    let source = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| ConsensusError::csv(&source, e))?;

    let mut entries = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ConsensusError::csv(&source, e))?;
        let (native, label) = match (record.get(0), record.get(1)) {
            (Some(native), Some(label)) if !native.trim().is_empty() => {
                (native.trim(), label.trim())
            }
            _ => {
                return Err(ConsensusError::malformed(
                    &source,
                    format!("line {}: expected native and label columns", idx + 1),
                ))
            }
        };
        entries.push(LabelEntry {
            native: native.to_string(),
            label: label.to_string(),
            color: record.get(2).map(|c| c.trim().to_string()).filter(|c| !c.is_empty()),
        });
    }

    log::debug!("Loaded {} labels from {}", entries.len(), source);
    Ok(LabelMap::from_entries(entries))
}

/// Save label entries as a headerless TSV
pub fn save_label_table(entries: &[LabelEntry], output_path: &Path) -> Result<()> {
    let target = output_path.display().to_string();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(output_path)
        .map_err(|e| ConsensusError::csv(&target, e))?;

    for entry in entries {
        let mut row = vec![entry.native.as_str(), entry.label.as_str()];
        if let Some(color) = &entry.color {
            row.push(color);
        }
        writer
            .write_record(&row)
            .map_err(|e| ConsensusError::csv(&target, e))?;
    }

    writer
        .flush()
        .map_err(|e| ConsensusError::io(output_path, e))?;

    Ok(())
}

/// Color of a generic position label such as `3x50`
pub fn helix_color(label: &str) -> &'static str {
    label
        .split('x')
        .next()
        .and_then(|helix| helix.trim().parse::<u32>().ok())
        .and_then(|helix| HELIX_COLORS.iter().find(|(h, _)| *h == helix))
        .map(|(_, color)| *color)
        .unwrap_or(DEFAULT_COLOR)
}

/// Convert a one-letter residue entry such as `T32` into `(THR, 32 + offset)`
fn parse_reference_residue(
    entry: &str,
    offset: i32,
    source: &str,
) -> Result<(&'static str, i32)> {
    let mut chars = entry.chars();
    let letter = chars
        .next()
        .ok_or_else(|| ConsensusError::malformed(source, "empty residue entry"))?;
    let number = chars.as_str().parse::<i32>().map_err(|e| {
        ConsensusError::malformed(source, format!("invalid residue entry '{}': {}", entry, e))
    })?;
    let shifted = number.checked_add(offset).ok_or_else(|| {
        ConsensusError::malformed(
            source,
            format!("residue number {} with offset {} is out of range", number, offset),
        )
    })?;
    Ok((three_letter_code(letter)?, shifted))
}

/// Build the label table of one receptor from a reference numbering CSV.
///
/// The first column holds generic numbers (only the first whitespace-separated
/// token is kept); the receptor's column holds entries such as `T32`, or `-`
/// where the receptor has no residue at that position.
pub fn generate_label_table(
    reference_path: &Path,
    receptor: &str,
    chain: &str,
    offset: i32,
) -> Result<Vec<LabelEntry>> {
    let source = reference_path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(reference_path)
        .map_err(|e| ConsensusError::csv(&source, e))?;

    let receptor_idx = reader
        .headers()
        .map_err(|e| ConsensusError::csv(&source, e))?
        .iter()
        .position(|h| h == receptor)
        .ok_or_else(|| {
            ConsensusError::malformed(&source, format!("no column for receptor '{}'", receptor))
        })?;

    let mut entries = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| ConsensusError::csv(&source, e))?;
        let residue = record.get(receptor_idx).unwrap_or("").trim();
        if residue.is_empty() || residue == "-" {
            continue;
        }
        let Some(label) = record.get(0).and_then(|g| g.split_whitespace().next()) else {
            continue;
        };

        let (name, number) = parse_reference_residue(residue, offset, &source)?;
        entries.push(LabelEntry {
            native: format!("{}:{}:{}", chain, name, number),
            label: label.to_string(),
            color: Some(helix_color(label).to_string()),
        });
    }

    log::info!("Generated {} labels for {}", entries.len(), receptor);
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "GPCRdb(A),5-HT1A receptor Human,beta-1 adrenoceptor Turkey\n\
        1x28 1.28,T32,-\n\
        1x29 1.29,A33,W40\n\
        3x50 3.50,R134,R139\n\
        12x48,-,L71\n";

    #[test]
    fn test_helix_colors() {
        assert_eq!(helix_color("1x28"), "red");
        assert_eq!(helix_color("6x30"), "blue");
        assert_eq!(helix_color("8x47"), "purple");
        assert_eq!(helix_color("12x48"), "white");
        assert_eq!(helix_color("ICL2"), "white");
    }

    #[test]
    fn test_generate_label_table() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("residue_table.csv");
        std::fs::write(&reference, REFERENCE).unwrap();

        let entries = generate_label_table(&reference, "5-HT1A receptor Human", "A", 0).unwrap();
        assert_eq!(
            entries,
            vec![
                LabelEntry {
                    native: "A:THR:32".to_string(),
                    label: "1x28".to_string(),
                    color: Some("red".to_string()),
                },
                LabelEntry {
                    native: "A:ALA:33".to_string(),
                    label: "1x29".to_string(),
                    color: Some("red".to_string()),
                },
                LabelEntry {
                    native: "A:ARG:134".to_string(),
                    label: "3x50".to_string(),
                    color: Some("yellow".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_generate_applies_offset_and_chain() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("residue_table.csv");
        std::fs::write(&reference, REFERENCE).unwrap();

        let entries =
            generate_label_table(&reference, "beta-1 adrenoceptor Turkey", "B", -32).unwrap();
        let natives: Vec<&str> = entries.iter().map(|e| e.native.as_str()).collect();
        assert_eq!(natives, vec!["B:TRP:8", "B:ARG:107", "B:LEU:39"]);
        assert_eq!(entries[2].color.as_deref(), Some("white"));
    }

    #[test]
    fn test_offset_overflow_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("residue_table.csv");
        std::fs::write(&reference, "GPCRdb(A),receptor\n1x28,T2147483647\n").unwrap();

        let err = generate_label_table(&reference, "receptor", "A", 1).unwrap_err();
        assert!(matches!(err, ConsensusError::MalformedInput { .. }));
    }

    #[test]
    fn test_unknown_receptor_column() {
        let dir = tempfile::tempdir().unwrap();
        let reference = dir.path().join("residue_table.csv");
        std::fs::write(&reference, REFERENCE).unwrap();

        let err = generate_label_table(&reference, "rhodopsin", "A", 0).unwrap_err();
        assert!(matches!(err, ConsensusError::MalformedInput { .. }));
    }

    #[test]
    fn test_label_table_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("labels.tsv");
        let entries = vec![
            LabelEntry {
                native: "A:ARG:134".to_string(),
                label: "3x50".to_string(),
                color: Some("yellow".to_string()),
            },
            LabelEntry {
                native: "A:TRP:6".to_string(),
                label: "W6".to_string(),
                color: None,
            },
        ];

        save_label_table(&entries, &path).unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "A:ARG:134\t3x50\tyellow\nA:TRP:6\tW6\n"
        );

        let map = load_label_map(&path).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("A:ARG:134"), Some("3x50"));
        assert_eq!(map.get("A:TRP:6"), Some("W6"));
        assert_eq!(map.get("A:ALA:4"), None);
    }
}
