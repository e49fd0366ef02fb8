use std::path::Path;

use crate::config::LabelConfig;
use crate::contacts::{FrequencyRecord, FrequencyTable};
use crate::error::{ConsensusError, Result};
use crate::labels::LabelMap;
use crate::residue::{one_letter_code, ResidueId};

/// Turns a raw residue identifier into a structural-position label
pub trait ResidueTranslator {
    /// Label for `raw` (`<chain>:<RES>:<number>`).
    ///
    /// Fails with `UnknownResidue` when the residue name is outside the
    /// recognized vocabulary.
    fn translate(&self, raw: &str) -> Result<String>;
}

impl ResidueTranslator for LabelMap {
    fn translate(&self, raw: &str) -> Result<String> {
        let id = ResidueId::parse(raw)?;
        let normalized = id.normalized()?;

        if let Some(label) = self.get(raw) {
            return Ok(label.to_string());
        }
        if let Some(label) = self.get(&normalized.to_string()) {
            return Ok(label.to_string());
        }

        // residues outside the numbering scheme keep a sequence label
        Ok(format!("{}{}", one_letter_code(&normalized.name)?, normalized.number))
    }
}

/// Read a raw per-run contact file: tab-separated, `#` comments, no header,
/// columns `residue_1`, `residue_2`, `contact_frequency`
pub fn load_raw_contacts(path: &Path) -> Result<FrequencyTable> {
    let source = path.display().to_string();
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| ConsensusError::csv(&source, e))?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| ConsensusError::csv(&source, e))?;
        let row = idx + 1;
        let (residue_1, residue_2, freq) = match (record.get(0), record.get(1), record.get(2)) {
            (Some(r1), Some(r2), Some(f)) => (r1, r2, f),
            _ => {
                return Err(ConsensusError::malformed(
                    &source,
                    format!("record {}: expected residue_1, residue_2, contact_frequency", row),
                ))
            }
        };
        let contact_frequency = freq.parse::<f64>().map_err(|e| {
            ConsensusError::malformed(
                &source,
                format!("record {}: contact_frequency '{}': {}", row, freq, e),
            )
        })?;
        if !contact_frequency.is_finite() {
            return Err(ConsensusError::malformed(
                &source,
                format!("record {}: contact_frequency '{}' is not finite", row, freq),
            ));
        }
        records.push(FrequencyRecord::new(residue_1, residue_2, contact_frequency));
    }

    Ok(FrequencyTable::new(source, records))
}

/// Label the contacts of one run.
///
/// Pairs closer than `min_residue_separation` in sequence are dropped, both
/// residues are translated, and the rows are sorted by descending frequency.
pub fn label_contacts(
    table: FrequencyTable,
    translator: &impl ResidueTranslator,
    config: &LabelConfig,
) -> Result<FrequencyTable> {
    let total = table.len();
    let mut labeled = Vec::with_capacity(total);

    for record in table.records {
        let first = ResidueId::parse(&record.residue_1)?;
        let second = ResidueId::parse(&record.residue_2)?;
        if first.separation(&second) < config.min_residue_separation {
            continue;
        }

        let residue_1_label = translator.translate(&record.residue_1)?;
        let residue_2_label = translator.translate(&record.residue_2)?;
        labeled.push(FrequencyRecord {
            residue_1_label: Some(residue_1_label),
            residue_2_label: Some(residue_2_label),
            ..record
        });
    }

    labeled.sort_by(|a, b| b.contact_frequency.total_cmp(&a.contact_frequency));
    log::info!(
        "{}: kept {} of {} contacts with separation >= {}",
        table.source,
        labeled.len(),
        total,
        config.min_residue_separation
    );

    Ok(FrequencyTable::new(table.source, labeled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MergeConfig;
    use crate::consensus::build_consensus;
    use crate::contacts::{save_frequency_table, TableLoader, TsvTableLoader};
    use crate::labels::{load_label_map, LabelEntry};

    fn label_map() -> LabelMap {
        LabelMap::from_entries(vec![
            LabelEntry {
                native: "A:ARG:131".to_string(),
                label: "3x50".to_string(),
                color: Some("yellow".to_string()),
            },
            LabelEntry {
                native: "A:HIS:269".to_string(),
                label: "6x31".to_string(),
                color: None,
            },
        ])
    }

    #[test]
    fn test_translate_uses_label_map() {
        assert_eq!(label_map().translate("A:ARG:131").unwrap(), "3x50");
    }

    #[test]
    fn test_translate_matches_normalized_name() {
        assert_eq!(label_map().translate("A:HIE:269").unwrap(), "6x31");
    }

    #[test]
    fn test_translate_falls_back_to_sequence_label() {
        assert_eq!(label_map().translate("A:GLH:20").unwrap(), "E20");
        assert_eq!(label_map().translate("A:TRP:6").unwrap(), "W6");
    }

    #[test]
    fn test_translate_unknown_residue() {
        let err = label_map().translate("A:HOH:900").unwrap_err();
        assert!(matches!(err, ConsensusError::UnknownResidue(_)));
    }

    #[test]
    fn test_label_contacts_filters_and_sorts() {
        let table = FrequencyTable::new(
            "run_0",
            vec![
                FrequencyRecord::new("A:ALA:10", "A:GLY:12", 0.99),
                FrequencyRecord::new("A:TRP:6", "A:ARG:131", 0.3),
                FrequencyRecord::new("A:ARG:131", "A:HIE:269", 0.7),
                FrequencyRecord::new("A:SER:20", "A:THR:24", 0.5),
            ],
        );

        let labeled = label_contacts(table, &label_map(), &LabelConfig::default()).unwrap();
        let rows: Vec<(&str, &str, f64)> = labeled
            .records
            .iter()
            .map(|r| {
                (
                    r.residue_1_label.as_deref().unwrap(),
                    r.residue_2_label.as_deref().unwrap(),
                    r.contact_frequency,
                )
            })
            .collect();
        assert_eq!(
            rows,
            vec![("3x50", "6x31", 0.7), ("S20", "T24", 0.5), ("W6", "3x50", 0.3)]
        );
        // raw identifiers are kept as written
        assert_eq!(labeled.records[0].residue_2, "A:HIE:269");
    }

    #[test]
    fn test_label_contacts_with_extreme_residue_numbers() {
        let table = FrequencyTable::new(
            "run_0",
            vec![FrequencyRecord::new("A:ALA:2147483647", "A:GLY:-2147483648", 0.4)],
        );

        let labeled = label_contacts(table, &label_map(), &LabelConfig::default()).unwrap();
        assert_eq!(labeled.len(), 1);
        assert_eq!(labeled.records[0].residue_1_label.as_deref(), Some("A2147483647"));
        assert_eq!(labeled.records[0].residue_2_label.as_deref(), Some("G-2147483648"));
    }

    #[test]
    fn test_labeled_runs_merge_into_consensus() {
        let dir = tempfile::tempdir().unwrap();
        let write = |name: &str, body: &str| {
            let path = dir.path().join(name);
            std::fs::write(&path, body).unwrap();
            path
        };

        // the second receptor numbering places HIS269 one position earlier
        let labels_a = write("labels_a.tsv", "A:ARG:131\t3x50\tyellow\nA:HIS:269\t6x31\tblue\n");
        let labels_b = write("labels_b.tsv", "A:ARG:131\t3x50\tyellow\nA:HIS:269\t6x30\tblue\n");
        let raw_runs = [
            (
                write(
                    "run_0.tsv",
                    "# total_frames:5000\n\
                     A:ARG:131\tA:GLU:268\t0.8\n\
                     A:HIS:269\tA:ARG:131\t0.6\n\
                     A:ALA:10\tA:GLY:12\t0.9\n",
                ),
                &labels_a,
            ),
            (
                write(
                    "run_1.tsv",
                    "A:ARG:131\tA:HIS:269\t0.4\nA:GLU:268\tA:ARG:131\t0.6\n",
                ),
                &labels_b,
            ),
            // nothing survives the separation filter
            (write("run_2.tsv", "A:ALA:10\tA:GLY:12\t0.9\n"), &labels_a),
        ];

        let mut tables = Vec::new();
        for (idx, (raw, labels)) in raw_runs.iter().enumerate() {
            let label_map = load_label_map(labels).unwrap();
            let labeled = label_contacts(
                load_raw_contacts(raw).unwrap(),
                &label_map,
                &LabelConfig::default(),
            )
            .unwrap();
            let saved = dir.path().join(format!("labeled_{}.tsv", idx));
            save_frequency_table(&labeled, &saved).unwrap();
            tables.push(TsvTableLoader.load(&saved).unwrap());
        }
        assert!(tables[2].is_empty());

        let config = MergeConfig {
            cutoff: 0.1,
            sort: true,
        };
        let rows = build_consensus(tables, &config).unwrap();
        assert_eq!(rows.len(), 2);

        let glu = &rows[0];
        assert_eq!(glu.key.to_string(), "['A:ARG:131', 'A:GLU:268']");
        assert_eq!(glu.residue_1, "A:ARG:131");
        assert_eq!(glu.residue_1_label.as_deref(), Some("3x50"));
        assert_eq!(glu.residue_2_label.as_deref(), Some("E268"));
        assert_eq!(glu.frequencies, vec![0.8, 0.6, 0.0]);
        assert!((glu.freq_avg - 1.4 / 3.0).abs() < 1e-9);
        assert!((glu.freq_stdev - (0.52_f64 / 3.0).sqrt()).abs() < 1e-9);

        // the first run's label wins over the disagreeing second run
        let his = &rows[1];
        assert_eq!(his.key.to_string(), "['A:ARG:131', 'A:HIS:269']");
        assert_eq!(his.residue_1, "A:HIS:269");
        assert_eq!(his.residue_1_label.as_deref(), Some("6x31"));
        assert_eq!(his.residue_2_label.as_deref(), Some("3x50"));
        assert_eq!(his.frequencies, vec![0.6, 0.4, 0.0]);
        assert!((his.freq_avg - 1.0 / 3.0).abs() < 1e-9);
        assert!((his.freq_stdev - (0.28_f64 / 3.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_load_raw_contacts_skips_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frequencies.tsv");
        std::fs::write(
            &path,
            "# total_frames:5000\tinteraction_types:wb\n\
             # Columns: residue_1,\tresidue_2\tcontact_frequency\n\
             A:ARG:131\tA:GLU:268\t0.812\n\
             A:ALA:4\tA:TRP:60\t0.05\n",
        )
        .unwrap();

        let table = load_raw_contacts(&path).unwrap();
        assert_eq!(
            table.records,
            vec![
                FrequencyRecord::new("A:ARG:131", "A:GLU:268", 0.812),
                FrequencyRecord::new("A:ALA:4", "A:TRP:60", 0.05),
            ]
        );
    }

    #[test]
    fn test_load_raw_contacts_rejects_bad_frequency() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frequencies.tsv");
        std::fs::write(&path, "A:ARG:131\tA:GLU:268\thigh\n").unwrap();

        let err = load_raw_contacts(&path).unwrap_err();
        assert!(matches!(err, ConsensusError::MalformedInput { .. }));
    }
}
