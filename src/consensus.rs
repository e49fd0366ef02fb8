use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;

use crate::config::MergeConfig;
use crate::contacts::{FrequencyTable, TableLoader};
use crate::error::{ensure_paths_exist, ConsensusError, Result};
use crate::identity::IdentityKey;
use crate::merge::{merge, reconcile, ReconciledRow};

/// One contact of the consensus table
#[derive(Debug, Clone, PartialEq)]
pub struct ConsensusRow {
    pub key: IdentityKey,
    pub residue_1: String,
    pub residue_2: String,
    pub residue_1_label: Option<String>,
    pub residue_2_label: Option<String>,
    /// One frequency per input table, zero where the table did not observe the contact
    pub frequencies: Vec<f64>,
    pub freq_avg: f64,
    pub freq_stdev: f64,
}

/// Replace unobserved frequencies with zero.
///
/// A contact a run never saw had zero frequency in that run. Invalid
/// frequencies never get here: the loader rejects them.
pub fn fill_missing(frequencies: &[Option<f64>]) -> Vec<f64> {
    frequencies.iter().map(|f| f.unwrap_or(0.0)).collect()
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (N - 1 denominator).
///
/// With fewer than two values the deviation is undefined; this returns 0.0
/// so a single run yields a finite, spread-free consensus.
pub fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let sum_sq: f64 = values.iter().map(|v| (v - avg) * (v - avg)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Zero-fill a reconciled row and compute its summary statistics
pub fn aggregate(row: ReconciledRow) -> ConsensusRow {
    let frequencies = fill_missing(&row.frequencies);
    let freq_avg = mean(&frequencies);
    let freq_stdev = sample_stdev(&frequencies);

    ConsensusRow {
        key: row.key,
        residue_1: row.residue_1,
        residue_2: row.residue_2,
        residue_1_label: row.residue_1_label,
        residue_2_label: row.residue_2_label,
        frequencies,
        freq_avg,
        freq_stdev,
    }
}

/// Keep rows whose mean frequency is strictly above `cutoff`
pub fn apply_cutoff(rows: Vec<ConsensusRow>, cutoff: f64) -> Vec<ConsensusRow> {
    rows.into_iter().filter(|row| row.freq_avg > cutoff).collect()
}

/// Order rows by descending mean frequency, ties by identity
pub fn sort_by_frequency(rows: &mut [ConsensusRow]) {
    rows.sort_by(|a, b| {
        b.freq_avg
            .partial_cmp(&a.freq_avg)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
}

fn check_cutoff(cutoff: f64) -> Result<()> {
    if cutoff.is_finite() {
        Ok(())
    } else {
        Err(ConsensusError::malformed(
            "cutoff",
            format!("cutoff must be a finite number, got {}", cutoff),
        ))
    }
}

/// Merge, reconcile, aggregate and filter already loaded tables
pub fn build_consensus(
    tables: Vec<FrequencyTable>,
    config: &MergeConfig,
) -> Result<Vec<ConsensusRow>> {
    check_cutoff(config.cutoff)?;
    let table_count = tables.len();
    let merged = merge(tables)?;
    log::info!(
        "Merged {} tables into {} distinct contacts",
        table_count,
        merged.rows.len()
    );

    let rows: Vec<ConsensusRow> = merged
        .rows
        .into_iter()
        .map(|row| aggregate(reconcile(row)))
        .collect();
    let total = rows.len();

    let mut kept = apply_cutoff(rows, config.cutoff);
    log::info!(
        "{} of {} contacts have mean frequency above {}",
        kept.len(),
        total,
        config.cutoff
    );

    if config.sort {
        sort_by_frequency(&mut kept);
    }

    Ok(kept)
}

/// Load every table at `paths` and build the consensus table.
///
/// All paths are checked before the first table is read.
pub fn merge_frequency_files(
    loader: &impl TableLoader,
    paths: &[PathBuf],
    config: &MergeConfig,
) -> Result<Vec<ConsensusRow>> {
    check_cutoff(config.cutoff)?;
    ensure_paths_exist(paths)?;

    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} tables",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        pb.set_message(path.display().to_string());
        let table = loader.load(path)?;
        log::debug!("{}: {} contacts", table.source, table.len());
        tables.push(table);
        pb.inc(1);
    }
    pb.finish_and_clear();

    build_consensus(tables, config)
}

#[derive(Serialize)]
struct ConsensusOutputRow<'a> {
    residue_1_bw: &'a str,
    residue_2_bw: &'a str,
    residue_1: &'a str,
    residue_2: &'a str,
    freq_avg: f64,
    freq_stdev: f64,
}

/// Save consensus rows as TSV. Missing labels are written as empty fields.
pub fn save_consensus_to_tsv(rows: &[ConsensusRow], output_path: &Path) -> Result<()> {
    let target = output_path.display().to_string();
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(output_path)
        .map_err(|e| ConsensusError::csv(&target, e))?;

    for row in rows {
        writer
            .serialize(ConsensusOutputRow {
                residue_1_bw: row.residue_1_label.as_deref().unwrap_or(""),
                residue_2_bw: row.residue_2_label.as_deref().unwrap_or(""),
                residue_1: &row.residue_1,
                residue_2: &row.residue_2,
                freq_avg: row.freq_avg,
                freq_stdev: row.freq_stdev,
            })
            .map_err(|e| ConsensusError::csv(&target, e))?;
    }

    // an empty table still gets its header
    if rows.is_empty() {
        writer
            .write_record([
                "residue_1_bw",
                "residue_2_bw",
                "residue_1",
                "residue_2",
                "freq_avg",
                "freq_stdev",
            ])
            .map_err(|e| ConsensusError::csv(&target, e))?;
    }

    writer
        .flush()
        .map_err(|e| ConsensusError::io(output_path, e))?;

    Ok(())
}
