use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use std::path::{Path, PathBuf};

use crate::config::{LabelConfig, MergeConfig, DEFAULT_CUTOFF, DEFAULT_MIN_RESIDUE_SEPARATION};
use crate::consensus::{merge_frequency_files, save_consensus_to_tsv};
use crate::contacts::{save_frequency_table, TsvTableLoader};
use crate::error::ConsensusError;
use crate::labels::{generate_label_table, load_label_map, save_label_table};
use crate::translate::{label_contacts, load_raw_contacts};

fn to_py_err(context: &str, e: ConsensusError) -> PyErr {
    match e {
        ConsensusError::MissingFile { .. } => {
            PyErr::new::<pyo3::exceptions::PyFileNotFoundError, _>(e.to_string())
        }
        ConsensusError::MalformedInput { .. } | ConsensusError::UnknownResidue(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}: {}", context, e))
        }
        _ => PyErr::new::<pyo3::exceptions::PyIOError, _>(format!("{}: {}", context, e)),
    }
}

/// Python binding for merging frequency tables
#[pyfunction]
#[pyo3(signature = (freq_files, output_tsv=None, cutoff=DEFAULT_CUTOFF, sort=false))]
fn merge_frequencies(
    py: Python<'_>,
    freq_files: Vec<String>,
    output_tsv: Option<&str>,
    cutoff: f64,
    sort: bool,
) -> PyResult<PyObject> {
    let paths: Vec<PathBuf> = freq_files.iter().map(PathBuf::from).collect();
    let config = MergeConfig { cutoff, sort };

    let rows = merge_frequency_files(&TsvTableLoader, &paths, &config)
        .map_err(|e| to_py_err("Failed to merge frequency tables", e))?;

    if let Some(output) = output_tsv {
        save_consensus_to_tsv(&rows, Path::new(output))
            .map_err(|e| to_py_err("Failed to save consensus table", e))?;
    }

    // Convert rows to Python list of dicts
    let py_rows = PyList::empty_bound(py);
    for row in rows {
        let py_dict = PyDict::new_bound(py);
        py_dict.set_item("residue_1_bw", row.residue_1_label)?;
        py_dict.set_item("residue_2_bw", row.residue_2_label)?;
        py_dict.set_item("residue_1", row.residue_1)?;
        py_dict.set_item("residue_2", row.residue_2)?;
        py_dict.set_item("frequencies", row.frequencies)?;
        py_dict.set_item("freq_avg", row.freq_avg)?;
        py_dict.set_item("freq_stdev", row.freq_stdev)?;
        py_rows.append(py_dict)?;
    }

    Ok(py_rows.into())
}

/// Python binding for labeling a raw contact frequency file
#[pyfunction]
#[pyo3(signature = (
    freq_file,
    label_file,
    output_tsv=None,
    min_separation=DEFAULT_MIN_RESIDUE_SEPARATION
))]
fn label_frequencies(
    py: Python<'_>,
    freq_file: &str,
    label_file: &str,
    output_tsv: Option<&str>,
    min_separation: u32,
) -> PyResult<PyObject> {
    let label_map = load_label_map(Path::new(label_file))
        .map_err(|e| to_py_err("Failed to load labels", e))?;
    let config = LabelConfig {
        min_residue_separation: min_separation,
    };

    let table = load_raw_contacts(Path::new(freq_file))
        .and_then(|table| label_contacts(table, &label_map, &config))
        .map_err(|e| to_py_err("Failed to label contacts", e))?;

    if let Some(output) = output_tsv {
        save_frequency_table(&table, Path::new(output))
            .map_err(|e| to_py_err("Failed to save labeled table", e))?;
    }

    let py_rows = PyList::empty_bound(py);
    for record in table.records {
        let py_dict = PyDict::new_bound(py);
        py_dict.set_item("residue_1_bw", record.residue_1_label)?;
        py_dict.set_item("residue_2_bw", record.residue_2_label)?;
        py_dict.set_item("residue_1", record.residue_1)?;
        py_dict.set_item("residue_2", record.residue_2)?;
        py_dict.set_item("contact_frequency", record.contact_frequency)?;
        py_rows.append(py_dict)?;
    }

    Ok(py_rows.into())
}

/// Python binding for generating a receptor label table
#[pyfunction]
#[pyo3(signature = (reference_csv, receptor, output_tsv=None, chain="A", offset=0))]
fn generate_labels(
    py: Python<'_>,
    reference_csv: &str,
    receptor: &str,
    output_tsv: Option<&str>,
    chain: &str,
    offset: i32,
) -> PyResult<PyObject> {
    let entries = generate_label_table(Path::new(reference_csv), receptor, chain, offset)
        .map_err(|e| to_py_err("Failed to generate labels", e))?;

    if let Some(output) = output_tsv {
        save_label_table(&entries, Path::new(output))
            .map_err(|e| to_py_err("Failed to save label table", e))?;
    }

    let py_entries = PyList::empty_bound(py);
    for entry in entries {
        py_entries.append((entry.native, entry.label, entry.color))?;
    }

    Ok(py_entries.into())
}

/// Python module definition
#[pymodule]
fn contact_consensus_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(merge_frequencies, m)?)?;
    m.add_function(wrap_pyfunction!(label_frequencies, m)?)?;
    m.add_function(wrap_pyfunction!(generate_labels, m)?)?;
    m.add("__doc__", "Contact frequency consensus Rust library with Python bindings")?;
    Ok(())
}
