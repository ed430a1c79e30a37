//! Label manifests.
//!
//! A label is the base name of its clip: the word `"cat"` is stored as
//! `cat.wav` in the audio directory. Labels arrive either from a tabular
//! manifest (one column of a CSV export) or, for ad-hoc evaluation runs,
//! straight from the `*.wav` files present in a directory.

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Read the `column` values of a CSV manifest, in file order.
///
/// Duplicate labels are kept; the pair sampler weights its negative draws
/// by the multiset it is given.
pub fn load_labels(path: &Path, column: &str) -> Result<Vec<String>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| Error::Manifest(format!("{}: {e}", path.display())))?;

    let idx = reader
        .headers()?
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| {
            Error::Manifest(format!("{}: no column named {column:?}", path.display()))
        })?;

    let mut labels = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(value) = record.get(idx) {
            let value = value.trim();
            if !value.is_empty() {
                labels.push(value.to_string());
            }
        }
    }
    Ok(labels)
}

/// Enumerate the labels of every `*.wav` file in `dir` (file stems), sorted
/// for a stable order across runs.
pub fn labels_from_dir(dir: &Path) -> Result<Vec<String>> {
    let mut labels = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == "wav")
            && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
        {
            labels.push(stem.to_string());
        }
    }
    labels.sort();
    Ok(labels)
}
