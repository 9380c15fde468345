//! Artifact I/O: reading the OCR artifact, canonical serialization and
//! atomic writing of the grouping artifact.
//!
//! Canonical form: object keys in lexical order, two-space indent, one
//! trailing newline, pixel coordinates as integers. `serde_json` is built
//! without `preserve_order`, so converting through [`serde_json::Value`]
//! sorts every object's keys.

use crate::artifact::grouping::GroupingArtifact;
use crate::artifact::ocr::OcrArtifact;
use crate::error::{GroupingError, Result};
use std::io::Write;
use std::path::Path;

/// Read and parse the Stage 1 OCR artifact.
///
/// # Errors
///
/// - `InputMissing` when the file cannot be read
/// - `InputMalformed` when it is not valid JSON for the contract
pub fn read_ocr_artifact(path: &Path) -> Result<OcrArtifact> {
    let bytes = std::fs::read(path).map_err(|e| GroupingError::InputMissing {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| {
        GroupingError::input_malformed(format!(
            "OCR artifact {} does not match the contract: {}",
            path.display(),
            e
        ))
    })
}

/// Serialize the grouping artifact into its canonical byte form.
pub fn to_canonical_json(artifact: &GroupingArtifact) -> Result<String> {
    let value = serde_json::to_value(artifact).map_err(|e| {
        GroupingError::invariant("canonical_serialization", e.to_string())
    })?;
    let mut out = serde_json::to_string_pretty(&value).map_err(|e| {
        GroupingError::invariant("canonical_serialization", e.to_string())
    })?;
    out.push('\n');
    Ok(out)
}

/// Write the grouping artifact atomically.
///
/// The payload goes to a temporary sibling first and is renamed into place,
/// so a failure at any point leaves nothing under the final path.
pub fn write_grouping_artifact(artifact: &GroupingArtifact, out_path: &Path) -> Result<()> {
    let payload = to_canonical_json(artifact)?;

    let unwritable = |message: String| GroupingError::OutputUnwritable {
        path: out_path.display().to_string(),
        message,
    };

    let parent = match out_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| unwritable(e.to_string()))?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(|e| unwritable(e.to_string()))?;
    tmp.write_all(payload.as_bytes())
        .map_err(|e| unwritable(e.to_string()))?;
    tmp.persist(out_path)
        .map_err(|e| unwritable(e.error.to_string()))?;
    Ok(())
}
