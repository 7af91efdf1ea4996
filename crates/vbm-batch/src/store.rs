//! Atomic artifact and grid file persistence.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;
use tempfile::NamedTempFile;
use tracing::info;
use vbm_core::serde::{from_json_slice, to_canonical_json_bytes};
use vbm_core::{AnalysisConfig, ErrorInfo, PanelError};

use crate::record::ResultArtifact;

fn io_error(code: &str, path: &Path, err: impl ToString) -> PanelError {
    PanelError::Io(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Writes `value` as canonical JSON through a sibling temp file that is only
/// renamed into place once fully written. Returns the byte count.
fn write_atomic<T: Serialize>(value: &T, path: &Path) -> Result<u64, PanelError> {
    let bytes = to_canonical_json_bytes(value)?;
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|err| io_error("output-dir", parent, err))?;
    let mut temp =
        NamedTempFile::new_in(parent).map_err(|err| io_error("temp-create", parent, err))?;
    temp.write_all(&bytes)
        .map_err(|err| io_error("temp-write", temp.path(), err))?;
    temp.as_file()
        .sync_all()
        .map_err(|err| io_error("temp-sync", path, err))?;
    temp.persist(path)
        .map_err(|err| io_error("persist", path, err.error))?;
    Ok(bytes.len() as u64)
}

/// Persists the artifact at `path`.
pub fn save_results(artifact: &ResultArtifact, path: &Path) -> Result<u64, PanelError> {
    let written = write_atomic(artifact, path)?;
    info!(
        path = %path.display(),
        analyses = artifact.metadata.total_analyses,
        size_mb = written as f64 / (1024.0 * 1024.0),
        "saved results"
    );
    Ok(written)
}

/// Reads an artifact written by [`save_results`].
pub fn load_results(path: &Path) -> Result<ResultArtifact, PanelError> {
    let bytes = fs::read(path).map_err(|err| io_error("results-read", path, err))?;
    from_json_slice(&bytes)
}

/// Writes a grid file.
pub fn write_grid(grid: &[AnalysisConfig], path: &Path) -> Result<u64, PanelError> {
    write_atomic(&grid, path)
}

/// Decodes a grid file entry by entry.
///
/// The outer JSON array must parse; an entry that does not decode into an
/// [`AnalysisConfig`] becomes a configuration error in its slot.
pub fn decode_configs(bytes: &[u8]) -> Result<Vec<Result<AnalysisConfig, PanelError>>, PanelError> {
    let entries: Vec<Value> = from_json_slice(bytes)?;
    Ok(entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            let id = entry
                .get("id")
                .and_then(Value::as_str)
                .map(str::to_string);
            serde_json::from_value(entry).map_err(|err| {
                let mut info = ErrorInfo::new("grid-entry", err.to_string())
                    .with_context("index", index.to_string());
                if let Some(id) = id {
                    info = info.with_context("id", id);
                }
                PanelError::Config(info)
            })
        })
        .collect())
}

/// Reads and decodes a grid file.
pub fn read_grid(path: &Path) -> Result<Vec<Result<AnalysisConfig, PanelError>>, PanelError> {
    let bytes = fs::read(path).map_err(|err| io_error("grid-read", path, err))?;
    decode_configs(&bytes)
}
