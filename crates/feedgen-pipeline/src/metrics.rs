//! Per-destination run metrics and their JSON document.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Outcome of generating one destination's feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationMetrics {
    pub destination: String,
    pub data_source: String,
    pub generated_at: DateTime<Utc>,
    /// Products read from the source, including filtered ones.
    pub total_products: u64,
    pub total_items: u64,
    /// Unreadable records, vanished products and variants that failed to map.
    pub skipped_records: u64,
    pub file_size_bytes: u64,
    pub duration_seconds: f64,
    pub feed_filename: String,
    pub success: bool,
    pub error: Option<String>,
}

/// `feed_metrics.json`: metrics keyed by destination name.
pub type MetricsDocument = BTreeMap<String, DestinationMetrics>;

/// Reads the metrics document. A missing file is `Ok(None)`.
///
/// # Errors
///
/// Returns [`PipelineError::Metrics`] on I/O failure and
/// [`PipelineError::MetricsEncode`] if the file is not a metrics document.
pub fn read_metrics(path: &Path) -> Result<Option<MetricsDocument>, PipelineError> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(metrics_io(path, e)),
    };
    Ok(Some(serde_json::from_slice(&bytes)?))
}

/// Writes `doc` through a temporary file and a rename.
///
/// # Errors
///
/// Returns [`PipelineError::Metrics`] if the file cannot be written.
pub fn write_metrics(path: &Path, doc: &MetricsDocument) -> Result<(), PipelineError> {
    let json = serde_json::to_vec_pretty(doc)?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut temp = tempfile::Builder::new()
        .prefix(".metrics.")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| metrics_io(path, e))?;
    temp.write_all(&json).map_err(|e| metrics_io(path, e))?;
    temp.as_file().sync_all().map_err(|e| metrics_io(path, e))?;
    temp.persist(path).map_err(|e| metrics_io(path, e.error))?;
    Ok(())
}

/// Merges `updates` into the existing document at `path` and writes it back.
///
/// Destinations that did not run this time keep their previous entry. An
/// unreadable previous document is replaced.
///
/// # Errors
///
/// Returns [`PipelineError::Metrics`] if the file cannot be written.
pub fn merge_metrics(
    path: &Path,
    updates: impl IntoIterator<Item = DestinationMetrics>,
) -> Result<MetricsDocument, PipelineError> {
    let mut doc = match read_metrics(path) {
        Ok(doc) => doc.unwrap_or_default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "discarding unreadable metrics file");
            MetricsDocument::new()
        }
    };
    for m in updates {
        doc.insert(m.destination.clone(), m);
    }
    write_metrics(path, &doc)?;
    Ok(doc)
}

fn metrics_io(path: &Path, source: std::io::Error) -> PipelineError {
    PipelineError::Metrics {
        path: path.display().to_string(),
        source,
    }
}
