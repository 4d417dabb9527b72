//! Report generation for batch counts
//!
//! - **JSON**: machine-readable, with a summary block and per-file results
//! - **CSV**: spreadsheet-compatible, one row per file
//!
//! # Usage
//!
//! ```ignore
//! use mp3frames::report;
//!
//! // Picks the format from the extension, CSV otherwise
//! report::generate("counts.json", &results)?;
//! report::generate("counts.csv", &results)?;
//! ```

pub mod csv;
pub mod json;

use crate::counter::{CountResult, Status};
use serde::Serialize;
use std::io;
use std::path::Path;

/// Generate a report in the appropriate format based on file extension
pub fn generate<P: AsRef<Path>>(path: P, results: &[CountResult]) -> io::Result<()> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut file = std::fs::File::create(path)?;

    match ext.as_str() {
        "json" => json::write(&mut file, results),
        _ => csv::write(&mut file, results),
    }
}

/// Totals for a batch of results
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub no_frames: usize,
    pub error: usize,
    pub total_frames: usize,
    pub total_duration_secs: f64,
}

impl Summary {
    pub fn from_results(results: &[CountResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Self::default()
        };

        for r in results {
            match r.status {
                Status::Ok => summary.ok += 1,
                Status::NoFrames => summary.no_frames += 1,
                Status::Error => summary.error += 1,
            }
            summary.total_frames += r.frame_count;
            summary.total_duration_secs += r.duration_secs;
        }

        summary
    }
}

#[cfg(test)]
pub(crate) fn test_result(name: &str, status: Status, frame_count: usize) -> CountResult {
    CountResult {
        file_path: format!("/music/{}", name),
        file_name: name.to_string(),
        file_size: (frame_count * 417) as u64,
        frame_count,
        audio_start: 0,
        vbr_tag: None,
        declared_frames: None,
        skipped_bytes: 0,
        duration_secs: frame_count as f64 * 1152.0 / 44100.0,
        status,
        error: match status {
            Status::Error => Some("No such file or directory".to_string()),
            _ => None,
        },
    }
}
