//! Frame counting for files on disk
//!
//! Wraps the in-memory scanner for the CLI: reads a file, scans it, and
//! records the outcome in a serializable [`CountResult`]. Read failures are
//! captured in the result so one bad file never aborts a batch.

use crate::mp3::{self, VbrTag};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// At least one audio frame found
    Ok,
    /// Readable, but not an MPEG-1 Layer III stream
    NoFrames,
    /// Could not be read
    Error,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::NoFrames => write!(f, "NO FRAMES"),
            Status::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CountResult {
    pub file_path: String,
    pub file_name: String,
    pub file_size: u64,
    pub frame_count: usize,
    pub audio_start: usize,
    pub vbr_tag: Option<VbrTag>,
    /// Frame total recorded in the Xing/Info header, if any
    pub declared_frames: Option<u32>,
    pub skipped_bytes: usize,
    pub duration_secs: f64,
    pub status: Status,
    pub error: Option<String>,
}

impl CountResult {
    /// Scan an already-loaded file
    pub fn from_bytes(path: &Path, data: &[u8]) -> Self {
        let summary = mp3::scan(data);
        let status = if summary.frame_count > 0 {
            Status::Ok
        } else {
            Status::NoFrames
        };

        Self {
            file_path: path.display().to_string(),
            file_name: file_name(path),
            file_size: data.len() as u64,
            frame_count: summary.frame_count,
            audio_start: summary.audio_start,
            vbr_tag: summary.vbr_header.as_ref().map(|h| h.tag),
            declared_frames: summary.vbr_header.and_then(|h| h.total_frames),
            skipped_bytes: summary.skipped_bytes,
            duration_secs: summary.duration_secs,
            status,
            error: None,
        }
    }

    fn failed(path: &Path, error: String) -> Self {
        Self {
            file_path: path.display().to_string(),
            file_name: file_name(path),
            file_size: 0,
            frame_count: 0,
            audio_start: 0,
            vbr_tag: None,
            declared_frames: None,
            skipped_bytes: 0,
            duration_secs: 0.0,
            status: Status::Error,
            error: Some(error),
        }
    }

    /// True when the Xing header disagrees with what was counted
    pub fn declared_mismatch(&self) -> bool {
        matches!(self.declared_frames, Some(n) if n as usize != self.frame_count)
    }
}

/// Read and scan one file
pub fn count_file<P: AsRef<Path>>(path: P) -> CountResult {
    let path = path.as_ref();
    match std::fs::read(path) {
        Ok(data) => CountResult::from_bytes(path, &data),
        Err(e) => {
            log::warn!("failed to read {}: {}", path.display(), e);
            CountResult::failed(path, e.to_string())
        }
    }
}

/// Whether a path has an `.mp3` extension (any case)
pub fn is_mp3_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

/// Expand inputs into the list of files to count.
///
/// Directories are walked recursively for `.mp3` files; plain files are
/// taken as given, whatever their extension.
pub fn collect_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .into_iter()
                .filter_map(|e| match e {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        log::warn!("skipping entry under {}: {}", input.display(), err);
                        None
                    }
                })
                .filter(|e| e.file_type().is_file() && is_mp3_path(e.path()))
                .map(|e| e.path().to_path_buf())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }

    files
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
