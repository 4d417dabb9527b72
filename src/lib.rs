//! mp3frames - Count audio frames in MPEG-1 Layer III files
//!
//! An MP3 file is a sequence of self-delimiting frames, each announced by a
//! 4-byte header. Counting them means walking the stream from the first
//! audio byte, sizing each frame from its header and hopping to the next.
//!
//! # What gets counted
//!
//! - Only MPEG-1 Layer III frames (MPEG-2/2.5 and Layers I/II are not
//!   recognized and are stepped over like junk).
//! - A leading ID3v2 tag is skipped.
//! - A leading Xing/Info frame is metadata, not audio, and is excluded.
//! - Junk between frames is skipped one byte at a time until the next header.
//!
//! # Quick Start
//!
//! ```no_run
//! let data = std::fs::read("song.mp3").unwrap();
//! println!("{} frames", mp3frames::count_frames(&data));
//!
//! let summary = mp3frames::scan(&data);
//! println!("audio starts at byte {}", summary.audio_start);
//! if let Some(vbr) = summary.vbr_header {
//!     println!("{:?} header declares {:?} frames", vbr.tag, vbr.total_frames);
//! }
//! ```
//!
//! # Modules
//!
//! - [`mp3`]: ID3 skipping, header decoding, Xing detection, the frame scan
//! - [`counter`]: per-file counting for the CLI
//! - [`report`]: Output formatters (JSON, CSV)
//! - [`upload`] and [`serve`]: the HTTP upload service

pub mod config;
pub mod counter;
pub mod error;
pub mod mp3;
pub mod report;
pub mod serve;
pub mod upload;

pub use config::ServeConfig;
pub use counter::{count_file, CountResult, Status};
pub use error::UploadError;
pub use mp3::{count_frames, scan, Frames, ScanSummary};
