//! Frame scanning and counting
//!
//! The scan walks a single forward-moving cursor over the buffer:
//!
//! 1. Start just past the ID3v2 tag (or at byte 0).
//! 2. While at least 4 bytes remain, try to decode a header at the cursor.
//!    - Valid header: jump ahead by its frame size. The first decoded frame
//!      is dropped if it is a Xing/Info metadata frame; every other one is
//!      an audio frame.
//!    - Anything else: step forward one byte and try again. This is how the
//!      scan resynchronizes after garbage or corruption.
//!
//! A frame whose payload runs past the end of the buffer still counts: its
//! header was valid. The scan never fails; input with no frames yields 0.

use super::frame::{FrameHeader, HEADER_LEN};
use super::id3::audio_start_offset;
use super::xing::XingHeader;
use serde::Serialize;
use std::iter::FusedIterator;

/// An audio frame found by the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScannedFrame {
    /// Byte offset of the frame header
    pub offset: usize,
    pub header: FrameHeader,
}

/// Iterator over the audio frames of an in-memory MP3 file.
///
/// Holds the whole scan state; dropping it mid-way is fine.
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    data: &'a [u8],
    offset: usize,
    is_first_frame: bool,
    vbr_header: Option<XingHeader>,
    skipped_bytes: usize,
}

impl<'a> Frames<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            offset: audio_start_offset(data),
            is_first_frame: true,
            vbr_header: None,
            skipped_bytes: 0,
        }
    }

    /// Current cursor position
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The Xing/Info frame skipped at the start, once the scan has passed it
    pub fn vbr_header(&self) -> Option<&XingHeader> {
        self.vbr_header.as_ref()
    }

    /// Bytes stepped over one at a time while searching for a header
    pub fn skipped_bytes(&self) -> usize {
        self.skipped_bytes
    }
}

impl Iterator for Frames<'_> {
    type Item = ScannedFrame;

    fn next(&mut self) -> Option<ScannedFrame> {
        while self.offset.saturating_add(HEADER_LEN) <= self.data.len() {
            let offset = self.offset;

            let header = match FrameHeader::at(self.data, offset) {
                Some(header) if header.frame_size > 0 => header,
                _ => {
                    self.offset += 1;
                    self.skipped_bytes += 1;
                    continue;
                }
            };

            self.offset += header.frame_size as usize;

            if std::mem::take(&mut self.is_first_frame) {
                if let Some(xing) = XingHeader::parse(self.data, offset, header.channel_mode) {
                    self.vbr_header = Some(xing);
                    continue;
                }
            }

            return Some(ScannedFrame { offset, header });
        }

        None
    }
}

impl FusedIterator for Frames<'_> {}

/// Count the audio frames in a complete MP3 file.
///
/// The ID3v2 tag and a leading Xing/Info frame are not counted. Returns 0
/// for empty, truncated or non-MP3 input.
pub fn count_frames(data: &[u8]) -> usize {
    Frames::new(data).count()
}

/// Everything a full scan learns about a buffer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanSummary {
    pub frame_count: usize,
    /// Where audio data begins (past the ID3v2 tag)
    pub audio_start: usize,
    pub vbr_header: Option<XingHeader>,
    pub skipped_bytes: usize,
    pub duration_secs: f64,
}

/// Scan the whole buffer and summarize it
pub fn scan(data: &[u8]) -> ScanSummary {
    let mut frames = Frames::new(data);
    let mut summary = ScanSummary {
        audio_start: frames.offset(),
        ..ScanSummary::default()
    };

    for frame in frames.by_ref() {
        summary.frame_count += 1;
        summary.duration_secs += frame.header.duration_secs();
    }

    summary.vbr_header = frames.vbr_header;
    summary.skipped_bytes = frames.skipped_bytes;
    summary
}
