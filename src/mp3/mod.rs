//! MPEG-1 Layer III stream parsing
//!
//! An MP3 file as this crate sees it:
//!
//! ```text
//! [ID3v2 tag (optional)]
//! [Xing/Info frame (optional, VBR/CBR metadata, not audio)]
//! [audio frame #0]
//! [audio frame #1]
//! ...
//! ```
//!
//! - [`id3`]: where the audio data begins
//! - [`frame`]: 4-byte frame header decoding and frame sizing
//! - [`xing`]: detection of the leading Xing/Info metadata frame
//! - [`scan`]: the forward scan that walks frames and counts them

pub mod frame;
pub mod id3;
pub mod scan;
pub mod xing;

pub use frame::{ChannelMode, FrameHeader};
pub use scan::{count_frames, scan, Frames, ScanSummary, ScannedFrame};
pub use xing::{is_xing_frame, VbrTag, XingHeader};

/// Read a big-endian u32 at `pos`, or `None` if fewer than 4 bytes remain.
pub(crate) fn read_u32_be(data: &[u8], pos: usize) -> Option<u32> {
    let end = pos.checked_add(4)?;
    let bytes: [u8; 4] = data.get(pos..end)?.try_into().ok()?;
    Some(u32::from_be_bytes(bytes))
}
