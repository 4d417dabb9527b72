//! Xing/Info header detection
//!
//! VBR encoders write a metadata frame at the start of the stream. It has a
//! valid frame header but carries no audio: right after the side information
//! sits the tag "Xing" (VBR) or "Info" (CBR), followed by a flags word and
//! the optional fields it announces.
//!
//! ```text
//! [header 4][side info 17|32]["Xing"|"Info"][flags 4][frames 4?][bytes 4?]...
//! ```

use super::frame::ChannelMode;
use super::read_u32_be;
use serde::Serialize;

const FLAG_FRAMES: u32 = 0x01;
const FLAG_BYTES: u32 = 0x02;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VbrTag {
    /// Variable bitrate stream
    Xing,
    /// Constant bitrate stream written by a VBR-aware encoder
    Info,
}

/// Information read from a Xing/Info metadata frame
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XingHeader {
    pub tag: VbrTag,
    /// Frame count the encoder recorded, when the frames flag is set
    pub total_frames: Option<u32>,
    /// Stream byte count the encoder recorded, when the bytes flag is set
    pub total_bytes: Option<u32>,
}

/// Position of the Xing/Info tag for a frame starting at `frame_offset`
pub fn tag_offset(frame_offset: usize, channel_mode: ChannelMode) -> usize {
    frame_offset
        .saturating_add(4)
        .saturating_add(channel_mode.side_info_size())
}

impl XingHeader {
    /// Read the Xing/Info header of the frame at `frame_offset`.
    ///
    /// `None` when the tag is absent or the buffer ends before it.
    pub fn parse(data: &[u8], frame_offset: usize, channel_mode: ChannelMode) -> Option<Self> {
        let pos = tag_offset(frame_offset, channel_mode);
        let tag = match data.get(pos..pos.checked_add(4)?)? {
            b"Xing" => VbrTag::Xing,
            b"Info" => VbrTag::Info,
            _ => return None,
        };

        let mut header = XingHeader {
            tag,
            total_frames: None,
            total_bytes: None,
        };

        // Fields are only trusted when the buffer actually holds them
        let Some(flags) = read_u32_be(data, pos + 4) else {
            return Some(header);
        };
        let mut field = pos + 8;

        if flags & FLAG_FRAMES != 0 {
            header.total_frames = read_u32_be(data, field);
            field += 4;
        }

        if flags & FLAG_BYTES != 0 {
            header.total_bytes = read_u32_be(data, field);
        }

        Some(header)
    }
}

/// Whether the frame at `frame_offset` is a Xing/Info metadata frame
pub fn is_xing_frame(data: &[u8], frame_offset: usize, channel_mode: ChannelMode) -> bool {
    XingHeader::parse(data, frame_offset, channel_mode).is_some()
}
