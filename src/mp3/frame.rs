//! MP3 frame header parsing
//!
//! MP3 frames start with a sync word (11 bits of 1s) followed by header info.
//! Frame header structure (4 bytes, read as one big-endian u32):
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//!
//! A = sync (11 bits)
//! B = MPEG version (2 bits): 00=2.5, 01=reserved, 10=2, 11=1
//! C = Layer (2 bits): 00=reserved, 01=III, 10=II, 11=I
//! D = Protection bit (CRC, ignored here)
//! E = Bitrate index (4 bits)
//! F = Sample rate index (2 bits)
//! G = Padding bit
//! H = Private bit
//! I = Channel mode (2 bits)
//! J = Mode extension (2 bits)
//! K = Copyright
//! L = Original
//! M = Emphasis (2 bits)
//!
//! Only MPEG-1 Layer III is accepted. Every other version/layer, the free
//! and bad bitrate indices and the reserved sample rate all mean "no frame
//! at this offset".

use super::read_u32_be;

/// Length of a frame header in bytes
pub const HEADER_LEN: usize = 4;

/// PCM samples carried by one MPEG-1 Layer III frame
pub const SAMPLES_PER_FRAME: u32 = 1152;

const SYNC_MASK: u32 = 0xFFE0_0000;
const VERSION_MPEG1: u32 = 0b11;
const LAYER_III: u32 = 0b01;

// Bitrate lookup table (kbps)
// Index 0 = free, 15 = bad
const BITRATES_V1_L3: [u32; 16] = [0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0];

// Sample rate lookup table (Hz), index 3 reserved
const SAMPLE_RATES_V1: [u32; 4] = [44100, 48000, 32000, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelMode {
    Stereo,
    JointStereo,
    DualChannel,
    Mono,
}

impl ChannelMode {
    fn from_bits(bits: u32) -> Self {
        match bits & 0x03 {
            0 => ChannelMode::Stereo,
            1 => ChannelMode::JointStereo,
            2 => ChannelMode::DualChannel,
            _ => ChannelMode::Mono,
        }
    }

    /// The 2-bit code as stored in the header (3 = mono)
    pub fn code(self) -> u8 {
        match self {
            ChannelMode::Stereo => 0,
            ChannelMode::JointStereo => 1,
            ChannelMode::DualChannel => 2,
            ChannelMode::Mono => 3,
        }
    }

    /// Size of the Layer III side information that follows the header
    pub fn side_info_size(self) -> usize {
        match self {
            ChannelMode::Mono => 17,
            _ => 32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Bitrate in kbps
    pub bitrate: u32,
    /// Sample rate in Hz
    pub sample_rate: u32,
    pub padding: bool,
    pub channel_mode: ChannelMode,
    /// Whole frame length in bytes, header included
    pub frame_size: u32,
}

impl FrameHeader {
    /// Parse the header starting at `offset` in `data`.
    ///
    /// Returns `None` when fewer than 4 bytes remain or the bytes are not an
    /// MPEG-1 Layer III header.
    pub fn at(data: &[u8], offset: usize) -> Option<Self> {
        read_u32_be(data, offset).and_then(Self::from_u32)
    }

    /// Parse a 4-byte MP3 frame header
    pub fn parse(header: [u8; 4]) -> Option<Self> {
        Self::from_u32(u32::from_be_bytes(header))
    }

    fn from_u32(header: u32) -> Option<Self> {
        if header & SYNC_MASK != SYNC_MASK {
            return None;
        }

        if (header >> 19) & 0x03 != VERSION_MPEG1 {
            return None;
        }

        if (header >> 17) & 0x03 != LAYER_III {
            return None;
        }

        let bitrate = BITRATES_V1_L3[((header >> 12) & 0x0F) as usize];
        if bitrate == 0 {
            return None;
        }

        let sample_rate = SAMPLE_RATES_V1[((header >> 10) & 0x03) as usize];
        if sample_rate == 0 {
            return None;
        }

        let padding = (header >> 9) & 0x01 != 0;
        let channel_mode = ChannelMode::from_bits(header >> 6);

        // 144 * bits per second / sample rate, truncated, plus one padding slot
        let frame_size = 144 * bitrate * 1000 / sample_rate + u32::from(padding);

        Some(FrameHeader {
            bitrate,
            sample_rate,
            padding,
            channel_mode,
            frame_size,
        })
    }

    /// Playback time of this frame in seconds
    pub fn duration_secs(&self) -> f64 {
        SAMPLES_PER_FRAME as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==========================================================================
    // HEADER LAYOUT
    // ==========================================================================
    //
    //   0xFF 0xFB 0x90 0x00
    //   11111111 11111011 10010000 00000000
    //   sync=all ones, version=11 (MPEG-1), layer=01 (III), protection=1
    //   bitrate index=1001 (128 kbps), sample rate index=00 (44100 Hz)
    //   padding=0, channel mode=00 (stereo)
    //
    // 144 * 128000 / 44100 = 417.95..., truncated to 417 bytes.
    // ==========================================================================

    #[test]
    fn test_parse_128k_44100() {
        let header = FrameHeader::parse([0xFF, 0xFB, 0x90, 0x00]).expect("valid header");
        assert_eq!(header.bitrate, 128);
        assert_eq!(header.sample_rate, 44100);
        assert!(!header.padding);
        assert_eq!(header.channel_mode, ChannelMode::Stereo);
        assert_eq!(header.frame_size, 417);
    }

    #[test]
    fn test_padding_adds_one_byte() {
        let header = FrameHeader::parse([0xFF, 0xFB, 0x92, 0x00]).expect("valid header");
        assert!(header.padding);
        assert_eq!(header.frame_size, 418);
    }

    #[test]
    fn test_frame_size_per_sample_rate() {
        // 48 kHz: 144 * 128000 / 48000 = 384 exactly
        let h48 = FrameHeader::parse([0xFF, 0xFB, 0x94, 0x00]).unwrap();
        assert_eq!(h48.sample_rate, 48000);
        assert_eq!(h48.frame_size, 384);

        // 32 kHz: 144 * 128000 / 32000 = 576 exactly
        let h32 = FrameHeader::parse([0xFF, 0xFB, 0x98, 0x00]).unwrap();
        assert_eq!(h32.sample_rate, 32000);
        assert_eq!(h32.frame_size, 576);
    }

    #[test]
    fn test_frame_size_extremes() {
        // Largest frame: 320 kbps at 32 kHz, padded
        let largest = FrameHeader::parse([0xFF, 0xFB, 0xEA, 0x00]).unwrap();
        assert_eq!(largest.bitrate, 320);
        assert_eq!(largest.frame_size, 1441);

        // Smallest frame: 32 kbps at 48 kHz
        let smallest = FrameHeader::parse([0xFF, 0xFB, 0x14, 0x00]).unwrap();
        assert_eq!(smallest.bitrate, 32);
        assert_eq!(smallest.frame_size, 96);
    }

    #[test]
    fn test_every_bitrate_index() {
        let expected = [32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320];
        for (i, kbps) in expected.iter().enumerate() {
            let index = (i as u8 + 1) << 4;
            let header = FrameHeader::parse([0xFF, 0xFB, index, 0x00])
                .unwrap_or_else(|| panic!("index {} should be valid", i + 1));
            assert_eq!(header.bitrate, *kbps);
            assert!(header.frame_size > 0);
        }
    }

    #[test]
    fn test_rejects_free_and_bad_bitrate() {
        assert!(FrameHeader::parse([0xFF, 0xFB, 0x00, 0x00]).is_none(), "free format");
        assert!(FrameHeader::parse([0xFF, 0xFB, 0xF0, 0x00]).is_none(), "bad index");
    }

    #[test]
    fn test_rejects_reserved_sample_rate() {
        assert!(FrameHeader::parse([0xFF, 0xFB, 0x9C, 0x00]).is_none());
    }

    #[test]
    fn test_rejects_broken_sync() {
        assert!(FrameHeader::parse([0xFE, 0xFB, 0x90, 0x00]).is_none());
        // last sync bit cleared
        assert!(FrameHeader::parse([0xFF, 0xDB, 0x90, 0x00]).is_none());
        assert!(FrameHeader::parse([0x00, 0x00, 0x00, 0x00]).is_none());
    }

    #[test]
    fn test_rejects_other_versions_and_layers() {
        // MPEG-2 Layer III
        assert!(FrameHeader::parse([0xFF, 0xF3, 0x90, 0x00]).is_none());
        // MPEG-2.5 Layer III
        assert!(FrameHeader::parse([0xFF, 0xE3, 0x90, 0x00]).is_none());
        // MPEG-1 Layer II
        assert!(FrameHeader::parse([0xFF, 0xFD, 0x90, 0x00]).is_none());
        // MPEG-1 Layer I
        assert!(FrameHeader::parse([0xFF, 0xFF, 0x90, 0x00]).is_none());
        // Reserved layer
        assert!(FrameHeader::parse([0xFF, 0xF9, 0x90, 0x00]).is_none());
    }

    #[test]
    fn test_protection_bit_is_ignored() {
        // 0xFA: protected by CRC, still a valid header
        let header = FrameHeader::parse([0xFF, 0xFA, 0x90, 0x00]).unwrap();
        assert_eq!(header.frame_size, 417);
    }

    #[test]
    fn test_channel_modes() {
        let modes = [
            (0x00, ChannelMode::Stereo, 32),
            (0x40, ChannelMode::JointStereo, 32),
            (0x80, ChannelMode::DualChannel, 32),
            (0xC0, ChannelMode::Mono, 17),
        ];
        for (byte, mode, side_info) in modes {
            let header = FrameHeader::parse([0xFF, 0xFB, 0x90, byte]).unwrap();
            assert_eq!(header.channel_mode, mode);
            assert_eq!(mode.side_info_size(), side_info);
            assert_eq!(mode.code(), byte >> 6);
        }
    }

    #[test]
    fn test_at_checks_bounds() {
        let data = [0x00, 0xFF, 0xFB, 0x90, 0x00];
        assert!(FrameHeader::at(&data, 1).is_some());
        assert!(FrameHeader::at(&data, 2).is_none(), "only 3 bytes left");
        assert!(FrameHeader::at(&data, 5).is_none(), "at the end");
        assert!(FrameHeader::at(&data, usize::MAX).is_none(), "past the end");
        assert!(FrameHeader::at(&[], 0).is_none());
    }

    #[test]
    fn test_duration() {
        let header = FrameHeader::parse([0xFF, 0xFB, 0x94, 0x00]).unwrap();
        // 1152 samples at 48 kHz = 24 ms
        assert!((header.duration_secs() - 0.024).abs() < 1e-9);
    }
}
