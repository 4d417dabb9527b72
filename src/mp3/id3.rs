//! ID3v2 tag skipping
//!
//! ID3v2 header: "ID3" (3) + version (2) + flags (1) + size (4) = 10 bytes.
//! The size is a synchsafe integer: each byte carries 7 bits and keeps its
//! high bit clear, so the size field itself can never look like a frame sync.
//! The size excludes the 10-byte header.

/// Length of the ID3v2 header
pub const HEADER_LEN: usize = 10;

/// Size in bytes of the ID3v2 tag body, if the buffer starts with one
pub fn tag_size(data: &[u8]) -> Option<u32> {
    if data.len() < HEADER_LEN || &data[..3] != b"ID3" {
        return None;
    }

    Some(
        ((data[6] as u32 & 0x7F) << 21)
            | ((data[7] as u32 & 0x7F) << 14)
            | ((data[8] as u32 & 0x7F) << 7)
            | (data[9] as u32 & 0x7F),
    )
}

/// Offset at which audio data begins: just past the ID3v2 tag, or 0.
pub fn audio_start_offset(data: &[u8]) -> usize {
    match tag_size(data) {
        Some(size) => HEADER_LEN + size as usize,
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mp3::testutil::{id3_tag, synchsafe};

    #[test]
    fn test_no_tag() {
        assert_eq!(audio_start_offset(&[0xFF, 0xFB, 0x90, 0x00]), 0);
        assert_eq!(audio_start_offset(b"this is not an mp3 file"), 0);
        assert_eq!(audio_start_offset(&[]), 0);
    }

    #[test]
    fn test_undersized_buffer_is_not_a_tag() {
        // "ID3" plus 6 bytes: one short of a full header
        assert_eq!(audio_start_offset(b"ID3\x04\x00\x00\x00\x00\x01"), 0);
        assert_eq!(tag_size(b"ID3"), None);
    }

    #[test]
    fn test_empty_tag() {
        let tag = id3_tag(&[]);
        assert_eq!(tag.len(), 10);
        assert_eq!(audio_start_offset(&tag), 10);
    }

    #[test]
    fn test_tag_with_payload() {
        let mut data = id3_tag(&[0u8; 1000]);
        data.extend_from_slice(&[0xFF, 0xFB, 0x90, 0x00]);
        assert_eq!(tag_size(&data), Some(1000));
        assert_eq!(audio_start_offset(&data), 1010);
        assert_eq!(&data[1010..1012], &[0xFF, 0xFB]);
    }

    #[test]
    fn test_synchsafe_decoding() {
        // 0x00 0x00 0x02 0x01 = (2 << 7) | 1 = 257
        let header = b"ID3\x03\x00\x00\x00\x00\x02\x01";
        assert_eq!(tag_size(header), Some(257));

        // Largest representable size: 28 bits set
        let mut header = b"ID3\x04\x00\x00".to_vec();
        header.extend_from_slice(&synchsafe(0x0FFF_FFFF));
        assert_eq!(header[6..10], [0x7F, 0x7F, 0x7F, 0x7F]);
        assert_eq!(tag_size(&header), Some(0x0FFF_FFFF));
    }

    #[test]
    fn test_high_bits_are_masked() {
        // A non-conforming writer that sets high bits still decodes with the
        // 7-bit mask applied to every byte.
        let header = b"ID3\x04\x00\x00\x80\x80\x81\x81";
        assert_eq!(tag_size(header), Some((1 << 7) | 1));
    }

    #[test]
    fn test_tag_larger_than_buffer() {
        // Declared size runs past the end; the offset is still reported and
        // the scanner simply finds nothing beyond it.
        let mut header = b"ID3\x04\x00\x00".to_vec();
        header.extend_from_slice(&synchsafe(5000));
        assert_eq!(audio_start_offset(&header), 5010);
    }
}
