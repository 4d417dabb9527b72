//! CSV report writer

use crate::counter::CountResult;
use std::io::{self, Write};

const HEADER: &str = "file_path,file_name,status,frame_count,duration_secs,file_size,audio_start,vbr_tag,declared_frames,skipped_bytes,error";

pub fn write<W: Write>(writer: &mut W, results: &[CountResult]) -> io::Result<()> {
    writeln!(writer, "{}", HEADER)?;

    for r in results {
        writeln!(
            writer,
            "{},{},{},{},{:.3},{},{},{},{},{},{}",
            escape(&r.file_path),
            escape(&r.file_name),
            r.status,
            r.frame_count,
            r.duration_secs,
            r.file_size,
            r.audio_start,
            r.vbr_tag.map(|t| format!("{:?}", t)).unwrap_or_default(),
            r.declared_frames.map(|n| n.to_string()).unwrap_or_default(),
            r.skipped_bytes,
            escape(r.error.as_deref().unwrap_or("")),
        )?;
    }

    Ok(())
}

/// Quote a field if it holds a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
