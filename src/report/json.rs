//! JSON report writer

use super::Summary;
use crate::counter::CountResult;
use serde::Serialize;
use std::io::{self, Write};

#[derive(Serialize)]
struct Report<'a> {
    generated: String,
    summary: Summary,
    files: &'a [CountResult],
}

pub fn write<W: Write>(writer: &mut W, results: &[CountResult]) -> io::Result<()> {
    let report = Report {
        generated: chrono::Local::now().to_rfc3339(),
        summary: Summary::from_results(results),
        files: results,
    };

    serde_json::to_writer_pretty(&mut *writer, &report)?;
    writeln!(writer)
}
