//! multipart/form-data upload handling
//!
//! The upload endpoint takes one file from a browser form or `curl -F`.
//! Checks run in this order, each with its own error:
//!
//! 1. the request is multipart and its framing is intact
//! 2. file parts only appear under the upload field, at most once
//! 3. the file claims to be MP3 (content type or `.mp3` name)
//! 4. the file fits under the size limit
//!
//! Text fields are accepted and ignored.

use crate::config::ServeConfig;
use crate::error::{UploadError, UploadResult};
use std::io::Read;

/// Slack allowed on top of the file limit for multipart framing and text fields
pub const MULTIPART_OVERHEAD: usize = 64 * 1024;

const MP3_MIME_TYPES: [&str; 2] = ["audio/mpeg", "audio/mp3"];

/// One part of a multipart body, borrowing its payload from the body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part<'a> {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub data: &'a [u8],
}

/// The accepted upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

/// Read a request body, refusing anything that cannot hold an acceptable file.
///
/// A declared length over the limit is refused before reading; otherwise at
/// most one byte past the limit is read.
pub fn read_body<R: Read>(
    reader: R,
    declared_len: Option<usize>,
    config: &ServeConfig,
) -> UploadResult<Vec<u8>> {
    let cap = config.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);
    let too_large = || UploadError::TooLarge {
        limit_mb: config.max_upload_mb(),
    };

    if declared_len.is_some_and(|len| len > cap) {
        return Err(too_large());
    }

    let mut body = Vec::with_capacity(declared_len.unwrap_or(0));
    reader.take(cap as u64 + 1).read_to_end(&mut body)?;

    if body.len() > cap {
        return Err(too_large());
    }
    Ok(body)
}

/// Pull the single uploaded file out of a multipart body
pub fn extract_file(
    content_type: Option<&str>,
    body: &[u8],
    config: &ServeConfig,
) -> UploadResult<UploadedFile> {
    // Not a multipart request: there is no file to find
    let Some(boundary) = content_type.and_then(boundary) else {
        return Err(UploadError::NoFile);
    };

    let mut file = None;

    for part in parse_multipart(body, &boundary)? {
        // Browsers send an empty filename for an untouched file input
        let Some(file_name) = part.filename.filter(|f| !f.is_empty()) else {
            continue;
        };

        if part.name.as_deref() != Some(config.upload_field.as_str()) || file.is_some() {
            return Err(UploadError::UnexpectedField);
        }

        if !is_mp3_upload(part.content_type.as_deref(), &file_name) {
            return Err(UploadError::InvalidType);
        }

        if part.data.len() > config.max_upload_bytes {
            return Err(UploadError::TooLarge {
                limit_mb: config.max_upload_mb(),
            });
        }

        file = Some(UploadedFile {
            file_name,
            content_type: part.content_type,
            data: part.data.to_vec(),
        });
    }

    file.ok_or(UploadError::NoFile)
}

/// MP3 by content type (`audio/mpeg`, `audio/mp3`) or by a `.mp3` file name
pub fn is_mp3_upload(content_type: Option<&str>, file_name: &str) -> bool {
    let mime_ok = content_type
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim();
            MP3_MIME_TYPES.iter().any(|m| essence.eq_ignore_ascii_case(m))
        })
        .unwrap_or(false);

    mime_ok || file_name.ends_with(".mp3")
}

/// Boundary of a `multipart/form-data` content type
pub fn boundary(content_type: &str) -> Option<String> {
    let params = split_params(content_type);
    let essence = params.first()?.trim();
    if !essence.eq_ignore_ascii_case("multipart/form-data") {
        return None;
    }

    param(&params[1..], "boundary").filter(|b| !b.is_empty())
}

/// Split a multipart body into parts
pub fn parse_multipart<'a>(body: &'a [u8], boundary: &str) -> UploadResult<Vec<Part<'a>>> {
    let delimiter = format!("--{}", boundary).into_bytes();
    let mut close = b"\r\n".to_vec();
    close.extend_from_slice(&delimiter);

    let start = find_pattern(body, &delimiter)
        .ok_or_else(|| UploadError::Malformed("Multipart: Boundary not found".to_string()))?;
    let mut cursor = start + delimiter.len();
    let mut parts = Vec::new();

    loop {
        let rest = &body[cursor..];
        if rest.starts_with(b"--") {
            return Ok(parts);
        }

        // Optional transport padding, then the line break ending the boundary
        let line_end = find_pattern(rest, b"\r\n").ok_or_else(unexpected_end)?;
        if !rest[..line_end].iter().all(|b| *b == b' ' || *b == b'\t') {
            return Err(UploadError::Malformed("Malformed part boundary".to_string()));
        }
        cursor += line_end + 2;

        let rest = &body[cursor..];
        let (header_block, content_start) = if rest.starts_with(b"\r\n") {
            (&rest[..0], cursor + 2)
        } else {
            let end = find_pattern(rest, b"\r\n\r\n").ok_or_else(unexpected_end)?;
            (&rest[..end], cursor + end + 4)
        };

        let content_len = find_pattern(&body[content_start..], &close).ok_or_else(unexpected_end)?;
        let data = &body[content_start..content_start + content_len];
        parts.push(Part::new(header_block, data));

        cursor = content_start + content_len + close.len();
    }
}

impl<'a> Part<'a> {
    fn new(header_block: &[u8], data: &'a [u8]) -> Self {
        let mut part = Part {
            name: None,
            filename: None,
            content_type: None,
            data,
        };

        let headers = String::from_utf8_lossy(header_block);
        for line in headers.split("\r\n") {
            let Some((field, value)) = line.split_once(':') else {
                continue;
            };
            let field = field.trim();

            if field.eq_ignore_ascii_case("Content-Disposition") {
                let params = split_params(value);
                let params = params.get(1..).unwrap_or(&[]);
                part.name = param(params, "name");
                part.filename = param(params, "filename");
            } else if field.eq_ignore_ascii_case("Content-Type") {
                part.content_type = Some(value.trim().to_string());
            }
        }

        part
    }
}

fn unexpected_end() -> UploadError {
    UploadError::Malformed("Unexpected end of form".to_string())
}

fn find_pattern(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

/// Split a header value on `;`, leaving quoted strings intact
fn split_params(value: &str) -> Vec<String> {
    let mut params = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escaped = false;

    for c in value.chars() {
        match c {
            _ if escaped => {
                current.push(c);
                escaped = false;
            }
            '\\' if in_quotes => {
                current.push(c);
                escaped = true;
            }
            '"' => {
                current.push(c);
                in_quotes = !in_quotes;
            }
            ';' if !in_quotes => params.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    params.push(current);

    params
}

/// Value of `key=value` among header parameters, unquoted
fn param(params: &[String], key: &str) -> Option<String> {
    params.iter().find_map(|p| {
        let (k, v) = p.split_once('=')?;
        if !k.trim().eq_ignore_ascii_case(key) {
            return None;
        }
        Some(unquote(v.trim()))
    })
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Build a multipart body: `(field, filename, content type, data)` per part
#[cfg(test)]
pub(crate) fn multipart_body(
    boundary: &str,
    parts: &[(&str, Option<&str>, Option<&str>, &[u8])],
) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content_type, data) in parts {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        match filename {
            Some(f) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    name, f
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", name).as_bytes(),
            ),
        }
        if let Some(ct) = content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}
