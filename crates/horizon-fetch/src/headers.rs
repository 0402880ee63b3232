//! Raw header block helpers.
//!
//! When a request is captured with `include_headers`, the body starts with
//! the raw response header block: the status line, one `Name: value` line
//! per header, and a blank line before the payload. The helpers here parse
//! that block back into structured form and answer the redirect query.

use bytes::Bytes;
use http::{HeaderMap, StatusCode, Version};

/// Parsed form of a raw response header block.
///
/// The status line is kept verbatim; every following line up to the first
/// blank line is split on its first colon into a name and a trimmed value.
/// Lines without a colon are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderBlock {
    status_line: String,
    fields: Vec<(String, String)>,
}

impl HeaderBlock {
    /// Parse a raw header block.
    pub fn parse(block: &str) -> Self {
        let mut lines = block.trim_start().lines();
        let status_line = lines.next().unwrap_or_default().trim_end().to_string();
        let mut fields = Vec::new();
        for line in lines {
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            let Some((name, value)) = line.split_once(':') else {
                continue;
            };
            fields.push((name.trim().to_string(), value.trim().to_string()));
        }
        Self { status_line, fields }
    }

    /// The first line of the block, verbatim.
    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    /// The header fields in response order, values trimmed.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Case-insensitive lookup of the first field with the given name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Extract the redirect target from a raw header block.
///
/// Scans for a `Location:` line, matching the name case-insensitively, and
/// returns the trimmed target. Returns the empty string when no such line
/// is present.
pub fn redirect_target(block: &str) -> String {
    for line in block.lines() {
        if let Some((name, value)) = line.split_once(':') {
            if name.trim().eq_ignore_ascii_case("location") {
                return value.trim().to_string();
            }
        }
    }
    String::new()
}

/// Synthesize the raw header block for a captured response and prepend it
/// to the payload, reproducing header-inclusion-in-body capture.
pub(crate) fn prepend_header_block(
    version: Version,
    status: StatusCode,
    headers: &HeaderMap,
    payload: &[u8],
) -> Bytes {
    let mut raw = format!("{version:?} {status}\r\n");
    for (name, value) in headers {
        raw.push_str(name.as_str());
        raw.push_str(": ");
        raw.push_str(&String::from_utf8_lossy(value.as_bytes()));
        raw.push_str("\r\n");
    }
    raw.push_str("\r\n");
    let mut buffer = raw.into_bytes();
    buffer.extend_from_slice(payload);
    Bytes::from(buffer)
}
