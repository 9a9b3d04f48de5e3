//! Metadata header parsing and writing.
//!
//! A source document may open with a header block of `key: value` lines fenced
//! by `---` lines:
//!
//! ```text
//! ---
//! title: Piranesi
//! date: 2024-03-02
//! rating: 4.5
//! cover:
//! ---
//!
//! ## Thoughts
//! ```
//!
//! Parsing never fails. A document without an opening fence, or whose fence
//! is never closed, is all body with empty metadata. Header lines without a
//! colon are dropped; keys are trimmed and lower-cased; values keep any
//! further colons (`url: https://…` survives intact).
//!
//! Keys are not whitelisted. Whatever the author writes is carried through
//! and written back by [`write`] in the order it was read, so rewriting a
//! cover URL leaves the rest of the header as the author left it.

use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::Path;

/// Header fence line.
pub const DELIMITER: &str = "---";

/// Lower-cased header key → raw value, in header order.
pub type Metadata = IndexMap<String, String>;

/// Split a raw document into its metadata and trimmed body.
pub fn parse(raw: &str) -> (Metadata, String) {
    let Some(rest) = raw.strip_prefix(DELIMITER) else {
        return (Metadata::new(), raw.trim().to_string());
    };

    let Some((header, body)) = split_at_closing_fence(rest) else {
        return (Metadata::new(), raw.trim().to_string());
    };

    let mut meta = Metadata::new();
    for line in header.lines() {
        if let Some((key, value)) = parse_header_line(line) {
            meta.insert(key, value);
        }
    }

    (meta, body.trim().to_string())
}

/// Find the first line after the opening fence that is exactly `---`
/// (ignoring trailing whitespace). Returns `(header, body)`.
fn split_at_closing_fence(rest: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        // The opening fence line itself is never the closing fence.
        if start == 0 {
            continue;
        }
        if line.trim_end() == DELIMITER {
            return Some((&rest[..start], &rest[offset..]));
        }
    }
    None
}

fn parse_header_line(line: &str) -> Option<(String, String)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (key, value) = line.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_lowercase(), value.trim().to_string()))
}

/// Render metadata and body back into document text.
pub fn serialize(meta: &Metadata, body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 64);
    out.push_str(DELIMITER);
    out.push('\n');
    for (key, value) in meta {
        out.push_str(key);
        out.push_str(": ");
        out.push_str(value);
        out.push('\n');
    }
    out.push_str(DELIMITER);
    out.push_str("\n\n");
    out.push_str(body);
    out.push('\n');
    out
}

/// Overwrite `path` with the serialized header and body.
pub fn write(path: &Path, meta: &Metadata, body: &str) -> io::Result<()> {
    fs::write(path, serialize(meta, body))
}
