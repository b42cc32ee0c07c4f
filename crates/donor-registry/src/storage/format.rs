//! On-disk format of the donor data file.
//!
//! The file is a single JSON array of donor objects, indented by four spaces.
//! Files saved by some Windows editors start with a UTF-8 byte-order mark,
//! which is stripped before parsing.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::donor::Donor;

/// The UTF-8 byte-order mark as it appears after decoding.
const BYTE_ORDER_MARK: char = '\u{feff}';

/// Indentation used when writing the data file.
const INDENT: &[u8] = b"    ";

/// Suffix of the temporary file written before it replaces the data file.
const TEMP_SUFFIX: &str = "tmp";

/// Suffix of a data file that was moved aside because it could not be decoded.
const BACKUP_SUFFIX: &str = "bak";

/// Remove any leading byte-order marks.
#[must_use]
pub fn strip_bom(content: &str) -> &str {
    content.trim_start_matches(BYTE_ORDER_MARK)
}

/// Parse the contents of a data file.
///
/// # Errors
///
/// Returns an error if the content is not a JSON array of donors.
pub fn decode(content: &str) -> serde_json::Result<Vec<Donor>> {
    serde_json::from_str(strip_bom(content))
}

/// Serialize donors in the data file layout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(donors: &[Donor]) -> serde_json::Result<Vec<u8>> {
    let mut out = Vec::with_capacity(donors.len() * 192);
    let mut ser =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(INDENT));
    donors.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}

/// Write `bytes` to `path` by way of a sibling temporary file.
///
/// A failure part-way through leaves the previous file untouched.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be written or renamed.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let tmp = path.with_extension(match path.extension() {
        Some(ext) => format!("{}.{TEMP_SUFFIX}", ext.to_string_lossy()),
        None => TEMP_SUFFIX.to_string(),
    });

    fs::write(&tmp, bytes)?;
    if let Err(err) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(err);
    }
    Ok(())
}

/// Sibling path an undecodable data file is moved to, e.g.
/// `donors.json.20261018T120000Z.bak`.
#[must_use]
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(
        ".{}.{BACKUP_SUFFIX}",
        Utc::now().format("%Y%m%dT%H%M%SZ")
    ));
    path.with_file_name(name)
}
