use std::fs;
use std::path::Path;

use crate::error::SkipReason;

/// Bytes inspected for NUL when deciding whether a file is binary.
pub const BINARY_SNIFF_LEN: usize = 8000;

/// Read a file as UTF-8 text. The handle is closed before this returns.
pub fn read_text(path: &Path) -> Result<String, SkipReason> {
    let bytes = fs::read(path).map_err(|e| SkipReason::Unreadable(e.to_string()))?;

    let sniff = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if sniff.contains(&0) {
        return Err(SkipReason::Binary);
    }

    String::from_utf8(bytes).map_err(|_| SkipReason::NotUtf8)
}
