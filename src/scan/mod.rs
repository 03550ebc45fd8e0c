mod filter;
mod walker;

pub use filter::{read_text, BINARY_SNIFF_LEN};
pub use walker::{scan_directory, ScanOptions, ScanResult};
