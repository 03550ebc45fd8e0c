mod json;
mod summary;
mod writer;

pub use json::{hash_content, ExcludedEntry, FileReport, ProjectInfo, SelectedEntry};
pub use summary::{render_summary, render_text_report};
pub use writer::{flatten_path, next_export_number, write_export, ExportOptions, ExportResult, SUMMARY_FILE};
