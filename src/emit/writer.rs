use anyhow::{Context, Result};
use chrono::Local;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use super::json::FileReport;
use super::summary::{render_summary, render_text_report};
use crate::structure::{build_structure, render_tree};
use crate::types::Selection;

pub const SUMMARY_FILE: &str = "_SUMMARY.txt";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub generate_structure: bool,
}

#[derive(Debug, Clone)]
pub struct ExportResult {
    pub export_dir: PathBuf,
    pub files_written: usize,
}

/// Write the selection into a fresh numbered folder under `<output_dir>/<project>/`.
///
/// Everything goes to a hidden staging directory first and is renamed into place
/// once complete, so an interrupted run leaves no half-written export behind.
pub fn write_export(
    report: &FileReport,
    selection: &Selection,
    options: &ExportOptions,
) -> Result<ExportResult> {
    let project_name = report.project.name.as_str();
    let project_dir = options.output_dir.join(project_name);
    fs::create_dir_all(&project_dir)
        .with_context(|| format!("Failed to create {}", project_dir.display()))?;

    let number = next_export_number(&project_dir)?;
    let folder_name = format!(
        "{:03}_{}_{}",
        number,
        project_prefix(project_name),
        report.generated_at.format("%Y%m%d_%H%M%S")
    );
    let export_dir = project_dir.join(&folder_name);
    let staging = project_dir.join(format!(".{}.partial", folder_name));

    fs::create_dir(&staging)
        .with_context(|| format!("Failed to create {}", staging.display()))?;

    match write_contents(&staging, report, selection, options) {
        Ok(files_written) => {
            fs::rename(&staging, &export_dir).with_context(|| {
                format!("Failed to move export into {}", export_dir.display())
            })?;
            tracing::info!(path = %export_dir.display(), files = files_written, "export written");
            Ok(ExportResult {
                export_dir,
                files_written,
            })
        }
        Err(e) => {
            let _ = fs::remove_dir_all(&staging);
            Err(e)
        }
    }
}

fn write_contents(
    dir: &Path,
    report: &FileReport,
    selection: &Selection,
    options: &ExportOptions,
) -> Result<usize> {
    let project_name = report.project.name.as_str();
    let structure_file = format!("{}_structure.json", project_name);
    let report_json = format!("{}_file_report.json", project_name);
    let report_txt = format!("{}_file_report.txt", project_name);

    let mut names = FlatNames::reserving([
        SUMMARY_FILE,
        structure_file.as_str(),
        report_json.as_str(),
        report_txt.as_str(),
    ]);

    let mut written = 0;
    for candidate in &selection.files {
        let name = names.assign(candidate.relative_path());
        write_file(&dir.join(&name), &candidate.content)?;
        written += 1;
    }

    let tree = if options.generate_structure {
        let structure = build_structure(project_name, selection);
        write_file(&dir.join(&structure_file), &structure.to_json())?;
        Some(render_tree(&structure))
    } else {
        None
    };

    write_file(&dir.join(SUMMARY_FILE), &render_summary(report, tree.as_deref()))?;
    write_file(&dir.join(&report_json), &report.to_json())?;
    write_file(&dir.join(&report_txt), &render_text_report(report))?;

    Ok(written)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// One more than the highest `NNN_` prefix among existing export folders.
pub fn next_export_number(project_dir: &Path) -> Result<u32> {
    if !project_dir.exists() {
        return Ok(1);
    }

    let mut highest = 0;
    for entry in fs::read_dir(project_dir)
        .with_context(|| format!("Failed to read {}", project_dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if name.starts_with('.') {
            continue;
        }
        if let Some(number) = name.split('_').next().and_then(|n| n.parse::<u32>().ok()) {
            highest = highest.max(number);
        }
    }

    Ok(highest + 1)
}

fn project_prefix(project_name: &str) -> String {
    project_name.chars().take(5).collect()
}

/// `src/core/scan.py` -> `src_core_scan.py`
pub fn flatten_path(relative_path: &str) -> String {
    relative_path.replace(['/', '\\'], "_")
}

/// Flattened file names, unique within one export folder.
struct FlatNames {
    used: HashSet<String>,
}

impl FlatNames {
    fn reserving<'a, I>(reserved: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            used: reserved.into_iter().map(str::to_string).collect(),
        }
    }

    /// `a/b_c.py` and `a_b/c.py` both flatten to `a_b_c.py`; the second becomes `a_b_c~2.py`.
    fn assign(&mut self, relative_path: &str) -> String {
        let flat = flatten_path(relative_path);
        if self.used.insert(flat.clone()) {
            return flat;
        }

        let (stem, ext) = match flat.rfind('.') {
            Some(idx) if idx > 0 => (&flat[..idx], &flat[idx..]),
            _ => (flat.as_str(), ""),
        };
        let mut n = 2;
        loop {
            let candidate = format!("{}~{}{}", stem, n, ext);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}
