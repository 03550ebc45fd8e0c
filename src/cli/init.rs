use anyhow::{Context, Result};
use console::style;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{default_toml, DEFAULT_CONFIG_FILE};
use crate::rules::{DEFAULT_IGNORE, DEFAULT_IMPORTANT_PATTERNS};

pub fn run_init(force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let written = init_in(&cwd, force)?;

    println!();
    if written.is_empty() {
        println!(
            "  {} Nothing written; use {} to overwrite",
            style("•").dim(),
            style("--force").cyan()
        );
    } else {
        println!(
            "  {} Run {} to pack this directory",
            style("→").cyan(),
            style("ctxpack").cyan().bold()
        );
    }
    Ok(())
}

/// Write the default config files into `dir`, returning the paths actually written.
pub fn init_in(dir: &Path, force: bool) -> Result<Vec<PathBuf>> {
    let config = default_toml();
    let files = [
        (DEFAULT_CONFIG_FILE, config.as_str()),
        (".ignore", DEFAULT_IGNORE),
        ("important_files.txt", DEFAULT_IMPORTANT_PATTERNS),
    ];

    let mut written = Vec::new();
    for (name, content) in files {
        let path = dir.join(name);
        if path.exists() && !force {
            println!("  {} {} already exists", style("-").yellow(), name);
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        println!("  {} {}", style("✓").green(), name);
        written.push(path);
    }
    Ok(written)
}
