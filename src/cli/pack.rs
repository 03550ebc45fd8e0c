use anyhow::{Context, Result};
use chrono::Local;
use console::{style, Emoji};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use super::Args;
use crate::config::Config;
use crate::emit::{write_export, ExportOptions, FileReport};
use crate::select::{validate_root, Selector};
use crate::tokens::{create_estimator, TokenizerKind};
use crate::types::Selection;

static PACKING: Emoji<'_, '_> = Emoji("📦 ", "");
static SUCCESS: Emoji<'_, '_> = Emoji("✅ ", "");
static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "");

/// Fold CLI flags into the loaded config. Relative CLI paths stay relative to the working directory.
pub fn apply_overrides(config: &mut Config, args: &Args, cwd: &Path) -> Result<()> {
    if let Some(max_tokens) = args.max_tokens {
        config.settings.max_tokens = max_tokens;
    }
    if let Some(output) = &args.output {
        config.settings.output_dir = cwd.join(output).to_string_lossy().to_string();
    }
    if let Some(tokenizer) = &args.tokenizer {
        config.settings.tokenizer = tokenizer.parse::<TokenizerKind>()?;
    }
    config.validate()?;
    Ok(())
}

pub fn run_pack(args: &Args) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let mut config = Config::load(args.config.as_deref(), &cwd)?;
    apply_overrides(&mut config, args, &cwd)?;

    let root = match args.path.as_deref() {
        Some(path) => cwd.join(path),
        None => config.project_root(None),
    };
    validate_root(&root)?;
    let root = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve {}", root.display()))?;
    let project_name = project_name(&root);

    let kind = config.settings.tokenizer;
    let selector = Selector::new(
        config.ignore_rules(&root)?,
        config.importance_weights()?,
        create_estimator(kind),
        config.token_budget()?,
    )?
    .with_scan_options(config.scan_options())
    .with_structure_reserve(config.settings.reserve_structure_tokens);

    let quiet = args.json;
    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(format!("{}Selecting files in {}...", PACKING, root.display()));
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let selection = selector.select(&root);
    pb.finish_and_clear();
    let selection = selection?;

    let report = FileReport::from_selection(
        &project_name,
        &root.display().to_string(),
        kind.as_str(),
        &selection,
        Local::now(),
    );

    if args.json {
        println!("{}", report.to_json());
    } else {
        print_selection(&selection, args.verbose);
    }

    if selection.is_empty() {
        tracing::warn!(project = %project_name, "no files selected, nothing to export");
        if !quiet {
            println!("\n{}No files were selected; no export written.", WARN);
        }
        return Ok(());
    }

    if args.dry_run {
        if !quiet {
            println!("\n{}Dry run: no export written.", INFO);
        }
        return Ok(());
    }

    let options = ExportOptions {
        output_dir: config.output_dir(),
        generate_structure: config.settings.generate_structure,
    };
    let result = write_export(&report, &selection, &options)?;

    if !quiet {
        println!("\n{}Export complete!\n", SUCCESS);
        println!("  Folder:          {}", style(result.export_dir.display()).cyan());
        println!("  Files written:   {}", style(result.files_written).green());
    }

    Ok(())
}

fn project_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "project".to_string())
}

fn print_selection(selection: &Selection, verbose: bool) {
    let stats = selection.stats();

    println!("\n{}Selection:\n", INFO);
    println!("  Files scanned:   {}", stats.files_scanned);
    println!("  Files selected:  {}", style(stats.files_selected).green());
    println!("  Over budget:     {}", style(stats.files_rejected).yellow());
    println!("  Skipped:         {}", style(stats.files_skipped).dim());
    println!("  Ignored:         {}", style(stats.entries_ignored).dim());
    println!(
        "  Tokens:          {} / {} ({:.1}%)",
        style(stats.tokens_used + stats.reserved_tokens).cyan(),
        stats.token_budget,
        stats.budget_percent()
    );

    let limit = if verbose { usize::MAX } else { 20 };
    if !selection.files.is_empty() {
        println!();
        for candidate in selection.files.iter().take(limit) {
            println!(
                "  {:>4}  {:>7}  {}",
                style(candidate.score).bold(),
                candidate.tokens,
                candidate.relative_path()
            );
        }
        if selection.files.len() > limit {
            println!("  ... and {} more", selection.files.len() - limit);
        }
    }

    if verbose {
        for skipped in &selection.skipped {
            println!(
                "  {} {} ({})",
                style("-").red(),
                skipped.relative_path,
                style(&skipped.reason).dim()
            );
        }
    }
}
