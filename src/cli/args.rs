use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pack the most relevant files of a project into a token-budgeted export for LLM context
#[derive(Parser, Debug)]
#[command(name = "ctxpack")]
#[command(version, about)]
#[command(args_conflicts_with_subcommands = true)]
#[command(after_help = r#"EXAMPLES:
  ctxpack                         Pack the current directory
  ctxpack ../service -m 30000     Pack another project with a smaller budget
  ctxpack --dry-run               Show what would be selected without writing
  ctxpack --dry-run --json        Print the file report as JSON
  ctxpack init                    Write ctxpack.toml, .ignore and important_files.txt

Settings come from ctxpack.toml in the current directory unless --config is given.
CLI flags override file values."#)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project directory to pack (overrides `settings.path`)
    pub path: Option<PathBuf>,

    /// Config file to use instead of ./ctxpack.toml
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Token budget (overrides `settings.max_tokens`)
    #[arg(short = 'm', long, allow_negative_numbers = true)]
    pub max_tokens: Option<i64>,

    /// Output directory for exports (overrides `settings.output_dir`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Token estimator: tiktoken, heuristic or chars
    #[arg(short, long)]
    pub tokenizer: Option<String>,

    /// Report the selection without writing an export
    #[arg(long)]
    pub dry_run: bool,

    /// Print the file report as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write a default ctxpack.toml, .ignore and important_files.txt in the current directory
    Init {
        /// Overwrite files that already exist
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pack_flags() {
        let args = Args::parse_from([
            "ctxpack",
            "proj",
            "--max-tokens",
            "500",
            "--tokenizer",
            "chars",
            "--dry-run",
        ]);
        assert!(args.command.is_none());
        assert_eq!(args.path, Some(PathBuf::from("proj")));
        assert_eq!(args.max_tokens, Some(500));
        assert_eq!(args.tokenizer.as_deref(), Some("chars"));
        assert!(args.dry_run);
        assert!(!args.json);
    }

    #[test]
    fn test_parse_negative_budget() {
        let args = Args::parse_from(["ctxpack", "-m", "-1"]);
        assert_eq!(args.max_tokens, Some(-1));
    }

    #[test]
    fn test_parse_init() {
        let args = Args::parse_from(["ctxpack", "init", "--force"]);
        assert!(matches!(args.command, Some(Command::Init { force: true })));
    }
}
