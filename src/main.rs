use clap::Parser;
use console::style;

use ctxpack::cli::{run_init, run_pack, Args, Command};
use ctxpack::logging::init_tracing;

fn main() {
    let args = Args::parse();

    if let Err(e) = init_tracing(args.verbose) {
        eprintln!("{} {}", style("warning:").yellow(), e);
    }

    let result = match &args.command {
        Some(Command::Init { force }) => run_init(*force),
        None => run_pack(&args),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", style("error:").red().bold(), e);
        std::process::exit(1);
    }
}
