use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sqlph::{CheckOptions, LimitCounting, ReadBackBasis};

mod commands;

#[derive(Parser)]
#[command(
    author,
    version = env!("CARGO_PKG_VERSION"),
    about = "Check that database/sql calls bind as many arguments as their SQL has placeholders",
    long_about = None
)]
struct Cli {
    /// Go files, package directories, or `dir/...` patterns
    #[arg(default_value = "./...")]
    targets: Vec<String>,

    /// Skip _test.go files found in directories
    #[arg(long)]
    exclude_tests: bool,

    /// What a Scan's destination count is compared against
    #[arg(long, value_enum, default_value_t = ReadBackBasis::Parameters)]
    scan_basis: ReadBackBasis,

    /// Whether a LIMIT bound needs an argument when present or only per `?`
    #[arg(long, value_enum, default_value_t = LimitCounting::Presence)]
    limit_counting: LimitCounting,

    /// Output diagnostics as JSON
    #[arg(long)]
    json: bool,

    /// Log skipped call sites and progress
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let options = CheckOptions {
        read_back_basis: cli.scan_basis,
        limit_counting: cli.limit_counting,
        include_tests: !cli.exclude_tests,
    };
    commands::check::execute(&cli.targets, &options, cli.json)
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
