use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;
use weave::{Config, Error, HttpFetcher, RunSummary};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Config file to use instead of weave-config.json in the current or parent directory
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Only run the strings pipeline
    #[arg(long, conflicts_with = "analytics_only")]
    strings_only: bool,

    /// Only run the analytics pipeline
    #[arg(long)]
    analytics_only: bool,

    /// Show debug output (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "info,weave=debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<RunSummary, Error> {
    let mut config = match &args.config {
        Some(path) => Config::read_from(path)?,
        None => Config::discover()?,
    };

    if args.strings_only {
        config.analytics = None;
    }
    if args.analytics_only {
        config.strings = None;
    }

    weave::run(&config, &HttpFetcher::new())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(summary) => {
            for path in summary.strings.iter().chain(summary.analytics.iter()) {
                println!("{}", path.display());
            }
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
