mod cli;
mod commands;
mod error;
mod history;
mod pricing;
mod report;
mod seasonal;
mod session;
mod utils;

use anyhow::Context;

/// Main entry point of the application.
///
/// This function orchestrates one dashboard invocation:
/// 1. Parses command-line arguments.
/// 2. Sets up logging on stderr.
/// 3. Loads the seasonal dataset and opens the history log.
/// 4. Runs the requested command against that session.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    init_tracing(args.verbose);

    let seasonal = seasonal::SeasonalData::load_file(&args.data)
        .with_context(|| format!("failed to load seasonal data from {}", args.data.display()))?;
    let history = history::HistoryLog::open(&args.history)
        .with_context(|| format!("failed to open history {}", args.history.display()))?;
    tracing::info!(
        records = seasonal.len(),
        saved = history.len(),
        "dashboard session ready"
    );

    let mut session = session::Session::new(seasonal, history);
    commands::run(args.command, &mut session)
}

/// Logs go to stderr so reports on stdout stay clean. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
