use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use healthprobe::application::config::AppConfig;
use healthprobe::infrastructure::persistence::csv_log::CsvHealthLog;
use healthprobe::presentation::cli::app::{Cli, Commands};
use healthprobe::presentation::cli::commands::history::run_history;
use healthprobe::presentation::cli::commands::{FATAL_EXIT_STATUS, Outcome};
use healthprobe::presentation::cli::commands::run::run_probe;
use healthprobe::presentation::cli::commands::status::run_status;

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: Cli) -> anyhow::Result<Outcome> {
    let config = if let Some(ref path) = cli.config {
        AppConfig::load_from(path)?
    } else {
        AppConfig::load()?
    };

    match cli.command.unwrap_or_else(Commands::default_run) {
        Commands::Run { threshold, no_send } => {
            let summary = run_probe(&config, threshold, no_send)?;
            Ok(Outcome::from_summary(&summary))
        }
        Commands::Status { json } => {
            run_status(&config, json)?;
            Ok(Outcome::Completed)
        }
        Commands::History { limit, json } => {
            let log = CsvHealthLog::new(config.paths.log_path());
            run_history(&log, limit, json)?;
            Ok(Outcome::Completed)
        }
    }
}

fn main() -> ExitCode {
    // Credentials may come from a .env file or the real environment.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    match execute(cli) {
        Ok(outcome) => {
            if outcome == Outcome::DeliveryFailed {
                eprintln!("error: delivery failed; artifacts were left on disk");
            }
            outcome.exit_code()
        }
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(FATAL_EXIT_STATUS)
        }
    }
}
