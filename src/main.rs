use std::process::ExitCode;

use anyhow::Context;
use clap::CommandFactory;
use tracing_subscriber::EnvFilter;

use vs_project_survey::{Cli, ConfigManager, Output, SurveyResults, SurveyRunner};

/// A file failed validation
const EXIT_FAILURE: u8 = 1;
/// Bad configuration, nothing was validated
const EXIT_CONFIG: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let results = match run(&cli).await {
        Ok(results) => results,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return ExitCode::from(EXIT_CONFIG);
        }
    };

    match results.first_failure().and_then(|failure| failure.to_error()) {
        None => ExitCode::SUCCESS,
        Some(error) => {
            eprintln!();
            eprintln!("{}", Cli::command().render_help());
            eprintln!("Error: {}", error);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(cli: &Cli) -> anyhow::Result<SurveyResults> {
    let config = ConfigManager::load_config(cli)
        .await
        .context("failed to load configuration")?;
    tracing::debug!(?config, "resolved configuration");

    let mut runner = SurveyRunner::from_config(&config).context("invalid file patterns")?;
    let output = Output::new(&config.output);

    let results = runner
        .run_with_progress(&cli.dirs, |event| output.handle_event(event))
        .await;

    output.print_results(&results);
    Ok(results)
}
