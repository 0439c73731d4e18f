mod cli;
mod config;
mod error;
mod orchestrator;
mod pce;
mod report;
mod ui;
mod workload;

use std::io;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use config::PceConfig;
use orchestrator::ReportRunner;
use pce::{FileSource, PceClient, WorkloadSource};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, &rust_log))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "run failed");
            ui::print_failure(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` directives win; without any, INFO (DEBUG with `--verbose`).
fn log_filter(verbose: bool, directives: &str) -> EnvFilter {
    let default_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    EnvFilter::builder()
        .with_default_directive(default_level.into())
        .parse_lossy(directives)
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = PceConfig::load(cli.config_file.as_deref())?;
    cli.apply_overrides(&mut config);

    match &cli.command {
        Command::Config => {
            print_config(&config);
            Ok(())
        }
        Command::Report { file: Some(path) } => {
            report(&FileSource::new(path), &config).await
        }
        Command::Report { file: None } => {
            config.validate()?;
            let client = PceClient::from_config(&config)?;
            report(&client, &config).await
        }
    }
}

async fn report(source: &impl WorkloadSource, config: &PceConfig) -> Result<()> {
    let runner = ReportRunner::new(&config.output);

    let progress = ui::FetchProgress::start(&source.origin());
    let inventory = match runner.collect(source).await {
        Ok(inventory) => {
            progress.finish(&inventory);
            inventory
        }
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };

    let outcome = runner.render(inventory, &mut io::stdout().lock())?;
    ui::print_outcome(&outcome);
    Ok(())
}

fn print_config(config: &PceConfig) {
    println!("server:              {}", config.base_url());
    println!("org:                 {}", config.org);
    println!("api_user:            {}", config.api_user);
    println!("api_key:             {}", config.masked_key());
    println!("output:              {}", config.output.display());
    println!("max_poll_attempts:   {}", config.max_poll_attempts);
    println!("initial_poll_delay:  {}ms", config.initial_poll_delay_ms);
    println!("request_timeout:     {}s", config.request_timeout_secs);
    println!("insecure:            {}", config.insecure);
}
