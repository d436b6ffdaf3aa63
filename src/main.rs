//! Kapittel CLI entry point.

use anyhow::Result;
use clap::Parser;
use kapittel::cli::{commands, Cli, Commands};
use kapittel::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("kapittel={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    // Load configuration
    let config_path = cli
        .config
        .as_deref()
        .map(Settings::expand_path)
        .unwrap_or_else(Settings::default_config_path);
    let settings = Settings::load_from(Some(&config_path))?;

    // Execute command
    match &cli.command {
        Commands::Summarize {
            url,
            output,
            format,
            save,
        } => {
            commands::run_summarize(url, output.clone(), format, *save, settings).await?;
        }

        Commands::Timestamps { url } => {
            commands::run_timestamps(url, settings).await?;
        }

        Commands::Section { url, section_id } => {
            commands::run_section(url, *section_id, settings).await?;
        }

        Commands::Transcript { url, output } => {
            commands::run_transcript(url, output.clone(), settings).await?;
        }

        Commands::Providers { probe } => {
            commands::run_providers(*probe, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, &config_path)?;
        }
    }

    Ok(())
}
