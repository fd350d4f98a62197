//! Incentive Recommender - Main Entry Point
//!
//! CLI for training incentive recommendation models and serving them
//! over HTTP.

use clap::Parser;
use incentive_recommender::cli::{cmd_serve, cmd_train, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "incentive_recommender=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train {
            incentive_data,
            property_data,
            behavior_data,
            output_dir,
            test_size,
            model,
            seed,
        } => {
            cmd_train(
                &incentive_data,
                &property_data,
                &behavior_data,
                &output_dir,
                test_size,
                &model,
                seed,
            )?;
        }
        Commands::Serve { host, port, model } => {
            cmd_serve(&host, port, model.as_deref()).await?;
        }
    }

    Ok(())
}
