//! Command-line interface for training and serving

use clap::{Parser, Subcommand};
use colored::*;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::model::ModelType;
use crate::pipeline::build_training_dataset;
use crate::training::{Trainer, TrainerConfig};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) -> String {
    format!("{} {}", muted(key), val.white())
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "incentive-recommender")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Incentive program recommendation: training and serving")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train a recommendation model from the three source tables
    Train {
        /// Incentive catalog CSV
        #[arg(long)]
        incentive_data: PathBuf,

        /// Property attributes CSV
        #[arg(long)]
        property_data: PathBuf,

        /// Owner behavior CSV (carries the target labels)
        #[arg(long)]
        behavior_data: PathBuf,

        /// Directory for the model bundle and metrics report
        #[arg(short, long, default_value = "artifacts")]
        output_dir: PathBuf,

        /// Fraction of rows held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Model type (random_forest, decision_tree)
        #[arg(short, long, default_value = "random_forest")]
        model: String,

        /// Random seed for the split and the model
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Serve recommendations from a trained bundle
    Serve {
        /// Host address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Model bundle path (falls back to MODEL_PATH)
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

// ─── Data loading ──────────────────────────────────────────────────────────────

pub fn load_data(path: &Path) -> anyhow::Result<DataFrame> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    if ext != "csv" {
        anyhow::bail!("Unsupported file format: {}", ext);
    }
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()?;
    Ok(df)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_train(
    incentive_data: &Path,
    property_data: &Path,
    behavior_data: &Path,
    output_dir: &Path,
    test_size: f64,
    model: &str,
    seed: u64,
) -> anyhow::Result<()> {
    section("Train");

    let model_type = ModelType::parse(model)
        .ok_or_else(|| anyhow::anyhow!("Invalid model type: {}", model))?;

    step_run("Loading data");
    let start = Instant::now();
    let incentive_df = load_data(incentive_data)?;
    let property_df = load_data(property_data)?;
    let behavior_df = load_data(behavior_data)?;
    step_done(&format!(
        "{} incentive, {} property, {} behavior rows in {:?}",
        incentive_df.height(),
        property_df.height(),
        behavior_df.height(),
        start.elapsed()
    ));

    step_run("Building features");
    let start = Instant::now();
    let dataset = build_training_dataset(&incentive_df, &property_df, &behavior_df)?;
    step_done(&format!(
        "{} rows × {} features in {:?}",
        dataset.training_df.height(),
        dataset.feature_columns.len(),
        start.elapsed()
    ));

    step_run("Training model");
    let start = Instant::now();
    let trainer = Trainer::new(TrainerConfig {
        test_size,
        seed,
        model_type,
        ..TrainerConfig::default()
    });
    let (bundle, metrics) = trainer.train(&dataset)?;
    step_done(&format!("in {:?}", start.elapsed()));

    std::fs::create_dir_all(output_dir)?;
    let bundle_path = output_dir.join("incentive_recommender.json");
    bundle.save(&bundle_path)?;
    let metrics_path = output_dir.join("metrics.json");
    std::fs::write(&metrics_path, serde_json::to_string_pretty(&metrics)?)?;

    section("Results");
    step_ok(&kv("Accuracy  ", &format!("{:.4}", metrics.accuracy)));
    step_ok(&kv("Train rows", &metrics.train_rows.to_string()));
    step_ok(&kv("Test rows ", &metrics.test_rows.to_string()));
    step_ok(&kv("Classes   ", &bundle.classes.join(", ")));
    step_ok(&kv("Bundle    ", &bundle_path.display().to_string()));
    step_ok(&kv("Metrics   ", &metrics_path.display().to_string()));
    println!();

    Ok(())
}

pub async fn cmd_serve(host: &str, port: u16, model: Option<&Path>) -> anyhow::Result<()> {
    use crate::server::{run_server, ServerConfig};

    section("Serve");
    step_ok(&kv("API      ", &format!("http://{}:{}/api", host, port)));
    step_ok(&kv("Health   ", &format!("http://{}:{}/api/health", host, port)));
    step_ok(&kv("Recommend", &format!("http://{}:{}/api/recommend", host, port)));
    println!();
    println!("  {}", dim("ctrl+c to stop"));
    println!();

    let mut config = ServerConfig {
        host: host.to_string(),
        port,
        ..Default::default()
    };
    if let Some(path) = model {
        config.model_path = path.to_path_buf();
    }

    run_server(config).await
}
