//! Classify command - one local image through the configured model

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use crate::config::AppConfig;
use crate::domain::classify_upload;
use crate::infrastructure::{logging, model::load_classifier};

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    /// Image file to classify
    pub image: PathBuf,

    /// Model directory (overrides `model.path`)
    #[arg(long)]
    pub model_path: Option<String>,
}

/// Prints `{"predicted_class": n}` on stdout
pub async fn run(args: ClassifyArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load().context("invalid configuration")?;
    if let Some(path) = args.model_path {
        config.model.path = path;
    }
    logging::init_logging(&config.logging);

    let bytes = tokio::fs::read(&args.image)
        .await
        .with_context(|| format!("cannot read {}", args.image.display()))?;

    let prediction = tokio::task::spawn_blocking(move || {
        let classifier = load_classifier(&config.model)?;
        classify_upload(&classifier, &bytes)
    })
    .await??;

    println!("{}", serde_json::to_string(&prediction)?);

    Ok(())
}
