//! Image classification server
//!
//! Loads a pretrained image-classification model from a local directory once at
//! startup and exposes `POST /predict/`, which maps an uploaded image to the
//! arg-max class index of the model's logits.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use api::state::AppState;
use infrastructure::model::load_classifier;

/// Load the model and build the shared request state.
///
/// Blocks for the duration of the model load; any failure here must abort
/// startup rather than surface per request.
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let classifier = load_classifier(&config.model)?;
    Ok(AppState::new(Arc::new(classifier)))
}
