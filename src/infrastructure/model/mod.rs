//! Pretrained model loading
//!
//! A model directory holds `preprocessor_config.json`, an optional `config.json`
//! and the ONNX graph (either at the top level or under `onnx/`).

mod metadata;
mod onnx;
mod preprocessor;

use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

pub use metadata::{ModelMetadata, MODEL_CONFIG_FILE};
pub use onnx::OnnxImageClassifier;
pub use preprocessor::{
    ChannelValues, ImagePreprocessor, PixelValues, PreprocessorConfig, SizeSpec,
    PREPROCESSOR_CONFIG_FILE,
};

use crate::config::ModelConfig;
use crate::domain::DomainError;

/// Find the ONNX graph inside a model directory
pub fn resolve_onnx_path(dir: &Path, onnx_file: &str) -> Result<PathBuf, DomainError> {
    if !dir.is_dir() {
        return Err(DomainError::model_load(format!(
            "model directory {} does not exist",
            dir.display()
        )));
    }

    [dir.join(onnx_file), dir.join("onnx").join(onnx_file)]
        .into_iter()
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            DomainError::model_load(format!(
                "no {} found in {} or its onnx/ subdirectory",
                onnx_file,
                dir.display()
            ))
        })
}

/// Load the classifier once at startup
pub fn load_classifier(config: &ModelConfig) -> Result<OnnxImageClassifier, DomainError> {
    let start = Instant::now();
    let dir = Path::new(&config.path);
    info!(path = %dir.display(), "Loading image classification model");

    let onnx_path = resolve_onnx_path(dir, &config.onnx_file)?;
    let preprocessor = ImagePreprocessor::from_dir(dir)?;
    let metadata = ModelMetadata::from_dir(dir)?;

    let classifier = OnnxImageClassifier::load(&onnx_path, preprocessor, metadata)?;

    info!(
        onnx = %onnx_path.display(),
        architecture = classifier.metadata().architecture().unwrap_or("unknown"),
        num_labels = ?classifier.metadata().label_count(),
        input_size = ?classifier.input_size(),
        load_time_ms = start.elapsed().as_millis() as u64,
        "Model loaded"
    );

    Ok(classifier)
}
