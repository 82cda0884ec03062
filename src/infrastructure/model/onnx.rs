//! ONNX image classifier backed by tract

use std::path::Path;

use image::RgbImage;
use tract_onnx::prelude::*;

use super::metadata::ModelMetadata;
use super::preprocessor::ImagePreprocessor;
use crate::domain::{DomainError, ImageClassifier};

type OnnxPlan = TypedRunnableModel<TypedModel>;

/// Pretrained classifier: preprocessing, optimized graph and label metadata
///
/// The plan is immutable after loading, so one instance serves every request.
pub struct OnnxImageClassifier {
    preprocessor: ImagePreprocessor,
    metadata: ModelMetadata,
    plan: OnnxPlan,
}

impl std::fmt::Debug for OnnxImageClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxImageClassifier")
            .field("preprocessor", &self.preprocessor)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl OnnxImageClassifier {
    /// Load and optimize the ONNX graph at `onnx_path`
    pub fn load(
        onnx_path: &Path,
        preprocessor: ImagePreprocessor,
        metadata: ModelMetadata,
    ) -> Result<Self, DomainError> {
        let plan = build_plan(onnx_path, preprocessor.output_size()).map_err(|e| {
            DomainError::model_load(format!("cannot load {}: {:#}", onnx_path.display(), e))
        })?;

        Ok(Self {
            preprocessor,
            metadata,
            plan,
        })
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn input_size(&self) -> Option<(usize, usize)> {
        self.preprocessor.output_size()
    }

    fn forward(&self, image: &RgbImage) -> TractResult<Vec<f32>> {
        let pixels = self.preprocessor.preprocess(image);
        let input: Tensor =
            tract_ndarray::Array4::from_shape_vec(pixels.shape(), pixels.data)?.into();

        let outputs = self.plan.run(tvec!(input.into()))?;
        let logits = outputs
            .first()
            .ok_or_else(|| anyhow::anyhow!("model has no outputs"))?
            .to_array_view::<f32>()?
            .iter()
            .copied()
            .collect();

        Ok(logits)
    }
}

impl ImageClassifier for OnnxImageClassifier {
    fn logits(&self, image: &RgbImage) -> Result<Vec<f32>, DomainError> {
        self.forward(image)
            .map_err(|e| DomainError::inference(format!("{:#}", e)))
    }

    fn num_labels(&self) -> Option<usize> {
        self.metadata.label_count()
    }
}

fn build_plan(onnx_path: &Path, input_size: Option<(usize, usize)>) -> TractResult<OnnxPlan> {
    let mut model = tract_onnx::onnx().model_for_path(onnx_path)?;

    if let Some((height, width)) = input_size {
        model = model.with_input_fact(0, f32::fact([1, 3, height, width]).into())?;
    }

    let model = model.into_optimized()?;

    // Variable-size tensors cannot feed a graph with a fixed input
    if input_size.is_none() {
        if let Some(shape) = model.input_fact(0)?.shape.as_concrete() {
            anyhow::bail!(
                "graph input is fixed at {:?} but preprocessing yields variable sizes; \
                 set crop_size or crop_pct in the preprocessor config",
                shape
            );
        }
    }

    model.into_runnable()
}
