//! Classification head metadata from the model's `config.json`

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::DomainError;

pub const MODEL_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelMetadata {
    #[serde(default)]
    pub architectures: Vec<String>,
    #[serde(default)]
    pub num_labels: Option<usize>,
    #[serde(default)]
    pub id2label: BTreeMap<String, String>,
}

impl ModelMetadata {
    /// Read `config.json`; a missing file yields empty metadata
    pub fn from_dir(dir: &Path) -> Result<Self, DomainError> {
        let path = dir.join(MODEL_CONFIG_FILE);

        if !path.exists() {
            tracing::warn!(path = %path.display(), "Model config not found, label count unknown");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| {
            DomainError::model_load(format!("cannot read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents)
            .map_err(|e| DomainError::model_load(format!("invalid {}: {}", path.display(), e)))
    }

    /// Explicit `num_labels`, otherwise the size of `id2label`
    pub fn label_count(&self) -> Option<usize> {
        self.num_labels
            .or_else(|| (!self.id2label.is_empty()).then_some(self.id2label.len()))
    }

    pub fn architecture(&self) -> Option<&str> {
        self.architectures.first().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_count_from_id2label() {
        let metadata: ModelMetadata = serde_json::from_str(
            r#"{
                "architectures": ["ViTForImageClassification"],
                "model_type": "vit",
                "id2label": { "0": "NORMAL", "1": "PNEUMONIA" },
                "label2id": { "NORMAL": 0, "PNEUMONIA": 1 },
                "hidden_size": 768
            }"#,
        )
        .unwrap();

        assert_eq!(metadata.label_count(), Some(2));
        assert_eq!(metadata.architecture(), Some("ViTForImageClassification"));
    }

    #[test]
    fn test_explicit_num_labels_wins() {
        let metadata: ModelMetadata =
            serde_json::from_str(r#"{ "num_labels": 1000, "id2label": { "0": "tench" } }"#)
                .unwrap();

        assert_eq!(metadata.label_count(), Some(1000));
    }

    #[test]
    fn test_unknown_label_count() {
        assert_eq!(ModelMetadata::default().label_count(), None);
        assert_eq!(ModelMetadata::default().architecture(), None);
    }
}
