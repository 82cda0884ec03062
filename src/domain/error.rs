use thiserror::Error;

/// Core domain errors
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Model load error: {message}")]
    ModelLoad { message: String },

    #[error("Image decode error: {message}")]
    Decode { message: String },

    #[error("Inference error: {message}")]
    Inference { message: String },
}

impl DomainError {
    pub fn model_load(message: impl Into<String>) -> Self {
        Self::ModelLoad {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_load_error() {
        let error = DomainError::model_load("preprocessor_config.json not found");
        assert_eq!(
            error.to_string(),
            "Model load error: preprocessor_config.json not found"
        );
    }

    #[test]
    fn test_decode_error() {
        let error = DomainError::decode("empty upload");
        assert_eq!(error.to_string(), "Image decode error: empty upload");
    }

    #[test]
    fn test_inference_error() {
        let error = DomainError::inference("model produced no logits");
        assert_eq!(error.to_string(), "Inference error: model produced no logits");
    }
}
