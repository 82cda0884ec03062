//! Image classification domain types

use image::RgbImage;
use serde::{Deserialize, Serialize};

#[cfg(test)]
use mockall::automock;

use super::error::DomainError;
use super::image::decode_rgb;

/// Classification result returned to callers
///
/// Serializes to exactly `{"predicted_class": <index>}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prediction {
    pub predicted_class: usize,
}

impl Prediction {
    pub fn new(predicted_class: usize) -> Self {
        Self { predicted_class }
    }
}

/// A loaded, read-only image classifier
///
/// Implementations run blocking inference and must be shareable across
/// request handlers without locking.
#[cfg_attr(test, automock)]
pub trait ImageClassifier: Send + Sync {
    /// Produce the logit vector for one RGB image
    fn logits(&self, image: &RgbImage) -> Result<Vec<f32>, DomainError>;

    /// Number of classes the model was configured with, if known
    fn num_labels(&self) -> Option<usize>;
}

/// Index of the largest value; ties go to the lowest index
///
/// NaN entries are skipped, unlike `torch.argmax` which reports the first NaN
/// as the maximum. An all-NaN vector yields `None` and fails the request.
pub fn argmax(values: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;

    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }

        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((index, value)),
        }
    }

    best.map(|(index, _)| index)
}

/// Run one image through the classifier and pick the top class
pub fn classify(
    classifier: &dyn ImageClassifier,
    image: &RgbImage,
) -> Result<Prediction, DomainError> {
    let logits = classifier.logits(image)?;

    if let Some(expected) = classifier.num_labels() {
        if logits.len() != expected {
            return Err(DomainError::inference(format!(
                "model produced {} logits but is configured with {} labels",
                logits.len(),
                expected
            )));
        }
    }

    argmax(&logits)
        .map(Prediction::new)
        .ok_or_else(|| DomainError::inference("model produced no usable logits"))
}

/// Decode upload bytes and classify them
pub fn classify_upload(
    classifier: &dyn ImageClassifier,
    bytes: &[u8],
) -> Result<Prediction, DomainError> {
    let image = decode_rgb(bytes)?;
    classify(classifier, &image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::image::fixtures::solid_rgb_png;

    #[test]
    fn test_argmax_picks_largest() {
        assert_eq!(argmax(&[0.1, 2.5, -1.0, 0.3]), Some(1));
    }

    #[test]
    fn test_argmax_ties_go_to_lowest_index() {
        assert_eq!(argmax(&[1.0, 3.0, 3.0, 3.0]), Some(1));
    }

    #[test]
    fn test_argmax_ignores_nan() {
        assert_eq!(argmax(&[f32::NAN, -4.0, f32::NAN, -2.0]), Some(3));
        assert_eq!(argmax(&[f32::NAN]), None);
    }

    #[test]
    fn test_argmax_all_negative() {
        assert_eq!(argmax(&[-3.0, -1.5, -9.0]), Some(1));
    }

    #[test]
    fn test_argmax_empty() {
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_prediction_serialization() {
        let json = serde_json::to_value(Prediction::new(7)).unwrap();
        assert_eq!(json, serde_json::json!({ "predicted_class": 7 }));
    }

    #[test]
    fn test_classify_upload() {
        let mut classifier = MockImageClassifier::new();
        classifier
            .expect_logits()
            .returning(|_| Ok(vec![0.0, 0.2, 5.0, 1.0]));
        classifier.expect_num_labels().return_const(Some(4usize));

        let prediction = classify_upload(&classifier, &solid_rgb_png(8, 8, [1, 2, 3])).unwrap();
        assert_eq!(prediction, Prediction::new(2));
    }

    #[test]
    fn test_classify_upload_rejects_non_image() {
        let mut classifier = MockImageClassifier::new();
        classifier.expect_logits().never();

        let err = classify_upload(&classifier, b"plain text").unwrap_err();
        assert!(matches!(err, DomainError::Decode { .. }));
    }

    #[test]
    fn test_classify_rejects_label_count_mismatch() {
        let mut classifier = MockImageClassifier::new();
        classifier.expect_logits().returning(|_| Ok(vec![0.0, 1.0]));
        classifier.expect_num_labels().return_const(Some(3usize));

        let image = RgbImage::new(2, 2);
        let err = classify(&classifier, &image).unwrap_err();
        assert!(matches!(err, DomainError::Inference { .. }));
    }

    #[test]
    fn test_classify_without_known_label_count() {
        let mut classifier = MockImageClassifier::new();
        classifier.expect_logits().returning(|_| Ok(vec![9.0, 1.0]));
        classifier.expect_num_labels().return_const(None::<usize>);

        let image = RgbImage::new(2, 2);
        assert_eq!(classify(&classifier, &image).unwrap(), Prediction::new(0));
    }

    #[test]
    fn test_classify_empty_logits() {
        let mut classifier = MockImageClassifier::new();
        classifier.expect_logits().returning(|_| Ok(Vec::new()));
        classifier.expect_num_labels().return_const(None::<usize>);

        let image = RgbImage::new(1, 1);
        let err = classify(&classifier, &image).unwrap_err();
        assert!(matches!(err, DomainError::Inference { .. }));
    }
}
