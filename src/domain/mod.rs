//! Domain layer - Classification types and rules

pub mod classification;
pub mod error;
pub mod image;

pub use classification::{argmax, classify, classify_upload, ImageClassifier, Prediction};
pub use error::DomainError;
pub use self::image::decode_rgb;
