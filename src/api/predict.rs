//! `POST /predict/` - classify one uploaded image

use std::time::Instant;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::{debug, warn};

use super::state::AppState;
use super::types::ApiError;
use crate::domain::{classify_upload, DomainError, Prediction};
use crate::infrastructure::observability::{record_classification, ClassificationOutcome};

/// Form field carrying the image bytes
pub const UPLOAD_FIELD: &str = "file";

pub async fn predict(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let upload = read_upload(multipart?).await?;
    debug!(bytes = upload.len(), "Received image upload");

    let start = Instant::now();
    let classifier = state.classifier.clone();

    // Inference is CPU-bound; keep it off the async workers
    let result =
        tokio::task::spawn_blocking(move || classify_upload(classifier.as_ref(), &upload))
            .await
            .map_err(|e| ApiError::internal(format!("Classification task failed: {}", e)))?;

    let outcome = match &result {
        Ok(_) => ClassificationOutcome::Success,
        Err(DomainError::Decode { .. }) => ClassificationOutcome::DecodeError,
        Err(_) => ClassificationOutcome::InferenceError,
    };
    record_classification(outcome, start.elapsed());

    match result {
        Ok(prediction) => {
            debug!(
                predicted_class = prediction.predicted_class,
                duration_ms = start.elapsed().as_millis() as u64,
                "Image classified"
            );
            Ok(Json(prediction))
        }
        Err(e) => {
            warn!(error = %e, "Classification failed");
            Err(e.into())
        }
    }
}

/// Pull the bytes of the `file` field, skipping any other fields
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(UPLOAD_FIELD) {
            return Ok(field.bytes().await?);
        }
    }

    Err(ApiError::missing_field(UPLOAD_FIELD))
}
