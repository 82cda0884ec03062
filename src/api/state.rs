//! Application state shared by request handlers

use std::sync::Arc;

use crate::domain::ImageClassifier;

/// Read-only handle to the classifier loaded at startup
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn ImageClassifier>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn ImageClassifier>) -> Self {
        Self { classifier }
    }
}
