//! Infrastructure layer - Model runtime, logging and observability

pub mod logging;
pub mod model;
pub mod observability;
