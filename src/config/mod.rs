//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, CorsConfig, LogFormat, LoggingConfig, ModelConfig, ServerConfig,
    DEFAULT_MAX_UPLOAD_BYTES,
};
