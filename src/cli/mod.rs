//! Command line interface
//!
//! - `serve`: run the HTTP server (default)
//! - `classify`: classify one local image file and print the result

pub mod classify;
pub mod serve;

use clap::{Parser, Subcommand};

/// Image classification server
#[derive(Parser)]
#[command(name = "image-classify-server")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,

    /// Classify a local image with the configured model
    Classify(classify::ClassifyArgs),
}
