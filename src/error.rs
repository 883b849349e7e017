//! Error types for the code surrounding the resolution engine
//!
//! Graph resolution itself never fails: dangling references degrade to
//! placeholder nodes. Errors only arise when loading AST documents or
//! configuration from outside the process.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for document and configuration loading
#[derive(Error, Debug)]
pub enum EcGraphError {
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid AST document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, EcGraphError>;
