//! Error types for policy loading and request parsing
//!
//! The routing entry points themselves are total and never return these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoutingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid routing policy: {0}")]
    InvalidPolicy(String),

    #[error("Invalid keyword vocabulary '{name}': {source}")]
    Vocabulary {
        name: String,
        #[source]
        source: regex::Error,
    },
}

pub type RoutingResult<T> = Result<T, RoutingError>;
