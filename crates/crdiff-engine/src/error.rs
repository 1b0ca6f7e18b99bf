//! Engine error types

use crdiff_core::CoreError;
use thiserror::Error;

/// Failure of the schema differencer or the compatibility checker
#[derive(Error, Debug)]
pub enum DiffError {
    #[error("schema nesting at {path} exceeds the limit of {limit} levels")]
    TooDeep { path: String, limit: usize },

    #[error("failed to encode schema value: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Which snapshot a CRD came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Revision,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => write!(f, "base"),
            Self::Revision => write!(f, "revision"),
        }
    }
}

/// Main engine error type
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("cannot compare two different CRDs ({base:?} vs. {revision:?})")]
    IdentityMismatch { base: String, revision: String },

    #[error("invalid {side} versions: {source}")]
    Versions {
        side: Side,
        #[source]
        source: CoreError,
    },

    #[error("failed comparing version {version}: {source}")]
    Schema {
        version: String,
        #[source]
        source: DiffError,
    },

    #[error("failed comparing {identifier}: {source}")]
    Crd {
        identifier: String,
        #[source]
        source: Box<EngineError>,
    },

    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
