//! Core error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("invalid source {path}: {source}")]
    InvalidSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to walk directory {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("document {document} in {path} is not valid YAML: {source}")]
    YamlParse {
        path: PathBuf,
        document: usize,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("document {document} in {path} is invalid: {source}")]
    InvalidDocument {
        path: PathBuf,
        document: usize,
        #[source]
        source: Box<CoreError>,
    },

    #[error("document is using unrecognized API version {0:?}")]
    UnsupportedApiVersion(String),

    #[error("document is not a valid {api_version} CustomResourceDefinition: {message}")]
    InvalidCrd { api_version: String, message: String },

    #[error("defines version {0:?} multiple times")]
    DuplicateVersion(String),

    #[error("{identifier} is invalid: {source}")]
    InvalidVersions {
        identifier: String,
        #[source]
        source: Box<CoreError>,
    },

    #[error("found multiple definitions of {0}")]
    DuplicateIdentifier(String),
}

impl CoreError {
    /// Create an error for a CRD document that does not match its declared API version
    pub fn invalid_crd(api_version: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::InvalidCrd {
            api_version: api_version.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
