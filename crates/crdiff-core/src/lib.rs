//! crdiff Core - CRD model and loading for the CRD comparison tool
//!
//! This crate provides the inputs of a comparison run:
//! - `Crd`: a single CustomResourceDefinition, normalized across CRD formats
//! - `load_crds`: read all CRDs from a file or directory, keyed by identity

pub mod crd;
pub mod error;
pub mod loader;

pub use crd::{Crd, CrdApiVersion, CrdParser, CrdScope, CrdVersion};
pub use error::{CoreError, Result};
pub use loader::{LoadOptions, load_crds};

/// JSON schema tree of a single CRD version
pub use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::JSONSchemaProps;
