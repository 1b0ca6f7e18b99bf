//! Uniform in-memory representation of a CustomResourceDefinition
//!
//! Both `apiextensions.k8s.io/v1` and the legacy `v1beta1` format are
//! normalized into [`Crd`] by the parser, so the comparison engine never
//! needs to know which format a definition was written in. Schemas are
//! always stored as the v1 [`JSONSchemaProps`] tree.

use std::collections::BTreeSet;

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::JSONSchemaProps;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// A parsed CustomResourceDefinition ready for comparison
#[derive(Debug, Clone, PartialEq)]
pub struct Crd {
    /// Full CRD name (e.g., "widgets.example.com")
    pub name: String,
    /// API group (e.g., "example.com")
    pub group: String,
    /// Kind (e.g., "Widget")
    pub kind: String,
    /// Resource scope
    pub scope: CrdScope,
    /// Format the definition was loaded from
    pub api_version: CrdApiVersion,
    /// API versions in declaration order, possibly with duplicates
    pub versions: Vec<CrdVersion>,
}

impl Crd {
    /// Identity of this CRD across snapshots, `group/kind`
    pub fn identifier(&self) -> String {
        format!("{}/{}", self.group, self.kind)
    }

    pub fn scope(&self) -> CrdScope {
        self.scope
    }

    /// All version names, sorted
    ///
    /// Fails if a version name is declared more than once.
    pub fn versions(&self) -> Result<BTreeSet<String>> {
        let mut versions = BTreeSet::new();
        for version in &self.versions {
            if !versions.insert(version.name.clone()) {
                return Err(CoreError::DuplicateVersion(version.name.clone()));
            }
        }
        Ok(versions)
    }

    /// Schema of the given version
    ///
    /// Returns `None` for unknown versions and for versions without a schema.
    pub fn schema(&self, version: &str) -> Option<&JSONSchemaProps> {
        self.versions
            .iter()
            .find(|v| v.name == version)
            .and_then(|v| v.schema.as_ref())
    }
}

/// A single API version of a CRD
#[derive(Debug, Clone, PartialEq)]
pub struct CrdVersion {
    /// Version name (e.g., "v1", "v1beta1", "v1alpha1")
    pub name: String,
    /// OpenAPI v3 validation schema
    pub schema: Option<JSONSchemaProps>,
}

impl CrdVersion {
    pub fn new(name: impl Into<String>, schema: Option<JSONSchemaProps>) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// CRD scope - whether resources are namespaced or cluster-wide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CrdScope {
    #[default]
    Namespaced,
    Cluster,
}

impl CrdScope {
    /// Parse the `spec.scope` value of a CRD
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Namespaced" => Some(Self::Namespaced),
            "Cluster" => Some(Self::Cluster),
            _ => None,
        }
    }
}

impl std::fmt::Display for CrdScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Namespaced => write!(f, "Namespaced"),
            Self::Cluster => write!(f, "Cluster"),
        }
    }
}

/// The `apiextensions.k8s.io` version a CRD was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrdApiVersion {
    V1,
    V1beta1,
}

impl CrdApiVersion {
    pub const V1_STR: &'static str = "apiextensions.k8s.io/v1";
    pub const V1BETA1_STR: &'static str = "apiextensions.k8s.io/v1beta1";

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            Self::V1_STR => Some(Self::V1),
            Self::V1BETA1_STR => Some(Self::V1beta1),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::V1 => Self::V1_STR,
            Self::V1beta1 => Self::V1BETA1_STR,
        }
    }
}

impl std::fmt::Display for CrdApiVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
