//! Loading CRDs from files and directories
//!
//! A source is either a single file or a directory that is walked
//! recursively. Every file may contain any number of YAML (or JSON)
//! documents; documents that are not CustomResourceDefinitions are
//! ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;

use crate::crd::{Crd, CrdParser};
use crate::error::{CoreError, Result};

/// Options controlling which files are read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    /// File extensions (without dot, lowercase) considered when walking directories
    pub file_extensions: Vec<String>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            file_extensions: vec!["yaml".to_string(), "yml".to_string(), "json".to_string()],
        }
    }
}

impl LoadOptions {
    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .is_some_and(|ext| self.file_extensions.iter().any(|e| *e == ext))
    }
}

/// Load all CRDs from `source`, keyed by their identifier
///
/// Fails if any CRD declares a version twice or if the same identifier
/// is defined more than once within the source.
pub fn load_crds(source: &Path, options: &LoadOptions) -> Result<BTreeMap<String, Crd>> {
    let metadata = std::fs::metadata(source).map_err(|e| CoreError::InvalidSource {
        path: source.to_path_buf(),
        source: e,
    })?;

    let crds = if metadata.is_dir() {
        load_directory(source, options)?
    } else {
        load_file(source)?
    };

    forbid_duplicates(crds)
}

fn forbid_duplicates(crds: Vec<Crd>) -> Result<BTreeMap<String, Crd>> {
    let mut result = BTreeMap::new();

    for crd in crds {
        let identifier = crd.identifier();

        if let Err(e) = crd.versions() {
            return Err(CoreError::InvalidVersions {
                identifier,
                source: Box::new(e),
            });
        }

        if result.contains_key(&identifier) {
            return Err(CoreError::DuplicateIdentifier(identifier));
        }

        result.insert(identifier, crd);
    }

    Ok(result)
}

fn load_directory(root: &Path, options: &LoadOptions) -> Result<Vec<Crd>> {
    tracing::debug!(directory = %root.display(), "Reading directory");

    let mut files: Vec<PathBuf> = Vec::new();

    for entry in walkdir::WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| CoreError::Walk {
            path: root.to_path_buf(),
            source: e,
        })?;

        let path = entry.path();
        if entry.file_type().is_file() && options.matches(path) {
            files.push(path.to_path_buf());
        }
    }

    let mut crds = Vec::new();
    for file in files {
        crds.extend(load_file(&file)?);
    }

    Ok(crds)
}

fn load_file(path: &Path) -> Result<Vec<Crd>> {
    tracing::debug!(filename = %path.display(), "Reading file");

    let content = std::fs::read_to_string(path).map_err(|e| CoreError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_documents(path, &content)
}

/// Parse every document of a multi-document YAML stream
fn parse_documents(path: &Path, content: &str) -> Result<Vec<Crd>> {
    let mut crds = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let number = index + 1;

        let value = Value::deserialize(document).map_err(|e| CoreError::YamlParse {
            path: path.to_path_buf(),
            document: number,
            source: e,
        })?;

        match CrdParser::parse_value(&value) {
            Ok(Some(crd)) => {
                tracing::debug!(
                    filename = %path.display(),
                    document = number,
                    crd = %crd.identifier(),
                    "Found CRD"
                );
                crds.push(crd);
            }
            Ok(None) => {
                tracing::debug!(filename = %path.display(), document = number, "Skipping non-CRD document");
            }
            Err(e) => {
                return Err(CoreError::InvalidDocument {
                    path: path.to_path_buf(),
                    document: number,
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(crds)
}
