//! Result types of a CRD comparison

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::checker::Level;
use crate::schemadiff::SchemaDiff;

/// A change that is not tied to a schema path, e.g. a scope change
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub breaking: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
}

impl Change {
    pub fn breaking(description: impl Into<String>) -> Self {
        Self {
            breaking: true,
            description: description.into(),
        }
    }

    pub fn informational(description: impl Into<String>) -> Self {
        Self {
            breaking: false,
            description: description.into(),
        }
    }
}

/// All differences of a single CRD
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CrdDiff {
    #[serde(rename = "generalChanges", skip_serializing_if = "Vec::is_empty")]
    pub general: Vec<Change>,
    #[serde(rename = "added", skip_serializing_if = "BTreeSet::is_empty")]
    pub added_versions: BTreeSet<String>,
    #[serde(rename = "deleted", skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted_versions: BTreeSet<String>,
    #[serde(rename = "changed", skip_serializing_if = "BTreeMap::is_empty")]
    pub changed_versions: BTreeMap<String, CrdVersionDiff>,
}

impl CrdDiff {
    /// Diff of a CRD that only exists in the base snapshot
    pub fn removed() -> Self {
        Self {
            general: vec![Change::breaking("CRD has been removed")],
            ..Default::default()
        }
    }

    /// Diff of a CRD that only exists in the revision snapshot
    pub fn added() -> Self {
        Self {
            general: vec![Change::informational("CRD has been added")],
            ..Default::default()
        }
    }
}

/// Schema changes of a single CRD version
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrdVersionDiff {
    /// Changes keyed by canonical path
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub schema_changes: BTreeMap<String, CrdSchemaDiff>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breaking_changes: Vec<BreakingChange>,
}

/// Changes at one path of a version's schema
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CrdSchemaDiff {
    #[serde(rename = "added", skip_serializing_if = "BTreeSet::is_empty")]
    pub added_properties: BTreeSet<String>,
    #[serde(rename = "deleted", skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted_properties: BTreeSet<String>,
    /// Leaf-level changes of the node, without nested schema diffs
    #[serde(rename = "changes", skip_serializing_if = "Option::is_none")]
    pub diff: Option<SchemaDiff>,
}

impl CrdSchemaDiff {
    pub fn is_empty(&self) -> bool {
        self.added_properties.is_empty() && self.deleted_properties.is_empty() && self.diff.is_none()
    }
}

/// A breaking change found by the compatibility checker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakingChange {
    pub id: String,
    pub level: Level,
    pub details: BreakingChangeDetails,
}

impl fmt::Display for BreakingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.level, self.details)
    }
}

/// A length, item count or numeric limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Limit {
    MaxLength,
    MinLength,
    MaxItems,
    MinItems,
    Maximum,
    Minimum,
}

impl Limit {
    pub fn label(self) -> &'static str {
        match self {
            Self::MaxLength => "maximum allowed length",
            Self::MinLength => "minimum required length",
            Self::MaxItems => "maximum allowed items",
            Self::MinItems => "minimum required items",
            Self::Maximum => "maximum allowed value",
            Self::Minimum => "minimum allowed value",
        }
    }
}

/// Structured description of a breaking change
///
/// Serialized without a tag; the surrounding [`BreakingChange::id`]
/// identifies the kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BreakingChangeDetails {
    NewRequiredProperty {
        path: String,
    },
    PropertyBecameRequired {
        path: String,
    },
    PropertyRemoved {
        path: String,
    },
    PropertyBecameEnum {
        path: String,
    },
    PropertyBecameNotNullable {
        path: String,
    },
    TypeChanged {
        path: String,
        from: String,
        to: String,
    },
    EnumValueRemoved {
        path: String,
        value: Value,
    },
    LimitSet {
        path: String,
        limit: Limit,
        value: Value,
    },
    LimitChanged {
        path: String,
        limit: Limit,
        from: Value,
        to: Value,
    },
    PatternAdded {
        path: String,
        pattern: String,
    },
    PatternChanged {
        path: String,
        from: String,
        to: String,
    },
    /// Message key the correlator has no structured form for
    Message {
        key: String,
        args: Vec<Value>,
    },
    Text(String),
}

impl fmt::Display for BreakingChangeDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NewRequiredProperty { path } => write!(f, "added new required property {path}"),
            Self::PropertyBecameRequired { path } => write!(f, "property {path} became required"),
            Self::PropertyRemoved { path } => write!(f, "removed property {path}"),
            Self::PropertyBecameEnum { path } => {
                write!(f, "property {path} was restricted to a list of enum values")
            }
            Self::PropertyBecameNotNullable { path } => {
                write!(f, "property {path} became not nullable")
            }
            Self::TypeChanged { path, from, to } => {
                write!(f, "changed type of {path} from {from} to {to}")
            }
            Self::EnumValueRemoved { path, value } => {
                write!(f, "removed enum value {} from {path}", plain(value))
            }
            Self::LimitSet { path, limit, value } => {
                write!(f, "set {} of {path} to {}", limit.label(), plain(value))
            }
            Self::LimitChanged {
                path,
                limit,
                from,
                to,
            } => write!(
                f,
                "changed {} of {path} from {} to {}",
                limit.label(),
                plain(from),
                plain(to)
            ),
            Self::PatternAdded { path, pattern } => {
                write!(f, "added pattern {pattern:?} to {path}")
            }
            Self::PatternChanged { path, from, to } => {
                write!(f, "changed pattern of {path} from {from:?} to {to:?}")
            }
            Self::Message { key, args } => {
                write!(f, "{key}")?;
                for arg in args {
                    write!(f, " {}", plain(arg))?;
                }
                Ok(())
            }
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// Render a JSON value without quoting strings
pub(crate) fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Recursive change detection; an absent diff has no changes
pub trait ChangeSet {
    fn has_changes(&self) -> bool;
    fn has_breaking_changes(&self) -> bool;
}

impl<T: ChangeSet> ChangeSet for Option<T> {
    fn has_changes(&self) -> bool {
        self.as_ref().is_some_and(T::has_changes)
    }

    fn has_breaking_changes(&self) -> bool {
        self.as_ref().is_some_and(T::has_breaking_changes)
    }
}

impl<T: ChangeSet> ChangeSet for &T {
    fn has_changes(&self) -> bool {
        (**self).has_changes()
    }

    fn has_breaking_changes(&self) -> bool {
        (**self).has_breaking_changes()
    }
}

impl ChangeSet for CrdDiff {
    fn has_changes(&self) -> bool {
        !self.general.is_empty()
            || !self.added_versions.is_empty()
            || !self.deleted_versions.is_empty()
            || self.changed_versions.values().any(ChangeSet::has_changes)
    }

    fn has_breaking_changes(&self) -> bool {
        self.general.iter().any(|c| c.breaking)
            || !self.deleted_versions.is_empty()
            || self
                .changed_versions
                .values()
                .any(ChangeSet::has_breaking_changes)
    }
}

impl ChangeSet for CrdVersionDiff {
    fn has_changes(&self) -> bool {
        !self.schema_changes.is_empty() || !self.breaking_changes.is_empty()
    }

    fn has_breaking_changes(&self) -> bool {
        !self.breaking_changes.is_empty()
    }
}
