//! Structural diff between two schema trees

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use serde_json::Value;

/// Differences between two versions of a single schema node
///
/// Every field is `None` when that attribute is unchanged, so an
/// unchanged node equals `SchemaDiff::default()`. The container fields
/// (`items`, `properties`, `additional_properties`) hold the diffs of
/// nested schemas; all other fields describe the node itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaDiff {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ExtensionsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub one_of: Option<SubschemasDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub any_of: Option<SubschemasDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_of: Option<SubschemasDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub not: Option<Box<SchemaDiff>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<ValueDiff>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_: Option<EnumDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub example: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties_allowed: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_items: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_minimum: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_maximum: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<StringsDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_properties: Option<ValueDiff>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_properties: Option<ValueDiff>,

    /// Diff of the array item schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaDiff>>,
    /// Added, deleted and modified named properties
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<SchemasDiff>,
    /// Diff of the additional properties schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaDiff>>,
}

impl SchemaDiff {
    /// True if nothing changed at this node or below it
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Copy of this diff without the nested schema diffs
    pub fn without_containers(&self) -> Self {
        Self {
            items: None,
            properties: None,
            additional_properties: None,
            ..self.clone()
        }
    }

    /// Copy of this diff with description changes dropped at every level
    ///
    /// Nested diffs that become empty are removed, so a diff that only
    /// changed descriptions turns into an empty one.
    pub fn without_descriptions(&self) -> Self {
        self.pruned(&|d| d.description = None)
    }

    /// Copy of this diff without changes that do not affect validation
    ///
    /// Strips `description`, `title`, `example` and `externalDocs` at
    /// every level.
    pub fn without_annotations(&self) -> Self {
        self.pruned(&|d| {
            d.description = None;
            d.title = None;
            d.example = None;
            d.external_docs = None;
        })
    }

    fn pruned(&self, strip: &dyn Fn(&mut SchemaDiff)) -> Self {
        let mut diff = self.clone();
        diff.prune(strip);
        diff
    }

    fn prune(&mut self, strip: &dyn Fn(&mut SchemaDiff)) {
        strip(self);

        for subschemas in [&mut self.one_of, &mut self.any_of, &mut self.all_of] {
            if let Some(s) = subschemas.as_mut() {
                s.modified.retain(|_, d| {
                    d.prune(strip);
                    !d.is_empty()
                });
            }
            if subschemas.as_ref().is_some_and(SubschemasDiff::is_empty) {
                *subschemas = None;
            }
        }

        for nested in [&mut self.not, &mut self.items, &mut self.additional_properties] {
            if let Some(d) = nested.as_mut() {
                d.prune(strip);
            }
            if nested.as_ref().is_some_and(|d| d.is_empty()) {
                *nested = None;
            }
        }

        if let Some(properties) = self.properties.as_mut() {
            properties.modified.retain(|_, d| {
                d.prune(strip);
                !d.is_empty()
            });
        }
        if self.properties.as_ref().is_some_and(SchemasDiff::is_empty) {
            self.properties = None;
        }
    }
}

/// Change of a single scalar attribute; absent values are `null`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueDiff {
    pub from: Value,
    pub to: Value,
}

impl ValueDiff {
    pub fn new(from: Value, to: Value) -> Self {
        Self { from, to }
    }
}

/// Order-insensitive diff of an `enum` list
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDiff {
    /// The base schema had no enum restriction
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enum_added: bool,
    /// The revision schema has no enum restriction
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub enum_deleted: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<Value>,
}

/// Order-insensitive diff of a list of names, e.g. `required`
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct StringsDiff {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub added: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted: BTreeSet<String>,
}

/// Changed `x-kubernetes-*` extensions, keyed by extension name
pub type ExtensionsDiff = BTreeMap<String, ValueDiff>;

/// Positional diff of a `oneOf`/`anyOf`/`allOf` list
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SubschemasDiff {
    /// Number of subschemas appended in the revision
    pub added: usize,
    /// Number of subschemas dropped from the end of the list
    pub deleted: usize,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<usize, SchemaDiff>,
}

impl SubschemasDiff {
    pub fn is_empty(&self) -> bool {
        self.added == 0 && self.deleted == 0 && self.modified.is_empty()
    }
}

/// Diff of the named properties of an object schema
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SchemasDiff {
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub added: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeSet::is_empty")]
    pub deleted: BTreeSet<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<String, SchemaDiff>,
}

impl SchemasDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }
}
