//! Flattening a schema diff tree into path-keyed changes
//!
//! Every node of the diff tree gets a canonical path. Nodes with leaf
//! changes are recorded at their own path with the nested diffs stripped;
//! added and deleted property names are recorded at the path of the
//! object that owns them. Nested diffs are handled by recursion, so no
//! change is reported at two levels.

use std::collections::BTreeMap;

use super::types::CrdSchemaDiff;
use crate::path;
use crate::schemadiff::{SchemaDiff, SchemasDiff};

/// Options that shape the collected changes
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct NormalizeOptions {
    pub ignore_descriptions: bool,
    pub breaking_only: bool,
}

/// True if any scalar attribute of the node itself changed
///
/// `items`, `properties` and `additionalProperties` are not leaf changes.
pub fn has_leaf_diff(diff: &SchemaDiff, ignore_descriptions: bool) -> bool {
    diff.extensions.is_some()
        || diff.one_of.is_some()
        || diff.any_of.is_some()
        || diff.all_of.is_some()
        || diff.not.is_some()
        || diff.type_.is_some()
        || diff.title.is_some()
        || diff.format.is_some()
        || (diff.description.is_some() && !ignore_descriptions)
        || diff.enum_.is_some()
        || diff.default.is_some()
        || diff.example.is_some()
        || diff.external_docs.is_some()
        || diff.additional_properties_allowed.is_some()
        || diff.unique_items.is_some()
        || diff.exclusive_minimum.is_some()
        || diff.exclusive_maximum.is_some()
        || diff.nullable.is_some()
        || diff.minimum.is_some()
        || diff.maximum.is_some()
        || diff.multiple_of.is_some()
        || diff.min_length.is_some()
        || diff.max_length.is_some()
        || diff.pattern.is_some()
        || diff.min_items.is_some()
        || diff.max_items.is_some()
        || diff.required.is_some()
        || diff.min_properties.is_some()
        || diff.max_properties.is_some()
}

/// Collect the path-keyed changes of a version's schema diff
pub(crate) fn collect_schema_changes(
    diff: &SchemaDiff,
    options: NormalizeOptions,
) -> BTreeMap<String, CrdSchemaDiff> {
    let mut changes = BTreeMap::new();
    collect(&mut changes, diff, options, "");
    changes
}

fn collect(
    changes: &mut BTreeMap<String, CrdSchemaDiff>,
    diff: &SchemaDiff,
    options: NormalizeOptions,
    at: &str,
) {
    tracing::trace!(path = path::display(at), "Visiting schema diff");

    if has_leaf_diff(diff, options.ignore_descriptions) {
        let mut leaf = diff.without_containers();
        if options.ignore_descriptions {
            leaf.description = None;
        }

        changes
            .entry(path::display(at).to_string())
            .or_insert_with(CrdSchemaDiff::default)
            .diff = Some(leaf);
    }

    if let Some(items) = &diff.items {
        collect(changes, items, options, &path::items(at));
    }

    if let Some(properties) = &diff.properties {
        collect_properties(changes, properties, options, at);
    }

    if let Some(additional) = &diff.additional_properties {
        collect(changes, additional, options, &path::additional_properties(at));
    }
}

fn collect_properties(
    changes: &mut BTreeMap<String, CrdSchemaDiff>,
    properties: &SchemasDiff,
    options: NormalizeOptions,
    at: &str,
) {
    let added = if options.breaking_only {
        Default::default()
    } else {
        properties.added.clone()
    };

    if !added.is_empty() || !properties.deleted.is_empty() {
        let entry = changes.entry(path::display(at).to_string()).or_default();
        entry.added_properties.extend(added);
        entry
            .deleted_properties
            .extend(properties.deleted.iter().cloned());
    }

    for (name, child) in &properties.modified {
        collect(changes, child, options, &path::property(at, name));
    }
}
