//! Default structural schema differencer

use std::collections::{BTreeMap, BTreeSet};

use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    JSONSchemaProps, JSONSchemaPropsOrArray, JSONSchemaPropsOrBool,
};
use serde::Serialize;
use serde_json::Value;

use super::types::{
    EnumDiff, ExtensionsDiff, SchemaDiff, SchemasDiff, StringsDiff, SubschemasDiff, ValueDiff,
};
use super::{DiffError, SchemaDiffer};
use crate::path;

/// Nesting depth at which the differ gives up
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Walks two `JSONSchemaProps` trees side by side and records every difference
///
/// Comparison is insensitive to the order of `properties`, `required` and
/// `enum`. Boolean flags treat "absent" and `false` as equal.
#[derive(Debug, Clone)]
pub struct StructuralDiffer {
    max_depth: usize,
}

impl Default for StructuralDiffer {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl StructuralDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn diff(
        &self,
        base: &JSONSchemaProps,
        revision: &JSONSchemaProps,
        at: &str,
        depth: usize,
    ) -> Result<SchemaDiff, DiffError> {
        if depth > self.max_depth {
            return Err(DiffError::TooDeep {
                path: path::display(at).to_string(),
                limit: self.max_depth,
            });
        }

        let (base_allowed, base_additional) = split_additional(base.additional_properties.as_ref());
        let (revision_allowed, revision_additional) =
            split_additional(revision.additional_properties.as_ref());

        Ok(SchemaDiff {
            extensions: extensions_diff(base, revision)?,
            one_of: self.subschemas_diff(&base.one_of, &revision.one_of, at, "oneOf", depth)?,
            any_of: self.subschemas_diff(&base.any_of, &revision.any_of, at, "anyOf", depth)?,
            all_of: self.subschemas_diff(&base.all_of, &revision.all_of, at, "allOf", depth)?,
            not: self
                .nested_diff(
                    base.not.as_deref(),
                    revision.not.as_deref(),
                    &format!("{at}.not"),
                    depth,
                )?
                .map(Box::new),
            type_: value_diff(&base.type_, &revision.type_)?,
            title: value_diff(&base.title, &revision.title)?,
            format: value_diff(&base.format, &revision.format)?,
            description: value_diff(&base.description, &revision.description)?,
            enum_: enum_diff(base, revision),
            default: value_diff(&base.default, &revision.default)?,
            example: value_diff(&base.example, &revision.example)?,
            external_docs: value_diff(&base.external_docs, &revision.external_docs)?,
            additional_properties_allowed: value_diff(&base_allowed, &revision_allowed)?,
            unique_items: flag_diff(base.unique_items, revision.unique_items),
            exclusive_minimum: flag_diff(base.exclusive_minimum, revision.exclusive_minimum),
            exclusive_maximum: flag_diff(base.exclusive_maximum, revision.exclusive_maximum),
            nullable: flag_diff(base.nullable, revision.nullable),
            minimum: value_diff(&base.minimum, &revision.minimum)?,
            maximum: value_diff(&base.maximum, &revision.maximum)?,
            multiple_of: value_diff(&base.multiple_of, &revision.multiple_of)?,
            min_length: value_diff(&base.min_length, &revision.min_length)?,
            max_length: value_diff(&base.max_length, &revision.max_length)?,
            pattern: value_diff(&base.pattern, &revision.pattern)?,
            min_items: value_diff(&base.min_items, &revision.min_items)?,
            max_items: value_diff(&base.max_items, &revision.max_items)?,
            required: strings_diff(base.required.as_deref(), revision.required.as_deref()),
            min_properties: value_diff(&base.min_properties, &revision.min_properties)?,
            max_properties: value_diff(&base.max_properties, &revision.max_properties)?,
            items: self
                .nested_diff(
                    item_schema(base.items.as_ref()),
                    item_schema(revision.items.as_ref()),
                    &path::items(at),
                    depth,
                )?
                .map(Box::new),
            properties: self.properties_diff(base, revision, at, depth)?,
            additional_properties: self
                .nested_diff(
                    base_additional,
                    revision_additional,
                    &path::additional_properties(at),
                    depth,
                )?
                .map(Box::new),
        })
    }

    /// Diff two optional child schemas; a missing side compares as an empty schema
    fn nested_diff(
        &self,
        base: Option<&JSONSchemaProps>,
        revision: Option<&JSONSchemaProps>,
        at: &str,
        depth: usize,
    ) -> Result<Option<SchemaDiff>, DiffError> {
        if base.is_none() && revision.is_none() {
            return Ok(None);
        }

        let empty = JSONSchemaProps::default();
        let diff = self.diff(
            base.unwrap_or(&empty),
            revision.unwrap_or(&empty),
            at,
            depth + 1,
        )?;

        Ok((!diff.is_empty()).then_some(diff))
    }

    fn properties_diff(
        &self,
        base: &JSONSchemaProps,
        revision: &JSONSchemaProps,
        at: &str,
        depth: usize,
    ) -> Result<Option<SchemasDiff>, DiffError> {
        let empty = BTreeMap::new();
        let base_props = base.properties.as_ref().unwrap_or(&empty);
        let revision_props = revision.properties.as_ref().unwrap_or(&empty);

        let mut result = SchemasDiff::default();

        for (name, base_prop) in base_props {
            match revision_props.get(name) {
                None => {
                    result.deleted.insert(name.clone());
                }
                Some(revision_prop) => {
                    let diff =
                        self.diff(base_prop, revision_prop, &path::property(at, name), depth + 1)?;
                    if !diff.is_empty() {
                        result.modified.insert(name.clone(), diff);
                    }
                }
            }
        }

        result.added = revision_props
            .keys()
            .filter(|name| !base_props.contains_key(*name))
            .cloned()
            .collect();

        Ok((!result.is_empty()).then_some(result))
    }

    fn subschemas_diff(
        &self,
        base: &Option<Vec<JSONSchemaProps>>,
        revision: &Option<Vec<JSONSchemaProps>>,
        at: &str,
        keyword: &str,
        depth: usize,
    ) -> Result<Option<SubschemasDiff>, DiffError> {
        let base = base.as_deref().unwrap_or_default();
        let revision = revision.as_deref().unwrap_or_default();

        let mut result = SubschemasDiff {
            added: revision.len().saturating_sub(base.len()),
            deleted: base.len().saturating_sub(revision.len()),
            modified: BTreeMap::new(),
        };

        for (index, (b, r)) in base.iter().zip(revision).enumerate() {
            let diff = self.diff(b, r, &format!("{at}.{keyword}[{index}]"), depth + 1)?;
            if !diff.is_empty() {
                result.modified.insert(index, diff);
            }
        }

        Ok((!result.is_empty()).then_some(result))
    }
}

impl SchemaDiffer for StructuralDiffer {
    fn compare(
        &self,
        base: Option<&JSONSchemaProps>,
        revision: Option<&JSONSchemaProps>,
    ) -> Result<Option<SchemaDiff>, DiffError> {
        let empty = JSONSchemaProps::default();
        let diff = self.diff(
            base.unwrap_or(&empty),
            revision.unwrap_or(&empty),
            "",
            0,
        )?;

        Ok((!diff.is_empty()).then_some(diff))
    }

    fn name(&self) -> &'static str {
        "structural"
    }
}

fn value_diff<T: Serialize + PartialEq>(
    base: &Option<T>,
    revision: &Option<T>,
) -> Result<Option<ValueDiff>, DiffError> {
    if base == revision {
        return Ok(None);
    }

    Ok(Some(ValueDiff::new(
        serde_json::to_value(base)?,
        serde_json::to_value(revision)?,
    )))
}

fn flag_diff(base: Option<bool>, revision: Option<bool>) -> Option<ValueDiff> {
    let base = base.unwrap_or(false);
    let revision = revision.unwrap_or(false);

    (base != revision).then(|| ValueDiff::new(Value::Bool(base), Value::Bool(revision)))
}

fn enum_diff(base: &JSONSchemaProps, revision: &JSONSchemaProps) -> Option<EnumDiff> {
    let base_values: Vec<&Value> = base.enum_.iter().flatten().map(|v| &v.0).collect();
    let revision_values: Vec<&Value> = revision.enum_.iter().flatten().map(|v| &v.0).collect();

    let diff = EnumDiff {
        enum_added: base_values.is_empty() && !revision_values.is_empty(),
        enum_deleted: !base_values.is_empty() && revision_values.is_empty(),
        added: revision_values
            .iter()
            .filter(|v| !base_values.contains(v))
            .map(|v| (*v).clone())
            .collect(),
        deleted: base_values
            .iter()
            .filter(|v| !revision_values.contains(v))
            .map(|v| (*v).clone())
            .collect(),
    };

    (diff != EnumDiff::default()).then_some(diff)
}

fn strings_diff(base: Option<&[String]>, revision: Option<&[String]>) -> Option<StringsDiff> {
    let base: BTreeSet<&String> = base.unwrap_or_default().iter().collect();
    let revision: BTreeSet<&String> = revision.unwrap_or_default().iter().collect();

    let diff = StringsDiff {
        added: revision.difference(&base).map(|s| (*s).clone()).collect(),
        deleted: base.difference(&revision).map(|s| (*s).clone()).collect(),
    };

    (diff != StringsDiff::default()).then_some(diff)
}

/// Collect the set `x-kubernetes-*` extensions of a schema node
fn extensions(schema: &JSONSchemaProps) -> Result<BTreeMap<&'static str, Value>, DiffError> {
    let mut result = BTreeMap::new();

    let flags = [
        ("x-kubernetes-embedded-resource", schema.x_kubernetes_embedded_resource),
        ("x-kubernetes-int-or-string", schema.x_kubernetes_int_or_string),
        ("x-kubernetes-preserve-unknown-fields", schema.x_kubernetes_preserve_unknown_fields),
    ];
    for (name, flag) in flags {
        if flag == Some(true) {
            result.insert(name, Value::Bool(true));
        }
    }

    if let Some(keys) = &schema.x_kubernetes_list_map_keys {
        result.insert("x-kubernetes-list-map-keys", serde_json::to_value(keys)?);
    }
    if let Some(list_type) = &schema.x_kubernetes_list_type {
        result.insert("x-kubernetes-list-type", Value::String(list_type.clone()));
    }
    if let Some(map_type) = &schema.x_kubernetes_map_type {
        result.insert("x-kubernetes-map-type", Value::String(map_type.clone()));
    }
    if let Some(validations) = &schema.x_kubernetes_validations {
        result.insert("x-kubernetes-validations", serde_json::to_value(validations)?);
    }

    Ok(result)
}

fn extensions_diff(
    base: &JSONSchemaProps,
    revision: &JSONSchemaProps,
) -> Result<Option<ExtensionsDiff>, DiffError> {
    let base = extensions(base)?;
    let revision = extensions(revision)?;

    let names: BTreeSet<&str> = base.keys().chain(revision.keys()).copied().collect();

    let mut result = ExtensionsDiff::new();
    for name in names {
        let from = base.get(name).cloned().unwrap_or(Value::Null);
        let to = revision.get(name).cloned().unwrap_or(Value::Null);
        if from != to {
            result.insert(name.to_string(), ValueDiff::new(from, to));
        }
    }

    Ok((!result.is_empty()).then_some(result))
}

/// Item schema of an array; tuple-style item lists only contribute their first entry
fn item_schema(items: Option<&JSONSchemaPropsOrArray>) -> Option<&JSONSchemaProps> {
    match items? {
        JSONSchemaPropsOrArray::Schema(schema) => Some(schema),
        JSONSchemaPropsOrArray::Schemas(schemas) => schemas.first(),
    }
}

/// Split `additionalProperties` into its boolean and schema forms
fn split_additional(
    additional: Option<&JSONSchemaPropsOrBool>,
) -> (Option<bool>, Option<&JSONSchemaProps>) {
    match additional {
        Some(JSONSchemaPropsOrBool::Bool(allowed)) => (Some(*allowed), None),
        Some(JSONSchemaPropsOrBool::Schema(schema)) => (None, Some(schema)),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema(value: Value) -> JSONSchemaProps {
        serde_json::from_value(value).unwrap()
    }

    fn compare(base: Value, revision: Value) -> Option<SchemaDiff> {
        StructuralDiffer::new()
            .compare(Some(&schema(base)), Some(&schema(revision)))
            .unwrap()
    }

    #[test]
    fn test_identical_schemas_have_no_diff() {
        let s = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {
                "a": {"type": "string", "enum": ["x", "y"]},
                "b": {"type": "array", "items": {"type": "integer"}},
            },
        });
        assert!(compare(s.clone(), s).is_none());
    }

    #[test]
    fn test_ordering_is_ignored() {
        let base = json!({
            "type": "object",
            "required": ["a", "b"],
            "properties": {"a": {"type": "string", "enum": ["x", "y"]}, "b": {"type": "string"}},
        });
        let revision = json!({
            "properties": {"b": {"type": "string"}, "a": {"enum": ["y", "x"], "type": "string"}},
            "required": ["b", "a"],
            "type": "object",
        });
        assert!(compare(base, revision).is_none());
    }

    #[test]
    fn test_absent_and_false_flags_are_equal() {
        assert!(compare(json!({"type": "string"}), json!({"type": "string", "nullable": false})).is_none());
        assert!(
            compare(
                json!({"type": "object"}),
                json!({"type": "object", "x-kubernetes-preserve-unknown-fields": false})
            )
            .is_none()
        );
    }

    #[test]
    fn test_leaf_changes() {
        let diff = compare(
            json!({"type": "string", "maxLength": 10}),
            json!({"type": "integer", "maxLength": 5, "format": "int32"}),
        )
        .unwrap();

        assert_eq!(diff.type_, Some(ValueDiff::new(json!("string"), json!("integer"))));
        assert_eq!(diff.max_length, Some(ValueDiff::new(json!(10), json!(5))));
        assert_eq!(diff.format, Some(ValueDiff::new(json!(null), json!("int32"))));
        assert!(diff.properties.is_none());
    }

    #[test]
    fn test_properties_added_deleted_modified() {
        let diff = compare(
            json!({"properties": {"keep": {"type": "string"}, "gone": {"type": "string"}}}),
            json!({"properties": {"keep": {"type": "integer"}, "new": {"type": "string"}}}),
        )
        .unwrap();

        let props = diff.properties.unwrap();
        assert_eq!(props.added, BTreeSet::from(["new".to_string()]));
        assert_eq!(props.deleted, BTreeSet::from(["gone".to_string()]));
        assert_eq!(props.modified.keys().collect::<Vec<_>>(), vec!["keep"]);
    }

    #[test]
    fn test_items_and_additional_properties() {
        let diff = compare(
            json!({
                "type": "object",
                "properties": {
                    "list": {"type": "array", "items": {"type": "string"}},
                    "labels": {"type": "object", "additionalProperties": {"type": "string"}},
                },
            }),
            json!({
                "type": "object",
                "properties": {
                    "list": {"type": "array", "items": {"type": "string", "pattern": "^a"}},
                    "labels": {"type": "object", "additionalProperties": {"type": "integer"}},
                },
            }),
        )
        .unwrap();

        let props = diff.properties.unwrap();
        let list = &props.modified["list"];
        assert!(list.items.as_ref().unwrap().pattern.is_some());

        let labels = &props.modified["labels"];
        assert!(labels.additional_properties.as_ref().unwrap().type_.is_some());
    }

    #[test]
    fn test_additional_properties_allowed() {
        let diff = compare(
            json!({"type": "object", "additionalProperties": true}),
            json!({"type": "object", "additionalProperties": false}),
        )
        .unwrap();

        assert_eq!(
            diff.additional_properties_allowed,
            Some(ValueDiff::new(json!(true), json!(false)))
        );
        assert!(diff.additional_properties.is_none());
    }

    #[test]
    fn test_enum_and_required() {
        let diff = compare(
            json!({"enum": ["a", "b"], "required": ["x"]}),
            json!({"enum": ["b", "c"], "required": ["x", "y"]}),
        )
        .unwrap();

        let enum_diff = diff.enum_.unwrap();
        assert!(!enum_diff.enum_added);
        assert_eq!(enum_diff.added, vec![json!("c")]);
        assert_eq!(enum_diff.deleted, vec![json!("a")]);

        let required = diff.required.unwrap();
        assert_eq!(required.added, BTreeSet::from(["y".to_string()]));
        assert!(required.deleted.is_empty());
    }

    #[test]
    fn test_composition() {
        let diff = compare(
            json!({"oneOf": [{"required": ["a"]}]}),
            json!({"oneOf": [{"required": ["b"]}, {"required": ["c"]}]}),
        )
        .unwrap();

        let one_of = diff.one_of.unwrap();
        assert_eq!(one_of.added, 1);
        assert_eq!(one_of.deleted, 0);
        assert!(one_of.modified.contains_key(&0));
    }

    #[test]
    fn test_absent_schema_compares_as_empty() {
        let differ = StructuralDiffer::new();
        assert!(differ.compare(None, None).unwrap().is_none());

        let diff = differ
            .compare(None, Some(&schema(json!({"type": "object"}))))
            .unwrap()
            .unwrap();
        assert_eq!(diff.type_, Some(ValueDiff::new(json!(null), json!("object"))));
    }

    #[test]
    fn test_depth_limit() {
        let deep = json!({"properties": {"a": {"properties": {"b": {"properties": {"c": {"type": "string"}}}}}}});
        let deeper = json!({"properties": {"a": {"properties": {"b": {"properties": {"c": {"type": "integer"}}}}}}});

        let err = StructuralDiffer::new()
            .with_max_depth(2)
            .compare(Some(&schema(deep)), Some(&schema(deeper)))
            .unwrap_err();

        assert!(matches!(err, DiffError::TooDeep { ref path, limit: 2 } if path == ".a.b.c"));
    }
}
