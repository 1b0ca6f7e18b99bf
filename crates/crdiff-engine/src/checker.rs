//! Backward-compatibility checking
//!
//! A [`CompatibilityChecker`] inspects a [`SchemaDiff`] and reports atomic
//! findings: individual changes that can reject objects which the base
//! schema accepted. Findings carry a message key with positional
//! arguments (path first) so that the correlator can turn them into
//! structured details.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::path;
use crate::schemadiff::{SchemaDiff, SubschemasDiff, ValueDiff};

/// Severity of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Message of a finding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FindingMessage {
    /// Message key plus positional arguments, path first
    Localized { key: String, args: Vec<Value> },
    /// Free text for findings without a structured form
    Text(String),
}

/// A single backward-compatibility finding
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub id: String,
    pub level: Level,
    pub message: FindingMessage,
}

impl Finding {
    fn localized(id: &str, level: Level, args: Vec<Value>) -> Self {
        Self {
            id: id.to_string(),
            level,
            message: FindingMessage::Localized {
                key: id.to_string(),
                args,
            },
        }
    }

    fn text(id: &str, level: Level, text: String) -> Self {
        Self {
            id: id.to_string(),
            level,
            message: FindingMessage::Text(text),
        }
    }
}

/// Flags changes that break existing consumers of a schema
pub trait CompatibilityChecker: Send + Sync {
    /// Findings for `diff` at or above `floor`, in traversal order
    fn check(&self, diff: &SchemaDiff, floor: Level) -> Vec<Finding>;

    /// Name of this checker, for logging
    fn name(&self) -> &'static str;
}

/// Default checker treating every schema as a request body
///
/// A change is breaking when an object that validated against the base
/// schema may fail validation against the revision.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackwardCompatibilityChecker;

impl BackwardCompatibilityChecker {
    pub fn new() -> Self {
        Self
    }

    fn walk(&self, diff: &SchemaDiff, at: &str, findings: &mut Vec<Finding>) {
        let here = Value::String(path::display(at).to_string());

        self.check_properties(diff, at, findings);

        if let Some(type_) = &diff.type_ {
            findings.push(Finding::localized(
                "request-property-type-changed",
                Level::Error,
                vec![here.clone(), type_.from.clone(), type_.to.clone()],
            ));
        }

        if let Some(enum_) = &diff.enum_ {
            if enum_.enum_added {
                findings.push(Finding::localized(
                    "request-property-became-enum",
                    Level::Error,
                    vec![here.clone()],
                ));
            } else if !enum_.enum_deleted {
                for value in &enum_.deleted {
                    findings.push(Finding::localized(
                        "request-property-enum-value-removed",
                        Level::Error,
                        vec![here.clone(), value.clone()],
                    ));
                }
            }
        }

        upper_bound(findings, &here, diff.max_length.as_ref(), "max-length");
        lower_bound(findings, &here, diff.min_length.as_ref(), "min-length");
        lower_bound(findings, &here, diff.min_items.as_ref(), "min-items");
        upper_bound(findings, &here, diff.max_items.as_ref(), "max-items");
        upper_bound(findings, &here, diff.maximum.as_ref(), "max");
        lower_bound(findings, &here, diff.minimum.as_ref(), "min");

        if let Some(pattern) = &diff.pattern {
            match (&pattern.from, &pattern.to) {
                (Value::Null, Value::Null) => {}
                (Value::Null, to) => findings.push(Finding::localized(
                    "request-property-pattern-added",
                    Level::Warning,
                    vec![here.clone(), to.clone()],
                )),
                (_, Value::Null) => {}
                (from, to) => findings.push(Finding::localized(
                    "request-property-pattern-changed",
                    Level::Warning,
                    vec![here.clone(), from.clone(), to.clone()],
                )),
            }
        }

        if let Some(nullable) = &diff.nullable
            && nullable.from == Value::Bool(true)
            && nullable.to == Value::Bool(false)
        {
            findings.push(Finding::localized(
                "request-property-became-not-nullable",
                Level::Error,
                vec![here.clone()],
            ));
        }

        let compositions = [
            ("oneOf", diff.one_of.as_ref()),
            ("anyOf", diff.any_of.as_ref()),
            ("allOf", diff.all_of.as_ref()),
        ];
        for (keyword, subschemas) in compositions {
            let Some(subschemas) = subschemas else { continue };

            let modified = subschemas
                .modified
                .values()
                .filter(|d| changes_validation(d))
                .count();
            if subschemas.added > 0 || subschemas.deleted > 0 || modified > 0 {
                findings.push(Finding::text(
                    "request-property-composition-changed",
                    Level::Warning,
                    describe_subschemas(path::display(at), keyword, subschemas, modified),
                ));
            }
        }
        if diff.not.as_deref().is_some_and(changes_validation) {
            findings.push(Finding::text(
                "request-property-composition-changed",
                Level::Warning,
                format!("changed the 'not' subschema of {}", path::display(at)),
            ));
        }

        if let Some(items) = &diff.items {
            self.walk(items, &path::items(at), findings);
        }
        if let Some(properties) = &diff.properties {
            for (name, child) in &properties.modified {
                self.walk(child, &path::property(at, name), findings);
            }
        }
        if let Some(additional) = &diff.additional_properties {
            self.walk(additional, &path::additional_properties(at), findings);
        }
    }

    /// Property additions, removals and `required` changes at one node
    fn check_properties(&self, diff: &SchemaDiff, at: &str, findings: &mut Vec<Finding>) {
        let none = BTreeSet::new();
        let (added, deleted) = diff
            .properties
            .as_ref()
            .map_or((&none, &none), |p| (&p.added, &p.deleted));
        let (required, unrequired) = diff
            .required
            .as_ref()
            .map_or((&none, &none), |r| (&r.added, &r.deleted));

        let property_path = |name: &str| Value::String(path::property(at, name));

        for name in added {
            if required.contains(name) {
                findings.push(Finding::localized(
                    "new-required-request-property",
                    Level::Error,
                    vec![property_path(name)],
                ));
            } else {
                findings.push(Finding::localized(
                    "new-optional-request-property",
                    Level::Info,
                    vec![property_path(name)],
                ));
            }
        }

        for name in deleted {
            findings.push(Finding::localized(
                "request-property-removed",
                Level::Warning,
                vec![property_path(name)],
            ));
        }

        for name in required.difference(added) {
            findings.push(Finding::localized(
                "request-property-became-required",
                Level::Error,
                vec![property_path(name)],
            ));
        }

        for name in unrequired.difference(deleted) {
            findings.push(Finding::localized(
                "request-property-became-optional",
                Level::Info,
                vec![property_path(name)],
            ));
        }
    }
}

impl CompatibilityChecker for BackwardCompatibilityChecker {
    fn check(&self, diff: &SchemaDiff, floor: Level) -> Vec<Finding> {
        let mut findings = Vec::new();
        self.walk(diff, "", &mut findings);
        findings.retain(|f| f.level >= floor);
        findings
    }

    fn name(&self) -> &'static str {
        "backward-compatibility"
    }
}

/// Finding for a limit that rejects values above it (`maxLength`, `maximum`, ...)
fn upper_bound(findings: &mut Vec<Finding>, here: &Value, diff: Option<&ValueDiff>, name: &str) {
    let Some(diff) = diff else { return };

    match (diff.from.as_f64(), diff.to.as_f64()) {
        (None, Some(_)) => findings.push(Finding::localized(
            &format!("request-property-{name}-set"),
            Level::Error,
            vec![here.clone(), diff.to.clone()],
        )),
        (Some(from), Some(to)) if to < from => findings.push(Finding::localized(
            &format!("request-property-{name}-decreased"),
            Level::Error,
            vec![here.clone(), diff.from.clone(), diff.to.clone()],
        )),
        _ => {}
    }
}

/// Finding for a limit that rejects values below it (`minLength`, `minimum`, ...)
fn lower_bound(findings: &mut Vec<Finding>, here: &Value, diff: Option<&ValueDiff>, name: &str) {
    let Some(diff) = diff else { return };

    match (diff.from.as_f64(), diff.to.as_f64()) {
        (None, Some(to)) if to > 0.0 => findings.push(Finding::localized(
            &format!("request-property-{name}-set"),
            Level::Error,
            vec![here.clone(), diff.to.clone()],
        )),
        (Some(from), Some(to)) if to > from => findings.push(Finding::localized(
            &format!("request-property-{name}-increased"),
            Level::Error,
            vec![here.clone(), diff.from.clone(), diff.to.clone()],
        )),
        _ => {}
    }
}

/// True if the diff contains more than annotation changes
fn changes_validation(diff: &SchemaDiff) -> bool {
    !diff.without_annotations().is_empty()
}

fn describe_subschemas(at: &str, keyword: &str, diff: &SubschemasDiff, modified: usize) -> String {
    let mut parts = Vec::new();
    if diff.added > 0 {
        parts.push(format!("{} added", diff.added));
    }
    if diff.deleted > 0 {
        parts.push(format!("{} removed", diff.deleted));
    }
    if modified > 0 {
        parts.push(format!("{modified} modified"));
    }

    format!("changed the '{keyword}' subschemas of {at} ({})", parts.join(", "))
}
