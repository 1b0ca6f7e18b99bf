//! Comparing CRDs between a base and a revision snapshot

mod breaking;
mod normalize;
mod types;
mod versions;

pub use normalize::has_leaf_diff;
pub(crate) use types::plain;
pub use types::{
    BreakingChange, BreakingChangeDetails, Change, ChangeSet, CrdDiff, CrdSchemaDiff,
    CrdVersionDiff, Limit,
};
pub use versions::{VersionMatch, match_versions};

use std::collections::BTreeMap;

use crdiff_core::Crd;

use crate::checker::{BackwardCompatibilityChecker, CompatibilityChecker, Level};
use crate::error::{EngineError, Result, Side};
use crate::report::Report;
use crate::schemadiff::{SchemaDiffer, StructuralDiffer};
use normalize::NormalizeOptions;

/// Lowest severity a finding needs to be reported
pub const BREAKING_FLOOR: Level = Level::Warning;

/// Options for a comparison run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompareOptions {
    /// Only compare these versions; empty compares all
    pub versions: Vec<String>,
    /// Omit added versions and added properties
    pub breaking_only: bool,
    /// Do not report description-only changes
    pub ignore_descriptions: bool,
    /// Keep CRDs without changes in the report
    pub include_unchanged: bool,
    /// Report CRDs that only exist in the revision
    pub include_added_crds: bool,
}

impl CompareOptions {
    fn normalize(&self) -> NormalizeOptions {
        NormalizeOptions {
            ignore_descriptions: self.ignore_descriptions,
            breaking_only: self.breaking_only,
        }
    }
}

/// Compares CRDs using a schema differ and a compatibility checker
pub struct Comparator {
    differ: Box<dyn SchemaDiffer>,
    checker: Box<dyn CompatibilityChecker>,
}

impl Default for Comparator {
    fn default() -> Self {
        Self::new(
            Box::new(StructuralDiffer::default()),
            Box::new(BackwardCompatibilityChecker),
        )
    }
}

impl Comparator {
    pub fn new(differ: Box<dyn SchemaDiffer>, checker: Box<dyn CompatibilityChecker>) -> Self {
        Self { differ, checker }
    }

    /// Compare one CRD; `None` as revision means the CRD was removed
    pub fn compare_crds(
        &self,
        base: &Crd,
        revision: Option<&Crd>,
        options: &CompareOptions,
    ) -> Result<CrdDiff> {
        let Some(revision) = revision else {
            return Ok(CrdDiff::removed());
        };

        if base.identifier() != revision.identifier() {
            return Err(EngineError::IdentityMismatch {
                base: base.identifier(),
                revision: revision.identifier(),
            });
        }

        let mut result = CrdDiff::default();

        if base.scope() != revision.scope() {
            result.general.push(Change::breaking(format!(
                "changed scope from {:?} to {:?}",
                base.scope().to_string(),
                revision.scope().to_string()
            )));
        }

        let base_versions = base.versions().map_err(|source| EngineError::Versions {
            side: Side::Base,
            source,
        })?;
        let revision_versions = revision.versions().map_err(|source| EngineError::Versions {
            side: Side::Revision,
            source,
        })?;

        let matched = match_versions(&base_versions, &revision_versions, &options.versions);

        result.deleted_versions = matched.deleted;
        if !options.breaking_only {
            result.added_versions = matched.added;
        }

        for version in &matched.common {
            let diff = self.compare_version(base, revision, version, options)?;
            if diff.has_changes() {
                result.changed_versions.insert(version.clone(), diff);
            } else {
                tracing::debug!(crd = %base.identifier(), version = %version, "No changes in version");
            }
        }

        Ok(result)
    }

    fn compare_version(
        &self,
        base: &Crd,
        revision: &Crd,
        version: &str,
        options: &CompareOptions,
    ) -> Result<CrdVersionDiff> {
        tracing::debug!(
            crd = %base.identifier(),
            version = %version,
            differ = self.differ.name(),
            checker = self.checker.name(),
            "Comparing version"
        );

        let diff = self
            .differ
            .compare(base.schema(version), revision.schema(version))
            .map_err(|source| EngineError::Schema {
                version: version.to_string(),
                source,
            })?;

        let diff = match diff {
            Some(diff) if options.ignore_descriptions => {
                Some(diff.without_descriptions()).filter(|d| !d.is_empty())
            }
            other => other,
        };

        let Some(diff) = diff else {
            return Ok(CrdVersionDiff::default());
        };

        Ok(CrdVersionDiff {
            schema_changes: normalize::collect_schema_changes(&diff, options.normalize()),
            breaking_changes: breaking::correlate(self.checker.check(&diff, BREAKING_FLOOR)),
        })
    }

    /// Compare every CRD of the base snapshot against the revision
    pub fn compare_all(
        &self,
        base: &BTreeMap<String, Crd>,
        revision: &BTreeMap<String, Crd>,
        options: &CompareOptions,
    ) -> Result<Report> {
        let mut report = Report::default();

        for (identifier, base_crd) in base {
            tracing::debug!(crd = %identifier, "Comparing CRD");

            let diff = self
                .compare_crds(base_crd, revision.get(identifier), options)
                .map_err(|e| EngineError::Crd {
                    identifier: identifier.clone(),
                    source: Box::new(e),
                })?;

            if options.include_unchanged || diff.has_changes() {
                report.diffs.insert(identifier.clone(), diff);
            }
        }

        if options.include_added_crds && !options.breaking_only {
            for identifier in revision.keys().filter(|id| !base.contains_key(*id)) {
                report.diffs.insert(identifier.clone(), CrdDiff::added());
            }
        }

        Ok(report)
    }
}

/// Compare one CRD with the default differ and checker
pub fn compare_crds(base: &Crd, revision: Option<&Crd>, options: &CompareOptions) -> Result<CrdDiff> {
    Comparator::default().compare_crds(base, revision, options)
}

/// Compare two snapshots with the default differ and checker
pub fn compare_all(
    base: &BTreeMap<String, Crd>,
    revision: &BTreeMap<String, Crd>,
    options: &CompareOptions,
) -> Result<Report> {
    Comparator::default().compare_all(base, revision, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Finding;
    use crate::schemadiff::{DiffError, SchemaDiff};
    use crdiff_core::{CrdApiVersion, CrdParser, CrdScope, CrdVersion, JSONSchemaProps};
    use serde_json::json;

    fn schema(value: serde_json::Value) -> JSONSchemaProps {
        serde_json::from_value(value).unwrap()
    }

    fn widget(versions: Vec<(&str, serde_json::Value)>) -> Crd {
        Crd {
            name: "widgets.group.example.com".to_string(),
            group: "group.example.com".to_string(),
            kind: "Widget".to_string(),
            scope: CrdScope::Namespaced,
            api_version: CrdApiVersion::V1,
            versions: versions
                .into_iter()
                .map(|(name, s)| CrdVersion::new(name, Some(schema(s))))
                .collect(),
        }
    }

    fn spec_schema(required: &[&str], properties: serde_json::Value) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "spec": {
                    "type": "object",
                    "required": required,
                    "properties": properties,
                },
            },
        })
    }

    fn simple() -> serde_json::Value {
        spec_schema(&[], json!({"name": {"type": "string", "description": "name"}}))
    }

    #[test]
    fn test_unchanged_crd_is_empty() {
        let crd = widget(vec![("v1", simple())]);
        let diff = compare_crds(&crd, Some(&crd), &CompareOptions::default()).unwrap();
        assert!(!diff.has_changes());
        assert_eq!(diff, CrdDiff::default());
    }

    #[test]
    fn test_removed_crd() {
        let crd = widget(vec![("v1", simple())]);
        let diff = compare_crds(&crd, None, &CompareOptions::default()).unwrap();
        assert_eq!(diff.general, vec![Change::breaking("CRD has been removed")]);
        assert!(diff.changed_versions.is_empty());
    }

    #[test]
    fn test_added_version() {
        let base = widget(vec![("v1", simple())]);
        let revision = widget(vec![("v1", simple()), ("v2", simple())]);

        let diff = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap();
        assert_eq!(diff.added_versions.iter().collect::<Vec<_>>(), vec!["v2"]);
        assert!(diff.deleted_versions.is_empty());
        assert!(diff.changed_versions.is_empty());
        assert!(!diff.has_breaking_changes());

        let breaking_only = CompareOptions {
            breaking_only: true,
            ..Default::default()
        };
        let diff = compare_crds(&base, Some(&revision), &breaking_only).unwrap();
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_deleted_version_is_breaking() {
        let base = widget(vec![("v1", simple()), ("v1beta1", simple())]);
        let revision = widget(vec![("v1", simple())]);

        let diff = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap();
        assert_eq!(diff.deleted_versions.iter().collect::<Vec<_>>(), vec!["v1beta1"]);
        assert!(diff.has_breaking_changes());
    }

    #[test]
    fn test_scope_change_is_breaking() {
        let base = widget(vec![("v1", simple())]);
        let mut revision = base.clone();
        revision.scope = CrdScope::Cluster;

        let diff = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap();
        assert_eq!(
            diff.general,
            vec![Change::breaking(
                "changed scope from \"Namespaced\" to \"Cluster\""
            )]
        );
    }

    #[test]
    fn test_identity_mismatch_fails() {
        let base = widget(vec![("v1", simple())]);
        let mut revision = base.clone();
        revision.kind = "Gadget".to_string();

        let err = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::IdentityMismatch { .. }));
    }

    #[test]
    fn test_duplicate_versions_fail() {
        let base = widget(vec![("v1", simple()), ("v1", simple())]);
        let revision = widget(vec![("v1", simple())]);

        let err = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap_err();
        assert!(matches!(err, EngineError::Versions { side: Side::Base, .. }));
    }

    #[test]
    fn test_new_required_field() {
        let base = widget(vec![("v1", simple())]);
        let revision = widget(vec![(
            "v1",
            spec_schema(
                &["replicas"],
                json!({
                    "name": {"type": "string", "description": "name"},
                    "replicas": {"type": "integer"},
                }),
            ),
        )]);

        let diff = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap();
        let v1 = &diff.changed_versions["v1"];

        let spec = &v1.schema_changes[".spec"];
        assert_eq!(spec.added_properties.iter().collect::<Vec<_>>(), vec!["replicas"]);
        assert!(spec.diff.as_ref().unwrap().required.is_some());

        assert_eq!(v1.breaking_changes.len(), 1);
        assert_eq!(v1.breaking_changes[0].id, "new-required-request-property");
        assert_eq!(v1.breaking_changes[0].level, Level::Error);
    }

    #[test]
    fn test_description_only_changes() {
        let base = widget(vec![("v1", simple())]);
        let revision = widget(vec![(
            "v1",
            spec_schema(&[], json!({"name": {"type": "string", "description": "the name"}})),
        )]);

        let diff = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap();
        assert!(diff.has_changes());
        assert!(diff.changed_versions["v1"].schema_changes.contains_key(".spec.name"));

        let options = CompareOptions {
            ignore_descriptions: true,
            ..Default::default()
        };
        let diff = compare_crds(&base, Some(&revision), &options).unwrap();
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_description_only_changes_in_subschemas() {
        let with_descriptions = |not: &str, one_of: &str| {
            json!({
                "type": "object",
                "properties": {
                    "spec": {
                        "type": "object",
                        "not": {"description": not},
                        "oneOf": [{"description": one_of}],
                    },
                },
            })
        };
        let base = widget(vec![("v1", with_descriptions("a", "x"))]);
        let revision = widget(vec![("v1", with_descriptions("b", "y"))]);

        let diff = compare_crds(&base, Some(&revision), &CompareOptions::default()).unwrap();
        assert!(diff.has_changes());
        assert!(!diff.has_breaking_changes());
        assert!(diff.changed_versions["v1"].schema_changes.contains_key(".spec"));

        let options = CompareOptions {
            ignore_descriptions: true,
            ..Default::default()
        };
        let diff = compare_crds(&base, Some(&revision), &options).unwrap();
        assert!(!diff.has_changes());
        assert!(!diff.has_breaking_changes());
    }

    #[test]
    fn test_version_allow_list() {
        let base = widget(vec![("v1", simple()), ("v1beta1", simple())]);
        let revision = widget(vec![("v1", simple()), ("v2", simple())]);

        let options = CompareOptions {
            versions: vec!["v1".to_string()],
            ..Default::default()
        };
        let diff = compare_crds(&base, Some(&revision), &options).unwrap();
        assert!(!diff.has_changes());
    }

    #[test]
    fn test_compare_all() {
        let yaml = |kind: &str| {
            format!(
                "apiVersion: apiextensions.k8s.io/v1\nkind: CustomResourceDefinition\n\
                 metadata:\n  name: {kind}s.example.com\nspec:\n  group: example.com\n  \
                 names:\n    kind: {kind}\n    plural: {kind}s\n  scope: Namespaced\n  \
                 versions:\n    - name: v1\n      served: true\n      storage: true\n"
            )
        };
        let parse = |kind: &str| CrdParser::parse(&yaml(kind)).unwrap().unwrap();

        let base = BTreeMap::from([
            ("example.com/Gone".to_string(), parse("Gone")),
            ("example.com/Same".to_string(), parse("Same")),
        ]);
        let revision = BTreeMap::from([
            ("example.com/Same".to_string(), parse("Same")),
            ("example.com/New".to_string(), parse("New")),
        ]);

        let report = compare_all(&base, &revision, &CompareOptions::default()).unwrap();
        assert_eq!(report.diffs.keys().collect::<Vec<_>>(), vec!["example.com/Gone"]);

        let options = CompareOptions {
            include_unchanged: true,
            include_added_crds: true,
            ..Default::default()
        };
        let report = compare_all(&base, &revision, &options).unwrap();
        assert_eq!(
            report.diffs.keys().collect::<Vec<_>>(),
            vec!["example.com/Gone", "example.com/New", "example.com/Same"]
        );
        assert_eq!(report.diffs["example.com/New"], CrdDiff::added());
        assert!(!report.diffs["example.com/Same"].has_changes());
    }

    struct FailingDiffer;

    impl SchemaDiffer for FailingDiffer {
        fn compare(
            &self,
            _: Option<&JSONSchemaProps>,
            _: Option<&JSONSchemaProps>,
        ) -> std::result::Result<Option<SchemaDiff>, DiffError> {
            Err(DiffError::TooDeep {
                path: ".".to_string(),
                limit: 0,
            })
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    struct SilentChecker;

    impl CompatibilityChecker for SilentChecker {
        fn check(&self, _: &SchemaDiff, _: Level) -> Vec<Finding> {
            Vec::new()
        }

        fn name(&self) -> &'static str {
            "silent"
        }
    }

    #[test]
    fn test_differ_errors_carry_context() {
        let comparator = Comparator::new(Box::new(FailingDiffer), Box::new(SilentChecker));
        let crd = widget(vec![("v1", simple())]);
        let snapshot = BTreeMap::from([(crd.identifier(), crd)]);

        let err = comparator
            .compare_all(&snapshot, &snapshot, &CompareOptions::default())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "failed comparing group.example.com/Widget: failed comparing version v1: \
             schema nesting at . exceeds the limit of 0 levels"
        );
    }
}
