//! Matching versions between base and revision

use std::collections::BTreeSet;

/// Versions of one CRD split by where they occur
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VersionMatch {
    /// Only in the base
    pub deleted: BTreeSet<String>,
    /// Only in the revision
    pub added: BTreeSet<String>,
    /// In both snapshots
    pub common: BTreeSet<String>,
}

/// Split the version sets of base and revision
///
/// A non-empty `allow` list restricts both sides to the listed versions
/// before matching.
pub fn match_versions(
    base: &BTreeSet<String>,
    revision: &BTreeSet<String>,
    allow: &[String],
) -> VersionMatch {
    let restrict = |versions: &BTreeSet<String>| -> BTreeSet<String> {
        versions
            .iter()
            .filter(|v| allow.is_empty() || allow.contains(v))
            .cloned()
            .collect()
    };

    let base = restrict(base);
    let revision = restrict(revision);

    VersionMatch {
        deleted: base.difference(&revision).cloned().collect(),
        added: revision.difference(&base).cloned().collect(),
        common: base.intersection(&revision).cloned().collect(),
    }
}
