//! crdiff-engine - CRD comparison engine
//!
//! This crate compares two snapshots of CustomResourceDefinitions:
//! - Structural schema diffing behind the [`SchemaDiffer`] trait
//! - Breaking change detection behind the [`CompatibilityChecker`] trait
//! - Path-keyed per-version change reports
//! - Text and JSON rendering of the final [`Report`]

pub mod checker;
pub mod compare;
pub mod error;
pub mod path;
pub mod report;
pub mod schemadiff;

pub use checker::{BackwardCompatibilityChecker, CompatibilityChecker, Finding, FindingMessage, Level};
pub use compare::{
    BreakingChange, BreakingChangeDetails, Change, ChangeSet, CompareOptions, Comparator, CrdDiff,
    CrdSchemaDiff, CrdVersionDiff, compare_all, compare_crds,
};
pub use error::{DiffError, EngineError, Result, Side};
pub use report::{Report, TextRenderOptions, render_text};
pub use schemadiff::{SchemaDiff, SchemaDiffer, StructuralDiffer};
