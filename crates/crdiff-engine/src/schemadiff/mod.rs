//! Structural schema differencing
//!
//! A [`SchemaDiffer`] turns two schema trees into a [`SchemaDiff`] tree.
//! The engine only depends on the trait; [`StructuralDiffer`] is the
//! default implementation.

mod differ;
mod types;

pub use differ::{DEFAULT_MAX_DEPTH, StructuralDiffer};
pub use types::{
    EnumDiff, ExtensionsDiff, SchemaDiff, SchemasDiff, StringsDiff, SubschemasDiff, ValueDiff,
};

pub use crate::error::DiffError;

use crdiff_core::JSONSchemaProps;

/// Computes the structural diff of two schema trees
pub trait SchemaDiffer: Send + Sync {
    /// Compare two schemas; an absent schema compares as an empty one
    ///
    /// Returns `Ok(None)` if the schemas are equivalent.
    fn compare(
        &self,
        base: Option<&JSONSchemaProps>,
        revision: Option<&JSONSchemaProps>,
    ) -> Result<Option<SchemaDiff>, DiffError>;

    /// Name of this differ, for logging
    fn name(&self) -> &'static str;
}
