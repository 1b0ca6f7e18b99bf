//! CRD (CustomResourceDefinition) model
//!
//! - **Model** (`model`): format-independent CRD representation
//! - **Parsing** (`parser`): decode v1 and legacy v1beta1 documents into the model

mod model;
mod parser;

pub use model::{Crd, CrdApiVersion, CrdScope, CrdVersion};
pub use parser::CrdParser;
