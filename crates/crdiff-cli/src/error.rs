//! CLI error types with exit code handling
//!
//! Every failure of a command ends up as a [`CliError`], which knows the
//! exit code the process should terminate with.

use crdiff_core::CoreError;
use crdiff_engine::EngineError;
use miette::Diagnostic;
use thiserror::Error;

use crate::exit_codes;

/// CLI-specific error type that includes exit code information
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// Loading CRDs from a source failed
    #[error("Failed to load {side} CRDs")]
    #[diagnostic(
        code(crdiff::cli::load),
        help("sources must be CRD files or directories containing them")
    )]
    Load {
        side: &'static str,
        #[source]
        source: CoreError,
    },

    /// Comparing the snapshots failed
    #[error("Comparison failed")]
    #[diagnostic(code(crdiff::cli::compare))]
    Compare {
        #[source]
        source: EngineError,
    },

    /// Invalid combination of arguments
    #[error("Invalid flags: {message}")]
    #[diagnostic(code(crdiff::cli::usage))]
    Usage { message: String },

    /// Writing the output failed
    #[error("Failed to write output: {message}")]
    #[diagnostic(code(crdiff::cli::output))]
    Output { message: String },
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Load { .. } => exit_codes::LOAD_ERROR,
            CliError::Compare { .. } => exit_codes::COMPARE_ERROR,
            CliError::Usage { .. } => exit_codes::USAGE_ERROR,
            CliError::Output { .. } => exit_codes::ERROR,
        }
    }

    pub fn load(side: &'static str, source: CoreError) -> Self {
        Self::Load { side, source }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }
}

impl From<EngineError> for CliError {
    fn from(source: EngineError) -> Self {
        match source {
            EngineError::Encode(e) => CliError::Output {
                message: e.to_string(),
            },
            source => CliError::Compare { source },
        }
    }
}

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let load = CliError::load("base", CoreError::DuplicateIdentifier("a/B".to_string()));
        assert_eq!(load.exit_code(), exit_codes::LOAD_ERROR);
        assert_eq!(load.to_string(), "Failed to load base CRDs");
        assert_eq!(
            std::error::Error::source(&load).map(ToString::to_string),
            Some("found multiple definitions of a/B".to_string())
        );

        let compare = CliError::from(EngineError::IdentityMismatch {
            base: "a/B".to_string(),
            revision: "c/D".to_string(),
        });
        assert_eq!(compare.exit_code(), exit_codes::COMPARE_ERROR);

        assert_eq!(CliError::usage("nope").exit_code(), exit_codes::USAGE_ERROR);
    }

    #[test]
    fn test_encode_failure_is_output_error() {
        let encode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CliError::from(EngineError::Encode(encode));
        assert!(matches!(err, CliError::Output { .. }));
        assert_eq!(err.exit_code(), exit_codes::ERROR);
    }
}
