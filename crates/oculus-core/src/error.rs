//! Error types for oculus.

use miette::Diagnostic;
use smol_str::SmolStr;

use crate::host::PlatformError;

/// Main error type for mirroring operations.
#[derive(thiserror::Error, Debug, Diagnostic)]
pub enum OculusError {
    /// Requested strategy name is not in the registry.
    #[error("handler with name '{name}' not found (element: {element})")]
    #[diagnostic(
        code(oculus::handler_not_found),
        help("register the handler before the element is scanned, or fix its handler list")
    )]
    HandlerNotFound { name: SmolStr, element: String },

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(oculus::invalid_config))]
    InvalidConfig(String),

    /// A host operation failed while installing a strategy.
    #[error(transparent)]
    #[diagnostic(code(oculus::host))]
    Host(#[from] PlatformError),
}

impl OculusError {
    pub fn is_handler_not_found(&self) -> bool {
        matches!(self, OculusError::HandlerNotFound { .. })
    }
}
