use desktop_kernel_contract::{ApplicationId, WindowId};
use thiserror::Error;

use crate::reducer::Transition;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors surfaced to kernel callers.
///
/// Operations on unknown window ids are not errors; they are ignored and logged.
pub enum KernelError {
    /// A capability flag forbids the requested transition.
    #[error("{window_id} does not support {transition}")]
    UnsupportedTransition {
        /// Target window.
        window_id: WindowId,
        /// Rejected transition.
        transition: Transition,
    },
    /// The application registry has no entry for the id.
    #[error("no window configuration registered for `{application_id}`")]
    ConfigMissing {
        /// Unregistered application.
        application_id: ApplicationId,
    },
    /// A configuration document failed to parse or validate.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
