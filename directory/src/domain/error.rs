//! Error types surfaced by the domain services.

use thiserror::Error;

use super::canonical::CanonicalError;
use super::ports::{EmployeeDirectoryError, MirrorError, SkillServiceError};

/// Failures raised by edit-session operations.
///
/// Only mirror writes and canonical encoding can fail. Degraded mirror reads
/// are logged and treated as an absent entry instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The persistent mirror rejected a write or removal.
    #[error(transparent)]
    Mirror(#[from] MirrorError),
    /// A record could not be put into canonical form.
    #[error(transparent)]
    Canonical(#[from] CanonicalError),
}

/// An operation needed a saved employee but the record carried no id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("employee record has no id")]
pub struct MissingEmployeeId;

/// Failures raised by remote directory workflows.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// The employee directory port failed.
    #[error(transparent)]
    Employees(#[from] EmployeeDirectoryError),
    /// The skill service port failed.
    #[error(transparent)]
    Skills(#[from] SkillServiceError),
    /// The workflow was asked to act on an unsaved record.
    #[error(transparent)]
    MissingEmployeeId(#[from] MissingEmployeeId),
    /// Local session bookkeeping failed after the remote call.
    #[error(transparent)]
    Session(#[from] SessionError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_errors_keep_their_message() {
        let error = DirectoryError::from(EmployeeDirectoryError::not_found("AB1234"));
        assert_eq!(error.to_string(), "employee not found: AB1234");

        let error = SessionError::from(MirrorError::unavailable("quota"));
        assert_eq!(error.to_string(), "persistent mirror unavailable: quota");
    }
}
