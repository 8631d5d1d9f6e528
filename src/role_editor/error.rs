//! Error types for the Role editor.

use thiserror::Error;

use crate::framework::EditorError;

/// Errors returned by [`RoleClient`](crate::clients::RoleClient).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RoleError {
    /// The editor rejected or never received the intent.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// The editor did not reach the expected state in time.
    #[error("Timed out waiting for role {0}")]
    Timeout(i64),
}
