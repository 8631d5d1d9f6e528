//! # Resource Gateway
//!
//! The boundary between an editor and the identity server.
//!
//! The controller only ever talks to a [`Gateway`]. [`HttpGateway`] speaks the
//! server's REST API; [`crate::framework::mock::MockGateway`] scripts responses
//! for tests.

pub mod http;

pub use http::*;

use async_trait::async_trait;
use thiserror::Error;

use crate::framework::ResourceEntity;

/// Which association list to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssociationScope<Id> {
    /// Entries attached to the resource itself.
    Members(Id),
    /// Every entry in the directory.
    All,
    /// Entries belonging to one organization.
    Org(i64),
}

/// Structured gateway failures.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// The resource does not exist. Read-one maps this to `None`.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The server refused the payload (HTTP 400).
    #[error("Rejected by server: {0}")]
    ValidationRejected(String),

    /// The resource still has dependents (HTTP 409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Network failure or unexpected server response.
    #[error("Transport error: {0}")]
    Transport(String),
}

/// Remote operations consumed by the detail controller.
///
/// Every call is independent; the controller may abandon any of them at
/// teardown, so implementations must not rely on being polled to completion.
#[async_trait]
pub trait Gateway<T: ResourceEntity>: Send + Sync {
    /// Fetches one record. `Ok(None)` when the server has no such record.
    async fn read_one(&self, id: T::Id) -> Result<Option<T>, GatewayError>;

    /// Fetches an association list shown alongside the editor.
    async fn read_associated(
        &self,
        scope: AssociationScope<T::Id>,
    ) -> Result<Vec<T::Associated>, GatewayError>;

    /// Persists the draft and returns the server's record.
    async fn update(&self, id: T::Id, draft: T::Draft) -> Result<T, GatewayError>;

    async fn delete(&self, id: T::Id) -> Result<(), GatewayError>;
}
