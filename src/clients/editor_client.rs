use crate::framework::{DetailClient, EditorError, ResourceEntity, SaveOutcome};
use async_trait::async_trait;

/// Trait for resource-specific editor clients to inherit the standard intents.
///
/// This trait reduces boilerplate by providing default implementations for
/// the intents every detail editor accepts.
#[async_trait]
pub trait EditorClient<T: ResourceEntity>: Send + Sync {
    /// The resource-specific error type.
    type Error: Send + Sync;

    /// Access the inner generic DetailClient.
    fn inner(&self) -> &DetailClient<T>;

    /// Map editor errors to the specific resource error type.
    fn map_error(e: EditorError) -> Self::Error;

    /// Validate the draft and, if valid, submit it.
    #[tracing::instrument(skip(self))]
    async fn save(&self) -> Result<SaveOutcome, Self::Error> {
        tracing::debug!(intent = "save", "Sending intent");
        self.inner().save().await.map_err(Self::map_error)
    }

    /// Open the delete confirmation. Sends no request.
    #[tracing::instrument(skip(self))]
    async fn delete(&self) -> Result<bool, Self::Error> {
        tracing::debug!(intent = "delete", "Sending intent");
        self.inner().delete().await.map_err(Self::map_error)
    }

    /// Confirm a pending delete.
    #[tracing::instrument(skip(self))]
    async fn confirm(&self) -> Result<bool, Self::Error> {
        tracing::debug!(intent = "confirm", "Sending intent");
        self.inner().confirm().await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn cancel(&self) -> Result<bool, Self::Error> {
        tracing::debug!(intent = "cancel", "Sending intent");
        self.inner().cancel().await.map_err(Self::map_error)
    }

    #[tracing::instrument(skip(self))]
    async fn reload(&self) -> Result<bool, Self::Error> {
        tracing::debug!(intent = "reload", "Sending intent");
        self.inner().reload().await.map_err(Self::map_error)
    }
}
