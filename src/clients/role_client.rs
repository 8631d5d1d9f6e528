use crate::clients::editor_client::EditorClient;
use crate::framework::{DetailClient, EditorError, Snapshot, ViewState};
use crate::model::Role;
use crate::role_editor::RoleError;
use crate::runtime::ConsoleConfig;
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Client for driving one Role editor.
#[derive(Clone)]
pub struct RoleClient {
    id: i64,
    inner: DetailClient<Role>,
}

impl RoleClient {
    pub fn new(id: i64, inner: DetailClient<Role>) -> Self {
        Self { id, inner }
    }

    /// Id of the role this editor was opened for.
    pub fn id(&self) -> i64 {
        self.id
    }
}

#[async_trait]
impl EditorClient<Role> for RoleClient {
    type Error = RoleError;

    fn inner(&self) -> &DetailClient<Role> {
        &self.inner
    }

    fn map_error(e: EditorError) -> Self::Error {
        RoleError::Editor(e)
    }
}

impl RoleClient {
    #[instrument(skip(self), fields(role_id = self.id))]
    pub async fn set_name(&self, name: &str) -> Result<bool, RoleError> {
        debug!(intent = "change_field", field = "name", "Sending intent");
        Ok(self.inner.change_field("name", name).await?)
    }

    #[instrument(skip(self), fields(role_id = self.id))]
    pub async fn set_note(&self, note: &str) -> Result<bool, RoleError> {
        debug!(intent = "change_field", field = "note", "Sending intent");
        Ok(self.inner.change_field("note", note).await?)
    }

    /// Waits for the initial read to settle, giving up after `timeout`.
    pub async fn wait_loaded(&self, timeout: Duration) -> Result<Snapshot<Role>, RoleError> {
        tokio::time::timeout(timeout, self.inner.wait_loaded())
            .await
            .map_err(|_| RoleError::Timeout(self.id))?
            .map_err(RoleError::from)
    }

    /// Waits until no save or delete is in flight, giving up after `timeout`.
    pub async fn wait_settled(&self, timeout: Duration) -> Result<Snapshot<Role>, RoleError> {
        let settled = self.inner.wait_until(|snapshot| match snapshot.ready() {
            Some(ready) => !ready.is_saving && !ready.is_deleting(),
            None => true,
        });
        tokio::time::timeout(timeout, settled)
            .await
            .map_err(|_| RoleError::Timeout(self.id))?
            .map_err(RoleError::from)
    }

    pub fn snapshot(&self) -> Snapshot<Role> {
        self.inner.snapshot()
    }

    pub fn view(&self, config: &ConsoleConfig) -> ViewState {
        ViewState::render(&self.inner.snapshot(), config)
    }

    #[instrument(skip(self), fields(role_id = self.id))]
    pub async fn teardown(&self) -> Result<(), RoleError> {
        debug!(intent = "teardown", "Sending intent");
        Ok(self.inner.teardown().await?)
    }
}
