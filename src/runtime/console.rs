use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::clients::RoleClient;
use crate::framework::{EditorContext, EditorError};
use crate::gateway::{Gateway, GatewayError, HttpGateway};
use crate::model::Role;
use crate::role_editor;
use crate::runtime::{ConsoleConfig, ErrorChannel};

/// The runtime orchestrator for detail editors.
///
/// `Console` is responsible for:
/// - **Dependency Wiring**: Every editor it opens gets the same gateway,
///   error channel and configuration snapshot
/// - **Lifecycle Management**: Spawning editors and shutting them down
///
/// # Example
///
/// ```ignore
/// let console = Console::connect(config)?;
/// let editor = console.open_role(2);
///
/// editor.client.wait_loaded(timeout).await?;
/// editor.client.set_name("auditor").await?;
/// editor.client.save().await?;
///
/// editor.shutdown().await?;
/// ```
pub struct Console {
    config: ConsoleConfig,
    errors: ErrorChannel,
    roles: Arc<dyn Gateway<Role>>,
}

/// A running Role editor.
pub struct RoleEditor {
    pub client: RoleClient,
    handle: JoinHandle<()>,
}

impl Console {
    /// Creates a console over an existing gateway.
    pub fn new(config: ConsoleConfig, roles: Arc<dyn Gateway<Role>>) -> Self {
        Self {
            config,
            errors: ErrorChannel::new(),
            roles,
        }
    }

    /// Creates a console talking to the configured identity server.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Transport`] when the HTTP client cannot be built.
    pub fn connect(config: ConsoleConfig) -> Result<Self, GatewayError> {
        let roles = HttpGateway::<Role>::new(&config)?;
        info!(base = roles.base(), "Console connected");
        Ok(Self::new(config, Arc::new(roles)))
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    /// The error banner shared by every editor this console opens.
    pub fn errors(&self) -> &ErrorChannel {
        &self.errors
    }

    /// Opens an editor for role `id` and starts loading it.
    pub fn open_role(&self, id: i64) -> RoleEditor {
        let (actor, client) = role_editor::new(id, self.config.mailbox_size);
        let ctx = EditorContext {
            gateway: Arc::clone(&self.roles),
            errors: Arc::new(self.errors.clone()),
            config: self.config.clone(),
        };
        let handle = tokio::spawn(actor.run(ctx));
        RoleEditor { client, handle }
    }
}

impl RoleEditor {
    /// Tears the editor down and waits for its task to finish.
    ///
    /// In-flight gateway calls are aborted; their results are never applied.
    ///
    /// # Errors
    ///
    /// Returns [`EditorError::TaskFailed`] if the editor task panicked.
    pub async fn shutdown(self) -> Result<(), EditorError> {
        let id = self.client.id();
        // The editor may already have stopped on its own (e.g. after a delete).
        let _ = self.client.teardown().await;
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!(role_id = id, error = %e, "Editor task failed");
            return Err(EditorError::TaskFailed(e.to_string()));
        }
        info!(role_id = id, "Editor shut down");
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
