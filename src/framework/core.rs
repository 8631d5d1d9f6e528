//! # Detail Controller
//!
//! This module defines the generic building blocks of a single-resource editor.
//!
//! ## Key Types
//!
//! - [`ResourceEntity`]: The trait every editable resource implements.
//! - [`EditDraft`]: The locally mutable copy of a resource's editable fields.
//! - [`DetailActor`]: The state machine, run as one Tokio task per editor instance.
//! - [`DetailClient`]: The handle the rendering layer uses to send intents.
//! - [`EditorError`]: Plumbing errors (editor closed, unknown field).

use std::fmt::{Debug, Display};
use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::confirm::Confirmed;
use crate::framework::state::{DetailState, ReadyState, Snapshot};
use crate::gateway::{AssociationScope, Gateway, GatewayError};
use crate::runtime::{ConsoleConfig, ErrorReporter};
use crate::validation::{validate, FieldErrors, Rule};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// The editable fields of a resource, addressed by name.
///
/// Field names are what the rendering layer sends with a field-change intent and
/// what validation tables refer to.
pub trait EditDraft: Clone + PartialEq + Send + Sync + Debug + 'static {
    /// Every editable field, in display order.
    const FIELDS: &'static [&'static str];

    fn field(&self, name: &str) -> Option<&str>;

    fn field_mut(&mut self, name: &str) -> Option<&mut String>;
}

/// Entries of the read-only association lists shown next to the editor.
pub trait Labeled {
    /// Display label. `with_names` mirrors the console's `enable_names` flag.
    fn label(&self, with_names: bool) -> String;
}

/// Trait that any resource must implement to be edited by a [`DetailActor`].
///
/// # Architecture Note
/// The controller logic is written once against this contract and reused for
/// roles, scopes, orgs and the rest. Associated types keep each resource's
/// draft and association entries distinct at compile time.
pub trait ResourceEntity: Clone + Send + Sync + Debug + 'static {
    /// Server-assigned identifier. Never changes for the lifetime of an editor.
    type Id: Copy + Eq + Hash + Send + Sync + Display + Debug + 'static;

    /// The mutable subset of the record.
    type Draft: EditDraft;

    /// Entries of the association lists (e.g. users holding a role).
    type Associated: Labeled + Clone + Send + Sync + Debug + 'static;

    /// Short resource name used in logs.
    const KIND: &'static str;

    fn id(&self) -> Self::Id;

    /// The editable fields of this record; the clean baseline of a draft.
    fn draft(&self) -> Self::Draft;

    /// Validation table run against the draft on save.
    fn rules() -> &'static [Rule];
}

// =============================================================================
// 2. MESSAGES & ERRORS
// =============================================================================

/// Errors raised by the controller plumbing itself.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum EditorError {
    #[error("Editor closed")]
    ControllerClosed,
    #[error("Editor dropped response channel")]
    ControllerDropped,
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Editor task failed: {0}")]
    TaskFailed(String),
}

/// Type alias for the one-shot response channel used by the controller.
pub type Response<T> = oneshot::Sender<Result<T, EditorError>>;

/// What happened to a save intent.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The update request is in flight.
    Submitted,
    /// Local validation failed; nothing was sent.
    Invalid(FieldErrors),
    /// Guard failed: nothing to save, a save is already running, or no record.
    Ignored,
}

/// User intents, emitted by the rendering layer.
///
/// The `bool` responses report whether the intent changed anything.
#[derive(Debug)]
pub enum Intent {
    ChangeField {
        field: String,
        value: String,
        respond_to: Response<bool>,
    },
    Save {
        respond_to: Response<SaveOutcome>,
    },
    Delete {
        respond_to: Response<bool>,
    },
    Cancel {
        respond_to: Response<bool>,
    },
    Confirm {
        respond_to: Response<bool>,
    },
    Reload {
        respond_to: Response<bool>,
    },
    Teardown {
        respond_to: Response<()>,
    },
}

/// Which association list a read feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssociationList {
    Members,
    Directory,
}

/// Results of gateway calls, fed back into the loop.
enum Settlement<T: ResourceEntity> {
    Loaded {
        generation: u64,
        result: Result<Option<T>, GatewayError>,
    },
    Associated {
        generation: u64,
        list: AssociationList,
        result: Result<Vec<T::Associated>, GatewayError>,
    },
    Saved(Result<T, GatewayError>),
    Deleted {
        ticket: Confirmed,
        result: Result<(), GatewayError>,
    },
}

/// Dependencies injected into a running editor.
///
/// Passed to [`DetailActor::run`] rather than `new` so the host can wire the
/// gateway and error channel after the editor handle exists.
pub struct EditorContext<T: ResourceEntity> {
    pub gateway: Arc<dyn Gateway<T>>,
    pub errors: Arc<dyn ErrorReporter>,
    pub config: ConsoleConfig,
}

impl<T: ResourceEntity> Clone for EditorContext<T> {
    fn clone(&self) -> Self {
        Self {
            gateway: Arc::clone(&self.gateway),
            errors: Arc::clone(&self.errors),
            config: self.config.clone(),
        }
    }
}

// =============================================================================
// 3. THE CONTROLLER
// =============================================================================

/// The state machine behind one editor instance.
///
/// # Concurrency Model
/// The actor owns its record, draft and errors exclusively and applies one
/// intent or settlement at a time. Gateway calls run in a [`JoinSet`] owned by
/// the actor, so the loop keeps accepting intents while they are in flight.
/// When the loop ends the `JoinSet` is dropped, which aborts every call still
/// running: a settlement arriving after teardown is never applied.
pub struct DetailActor<T: ResourceEntity> {
    id: T::Id,
    receiver: mpsc::Receiver<Intent>,
    publisher: watch::Sender<Snapshot<T>>,
    snapshot: Snapshot<T>,
    tasks: JoinSet<Settlement<T>>,
    generation: u64,
}

impl<T: ResourceEntity> DetailActor<T> {
    pub fn new(id: T::Id, mailbox_size: usize) -> (Self, DetailClient<T>) {
        let (sender, receiver) = mpsc::channel(mailbox_size.max(1));
        let (publisher, snapshots) = watch::channel(Snapshot::loading());
        let actor = Self {
            id,
            receiver,
            publisher,
            snapshot: Snapshot::loading(),
            tasks: JoinSet::new(),
            generation: 0,
        };
        (actor, DetailClient::new(sender, snapshots))
    }

    /// Runs the editor until it is torn down, every client is dropped, or the
    /// resource is deleted.
    pub async fn run(mut self, ctx: EditorContext<T>) {
        let kind = T::KIND;
        let id = self.id;
        info!(kind, %id, "Editor started");

        self.issue_reads(&ctx);
        self.publish();

        loop {
            tokio::select! {
                intent = self.receiver.recv() => match intent {
                    Some(Intent::Teardown { respond_to }) => {
                        let _ = respond_to.send(Ok(()));
                        break;
                    }
                    Some(intent) => self.handle_intent(intent, &ctx),
                    None => break,
                },
                Some(joined) = self.tasks.join_next(), if !self.tasks.is_empty() => {
                    match joined {
                        Ok(settlement) => self.apply(settlement, &ctx),
                        Err(e) => warn!(kind, %id, error = %e, "Gateway task failed"),
                    }
                    self.publish();
                }
            }
            if matches!(self.snapshot.state, DetailState::Closed) {
                break;
            }
        }

        let in_flight = self.tasks.len();
        self.tasks.abort_all();
        info!(kind, %id, in_flight, "Editor torn down");
    }

    fn publish(&self) {
        self.publisher.send_replace(self.snapshot.clone());
    }

    /// Publishes the new state before answering, so a caller that awaits the
    /// response never observes the state from before its intent.
    fn reply<R>(&self, respond_to: Response<R>, value: Result<R, EditorError>) {
        self.publish();
        let _ = respond_to.send(value);
    }

    fn handle_intent(&mut self, intent: Intent, ctx: &EditorContext<T>) {
        match intent {
            Intent::ChangeField {
                field,
                value,
                respond_to,
            } => {
                let result = self.change_field(&field, value);
                self.reply(respond_to, result);
            }
            Intent::Save { respond_to } => {
                let outcome = self.save(ctx);
                self.reply(respond_to, Ok(outcome));
            }
            Intent::Delete { respond_to } => {
                let moved = self.request_delete();
                self.reply(respond_to, Ok(moved));
            }
            Intent::Cancel { respond_to } => {
                let moved = self.cancel_delete();
                self.reply(respond_to, Ok(moved));
            }
            Intent::Confirm { respond_to } => {
                let moved = self.confirm_delete(ctx);
                self.reply(respond_to, Ok(moved));
            }
            Intent::Reload { respond_to } => {
                let issued = self.reload(ctx);
                self.reply(respond_to, Ok(issued));
            }
            Intent::Teardown { respond_to } => {
                let _ = respond_to.send(Ok(()));
            }
        }
    }

    // --- Intents ---

    fn change_field(&mut self, field: &str, value: String) -> Result<bool, EditorError> {
        if !T::Draft::FIELDS.contains(&field) {
            return Err(EditorError::UnknownField(field.to_string()));
        }
        let DetailState::Ready(ready) = &mut self.snapshot.state else {
            debug!(kind = T::KIND, field, "Field change ignored, no record");
            return Ok(false);
        };
        if let Some(slot) = ready.draft.field_mut(field) {
            *slot = value;
        }
        ready.field_errors.clear(field);
        debug!(kind = T::KIND, id = %self.id, field, dirty = ready.is_dirty(), "Field changed");
        Ok(true)
    }

    fn save(&mut self, ctx: &EditorContext<T>) -> SaveOutcome {
        let id = self.id;
        let DetailState::Ready(ready) = &mut self.snapshot.state else {
            return SaveOutcome::Ignored;
        };
        if !ready.can_save() {
            debug!(kind = T::KIND, %id, saving = ready.is_saving, "Save ignored");
            return SaveOutcome::Ignored;
        }

        let errors = validate(&ready.draft, T::rules());
        if !errors.is_empty() {
            debug!(kind = T::KIND, %id, %errors, "Save blocked by field errors");
            ready.field_errors = errors.clone();
            return SaveOutcome::Invalid(errors);
        }

        ready.field_errors = FieldErrors::default();
        ready.is_saving = true;
        let draft = ready.draft.clone();
        debug!(kind = T::KIND, %id, ?draft, "Update");

        let gateway = Arc::clone(&ctx.gateway);
        self.tasks
            .spawn(async move { Settlement::Saved(gateway.update(id, draft).await) });
        SaveOutcome::Submitted
    }

    fn request_delete(&mut self) -> bool {
        match &mut self.snapshot.state {
            DetailState::Ready(ready) => ready.gate.request(),
            _ => false,
        }
    }

    fn cancel_delete(&mut self) -> bool {
        match &mut self.snapshot.state {
            DetailState::Ready(ready) => ready.gate.cancel(),
            _ => false,
        }
    }

    fn confirm_delete(&mut self, ctx: &EditorContext<T>) -> bool {
        let id = self.id;
        let DetailState::Ready(ready) = &mut self.snapshot.state else {
            return false;
        };
        let Some(ticket) = ready.gate.confirm() else {
            return false;
        };
        debug!(kind = T::KIND, %id, "Delete");

        let gateway = Arc::clone(&ctx.gateway);
        self.tasks.spawn(async move {
            let result = gateway.delete(id).await;
            Settlement::Deleted { ticket, result }
        });
        true
    }

    fn reload(&mut self, ctx: &EditorContext<T>) -> bool {
        match &self.snapshot.state {
            DetailState::Ready(ready) if ready.is_saving || ready.gate.is_executing() => {
                return false;
            }
            DetailState::Closed => return false,
            DetailState::Empty => self.snapshot.state = DetailState::Loading,
            _ => {}
        }
        self.issue_reads(ctx);
        true
    }

    /// Issues read-one and both association reads concurrently. Earlier reads
    /// still in flight become stale and are discarded when they settle.
    fn issue_reads(&mut self, ctx: &EditorContext<T>) {
        self.generation += 1;
        let generation = self.generation;
        let id = self.id;

        let gateway = Arc::clone(&ctx.gateway);
        self.tasks.spawn(async move {
            let result = gateway.read_one(id).await;
            Settlement::Loaded { generation, result }
        });

        let directory = match ctx.config.operator_org {
            Some(org) => AssociationScope::Org(org),
            None => AssociationScope::All,
        };
        for (list, scope) in [
            (AssociationList::Members, AssociationScope::Members(id)),
            (AssociationList::Directory, directory),
        ] {
            let gateway = Arc::clone(&ctx.gateway);
            self.tasks.spawn(async move {
                let result = gateway.read_associated(scope).await;
                Settlement::Associated {
                    generation,
                    list,
                    result,
                }
            });
        }
    }

    // --- Settlements ---

    fn apply(&mut self, settlement: Settlement<T>, ctx: &EditorContext<T>) {
        match settlement {
            Settlement::Loaded { generation, .. } | Settlement::Associated { generation, .. }
                if generation != self.generation =>
            {
                debug!(kind = T::KIND, id = %self.id, generation, "Stale read discarded");
            }
            Settlement::Loaded { result, .. } => self.on_loaded(result, ctx),
            Settlement::Associated { list, result, .. } => self.on_associated(list, result),
            Settlement::Saved(result) => self.on_saved(result, ctx),
            Settlement::Deleted { ticket, result } => self.on_deleted(ticket, result, ctx),
        }
    }

    fn on_loaded(&mut self, result: Result<Option<T>, GatewayError>, ctx: &EditorContext<T>) {
        let kind = T::KIND;
        let id = self.id;
        match result {
            Ok(Some(record)) if record.id() != id => {
                let error = GatewayError::Transport(format!(
                    "read returned {kind} {} for {id}",
                    record.id()
                ));
                warn!(kind, %id, error = %error, "Read failed");
                ctx.errors.report(error.to_string());
            }
            Ok(Some(record)) => match &mut self.snapshot.state {
                // A reload never resets an in-flight save, the gate, or unsaved edits.
                DetailState::Ready(ready) if ready.is_saving || ready.is_dirty() => {
                    debug!(kind, %id, saving = ready.is_saving, "Reloaded, draft kept");
                    ready.record = record;
                }
                DetailState::Ready(ready) => {
                    info!(kind, %id, "Reloaded");
                    ready.rebase(record);
                }
                state => {
                    info!(kind, %id, "Loaded");
                    *state = DetailState::Ready(ReadyState::new(record, Default::default()));
                }
            },
            Ok(None) | Err(GatewayError::NotFound(_))
                if self
                    .snapshot
                    .ready()
                    .is_some_and(|ready| ready.is_saving || ready.is_deleting()) =>
            {
                warn!(kind, %id, "Reload found no record while a mutation is in flight, kept");
            }
            Ok(None) | Err(GatewayError::NotFound(_)) => {
                info!(kind, %id, "Not found");
                self.snapshot.state = DetailState::Empty;
            }
            Err(error) => {
                warn!(kind, %id, error = %error, "Read failed");
                ctx.errors.report(error.to_string());
            }
        }
    }

    fn on_associated(
        &mut self,
        list: AssociationList,
        result: Result<Vec<T::Associated>, GatewayError>,
    ) {
        let items = result.unwrap_or_else(|error| {
            warn!(kind = T::KIND, id = %self.id, ?list, error = %error, "Association read failed, showing empty list");
            Vec::new()
        });
        debug!(kind = T::KIND, id = %self.id, ?list, count = items.len(), "Associations loaded");
        match list {
            AssociationList::Members => self.snapshot.members = items,
            AssociationList::Directory => self.snapshot.directory = items,
        }
    }

    fn on_saved(&mut self, result: Result<T, GatewayError>, ctx: &EditorContext<T>) {
        let kind = T::KIND;
        let id = self.id;
        let DetailState::Ready(ready) = &mut self.snapshot.state else {
            return;
        };
        ready.is_saving = false;
        match result {
            Ok(record) if record.id() == id => {
                ready.rebase(record);
                info!(kind, %id, "Updated");
            }
            Ok(record) => {
                let error = GatewayError::Transport(format!(
                    "update returned {kind} {} for {id}",
                    record.id()
                ));
                warn!(kind, %id, error = %error, "Update failed");
                ctx.errors.report(error.to_string());
            }
            Err(error) => {
                warn!(kind, %id, error = %error, "Update failed, draft kept");
                ctx.errors.report(error.to_string());
            }
        }
    }

    fn on_deleted(
        &mut self,
        ticket: Confirmed,
        result: Result<(), GatewayError>,
        ctx: &EditorContext<T>,
    ) {
        let kind = T::KIND;
        let id = self.id;
        let DetailState::Ready(ready) = &mut self.snapshot.state else {
            return;
        };
        ready.gate.settle(ticket);
        match result {
            Ok(()) => {
                info!(kind, %id, "Deleted");
                self.snapshot.state = DetailState::Closed;
            }
            Err(error) => {
                warn!(kind, %id, error = %error, "Delete failed");
                ctx.errors.report(error.to_string());
            }
        }
    }
}

// =============================================================================
// 4. THE CLIENT
// =============================================================================

/// Handle for sending intents to a [`DetailActor`] and observing its state.
///
/// Clones share the same editor. The editor stops once every clone is dropped.
pub struct DetailClient<T: ResourceEntity> {
    sender: mpsc::Sender<Intent>,
    snapshots: watch::Receiver<Snapshot<T>>,
}

impl<T: ResourceEntity> Clone for DetailClient<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            snapshots: self.snapshots.clone(),
        }
    }
}

impl<T: ResourceEntity> DetailClient<T> {
    pub fn new(sender: mpsc::Sender<Intent>, snapshots: watch::Receiver<Snapshot<T>>) -> Self {
        Self { sender, snapshots }
    }

    async fn ask<R>(&self, make: impl FnOnce(Response<R>) -> Intent) -> Result<R, EditorError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(make(respond_to))
            .await
            .map_err(|_| EditorError::ControllerClosed)?;
        response.await.map_err(|_| EditorError::ControllerDropped)?
    }

    pub async fn change_field(
        &self,
        field: &str,
        value: impl Into<String>,
    ) -> Result<bool, EditorError> {
        let field = field.to_string();
        let value = value.into();
        self.ask(|respond_to| Intent::ChangeField {
            field,
            value,
            respond_to,
        })
        .await
    }

    pub async fn save(&self) -> Result<SaveOutcome, EditorError> {
        self.ask(|respond_to| Intent::Save { respond_to }).await
    }

    pub async fn delete(&self) -> Result<bool, EditorError> {
        self.ask(|respond_to| Intent::Delete { respond_to }).await
    }

    pub async fn cancel(&self) -> Result<bool, EditorError> {
        self.ask(|respond_to| Intent::Cancel { respond_to }).await
    }

    pub async fn confirm(&self) -> Result<bool, EditorError> {
        self.ask(|respond_to| Intent::Confirm { respond_to }).await
    }

    pub async fn reload(&self) -> Result<bool, EditorError> {
        self.ask(|respond_to| Intent::Reload { respond_to }).await
    }

    /// Stops the editor even if other clones are still alive. In-flight
    /// gateway calls are aborted.
    pub async fn teardown(&self) -> Result<(), EditorError> {
        self.ask(|respond_to| Intent::Teardown { respond_to }).await
    }

    /// The latest published state.
    pub fn snapshot(&self) -> Snapshot<T> {
        Snapshot::clone(&self.snapshots.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot<T>> {
        self.snapshots.clone()
    }

    /// Waits until the published state satisfies `predicate`.
    ///
    /// Fails with [`EditorError::ControllerClosed`] if the editor stops first.
    pub async fn wait_until(
        &self,
        predicate: impl FnMut(&Snapshot<T>) -> bool,
    ) -> Result<Snapshot<T>, EditorError> {
        let mut snapshots = self.snapshots.clone();
        let snapshot = snapshots
            .wait_for(predicate)
            .await
            .map_err(|_| EditorError::ControllerClosed)?;
        Ok(Snapshot::clone(&snapshot))
    }

    /// Waits for the initial read to settle into `Ready` or `Empty`.
    pub async fn wait_loaded(&self) -> Result<Snapshot<T>, EditorError> {
        self.wait_until(|snapshot| !matches!(snapshot.state, DetailState::Loading))
            .await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}
