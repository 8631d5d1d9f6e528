//! # Mock Gateway
//!
//! Utilities for testing editors without an identity server.
//!
//! [`MockGateway`] implements [`Gateway`] from a script of expectations and
//! records every request it receives, so tests can assert exactly what an
//! editor sent (and what it did *not* send).
//!
//! ```rust
//! use resource_console::framework::mock::MockGateway;
//! use resource_console::gateway::Gateway;
//! use resource_console::model::Role;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mock = MockGateway::<Role>::new();
//! mock.expect_read_one(2).return_ok(Some(Role::new(2, "admin", "")));
//!
//! let gateway = mock.gateway();
//! let role = gateway.read_one(2).await.unwrap();
//! assert_eq!(role.unwrap().name, "admin");
//!
//! mock.verify();
//! # }
//! ```
//!
//! ## Holding a response
//!
//! `hold_ok` / `hold_err` keep the call pending until the returned
//! [`Release`] is released (or dropped). That is how tests observe an editor
//! while a save or delete is in flight.
//!
//! ## Association reads
//!
//! Association reads with no matching expectation resolve to an empty list,
//! the same way an editor degrades when those reads fail.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::framework::ResourceEntity;
use crate::gateway::{AssociationScope, Gateway, GatewayError};

// =============================================================================
// EXPECTATIONS
// =============================================================================

/// A scripted response, optionally held until released.
struct Expectation<R> {
    response: Result<R, GatewayError>,
    hold: Option<oneshot::Receiver<()>>,
}

type Queue<K, R> = Arc<Mutex<VecDeque<(K, Expectation<R>)>>>;

fn lock<K, R>(queue: &Queue<K, R>) -> MutexGuard<'_, VecDeque<(K, Expectation<R>)>> {
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Removes the first expectation registered for `key`.
fn take<K: PartialEq, R>(queue: &Queue<K, R>, key: &K) -> Option<Expectation<R>> {
    let mut queue = lock(queue);
    let position = queue.iter().position(|(expected, _)| expected == key)?;
    queue.remove(position).map(|(_, expectation)| expectation)
}

async fn settle<R>(expectation: Expectation<R>) -> Result<R, GatewayError> {
    if let Some(hold) = expectation.hold {
        let _ = hold.await;
    }
    expectation.response
}

/// Unblocks a held response.
pub struct Release {
    sender: oneshot::Sender<()>,
}

impl Release {
    pub fn release(self) {
        let _ = self.sender.send(());
    }
}

/// Builder returned by the `expect_*` methods.
pub struct ExpectationBuilder<K, R> {
    key: K,
    queue: Queue<K, R>,
}

impl<K, R> ExpectationBuilder<K, R> {
    fn push(self, response: Result<R, GatewayError>, hold: Option<oneshot::Receiver<()>>) {
        lock(&self.queue).push_back((self.key, Expectation { response, hold }));
    }

    /// Responds successfully.
    pub fn return_ok(self, value: R) {
        self.push(Ok(value), None);
    }

    /// Responds with an error.
    pub fn return_err(self, error: GatewayError) {
        self.push(Err(error), None);
    }

    /// Responds successfully once the returned [`Release`] is released.
    pub fn hold_ok(self, value: R) -> Release {
        let (sender, receiver) = oneshot::channel();
        self.push(Ok(value), Some(receiver));
        Release { sender }
    }

    /// Responds with an error once the returned [`Release`] is released.
    pub fn hold_err(self, error: GatewayError) -> Release {
        let (sender, receiver) = oneshot::channel();
        self.push(Err(error), Some(receiver));
        Release { sender }
    }
}

// =============================================================================
// RECORDED REQUESTS
// =============================================================================

/// A request the mock received.
#[derive(Debug, Clone, PartialEq)]
pub enum GatewayCall<T: ResourceEntity> {
    ReadOne(T::Id),
    ReadAssociated(AssociationScope<T::Id>),
    Update(T::Id, T::Draft),
    Delete(T::Id),
}

// =============================================================================
// MOCK GATEWAY
// =============================================================================

struct Inner<T: ResourceEntity> {
    read_one: Queue<T::Id, Option<T>>,
    associated: Queue<AssociationScope<T::Id>, Vec<T::Associated>>,
    update: Queue<T::Id, T>,
    delete: Queue<T::Id, ()>,
    calls: Mutex<Vec<GatewayCall<T>>>,
    unexpected: Mutex<Vec<GatewayCall<T>>>,
}

/// A scripted [`Gateway`] with request recording.
///
/// Clones share the same script and recording.
pub struct MockGateway<T: ResourceEntity> {
    inner: Arc<Inner<T>>,
}

impl<T: ResourceEntity> Clone for MockGateway<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: ResourceEntity> Default for MockGateway<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ResourceEntity> MockGateway<T> {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                read_one: Arc::default(),
                associated: Arc::default(),
                update: Arc::default(),
                delete: Arc::default(),
                calls: Mutex::default(),
                unexpected: Mutex::default(),
            }),
        }
    }

    /// The mock as a shareable gateway, ready for an editor context.
    pub fn gateway(&self) -> Arc<dyn Gateway<T>> {
        Arc::new(self.clone())
    }

    pub fn expect_read_one(&self, id: T::Id) -> ExpectationBuilder<T::Id, Option<T>> {
        ExpectationBuilder {
            key: id,
            queue: Arc::clone(&self.inner.read_one),
        }
    }

    pub fn expect_read_associated(
        &self,
        scope: AssociationScope<T::Id>,
    ) -> ExpectationBuilder<AssociationScope<T::Id>, Vec<T::Associated>> {
        ExpectationBuilder {
            key: scope,
            queue: Arc::clone(&self.inner.associated),
        }
    }

    pub fn expect_update(&self, id: T::Id) -> ExpectationBuilder<T::Id, T> {
        ExpectationBuilder {
            key: id,
            queue: Arc::clone(&self.inner.update),
        }
    }

    pub fn expect_delete(&self, id: T::Id) -> ExpectationBuilder<T::Id, ()> {
        ExpectationBuilder {
            key: id,
            queue: Arc::clone(&self.inner.delete),
        }
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<GatewayCall<T>> {
        self.inner
            .calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// `(id, payload)` of every update request received.
    pub fn updates(&self) -> Vec<(T::Id, T::Draft)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Update(id, draft) => Some((id, draft)),
                _ => None,
            })
            .collect()
    }

    /// Ids of every delete request received.
    pub fn deletes(&self) -> Vec<T::Id> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                GatewayCall::Delete(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    /// Panics if an expectation is still pending or a request had no expectation.
    pub fn verify(&self) {
        let remaining = lock(&self.inner.read_one).len()
            + lock(&self.inner.associated).len()
            + lock(&self.inner.update).len()
            + lock(&self.inner.delete).len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
        let unexpected = self
            .inner
            .unexpected
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default();
        if !unexpected.is_empty() {
            panic!("Unexpected requests: {unexpected:?}");
        }
    }

    fn record(&self, call: GatewayCall<T>) {
        if let Ok(mut calls) = self.inner.calls.lock() {
            calls.push(call);
        }
    }

    fn unexpected(&self, call: GatewayCall<T>) -> GatewayError {
        let message = format!("unexpected request {call:?}");
        if let Ok(mut unexpected) = self.inner.unexpected.lock() {
            unexpected.push(call);
        }
        GatewayError::Transport(message)
    }
}

#[async_trait]
impl<T: ResourceEntity> Gateway<T> for MockGateway<T> {
    async fn read_one(&self, id: T::Id) -> Result<Option<T>, GatewayError> {
        self.record(GatewayCall::ReadOne(id));
        match take(&self.inner.read_one, &id) {
            Some(expectation) => settle(expectation).await,
            None => Err(self.unexpected(GatewayCall::ReadOne(id))),
        }
    }

    async fn read_associated(
        &self,
        scope: AssociationScope<T::Id>,
    ) -> Result<Vec<T::Associated>, GatewayError> {
        self.record(GatewayCall::ReadAssociated(scope));
        match take(&self.inner.associated, &scope) {
            Some(expectation) => settle(expectation).await,
            None => Ok(Vec::new()),
        }
    }

    async fn update(&self, id: T::Id, draft: T::Draft) -> Result<T, GatewayError> {
        self.record(GatewayCall::Update(id, draft.clone()));
        match take(&self.inner.update, &id) {
            Some(expectation) => settle(expectation).await,
            None => Err(self.unexpected(GatewayCall::Update(id, draft))),
        }
    }

    async fn delete(&self, id: T::Id) -> Result<(), GatewayError> {
        self.record(GatewayCall::Delete(id));
        match take(&self.inner.delete, &id) {
            Some(expectation) => settle(expectation).await,
            None => Err(self.unexpected(GatewayCall::Delete(id))),
        }
    }
}
