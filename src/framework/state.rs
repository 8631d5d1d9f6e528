//! Controller states, as published to the rendering layer.

use crate::confirm::ConfirmationGate;
use crate::framework::core::ResourceEntity;
use crate::validation::FieldErrors;

/// Mutually exclusive editor states.
#[derive(Debug, Clone)]
pub enum DetailState<T: ResourceEntity> {
    /// Initial read in flight, no record yet.
    Loading,
    /// The read completed without a record.
    Empty,
    /// A record is loaded; every user interaction happens here.
    Ready(ReadyState<T>),
    /// The record was deleted. The host should navigate away.
    Closed,
}

impl<T: ResourceEntity> DetailState<T> {
    pub fn ready(&self) -> Option<&ReadyState<T>> {
        match self {
            DetailState::Ready(ready) => Some(ready),
            _ => None,
        }
    }
}

/// The steady state of an editor.
#[derive(Debug, Clone)]
pub struct ReadyState<T: ResourceEntity> {
    /// Last record received from the server; the clean baseline.
    pub record: T,
    pub draft: T::Draft,
    pub field_errors: FieldErrors,
    pub is_saving: bool,
    pub gate: ConfirmationGate,
}

impl<T: ResourceEntity> ReadyState<T> {
    pub fn new(record: T, gate: ConfirmationGate) -> Self {
        Self {
            draft: record.draft(),
            record,
            field_errors: FieldErrors::default(),
            is_saving: false,
            gate,
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != self.record.draft()
    }

    /// Save-button enablement. Deliberately ignores validity: the user gets
    /// field feedback on click instead of a silently disabled button.
    pub fn can_save(&self) -> bool {
        self.is_dirty() && !self.is_saving
    }

    pub fn is_deleting(&self) -> bool {
        self.gate.is_executing()
    }

    /// Replaces the baseline with a fresh server record and resets the draft to it.
    pub fn rebase(&mut self, record: T) {
        self.draft = record.draft();
        self.record = record;
        self.field_errors = FieldErrors::default();
    }
}

/// Everything the controller publishes after a transition.
#[derive(Debug, Clone)]
pub struct Snapshot<T: ResourceEntity> {
    pub state: DetailState<T>,
    /// Entries associated with the record (e.g. users holding the role).
    pub members: Vec<T::Associated>,
    /// Directory entries available to the operator (all users, or the operator's org).
    pub directory: Vec<T::Associated>,
}

impl<T: ResourceEntity> Snapshot<T> {
    pub fn loading() -> Self {
        Self {
            state: DetailState::Loading,
            members: Vec::new(),
            directory: Vec::new(),
        }
    }

    pub fn ready(&self) -> Option<&ReadyState<T>> {
        self.state.ready()
    }
}
