//! # Confirmation Gate
//!
//! A two-step guard for irreversible actions.
//!
//! ```text
//! Idle --request--> Pending --cancel--> Idle
//!                   Pending --confirm--> Executing --settle--> Idle
//! ```
//!
//! The only way out of `Pending` towards the protected action is
//! [`ConfirmationGate::confirm`], which hands back a [`Confirmed`] ticket.
//! The ticket cannot be built anywhere else, so code that runs the action
//! has to hold one.

/// Where the gate currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GatePhase {
    #[default]
    Idle,
    Pending,
    Executing,
}

/// Proof that the gate went through `Pending → confirm`.
///
/// Return it with [`ConfirmationGate::settle`] once the action settles.
#[derive(Debug)]
#[must_use = "the gate stays in Executing until the ticket is settled"]
pub struct Confirmed {
    _private: (),
}

/// Generic confirmation controller.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationGate {
    phase: GatePhase,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        self.phase == GatePhase::Pending
    }

    pub fn is_executing(&self) -> bool {
        self.phase == GatePhase::Executing
    }

    /// The dialog stays up while the action runs so it can show progress.
    pub fn is_dialog_visible(&self) -> bool {
        self.phase != GatePhase::Idle
    }

    /// `Idle → Pending`. Returns whether the gate moved.
    pub fn request(&mut self) -> bool {
        if self.phase != GatePhase::Idle {
            return false;
        }
        self.phase = GatePhase::Pending;
        true
    }

    /// `Pending → Idle`. Returns whether the gate moved.
    pub fn cancel(&mut self) -> bool {
        if self.phase != GatePhase::Pending {
            return false;
        }
        self.phase = GatePhase::Idle;
        true
    }

    /// `Pending → Executing`.
    pub fn confirm(&mut self) -> Option<Confirmed> {
        if self.phase != GatePhase::Pending {
            return None;
        }
        self.phase = GatePhase::Executing;
        Some(Confirmed { _private: () })
    }

    /// `Executing → Idle`. Returns whether the gate moved.
    ///
    /// A gate that is not executing ignores the ticket: clones of a gate share
    /// no state, so a ticket from one must not move another.
    pub fn settle(&mut self, _ticket: Confirmed) -> bool {
        if self.phase != GatePhase::Executing {
            return false;
        }
        self.phase = GatePhase::Idle;
        true
    }

    /// Confirms, runs `action`, and returns to `Idle` once it settles.
    ///
    /// Returns `None` without running anything unless the gate is pending.
    /// If the returned future is dropped mid-action the gate still returns to `Idle`.
    pub async fn run_confirmed<F, Fut, R>(&mut self, action: F) -> Option<R>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = R>,
    {
        let _ticket = self.confirm()?;
        let guard = SettleOnDrop(&mut self.phase);
        let result = action().await;
        drop(guard);
        Some(result)
    }
}

struct SettleOnDrop<'a>(&'a mut GatePhase);

impl Drop for SettleOnDrop<'_> {
    fn drop(&mut self) {
        *self.0 = GatePhase::Idle;
    }
}
