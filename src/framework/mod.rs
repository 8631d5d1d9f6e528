//! Generic single-resource editor.
//!
//! This module provides the building blocks for editing any resource type
//! through the same state machine: load, edit a draft, validate, save, and
//! delete behind a confirmation.
//!
//! # Main Components
//!
//! - [`ResourceEntity`] - Trait that resource types implement to be editable
//! - [`DetailActor`] - The state machine, one task per editor instance
//! - [`DetailClient`] - Type-safe handle for sending intents
//! - [`DetailState`] / [`Snapshot`] - What the controller publishes
//! - [`ViewState`] - What the rendering layer shows
//!
//! # Testing
//!
//! See [`mock`] module for a scripted gateway that records every request.

pub mod core;
pub mod mock;
pub mod state;
pub mod view;

// Re-export core types for convenience
pub use core::*;
pub use state::*;
pub use view::*;
