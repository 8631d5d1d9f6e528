//! # Resource Console
//!
//! > **Detail editors for an identity server's access-control resources.**
//!
//! An operator opens a resource (a role, for now), edits its fields, saves, or
//! deletes it behind a confirmation. The records live on a separate identity
//! server; this crate owns everything between that server and the screen.
//!
//! ## 🏗️ Design Philosophy
//!
//! Every editor is a small actor: one Tokio task that owns the record, the
//! draft and the field errors, processes intents one at a time, and publishes
//! a snapshot after each transition. The rendering layer never mutates state;
//! it sends intents and draws what it is given.
//!
//! ## 🚀 Core Concepts
//!
//! ### Generics: One State Machine
//! You'll see `DetailActor<T: ResourceEntity>` everywhere. The loading, dirty
//! tracking, validation, save and delete logic is written once; a resource only
//! supplies its draft fields, its validation table and its REST addressing.
//!
//! ### Guards, not Hopes
//! - A save is only sent when the draft is dirty, valid and no save is running.
//! - A delete is only sent while holding a [`Confirmed`](confirm::Confirmed)
//!   ticket, which only [`ConfirmationGate::confirm`](confirm::ConfirmationGate::confirm)
//!   hands out.
//! - A gateway call settling after teardown is aborted, never applied.
//!
//! ### Mocking: Testing without a Server
//! [`framework::mock::MockGateway`] scripts gateway responses, can hold one
//! until the test releases it, and records every request.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Type-Safe Error Handling
//! Field errors stay local ([`validation::FieldErrors`]). Gateway failures are
//! [`gateway::GatewayError`] values reported on the injected error channel.
//! Client plumbing failures are [`framework::EditorError`], wrapped per
//! resource (e.g. [`role_editor::RoleError`]).
//!
//! ### 2. Context Injection
//! The gateway, error reporter and configuration are passed to
//! [`DetailActor::run`](framework::DetailActor::run), not read from globals.
//!
//! ### 3. Observability
//! `tracing` everywhere with structured fields. See [`runtime::setup_tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Engine ([`framework`])
//! The generic controller, its published states and the view-state derivation.
//!
//! ### 2. The Guards ([`validation`], [`confirm`])
//! Table-driven field validation and the two-step confirmation gate.
//!
//! ### 3. The Boundary ([`gateway`])
//! The gateway trait and its HTTP implementation.
//!
//! ### 4. The Orchestrator ([`runtime`])
//! Configuration, the error channel, and [`Console`](runtime::Console), which
//! opens editors and shuts them down.
//!
//! ### 5. The Interface ([`clients`])
//! Domain-specific wrappers such as [`RoleClient`](clients::RoleClient).
//!
//! ### 6. The Implementation ([`model`], [`role_editor`])
//! Role records and their editor wiring.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Show role 2 with info logs
//! RUST_LOG=info cargo run -- --config console.toml role 2 show
//! ```

pub mod clients;
pub mod confirm;
pub mod framework;
pub mod gateway;
pub mod model;
pub mod role_editor;
pub mod runtime;
pub mod validation;
