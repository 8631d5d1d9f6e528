//! Runtime orchestration and lifecycle management.
//!
//! This module contains the infrastructure around the editors:
//!
//! - **Editor lifecycle management**: Opening, wiring, and shutting down editors
//! - **Configuration**: The immutable [`ConsoleConfig`] snapshot injected into every editor
//! - **Error channel**: The dismissible global error banner
//! - **Observability setup**: Initializing tracing and logging
//!
//! # Main Components
//!
//! - [`Console`] - The orchestrator that owns the gateway and opens editors
//! - [`ConsoleConfig`] - Connection settings and feature flags
//! - [`ErrorChannel`] - Default [`ErrorReporter`]
//! - [`setup_tracing`] - Initializes the tracing/logging infrastructure

pub mod config;
pub mod console;
pub mod errors;
pub mod tracing;

pub use config::*;
pub use console::*;
pub use errors::*;
pub use tracing::*;
