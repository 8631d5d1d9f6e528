//! Type-safe wrappers around [`DetailClient`](crate::framework::DetailClient).

pub mod editor_client;
pub mod role_client;

pub use editor_client::*;
pub use role_client::*;
