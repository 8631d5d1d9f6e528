//! Pure data structures exchanged with the identity server.
//!
//! The [`ResourceEntity`](crate::framework::ResourceEntity) implementations live
//! next to their editors (see [`crate::role_editor`]).

pub mod role;
pub mod user;

pub use role::*;
pub use user::*;
