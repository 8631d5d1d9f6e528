//! Role-specific editor logic and entity implementation.

pub mod entity;
pub mod error;

pub use entity::ROLE_RULES;
pub use error::*;

use crate::clients::RoleClient;
use crate::framework::DetailActor;
use crate::model::Role;

/// Creates a new Role editor and its client.
///
/// The editor does nothing until [`DetailActor::run`] is spawned with a context.
pub fn new(id: i64, mailbox_size: usize) -> (DetailActor<Role>, RoleClient) {
    let (actor, generic_client) = DetailActor::new(id, mailbox_size);
    let client = RoleClient::new(id, generic_client);

    (actor, client)
}
