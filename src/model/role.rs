use serde::{Deserialize, Serialize};

/// An access-control role as stored by the identity server.
///
/// # Detail Editor
/// This struct implements [`ResourceEntity`](crate::framework::ResourceEntity),
/// allowing it to be edited by a [`DetailActor`](crate::framework::DetailActor).
/// The editable subset is [`RoleDraft`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Role {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub note: String,
}

/// The editable fields of a [`Role`], and the body of an update request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDraft {
    pub name: String,
    pub note: String,
}

impl Role {
    /// Creates a role record.
    ///
    /// # Arguments
    /// * `id` - Server-assigned identifier
    /// * `name` - Display name
    /// * `note` - Free-form description, may be empty
    pub fn new(id: i64, name: impl Into<String>, note: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            note: note.into(),
        }
    }
}

impl From<&Role> for RoleDraft {
    fn from(role: &Role) -> Self {
        Self {
            name: role.name.clone(),
            note: role.note.clone(),
        }
    }
}
