//! Entity trait implementations for the Role domain types.
//!
//! This module wires [`Role`], [`RoleDraft`] and [`UserSummary`] into the
//! generic [`crate::framework::DetailActor`] and [`crate::gateway::HttpGateway`].

use crate::framework::{EditDraft, Labeled, ResourceEntity};
use crate::gateway::RestResource;
use crate::model::{Role, RoleDraft, UserSummary};
use crate::validation::{not_blank, Rule};

/// Field rules checked before a role update is sent.
pub static ROLE_RULES: &[Rule] = &[Rule::new("name", not_blank, "name is required")];

impl ResourceEntity for Role {
    type Id = i64;
    type Draft = RoleDraft;
    type Associated = UserSummary;

    const KIND: &'static str = "role";

    fn id(&self) -> i64 {
        self.id
    }

    fn draft(&self) -> RoleDraft {
        RoleDraft::from(self)
    }

    fn rules() -> &'static [Rule] {
        ROLE_RULES
    }
}

impl EditDraft for RoleDraft {
    const FIELDS: &'static [&'static str] = &["name", "note"];

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "name" => Some(&self.name),
            "note" => Some(&self.note),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut String> {
        match name {
            "name" => Some(&mut self.name),
            "note" => Some(&mut self.note),
            _ => None,
        }
    }
}

impl Labeled for UserSummary {
    /// Full name when names are enabled and known, otherwise the email.
    fn label(&self, with_names: bool) -> String {
        with_names
            .then(|| self.full_name())
            .flatten()
            .unwrap_or_else(|| self.email.clone())
    }
}

impl RestResource for Role {
    const COLLECTION: &'static str = "roles";
    const ENVELOPE: &'static str = "role";
    const MEMBERS: &'static str = "users";
    const DIRECTORY: &'static str = "users";
}
