//! The rendering contract: a plain function from published state to what is shown.

use crate::framework::core::{EditDraft, Labeled, ResourceEntity};
use crate::framework::state::{DetailState, Snapshot};
use crate::runtime::ConsoleConfig;

/// One editable input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub name: &'static str,
    pub value: String,
    pub error: Option<&'static str>,
}

/// What the rendering layer should show right now.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub show_spinner: bool,
    pub fields: Vec<FieldView>,
    pub show_save: bool,
    pub save_enabled: bool,
    pub show_delete: bool,
    pub confirm_dialog: bool,
    pub is_deleting: bool,
    pub members: Vec<String>,
    pub directory: Vec<String>,
    pub navigate_away: bool,
}

impl ViewState {
    pub fn render<T: ResourceEntity>(snapshot: &Snapshot<T>, config: &ConsoleConfig) -> Self {
        match &snapshot.state {
            DetailState::Loading => Self {
                show_spinner: true,
                ..Self::default()
            },
            DetailState::Empty => Self::default(),
            DetailState::Closed => Self {
                navigate_away: true,
                ..Self::default()
            },
            DetailState::Ready(ready) => {
                let fields = <T::Draft as EditDraft>::FIELDS
                    .iter()
                    .map(|&name| FieldView {
                        name,
                        value: ready.draft.field(name).unwrap_or_default().to_string(),
                        error: ready.field_errors.get(name),
                    })
                    .collect();
                let labels = |entries: &[T::Associated]| -> Vec<String> {
                    entries
                        .iter()
                        .map(|entry| entry.label(config.enable_names))
                        .collect()
                };
                Self {
                    show_spinner: false,
                    fields,
                    show_save: true,
                    save_enabled: ready.can_save(),
                    show_delete: true,
                    confirm_dialog: ready.gate.is_dialog_visible(),
                    is_deleting: ready.is_deleting(),
                    members: labels(&snapshot.members),
                    directory: labels(&snapshot.directory),
                    navigate_away: false,
                }
            }
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldView> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn field_errors(&self) -> impl Iterator<Item = &FieldView> {
        self.fields.iter().filter(|field| field.error.is_some())
    }
}
