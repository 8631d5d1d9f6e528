//! # Validation Engine
//!
//! Table-driven field validation for editor drafts.
//!
//! A resource type describes its rules as a static table of [`Rule`]s
//! (field → predicate → message). The same evaluator, [`validate`], runs any
//! table against any [`EditDraft`], so new resource types only add a table.
//!
//! ```rust
//! use resource_console::model::RoleDraft;
//! use resource_console::validation::{not_blank, validate, Rule};
//!
//! const RULES: &[Rule] = &[Rule::new("name", not_blank, "name is required")];
//!
//! let draft = RoleDraft { name: "   ".into(), note: String::new() };
//! let errors = validate(&draft, RULES);
//! assert_eq!(errors.get("name"), Some("name is required"));
//! assert_eq!(errors.get("note"), None);
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::framework::EditDraft;

/// Predicate over a single field value. Returns `true` when the value is acceptable.
pub type Predicate = fn(&str) -> bool;

/// One row of a validation table.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub field: &'static str,
    pub predicate: Predicate,
    pub message: &'static str,
}

impl Rule {
    pub const fn new(field: &'static str, predicate: Predicate, message: &'static str) -> Self {
        Self {
            field,
            predicate,
            message,
        }
    }
}

/// Rejects empty values and values made only of whitespace.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Field name → error message. At most one message per field.
///
/// An empty set means the draft is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    /// Records `message` for `field` unless the field already has one.
    /// Returns whether the message was recorded.
    pub fn insert(&mut self, field: &'static str, message: &'static str) -> bool {
        if self.0.contains_key(field) {
            return false;
        }
        self.0.insert(field, message);
        true
    }

    /// Removes the error for `field`. Returns whether there was one.
    pub fn clear(&mut self, field: &str) -> bool {
        self.0.remove(field).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                write!(f, "; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}

/// Runs `rules` over `draft` in table order.
///
/// The first failing rule for a field wins; later rules for the same field are
/// skipped. A rule naming a field the draft does not expose sees `""`.
pub fn validate<D: EditDraft>(draft: &D, rules: &[Rule]) -> FieldErrors {
    let mut errors = FieldErrors::default();
    for rule in rules {
        if errors.get(rule.field).is_some() {
            continue;
        }
        let value = draft.field(rule.field).unwrap_or("");
        if !(rule.predicate)(value) {
            errors.insert(rule.field, rule.message);
        }
    }
    errors
}
