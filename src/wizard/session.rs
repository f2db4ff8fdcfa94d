//! Per-user session state.

use std::collections::HashMap;

use crate::wizard::catalog::{PROJECT_FIELDS, ProfileField};
use crate::wizard::state::WizardState;

/// Stable identity of one conversation: (chat, user).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: i64,
    pub user_id: i64,
}

/// One user's in-progress report.
///
/// Mutated exclusively by the wizard's step handlers; the router owns the
/// map from [`SessionKey`] to live sessions and discards an entry as soon
/// as the machine reaches `End`.
#[derive(Debug, Default)]
pub struct Session {
    /// Current wizard state.
    pub state: WizardState,
    /// Committed profile answers.
    pub answers: HashMap<ProfileField, String>,
    /// Staged choice in a single-select state, not yet confirmed.
    pub pending_choice: Option<String>,
    /// Selected projects, in selection order.
    pub selected_projects: Vec<String>,
    /// Cursor into `selected_projects` during the fill loop.
    pub project_index: usize,
    /// Filled sub-field values per project, in `PROJECT_FIELDS` order.
    /// The vector length is the fill cursor for that project.
    pub project_data: HashMap<String, Vec<String>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Move to `target`, enforcing the transition table. An invalid
    /// transition is a programming error in a step handler.
    pub fn transition_to(&mut self, target: WizardState) -> Result<(), String> {
        if !self.state.can_transition_to(target) {
            return Err(format!("Cannot transition from {} to {}", self.state, target));
        }
        self.state = target;
        Ok(())
    }

    /// The project currently being filled or confirmed.
    pub fn current_project(&self) -> Option<&str> {
        self.selected_projects.get(self.project_index).map(String::as_str)
    }

    /// How many sub-fields of the current project are filled.
    pub fn filled_count(&self) -> usize {
        self.current_project()
            .and_then(|p| self.project_data.get(p))
            .map_or(0, Vec::len)
    }

    /// Whether the current project has all its sub-fields.
    pub fn current_project_complete(&self) -> bool {
        self.filled_count() == PROJECT_FIELDS.len()
    }

    /// Committed answer for a profile field, or empty string.
    pub fn answer(&self, field: ProfileField) -> &str {
        self.answers.get(&field).map_or("", String::as_str)
    }

    /// Toggle a project in the selection set. Returns true if now selected.
    pub fn toggle_project(&mut self, name: &str) -> bool {
        if let Some(pos) = self.selected_projects.iter().position(|p| p == name) {
            self.selected_projects.remove(pos);
            false
        } else {
            self.selected_projects.push(name.to_string());
            true
        }
    }
}
