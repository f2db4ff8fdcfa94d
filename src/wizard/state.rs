//! Wizard state machine — tracks which step of the report the user is in.

use serde::{Deserialize, Serialize};

/// The steps of the report conversation.
///
/// Progresses linearly through the profile fields, then loops
/// FillProject → ConfirmProject once per selected project, then
/// ConfirmSubmission → End. Cancellation moves to End from anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardState {
    AwaitCedula,
    AwaitCorreo,
    AwaitMunicipio,
    AwaitParroquia,
    AwaitEntidad,
    AwaitNodo,
    AwaitCargo,
    AwaitProjects,
    FillProject,
    ConfirmProject,
    ConfirmSubmission,
    End,
}

impl WizardState {
    /// Check if a transition from `self` to `target` is valid.
    pub fn can_transition_to(&self, target: WizardState) -> bool {
        use WizardState::*;
        // Cancellation is reachable from every state.
        if target == End && *self != End {
            return true;
        }
        matches!(
            (self, target),
            (AwaitCedula, AwaitCorreo)
                | (AwaitCorreo, AwaitMunicipio)
                | (AwaitMunicipio, AwaitParroquia)
                | (AwaitParroquia, AwaitEntidad)
                | (AwaitEntidad, AwaitNodo)
                | (AwaitNodo, AwaitCargo)
                | (AwaitCargo, AwaitProjects)
                | (AwaitProjects, FillProject)
                | (FillProject, ConfirmProject)
                // Next project, or refill the same one after a "no".
                | (ConfirmProject, FillProject)
                | (ConfirmProject, ConfirmSubmission)
                | (ConfirmSubmission, End)
        )
    }

    /// Whether this state presents a selection keyboard.
    pub fn is_select(&self) -> bool {
        matches!(
            self,
            Self::AwaitMunicipio | Self::AwaitEntidad | Self::AwaitCargo | Self::AwaitProjects
        )
    }

    /// Whether this state is terminal (the session is over).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End)
    }
}

impl Default for WizardState {
    fn default() -> Self {
        Self::AwaitCedula
    }
}

impl std::fmt::Display for WizardState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::AwaitCedula => "await_cedula",
            Self::AwaitCorreo => "await_correo",
            Self::AwaitMunicipio => "await_municipio",
            Self::AwaitParroquia => "await_parroquia",
            Self::AwaitEntidad => "await_entidad",
            Self::AwaitNodo => "await_nodo",
            Self::AwaitCargo => "await_cargo",
            Self::AwaitProjects => "await_projects",
            Self::FillProject => "fill_project",
            Self::ConfirmProject => "confirm_project",
            Self::ConfirmSubmission => "confirm_submission",
            Self::End => "end",
        };
        write!(f, "{s}")
    }
}
