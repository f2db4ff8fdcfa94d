//! Step handlers — one conversation event in, prompts and transitions out.
//!
//! The wizard is pure: it never touches the network. The router feeds it
//! [`WizardEvent`]s and executes the returned [`Step`] (messages to send or
//! edit, and at most one row to append).

use chrono::{DateTime, Utc};

use crate::wizard::catalog::{
    CARGOS, ENTIDADES, MUNICIPIOS, PROFILE_FIELDS, PROJECT_FIELDS, PROYECTOS, ProfileField,
};
use crate::wizard::row::build_row;
use crate::wizard::session::Session;
use crate::wizard::state::WizardState;

/// One inbound conversation event, already decoded by the transport layer.
#[derive(Debug, Clone)]
pub enum WizardEvent {
    /// Entry command; (re)initializes the session.
    Start,
    /// Cancel command; reachable from every state.
    Cancel,
    /// Free-text message.
    Text(String),
    /// An option button was pressed.
    Select(String),
    /// The "confirm selection" button was pressed.
    ConfirmSelection,
}

/// How a prompt reaches the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Render {
    /// Send as a new message.
    Send,
    /// Edit the prompt the user interacted with (select-state re-renders).
    Edit,
}

/// One selectable option: visible label plus opaque callback payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

/// Callback payload of the "confirm selection" button.
pub const CONFIRM_DATA: &str = "done";

/// An outgoing prompt, optionally with a selection keyboard.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub text: String,
    pub keyboard: Option<Vec<Vec<Button>>>,
    pub render: Render,
}

impl Prompt {
    fn send(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            render: Render::Send,
        }
    }

    fn edit(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
            render: Render::Edit,
        }
    }

    fn with_keyboard(mut self, keyboard: Vec<Vec<Button>>) -> Self {
        self.keyboard = Some(keyboard);
        self
    }
}

/// The result of handling one event.
#[derive(Debug, Default)]
pub struct Step {
    /// Prompts to deliver, in order.
    pub prompts: Vec<Prompt>,
    /// Row to append to the tabular store (final confirmation only).
    pub submit: Option<Vec<String>>,
    /// The session reached `End` and should be discarded.
    pub done: bool,
}

impl Step {
    fn reply(prompt: Prompt) -> Self {
        Self {
            prompts: vec![prompt],
            ..Self::default()
        }
    }

    fn ignore() -> Self {
        Self::default()
    }
}

/// The conversation state machine for one session.
#[derive(Debug, Default)]
pub struct Wizard {
    session: Session,
}

impl Wizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Handle an event, stamping any submission with the current time.
    pub fn handle(&mut self, event: WizardEvent) -> Step {
        self.handle_at(event, Utc::now())
    }

    /// Handle an event with an explicit submission instant.
    pub fn handle_at(&mut self, event: WizardEvent, now: DateTime<Utc>) -> Step {
        match event {
            WizardEvent::Start => self.restart(),
            WizardEvent::Cancel => self.cancel(),
            WizardEvent::Text(text) => self.on_text(&text, now),
            WizardEvent::Select(data) => self.on_select(&data),
            WizardEvent::ConfirmSelection => self.on_confirm_selection(),
        }
    }

    /// `/start`: wipe everything and ask for the first field again.
    fn restart(&mut self) -> Step {
        self.session = Session::new();
        Step::reply(Prompt::send(
            "👋 Bienvenido al reporte semanal de campo.\n\n🪪 Ingrese su CÉDULA DE IDENTIDAD:",
        ))
    }

    /// `/cancel`: end the session without sending anything anywhere.
    fn cancel(&mut self) -> Step {
        self.transition(WizardState::End);
        Step {
            prompts: vec![Prompt::send("Operación cancelada.")],
            submit: None,
            done: true,
        }
    }

    fn transition(&mut self, target: WizardState) {
        if let Err(e) = self.session.transition_to(target) {
            tracing::error!("wizard transition rejected: {e}");
        }
    }

    // ── Free-text events ────────────────────────────────────────────

    fn on_text(&mut self, text: &str, now: DateTime<Utc>) -> Step {
        let text = text.trim();
        match self.session.state {
            WizardState::AwaitCedula => self.fill_profile(
                text,
                ProfileField::Cedula,
                "🪪 Ingrese su CÉDULA DE IDENTIDAD:",
                |w| {
                    w.transition(WizardState::AwaitCorreo);
                    Prompt::send("📧 Ingrese su CORREO ELECTRÓNICO:")
                },
            ),
            WizardState::AwaitCorreo => self.fill_profile(
                text,
                ProfileField::Correo,
                "📧 Ingrese su CORREO ELECTRÓNICO:",
                |w| {
                    w.transition(WizardState::AwaitMunicipio);
                    municipio_prompt()
                },
            ),
            WizardState::AwaitParroquia => self.fill_profile(
                text,
                ProfileField::Parroquia,
                "🏘 Ingrese la PARROQUIA:",
                |w| {
                    w.transition(WizardState::AwaitEntidad);
                    entidad_prompt()
                },
            ),
            WizardState::AwaitNodo => {
                self.fill_profile(text, ProfileField::Nodo, "📍 Ingrese el NODO:", |w| {
                    w.transition(WizardState::AwaitCargo);
                    cargo_prompt()
                })
            }
            WizardState::AwaitMunicipio => Step::reply(
                Prompt::send("⚠️ Use los botones para seleccionar.").with_keyboard(
                    select_keyboard(MUNICIPIOS, self.session.pending_choice.as_deref()),
                ),
            ),
            WizardState::AwaitEntidad => Step::reply(
                Prompt::send("⚠️ Use los botones para seleccionar.").with_keyboard(
                    select_keyboard(ENTIDADES, self.session.pending_choice.as_deref()),
                ),
            ),
            WizardState::AwaitCargo => Step::reply(
                Prompt::send("⚠️ Use los botones para seleccionar.").with_keyboard(
                    select_keyboard(CARGOS, self.session.pending_choice.as_deref()),
                ),
            ),
            WizardState::AwaitProjects => Step::reply(
                Prompt::send("⚠️ Use los botones para seleccionar.")
                    .with_keyboard(projects_keyboard(&self.session.selected_projects)),
            ),
            WizardState::FillProject => self.fill_project_field(text),
            WizardState::ConfirmProject => self.on_confirm_project(text),
            WizardState::ConfirmSubmission => self.on_confirm_submission(text, now),
            WizardState::End => Step::ignore(),
        }
    }

    /// Store a non-empty free-text answer and advance; re-ask otherwise.
    fn fill_profile(
        &mut self,
        text: &str,
        field: ProfileField,
        reprompt: &str,
        advance: impl FnOnce(&mut Self) -> Prompt,
    ) -> Step {
        if text.is_empty() {
            return Step::reply(Prompt::send(reprompt));
        }
        self.session.answers.insert(field, text.to_string());
        Step::reply(advance(self))
    }

    fn fill_project_field(&mut self, text: &str) -> Step {
        let Some(project) = self.session.current_project().map(str::to_string) else {
            tracing::error!("fill_project without a current project");
            return Step::ignore();
        };
        let filled = self.session.filled_count();
        if text.is_empty() {
            return Step::reply(Prompt::send(PROJECT_FIELDS[filled].prompt));
        }

        self.session
            .project_data
            .entry(project.clone())
            .or_default()
            .push(text.to_string());

        if self.session.current_project_complete() {
            self.transition(WizardState::ConfirmProject);
            Step::reply(Prompt::send(self.project_confirmation(&project)))
        } else {
            Step::reply(Prompt::send(PROJECT_FIELDS[filled + 1].prompt))
        }
    }

    fn on_confirm_project(&mut self, text: &str) -> Step {
        let Some(project) = self.session.current_project().map(str::to_string) else {
            tracing::error!("confirm_project without a current project");
            return Step::ignore();
        };
        match parse_confirmation(text) {
            Some(true) => {
                self.session.project_index += 1;
                match self.session.current_project().map(str::to_string) {
                    Some(next) => {
                        self.transition(WizardState::FillProject);
                        Step::reply(Prompt::send(format!(
                            "✅ {project} completado.\n\n✍️ Vamos con {next}.\n\n{}",
                            PROJECT_FIELDS[0].prompt
                        )))
                    }
                    None => {
                        self.transition(WizardState::ConfirmSubmission);
                        Step::reply(Prompt::send(self.submission_summary()))
                    }
                }
            }
            Some(false) => {
                self.session.project_data.remove(&project);
                self.transition(WizardState::FillProject);
                Step::reply(Prompt::send(format!(
                    "🔁 Datos de {project} descartados.\n\n{}",
                    PROJECT_FIELDS[0].prompt
                )))
            }
            None => Step::reply(Prompt::send(format!(
                "Responda si o no.\n\n{}",
                self.project_confirmation(&project)
            ))),
        }
    }

    fn on_confirm_submission(&mut self, text: &str, now: DateTime<Utc>) -> Step {
        match parse_confirmation(text) {
            Some(true) => {
                let row = build_row(&self.session, now);
                self.transition(WizardState::End);
                Step {
                    prompts: Vec::new(),
                    submit: Some(row),
                    done: true,
                }
            }
            Some(false) => {
                self.transition(WizardState::End);
                Step {
                    prompts: vec![Prompt::send("❌ Proceso cancelado.")],
                    submit: None,
                    done: true,
                }
            }
            None => Step::reply(Prompt::send(
                "Responda si o no.\n\n¿Desea confirmar y enviar los datos? (si/no)",
            )),
        }
    }

    // ── Selection events ────────────────────────────────────────────

    fn on_select(&mut self, data: &str) -> Step {
        match self.session.state {
            WizardState::AwaitMunicipio => {
                self.stage_choice(data, MUNICIPIOS, "👉 MUNICIPIO seleccionado")
            }
            WizardState::AwaitEntidad => {
                self.stage_choice(data, ENTIDADES, "👉 ENTIDAD seleccionada")
            }
            WizardState::AwaitCargo => self.stage_choice(data, CARGOS, "👉 CARGO seleccionado"),
            WizardState::AwaitProjects => {
                if !PROYECTOS.contains(&data) {
                    tracing::warn!(option = data, "unknown project option");
                    return Step::ignore();
                }
                self.session.toggle_project(data);
                let listing = if self.session.selected_projects.is_empty() {
                    "Ninguno aún".to_string()
                } else {
                    self.session.selected_projects.join(", ")
                };
                Step::reply(
                    Prompt::edit(format!(
                        "📌 Seleccione los proyectos en los que participa:\n\n{listing}"
                    ))
                    .with_keyboard(projects_keyboard(&self.session.selected_projects)),
                )
            }
            _ => {
                tracing::debug!(option = data, state = %self.session.state, "selection outside a select state");
                Step::ignore()
            }
        }
    }

    /// Stage a single-select choice and re-render the keyboard around it.
    fn stage_choice(&mut self, data: &str, options: &[&str], header: &str) -> Step {
        if !options.contains(&data) {
            tracing::warn!(option = data, "unknown selection option");
            return Step::ignore();
        }
        self.session.pending_choice = Some(data.to_string());
        Step::reply(
            Prompt::edit(format!(
                "{header}: {data}\nPresione ✅ Confirmar para continuar."
            ))
            .with_keyboard(select_keyboard(options, Some(data))),
        )
    }

    fn on_confirm_selection(&mut self) -> Step {
        match self.session.state {
            WizardState::AwaitMunicipio => match self.session.pending_choice.take() {
                None => Step::reply(
                    Prompt::edit("⚠️ Debe seleccionar un MUNICIPIO.")
                        .with_keyboard(select_keyboard(MUNICIPIOS, None)),
                ),
                Some(choice) => {
                    self.session.answers.insert(ProfileField::Municipio, choice.clone());
                    self.transition(WizardState::AwaitParroquia);
                    Step::reply(Prompt::edit(format!(
                        "✅ MUNICIPIO: {choice}\n\n🏘 Ingrese la PARROQUIA:"
                    )))
                }
            },
            WizardState::AwaitEntidad => match self.session.pending_choice.take() {
                None => Step::reply(
                    Prompt::edit("⚠️ Debe seleccionar una ENTIDAD.")
                        .with_keyboard(select_keyboard(ENTIDADES, None)),
                ),
                Some(choice) => {
                    self.session.answers.insert(ProfileField::Entidad, choice.clone());
                    self.transition(WizardState::AwaitNodo);
                    Step::reply(Prompt::edit(format!(
                        "✅ ENTIDAD: {choice}\n\n📍 Ingrese el NODO:"
                    )))
                }
            },
            WizardState::AwaitCargo => match self.session.pending_choice.take() {
                None => Step::reply(
                    Prompt::edit("⚠️ Debe seleccionar un CARGO.")
                        .with_keyboard(select_keyboard(CARGOS, None)),
                ),
                Some(choice) => {
                    self.session.answers.insert(ProfileField::Cargo, choice.clone());
                    self.transition(WizardState::AwaitProjects);
                    Step::reply(
                        Prompt::edit(format!(
                            "✅ CARGO: {choice}\n\n✔️ Datos básicos completados.\n\n\
                             📌 Seleccione los proyectos en los que participa \
                             (puede elegir varios) y luego pulse ✅ Confirmar."
                        ))
                        .with_keyboard(projects_keyboard(&self.session.selected_projects)),
                    )
                }
            },
            WizardState::AwaitProjects => {
                if self.session.selected_projects.is_empty() {
                    return Step::reply(
                        Prompt::edit("⚠️ Debe seleccionar al menos un proyecto.")
                            .with_keyboard(projects_keyboard(&self.session.selected_projects)),
                    );
                }
                self.session.project_index = 0;
                self.transition(WizardState::FillProject);
                let first = self.session.selected_projects[0].clone();
                Step::reply(Prompt::edit(format!(
                    "✍️ Vamos con {first}.\n\n{}",
                    PROJECT_FIELDS[0].prompt
                )))
            }
            _ => {
                tracing::debug!(state = %self.session.state, "confirm outside a select state");
                Step::ignore()
            }
        }
    }

    // ── Summaries ───────────────────────────────────────────────────

    fn project_confirmation(&self, project: &str) -> String {
        let mut text = format!("📋 {project}:\n");
        let values = self.session.project_data.get(project);
        for (i, field) in PROJECT_FIELDS.iter().enumerate() {
            let value = values.and_then(|v| v.get(i)).map_or("", String::as_str);
            text.push_str(&format!("• {}: {value}\n", field.label));
        }
        text.push_str(&format!("\n¿Confirmar los datos de {project}? (si/no)"));
        text
    }

    fn submission_summary(&self) -> String {
        let mut text = String::from("📄 Resumen del reporte:\n\n");
        for field in PROFILE_FIELDS {
            text.push_str(&format!("{}: {}\n", field.label(), self.session.answer(field)));
        }
        for project in &self.session.selected_projects {
            text.push_str(&format!("\n📋 {project}:\n"));
            let values = self.session.project_data.get(project);
            for (i, field) in PROJECT_FIELDS.iter().enumerate() {
                let value = values.and_then(|v| v.get(i)).map_or("", String::as_str);
                text.push_str(&format!("• {}: {value}\n", field.label));
            }
        }
        text.push_str("\n¿Desea confirmar y enviar los datos? (si/no)");
        text
    }
}

/// Parse an affirmative/negative reply. Anything else is unrecognized.
pub fn parse_confirmation(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "si" | "sí" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

/// Single-select keyboard: one option per row, the staged choice marked,
/// and a trailing confirm button.
fn select_keyboard(options: &[&str], chosen: Option<&str>) -> Vec<Vec<Button>> {
    let mut rows: Vec<Vec<Button>> = options
        .iter()
        .map(|opt| {
            let marker = if Some(*opt) == chosen { "✅ " } else { "" };
            vec![Button {
                label: format!("{marker}{opt}"),
                data: (*opt).to_string(),
            }]
        })
        .collect();
    rows.push(vec![confirm_button()]);
    rows
}

/// Multi-select keyboard over the project catalog with the current
/// selection marked.
fn projects_keyboard(selected: &[String]) -> Vec<Vec<Button>> {
    let mut rows: Vec<Vec<Button>> = PROYECTOS
        .iter()
        .map(|opt| {
            let marker = if selected.iter().any(|s| s == opt) {
                "✅ "
            } else {
                ""
            };
            vec![Button {
                label: format!("{marker}{opt}"),
                data: (*opt).to_string(),
            }]
        })
        .collect();
    rows.push(vec![confirm_button()]);
    rows
}

fn confirm_button() -> Button {
    Button {
        label: "✅ Confirmar".to_string(),
        data: CONFIRM_DATA.to_string(),
    }
}

fn municipio_prompt() -> Prompt {
    Prompt {
        text: "🏙 Seleccione el MUNICIPIO:".to_string(),
        keyboard: Some(select_keyboard(MUNICIPIOS, None)),
        render: Render::Send,
    }
}

fn entidad_prompt() -> Prompt {
    Prompt {
        text: "🌍 Seleccione la ENTIDAD:".to_string(),
        keyboard: Some(select_keyboard(ENTIDADES, None)),
        render: Render::Send,
    }
}

fn cargo_prompt() -> Prompt {
    Prompt {
        text: "👔 Seleccione el CARGO:".to_string(),
        keyboard: Some(select_keyboard(CARGOS, None)),
        render: Render::Send,
    }
}
