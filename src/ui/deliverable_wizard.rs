use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};
use uuid::Uuid;

use super::components::form::{index_of, pick, render_form, FormAction, FormField, FormState};
use crate::error::FieldErrors;
use crate::models::{Deliverable, DeliverableEdit, DeliverableStatus, DeliverableType, DeliverableUpload};

pub enum DeliverableWizardAction {
    Cancel,
    /// The file at `path` still has to be read into `upload.bytes`.
    Upload { path: PathBuf, upload: DeliverableUpload },
    Update(Uuid, DeliverableEdit),
}

enum Target {
    New(Uuid),
    Existing(Box<Deliverable>),
}

/// Statuses an edit can pick. A reviewed deliverable may keep its review.
fn editable_statuses(current: DeliverableStatus) -> Vec<DeliverableStatus> {
    DeliverableStatus::ALL
        .into_iter()
        .filter(|s| !s.is_review() || *s == current)
        .collect()
}

pub struct DeliverableWizardState {
    target: Target,
    pub form: FormState,
}

impl DeliverableWizardState {
    pub fn new(project_id: Uuid) -> Self {
        let fields = vec![
            FormField::text("name", "Name", ""),
            FormField::choice("kind", "Type", DeliverableType::ALL.map(DeliverableType::as_str), 0),
            FormField::text("description", "Description", ""),
            FormField::text("path", "File path", ""),
            FormField::text("tags", "Tags (comma separated)", ""),
        ];
        Self {
            target: Target::New(project_id),
            form: FormState::new("Upload Deliverable", fields),
        }
    }

    pub fn from_existing(deliverable: &Deliverable) -> Self {
        let statuses = editable_statuses(deliverable.status);
        let fields = vec![
            FormField::text("name", "Name", deliverable.name.clone()),
            FormField::choice(
                "kind",
                "Type",
                DeliverableType::ALL.map(DeliverableType::as_str),
                index_of(&DeliverableType::ALL, &deliverable.kind),
            ),
            FormField::text("description", "Description", deliverable.description.clone().unwrap_or_default()),
            FormField::choice(
                "status",
                "Status",
                statuses.iter().map(|s| s.as_str()),
                index_of(&statuses, &deliverable.status),
            ),
            FormField::text("tags", "Tags (comma separated)", deliverable.tags.join(", ")),
        ];
        Self {
            target: Target::Existing(Box::new(deliverable.clone())),
            form: FormState::new(format!("Edit {} (v{})", deliverable.name, deliverable.version), fields),
        }
    }

    fn submit(&self) -> Result<DeliverableWizardAction, FieldErrors> {
        let form = &self.form;
        match &self.target {
            Target::New(project_id) => {
                let path = PathBuf::from(form.text("path"));
                let file_name = Path::new(&path)
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();
                if file_name.is_empty() {
                    let mut errors = FieldErrors::new();
                    errors.add("path", "Choose a file to upload");
                    return Err(errors);
                }
                Ok(DeliverableWizardAction::Upload {
                    path,
                    upload: DeliverableUpload {
                        project_id: *project_id,
                        task_id: None,
                        name: form.text("name").to_string(),
                        kind: pick(&DeliverableType::ALL, form.choice("kind")),
                        description: form.optional("description"),
                        file_name,
                        bytes: Vec::new(),
                        tags: form.list("tags"),
                    },
                })
            }
            Target::Existing(deliverable) => {
                let edit = DeliverableEdit {
                    task_id: deliverable.task_id,
                    name: form.text("name").to_string(),
                    kind: pick(&DeliverableType::ALL, form.choice("kind")),
                    description: form.optional("description"),
                    status: pick(&editable_statuses(deliverable.status), form.choice("status")),
                    tags: form.list("tags"),
                };
                Ok(DeliverableWizardAction::Update(deliverable.id, edit))
            }
        }
    }
}

pub fn render_deliverable_wizard<B: Backend>(f: &mut Frame<B>, state: &mut DeliverableWizardState) {
    render_form(f, &state.form);
}

pub fn handle_input(state: &mut DeliverableWizardState, key: KeyCode) -> Option<DeliverableWizardAction> {
    match state.form.handle_key(key)? {
        FormAction::Cancel => Some(DeliverableWizardAction::Cancel),
        FormAction::Submit => match state.submit() {
            Ok(action) => Some(action),
            Err(errors) => {
                state.form.set_errors(errors);
                None
            }
        },
    }
}
