use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};
use uuid::Uuid;

use super::components::form::{
    index_of, optional_index, optional_options, pick, pick_optional, render_form, FormAction, FormField, FormState,
};
use crate::error::FieldErrors;
use crate::models::{Client, ClientCategory, ClientInput, ClientLegalType, ClientStatus};

pub enum ClientWizardAction {
    Cancel,
    Save(Option<Uuid>, ClientInput),
}

pub struct ClientWizardState {
    pub client_id: Option<Uuid>,
    pub form: FormState,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self::build(None, &ClientInput::default())
    }

    pub fn from_existing(client: &Client) -> Self {
        Self::build(Some(client.id), &ClientInput::from(client))
    }

    fn build(client_id: Option<Uuid>, input: &ClientInput) -> Self {
        let title = if client_id.is_some() { "Edit Client" } else { "New Client" };
        let fields = vec![
            FormField::text("name", "Name", input.name.clone()),
            FormField::text("email", "Email", input.email.clone()),
            FormField::text("phone", "Phone", input.phone.clone().unwrap_or_default()),
            FormField::text("website", "Website", input.website.clone().unwrap_or_default()),
            FormField::choice(
                "legal_type",
                "Legal type",
                optional_options(ClientLegalType::ALL.map(ClientLegalType::as_str)),
                optional_index(&ClientLegalType::ALL, input.legal_type.as_ref()),
            ),
            FormField::text("document", "Document", input.document.clone().unwrap_or_default()),
            FormField::text("address", "Address", input.address.clone().unwrap_or_default()),
            FormField::choice(
                "category",
                "Category",
                optional_options(ClientCategory::ALL.map(ClientCategory::as_str)),
                optional_index(&ClientCategory::ALL, input.category.as_ref()),
            ),
            FormField::choice(
                "status",
                "Status",
                ClientStatus::ALL.map(ClientStatus::as_str),
                index_of(&ClientStatus::ALL, &input.status),
            ),
            FormField::text("notes", "Notes", input.notes.clone().unwrap_or_default()),
            FormField::text("tags", "Tags (comma separated)", input.tags.join(", ")),
        ];
        Self {
            client_id,
            form: FormState::new(title, fields),
        }
    }

    pub fn input(&self) -> Result<ClientInput, FieldErrors> {
        let form = &self.form;
        Ok(ClientInput {
            name: form.text("name").to_string(),
            email: form.text("email").to_string(),
            phone: form.optional("phone"),
            website: form.optional("website"),
            legal_type: pick_optional(&ClientLegalType::ALL, form.choice("legal_type")),
            document: form.optional("document"),
            address: form.optional("address"),
            category: pick_optional(&ClientCategory::ALL, form.choice("category")),
            status: pick(&ClientStatus::ALL, form.choice("status")),
            notes: form.optional("notes"),
            tags: form.list("tags"),
        })
    }
}

impl Default for ClientWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    render_form(f, &state.form);
}

pub fn handle_input(state: &mut ClientWizardState, key: KeyCode) -> Option<ClientWizardAction> {
    match state.form.handle_key(key)? {
        FormAction::Cancel => Some(ClientWizardAction::Cancel),
        FormAction::Submit => match state.input() {
            Ok(input) => Some(ClientWizardAction::Save(state.client_id, input)),
            Err(errors) => {
                state.form.set_errors(errors);
                None
            }
        },
    }
}
