use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};

use super::components::form::{render_form, FormAction, FormField, FormState};
use crate::error::FieldErrors;

pub enum LoginAction {
    Quit,
    Submit { email: String, password: String },
}

pub struct LoginState {
    pub form: FormState,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            form: FormState::new(
                "ArchFlow - Sign in",
                vec![FormField::text("email", "Email", ""), FormField::secret("password", "Password")],
            ),
        }
    }

    /// Shown after a rejected sign-in; the message is deliberately generic.
    pub fn rejected(&mut self) {
        let mut errors = FieldErrors::new();
        errors.add("password", "Invalid email or password");
        self.form.set_errors(errors);
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_login<B: Backend>(f: &mut Frame<B>, state: &mut LoginState) {
    render_form(f, &state.form);
}

pub fn handle_input(state: &mut LoginState, key: KeyCode) -> Option<LoginAction> {
    match state.form.handle_key(key)? {
        FormAction::Cancel => Some(LoginAction::Quit),
        FormAction::Submit => Some(LoginAction::Submit {
            email: state.form.text("email").to_string(),
            password: state.form.text("password").to_string(),
        }),
    }
}
