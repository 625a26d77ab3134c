//! Generic wizard form: a vertical list of labelled fields, navigated with
//! Up/Down, edited after Enter, saved with `s` and abandoned with Esc.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::date_input::DateInputState;
use crate::error::FieldErrors;

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text(String),
    Secret(String),
    Choice { options: Vec<String>, selected: usize },
    Toggle(bool),
    Date(DateInputState),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

impl FormField {
    pub fn text(key: &'static str, label: &'static str, value: impl Into<String>) -> Self {
        Self { key, label, kind: FieldKind::Text(value.into()) }
    }

    pub fn secret(key: &'static str, label: &'static str) -> Self {
        Self { key, label, kind: FieldKind::Secret(String::new()) }
    }

    /// `options[0]` is conventionally the "none" entry for optional enums.
    pub fn choice<S: Into<String>>(
        key: &'static str,
        label: &'static str,
        options: impl IntoIterator<Item = S>,
        selected: usize,
    ) -> Self {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        let selected = selected.min(options.len().saturating_sub(1));
        Self { key, label, kind: FieldKind::Choice { options, selected } }
    }

    pub fn toggle(key: &'static str, label: &'static str, on: bool) -> Self {
        Self { key, label, kind: FieldKind::Toggle(on) }
    }

    pub fn date(key: &'static str, label: &'static str, input: DateInputState) -> Self {
        Self { key, label, kind: FieldKind::Date(input) }
    }

    fn display(&self, editing: bool) -> String {
        match &self.kind {
            FieldKind::Text(value) if editing => format!("{value}|"),
            FieldKind::Text(value) => value.clone(),
            FieldKind::Secret(value) => {
                let cursor = if editing { "|" } else { "" };
                format!("{}{cursor}", "*".repeat(value.chars().count()))
            }
            FieldKind::Choice { options, selected } => {
                format!("< {} >", options.get(*selected).map(String::as_str).unwrap_or_default())
            }
            FieldKind::Toggle(on) => (if *on { "[x]" } else { "[ ]" }).to_string(),
            FieldKind::Date(input) => input.display(),
        }
    }
}

pub enum FormAction {
    Cancel,
    Submit,
}

pub struct FormState {
    pub title: String,
    fields: Vec<FormField>,
    current: usize,
    editing: bool,
    errors: FieldErrors,
}

impl FormState {
    pub fn new(title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            title: title.into(),
            fields,
            current: 0,
            editing: false,
            errors: FieldErrors::new(),
        }
    }

    pub fn set_errors(&mut self, errors: FieldErrors) {
        self.errors = errors;
    }

    fn field(&self, key: &str) -> Option<&FieldKind> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.kind)
    }

    fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.current = (self.current + 1) % self.fields.len();
        }
    }

    fn previous_field(&mut self) {
        if !self.fields.is_empty() {
            self.current = (self.current + self.fields.len() - 1) % self.fields.len();
        }
    }

    fn toggle_editing(&mut self) {
        let Some(field) = self.fields.get_mut(self.current) else {
            return;
        };
        match &mut field.kind {
            FieldKind::Toggle(on) => *on = !*on,
            FieldKind::Choice { options, selected } => *selected = (*selected + 1) % options.len().max(1),
            FieldKind::Date(input) => {
                input.toggle_editing();
                self.editing = input.editing;
            }
            FieldKind::Text(_) | FieldKind::Secret(_) => self.editing = !self.editing,
        }
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        let Some(field) = self.fields.get_mut(self.current) else {
            return;
        };
        match (&mut field.kind, key) {
            (FieldKind::Text(value) | FieldKind::Secret(value), KeyCode::Char(c)) => value.push(c),
            (FieldKind::Text(value) | FieldKind::Secret(value), KeyCode::Backspace) => {
                value.pop();
            }
            (FieldKind::Date(input), key) => input.handle_key(key),
            _ => {}
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        if let Some(FieldKind::Choice { options, selected }) = self.fields.get_mut(self.current).map(|f| &mut f.kind) {
            let len = options.len().max(1);
            *selected = if forward { (*selected + 1) % len } else { (*selected + len - 1) % len };
        }
    }

    pub fn handle_key(&mut self, key: KeyCode) -> Option<FormAction> {
        match key {
            KeyCode::Esc if self.editing => self.toggle_editing(),
            KeyCode::Esc => return Some(FormAction::Cancel),
            KeyCode::Enter => self.toggle_editing(),
            _ if self.editing => self.edit_current_field(key),
            KeyCode::Up => self.previous_field(),
            KeyCode::Down | KeyCode::Tab => self.next_field(),
            KeyCode::Left => self.cycle_choice(false),
            KeyCode::Right => self.cycle_choice(true),
            KeyCode::Char('s') => return Some(FormAction::Submit),
            _ => {}
        }
        None
    }

    /// Raw text of a text or secret field, trimmed.
    pub fn text(&self, key: &str) -> &str {
        match self.field(key) {
            Some(FieldKind::Text(v) | FieldKind::Secret(v)) => v.trim(),
            _ => "",
        }
    }

    /// `None` when the field is blank.
    pub fn optional(&self, key: &str) -> Option<String> {
        Some(self.text(key)).filter(|v| !v.is_empty()).map(str::to_string)
    }

    /// Comma separated values, blanks dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.text(key)
            .split(',')
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parses an optional number, recording a field error when it is not one.
    pub fn number<T: FromStr>(&self, key: &str, errors: &mut FieldErrors) -> Option<T> {
        let raw = self.text(key);
        if raw.is_empty() {
            return None;
        }
        match raw.replace(',', ".").parse() {
            Ok(n) => Some(n),
            Err(_) => {
                errors.add(key, "Must be a number");
                None
            }
        }
    }

    /// An optional `YYYY-MM-DD` typed into a text field.
    pub fn optional_date(&self, key: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
        let raw = self.text(key);
        if raw.is_empty() {
            return None;
        }
        match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => {
                errors.add(key, "Use YYYY-MM-DD");
                None
            }
        }
    }

    pub fn choice(&self, key: &str) -> usize {
        match self.field(key) {
            Some(FieldKind::Choice { selected, .. }) => *selected,
            _ => 0,
        }
    }

    pub fn toggled(&self, key: &str) -> bool {
        matches!(self.field(key), Some(FieldKind::Toggle(true)))
    }

    pub fn date(&self, key: &str) -> Option<NaiveDate> {
        match self.field(key) {
            Some(FieldKind::Date(input)) => Some(input.as_date()),
            _ => None,
        }
    }

    pub fn date_time(&self, key: &str) -> Option<DateTime<Utc>> {
        match self.field(key) {
            Some(FieldKind::Date(input)) => Some(input.as_utc()),
            _ => None,
        }
    }
}

pub fn render_form<B: Backend>(f: &mut Frame<B>, form: &FormState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([Constraint::Length(3), Constraint::Min(10), Constraint::Length(3)].as_ref())
        .split(f.size());

    let title = Paragraph::new(form.title.as_str())
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_fields(f, form, chunks[1]);

    let help_text = if form.editing {
        "Enter - Done | Esc - Stop editing"
    } else {
        "Enter - Edit | Left/Right - Change option | Up/Down - Navigate | S - Save | Esc - Cancel"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

fn render_fields<B: Backend>(f: &mut Frame<B>, form: &FormState, area: Rect) {
    let items: Vec<ListItem> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == form.current;
            let editing = selected && form.editing;
            let label_style = if selected { Style::default().fg(Color::Yellow) } else { Style::default() };
            let value_style = if editing { Style::default().add_modifier(Modifier::BOLD) } else { Style::default() };

            let mut lines = vec![Spans::from(vec![
                Span::styled(format!("{}: ", field.label), label_style),
                Span::styled(field.display(editing), value_style),
            ])];
            for message in form.errors.get(field.key).unwrap_or_default() {
                lines.push(Spans::from(Span::styled(
                    format!("    {message}"),
                    Style::default().fg(Color::Red),
                )));
            }
            ListItem::new(lines)
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title("Details"));
    f.render_widget(list, area);
}

/// Option labels for an optional enum: a leading "-" stands for none.
pub fn optional_options<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Vec<String> {
    std::iter::once("-".to_string()).chain(values.into_iter().map(Into::into)).collect()
}

pub fn index_of<T: PartialEq>(all: &[T], value: &T) -> usize {
    all.iter().position(|v| v == value).unwrap_or(0)
}

/// Choice index for an optional value laid out by [`optional_options`].
pub fn optional_index<T: PartialEq>(all: &[T], value: Option<&T>) -> usize {
    value.and_then(|v| all.iter().position(|a| a == v)).map_or(0, |i| i + 1)
}

pub fn pick<T: Copy + Default>(all: &[T], selected: usize) -> T {
    all.get(selected).copied().unwrap_or_default()
}

pub fn pick_optional<T: Copy>(all: &[T], selected: usize) -> Option<T> {
    selected.checked_sub(1).and_then(|i| all.get(i)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> FormState {
        FormState::new(
            "Test",
            vec![
                FormField::text("name", "Name", ""),
                FormField::choice("status", "Status", vec!["A", "B", "C"], 0),
                FormField::text("area", "Area", "12,5"),
            ],
        )
    }

    #[test]
    fn typing_requires_edit_mode() {
        let mut form = form();
        form.handle_key(KeyCode::Char('x'));
        assert_eq!(form.text("name"), "");

        form.handle_key(KeyCode::Enter);
        for c in "Casa".chars() {
            form.handle_key(KeyCode::Char(c));
        }
        form.handle_key(KeyCode::Char('s'));
        form.handle_key(KeyCode::Enter);
        assert_eq!(form.text("name"), "Casas");
        assert!(matches!(form.handle_key(KeyCode::Char('s')), Some(FormAction::Submit)));
    }

    #[test]
    fn choices_cycle_both_ways() {
        let mut form = form();
        form.handle_key(KeyCode::Down);
        form.handle_key(KeyCode::Left);
        assert_eq!(form.choice("status"), 2);
        form.handle_key(KeyCode::Right);
        assert_eq!(form.choice("status"), 0);
    }

    #[test]
    fn numbers_accept_decimal_comma() {
        let form = form();
        let mut errors = FieldErrors::new();
        assert_eq!(form.number::<f64>("area", &mut errors), Some(12.5));
        assert_eq!(form.number::<i32>("area", &mut errors), None);
        assert!(errors.contains("area"));
    }
}
