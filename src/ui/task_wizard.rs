use crossterm::event::KeyCode;
use tui::{backend::Backend, Frame};
use uuid::Uuid;

use super::components::form::{
    index_of, optional_index, optional_options, pick, pick_optional, render_form, FormAction, FormField, FormState,
};
use crate::error::FieldErrors;
use crate::models::{Priority, Stage, Task, TaskChanges, TaskInput, UserSummary};

pub enum TaskWizardAction {
    Cancel,
    Create {
        stage_id: Uuid,
        input: TaskInput,
    },
    /// `stage_id` is set when the task should change column.
    Update {
        task_id: Uuid,
        changes: TaskChanges,
        stage_id: Option<Uuid>,
    },
}

enum Target {
    New(Uuid),
    Existing { task_id: Uuid, stage_id: Uuid },
}

pub struct TaskWizardState {
    target: Target,
    user_ids: Vec<Uuid>,
    stage_ids: Vec<Uuid>,
    pub form: FormState,
}

impl TaskWizardState {
    pub fn new(stage_id: Uuid, users: &[UserSummary]) -> Self {
        let fields = Self::fields(
            users,
            "",
            None,
            Priority::default(),
            None,
            String::new(),
            String::new(),
        );
        Self {
            target: Target::New(stage_id),
            user_ids: users.iter().map(|u| u.id).collect(),
            stage_ids: Vec::new(),
            form: FormState::new("New Task", fields),
        }
    }

    pub fn from_existing(task: &Task, users: &[UserSummary], stages: &[Stage]) -> Self {
        let due = task.due_date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default();
        let mut fields = Self::fields(
            users,
            &task.title,
            task.description.as_deref(),
            task.priority,
            task.assignee_id,
            due,
            task.tags.join(", "),
        );
        let stage_ids: Vec<Uuid> = stages.iter().map(|s| s.id).collect();
        fields.push(FormField::choice(
            "stage",
            "Column",
            stages.iter().map(|s| s.name.clone()),
            index_of(&stage_ids, &task.stage_id),
        ));

        Self {
            target: Target::Existing {
                task_id: task.id,
                stage_id: task.stage_id,
            },
            user_ids: users.iter().map(|u| u.id).collect(),
            stage_ids,
            form: FormState::new("Edit Task", fields),
        }
    }

    fn fields(
        users: &[UserSummary],
        title: &str,
        description: Option<&str>,
        priority: Priority,
        assignee_id: Option<Uuid>,
        due: String,
        tags: String,
    ) -> Vec<FormField> {
        let user_ids: Vec<Uuid> = users.iter().map(|u| u.id).collect();
        vec![
            FormField::text("title", "Title", title),
            FormField::text("description", "Description", description.unwrap_or_default()),
            FormField::choice(
                "priority",
                "Priority",
                Priority::ALL.map(Priority::as_str),
                index_of(&Priority::ALL, &priority),
            ),
            FormField::choice(
                "assignee",
                "Assignee",
                optional_options(users.iter().map(|u| u.full_name.clone())),
                optional_index(&user_ids, assignee_id.as_ref()),
            ),
            FormField::text("due_date", "Due (YYYY-MM-DD)", due),
            FormField::text("tags", "Tags (comma separated)", tags),
        ]
    }

    fn submit(&self) -> Result<TaskWizardAction, FieldErrors> {
        let form = &self.form;
        let mut errors = FieldErrors::new();
        let title = form.text("title").to_string();
        let description = form.optional("description");
        let priority = pick(&Priority::ALL, form.choice("priority"));
        let assignee_id = pick_optional(&self.user_ids, form.choice("assignee"));
        let due_date = form.optional_date("due_date", &mut errors);
        let tags = form.list("tags");
        errors.into_result()?;

        Ok(match self.target {
            Target::New(stage_id) => TaskWizardAction::Create {
                stage_id,
                input: TaskInput {
                    title,
                    description,
                    priority: Some(priority),
                    assignee_id,
                    due_date,
                    tags,
                },
            },
            Target::Existing { task_id, stage_id } => {
                let target_stage = self.stage_ids.get(form.choice("stage")).copied();
                TaskWizardAction::Update {
                    task_id,
                    changes: TaskChanges {
                        title: Some(title),
                        description: Some(description),
                        priority: Some(priority),
                        assignee_id: Some(assignee_id),
                        due_date: Some(due_date),
                        tags: Some(tags),
                    },
                    stage_id: target_stage.filter(|id| *id != stage_id),
                }
            }
        })
    }
}

pub fn render_task_wizard<B: Backend>(f: &mut Frame<B>, state: &mut TaskWizardState) {
    render_form(f, &state.form);
}

pub fn handle_input(state: &mut TaskWizardState, key: KeyCode) -> Option<TaskWizardAction> {
    match state.form.handle_key(key)? {
        FormAction::Cancel => Some(TaskWizardAction::Cancel),
        FormAction::Submit => match state.submit() {
            Ok(action) => Some(action),
            Err(errors) => {
                state.form.set_errors(errors);
                None
            }
        },
    }
}
