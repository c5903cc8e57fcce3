use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(TaskId),
}

/// Trimmed field values ready to commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub description: String,
}

/// Staging buffers for one task. Nothing here touches the collection
/// until the form is handed back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    mode: FormMode,
    title: String,
    description: String,
}

impl FormView {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
        }
    }

    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit(task.id),
            title: task.title.clone(),
            description: task.description.clone(),
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    /// Interface text key for the form heading.
    pub fn heading_key(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "addTodo",
            FormMode::Edit(_) => "editTodo",
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// `None` when the trimmed title is empty.
    pub fn submit(&self) -> Option<Draft> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Draft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Draft, FormMode, FormView};
    use crate::task::Task;

    #[test]
    fn create_form_starts_empty_and_rejects_blank_title() {
        let mut form = FormView::create();
        assert_eq!(form.mode(), FormMode::Create);
        assert_eq!(form.title(), "");
        assert_eq!(form.description(), "");
        assert_eq!(form.submit(), None);

        form.set_title("   \t ");
        form.set_description("only a description");
        assert_eq!(form.submit(), None);
    }

    #[test]
    fn submit_trims_both_fields() {
        let mut form = FormView::create();
        form.set_title("  Buy milk  ");
        form.set_description("  2%  ");

        assert_eq!(
            form.submit(),
            Some(Draft {
                title: "Buy milk".to_string(),
                description: "2%".to_string(),
            })
        );
    }

    #[test]
    fn edit_form_stages_current_values() {
        let task = Task::new(42, "Pay rent", "before the 5th", "1/1/2026".to_string());
        let form = FormView::edit(&task);

        assert_eq!(form.mode(), FormMode::Edit(42));
        assert_eq!(form.heading_key(), "editTodo");
        assert_eq!(form.title(), "Pay rent");
        assert_eq!(form.description(), "before the 5th");
    }
}
