use std::fmt;

use crate::i18n::Language;
use crate::list_view::StatusFilter;
use crate::task::{Task, TaskId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    List,
    Form,
}

impl fmt::Display for ViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewMode::List => f.write_str("list"),
            ViewMode::Form => f.write_str("form"),
        }
    }
}

/// Canonical task collection plus the view-control values. Reads are
/// public; every write goes through [`crate::app::TodoApp`].
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
    view: ViewMode,
    editing: Option<TaskId>,
    filter: StatusFilter,
    search: String,
    language: Language,
}

impl TaskStore {
    pub fn new(tasks: Vec<Task>, language: Language) -> Self {
        Self {
            tasks,
            language,
            ..Self::default()
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn view(&self) -> ViewMode {
        self.view
    }

    pub fn editing(&self) -> Option<TaskId> {
        self.editing
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Reads a task reference: a raw id, or `#N` for the N-th task in
    /// collection order (1-based). Only `#N` is checked against the
    /// collection.
    pub fn resolve_ref(&self, token: &str) -> Option<TaskId> {
        let token = token.trim();
        if let Some(position) = token.strip_prefix('#') {
            let idx = position.parse::<usize>().ok()?.checked_sub(1)?;
            return self.tasks.get(idx).map(|task| task.id);
        }
        token.parse::<TaskId>().ok()
    }

    pub fn highest_id(&self) -> Option<TaskId> {
        self.tasks.iter().map(|task| task.id).max()
    }

    pub(crate) fn push(&mut self, task: Task) {
        self.tasks.push(task);
    }

    /// Rewrites title and description in place. Returns `false` when the
    /// id is unknown.
    pub(crate) fn replace_text(&mut self, id: TaskId, title: &str, description: &str) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.title = title.to_string();
        task.description = description.to_string();
        true
    }

    pub(crate) fn remove(&mut self, id: TaskId) -> Option<Task> {
        let idx = self.tasks.iter().position(|task| task.id == id)?;
        Some(self.tasks.remove(idx))
    }

    pub(crate) fn flip_completed(&mut self, id: TaskId) -> Option<bool> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;
        task.completed = !task.completed;
        Some(task.completed)
    }

    pub(crate) fn show_list(&mut self) {
        self.view = ViewMode::List;
        self.editing = None;
    }

    pub(crate) fn show_form(&mut self, editing: Option<TaskId>) {
        self.view = ViewMode::Form;
        self.editing = editing;
    }

    pub(crate) fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    pub(crate) fn set_search(&mut self, search: &str) {
        self.search = search.to_string();
    }

    pub(crate) fn set_language(&mut self, language: Language) {
        self.language = language;
    }
}
