use anyhow::Context;
use tracing::{debug, info, instrument};

use crate::clock::{
    Clock, DEFAULT_DATE_FORMAT, SystemClock, format_created_at, next_task_id,
    validate_date_format,
};
use crate::config::Config;
use crate::form::{FormMode, FormView};
use crate::i18n::{self, Language};
use crate::list_view::{Counts, ListView, StatusFilter};
use crate::persist::{KeyValueStore, PersistenceMirror, RecoveryPolicy};
use crate::store::{TaskStore, ViewMode};
use crate::task::{Task, TaskId};

/// Yes/no gate consulted before a destructive action.
pub trait Confirmer {
    fn confirm(&mut self, message: &str) -> bool;
}

impl<F> Confirmer for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, message: &str) -> bool {
        self(message)
    }
}

#[derive(Debug, Clone)]
pub struct AppOptions {
    pub default_language: Language,
    pub date_format: String,
    pub recovery: RecoveryPolicy,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            default_language: Language::En,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            recovery: RecoveryPolicy::Fail,
        }
    }
}

impl AppOptions {
    pub fn from_config(cfg: &Config) -> anyhow::Result<Self> {
        let mut options = Self::default();

        if let Some(code) = cfg.get("language") {
            options.default_language = code
                .parse()
                .context("invalid `language` setting")?;
        }
        if let Some(format) = cfg.get("date.format") {
            validate_date_format(&format).context("invalid `date.format` setting")?;
            options.date_format = format;
        }
        if let Some(policy) = cfg.get("storage.on_corrupt") {
            options.recovery = policy.parse()?;
        }

        Ok(options)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Blank title; the form stays open.
    Rejected,
    Created(TaskId),
    Updated(TaskId),
    /// The task being edited no longer exists.
    Missing(TaskId),
}

/// The application controller and sole mutator of [`TaskStore`]. Every
/// change to the collection is written through to storage before the
/// operation returns.
#[derive(Debug)]
pub struct TodoApp<S, C = SystemClock> {
    store: TaskStore,
    mirror: PersistenceMirror<S>,
    clock: C,
    date_format: String,
}

impl<S: KeyValueStore, C: Clock> TodoApp<S, C> {
    #[instrument(skip(storage, clock, options))]
    pub fn open(storage: S, clock: C, options: AppOptions) -> anyhow::Result<Self> {
        validate_date_format(&options.date_format)?;

        let mut mirror = PersistenceMirror::new(storage, options.recovery);
        let hydrated = mirror.hydrate(options.default_language)?;

        Ok(Self {
            store: TaskStore::new(hydrated.tasks, hydrated.language),
            mirror,
            clock,
            date_format: options.date_format,
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn tasks(&self) -> &[Task] {
        self.store.tasks()
    }

    pub fn view(&self) -> ViewMode {
        self.store.view()
    }

    pub fn language(&self) -> Language {
        self.store.language()
    }

    pub fn storage(&self) -> &S {
        self.mirror.storage()
    }

    pub fn into_storage(self) -> S {
        self.mirror.into_storage()
    }

    pub fn t<'a>(&self, key: &'a str) -> &'a str {
        i18n::t(self.store.language(), key)
    }

    pub fn list_view(&self) -> ListView<'_> {
        ListView::build(
            self.store.tasks(),
            self.store.filter(),
            self.store.search(),
        )
    }

    pub fn counts(&self) -> Counts {
        Counts::of(self.store.tasks())
    }

    /// Appends a new pending task. Returns `None` without touching state
    /// when the trimmed title is empty.
    #[instrument(skip(self, title, description))]
    pub fn create(&mut self, title: &str, description: &str) -> anyhow::Result<Option<TaskId>> {
        if title.trim().is_empty() {
            debug!("create ignored: empty title");
            return Ok(None);
        }

        let now = self.clock.now();
        let id = next_task_id(now, self.store.highest_id());
        let task = Task::new(id, title, description, format_created_at(now, &self.date_format));

        self.store.push(task);
        self.store.show_list();
        self.persist_tasks()?;

        info!(id, total = self.store.tasks().len(), "task created");
        Ok(Some(id))
    }

    #[instrument(skip(self, title, description))]
    pub fn update(&mut self, id: TaskId, title: &str, description: &str) -> anyhow::Result<bool> {
        let title = title.trim();
        if title.is_empty() {
            debug!("update ignored: empty title");
            return Ok(false);
        }

        let changed = self.store.replace_text(id, title, description.trim());
        self.store.show_list();
        if !changed {
            debug!("update ignored: no such task");
            return Ok(false);
        }

        self.persist_tasks()?;
        info!("task updated");
        Ok(true)
    }

    /// Removes a task once `confirmer` agrees. Unknown ids return `false`
    /// without prompting.
    #[instrument(skip(self, confirmer))]
    pub fn delete(&mut self, id: TaskId, confirmer: &mut dyn Confirmer) -> anyhow::Result<bool> {
        if self.store.get(id).is_none() {
            debug!("delete ignored: no such task");
            return Ok(false);
        }

        if !confirmer.confirm(self.t("deleteConfirm")) {
            info!("delete declined");
            return Ok(false);
        }

        self.store.remove(id);
        self.persist_tasks()?;
        info!(remaining = self.store.tasks().len(), "task deleted");
        Ok(true)
    }

    #[instrument(skip(self))]
    pub fn toggle(&mut self, id: TaskId) -> anyhow::Result<bool> {
        let Some(completed) = self.store.flip_completed(id) else {
            debug!("toggle ignored: no such task");
            return Ok(false);
        };

        self.persist_tasks()?;
        info!(completed, "task toggled");
        Ok(true)
    }

    pub fn begin_add(&mut self) -> FormView {
        self.store.show_form(None);
        FormView::create()
    }

    /// Stages `id` for editing. Unknown ids leave the list view in place.
    pub fn begin_edit(&mut self, id: TaskId) -> Option<FormView> {
        let form = FormView::edit(self.store.get(id)?);
        self.store.show_form(Some(id));
        Some(form)
    }

    /// Drops the staged values and returns to the list.
    pub fn cancel(&mut self, form: FormView) {
        debug!(mode = ?form.mode(), "form cancelled");
        self.store.show_list();
    }

    #[instrument(skip(self, form), fields(mode = ?form.mode()))]
    pub fn save(&mut self, form: &FormView) -> anyhow::Result<SaveOutcome> {
        let Some(draft) = form.submit() else {
            debug!("save rejected: empty title");
            return Ok(SaveOutcome::Rejected);
        };

        match form.mode() {
            FormMode::Create => {
                let id = self.create(&draft.title, &draft.description)?;
                Ok(id.map_or(SaveOutcome::Rejected, SaveOutcome::Created))
            }
            FormMode::Edit(id) => {
                if self.update(id, &draft.title, &draft.description)? {
                    Ok(SaveOutcome::Updated(id))
                } else {
                    Ok(SaveOutcome::Missing(id))
                }
            }
        }
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        debug!(%filter, "filter changed");
        self.store.set_filter(filter);
    }

    pub fn set_search(&mut self, search: &str) {
        debug!(search, "search changed");
        self.store.set_search(search);
    }

    #[instrument(skip(self))]
    pub fn set_language(&mut self, language: Language) -> anyhow::Result<()> {
        if self.store.language() == language {
            return Ok(());
        }
        self.store.set_language(language);
        self.mirror.write_language(language)?;
        info!("language changed");
        Ok(())
    }

    pub fn toggle_language(&mut self) -> anyhow::Result<Language> {
        let next = self.store.language().toggled();
        self.set_language(next)?;
        Ok(next)
    }

    fn persist_tasks(&mut self) -> anyhow::Result<()> {
        self.mirror.write_tasks(self.store.tasks())
    }
}
