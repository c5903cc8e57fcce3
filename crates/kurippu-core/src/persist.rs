use std::collections::BTreeMap;
use std::str::FromStr;

use anyhow::{Context, anyhow};
use tracing::{debug, info, warn};

use crate::i18n::Language;
use crate::task::Task;

pub const TODOS_KEY: &str = "todos";
pub const LANGUAGE_KEY: &str = "language";
pub const CORRUPT_TODOS_KEY: &str = "todos.corrupt";

/// Durable string-keyed storage, the shape of a browser's local storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// What to do when the stored task list does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecoveryPolicy {
    #[default]
    Fail,
    /// Copy the payload aside under [`CORRUPT_TODOS_KEY`] and start empty.
    Reset,
}

impl FromStr for RecoveryPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(Self::Fail),
            "reset" => Ok(Self::Reset),
            other => Err(anyhow!("invalid storage.on_corrupt setting: {other}")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hydrated {
    pub tasks: Vec<Task>,
    pub language: Language,
}

/// Full-snapshot write-through between the in-memory state and a
/// [`KeyValueStore`].
#[derive(Debug)]
pub struct PersistenceMirror<S> {
    storage: S,
    recovery: RecoveryPolicy,
}

impl<S: KeyValueStore> PersistenceMirror<S> {
    pub fn new(storage: S, recovery: RecoveryPolicy) -> Self {
        Self { storage, recovery }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    #[tracing::instrument(skip(self))]
    pub fn hydrate(&mut self, default_language: Language) -> anyhow::Result<Hydrated> {
        let tasks = self.read_tasks()?;

        let language = match self.storage.get(LANGUAGE_KEY)? {
            Some(raw) => match raw.parse::<Language>() {
                Ok(lang) => lang,
                Err(err) => {
                    warn!(stored = %raw, error = %err, "ignoring stored language");
                    default_language
                }
            },
            None => default_language,
        };

        info!(tasks = tasks.len(), %language, "hydrated state");
        Ok(Hydrated { tasks, language })
    }

    fn read_tasks(&mut self) -> anyhow::Result<Vec<Task>> {
        let Some(raw) = self.storage.get(TODOS_KEY)? else {
            debug!("no stored task list; starting empty");
            return Ok(vec![]);
        };

        match serde_json::from_str::<Vec<Task>>(&raw) {
            Ok(tasks) => Ok(tasks),
            Err(err) => match self.recovery {
                RecoveryPolicy::Fail => Err(err).with_context(|| {
                    format!(
                        "stored `{TODOS_KEY}` payload is not a valid task list \
                         (set storage.on_corrupt=reset to start over)"
                    )
                }),
                RecoveryPolicy::Reset => {
                    warn!(
                        error = %err,
                        backup = CORRUPT_TODOS_KEY,
                        "stored task list is malformed; starting empty"
                    );
                    self.storage
                        .set(CORRUPT_TODOS_KEY, &raw)
                        .context("failed to back up malformed task list")?;
                    Ok(vec![])
                }
            },
        }
    }

    #[tracing::instrument(skip(self, tasks), fields(count = tasks.len()))]
    pub fn write_tasks(&mut self, tasks: &[Task]) -> anyhow::Result<()> {
        let payload = serde_json::to_string(tasks)?;
        self.storage
            .set(TODOS_KEY, &payload)
            .with_context(|| format!("failed to write `{TODOS_KEY}`"))?;
        debug!(bytes = payload.len(), "wrote task snapshot");
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn write_language(&mut self, language: Language) -> anyhow::Result<()> {
        self.storage
            .set(LANGUAGE_KEY, language.code())
            .with_context(|| format!("failed to write `{LANGUAGE_KEY}`"))
    }
}
