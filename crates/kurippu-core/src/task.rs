use serde::{Deserialize, Serialize};

pub type TaskId = u64;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub completed: bool,

    pub created_at: String,
}

impl Task {
    /// Builds a pending task. Title and description are trimmed here so
    /// that every stored task satisfies the trimmed-field invariant.
    pub fn new(id: TaskId, title: &str, description: &str, created_at: String) -> Self {
        Self {
            id,
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            completed: false,
            created_at,
        }
    }

    pub fn has_description(&self) -> bool {
        !self.description.is_empty()
    }
}
