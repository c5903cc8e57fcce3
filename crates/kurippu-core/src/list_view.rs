use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use tracing::trace;

use crate::task::Task;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub enum StatusFilter {
  #[default]
  All,
  Pending,
  Completed
}

impl StatusFilter {
  pub const ALL: [StatusFilter; 3] = [
    StatusFilter::All,
    StatusFilter::Pending,
    StatusFilter::Completed
  ];

  /// Also the interface text key for
  /// the filter button.
  pub fn as_str(self) -> &'static str {
    match self {
      | StatusFilter::All => "all",
      | StatusFilter::Pending => {
        "pending"
      }
      | StatusFilter::Completed => {
        "completed"
      }
    }
  }

  pub fn accepts(
    self,
    task: &Task
  ) -> bool {
    match self {
      | StatusFilter::All => true,
      | StatusFilter::Pending => {
        !task.completed
      }
      | StatusFilter::Completed => {
        task.completed
      }
    }
  }
}

impl fmt::Display for StatusFilter {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for StatusFilter {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "all" => Ok(StatusFilter::All),
      | "pending" => {
        Ok(StatusFilter::Pending)
      }
      | "completed" => {
        Ok(StatusFilter::Completed)
      }
      | other => Err(anyhow!(
        "unknown filter: {other} \
         (expected all, pending or \
         completed)"
      ))
    }
  }
}

/// Search text plus status filter, as
/// held by the list view.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
  filter: StatusFilter,
  needle: String
}

impl ListQuery {
  pub fn new(
    filter: StatusFilter,
    search: &str
  ) -> Self {
    Self {
      filter,
      needle: search.to_lowercase()
    }
  }

  pub fn matches(
    &self,
    task: &Task
  ) -> bool {
    let text_match = task
      .title
      .to_lowercase()
      .contains(&self.needle)
      || task
        .description
        .to_lowercase()
        .contains(&self.needle);

    let ok =
      text_match && self.filter.accepts(task);
    trace!(
      id = task.id,
      filter = %self.filter,
      ok,
      "list query evaluation"
    );
    ok
  }

  pub fn apply<'a>(
    &self,
    tasks: &'a [Task]
  ) -> Vec<&'a Task> {
    tasks
      .iter()
      .filter(|task| self.matches(task))
      .collect()
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
)]
pub struct Counts {
  pub total:     usize,
  pub completed: usize,
  pub pending:   usize
}

impl Counts {
  pub fn of(tasks: &[Task]) -> Self {
    let total = tasks.len();
    let completed = tasks
      .iter()
      .filter(|task| task.completed)
      .count();
    Self {
      total,
      completed,
      pending: total - completed
    }
  }
}

/// Snapshot handed to renderers: the
/// visible subset in collection order,
/// plus counts over the whole
/// collection.
#[derive(Debug, Clone)]
pub struct ListView<'a> {
  pub visible: Vec<&'a Task>,
  pub counts:  Counts,
  pub filter:  StatusFilter,
  pub search:  String
}

impl<'a> ListView<'a> {
  pub fn build(
    tasks: &'a [Task],
    filter: StatusFilter,
    search: &str
  ) -> Self {
    let query =
      ListQuery::new(filter, search);
    Self {
      visible: query.apply(tasks),
      counts: Counts::of(tasks),
      filter,
      search: search.to_string()
    }
  }

  /// True whenever nothing is visible,
  /// whether the collection is empty or
  /// the query excluded everything.
  pub fn shows_empty_state(&self) -> bool {
    self.visible.is_empty()
  }
}
