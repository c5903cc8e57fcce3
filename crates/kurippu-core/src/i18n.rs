use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::anyhow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
  #[default]
  En,
  Ml
}

impl Language {
  pub const ALL: [Language; 2] =
    [Language::En, Language::Ml];

  pub fn code(self) -> &'static str {
    match self {
      | Language::En => "en",
      | Language::Ml => "ml"
    }
  }

  /// The other supported language, as
  /// the header toggle flips it.
  pub fn toggled(self) -> Self {
    match self {
      | Language::En => Language::Ml,
      | Language::Ml => Language::En
    }
  }
}

impl fmt::Display for Language {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.code())
  }
}

impl FromStr for Language {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s.trim() {
      | "en" => Ok(Language::En),
      | "ml" => Ok(Language::Ml),
      | other => Err(anyhow!(
        "unsupported language code: \
         {other}"
      ))
    }
  }
}

const EN: &[(&str, &str)] = &[
  ("appTitle", "Todo App"),
  (
    "tagline",
    "Stay organized, achieve more, \
     live better"
  ),
  ("addTodo", "Add Task"),
  ("editTodo", "Edit Task"),
  ("title", "Title"),
  (
    "titlePlaceholder",
    "Enter task title..."
  ),
  ("description", "Description"),
  (
    "descriptionPlaceholder",
    "Enter task description..."
  ),
  ("save", "Save"),
  ("cancel", "Cancel"),
  ("all", "All"),
  ("pending", "Pending"),
  ("completed", "Completed"),
  (
    "searchPlaceholder",
    "Search tasks..."
  ),
  ("noTasks", "No tasks found"),
  (
    "noTasksDesc",
    "Start by adding your first task"
  ),
  ("totalTasks", "Total Tasks"),
  ("completedTasks", "Completed"),
  ("pendingTasks", "Pending"),
  ("created", "Created"),
  (
    "deleteConfirm",
    "Are you sure you want to delete \
     this task?"
  ),
  ("languageName", "English")
];

const ML: &[(&str, &str)] = &[
  ("appTitle", "ടുഡു ആപ്പ്"),
  (
    "tagline",
    "ക്രമീകരിക്കൂ, കൂടുതൽ നേടൂ, \
     നന്നായി ജീവിക്കൂ"
  ),
  ("addTodo", "ടാസ്ക് ചേർക്കുക"),
  ("editTodo", "ടാസ്ക് തിരുത്തുക"),
  ("title", "തലക്കെട്ട്"),
  (
    "titlePlaceholder",
    "ടാസ്കിന്റെ തലക്കെട്ട് നൽകുക..."
  ),
  ("description", "വിവരണം"),
  (
    "descriptionPlaceholder",
    "ടാസ്കിന്റെ വിവരണം നൽകുക..."
  ),
  ("save", "സേവ് ചെയ്യുക"),
  ("cancel", "റദ്ദാക്കുക"),
  ("all", "എല്ലാം"),
  ("pending", "ബാക്കിയുള്ളവ"),
  ("completed", "പൂർത്തിയായവ"),
  (
    "searchPlaceholder",
    "ടാസ്കുകൾ തിരയുക..."
  ),
  (
    "noTasks",
    "ടാസ്കുകൾ ഒന്നും കണ്ടെത്തിയില്ല"
  ),
  (
    "noTasksDesc",
    "നിങ്ങളുടെ ആദ്യ ടാസ്ക് ചേർത്ത് \
     തുടങ്ങൂ"
  ),
  ("totalTasks", "ആകെ ടാസ്കുകൾ"),
  ("completedTasks", "പൂർത്തിയായവ"),
  ("pendingTasks", "ബാക്കിയുള്ളവ"),
  ("created", "സൃഷ്ടിച്ചത്"),
  (
    "deleteConfirm",
    "ഈ ടാസ്ക് ഇല്ലാതാക്കണമെന്ന് \
     ഉറപ്പാണോ?"
  ),
  ("languageName", "മലയാളം")
];

/// Language code -> text key -> display
/// text.
#[derive(Debug, Clone)]
pub struct Catalog {
  tables: HashMap<
    &'static str,
    HashMap<&'static str, &'static str>
  >
}

impl Catalog {
  pub fn builtin() -> &'static Catalog {
    static CATALOG: OnceLock<Catalog> =
      OnceLock::new();
    CATALOG.get_or_init(|| {
      let mut tables = HashMap::new();
      tables.insert(
        Language::En.code(),
        EN.iter().copied().collect()
      );
      tables.insert(
        Language::Ml.code(),
        ML.iter().copied().collect()
      );
      Catalog { tables }
    })
  }

  /// Resolves `key` for `lang`. A miss
  /// at either level yields `key`
  /// itself.
  pub fn lookup<'a>(
    &self,
    lang: Language,
    key: &'a str
  ) -> &'a str {
    self
      .tables
      .get(lang.code())
      .and_then(|table| {
        table.get(key).copied()
      })
      .unwrap_or(key)
  }
}

pub fn t(
  lang: Language,
  key: &str
) -> &str {
  Catalog::builtin().lookup(lang, key)
}
