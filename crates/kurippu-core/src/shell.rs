use std::io::{BufRead, Write};

use anyhow::{Context, anyhow};
use tracing::{debug, info, warn};

use crate::app::{SaveOutcome, TodoApp};
use crate::clock::Clock;
use crate::form::FormView;
use crate::list_view::StatusFilter;
use crate::persist::KeyValueStore;
use crate::render::Renderer;
use crate::store::ViewMode;

/// One line typed at the list-view prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListCommand {
    Refresh,
    Add,
    Edit(String),
    Delete(String),
    Toggle(String),
    Filter(StatusFilter),
    Search(String),
    Language,
    Help,
    Quit,
}

impl ListCommand {
    pub fn parse(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let with_ref = |make: fn(String) -> ListCommand| {
            if rest.is_empty() {
                Err(anyhow!("{head} needs a task id or #row"))
            } else {
                Ok(make(rest.to_string()))
            }
        };

        match head {
            "" => Ok(Self::Refresh),
            "a" | "add" => Ok(Self::Add),
            "e" | "edit" => with_ref(Self::Edit),
            "d" | "delete" => with_ref(Self::Delete),
            "t" | "toggle" => with_ref(Self::Toggle),
            "f" | "filter" => Ok(Self::Filter(rest.parse()?)),
            "s" | "search" => Ok(Self::Search(rest.to_string())),
            "l" | "lang" => Ok(Self::Language),
            "h" | "help" | "?" => Ok(Self::Help),
            "q" | "quit" | "exit" => Ok(Self::Quit),
            other => Err(anyhow!("unknown command: {other} (h for help)")),
        }
    }
}

const HELP: &str = "\
  a                 add a task
  e <id|#row>       edit a task
  d <id|#row>       delete a task
  t <id|#row>       toggle completed
  f <all|pending|completed>
  s [text]          search (empty clears)
  l                 switch language
  q                 quit";

/// Line-oriented session over any reader/writer pair. The list view is
/// re-rendered after every command; `a` and `e` switch to the form view
/// until the form is saved or cancelled.
pub struct Session<'a, S, C, R, W> {
    app: &'a mut TodoApp<S, C>,
    renderer: &'a Renderer,
    input: R,
    out: W,
}

impl<'a, S, C, R, W> Session<'a, S, C, R, W>
where
    S: KeyValueStore,
    C: Clock,
    R: BufRead,
    W: Write,
{
    pub fn new(app: &'a mut TodoApp<S, C>, renderer: &'a Renderer, input: R, out: W) -> Self {
        Self {
            app,
            renderer,
            input,
            out,
        }
    }

    #[tracing::instrument(skip(self))]
    pub fn run(&mut self) -> anyhow::Result<()> {
        info!("interactive session started");
        self.renderer.print_header(&mut self.out, self.app.language())?;
        self.render_list()?;

        loop {
            write!(self.out, "> ")?;
            self.out.flush()?;
            let Some(line) = read_line(&mut self.input)? else {
                break;
            };

            let command = match ListCommand::parse(&line) {
                Ok(command) => command,
                Err(err) => {
                    writeln!(self.out, "{err}")?;
                    continue;
                }
            };

            debug!(?command, "shell command");
            if command == ListCommand::Quit {
                break;
            }
            self.handle(command)?;
        }

        writeln!(self.out)?;
        info!("interactive session ended");
        Ok(())
    }

    fn handle(&mut self, command: ListCommand) -> anyhow::Result<()> {
        match command {
            ListCommand::Refresh | ListCommand::Quit => {}
            ListCommand::Add => {
                let form = self.app.begin_add();
                self.run_form(form)?;
            }
            ListCommand::Edit(token) => {
                let Some(id) = self.resolve(&token)? else {
                    return Ok(());
                };
                match self.app.begin_edit(id) {
                    Some(form) => self.run_form(form)?,
                    None => debug!(id, "edit requested for unknown task"),
                }
            }
            ListCommand::Delete(token) => {
                let Some(id) = self.resolve(&token)? else {
                    return Ok(());
                };
                let input = &mut self.input;
                let out = &mut self.out;
                let mut ask = |message: &str| prompt_yes_no(&mut *input, &mut *out, message);
                self.app.delete(id, &mut ask)?;
            }
            ListCommand::Toggle(token) => {
                let Some(id) = self.resolve(&token)? else {
                    return Ok(());
                };
                self.app.toggle(id)?;
            }
            ListCommand::Filter(filter) => self.app.set_filter(filter),
            ListCommand::Search(text) => self.app.set_search(&text),
            ListCommand::Language => {
                self.app.toggle_language()?;
                self.renderer.print_header(&mut self.out, self.app.language())?;
            }
            ListCommand::Help => {
                writeln!(self.out, "{HELP}")?;
                return Ok(());
            }
        }

        self.render_list()
    }

    fn resolve(&mut self, token: &str) -> anyhow::Result<Option<u64>> {
        let id = self.app.store().resolve_ref(token);
        if id.is_none() {
            writeln!(self.out, "no task matches '{token}'")?;
        }
        Ok(id)
    }

    /// Form view: asks for each field, then save or cancel. A blank title
    /// keeps the form open.
    fn run_form(&mut self, mut form: FormView) -> anyhow::Result<()> {
        let lang = self.app.language();
        self.renderer.print_form_heading(&mut self.out, lang, &form)?;

        loop {
            let title_label = self.app.t("title");
            let shown = if form.title().is_empty() {
                self.app.t("titlePlaceholder").to_string()
            } else {
                format!("[{}]", form.title())
            };
            write!(self.out, "{title_label} * {shown}: ")?;
            self.out.flush()?;
            let Some(title) = read_line(&mut self.input)? else {
                self.app.cancel(form);
                return Ok(());
            };
            if !title.trim().is_empty() {
                form.set_title(title);
            }

            let description_label = self.app.t("description");
            let shown = if form.description().is_empty() {
                self.app.t("descriptionPlaceholder").to_string()
            } else {
                format!("[{}] (- clears)", form.description())
            };
            write!(self.out, "{description_label} {shown}: ")?;
            self.out.flush()?;
            let Some(description) = read_line(&mut self.input)? else {
                self.app.cancel(form);
                return Ok(());
            };
            if description.trim() == "-" {
                form.set_description("");
            } else if !description.trim().is_empty() {
                form.set_description(description);
            }

            write!(
                self.out,
                "{} / {} [{}]: ",
                self.app.t("save"),
                self.app.t("cancel"),
                self.app.t("save")
            )?;
            self.out.flush()?;
            let choice = read_line(&mut self.input)?.unwrap_or_else(|| "cancel".to_string());
            if is_cancel(&choice, self.app.t("cancel")) {
                self.app.cancel(form);
                return Ok(());
            }

            match self.app.save(&form)? {
                SaveOutcome::Rejected => {
                    debug_assert_eq!(self.app.view(), ViewMode::Form);
                    self.renderer.print_form_heading(&mut self.out, lang, &form)?;
                }
                SaveOutcome::Created(id) | SaveOutcome::Updated(id) => {
                    debug!(id, "form saved");
                    return Ok(());
                }
                SaveOutcome::Missing(id) => {
                    warn!(id, "edited task disappeared before save");
                    return Ok(());
                }
            }
        }
    }

    fn render_list(&mut self) -> anyhow::Result<()> {
        let view = self.app.list_view();
        self.renderer
            .print_list(&mut self.out, self.app.language(), &view, self.app.tasks())
    }
}

fn is_cancel(choice: &str, localized: &str) -> bool {
    let choice = choice.trim();
    matches!(choice.to_ascii_lowercase().as_str(), "c" | "cancel") || choice == localized
}

/// Next line without its terminator; `None` at end of input.
fn read_line<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed reading input")?;
    if read == 0 {
        return Ok(None);
    }
    let trimmed = line.trim_end_matches(['\n', '\r']).len();
    line.truncate(trimmed);
    Ok(Some(line))
}

/// Asks a y/N question. Anything but an explicit yes, including a read
/// failure, declines.
pub fn prompt_yes_no<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> bool {
    if write!(out, "{message} [y/N] ").and_then(|_| out.flush()).is_err() {
        return false;
    }
    match read_line(input) {
        Ok(Some(answer)) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        Ok(None) => false,
        Err(err) => {
            warn!(error = %err, "confirmation prompt failed; treating as no");
            false
        }
    }
}
