use std::io::{self, IsTerminal, Write};

use unicode_width::UnicodeWidthStr;

use crate::config::Config;
use crate::form::FormView;
use crate::i18n::{Language, t};
use crate::list_view::{ListView, StatusFilter};
use crate::task::Task;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(cfg: &Config) -> Self {
        let color = cfg.get_bool("color").unwrap_or(true) && io::stdout().is_terminal();
        Self { color }
    }

    pub fn plain() -> Self {
        Self { color: false }
    }

    pub fn print_header<W: Write>(&self, out: &mut W, lang: Language) -> anyhow::Result<()> {
        writeln!(
            out,
            "{}  [{}]",
            self.paint(t(lang, "appTitle"), "1"),
            t(lang, "languageName")
        )?;
        writeln!(out, "{}", t(lang, "tagline"))?;
        Ok(())
    }

    /// Counts, filter bar, then either the task table or the empty-state
    /// call to action. `all` numbers rows by collection position.
    #[tracing::instrument(skip(self, out, view, all))]
    pub fn print_list<W: Write>(
        &self,
        out: &mut W,
        lang: Language,
        view: &ListView<'_>,
        all: &[Task],
    ) -> anyhow::Result<()> {
        writeln!(
            out,
            "{}: {}   {}: {}   {}: {}",
            t(lang, "totalTasks"),
            view.counts.total,
            t(lang, "completedTasks"),
            view.counts.completed,
            t(lang, "pendingTasks"),
            view.counts.pending
        )?;

        let filters = StatusFilter::ALL
            .iter()
            .map(|filter| {
                let label = t(lang, filter.as_str());
                if *filter == view.filter {
                    format!("[{label}]")
                } else {
                    label.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(" ");
        if view.search.is_empty() {
            writeln!(out, "{filters}")?;
        } else {
            writeln!(out, "{filters}   {}: \"{}\"", t(lang, "searchPlaceholder"), view.search)?;
        }
        writeln!(out)?;

        if view.shows_empty_state() {
            writeln!(out, "{}", t(lang, "noTasks"))?;
            writeln!(out, "{}", t(lang, "noTasksDesc"))?;
            writeln!(out, "  {} -> todo add <{}>", t(lang, "addTodo"), t(lang, "title"))?;
            return Ok(());
        }

        let show_description = view.visible.iter().any(|task| task.has_description());

        let mut headers = vec![
            "#".to_string(),
            "ID".to_string(),
            " ".to_string(),
            t(lang, "title").to_string(),
        ];
        if show_description {
            headers.push(t(lang, "description").to_string());
        }
        headers.push(t(lang, "created").to_string());

        let mut rows = Vec::with_capacity(view.visible.len());
        for task in &view.visible {
            let position = all
                .iter()
                .position(|candidate| candidate.id == task.id)
                .map(|idx| (idx + 1).to_string())
                .unwrap_or_else(|| "-".to_string());

            let (check, title, description) = if task.completed {
                (
                    self.paint("[x]", "32"),
                    self.paint(&task.title, "9"),
                    self.paint(&task.description, "9"),
                )
            } else {
                ("[ ]".to_string(), task.title.clone(), task.description.clone())
            };

            let mut row = vec![self.paint(&position, "33"), task.id.to_string(), check, title];
            if show_description {
                row.push(description);
            }
            row.push(task.created_at.clone());
            rows.push(row);
        }

        write_table(out, headers, rows)?;
        Ok(())
    }

    pub fn print_form_heading<W: Write>(
        &self,
        out: &mut W,
        lang: Language,
        form: &FormView,
    ) -> anyhow::Result<()> {
        writeln!(out, "{}", self.paint(t(lang, form.heading_key()), "1"))?;
        Ok(())
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn write_table<W: Write>(
    writer: &mut W,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let column_count = headers.len();
    let mut widths = vec![0usize; column_count];

    for (idx, header) in headers.iter().enumerate() {
        widths[idx] = widths[idx].max(UnicodeWidthStr::width(header.as_str()));
    }

    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(UnicodeWidthStr::width(strip_ansi(cell).as_str()));
        }
    }

    for idx in 0..column_count {
        let padding = widths[idx].saturating_sub(UnicodeWidthStr::width(headers[idx].as_str()));
        write!(writer, "{}{} ", headers[idx], " ".repeat(padding))?;
    }
    writeln!(writer)?;

    for idx in 0..column_count {
        write!(writer, "{:-<width$} ", "", width = widths[idx])?;
    }
    writeln!(writer)?;

    for row in rows {
        for idx in 0..column_count {
            let cell = &row[idx];
            let visible_width = UnicodeWidthStr::width(strip_ansi(cell).as_str());
            let padding = widths[idx].saturating_sub(visible_width);
            write!(writer, "{}{} ", cell, " ".repeat(padding))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

fn strip_ansi(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut escaped = false;

    for ch in s.chars() {
        if escaped {
            if ch == 'm' {
                escaped = false;
            }
            continue;
        }

        if ch == '\x1b' {
            escaped = true;
            continue;
        }

        out.push(ch);
    }

    out
}
