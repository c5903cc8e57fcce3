use std::io::{BufRead, Write};

use anyhow::anyhow;
use tracing::{info, instrument};

use crate::app::{SaveOutcome, TodoApp};
use crate::cli::Invocation;
use crate::clock::Clock;
use crate::i18n::Language;
use crate::list_view::StatusFilter;
use crate::persist::KeyValueStore;
use crate::render::Renderer;
use crate::shell::{Session, prompt_yes_no};
use crate::task::TaskId;

/// Title words plus `title:` / `desc:` modifiers, as typed after `add` or
/// `edit`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldArgs {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl FieldArgs {
    pub fn parse(args: &[String]) -> Self {
        let mut words = Vec::new();
        let mut title = None;
        let mut description = None;

        for arg in args {
            if let Some(value) = arg
                .strip_prefix("desc:")
                .or_else(|| arg.strip_prefix("description:"))
            {
                description = Some(value.to_string());
            } else if let Some(value) = arg.strip_prefix("title:") {
                title = Some(value.to_string());
            } else {
                words.push(arg.as_str());
            }
        }

        if title.is_none() && !words.is_empty() {
            title = Some(words.join(" "));
        }

        Self { title, description }
    }
}

#[instrument(skip(app, renderer, inv, input, out), fields(command = %inv.command))]
pub fn dispatch<S, C, R, W>(
    app: &mut TodoApp<S, C>,
    renderer: &Renderer,
    inv: Invocation,
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()>
where
    S: KeyValueStore,
    C: Clock,
    R: BufRead,
    W: Write,
{
    let args = inv.command_args;
    match inv.command.as_str() {
        "list" => cmd_list(app, renderer, &args, out),
        "add" => cmd_add(app, &args, out),
        "edit" => cmd_edit(app, &args, out),
        "delete" => cmd_delete(app, &args, input, out),
        "toggle" => cmd_toggle(app, &args, out),
        "lang" => cmd_lang(app, &args, out),
        "shell" => Session::new(app, renderer, input, out).run(),
        "help" => cmd_help(out),
        "version" => {
            writeln!(out, "{}", env!("CARGO_PKG_VERSION"))?;
            Ok(())
        }
        other => Err(anyhow!("unknown command: {other}")),
    }
}

fn cmd_list<S: KeyValueStore, C: Clock, W: Write>(
    app: &mut TodoApp<S, C>,
    renderer: &Renderer,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command list");

    let mut rest = args;
    if let Some(first) = args.first()
        && let Ok(filter) = first.parse::<StatusFilter>()
    {
        app.set_filter(filter);
        rest = &args[1..];
    }
    app.set_search(&rest.join(" "));

    let view = app.list_view();
    renderer.print_list(out, app.language(), &view, app.tasks())
}

fn cmd_add<S: KeyValueStore, C: Clock, W: Write>(
    app: &mut TodoApp<S, C>,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command add");

    let fields = FieldArgs::parse(args);
    let mut form = app.begin_add();
    form.set_title(fields.title.unwrap_or_default());
    form.set_description(fields.description.unwrap_or_default());

    match app.save(&form)? {
        SaveOutcome::Created(id) => {
            writeln!(out, "Created task {id}.")?;
            Ok(())
        }
        _ => {
            app.cancel(form);
            Err(anyhow!("add requires a non-empty title"))
        }
    }
}

fn cmd_edit<S: KeyValueStore, C: Clock, W: Write>(
    app: &mut TodoApp<S, C>,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command edit");

    let (id, rest) = split_task_ref(app, args, "edit")?;
    let Some(mut form) = app.begin_edit(id) else {
        writeln!(out, "Updated 0 task(s).")?;
        return Ok(());
    };

    let fields = FieldArgs::parse(&rest);
    if let Some(title) = fields.title {
        form.set_title(title);
    }
    if let Some(description) = fields.description {
        form.set_description(description);
    }

    match app.save(&form)? {
        SaveOutcome::Updated(id) => {
            writeln!(out, "Updated task {id}.")?;
            Ok(())
        }
        SaveOutcome::Rejected => {
            app.cancel(form);
            Err(anyhow!("edit requires a non-empty title"))
        }
        _ => {
            writeln!(out, "Updated 0 task(s).")?;
            Ok(())
        }
    }
}

fn cmd_delete<S: KeyValueStore, C: Clock, R: BufRead, W: Write>(
    app: &mut TodoApp<S, C>,
    args: &[String],
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command delete");

    let (id, rest) = split_task_ref(app, args, "delete")?;
    let assume_yes = rest.iter().any(|arg| is_assume_yes(arg));

    let deleted = if assume_yes {
        app.delete(id, &mut |_: &str| true)?
    } else {
        let mut ask = |message: &str| prompt_yes_no(&mut *input, &mut *out, message);
        app.delete(id, &mut ask)?
    };

    writeln!(out, "Deleted {} task(s).", u8::from(deleted))?;
    Ok(())
}

fn cmd_toggle<S: KeyValueStore, C: Clock, W: Write>(
    app: &mut TodoApp<S, C>,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command toggle");

    let (id, _) = split_task_ref(app, args, "toggle")?;
    let toggled = app.toggle(id)?;
    writeln!(out, "Toggled {} task(s).", u8::from(toggled))?;
    Ok(())
}

fn cmd_lang<S: KeyValueStore, C: Clock, W: Write>(
    app: &mut TodoApp<S, C>,
    args: &[String],
    out: &mut W,
) -> anyhow::Result<()> {
    info!("command lang");

    let language = match args.first() {
        Some(code) => {
            let language: Language = code.parse()?;
            app.set_language(language)?;
            language
        }
        None => app.toggle_language()?,
    };

    writeln!(out, "{} ({language})", app.t("languageName"))?;
    Ok(())
}

fn cmd_help<W: Write>(out: &mut W) -> anyhow::Result<()> {
    writeln!(
        out,
        "\
usage: todo [-v|-q] [--rc KEY=VALUE] [--rcfile PATH] [--data DIR] <command> [args]

  list [all|pending|completed] [search words]
  add <title words> [desc:<text>]
  edit <id|#row> [title words] [title:<text>] [desc:<text>]
  delete <id|#row> [--yes]
  toggle <id|#row>
  lang [en|ml]
  shell
  version"
    )?;
    Ok(())
}

fn is_assume_yes(arg: &str) -> bool {
    arg == "--yes" || arg == "-y"
}

/// First argument that is not `--yes`/`-y` names the task; everything else
/// is returned in order.
fn split_task_ref<S: KeyValueStore, C: Clock>(
    app: &TodoApp<S, C>,
    args: &[String],
    command: &str,
) -> anyhow::Result<(TaskId, Vec<String>)> {
    let position = args
        .iter()
        .position(|arg| !is_assume_yes(arg))
        .ok_or_else(|| anyhow!("{command} requires a task id or #row"))?;
    let token = &args[position];
    let id = app
        .store()
        .resolve_ref(token)
        .ok_or_else(|| anyhow!("no task matches '{token}'"))?;

    let mut rest = args.to_vec();
    rest.remove(position);
    Ok((id, rest))
}
