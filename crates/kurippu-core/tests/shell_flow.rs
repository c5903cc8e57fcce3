use std::io::Cursor;

use chrono::{Local, TimeZone};
use kurippu_core::app::{AppOptions, TodoApp};
use kurippu_core::cli::Invocation;
use kurippu_core::clock::FixedClock;
use kurippu_core::commands::dispatch;
use kurippu_core::config::Config;
use kurippu_core::i18n::Language;
use kurippu_core::persist::{KeyValueStore, MemoryStore, TODOS_KEY};
use kurippu_core::render::Renderer;
use kurippu_core::shell::Session;
use kurippu_core::store::ViewMode;

fn app() -> TodoApp<MemoryStore, FixedClock> {
    let now = Local
        .with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
        .single()
        .expect("unambiguous local time");
    TodoApp::open(MemoryStore::new(), FixedClock(now), AppOptions::default()).expect("open app")
}

fn run_session(app: &mut TodoApp<MemoryStore, FixedClock>, script: &str) -> String {
    let renderer = Renderer::plain();
    let mut out = Vec::new();
    Session::new(app, &renderer, Cursor::new(script.to_string()), &mut out)
        .run()
        .expect("session");
    String::from_utf8(out).expect("utf8")
}

fn run_command(app: &mut TodoApp<MemoryStore, FixedClock>, args: &[&str], stdin: &str) -> String {
    let cfg = Config::defaults();
    let inv = Invocation::parse(&cfg, args.iter().map(Into::into).collect()).expect("parse");
    let mut out = Vec::new();
    dispatch(
        app,
        &Renderer::plain(),
        inv,
        &mut Cursor::new(stdin.to_string()),
        &mut out,
    )
    .expect("dispatch");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn session_walks_through_both_views() {
    let mut app = app();
    let script = "\
a
Buy milk
2%

a



Walk dog

c
t #1
f completed
q
";
    let output = run_session(&mut app, script);

    assert_eq!(app.tasks().len(), 1);
    assert_eq!(app.tasks()[0].title, "Buy milk");
    assert_eq!(app.tasks()[0].description, "2%");
    assert!(app.tasks()[0].completed);
    assert_eq!(app.view(), ViewMode::List);

    assert!(output.contains("No tasks found"));
    assert!(output.contains("Add Task"));
    assert!(output.contains("[Completed]"));
}

#[test]
fn session_delete_asks_in_active_language() {
    let mut app = app();
    app.create("Pay rent", "").expect("create");

    let output = run_session(&mut app, "l\nd #1\nn\nd #1\ny\nq\n");

    assert_eq!(app.language(), Language::Ml);
    assert!(app.tasks().is_empty());
    assert_eq!(
        output.matches("ഈ ടാസ്ക് ഇല്ലാതാക്കണമെന്ന് ഉറപ്പാണോ? [y/N]").count(),
        2
    );
    assert!(output.contains("ടാസ്കുകൾ ഒന്നും കണ്ടെത്തിയില്ല"));
}

#[test]
fn session_edit_keeps_blank_answers() {
    let mut app = app();
    let id = app.create("Call mom", "Sunday").expect("create").expect("id");

    run_session(&mut app, &format!("e {id}\n\n-\n\nq\n"));

    let task = app.store().get(id).expect("task");
    assert_eq!(task.title, "Call mom");
    assert_eq!(task.description, "");
}

#[test]
fn session_reports_bad_references_and_ends_at_eof() {
    let mut app = app();
    let output = run_session(&mut app, "t #9\nbogus\n");
    assert!(output.contains("no task matches '#9'"));
    assert!(output.contains("unknown command: bogus"));
}

#[test]
fn one_shot_commands_write_through() {
    let mut app = app();

    let out = run_command(&mut app, &["add", "Buy", "milk", "desc:  2%  "], "");
    assert!(out.starts_with("Created task "));

    let out = run_command(&mut app, &["edit", "#1", "title:Buy oat milk"], "");
    assert!(out.starts_with("Updated task "));
    assert_eq!(app.tasks()[0].title, "Buy oat milk");
    assert_eq!(app.tasks()[0].description, "2%");

    run_command(&mut app, &["tog", "#1"], "");
    assert!(app.tasks()[0].completed);

    let out = run_command(&mut app, &["list", "pending"], "");
    assert!(out.contains("No tasks found"));
    let out = run_command(&mut app, &["list", "all", "OAT"], "");
    assert!(out.contains("Buy oat milk"));

    let out = run_command(&mut app, &["del", "#1"], "no\n");
    assert!(out.contains("Deleted 0 task(s)."));
    assert_eq!(app.tasks().len(), 1);

    let out = run_command(&mut app, &["delete", "#1", "--yes"], "");
    assert!(out.contains("Deleted 1 task(s)."));
    assert_eq!(app.storage().get(TODOS_KEY).expect("get").as_deref(), Some("[]"));

    let out = run_command(&mut app, &["lang", "ml"], "");
    assert!(out.contains("മലയാളം (ml)"));
}

#[test]
fn assume_yes_may_precede_the_task_reference() {
    let mut app = app();
    let keep = app.create("Call mom", "").expect("create").expect("id");
    let doomed = app.create("Pay rent", "").expect("create").expect("id");

    let out = run_command(&mut app, &["delete", "--yes", &doomed.to_string()], "");
    assert!(out.contains("Deleted 1 task(s)."));

    let out = run_command(&mut app, &["delete", "-y", "#1"], "");
    assert!(out.contains("Deleted 1 task(s)."));
    assert!(app.store().get(keep).is_none());
    assert!(app.tasks().is_empty());
}

#[test]
fn list_filter_name_ignores_case() {
    let mut app = app();
    let rent = app.create("Pay rent", "").expect("create").expect("id");
    app.create("Call mom", "").expect("create");
    app.toggle(rent).expect("toggle");

    let out = run_command(&mut app, &["list", "Pending"], "");
    assert!(out.contains("[Pending]"));
    assert!(out.contains("Call mom"));
    assert!(!out.contains("Pay rent"));
    assert_eq!(app.store().search(), "");
}
