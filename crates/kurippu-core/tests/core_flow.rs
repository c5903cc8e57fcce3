use chrono::{Local, TimeZone};
use kurippu_core::app::{AppOptions, TodoApp};
use kurippu_core::clock::FixedClock;
use kurippu_core::datastore::FileStore;
use kurippu_core::i18n::{Language, t};
use kurippu_core::list_view::StatusFilter;
use kurippu_core::persist::{KeyValueStore, LANGUAGE_KEY, RecoveryPolicy, TODOS_KEY};
use kurippu_core::task::Task;
use tempfile::tempdir;

fn clock() -> FixedClock {
    FixedClock(
        Local
            .with_ymd_and_hms(2026, 10, 18, 9, 0, 0)
            .single()
            .expect("unambiguous local time"),
    )
}

fn open(dir: &std::path::Path) -> TodoApp<FileStore, FixedClock> {
    let store = FileStore::open(dir).expect("open datastore");
    TodoApp::open(store, clock(), AppOptions::default()).expect("open app")
}

#[test]
fn write_through_survives_reopen() {
    let temp = tempdir().expect("tempdir");

    let expected: Vec<Task> = {
        let mut app = open(temp.path());
        let a = app.create("Call mom", "Sunday").expect("create").expect("id");
        let b = app.create("Pay rent", "").expect("create").expect("id");
        let c = app.create("Water plants", "").expect("create").expect("id");
        app.toggle(b).expect("toggle");
        app.update(a, "Call mom and dad", " after lunch ").expect("update");
        app.delete(c, &mut |_: &str| true).expect("delete");
        app.set_language(Language::Ml).expect("set language");
        app.tasks().to_vec()
    };

    let reopened = open(temp.path());
    assert_eq!(reopened.tasks(), expected.as_slice());
    assert_eq!(reopened.language(), Language::Ml);
    assert_eq!(expected.len(), 2);
    assert_eq!(expected[0].description, "after lunch");
    assert!(expected[1].completed);
}

#[test]
fn stored_layout_matches_local_storage_shape() {
    let temp = tempdir().expect("tempdir");
    let mut app = open(temp.path());
    let id = app.create("Buy milk", "2%").expect("create").expect("id");
    app.toggle_language().expect("toggle language");

    let raw = app.storage().get(TODOS_KEY).expect("get").expect("todos");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert_eq!(
        json,
        serde_json::json!([{
            "id": id,
            "title": "Buy milk",
            "description": "2%",
            "completed": false,
            "createdAt": "10/18/2026"
        }])
    );
    assert_eq!(
        app.storage().get(LANGUAGE_KEY).expect("get").as_deref(),
        Some("ml")
    );
}

#[test]
fn blank_titles_never_create() {
    let temp = tempdir().expect("tempdir");
    let mut app = open(temp.path());

    assert_eq!(app.create("", "anything").expect("create"), None);
    assert_eq!(app.create("   ", "").expect("create"), None);
    assert!(app.tasks().is_empty());
    assert_eq!(app.storage().get(TODOS_KEY).expect("get"), None);
}

#[test]
fn create_trims_fields() {
    let temp = tempdir().expect("tempdir");
    let mut app = open(temp.path());

    let id = app.create("  Buy milk  ", "  2%  ").expect("create").expect("id");
    let task = app.store().get(id).expect("created task");
    assert_eq!(task.title, "Buy milk");
    assert_eq!(task.description, "2%");
    assert!(!task.completed);
}

#[test]
fn toggle_twice_restores_and_unknown_id_is_ignored() {
    let temp = tempdir().expect("tempdir");
    let mut app = open(temp.path());
    let id = app.create("Call mom", "").expect("create").expect("id");
    let before = app.tasks().to_vec();

    assert!(app.toggle(id).expect("toggle"));
    assert!(app.tasks()[0].completed);
    assert!(app.toggle(id).expect("toggle"));
    assert_eq!(app.tasks(), before.as_slice());

    assert!(!app.toggle(id + 1_000).expect("toggle"));
    assert_eq!(app.tasks(), before.as_slice());
}

#[test]
fn filter_and_search_examples() {
    let temp = tempdir().expect("tempdir");
    let mut app = open(temp.path());
    app.create("Call mom", "").expect("create");
    let rent = app.create("Pay rent", "").expect("create").expect("id");
    app.toggle(rent).expect("toggle");

    app.set_filter(StatusFilter::Pending);
    app.set_search("");
    let titles: Vec<&str> = app.list_view().visible.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Call mom"]);

    app.set_filter(StatusFilter::All);
    app.set_search("pay");
    let titles: Vec<&str> = app.list_view().visible.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Pay rent"]);

    let counts = app.list_view().counts;
    assert_eq!(counts.total, 2);
    assert_eq!(counts.total, counts.completed + counts.pending);
}

#[test]
fn delete_needs_confirmation() {
    let temp = tempdir().expect("tempdir");
    let mut app = open(temp.path());
    let keep = app.create("Call mom", "").expect("create").expect("id");
    let doomed = app.create("Pay rent", "").expect("create").expect("id");
    let before = app.tasks().to_vec();

    let mut prompts = 0;
    let mut decline = |_: &str| {
        prompts += 1;
        false
    };
    assert!(!app.delete(doomed, &mut decline).expect("delete"));
    assert_eq!(prompts, 1);
    assert_eq!(app.tasks(), before.as_slice());

    assert!(app.delete(doomed, &mut |_: &str| true).expect("delete"));
    let ids: Vec<u64> = app.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![keep]);

    let mut asked = false;
    let mut never = |_: &str| {
        asked = true;
        true
    };
    assert!(!app.delete(doomed, &mut never).expect("delete"));
    assert!(!asked);
}

#[test]
fn unknown_text_keys_echo_back() {
    for lang in Language::ALL {
        assert_eq!(t(lang, "definitelyMissing"), "definitelyMissing");
    }
}

#[test]
fn corrupt_payload_policy() {
    let temp = tempdir().expect("tempdir");
    let mut raw = FileStore::open(temp.path()).expect("open datastore");
    raw.set(TODOS_KEY, "[{\"id\":").expect("seed corrupt payload");

    let store = FileStore::open(temp.path()).expect("open datastore");
    let err = TodoApp::open(store, clock(), AppOptions::default()).expect_err("must fail");
    assert!(format!("{err:#}").contains("todos"));

    let store = FileStore::open(temp.path()).expect("open datastore");
    let options = AppOptions {
        recovery: RecoveryPolicy::Reset,
        ..AppOptions::default()
    };
    let mut app = TodoApp::open(store, clock(), options).expect("reset open");
    assert!(app.tasks().is_empty());
    app.create("Fresh start", "").expect("create");

    let reopened = open(temp.path());
    assert_eq!(reopened.tasks().len(), 1);
    assert_eq!(
        reopened.storage().get("todos.corrupt").expect("get").as_deref(),
        Some("[{\"id\":")
    );
}
