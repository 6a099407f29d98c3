// Unit-level tests for userdir's public helpers

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use userdir::app::Theme;
use userdir::app::keymap::{KeyAction, Keymap};
use userdir::model::{Address, Company, User};
use userdir::search::{ListView, SortOrder, filter_and_sort};

fn temp_path(tag: &str) -> PathBuf {
    let nonce = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    std::env::temp_dir().join(format!("userdir_{tag}_{}_{nonce}.conf", std::process::id()))
}

fn mk_user(id: u64, name: &str, email: &str) -> User {
    User {
        id,
        name: name.into(),
        username: String::new(),
        email: email.into(),
        phone: String::new(),
        website: String::new(),
        address: Address::default(),
        company: Company::default(),
    }
}

// 1) Theme config roundtrip and init
#[test]
fn theme_roundtrip_and_init() {
    let path = temp_path("theme");
    let t = Theme::mocha();
    t.write_file(&path).expect("write theme");
    let t2 = Theme::from_file(&path).expect("read theme");
    assert_eq!(t, t2);

    let init = temp_path("theme_init");
    let _ = fs::remove_file(&init);
    let created = Theme::load_or_init(&init);
    assert!(init.exists());
    assert_eq!(created, Theme::mocha());

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&init);
}

// 2) Keybinding files layer over the defaults
#[test]
fn keymap_file_overrides_defaults() {
    let path = temp_path("keys");
    fs::write(&path, "# custom\nQuit = x\nCtrl+f = StartSearch\nbogus line\n").unwrap();
    let km = Keymap::load_or_init(&path);

    let key = |c, m| KeyEvent::new(KeyCode::Char(c), m);
    assert_eq!(km.resolve(&key('x', KeyModifiers::NONE)), Some(KeyAction::Quit));
    assert_eq!(km.resolve(&key('f', KeyModifiers::CONTROL)), Some(KeyAction::StartSearch));
    // untouched defaults survive
    assert_eq!(km.resolve(&key('s', KeyModifiers::NONE)), Some(KeyAction::ToggleSort));
    assert_eq!(
        km.resolve(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
        Some(KeyAction::Back)
    );
    let _ = fs::remove_file(&path);
}

// 3) Keymap write/read roundtrip and init
#[test]
fn keymap_roundtrip_and_init() {
    let path = temp_path("keys_roundtrip");
    let km = Keymap::parse("Retry = F\nCtrl+s = ToggleSort\n");
    km.write_file(&path).expect("write keymap");
    let back = Keymap::from_file(&path).expect("read keymap");
    for ((mods, code), action) in km.all_bindings() {
        let event = KeyEvent::new(code, mods);
        assert_eq!(back.resolve(&event), Some(action), "{}", Keymap::format_key(mods, code));
    }
    assert_eq!(back.all_bindings().len(), km.all_bindings().len());

    let init = temp_path("keys_init");
    let _ = fs::remove_file(&init);
    let created = Keymap::load_or_init(&init);
    assert!(init.exists());
    assert_eq!(
        created.resolve(&KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE)),
        Some(KeyAction::Quit)
    );
    let reread = Keymap::from_file(&init).expect("read initialized keymap");
    assert_eq!(reread.all_bindings().len(), created.all_bindings().len());

    let _ = fs::remove_file(&path);
    let _ = fs::remove_file(&init);
}

// 4) Filtering keeps source order out of the result; sorting decides it
#[test]
fn filter_and_sort_over_fixture() {
    let users = vec![
        mk_user(1, "John Doe", "john@example.com"),
        mk_user(2, "Jane Smith", "jane@example.com"),
        mk_user(3, "Chelsey Dietrich", "Lucio_Hettinger@annie.ca"),
    ];

    let all = filter_and_sort(&users, "", SortOrder::Asc);
    let names: Vec<&str> = all.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["Chelsey Dietrich", "Jane Smith", "John Doe"]);

    let by_email = filter_and_sort(&users, "EXAMPLE.COM", SortOrder::Desc);
    let names: Vec<&str> = by_email.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, ["John Doe", "Jane Smith"]);

    assert!(filter_and_sort(&users, "zzz", SortOrder::Asc).is_empty());
    // input is untouched
    assert_eq!(users[0].name, "John Doe");
}

// 5) The list view recomputes only when its inputs change
#[test]
fn list_view_memoizes_on_inputs() {
    let users = vec![mk_user(1, "John Doe", "john@example.com"), mk_user(2, "Jane Smith", "jane@example.com")];
    let mut view = ListView::default();
    assert!(view.update(1, &users, "", SortOrder::Asc));
    assert!(!view.update(1, &users, "", SortOrder::Asc));
    assert_eq!(view.summary(), "Showing 2 of 2 users");

    assert!(view.update(1, &users, "jane", SortOrder::Asc));
    assert_eq!(view.summary(), "Showing 1 of 2 users");
    assert!(view.update(2, &users, "jane", SortOrder::Asc));
    assert!(view.update(2, &users, "jane", SortOrder::Desc));
}
