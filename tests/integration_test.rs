// Integration tests for userdir: query-backed screens driven through key
// events and rendered into a test backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use reqwest::StatusCode;
use tokio::runtime::Runtime;

use userdir::api::UserSource;
use userdir::app::keymap::Keymap;
use userdir::app::update::{Flow, handle_key};
use userdir::app::{AppState, InputMode, Screen, Theme};
use userdir::error::Resource;
use userdir::model::{Address, Company, Geo, User};
use userdir::query::{QueryClient, QueryStatus};
use userdir::{FetchError, ui};

fn john() -> User {
    User {
        id: 1,
        name: "John Doe".into(),
        username: "johndoe".into(),
        email: "john@example.com".into(),
        phone: "123-456-7890".into(),
        website: "johndoe.com".into(),
        address: Address {
            street: "Main St".into(),
            suite: "Apt 1".into(),
            city: "New York".into(),
            zipcode: "10001".into(),
            geo: Geo {
                lat: "40.7128".into(),
                lng: "-74.0060".into(),
            },
        },
        company: Company {
            name: "Acme Corp".into(),
            catch_phrase: "We do stuff".into(),
            bs: "business".into(),
        },
    }
}

fn jane() -> User {
    User {
        id: 2,
        name: "Jane Smith".into(),
        username: "janesmith".into(),
        email: "jane@example.com".into(),
        phone: "555-0100".into(),
        website: "janesmith.org".into(),
        address: Address::default(),
        company: Company::default(),
    }
}

/// Serves the fixture users; queued list responses take precedence.
struct StubSource {
    scripted: Mutex<VecDeque<Result<Vec<User>, FetchError>>>,
    users: Vec<User>,
    list_calls: AtomicUsize,
}

impl StubSource {
    fn new(users: Vec<User>) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            users,
            list_calls: AtomicUsize::new(0),
        }
    }

    fn then_fail_list(self, times: usize) -> Self {
        {
            let mut q = self.scripted.lock().unwrap();
            for _ in 0..times {
                q.push_back(Err(FetchError::status(Resource::Users, StatusCode::INTERNAL_SERVER_ERROR)));
            }
        }
        self
    }
}

#[async_trait]
impl UserSource for StubSource {
    async fn fetch_users(&self) -> Result<Vec<User>, FetchError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.scripted.lock().unwrap().pop_front();
        scripted.unwrap_or_else(|| Ok(self.users.clone()))
    }

    async fn fetch_user(&self, id: &str) -> Result<User, FetchError> {
        self.users
            .iter()
            .find(|u| u.id.to_string() == id)
            .cloned()
            .ok_or_else(|| FetchError::status(Resource::User, StatusCode::NOT_FOUND))
    }
}

struct Harness {
    rt: Runtime,
    source: Arc<StubSource>,
    app: AppState,
}

impl Harness {
    fn start(source: StubSource, screen: Screen) -> Self {
        let rt = Runtime::new().unwrap();
        let source = Arc::new(source);
        let client = QueryClient::new(source.clone(), rt.handle().clone());
        let app = AppState::new(client, Theme::mocha(), Keymap::new_defaults(), screen);
        Self { rt, source, app }
    }

    /// Block until the mounted query has resolved, then pull it into the app.
    fn settle(&mut self) {
        let Some(key) = self.app.screen.query_key() else {
            return;
        };
        let mut rx = self.app.client().subscribe(&key);
        self.rt.block_on(async {
            tokio::time::timeout(
                Duration::from_secs(5),
                rx.wait_for(|s| !s.is_fetching && s.status != QueryStatus::Idle),
            )
            .await
            .expect("query did not settle")
            .expect("query entry dropped");
        });
        self.app.sync();
    }

    fn press(&mut self, code: KeyCode) -> Flow {
        handle_key(&mut self.app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.press(KeyCode::Char(c));
        }
    }

    fn render(&mut self) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| ui::render(f, &mut self.app)).unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn names(&self) -> Vec<String> {
        self.app.visible_users().iter().map(|u| u.name.clone()).collect()
    }
}

// 1) Home screen fetches nothing and Enter opens the list
#[test]
fn home_mounts_without_fetching() {
    let mut h = Harness::start(StubSource::new(vec![john(), jane()]), Screen::Home);
    let screen = h.render();
    assert!(screen.contains("User Management"));
    assert!(screen.contains("View All Users"));
    assert_eq!(h.source.list_calls.load(Ordering::SeqCst), 0);

    h.press(KeyCode::Enter);
    assert_eq!(h.app.screen, Screen::List);
    h.settle();
    assert_eq!(h.source.list_calls.load(Ordering::SeqCst), 1);
}

// 2) List shows the count and filters live while typing
#[test]
fn list_filters_by_search_term() {
    let mut h = Harness::start(StubSource::new(vec![john(), jane()]), Screen::List);
    h.settle();
    let screen = h.render();
    assert!(screen.contains("Showing 2 of 2 users"));
    assert!(screen.contains("John Doe"));
    assert!(screen.contains("Jane Smith"));

    h.press(KeyCode::Char('/'));
    assert_eq!(h.app.input_mode, InputMode::Search);
    h.type_text("Jane");
    let screen = h.render();
    assert!(screen.contains("Showing 1 of 2 users"));
    assert!(screen.contains("Jane Smith"));
    assert!(!screen.contains("John Doe"));

    // Esc clears the term and leaves search mode
    h.press(KeyCode::Esc);
    assert_eq!(h.app.input_mode, InputMode::Normal);
    assert!(h.app.search_query.is_empty());
    assert_eq!(h.app.visible_users().len(), 2);
}

// 3) Search matches email case-insensitively and shows the empty state
#[test]
fn search_without_matches_shows_empty_state() {
    let mut h = Harness::start(StubSource::new(vec![john(), jane()]), Screen::List);
    h.settle();

    h.press(KeyCode::Char('/'));
    h.type_text("JOHN@");
    assert_eq!(h.names(), ["John Doe"]);

    h.app.set_search_query("nonexistent");
    let screen = h.render();
    assert!(screen.contains("No users found"));
    assert!(screen.contains("Try adjusting your search criteria"));
    assert!(!screen.contains("John Doe"));
    assert!(!screen.contains("Jane Smith"));
}

// 4) Sort toggle reverses the order
#[test]
fn sort_key_reverses_order() {
    let mut h = Harness::start(StubSource::new(vec![john(), jane()]), Screen::List);
    h.settle();
    assert_eq!(h.names(), ["Jane Smith", "John Doe"]);
    assert!(h.render().contains("A-Z"));

    h.press(KeyCode::Char('s'));
    assert_eq!(h.names(), ["John Doe", "Jane Smith"]);
    assert!(h.render().contains("Z-A"));

    h.press(KeyCode::Char('s'));
    assert_eq!(h.names(), ["Jane Smith", "John Doe"]);
}

// 5) A failed load shows the error panel; retry recovers
#[test]
fn error_then_retry_shows_data() {
    let source = StubSource::new(vec![john(), jane()]).then_fail_list(1);
    let mut h = Harness::start(source, Screen::List);
    h.settle();
    assert!(h.app.list_state.is_error());
    let screen = h.render();
    assert!(screen.contains("Error loading users"));
    assert!(screen.contains("Failed to fetch users"));
    assert!(screen.contains("Try Again"));
    assert!(!screen.contains("Showing"));

    h.press(KeyCode::Char('r'));
    h.settle();
    assert!(h.app.list_state.is_success());
    assert!(h.app.list_state.error.is_none());
    let screen = h.render();
    assert!(screen.contains("John Doe"));
    assert!(screen.contains("Showing 2 of 2 users"));
    assert_eq!(h.source.list_calls.load(Ordering::SeqCst), 2);
}

// 6) Enter opens the selected user; the detail view shows the quick links
#[test]
fn open_detail_and_go_back() {
    let mut h = Harness::start(StubSource::new(vec![john(), jane()]), Screen::List);
    h.settle();

    h.press(KeyCode::Down);
    assert_eq!(h.app.selected_user().map(|u| u.id), Some(1));
    h.press(KeyCode::Enter);
    assert_eq!(h.app.screen, Screen::Detail { id: "1".into() });
    h.settle();

    let screen = h.render();
    assert!(screen.contains("John Doe"));
    assert!(screen.contains("@johndoe"));
    assert!(screen.contains("Contact Information"));
    assert!(screen.contains("Main St, Apt 1"));
    assert!(screen.contains("40.7128, -74.0060"));
    assert!(screen.contains("mailto:john@example.com"));
    assert!(screen.contains("http://johndoe.com"));

    // Back returns to the cached list without a loading state
    h.press(KeyCode::Esc);
    assert_eq!(h.app.screen, Screen::List);
    assert!(h.app.list_state.is_success());
    assert_eq!(h.app.visible_users().len(), 2);

    h.press(KeyCode::Esc);
    assert_eq!(h.app.screen, Screen::Home);
    assert_eq!(h.press(KeyCode::Char('q')), Flow::Quit);
}

// 7) An unknown id renders the detail error panel
#[test]
fn unknown_user_shows_detail_error() {
    let mut h = Harness::start(StubSource::new(vec![john()]), Screen::Detail { id: "42".into() });
    h.settle();
    assert!(h.app.detail_state.is_error());
    let screen = h.render();
    assert!(screen.contains("Error loading user details"));
    assert!(screen.contains("Failed to fetch user"));
    assert!(h.app.detail_state.user().is_none());
}
