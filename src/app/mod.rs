//! Application state types and entry glue.
//!
//! Defines the screens, input modes and modal dialogs of the TUI, the theme,
//! and [`AppState`], which ties the query client to what the views render.
//! The event loop lives in [`update`] (re-exported as `run`).
//!
pub mod keymap;
pub mod update;

use ratatui::style::Color;
use std::path::Path;
use std::time::Instant;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::query::{QueryClient, QueryKey, QueryState};
use crate::search::{ListView, SortOrder, apply_search};
use crate::sys::LinkOpener;
use keymap::Keymap;

/// Which screen is shown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    Home,
    List,
    Detail { id: String },
}

impl Screen {
    /// Query backing this screen, if any.
    pub fn query_key(&self) -> Option<QueryKey> {
        match self {
            Screen::Home => None,
            Screen::List => Some(QueryKey::Users),
            Screen::Detail { id } => Some(QueryKey::user(id.clone())),
        }
    }
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Quick actions of the detail view.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkKind {
    Email,
    Website,
}

/// Modal dialogs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModalState {
    Help { scroll: u16 },
    Info { message: String },
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub link: Color,
    pub error: Color,
}

impl Theme {
    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            link: Color::Rgb(0x89, 0xb4, 0xfa),         // blue
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            if let Some(color) = Self::parse_color(val) {
                match key {
                    "text" => theme.text = color,
                    "muted" => theme.muted = color,
                    "title" => theme.title = color,
                    "border" => theme.border = color,
                    "header_bg" => theme.header_bg = color,
                    "header_fg" => theme.header_fg = color,
                    "status_bg" => theme.status_bg = color,
                    "status_fg" => theme.status_fg = color,
                    "highlight_fg" => theme.highlight_fg = color,
                    "highlight_bg" => theme.highlight_bg = color,
                    "link" => theme.link = color,
                    "error" => theme.error = color,
                    _ => {}
                }
            }
        }

        Some(theme)
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Persist the theme in key=value format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Reset => "reset".to_string(),
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::White => "#FFFFFF".to_string(),
                other => format!("{other}"),
            }
        }

        let mut buf = String::new();
        buf.push_str("# userdir theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");
        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };
        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("header_bg", self.header_bg);
        kv("header_fg", self.header_fg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("highlight_bg", self.highlight_bg);
        kv("link", self.link);
        kv("error", self.error);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, buf)
    }

    /// Load the theme at `path`; if missing, write the default there and return it.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(path) {
            debug!(path = %path.display(), error = %e, "could not write default theme");
        }
        t
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::mocha()
    }
}

pub struct AppState {
    pub started_at: Instant,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub search_query: String,
    pub sort_order: SortOrder,
    pub selected_user_index: usize,
    pub rows_per_page: usize,
    /// Snapshot of the `users` query.
    pub list_state: QueryState,
    /// Snapshot of the `user:<id>` query for the detail screen.
    pub detail_state: QueryState,
    pub list_view: ListView,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub show_keybinds: bool,
    pub opener: LinkOpener,
    client: QueryClient,
    subscription: Option<watch::Receiver<QueryState>>,
}

impl AppState {
    /// Create the state and mount `start`.
    pub fn new(client: QueryClient, theme: Theme, keymap: Keymap, start: Screen) -> Self {
        let mut app = Self {
            started_at: Instant::now(),
            screen: Screen::Home,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            sort_order: SortOrder::Asc,
            selected_user_index: 0,
            rows_per_page: 10,
            list_state: QueryState::default(),
            detail_state: QueryState::default(),
            list_view: ListView::default(),
            theme,
            keymap,
            modal: None,
            show_keybinds: false,
            opener: LinkOpener::new(),
            client,
            subscription: None,
        };
        app.navigate(start);
        app
    }

    pub fn client(&self) -> &QueryClient {
        &self.client
    }

    /// Switch screens and mount the screen's query: subscribe first, then
    /// `ensure`, so no transition is missed.
    pub fn navigate(&mut self, screen: Screen) {
        info!(?screen, "navigate");
        self.screen = screen;
        self.subscription = None;
        if let Screen::Detail { .. } = self.screen {
            self.detail_state = QueryState::default();
        }
        if let Some(key) = self.screen.query_key() {
            let mut rx = self.client.subscribe(&key);
            self.client.ensure(&key);
            let state = rx.borrow_and_update().clone();
            self.subscription = Some(rx);
            self.apply_state(state);
        }
    }

    /// Pull the latest snapshot of the mounted query. Returns whether
    /// anything changed and the screen needs a redraw.
    pub fn sync(&mut self) -> bool {
        let Some(rx) = self.subscription.as_mut() else {
            return false;
        };
        match rx.has_changed() {
            Ok(true) => {
                let state = rx.borrow_and_update().clone();
                self.apply_state(state);
                true
            }
            _ => false,
        }
    }

    fn apply_state(&mut self, state: QueryState) {
        match self.screen {
            Screen::List => {
                self.list_state = state;
                apply_search(self);
            }
            Screen::Detail { .. } => self.detail_state = state,
            Screen::Home => {}
        }
    }

    /// The "Try Again" control: refetch whatever the current screen shows.
    pub fn retry(&mut self) {
        if let Some(key) = self.screen.query_key() {
            self.client.refetch(&key);
            self.sync();
        }
    }

    /// Snapshot backing the current screen.
    pub fn current_state(&self) -> Option<&QueryState> {
        match self.screen {
            Screen::Home => None,
            Screen::List => Some(&self.list_state),
            Screen::Detail { .. } => Some(&self.detail_state),
        }
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.selected_user_index = 0;
        apply_search(self);
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.selected_user_index = 0;
        apply_search(self);
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.selected_user_index = 0;
        apply_search(self);
    }

    pub fn toggle_sort(&mut self) {
        self.sort_order = self.sort_order.toggled();
        apply_search(self);
    }

    pub fn visible_users(&self) -> &[crate::model::User] {
        self.list_view.rows()
    }

    pub fn selected_user(&self) -> Option<&crate::model::User> {
        self.visible_users().get(self.selected_user_index)
    }

    pub fn move_selection(&mut self, delta: isize) {
        let len = self.visible_users().len();
        if len == 0 {
            self.selected_user_index = 0;
            return;
        }
        let next = self.selected_user_index.saturating_add_signed(delta);
        self.selected_user_index = next.min(len - 1);
    }

    /// Enter on the current screen: home opens the list, the list opens the
    /// selected user.
    pub fn open(&mut self) {
        match self.screen {
            Screen::Home => self.navigate(Screen::List),
            Screen::List => {
                if let Some(user) = self.selected_user() {
                    let id = user.id.to_string();
                    self.navigate(Screen::Detail { id });
                }
            }
            Screen::Detail { .. } => {}
        }
    }

    /// Back: detail returns to the list, the list to home.
    pub fn back(&mut self) {
        match self.screen {
            Screen::Detail { .. } => self.navigate(Screen::List),
            Screen::List => self.navigate(Screen::Home),
            Screen::Home => {}
        }
    }

    /// Link for a quick action of the detail view, once the user is loaded.
    pub fn link(&self, kind: LinkKind) -> Option<String> {
        let user = match self.screen {
            Screen::Detail { .. } => self.detail_state.user()?,
            _ => return None,
        };
        Some(match kind {
            LinkKind::Email => user.mailto_link(),
            LinkKind::Website => user.website_link(),
        })
    }

    /// Hand a quick-action link to the platform opener; failures become an
    /// info modal.
    pub fn open_link(&mut self, kind: LinkKind) {
        let Some(link) = self.link(kind) else {
            return;
        };
        if let Err(e) = self.opener.open(&link) {
            self.show_info(format!("Could not open {link}: {e}"));
        }
    }

    pub fn show_info(&mut self, message: impl Into<String>) {
        self.modal = Some(ModalState::Info {
            message: message.into(),
        });
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn screens_map_to_query_keys() {
        assert_eq!(Screen::Home.query_key(), None);
        assert_eq!(Screen::List.query_key(), Some(QueryKey::Users));
        assert_eq!(
            Screen::Detail { id: "5".into() }.query_key(),
            Some(QueryKey::user("5"))
        );
    }

    #[test]
    fn parse_color_accepts_hex_and_reset() {
        assert_eq!(Theme::parse_color("#FF8000"), Some(Color::Rgb(0xff, 0x80, 0x00)));
        assert_eq!(Theme::parse_color("ff8000"), Some(Color::Rgb(0xff, 0x80, 0x00)));
        assert_eq!(Theme::parse_color("Reset"), Some(Color::Reset));
        assert_eq!(Theme::parse_color("#FFF"), None);
        assert_eq!(Theme::parse_color("zzzzzz"), None);
    }
}
