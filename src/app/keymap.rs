//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! This module manages keyboard shortcuts for the TUI. It supports:
//! - Loading custom keybindings from a config file (`keybinds.conf`)
//! - Providing defaults if no config is present
//! - Resolving key presses (with modifiers) to semantic actions
//! - Exporting the current keymap back to a file for reference or customization

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Semantic keyboard actions that can be bound to key combinations.
///
/// Multiple key combinations can map to the same action (e.g. both `j` and
/// Down move down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Start editing the search term.
    StartSearch,
    /// Flip between ascending and descending name order.
    ToggleSort,
    /// Open the home call to action or the selected user.
    Open,
    /// Go back one screen.
    Back,
    /// Refetch the data behind the current screen.
    Retry,
    /// Move up in the list.
    MoveUp,
    /// Move down in the list.
    MoveDown,
    /// Move up by a page.
    PageUp,
    /// Move down by a page.
    PageDown,
    /// Open the `mailto:` link of the shown user.
    SendEmail,
    /// Open the website of the shown user.
    VisitWebsite,
    /// Display the help modal.
    OpenHelp,
    /// Toggle the keybindings panel on the right.
    ToggleKeybindsPane,
    /// Swallow the key.
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 15] = [
    KeyAction::Quit,
    KeyAction::StartSearch,
    KeyAction::ToggleSort,
    KeyAction::Open,
    KeyAction::Back,
    KeyAction::Retry,
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::PageUp,
    KeyAction::PageDown,
    KeyAction::SendEmail,
    KeyAction::VisitWebsite,
    KeyAction::OpenHelp,
    KeyAction::ToggleKeybindsPane,
    KeyAction::Ignore,
];

/// Canonical mapping from `(KeyModifiers, KeyCode)` pairs to [`KeyAction`]s.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Default keybindings: arrows and vim-style keys for navigation plus
    /// single-letter commands.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('s')), KeyAction::ToggleSort);
        bindings.insert((M::NONE, Enter), KeyAction::Open);
        bindings.insert((M::NONE, Esc), KeyAction::Back);
        bindings.insert((M::NONE, Backspace), KeyAction::Back);
        bindings.insert((M::NONE, Char('r')), KeyAction::Retry);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, PageDown), KeyAction::PageDown);
        bindings.insert((M::NONE, Char('m')), KeyAction::SendEmail);
        bindings.insert((M::NONE, Char('w')), KeyAction::VisitWebsite);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::SHIFT, Char('?')), KeyAction::OpenHelp);
        // Shift+K arrives as 'K' with or without SHIFT depending on the terminal
        bindings.insert((M::NONE, Char('K')), KeyAction::ToggleKeybindsPane);
        bindings.insert((M::SHIFT, Char('K')), KeyAction::ToggleKeybindsPane);
        Self { bindings }
    }

    /// Load the keymap at `path`; if missing, write the defaults there so
    /// they can be edited, and return them.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::new_defaults();
        if let Err(e) = km.write_file(path) {
            debug!(path = %path.display(), error = %e, "could not write default keybindings");
        }
        km
    }

    /// Load a keymap from a configuration file.
    ///
    /// Lines use `<Action> = <KeySpec>` (the legacy `<KeySpec> = <Action>`
    /// order is accepted too). File bindings are layered over the defaults.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Parse keymap text, layered over the defaults.
    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
            if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
            }
        }
        map
    }

    /// Write the current keymap in `Action = KeySpec` form.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userdir keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+c, Enter, Esc, Backspace, Up, Down, PageUp, PageDown, /, s, r\n");
        let names: Vec<&str> = ALL_ACTIONS.iter().map(|a| format_action(*a)).collect();
        let _ = writeln!(&mut buf, "# Actions: {}\n", names.join(", "));

        let mut entries: Vec<(String, &'static str)> = self
            .bindings
            .iter()
            .map(|((mods, code), action)| (Self::format_key(*mods, *code), format_action(*action)))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(&b.0)));
        for (key, action) in entries {
            let _ = writeln!(&mut buf, "{} = {}", action, key);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, buf)
    }

    /// Resolve a key event to its action.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Snapshot of all bindings as ((modifiers, code), action) pairs.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Format a key as a spec like "Ctrl+c" or "PageUp".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Esc => "Esc".to_string(),
            Backspace => "Backspace".to_string(),
            Tab => "Tab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Esc" | "Escape" => Esc,
        "Backspace" => Backspace,
        "Tab" => Tab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    ALL_ACTIONS.iter().copied().find(|a| format_action(*a) == s.trim())
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::ToggleSort => "ToggleSort",
        KeyAction::Open => "Open",
        KeyAction::Back => "Back",
        KeyAction::Retry => "Retry",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::PageUp => "PageUp",
        KeyAction::PageDown => "PageDown",
        KeyAction::SendEmail => "SendEmail",
        KeyAction::VisitWebsite => "VisitWebsite",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::ToggleKeybindsPane => "ToggleKeybindsPane",
        KeyAction::Ignore => "Ignore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn defaults_cover_core_actions() {
        let km = Keymap::default();
        assert_eq!(km.resolve(&press(KeyCode::Char('q'))), Some(KeyAction::Quit));
        assert_eq!(km.resolve(&press(KeyCode::Char('/'))), Some(KeyAction::StartSearch));
        assert_eq!(km.resolve(&press(KeyCode::Char('s'))), Some(KeyAction::ToggleSort));
        assert_eq!(km.resolve(&press(KeyCode::Char('r'))), Some(KeyAction::Retry));
        assert_eq!(km.resolve(&press(KeyCode::Enter)), Some(KeyAction::Open));
        assert_eq!(km.resolve(&press(KeyCode::Esc)), Some(KeyAction::Back));
        assert_eq!(
            km.resolve(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(KeyAction::Quit)
        );
        assert_eq!(km.resolve(&press(KeyCode::F(5))), None);
    }

    #[test]
    fn config_overrides_layer_over_defaults() {
        let km = Keymap::parse(
            "# comment\n\
             Retry = F\n\
             Ctrl+s = ToggleSort\n\
             garbage line\n\
             NotAnAction = x\n",
        );
        assert_eq!(km.resolve(&press(KeyCode::Char('F'))), Some(KeyAction::Retry));
        assert_eq!(
            km.resolve(&KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(KeyAction::ToggleSort)
        );
        assert_eq!(km.resolve(&press(KeyCode::Char('x'))), None);
        // defaults survive
        assert_eq!(km.resolve(&press(KeyCode::Char('r'))), Some(KeyAction::Retry));
    }

    #[test]
    fn format_and_parse_keys_agree() {
        for (mods, code) in [
            (KeyModifiers::NONE, KeyCode::Enter),
            (KeyModifiers::NONE, KeyCode::PageDown),
            (KeyModifiers::NONE, KeyCode::Char('/')),
            (KeyModifiers::CONTROL, KeyCode::Char('c')),
        ] {
            let spec = Keymap::format_key(mods, code);
            assert_eq!(parse_key(&spec), Some((mods, code)), "spec {spec}");
        }
        assert_eq!(parse_key("ab"), None);
    }

    #[test]
    fn every_action_name_parses() {
        for action in ALL_ACTIONS {
            assert_eq!(parse_action(format_action(action)), Some(action));
        }
    }
}
