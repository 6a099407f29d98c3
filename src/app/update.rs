use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, LinkKind, ModalState, Screen};
use crate::ui;

const TICK: Duration = Duration::from_millis(100);
const GC_INTERVAL: Duration = Duration::from_secs(30);

/// Whether the loop should keep going after a key.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run the event loop until the user quits. Redraws on input, on query
/// transitions and on every tick while a fetch is in flight.
pub fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    let mut dirty = true;
    let mut last_gc = Instant::now();

    loop {
        if app.sync() {
            dirty = true;
        }
        if app.current_state().is_some_and(|s| s.is_fetching) {
            dirty = true;
        }
        if dirty {
            terminal.draw(|f| ui::render(f, app))?;
            dirty = false;
        }

        if event::poll(TICK)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(app, key) == Flow::Quit {
                        break;
                    }
                    dirty = true;
                }
                Event::Resize(..) => dirty = true,
                _ => {}
            }
        }

        if last_gc.elapsed() >= GC_INTERVAL {
            let evicted = app.client().collect_garbage();
            if evicted > 0 {
                debug!(evicted, "cache entries collected");
            }
            last_gc = Instant::now();
        }
    }

    Ok(())
}

/// Dispatch one key press according to the current input mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Flow {
    match app.input_mode {
        InputMode::Modal => {
            handle_modal_key(app, key.code);
            Flow::Continue
        }
        InputMode::Search => {
            handle_search_key(app, key);
            Flow::Continue
        }
        InputMode::Normal => match app.keymap.resolve(&key) {
            Some(action) => handle_action(app, action),
            None => Flow::Continue,
        },
    }
}

fn handle_action(app: &mut AppState, action: KeyAction) -> Flow {
    let page = isize::try_from(app.rows_per_page.max(1)).unwrap_or(isize::MAX);
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::StartSearch => {
            if app.screen == Screen::List {
                app.input_mode = InputMode::Search;
            }
        }
        KeyAction::ToggleSort => {
            if app.screen == Screen::List {
                app.toggle_sort();
            }
        }
        KeyAction::Open => app.open(),
        KeyAction::Back => app.back(),
        KeyAction::Retry => app.retry(),
        KeyAction::MoveUp => app.move_selection(-1),
        KeyAction::MoveDown => app.move_selection(1),
        KeyAction::PageUp => app.move_selection(-page),
        KeyAction::PageDown => app.move_selection(page),
        KeyAction::SendEmail => app.open_link(LinkKind::Email),
        KeyAction::VisitWebsite => app.open_link(LinkKind::Website),
        KeyAction::OpenHelp => {
            app.modal = Some(ModalState::Help { scroll: 0 });
            app.input_mode = InputMode::Modal;
        }
        KeyAction::ToggleKeybindsPane => app.show_keybinds = !app.show_keybinds,
        KeyAction::Ignore => {}
    }
    Flow::Continue
}

/// Typing edits the term live; Enter keeps it, Esc clears it.
fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.set_search_query(String::new());
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => app.pop_search_char(),
        KeyCode::Up => app.move_selection(-1),
        KeyCode::Down => app.move_selection(1),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.push_search_char(c),
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => app.close_modal(),
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            _ => {}
        },
        Some(ModalState::Info { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.close_modal();
            }
        }
        None => app.input_mode = InputMode::Normal,
    }
}
