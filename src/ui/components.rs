//! Shared UI components (status bar, state panels, modal helpers).
//!
//! Contains small building blocks reused by the home, list and detail screens.
//!
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use std::collections::{BTreeMap, BTreeSet};

use crate::app::keymap::{KeyAction, Keymap};
use crate::app::{AppState, InputMode, ModalState, Screen};
use crate::query::QueryStatus;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Render the bottom status bar with mode, query status and sort order.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let query = match (app.screen.query_key(), app.current_state()) {
        (Some(key), Some(state)) => {
            let status = match state.status {
                QueryStatus::Idle => "idle",
                QueryStatus::Loading => "loading",
                QueryStatus::Success => "success",
                QueryStatus::Error => "error",
            };
            let fetching = if state.is_fetching { " (fetching)" } else { "" };
            format!("  query:{key} [{status}{fetching}]")
        }
        _ => String::new(),
    };
    let sort = if app.screen == Screen::List {
        format!("  sort:{}", app.sort_order.label())
    } else {
        String::new()
    };
    let msg = format!("mode: {mode}{query}{sort}");
    let p = Paragraph::new(msg).style(Style::default().fg(app.theme.status_fg).bg(app.theme.status_bg));
    f.render_widget(p, area);
}

/// Skeleton shown while the first response for a key is pending.
pub fn render_loading(f: &mut Frame, area: Rect, app: &AppState, title: &str) {
    let frame = (app.started_at.elapsed().as_millis() / 120) as usize % SPINNER.len();
    let mut lines = vec![
        Line::from(Span::styled(
            format!("{} {title}...", SPINNER[frame]),
            Style::default().fg(app.theme.muted),
        )),
        Line::raw(""),
    ];
    let bar_w = area.width.saturating_sub(6) as usize;
    for i in 0..5 {
        let w = bar_w.saturating_sub(i * 3 % 9);
        lines.push(Line::from(Span::styled("░".repeat(w), Style::default().fg(app.theme.border))));
    }
    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

/// Generic error panel: heading, the error's message and the retry control.
pub fn render_error_panel(f: &mut Frame, area: Rect, app: &AppState, heading: &str, message: &str) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            heading.to_string(),
            Style::default().fg(app.theme.error).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(message.to_string(), Style::default().fg(app.theme.text))),
        Line::raw(""),
        Line::from(Span::styled(
            "[ Try Again (r) ]",
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD),
        )),
    ];
    let p = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.error)),
        );
    f.render_widget(p, area);
}

/// Shown when a successful load leaves nothing to display.
pub fn render_empty_state(f: &mut Frame, area: Rect, app: &AppState) {
    let lines = vec![
        Line::raw(""),
        Line::from(Span::styled(
            "No users found",
            Style::default().fg(app.theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Try adjusting your search criteria",
            Style::default().fg(app.theme.muted),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(app.theme.border)),
    );
    f.render_widget(p, area);
}

/// Render the right-side keybinds viewer.
pub fn render_keybinds_panel(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Keybindings")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));
    let inner = block.inner(area);

    let mut general: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    let mut navigation: BTreeMap<&'static str, BTreeSet<String>> = BTreeMap::new();
    for ((mods, code), action) in app.keymap.all_bindings() {
        let key = Keymap::format_key(mods, code);
        let (section, label) = match action {
            KeyAction::Quit => (&mut general, "Quit"),
            KeyAction::StartSearch => (&mut general, "Search"),
            KeyAction::ToggleSort => (&mut general, "Sort by name"),
            KeyAction::Retry => (&mut general, "Retry / refresh"),
            KeyAction::SendEmail => (&mut general, "Send email"),
            KeyAction::VisitWebsite => (&mut general, "Visit website"),
            KeyAction::OpenHelp => (&mut general, "Help"),
            KeyAction::ToggleKeybindsPane => (&mut general, "Toggle this panel"),
            KeyAction::Open => (&mut navigation, "Open"),
            KeyAction::Back => (&mut navigation, "Back"),
            KeyAction::MoveUp => (&mut navigation, "Move up"),
            KeyAction::MoveDown => (&mut navigation, "Move down"),
            KeyAction::PageUp => (&mut navigation, "Page up"),
            KeyAction::PageDown => (&mut navigation, "Page down"),
            KeyAction::Ignore => continue,
        };
        section.entry(label).or_default().insert(key);
    }

    let label_w = general
        .keys()
        .chain(navigation.keys())
        .map(|k| k.len())
        .max()
        .unwrap_or(0)
        .min((inner.width as usize).saturating_sub(8));

    let mut lines: Vec<Line> = Vec::new();
    for (heading, section) in [("General:", &general), ("Navigation:", &navigation)] {
        if !lines.is_empty() {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(Span::styled(heading, Style::default().add_modifier(Modifier::BOLD))));
        for (label, keys) in section {
            let label: String = label.chars().take(label_w).collect();
            let joined = keys.iter().cloned().collect::<Vec<_>>().join(", ");
            lines.push(Line::from(vec![
                Span::raw(format!("  {:>width$} │ ", label, width = label_w)),
                Span::styled(joined, Style::default().add_modifier(Modifier::ITALIC)),
            ]));
        }
    }

    let p = Paragraph::new(lines).wrap(Wrap { trim: false });
    f.render_widget(block, area);
    f.render_widget(p, inner);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render a generic informational modal dialog.
pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, state: &ModalState) {
    if let ModalState::Info { message } = state {
        let max_w = area.width.saturating_sub(6).max(30);
        let width = 60u16.min(max_w);
        let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)).max(1);
        let max_h = area.height.saturating_sub(6).max(5);
        let height = (approx_lines + 4).clamp(5, max_h);
        let rect = centered_rect(width, height, area);
        let p = Paragraph::new(message.clone()).wrap(Wrap { trim: false }).block(
            Block::default()
                .title("Info")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

/// Render the help modal with usage information.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 72u16.min(area.width.saturating_sub(4)).max(40);
    let height = 20u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let key = |k: &'static str| Span::styled(k, Style::default().add_modifier(Modifier::ITALIC));
    let heading = |h: &'static str| Line::from(Span::styled(h, Style::default().add_modifier(Modifier::BOLD)));
    let lines: Vec<Line> = vec![
        heading("Users list"),
        Line::from(vec![Span::raw("Search by name or email: "), key("/"), Span::raw(" then type; Enter keeps, Esc clears")]),
        Line::from(vec![Span::raw("Sort by name (toggle A-Z / Z-A): "), key("s")]),
        Line::from(vec![Span::raw("Move: "), key("Up/Down, j/k, PageUp/PageDown")]),
        Line::from(vec![Span::raw("Open user details: "), key("Enter")]),
        Line::raw(""),
        heading("User details"),
        Line::from(vec![Span::raw("Send email: "), key("m")]),
        Line::from(vec![Span::raw("Visit website: "), key("w")]),
        Line::from(vec![Span::raw("Back to list: "), key("Esc / Backspace")]),
        Line::raw(""),
        heading("Everywhere"),
        Line::from(vec![Span::raw("Retry after an error / refresh: "), key("r")]),
        Line::from(vec![Span::raw("Toggle keybindings panel: "), key("Shift+K")]),
        Line::from(vec![Span::raw("Quit: "), key("q")]),
        Line::raw(""),
        Line::from(vec![Span::raw("Close help: "), key("Esc / Enter")]),
    ];

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
