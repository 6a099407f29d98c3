pub mod components;
pub mod detail;
pub mod home;
pub mod users;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::app::{AppState, InputMode, ModalState, Screen};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());

    let crumbs = match &app.screen {
        Screen::Home => "Home".to_string(),
        Screen::List => "Home > Users".to_string(),
        Screen::Detail { id } => format!("Home > Users > #{id}"),
    };
    let hint = match (&app.screen, app.input_mode) {
        (_, InputMode::Search) => "type to filter; Enter: keep; Esc: clear",
        (Screen::Home, _) => "Enter: view all users; ?: help; q: quit",
        (Screen::List, _) => "/: search; s: sort; Enter: open; r: refresh; Esc: home; q: quit",
        (Screen::Detail { .. }, _) => "m: email; w: website; r: refresh; Esc: back; q: quit",
    };
    let header = Paragraph::new(format!("{crumbs}  | {hint}"))
        .block(
            Block::default()
                .title("userdir")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(header, root[0]);

    let body = if app.show_keybinds {
        let split = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(68), Constraint::Percentage(32)])
            .split(root[1]);
        components::render_keybinds_panel(f, split[1], app);
        split[0]
    } else {
        root[1]
    };

    match app.screen {
        Screen::Home => home::render_home(f, body, app),
        Screen::List => users::render_list(f, body, app),
        Screen::Detail { .. } => detail::render_detail(f, body, app),
    }

    components::render_status_bar(f, root[2], app);

    if let Some(state) = app.modal.clone() {
        match state {
            ModalState::Help { scroll } => components::render_help_modal(f, f.area(), app, scroll),
            ModalState::Info { .. } => components::render_info_modal(f, f.area(), app, &state),
        }
    }
}
