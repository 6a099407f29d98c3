use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};

use crate::app::{AppState, InputMode};
use crate::query::QueryStatus;
use crate::ui::components;

/// List screen: search bar, result table (or loading / error / empty
/// state) and the result count.
pub fn render_list(f: &mut Frame, area: Rect, app: &mut AppState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    render_search_bar(f, parts[0], app);

    match app.list_state.status {
        QueryStatus::Idle | QueryStatus::Loading => {
            components::render_loading(f, parts[1], app, "Loading users");
        }
        QueryStatus::Error => {
            let message = app
                .list_state
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "An error occurred".to_string());
            components::render_error_panel(f, parts[1], app, "Error loading users", &message);
        }
        QueryStatus::Success if app.list_view.rows().is_empty() => {
            components::render_empty_state(f, parts[1], app);
        }
        QueryStatus::Success => render_users_table(f, parts[1], app),
    }

    if app.list_state.is_success() {
        let mut summary = app.list_view.summary();
        if app.list_state.is_fetching {
            summary.push_str("  (refreshing)");
        }
        let p = Paragraph::new(summary).style(Style::default().fg(app.theme.muted));
        f.render_widget(p, parts[2]);
    }
}

fn render_search_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let searching = app.input_mode == InputMode::Search;
    let content = if app.search_query.is_empty() && !searching {
        Span::styled("Search by name or email... (/)", Style::default().fg(app.theme.muted))
    } else {
        let cursor = if searching { "▏" } else { "" };
        Span::styled(format!("{}{cursor}", app.search_query), Style::default().fg(app.theme.text))
    };
    let border = if searching { app.theme.highlight_fg } else { app.theme.border };
    let sort = format!(" Sort by Name (s): {} ", app.sort_order.label());
    let p = Paragraph::new(Line::from(content)).block(
        Block::default()
            .title("Search users")
            .title(Line::from(sort).alignment(Alignment::Right))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);
}

pub fn render_users_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let users = app.list_view.rows();
    let start = (app.selected_user_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(users.len());
    let slice = users.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, u)| {
        let style = if start + i == app.selected_user_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        Row::new(vec![
            Cell::from(u.name.clone()),
            Cell::from(u.email.clone()),
            Cell::from(Span::styled(u.website.clone(), Style::default().fg(app.theme.link))),
        ])
        .style(style)
    });

    let widths = [Constraint::Percentage(34), Constraint::Percentage(38), Constraint::Percentage(28)];
    let header = Row::new(vec!["NAME", "EMAIL", "WEBSITE"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title("Users")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}
