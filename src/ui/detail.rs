//! Detail screen: read-only field groups for one user.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::AppState;
use crate::model::User;
use crate::query::QueryStatus;
use crate::ui::components;

/// One titled card of label/value rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldGroup {
    pub title: &'static str,
    pub rows: Vec<(&'static str, String)>,
}

/// The four cards of the detail view, in display order.
pub fn field_groups(user: &User) -> [FieldGroup; 4] {
    [
        FieldGroup {
            title: "Contact Information",
            rows: vec![
                ("Email", user.email.clone()),
                ("Phone", user.phone.clone()),
                ("Website", user.website.clone()),
            ],
        },
        FieldGroup {
            title: "Company",
            rows: vec![
                ("Name", user.company.name.clone()),
                ("Catchphrase", user.company.catch_phrase.clone()),
                ("Business", user.company.bs.clone()),
            ],
        },
        FieldGroup {
            title: "Address",
            rows: vec![
                ("Street", user.street_line()),
                ("City", user.address.city.clone()),
                ("Zipcode", user.address.zipcode.clone()),
                ("Coordinates", user.coordinates()),
            ],
        },
        FieldGroup {
            title: "Quick Actions",
            rows: vec![
                ("Send Email (m)", user.mailto_link()),
                ("Visit Website (w)", user.website_link()),
            ],
        },
    ]
}

pub fn render_detail(f: &mut Frame, area: Rect, app: &AppState) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let back = Paragraph::new(Span::styled("← Back to list (Esc)", Style::default().fg(app.theme.link)));
    f.render_widget(back, parts[0]);

    match (app.detail_state.status, app.detail_state.user()) {
        (QueryStatus::Idle | QueryStatus::Loading, _) => {
            components::render_loading(f, parts[1], app, "Loading user");
        }
        (QueryStatus::Error, _) => {
            let message = app
                .detail_state
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_else(|| "An error occurred".to_string());
            components::render_error_panel(f, parts[1], app, "Error loading user details", &message);
        }
        (QueryStatus::Success, Some(user)) => render_user(f, parts[1], app, user),
        (QueryStatus::Success, None) => {}
    }
}

fn render_user(f: &mut Frame, area: Rect, app: &AppState, user: &User) {
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(4)])
        .split(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            user.name.clone(),
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!("@{}", user.username), Style::default().fg(app.theme.muted))),
    ]);
    f.render_widget(header, parts[0]);

    let grid_rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(parts[1]);
    let mut cells = Vec::with_capacity(4);
    for row in grid_rows.iter() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        cells.extend(cols.iter().copied());
    }

    for (group, cell) in field_groups(user).iter().zip(cells) {
        let is_actions = group.title == "Quick Actions";
        let mut lines = Vec::with_capacity(group.rows.len() * 2);
        for (label, value) in &group.rows {
            lines.push(Line::from(Span::styled(*label, Style::default().fg(app.theme.muted))));
            let value_style = if is_actions {
                Style::default().fg(app.theme.link).add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default().fg(app.theme.text)
            };
            lines.push(Line::from(Span::styled(format!("  {value}"), value_style)));
        }
        let p = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
            Block::default()
                .title(group.title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        );
        f.render_widget(p, cell);
    }
}
