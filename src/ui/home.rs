use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::app::AppState;

const FEATURES: [(&str, &str); 3] = [
    ("User Directory", "Browse and search through all users"),
    ("Smart Search", "Filter users by name or email"),
    ("Fast & Modern", "Cached queries over a REST API"),
];

/// Landing screen with the feature blurbs and the "View All Users" call to action.
pub fn render_home(f: &mut Frame, area: Rect, app: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let hero = Paragraph::new(vec![
        Line::from(Span::styled(
            "User Management",
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "A terminal application for managing and viewing user information",
            Style::default().fg(app.theme.muted),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::NONE));
    f.render_widget(hero, rows[0]);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[1]);
    for ((title, blurb), card) in FEATURES.iter().zip(cards.iter()) {
        let p = Paragraph::new(*blurb)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(app.theme.text))
            .block(
                Block::default()
                    .title(*title)
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(app.theme.border)),
            );
        f.render_widget(p, *card);
    }

    let cta = Paragraph::new(Line::from(Span::styled(
        "[ View All Users (Enter) ]",
        Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD),
    )))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::NONE));
    f.render_widget(cta, rows[2]);
}
