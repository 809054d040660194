//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! The layout is a two-row split: the provider list on top and a one-line
//! status bar at the bottom.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::App;
use crate::status::Indicator;

fn indicator_color(indicator: Indicator) -> Color {
    match indicator {
        Indicator::Green => Color::Green,
        Indicator::Yellow => Color::Yellow,
        Indicator::Red => Color::Red,
        Indicator::Unknown => Color::DarkGray,
    }
}

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [main_area, status_area] = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    draw_provider_list(app, frame, main_area);
    draw_status_bar(app, frame, status_area);
}

/// Render one coloured row per provider.
fn draw_provider_list(app: &mut App, frame: &mut Frame, area: Rect) {
    let name_width = app
        .results
        .iter()
        .map(|r| r.provider_name.chars().count())
        .max()
        .unwrap_or(0);

    let list_items: Vec<ListItem> = app
        .results
        .iter()
        .map(|r| {
            let color = indicator_color(r.indicator);
            let line = Line::from(vec![
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(
                    format!("{:<name_width$}", r.provider_name),
                    Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(format!("{:<11}", r.indicator.label()), Style::default().fg(color)),
                Span::styled(
                    r.message.clone().unwrap_or_default(),
                    Style::default().fg(Color::Gray),
                ),
                Span::raw("  "),
                Span::styled(
                    r.fetched_at.format("%H:%M:%S").to_string(),
                    Style::default().fg(Color::DarkGray),
                ),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(list_items)
        .block(
            Block::default()
                .title(" Outage Watch ")
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, &mut app.list_state);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  q: quit  r: refresh  ↑/↓: scroll  Home/End: jump"),
    ]));
    frame.render_widget(status, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::sample_results;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn screen_text(app: &mut App) -> String {
        let backend = TestBackend::new(100, 12);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();
        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    #[test]
    fn draw_does_not_panic_with_no_results() {
        let mut app = App::new();
        let text = screen_text(&mut app);
        assert!(text.contains("Starting"));
    }

    #[test]
    fn draw_shows_each_provider_and_label() {
        let mut app = App::new();
        app.set_results(sample_results());
        app.select_first();

        let text = screen_text(&mut app);
        assert!(text.contains("GitHub"));
        assert!(text.contains("Operational"));
        assert!(text.contains("Degraded"));
        assert!(text.contains("fetch failed"));
    }

    #[test]
    fn status_bar_shows_summary() {
        let mut app = App::new();
        app.set_results(sample_results());
        let text = screen_text(&mut app);
        assert!(text.contains("1 up, 1 degraded"), "status bar should summarise the pass");
    }
}
