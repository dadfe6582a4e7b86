//! Common UI styles and layout helpers for the catalog TUI

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::models::Entity;

/// Common UI styles
pub struct Styles;

impl Styles {
    pub fn default() -> Style {
        Style::default()
    }

    pub fn selected() -> Style {
        Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error() -> Style {
        Style::default()
            .fg(Color::Red)
    }

    pub fn success() -> Style {
        Style::default()
            .fg(Color::Green)
    }

    pub fn warning() -> Style {
        Style::default()
            .fg(Color::Yellow)
    }

    pub fn info() -> Style {
        Style::default()
            .fg(Color::Cyan)
    }

    pub fn inactive() -> Style {
        Style::default()
            .fg(Color::Gray)
    }

    pub fn active_border() -> Style {
        Style::default()
            .fg(Color::Yellow)
    }

    pub fn inactive_border() -> Style {
        Style::default()
            .fg(Color::Gray)
    }
}

/// Table-like display for catalog items
pub fn render_entity_table(
    f: &mut Frame,
    area: Rect,
    items: &[Entity],
    state: &mut ListState,
    title: &str,
) {
    let header = Line::from(vec![
        Span::styled(format!("{:<5}", "#"), Styles::title()),
        Span::styled(format!("| {:<24}", "Name"), Styles::title()),
        Span::styled(format!("| {:<12}", "Source"), Styles::title()),
        Span::styled(format!("| {:<6}", "Year"), Styles::title()),
        Span::styled("| Image", Styles::title()),
    ]);

    let rows: Vec<ListItem> = items
        .iter()
        .map(|entity| {
            let fields = &entity.fields;
            let content = format!(
                "{:<5}| {:<24}| {:<12}| {:<6}| {}",
                fields.sequence_number,
                truncate(&fields.name, 23),
                truncate(&fields.source, 11),
                truncate(&fields.year_released, 5),
                fields.image_url
            );
            ListItem::new(content)
        })
        .collect();

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Styles::active_border());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Min(0)])
        .split(block.inner(area));

    f.render_widget(block, area);
    f.render_widget(ratatui::widgets::Paragraph::new(header), chunks[0]);

    let list = List::new(rows)
        .highlight_style(Styles::selected())
        .highlight_symbol(">> ");

    f.render_stateful_widget(list, chunks[1], state);
}

/// Truncate string to a number of characters with ellipsis
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Center a rectangle within another rectangle
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Batman", 10), "Batman");
        assert_eq!(truncate("Bruce Wayne Batman", 10), "Bruce W...");
        assert_eq!(truncate("ピカチュウピカチュウ", 6), "ピカチ...");
    }

    #[test]
    fn test_centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 100, 40);
        let popup = centered_rect(60, 50, area);
        assert!(popup.x >= area.x && popup.right() <= area.right());
        assert!(popup.y >= area.y && popup.bottom() <= area.bottom());
        assert_eq!(popup.width, 60);
    }
}
