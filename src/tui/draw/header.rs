//! Header: busy spinner, file title with dirty marker, row position, model.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use std::sync::OnceLock;
use std::time::Instant;

use super::super::app::App;
use super::super::constants::{ACCENT, LOGO_IDLE, LOGO_THINKING};

/// Start time for the spinner phase.
static HEADER_START: OnceLock<Instant> = OnceLock::new();

/// Max width for the model name; longer names are truncated from the left with "…".
const MODEL_HEADER_WIDTH: u16 = 32;
const ROW_HEADER_WIDTH: u16 = 16;

fn truncate_left(s: &str, max_len: usize) -> String {
    let count = s.chars().count();
    if count <= max_len || max_len < 2 {
        return s.to_string();
    }
    let tail: String = s.chars().skip(count - (max_len - 1)).collect();
    format!("…{}", tail)
}

pub(crate) fn draw_header(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(ROW_HEADER_WIDTH),
            Constraint::Min(0),
            Constraint::Length(MODEL_HEADER_WIDTH),
        ])
        .split(area);

    let logo = if app.is_busy() {
        let start = HEADER_START.get_or_init(Instant::now);
        let frame = (start.elapsed().as_millis() as usize / 80) % LOGO_THINKING.len();
        LOGO_THINKING[frame]
    } else {
        LOGO_IDLE
    };
    let mut left = vec![Span::styled(format!("{} ", logo), Style::default().fg(ACCENT))];
    if app.editor.is_loaded() {
        left.push(Span::styled(
            format!(
                "Row {}/{}",
                app.editor.row() + 1,
                app.editor.row_count()
            ),
            Style::default().fg(Color::DarkGray),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(left)), chunks[0]);

    let title = if app.editor.is_loaded() {
        app.title()
    } else {
        crate::core::app::NAME.to_string()
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(
            title,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )))
        .alignment(Alignment::Center),
        chunks[1],
    );

    let model = if app.has_api_key {
        Span::styled(
            truncate_left(&app.model_name, MODEL_HEADER_WIDTH as usize),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        Span::styled("no API key", Style::default().fg(Color::Yellow))
    };
    f.render_widget(
        Paragraph::new(Line::from(model)).alignment(Alignment::Right),
        chunks[2],
    );
}

#[cfg(test)]
mod tests {
    use super::truncate_left;

    #[test]
    fn short_names_are_kept() {
        assert_eq!(truncate_left("mixtral", 10), "mixtral");
    }

    #[test]
    fn long_names_keep_their_tail() {
        assert_eq!(truncate_left("mistralai/Mixtral", 8), "…Mixtral");
    }
}
