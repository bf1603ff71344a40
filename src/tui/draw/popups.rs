//! Popups: single-line prompts and the message edit box.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Flex, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::super::app::{EditState, PromptState};
use super::super::constants::{ACCENT, EDIT_POPUP_PERCENT};

fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let vertical_areas = vertical.split(area);
    let horizontal_areas = horizontal.split(vertical_areas[0]);
    horizontal_areas[0]
}

/// Fixed-height popup centered vertically.
fn prompt_area(area: Rect, percent_x: u16, height: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Length(height)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    horizontal.split(vertical.split(area)[0])[0]
}

fn hint(keys: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (i, (key, action)) in keys.iter().enumerate() {
        let sep = if i == 0 { "" } else { "  " };
        spans.push(Span::styled(
            format!("{}{} ", sep, key),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw(*action));
    }
    Line::from(spans)
}

pub(crate) fn draw_prompt_popup(f: &mut Frame, area: Rect, prompt: &PromptState) {
    let popup_rect = prompt_area(area, 60, 5);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(prompt.kind.title());
    let inner = block.inner(popup_rect);
    f.render_widget(Clear, popup_rect);
    f.render_widget(block, popup_rect);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    // Show the tail of long values so the cursor stays in view.
    let width = chunks[0].width as usize;
    let count = prompt.value.chars().count();
    let shown: String = prompt
        .value
        .chars()
        .skip(count.saturating_sub(width.saturating_sub(1)))
        .collect();
    let cursor_x = chunks[0].x + shown.chars().count() as u16;
    f.render_widget(
        Paragraph::new(Line::from(shown)).style(Style::default().fg(Color::White)),
        chunks[0],
    );
    f.set_cursor_position(Position::new(cursor_x, chunks[0].y));

    f.render_widget(
        Paragraph::new(hint(&[("Enter", "confirm"), ("Esc", "cancel")])),
        chunks[2],
    );
}

pub(crate) fn draw_edit_popup(f: &mut Frame, area: Rect, edit: &mut EditState, role: &str) {
    let popup_rect = popup_area(area, EDIT_POPUP_PERCENT, EDIT_POPUP_PERCENT);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" Edit message {} · {} ", edit.message_index, role));
    let inner = block.inner(popup_rect);
    f.render_widget(Clear, popup_rect);
    f.render_widget(block, popup_rect);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let text_area = chunks[0];
    let visible = (text_area.height as usize).max(1);

    let (rows, (cursor_row, cursor_col)) = edit.layout(text_area.width as usize);
    if cursor_row < edit.scroll {
        edit.scroll = cursor_row;
    } else if cursor_row >= edit.scroll + visible {
        edit.scroll = cursor_row + 1 - visible;
    }
    let lines: Vec<Line> = rows
        .into_iter()
        .skip(edit.scroll)
        .take(visible)
        .map(Line::from)
        .collect();
    f.render_widget(Paragraph::new(lines), text_area);
    f.set_cursor_position(Position::new(
        text_area.x + cursor_col as u16,
        text_area.y + (cursor_row - edit.scroll) as u16,
    ));

    f.render_widget(
        Paragraph::new(hint(&[
            ("Esc", "done (stage edit)"),
            ("Ctrl+U", "done and update"),
            ("Ctrl+R", "revert"),
        ])),
        chunks[1],
    );
}
