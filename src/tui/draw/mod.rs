//! TUI rendering: header, message pane, shortcut bar, popups, and toast.

mod header;
mod messages;
mod popups;

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use std::time::Instant;

use super::app::{App, Popup};
use super::constants::ACCENT;
use super::shortcuts::labels;

const HEADER_HEIGHT: u16 = 2;

pub(super) fn draw(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(area);
    header::draw_header(f, app, chunks[0]);
    if app.editor.is_loaded() {
        messages::draw_messages(f, app, chunks[1]);
        let can_rewrite = app.has_api_key && app.editor.can_rewrite(app.selected_message);
        f.render_widget(
            Paragraph::new(labels::bottom_bar(app.is_busy(), can_rewrite))
                .alignment(Alignment::Right),
            chunks[2],
        );
    } else {
        draw_welcome(f, chunks[1]);
    }

    match app.popup {
        Some(Popup::Prompt(ref prompt)) => popups::draw_prompt_popup(f, area, prompt),
        Some(Popup::Edit(ref mut edit)) => {
            let role = app
                .editor
                .messages()
                .get(edit.message_index)
                .map(|m| m.role().as_str())
                .unwrap_or_default();
            popups::draw_edit_popup(f, area, edit, role);
        }
        None => {}
    }

    draw_toast(f, app, area);
}

fn draw_welcome(f: &mut Frame, area: Rect) {
    let text = vec![
        Line::from(Span::styled(
            crate::core::app::NAME,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Load a JSONL chat dataset to start (o to open, Ctrl+C to quit)",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    let height = text.len() as u16;
    let centered = Rect {
        y: area.y + area.height.saturating_sub(height) / 3,
        height: height.min(area.height),
        ..area
    };
    f.render_widget(Paragraph::new(text).alignment(Alignment::Center), centered);
}

/// Toast: top right, below the header, opaque so it stays readable over messages.
fn draw_toast(f: &mut Frame, app: &mut App, area: Rect) {
    let Some(ref toast) = app.toast else {
        return;
    };
    if toast.until <= Instant::now() {
        app.toast = None;
        return;
    }
    let color = if toast.is_error { Color::Red } else { ACCENT };
    let max_width = area.width.saturating_sub(2) as usize;
    let text: String = toast.text.chars().take(max_width.saturating_sub(4)).collect();
    let width = text.chars().count() as u16 + 4;
    let toast_area = Rect {
        x: area.x + area.width.saturating_sub(width).saturating_sub(1),
        y: area.y + HEADER_HEIGHT,
        width: width.min(area.width),
        height: 3.min(area.height.saturating_sub(HEADER_HEIGHT)),
    };
    f.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .style(Style::default().bg(Color::Black));
    let para = Paragraph::new(Line::from(format!(" {} ", text)))
        .block(block)
        .style(Style::default().fg(color).bg(Color::Black));
    f.render_widget(para, toast_area);
}
