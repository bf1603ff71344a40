//! Message pane: the current row's messages as bordered blocks with a scrollbar.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

use crate::core::dataset::Role;

use super::super::app::App;
use super::super::constants::{ACCENT, ACCENT_SECONDARY, MATH};
use super::super::text::{
    MessageSegment, parse_markdown_inline, parse_message_segments, wrap_message,
};

fn repeat_char(c: char, n: usize) -> String {
    std::iter::repeat_n(c, n).collect()
}

struct MessageBlockParams<'a> {
    label: String,
    content: &'a str,
    content_width: usize,
    wrap_width: usize,
    role: Role,
    selected: bool,
}

fn border_color(role: Role, selected: bool) -> Color {
    if selected {
        return ACCENT;
    }
    match role {
        Role::System => Color::Magenta,
        Role::User => Color::DarkGray,
        Role::Assistant => ACCENT_SECONDARY,
    }
}

/// Push a fenced sub-block ("┌─ title ─┐ … └─┘") inside a message block.
fn add_inner_block(
    lines: &mut Vec<Line<'static>>,
    title: &str,
    body: &str,
    inner_width: usize,
    border_style: Style,
    color: Color,
) {
    let style = Style::default().fg(color);
    let header = format!("┌─ {} ", title);
    let trail = inner_width.saturating_sub(header.chars().count() + 1);
    lines.push(Line::from(vec![
        Span::styled("│ ", border_style),
        Span::styled(format!("{}{}┐", header, repeat_char('─', trail)), style),
    ]));
    for chunk in wrap_message(body, inner_width.saturating_sub(2)) {
        lines.push(Line::from(vec![
            Span::styled("│ ", border_style),
            Span::styled("│ ", style),
            Span::styled(chunk, style),
        ]));
    }
    lines.push(Line::from(vec![
        Span::styled("│ ", border_style),
        Span::styled(
            format!("└{}┘", repeat_char('─', inner_width.saturating_sub(2))),
            style,
        ),
    ]));
}

/// Add one message block. Returns its (start, end) line range.
fn add_message_block(lines: &mut Vec<Line<'static>>, p: MessageBlockParams<'_>) -> (usize, usize) {
    let border_style = if p.selected {
        Style::default()
            .fg(border_color(p.role, true))
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(border_color(p.role, false))
    };
    let start = lines.len();

    let top_label = format!("┌─ {} ", p.label);
    let top_trail = p.wrap_width.saturating_sub(top_label.chars().count() + 1);
    lines.push(Line::from(Span::styled(
        format!("{}{}┐", top_label, repeat_char('─', top_trail)),
        border_style,
    )));

    if p.content.trim().is_empty() {
        lines.push(Line::from(vec![
            Span::styled("│ ", border_style),
            Span::styled(
                "  (empty)",
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            ),
        ]));
    }

    let inner_width = p.content_width.saturating_sub(2);
    for segment in parse_message_segments(p.content) {
        match segment {
            MessageSegment::Text(text) => {
                let trimmed = text.trim_matches('\n');
                if trimmed.trim().is_empty() {
                    continue;
                }
                for chunk in wrap_message(trimmed, p.content_width) {
                    let mut spans = vec![Span::styled("│ ", border_style), Span::raw("  ")];
                    spans.extend(parse_markdown_inline(&chunk));
                    lines.push(Line::from(spans));
                }
            }
            MessageSegment::CodeBlock { lang, code } => {
                let title = if lang.is_empty() { "code" } else { lang };
                add_inner_block(lines, title, code, inner_width, border_style, ACCENT_SECONDARY);
            }
            MessageSegment::Math(tex) => {
                add_inner_block(lines, "math", tex, inner_width, border_style, MATH);
            }
        }
    }

    lines.push(Line::from(Span::styled(
        format!("└{}┘", repeat_char('─', p.wrap_width.saturating_sub(2))),
        border_style,
    )));
    lines.push(Line::from(""));
    (start, lines.len())
}

/// Scroll offset that keeps `range` visible when it fits, else shows its top.
fn scroll_to_range(scroll: usize, range: (usize, usize), visible: usize) -> usize {
    let (start, end) = range;
    if start < scroll || end - start > visible {
        start
    } else if end > scroll + visible {
        end - visible
    } else {
        scroll
    }
}

pub(crate) fn draw_messages(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);
    let text_area = chunks[0];
    let scrollbar_area = chunks[1];
    let wrap_width = text_area.width as usize;
    let content_width = wrap_width.saturating_sub(5);

    let mut lines: Vec<Line<'static>> = Vec::new();
    let mut ranges = Vec::new();
    for (idx, msg) in app.editor.messages().iter().enumerate() {
        let content = app.editor.staged_text(idx).unwrap_or_default();
        let mut label = format!("{} · {}", idx, msg.role());
        if app.editor.has_staged_edit(idx) {
            label.push_str(" · edited");
        }
        ranges.push(add_message_block(
            &mut lines,
            MessageBlockParams {
                label,
                content,
                content_width,
                wrap_width,
                role: msg.role(),
                selected: idx == app.selected_message,
            },
        ));
    }

    let total_lines = lines.len();
    let visible = (text_area.height as usize).max(1);
    let max_scroll = total_lines.saturating_sub(visible);
    app.last_max_scroll = max_scroll;
    if app.follow_selection {
        if let Some(&range) = ranges.get(app.selected_message) {
            app.scroll = scroll_to_range(app.scroll, range, visible);
        }
        app.follow_selection = false;
    }
    app.scroll = app.scroll.min(max_scroll);

    let visible_lines: Vec<Line> = lines.into_iter().skip(app.scroll).take(visible).collect();
    f.render_widget(Paragraph::new(visible_lines), text_area);

    let mut scrollbar_state = ScrollbarState::default()
        .position(app.scroll)
        .content_length(max_scroll);
    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
        .thumb_symbol("█")
        .thumb_style(Style::default().fg(ACCENT_SECONDARY))
        .track_symbol(Some("│"));
    f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
}
