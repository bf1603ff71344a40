//! Inline styling for one display line: headings, list markers, **bold**, `code`, and `$math$`.

use ratatui::style::{Modifier, Style};
use ratatui::text::Span;

use crate::tui::constants::{ACCENT, MATH};

/// Inline markers, in the order they are tried at the same position.
#[derive(Clone, Copy)]
enum Marker {
    Bold,
    Code,
    Math,
}

impl Marker {
    fn token(self) -> &'static str {
        match self {
            Marker::Bold => "**",
            Marker::Code => "`",
            Marker::Math => "$",
        }
    }

    fn style(self) -> Style {
        match self {
            Marker::Bold => Style::default().add_modifier(Modifier::BOLD),
            Marker::Code => Style::default().fg(ACCENT),
            Marker::Math => Style::default().fg(MATH),
        }
    }
}

pub(crate) fn parse_markdown_inline(s: &str) -> Vec<Span<'static>> {
    let trimmed = s.trim_start();
    if trimmed.starts_with('#') {
        let content = trimmed.trim_start_matches('#').trim_start();
        if content.is_empty() {
            return Vec::new();
        }
        return vec![Span::styled(
            content.to_string(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )];
    }
    if let Some(item) = trimmed
        .strip_prefix("- ")
        .or_else(|| trimmed.strip_prefix("* "))
    {
        let mut spans = vec![Span::styled("• ", Style::default().fg(ACCENT))];
        spans.extend(parse_inline(item));
        return spans;
    }
    if let Some((num, item)) = numbered_item(trimmed) {
        let mut spans = vec![Span::styled(format!("{} ", num), Style::default().fg(ACCENT))];
        spans.extend(parse_inline(item));
        return spans;
    }
    parse_inline(s)
}

/// "N. rest" or "N) rest".
fn numbered_item(s: &str) -> Option<(&str, &str)> {
    let digits = s.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (num, rest) = s.split_at(digits);
    rest.strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))
        .map(|rest| (num, rest))
}

fn next_marker(s: &str) -> Option<(usize, Marker)> {
    [Marker::Bold, Marker::Code, Marker::Math]
        .into_iter()
        .filter_map(|m| s.find(m.token()).map(|pos| (pos, m)))
        .min_by_key(|(pos, _)| *pos)
}

fn parse_inline(s: &str) -> Vec<Span<'static>> {
    let mut spans = Vec::new();
    let mut rest = s;
    while let Some((pos, marker)) = next_marker(rest) {
        if pos > 0 {
            spans.push(Span::raw(rest[..pos].to_string()));
        }
        let token = marker.token();
        let after = &rest[pos + token.len()..];
        match after.find(token) {
            Some(end) if end > 0 => {
                let inner = &after[..end];
                let shown = match marker {
                    Marker::Math => format!("${}$", inner),
                    _ => inner.to_string(),
                };
                spans.push(Span::styled(shown, marker.style()));
                rest = &after[end + token.len()..];
            }
            // Unmatched or empty: keep the marker as text.
            _ => {
                spans.push(Span::raw(token.to_string()));
                rest = after;
            }
        }
    }
    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }
    spans
}
