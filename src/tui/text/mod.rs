//! Text utilities for the message pane: segmentation, inline styling, wrapping.

mod markdown;
mod segments;

pub(crate) use markdown::parse_markdown_inline;
pub(crate) use segments::{MessageSegment, parse_message_segments};

/// Split a message into display lines respecting its newlines, then wrap to `width`.
/// Uses textwrap for correct UTF-8 handling.
pub(crate) fn wrap_message(msg: &str, width: usize) -> Vec<String> {
    let mut out = Vec::new();
    for line in msg.split('\n') {
        if line.is_empty() || width == 0 {
            out.push(line.to_string());
            continue;
        }
        out.extend(
            textwrap::wrap(line, width)
                .into_iter()
                .map(|cow| cow.into_owned()),
        );
    }
    out
}
