//! Message segmentation: plain text, fenced code blocks, and `$$` display math.

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MessageSegment<'a> {
    Text(&'a str),
    CodeBlock { lang: &'a str, code: &'a str },
    Math(&'a str),
}

/// Split content on ```lang ... ``` fences and `$$ ... $$` blocks.
/// An unterminated block runs to the end of the content.
pub(crate) fn parse_message_segments(content: &str) -> Vec<MessageSegment<'_>> {
    let mut segments = Vec::new();
    let mut rest = content;
    while !rest.is_empty() {
        let fence = rest.find("```");
        let math = rest.find("$$");
        let (idx, is_code) = match (fence, math) {
            (Some(f), Some(m)) if m < f => (m, false),
            (Some(f), _) => (f, true),
            (None, Some(m)) => (m, false),
            (None, None) => {
                segments.push(MessageSegment::Text(rest));
                break;
            }
        };
        if idx > 0 {
            segments.push(MessageSegment::Text(&rest[..idx]));
        }
        rest = if is_code {
            parse_code_block(&rest[idx + 3..], &mut segments)
        } else {
            parse_math_block(&rest[idx + 2..], &mut segments)
        };
    }
    segments
}

/// `rest` starts right after the opening fence. Returns what follows the block.
fn parse_code_block<'a>(rest: &'a str, segments: &mut Vec<MessageSegment<'a>>) -> &'a str {
    let lang_end = rest.find('\n').unwrap_or(rest.len());
    let lang = rest[..lang_end].trim();
    let body = rest.get(lang_end + 1..).unwrap_or("");
    // Closing fence on its own line, or glued to the last line.
    match body.find("\n```") {
        Some(pos) => {
            segments.push(MessageSegment::CodeBlock {
                lang,
                code: &body[..pos],
            });
            &body[pos + 4..]
        }
        None => match body.find("```") {
            Some(pos) => {
                segments.push(MessageSegment::CodeBlock {
                    lang,
                    code: &body[..pos],
                });
                &body[pos + 3..]
            }
            None => {
                segments.push(MessageSegment::CodeBlock { lang, code: body });
                ""
            }
        },
    }
}

/// `rest` starts right after the opening `$$`.
fn parse_math_block<'a>(rest: &'a str, segments: &mut Vec<MessageSegment<'a>>) -> &'a str {
    match rest.find("$$") {
        Some(pos) => {
            segments.push(MessageSegment::Math(rest[..pos].trim()));
            &rest[pos + 2..]
        }
        None => {
            segments.push(MessageSegment::Math(rest.trim()));
            ""
        }
    }
}
