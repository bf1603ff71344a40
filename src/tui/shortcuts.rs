//! Centralized keyboard shortcuts for browsing mode.
//!
//! Complete reference:
//!
//! | Action          | Keys                 |
//! |-----------------|----------------------|
//! | Next row        | → n                  |
//! | Previous row    | ← p                  |
//! | Jump to row     | g                    |
//! | Select message  | ↑ ↓ (k j)            |
//! | Edit message    | e Enter              |
//! | Update          | u                    |
//! | Format LaTeX    | l                    |
//! | Clean           | c                    |
//! | Rewrite         | r                    |
//! | Save            | s                    |
//! | Open file       | o                    |
//! | Copy message    | y                    |
//! | Scroll          | PageUp PageDown      |
//! | Quit            | Ctrl+C               |
//!
//! Popups (edit box, prompts) handle their own keys.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Detected shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    NextRow,
    PreviousRow,
    JumpToRow,
    NextMessage,
    PreviousMessage,
    Edit,
    Update,
    FormatLatex,
    Clean,
    Rewrite,
    Save,
    Open,
    Copy,
    PageUp,
    PageDown,
    Quit,
}

impl Shortcut {
    /// Returns the shortcut if the key matches. Ctrl+C is matched everywhere,
    /// the rest only without Ctrl/Alt.
    pub fn match_key(key: &KeyEvent) -> Option<Shortcut> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Shortcut::Quit);
        }
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return None;
        }
        match key.code {
            KeyCode::Right | KeyCode::Char('n') => Some(Shortcut::NextRow),
            KeyCode::Left | KeyCode::Char('p') => Some(Shortcut::PreviousRow),
            KeyCode::Char('g') => Some(Shortcut::JumpToRow),
            KeyCode::Down | KeyCode::Char('j') => Some(Shortcut::NextMessage),
            KeyCode::Up | KeyCode::Char('k') => Some(Shortcut::PreviousMessage),
            KeyCode::Enter | KeyCode::Char('e') => Some(Shortcut::Edit),
            KeyCode::Char('u') => Some(Shortcut::Update),
            KeyCode::Char('l') => Some(Shortcut::FormatLatex),
            KeyCode::Char('c') => Some(Shortcut::Clean),
            KeyCode::Char('r') => Some(Shortcut::Rewrite),
            KeyCode::Char('s') => Some(Shortcut::Save),
            KeyCode::Char('o') => Some(Shortcut::Open),
            KeyCode::Char('y') => Some(Shortcut::Copy),
            KeyCode::PageUp => Some(Shortcut::PageUp),
            KeyCode::PageDown => Some(Shortcut::PageDown),
            _ => None,
        }
    }

    /// True if key is Escape.
    pub fn is_escape(key: &KeyEvent) -> bool {
        key.kind == KeyEventKind::Press && key.code == KeyCode::Esc
    }
}

#[cfg(test)]
mod tests {
    use super::Shortcut;
    use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        }
    }

    #[test]
    fn is_escape() {
        assert!(Shortcut::is_escape(&key(KeyCode::Esc, KeyModifiers::empty())));
        assert!(!Shortcut::is_escape(&key(
            KeyCode::Char('c'),
            KeyModifiers::empty()
        )));
    }

    #[test]
    fn match_quit_ctrl_c() {
        assert_eq!(
            Shortcut::match_key(&key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(Shortcut::Quit)
        );
    }

    #[test]
    fn plain_c_is_clean() {
        assert_eq!(
            Shortcut::match_key(&key(KeyCode::Char('c'), KeyModifiers::empty())),
            Some(Shortcut::Clean)
        );
    }

    #[test]
    fn arrows_and_letters_navigate_rows() {
        for code in [KeyCode::Right, KeyCode::Char('n')] {
            assert_eq!(
                Shortcut::match_key(&key(code, KeyModifiers::empty())),
                Some(Shortcut::NextRow)
            );
        }
        assert_eq!(
            Shortcut::match_key(&key(KeyCode::Left, KeyModifiers::empty())),
            Some(Shortcut::PreviousRow)
        );
    }

    #[test]
    fn modified_letters_are_not_shortcuts() {
        assert_eq!(
            Shortcut::match_key(&key(KeyCode::Char('s'), KeyModifiers::ALT)),
            None
        );
    }

    #[test]
    fn match_no_shortcut() {
        assert_eq!(
            Shortcut::match_key(&key(KeyCode::Char('x'), KeyModifiers::empty())),
            None
        );
    }

    #[test]
    fn match_key_release_ignored() {
        let key_release = KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Release,
            state: KeyEventState::empty(),
        };
        assert_eq!(Shortcut::match_key(&key_release), None);
    }
}

/// Labels for the bottom bar (2 lines for readability on narrow terminals).
pub mod labels {
    use ratatui::style::Color;
    use ratatui::text::{Line, Span, Text};

    const DIM: Color = Color::DarkGray;

    pub fn bottom_bar(is_busy: bool, can_rewrite: bool) -> Text<'static> {
        if is_busy {
            return Text::from(Line::from(vec![
                Span::styled("Rewriting… ", Color::Yellow),
                Span::styled("PageUp/PageDown ", DIM),
                Span::raw("scroll"),
                Span::styled("  Ctrl+C ", DIM),
                Span::raw("quit"),
            ]));
        }
        let mut actions = vec![
            Span::styled("e ", DIM),
            Span::raw("edit"),
            Span::styled("  u ", DIM),
            Span::raw("update"),
            Span::styled("  l ", DIM),
            Span::raw("LaTeX"),
            Span::styled("  c ", DIM),
            Span::raw("clean"),
        ];
        if can_rewrite {
            actions.push(Span::styled("  r ", DIM));
            actions.push(Span::raw("rewrite"));
        }
        actions.push(Span::styled("  y ", DIM));
        actions.push(Span::raw("copy"));
        Text::from(vec![
            Line::from(actions),
            Line::from(vec![
                Span::styled("←→ ", DIM),
                Span::raw("row"),
                Span::styled("  g ", DIM),
                Span::raw("jump"),
                Span::styled("  ↑↓ ", DIM),
                Span::raw("message"),
                Span::styled("  s ", DIM),
                Span::raw("save"),
                Span::styled("  o ", DIM),
                Span::raw("open"),
                Span::styled("  Ctrl+C ", DIM),
                Span::raw("quit"),
            ]),
        ])
    }
}
