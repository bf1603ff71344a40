//! TUI application state: the editor session plus selection, scroll, popups, and toasts.

use std::sync::mpsc;
use std::time::Instant;

use crate::core::completion::CompletionError;
use crate::core::editor::{Editor, RewriteTarget};

use super::constants::TOAST_DURATION;

/// What a single-line prompt is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Load,
    Save,
    JumpToRow,
    Instruction { message_index: usize },
}

impl PromptKind {
    pub fn title(self) -> String {
        match self {
            PromptKind::Load => " Load from path ".to_string(),
            PromptKind::Save => " Save as ".to_string(),
            PromptKind::JumpToRow => " Jump to row ".to_string(),
            PromptKind::Instruction { message_index } => {
                format!(" Rewrite message {} - instruction ", message_index)
            }
        }
    }
}

/// Single-line text prompt.
pub struct PromptState {
    pub kind: PromptKind,
    pub value: String,
}

/// Multi-line editor for one message's staged text.
pub struct EditState {
    pub message_index: usize,
    pub text: String,
    /// Cursor position in `text` (byte index on a char boundary).
    pub cursor: usize,
    /// First visible line of the wrapped text.
    pub scroll: usize,
}

impl EditState {
    pub fn new(message_index: usize, text: String) -> Self {
        let cursor = text.len();
        Self {
            message_index,
            text,
            cursor,
            scroll: 0,
        }
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.text.remove(idx);
            self.cursor = idx;
        }
    }

    pub fn move_left(&mut self) {
        if let Some((idx, _)) = self.text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(c) = self.text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |i| self.cursor + i);
    }

    /// Hard-wrap the text at `width` chars. Returns the display rows and the
    /// cursor's (row, column) among them. At the end of a full inner line the
    /// cursor sits at column `width` of that line's last row.
    pub fn layout(&self, width: usize) -> (Vec<String>, (usize, usize)) {
        let width = width.max(1);
        let mut rows = Vec::new();
        let mut cursor_at = (0, 0);
        let mut offset = 0;
        let mut lines = self.text.split('\n').peekable();
        while let Some(line) = lines.next() {
            let chars: Vec<char> = line.chars().collect();
            let first_row = rows.len();
            if chars.is_empty() {
                rows.push(String::new());
            } else {
                rows.extend(chars.chunks(width).map(|c| c.iter().collect::<String>()));
            }
            let line_end = offset + line.len();
            if (offset..=line_end).contains(&self.cursor) {
                let col = self.text[offset..self.cursor].chars().count();
                cursor_at = (first_row + col / width, col % width);
                if cursor_at.0 == rows.len() {
                    if lines.peek().is_none() {
                        // Typing past a full last row continues on a fresh one.
                        rows.push(String::new());
                    } else {
                        cursor_at = (rows.len() - 1, width);
                    }
                }
            }
            offset = line_end + 1;
        }
        (rows, cursor_at)
    }
}

pub enum Popup {
    Prompt(PromptState),
    Edit(EditState),
}

pub struct Toast {
    pub text: String,
    pub is_error: bool,
    pub until: Instant,
}

/// A rewrite running on a background thread.
pub struct PendingRewrite {
    pub target: RewriteTarget,
    pub result_rx: mpsc::Receiver<Result<String, CompletionError>>,
    pub started_at: Instant,
}

pub struct App {
    pub(crate) editor: Editor,
    /// Message of the current row the actions apply to.
    pub(crate) selected_message: usize,
    /// First visible line of the message pane.
    pub(crate) scroll: usize,
    pub(crate) last_max_scroll: usize,
    /// Scroll so the selected message is visible on next draw.
    pub(crate) follow_selection: bool,
    pub(crate) popup: Option<Popup>,
    pub(crate) toast: Option<Toast>,
    pub(crate) pending_rewrite: Option<PendingRewrite>,
    /// Model used for rewrites, shown in the header.
    pub(crate) model_name: String,
    pub(crate) has_api_key: bool,
    /// Ctrl+C pressed once with unsaved changes.
    pub(crate) quit_armed: bool,
}

impl App {
    pub fn new(editor: Editor, model_name: String, has_api_key: bool) -> Self {
        let popup = if editor.is_loaded() {
            None
        } else {
            Some(Popup::Prompt(PromptState {
                kind: PromptKind::Load,
                value: crate::core::editor::DEFAULT_FILE_NAME.to_string(),
            }))
        };
        Self {
            editor,
            selected_message: 0,
            scroll: 0,
            last_max_scroll: 0,
            follow_selection: true,
            popup,
            toast: None,
            pending_rewrite: None,
            model_name,
            has_api_key,
            quit_armed: false,
        }
    }

    pub(crate) fn show_info(&mut self, text: impl Into<String>) {
        self.toast = Some(Toast {
            text: text.into(),
            is_error: false,
            until: Instant::now() + TOAST_DURATION,
        });
    }

    pub(crate) fn show_error(&mut self, text: impl Into<String>) {
        let text = text.into();
        log::warn!("{}", text);
        self.toast = Some(Toast {
            text,
            is_error: true,
            until: Instant::now() + TOAST_DURATION,
        });
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.pending_rewrite.is_some()
    }

    /// Reset selection and scroll after the row (or the whole dataset) changed.
    pub(crate) fn on_row_changed(&mut self) {
        self.selected_message = 0;
        self.scroll = 0;
        self.follow_selection = true;
    }

    pub(crate) fn select_next_message(&mut self) {
        let len = self.editor.messages().len();
        if self.selected_message + 1 < len {
            self.selected_message += 1;
        }
        self.follow_selection = true;
    }

    pub(crate) fn select_previous_message(&mut self) {
        self.selected_message = self.selected_message.saturating_sub(1);
        self.follow_selection = true;
    }

    pub(crate) fn scroll_down(&mut self, n: usize) {
        self.follow_selection = false;
        self.scroll = (self.scroll + n).min(self.last_max_scroll);
    }

    pub(crate) fn scroll_up(&mut self, n: usize) {
        self.follow_selection = false;
        self.scroll = self.scroll.saturating_sub(n);
    }

    /// File name shown in the header.
    pub(crate) fn title(&self) -> String {
        let name = self
            .editor
            .source()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "(upload)".to_string());
        if self.editor.is_dirty() {
            format!("{} *", name)
        } else {
            name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edit_state_inserts_at_cursor() {
        let mut edit = EditState::new(0, "ac".to_string());
        edit.move_left();
        edit.insert('b');
        assert_eq!(edit.text, "abc");
        assert_eq!(edit.cursor, 2);
    }

    #[test]
    fn edit_state_handles_multibyte_chars() {
        let mut edit = EditState::new(0, "è".to_string());
        edit.backspace();
        assert_eq!(edit.text, "");
        edit.insert('È');
        edit.move_left();
        edit.move_right();
        assert_eq!(edit.cursor, 'È'.len_utf8());
    }

    #[test]
    fn edit_state_home_and_end_stay_on_line() {
        let mut edit = EditState::new(0, "uno\ndue".to_string());
        edit.move_home();
        assert_eq!(edit.cursor, 4);
        edit.move_left();
        edit.move_home();
        assert_eq!(edit.cursor, 0);
        edit.move_end();
        assert_eq!(edit.cursor, 3);
    }

    #[test]
    fn edit_layout_places_cursor_on_wrapped_row() {
        let mut edit = EditState::new(0, "abcdef\nxy".to_string());
        let (rows, cursor) = edit.layout(4);
        assert_eq!(rows, vec!["abcd", "ef", "xy"]);
        assert_eq!(cursor, (2, 2));
        edit.cursor = 5;
        assert_eq!(edit.layout(4).1, (1, 1));
    }

    #[test]
    fn edit_layout_cursor_after_full_row_opens_new_row() {
        let edit = EditState::new(0, "abcd".to_string());
        let (rows, cursor) = edit.layout(4);
        assert_eq!(rows, vec!["abcd", ""]);
        assert_eq!(cursor, (1, 0));
    }

    #[test]
    fn edit_layout_cursor_after_full_inner_line_stays_on_its_row() {
        let mut edit = EditState::new(0, "abcd\nxy".to_string());
        edit.cursor = 4;
        let (rows, cursor) = edit.layout(4);
        assert_eq!(rows, vec!["abcd", "xy"]);
        assert_eq!(cursor, (0, 4));

        edit.cursor = 5;
        assert_eq!(edit.layout(4), (vec!["abcd".to_string(), "xy".to_string()], (1, 0)));
    }

    #[test]
    fn new_app_without_dataset_prompts_for_load() {
        let app = App::new(Editor::new(), "m".to_string(), false);
        assert!(matches!(
            app.popup,
            Some(Popup::Prompt(PromptState {
                kind: PromptKind::Load,
                ..
            }))
        ));
    }

    #[test]
    fn message_selection_is_bounded() {
        let mut editor = Editor::new();
        editor
            .load_from_reader(std::io::Cursor::new(
                r#"{"messages":[{"role":"user","content":"a"},{"role":"assistant","content":"b"}]}"#,
            ))
            .unwrap();
        let mut app = App::new(editor, "m".to_string(), true);
        app.select_previous_message();
        assert_eq!(app.selected_message, 0);
        app.select_next_message();
        app.select_next_message();
        assert_eq!(app.selected_message, 1);
        assert_eq!(app.title(), "(upload)");
    }
}
