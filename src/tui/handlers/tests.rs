use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers};
use std::io::Cursor;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::Instant;
use tokio::runtime::Runtime;

use super::{HandleKeyContext, HandleResult, handle_key, poll_rewrite};
use crate::core::completion::CompletionError;
use crate::core::config::{Config, RetryPolicy};
use crate::core::editor::{Editor, RewriteTarget};
use crate::tui::app::{App, PendingRewrite, Popup, PromptKind};

const DATA: &str = concat!(
    r#"{"messages":[{"role":"user","content":"Quanto fa \\(1+1\\)?"},{"role":"assistant","content":"Fa  2"}]}"#,
    "\n",
    r#"{"messages":[{"role":"user","content":"Ciao"},{"role":"assistant","content":"Salve"}]}"#,
    "\n",
    r#"{"messages":[{"role":"assistant","content":"Solo"}]}"#,
    "\n",
);

struct Harness {
    app: App,
    config: Arc<Config>,
    rt: Arc<Runtime>,
}

impl Harness {
    fn new(has_api_key: bool) -> Self {
        let mut editor = Editor::new();
        editor.load_from_reader(Cursor::new(DATA)).unwrap();
        Self {
            app: App::new(editor, "test-model".to_string(), has_api_key),
            config: Arc::new(Config {
                base_url: "http://127.0.0.1:9".to_string(),
                api_key: None,
                model_id: "test-model".to_string(),
                max_tokens: 16,
                retry: RetryPolicy::default(),
            }),
            rt: Arc::new(Runtime::new().unwrap()),
        }
    }

    fn key_with(&mut self, code: KeyCode, modifiers: KeyModifiers) -> HandleResult {
        let key = KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        };
        handle_key(
            key,
            HandleKeyContext {
                app: &mut self.app,
                config: &self.config,
                rt: &self.rt,
            },
        )
    }

    fn key(&mut self, code: KeyCode) -> HandleResult {
        self.key_with(code, KeyModifiers::empty())
    }

    fn type_text(&mut self, text: &str) {
        for c in text.chars() {
            self.key(KeyCode::Char(c));
        }
    }

    fn content(&self, idx: usize) -> &str {
        self.app.editor.messages()[idx].content()
    }

    fn toast(&self) -> Option<(&str, bool)> {
        self.app
            .toast
            .as_ref()
            .map(|t| (t.text.as_str(), t.is_error))
    }
}

#[test]
fn ctrl_c_quits_clean_session() {
    let mut h = Harness::new(false);
    assert_eq!(
        h.key_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
        HandleResult::Break
    );
}

#[test]
fn ctrl_c_twice_needed_with_unsaved_changes() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Down);
    h.key(KeyCode::Char('c'));
    assert!(h.app.editor.is_dirty());
    assert_eq!(
        h.key_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
        HandleResult::Continue
    );
    assert_eq!(
        h.key_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
        HandleResult::Break
    );
}

#[test]
fn other_key_disarms_quit() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Down);
    h.key(KeyCode::Char('c'));
    h.key_with(KeyCode::Char('c'), KeyModifiers::CONTROL);
    h.key(KeyCode::Up);
    assert_eq!(
        h.key_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
        HandleResult::Continue
    );
}

#[test]
fn row_navigation_resets_message_selection() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Down);
    assert_eq!(h.app.selected_message, 1);
    h.key(KeyCode::Right);
    assert_eq!(h.app.editor.row(), 1);
    assert_eq!(h.app.selected_message, 0);
    h.key(KeyCode::Char('p'));
    assert_eq!(h.app.editor.row(), 0);
}

#[test]
fn jump_prompt_selects_one_based_row() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Char('g'));
    h.type_text("3");
    h.key(KeyCode::Enter);
    assert!(h.app.popup.is_none());
    assert_eq!(h.app.editor.row(), 2);
}

#[test]
fn jump_prompt_rejects_non_numbers() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Char('g'));
    h.type_text("due");
    h.key(KeyCode::Enter);
    assert_eq!(h.app.editor.row(), 0);
    assert!(matches!(h.toast(), Some((_, true))));
}

#[test]
fn edit_stages_until_update() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Down);
    h.key(KeyCode::Char('e'));
    assert!(matches!(h.app.popup, Some(Popup::Edit(_))));
    h.type_text(" circa");
    h.key(KeyCode::Esc);
    assert!(h.app.popup.is_none());
    assert_eq!(h.content(1), "Fa  2");
    assert_eq!(h.app.editor.staged_text(1), Some("Fa  2 circa"));

    h.key(KeyCode::Char('u'));
    assert_eq!(h.content(1), "Fa  2 circa");
    assert!(h.app.editor.is_dirty());
}

#[test]
fn ctrl_r_in_edit_box_reverts_staged_text() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Enter);
    h.type_text("!!");
    h.key(KeyCode::Esc);
    h.key(KeyCode::Enter);
    h.key_with(KeyCode::Char('r'), KeyModifiers::CONTROL);
    assert!(h.app.popup.is_none());
    assert!(!h.app.editor.has_staged_edit(0));
}

#[test]
fn format_latex_and_clean_commit_immediately() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Char('l'));
    assert_eq!(h.content(0), "Quanto fa $1+1$?");
    h.key(KeyCode::Down);
    h.key(KeyCode::Char('c'));
    assert_eq!(h.content(1), "Fa 2");
}

#[test]
fn rewrite_without_key_is_refused() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Down);
    h.key(KeyCode::Char('r'));
    assert!(h.app.popup.is_none());
    assert!(matches!(h.toast(), Some((t, true)) if t.contains("TOGETHER_API_KEY")));
}

#[test]
fn rewrite_on_ineligible_message_is_refused() {
    let mut h = Harness::new(true);
    h.key(KeyCode::Char('r'));
    assert!(h.app.popup.is_none());
    assert!(matches!(h.toast(), Some((_, true))));
}

#[test]
fn rewrite_opens_instruction_prompt_with_default() {
    let mut h = Harness::new(true);
    h.key(KeyCode::Down);
    h.key(KeyCode::Char('r'));
    match &h.app.popup {
        Some(Popup::Prompt(p)) => {
            assert_eq!(p.kind, PromptKind::Instruction { message_index: 1 });
            assert_eq!(p.value, crate::core::editor::DEFAULT_INSTRUCTION);
        }
        _ => panic!("expected instruction prompt"),
    }
}

fn pending(app: &mut App, result: Result<String, CompletionError>) {
    let (tx, rx) = mpsc::channel();
    tx.send(result).unwrap();
    app.pending_rewrite = Some(PendingRewrite {
        target: RewriteTarget {
            row: 0,
            message_index: 1,
        },
        result_rx: rx,
        started_at: Instant::now(),
    });
}

#[test]
fn finished_rewrite_is_committed() {
    let mut h = Harness::new(true);
    pending(&mut h.app, Ok("Fa 2.".to_string()));
    poll_rewrite(&mut h.app);
    assert!(h.app.pending_rewrite.is_none());
    assert_eq!(h.content(1), "Fa 2.");
    assert!(matches!(h.toast(), Some((_, false))));
}

#[test]
fn failed_rewrite_leaves_message() {
    let mut h = Harness::new(true);
    pending(&mut h.app, Err(CompletionError::EmptyResponse));
    poll_rewrite(&mut h.app);
    assert_eq!(h.content(1), "Fa  2");
    assert!(matches!(h.toast(), Some((t, true)) if t.starts_with("Rewrite failed")));
}

#[test]
fn busy_session_ignores_edits_but_allows_scrolling() {
    let mut h = Harness::new(true);
    let (_tx, rx) = mpsc::channel();
    h.app.pending_rewrite = Some(PendingRewrite {
        target: RewriteTarget {
            row: 0,
            message_index: 1,
        },
        result_rx: rx,
        started_at: Instant::now(),
    });
    h.key(KeyCode::Right);
    assert_eq!(h.app.editor.row(), 0);
    h.key(KeyCode::Down);
    assert_eq!(h.app.selected_message, 1);
    poll_rewrite(&mut h.app);
    assert!(h.app.is_busy());
}

#[test]
fn failed_load_keeps_current_dataset() {
    let mut h = Harness::new(false);
    h.key(KeyCode::Char('o'));
    if let Some(Popup::Prompt(p)) = h.app.popup.as_mut() {
        p.value = "/nonexistent/chat.jsonl".to_string();
    }
    h.key(KeyCode::Enter);
    assert_eq!(h.app.editor.row_count(), 3);
    assert!(matches!(h.toast(), Some((_, true))));
}

#[test]
fn save_prompt_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.jsonl");
    let mut h = Harness::new(false);
    h.key(KeyCode::Char('l'));
    h.key(KeyCode::Char('s'));
    if let Some(Popup::Prompt(p)) = h.app.popup.as_mut() {
        assert_eq!(p.kind, PromptKind::Save);
        p.value = path.display().to_string();
    }
    h.key(KeyCode::Enter);
    assert!(!h.app.editor.is_dirty());
    let saved = std::fs::read_to_string(&path).unwrap();
    assert!(saved.contains("$1+1$"));
    assert_eq!(saved.lines().count(), 3);
}
