//! Browsing-mode shortcuts: row and message navigation, commits, prompts.

use crate::core::config::API_KEY_VAR;
use crate::core::editor::{DEFAULT_FILE_NAME, DEFAULT_INSTRUCTION, EditorError};
use crate::core::normalize::Normalizer;

use crate::tui::app::{App, EditState, Popup, PromptKind, PromptState};
use crate::tui::constants;
use crate::tui::shortcuts::Shortcut;

/// Shortcuts that only move the view; allowed while a rewrite runs.
fn is_view_only(shortcut: Shortcut) -> bool {
    matches!(
        shortcut,
        Shortcut::NextMessage
            | Shortcut::PreviousMessage
            | Shortcut::PageUp
            | Shortcut::PageDown
            | Shortcut::Copy
    )
}

pub(super) fn handle_shortcut(shortcut: Shortcut, app: &mut App) {
    if !app.editor.is_loaded() {
        if shortcut == Shortcut::Open {
            open_prompt(app, PromptKind::Load, default_path(app));
        }
        return;
    }
    if app.is_busy() && !is_view_only(shortcut) {
        app.show_info("Rewrite in progress…");
        return;
    }
    let idx = app.selected_message;
    match shortcut {
        Shortcut::NextRow => {
            let before = app.editor.row();
            if app.editor.next_row() != before {
                app.on_row_changed();
            }
        }
        Shortcut::PreviousRow => {
            let before = app.editor.row();
            if app.editor.previous_row() != before {
                app.on_row_changed();
            }
        }
        Shortcut::JumpToRow => open_prompt(app, PromptKind::JumpToRow, String::new()),
        Shortcut::NextMessage => app.select_next_message(),
        Shortcut::PreviousMessage => app.select_previous_message(),
        Shortcut::Edit => {
            if let Some(text) = app.editor.staged_text(idx) {
                app.popup = Some(Popup::Edit(EditState::new(idx, text.to_string())));
            }
        }
        Shortcut::Update => {
            let result = app.editor.commit_update(idx);
            report(app, result, format!("Message {} updated", idx));
        }
        Shortcut::FormatLatex => normalize(app, idx, Normalizer::Latex),
        Shortcut::Clean => normalize(app, idx, Normalizer::Clean),
        Shortcut::Rewrite => {
            if !app.has_api_key {
                app.show_error(format!("Set {} to enable rewrite", API_KEY_VAR));
            } else if !app.editor.can_rewrite(idx) {
                app.show_error(EditorError::RewriteUnavailable { message_index: idx }.to_string());
            } else {
                open_prompt(
                    app,
                    PromptKind::Instruction { message_index: idx },
                    DEFAULT_INSTRUCTION.to_string(),
                );
            }
        }
        Shortcut::Save => open_prompt(app, PromptKind::Save, default_path(app)),
        Shortcut::Open => open_prompt(app, PromptKind::Load, default_path(app)),
        Shortcut::Copy => copy_message(app, idx),
        Shortcut::PageUp => app.scroll_up(constants::SCROLL_LINES_PAGE),
        Shortcut::PageDown => app.scroll_down(constants::SCROLL_LINES_PAGE),
        // Handled before dispatch.
        Shortcut::Quit => {}
    }
}

fn normalize(app: &mut App, idx: usize, normalizer: Normalizer) {
    let result = app.editor.commit_normalize(idx, normalizer);
    report(app, result, format!("{} applied to message {}", normalizer.label(), idx));
}

fn report(app: &mut App, result: Result<(), EditorError>, success: String) {
    match result {
        Ok(()) => app.show_info(success),
        Err(e) => app.show_error(e.to_string()),
    }
}

fn open_prompt(app: &mut App, kind: PromptKind, value: String) {
    app.popup = Some(Popup::Prompt(PromptState { kind, value }));
}

/// The loaded file's path, or the default file name.
fn default_path(app: &App) -> String {
    app.editor
        .source()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

fn copy_message(app: &mut App, idx: usize) {
    let Some(text) = app.editor.staged_text(idx).map(str::to_string) else {
        return;
    };
    match arboard::Clipboard::new().and_then(|mut c| c.set_text(text)) {
        Ok(()) => app.show_info("Copied"),
        Err(e) => app.show_error(format!("Clipboard unavailable: {}", e)),
    }
}
