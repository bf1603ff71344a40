//! Key handling while a prompt or the edit box is open.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::Path;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::core::config::Config;
use crate::core::editor::DEFAULT_INSTRUCTION;

use crate::tui::app::{App, EditState, Popup, PromptKind, PromptState};
use crate::tui::shortcuts::Shortcut;

use super::rewrite;

pub(super) fn handle_popup_key(
    key: KeyEvent,
    app: &mut App,
    config: &Arc<Config>,
    rt: &Arc<Runtime>,
) {
    match app.popup.take() {
        Some(Popup::Prompt(prompt)) => handle_prompt_key(key, prompt, app, config, rt),
        Some(Popup::Edit(edit)) => handle_edit_key(key, edit, app),
        None => {}
    }
}

fn is_text_input(key: &KeyEvent) -> bool {
    !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

fn handle_prompt_key(
    key: KeyEvent,
    mut prompt: PromptState,
    app: &mut App,
    config: &Arc<Config>,
    rt: &Arc<Runtime>,
) {
    if Shortcut::is_escape(&key) {
        return;
    }
    match key.code {
        KeyCode::Enter => submit_prompt(prompt, app, config, rt),
        KeyCode::Backspace => {
            prompt.value.pop();
            app.popup = Some(Popup::Prompt(prompt));
        }
        KeyCode::Char(c) if is_text_input(&key) => {
            prompt.value.push(c);
            app.popup = Some(Popup::Prompt(prompt));
        }
        _ => app.popup = Some(Popup::Prompt(prompt)),
    }
}

fn submit_prompt(prompt: PromptState, app: &mut App, config: &Arc<Config>, rt: &Arc<Runtime>) {
    let value = prompt.value.trim();
    match prompt.kind {
        PromptKind::Load => {
            if value.is_empty() {
                app.popup = Some(Popup::Prompt(prompt));
                return;
            }
            match app.editor.load(Path::new(value)) {
                Ok(()) => {
                    app.on_row_changed();
                    app.show_info(format!(
                        "Loaded {} records from {}",
                        app.editor.row_count(),
                        value
                    ));
                }
                Err(e) => app.show_error(e.to_string()),
            }
        }
        PromptKind::Save => {
            if value.is_empty() {
                app.popup = Some(Popup::Prompt(prompt));
                return;
            }
            match app.editor.save(Some(Path::new(value))) {
                Ok(path) => app.show_info(format!("Saved to {}", path.display())),
                Err(e) => app.show_error(e.to_string()),
            }
        }
        PromptKind::JumpToRow => match value.parse::<usize>() {
            Ok(n) if n >= 1 => {
                let before = app.editor.row();
                if app.editor.select_row(n - 1) != before {
                    app.on_row_changed();
                }
            }
            _ => app.show_error(format!(
                "Row must be a number between 1 and {}",
                app.editor.row_count()
            )),
        },
        PromptKind::Instruction { message_index } => {
            let instruction = if value.is_empty() {
                DEFAULT_INSTRUCTION
            } else {
                value
            };
            match app.editor.rewrite_request(message_index, instruction) {
                Ok(job) => {
                    log::info!("Rewriting message {} of row {}", message_index, job.target.row);
                    app.pending_rewrite =
                        Some(rewrite::spawn_rewrite(rt, Arc::clone(config), job));
                    app.show_info(format!("Rewriting message {}…", message_index));
                }
                Err(e) => app.show_error(e.to_string()),
            }
        }
    }
}

fn handle_edit_key(key: KeyEvent, mut edit: EditState, app: &mut App) {
    let idx = edit.message_index;
    if Shortcut::is_escape(&key) {
        stage(app, edit);
        return;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('u') => {
                stage(app, edit);
                match app.editor.commit_update(idx) {
                    Ok(()) => app.show_info(format!("Message {} updated", idx)),
                    Err(e) => app.show_error(e.to_string()),
                }
            }
            KeyCode::Char('r') => {
                app.editor.discard_edit(idx);
                app.show_info(format!("Edits to message {} reverted", idx));
            }
            _ => app.popup = Some(Popup::Edit(edit)),
        }
        return;
    }
    match key.code {
        KeyCode::Enter => edit.insert('\n'),
        KeyCode::Backspace => edit.backspace(),
        KeyCode::Left => edit.move_left(),
        KeyCode::Right => edit.move_right(),
        KeyCode::Home => edit.move_home(),
        KeyCode::End => edit.move_end(),
        KeyCode::Char(c) if is_text_input(&key) => edit.insert(c),
        _ => {}
    }
    app.popup = Some(Popup::Edit(edit));
}

fn stage(app: &mut App, edit: EditState) {
    if let Err(e) = app.editor.edit_message(edit.message_index, edit.text) {
        app.show_error(e.to_string());
    }
}
