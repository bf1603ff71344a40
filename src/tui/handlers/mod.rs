//! Event handlers for the TUI: keyboard and mouse.

mod actions;
mod popup;
mod rewrite;

use crossterm::event::{KeyEvent, KeyEventKind, MouseEvent, MouseEventKind};
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::core::config::Config;

use super::app::App;
use super::constants;
use super::shortcuts::Shortcut;

/// Result of handling an event: continue the loop or exit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HandleResult {
    Continue,
    Break,
}

/// Bundles what key handlers need besides the key itself.
pub struct HandleKeyContext<'a> {
    pub app: &'a mut App,
    pub config: &'a Arc<Config>,
    pub rt: &'a Arc<Runtime>,
}

/// Mouse wheel scrolls the message pane; other mouse events are ignored.
pub fn handle_mouse(mouse: MouseEvent, app: &mut App) {
    if app.popup.is_some() {
        return;
    }
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(constants::SCROLL_LINES_SMALL),
        MouseEventKind::ScrollDown => app.scroll_down(constants::SCROLL_LINES_SMALL),
        _ => {}
    }
}

/// Handle a key event. Returns HandleResult::Break to exit the main loop.
pub fn handle_key(key: KeyEvent, ctx: HandleKeyContext<'_>) -> HandleResult {
    let HandleKeyContext { app, config, rt } = ctx;

    if key.kind != KeyEventKind::Press {
        return HandleResult::Continue;
    }

    let shortcut = Shortcut::match_key(&key);
    if shortcut == Some(Shortcut::Quit) {
        return request_quit(app);
    }
    app.quit_armed = false;

    if app.popup.is_some() {
        popup::handle_popup_key(key, app, config, rt);
        return HandleResult::Continue;
    }

    if let Some(shortcut) = shortcut {
        actions::handle_shortcut(shortcut, app);
    }
    HandleResult::Continue
}

/// Quit, asking for a second Ctrl+C when there are unsaved changes.
fn request_quit(app: &mut App) -> HandleResult {
    if !app.editor.is_dirty() || app.quit_armed {
        return HandleResult::Break;
    }
    app.quit_armed = true;
    app.show_error("Unsaved changes: press Ctrl+C again to quit, s to save");
    HandleResult::Continue
}

pub(crate) use rewrite::poll_rewrite;

#[cfg(test)]
mod tests;
