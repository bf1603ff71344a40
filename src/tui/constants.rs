//! TUI constants: colors, timing, scroll steps.

use ratatui::style::Color;
use std::time::Duration;

/// Accent green (#98FB98): title, selection, prompts.
pub(super) const ACCENT: Color = Color::Rgb(152, 251, 152);

/// Assistant message borders and code blocks (#7EC8E3).
pub(super) const ACCENT_SECONDARY: Color = Color::Rgb(126, 200, 227);

/// Math spans and blocks.
pub(super) const MATH: Color = Color::Rgb(238, 187, 119);

/// Event poll timeout in milliseconds (main loop).
pub(crate) const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Scroll amount for one mouse wheel step.
pub(crate) const SCROLL_LINES_SMALL: usize = 3;

/// Scroll amount for PageUp/PageDown.
pub(crate) const SCROLL_LINES_PAGE: usize = 10;

/// How long a status toast stays visible.
pub(crate) const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Height of the edit popup text area as a percentage of the screen.
pub(crate) const EDIT_POPUP_PERCENT: u16 = 80;

/// Minimalist logo when idle (single character).
pub(super) const LOGO_IDLE: &str = "◆";

/// Spinner frames while a rewrite is in flight (braille pattern, 4 frames).
pub(super) const LOGO_THINKING: &[&str] = &["⠋", "⠙", "⠹", "⠸"];
