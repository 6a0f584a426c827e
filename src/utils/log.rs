//! Terminal logging with colored module prefixes.
//!
//! ```ignore
//! log!("build"; "rendered {} pages", count);
//! debug!("render"; "no markdown body for {}", page);
//! ```
//!
//! `debug!` lines are only printed when `BLUEPRINT_DEBUG` is set.

use colored::{ColoredString, Colorize};
use crossterm::{
    execute,
    terminal::{Clear, ClearType, size},
};
use std::{
    io::{Write, stdout},
    sync::OnceLock,
};

/// Environment variable that enables `debug!` output.
pub const DEBUG_ENV: &str = "BLUEPRINT_DEBUG";

/// Cached terminal width (fetched once on first use)
static TERMINAL_WIDTH: OnceLock<u16> = OnceLock::new();

/// Cached `BLUEPRINT_DEBUG` lookup
static DEBUG_ENABLED: OnceLock<bool> = OnceLock::new();

/// Length of "[]" plus the space after the prefix.
const PREFIX_OVERHEAD: usize = 3;

/// Log a message with a colored module prefix.
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::utils::log::log($module, &format!($($arg)*))
    }};
}

/// Log a message only when debug output is enabled.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::utils::log::debug_enabled() {
            $crate::utils::log::log($module, &format!($($arg)*))
        }
    }};
}

/// Whether `BLUEPRINT_DEBUG` is set to a non-empty value.
pub fn debug_enabled() -> bool {
    *DEBUG_ENABLED.get_or_init(|| std::env::var_os(DEBUG_ENV).is_some_and(|v| !v.is_empty()))
}

/// Falls back to 120 columns if detection fails.
fn terminal_width() -> u16 {
    *TERMINAL_WIDTH.get_or_init(|| size().map(|(w, _)| w).unwrap_or(120))
}

/// Print `[module] message`, truncated to the terminal width.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let max_msg_len = (terminal_width() as usize).saturating_sub(module.len() + PREFIX_OVERHEAD);
    let message = truncate_str(message, max_msg_len);

    let mut stdout = stdout().lock();
    execute!(stdout, Clear(ClearType::UntilNewLine)).ok();
    writeln!(stdout, "{prefix} {message}").ok();
    stdout.flush().ok();
}

fn colorize_prefix(module: &str) -> ColoredString {
    let prefix = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "watch" => prefix.bright_green().bold(),
        "error" => prefix.bright_red().bold(),
        "warn" => prefix.bright_magenta().bold(),
        _ => prefix.bright_yellow().bold(),
    }
}

/// Truncate to at most `max_len` bytes on a char boundary.
fn truncate_str(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        return s;
    }
    let mut end = max_len;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}
