use std::io::{self, Write};

use crate::error::BrainfuckError;
use crate::lexer::Program;

/// Install the stderr log subscriber. Filter comes from `BF_LOG`
/// (`EnvFilter` syntax) and defaults to `warn` so normal runs stay quiet.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("BF_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Pretty-print a [`BrainfuckError`] with caret positioning into `source`.
///
/// Messages are prefixed with `program: ` and tagged with the error kind.
pub fn print_error(program: &str, source: &str, parsed: &Program, err: &BrainfuckError) {
    let msg = format!("{program}: {}: {err}", err.kind());

    let offset = match err {
        BrainfuckError::UnmatchedOpenBracket { offset, .. }
        | BrainfuckError::UnmatchedCloseBracket { offset, .. } => Some(*offset),
        other => other.instruction().and_then(|ip| parsed.source_offset(ip)),
    };

    match offset {
        Some(pos) => print_error_with_context(&msg, source, pos),
        None => {
            eprintln!("{msg}");
            let _ = io::stderr().flush();
        }
    }
}

/// Print a concise error with a caret context window,
/// working with UTF-8 by slicing using char indices.
pub fn print_error_with_context(prefix: &str, code: &str, pos: usize) {
    eprintln!("{prefix}");
    eprint!("{}", render_context(code, pos));
    let _ = io::stderr().flush();
}

/// The source line containing `pos` (clipped to a window) with a caret under it.
fn render_context(code: &str, pos: usize) -> String {
    // Show a short window around the position for context
    const WINDOW_CHARS: usize = 32;

    let chars: Vec<char> = code.chars().collect();
    let pos = pos.min(chars.len().saturating_sub(1));

    let line_start = chars[..pos]
        .iter()
        .rposition(|&c| c == '\n')
        .map_or(0, |i| i + 1);
    let line_end = chars[pos..]
        .iter()
        .position(|&c| c == '\n')
        .map_or(chars.len(), |i| pos + i);

    let start = line_start.max(pos.saturating_sub(WINDOW_CHARS));
    let end = line_end.min(pos + WINDOW_CHARS + 1);
    let slice: String = chars[start..end]
        .iter()
        .map(|&c| if c == '\t' { ' ' } else { c })
        .collect();

    // Caret under the exact position
    let underline = format!("{}^", " ".repeat(pos - start));
    format!("  {slice}\n  {underline}\n")
}
