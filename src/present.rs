//! Plain-text rendering of the session state for the CLI.

use crate::state::{MenuState, RenderState};
use crate::util::{sanitize_line, truncate_to_width};
use std::fmt::Write;

/// Renders the header, menu state and entry list, one entry per line.
///
/// Each entry line is `- <title>` followed by `  <link>` when the entry has
/// one. Feed-supplied text is sanitized and every line is cut to `width`
/// columns.
pub fn render_text(state: &RenderState, menu: MenuState, width: usize) -> String {
    let mut out = String::new();

    let title = if state.title.is_empty() {
        "(no feed loaded)"
    } else {
        state.title.as_str()
    };
    push_line(&mut out, &sanitize_line(title), width);
    if let Some(channel) = state.channel_title.as_deref() {
        if channel != state.title {
            push_line(&mut out, &format!("[{}]", sanitize_line(channel)), width);
        }
    }
    if menu == MenuState::Shown {
        push_line(&mut out, "(menu open)", width);
    }

    if state.entries.is_empty() {
        push_line(&mut out, "  no entries", width);
        return out;
    }

    for entry in &state.entries {
        push_line(&mut out, &format!("- {}", sanitize_line(&entry.title)), width);
        if let Some(link) = entry.link.as_deref() {
            push_line(&mut out, &format!("  {}", sanitize_line(link)), width);
        }
    }
    out
}

fn push_line(out: &mut String, line: &str, width: usize) {
    let _ = writeln!(out, "{}", truncate_to_width(line, width));
}
