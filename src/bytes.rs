//! Utilities for rendering raw token bytes as printable text.

use std::fmt::Write as _;

use bstr::ByteSlice;

/// Replaces control characters with `\uXXXX` escapes so tokens such as `\n` stay on one line.
#[must_use]
pub fn escape_control_chars(text: &str) -> String {
    let mut rendered = String::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_control() {
            let _ = write!(rendered, "\\u{:04x}", u32::from(ch));
        } else {
            rendered.push(ch);
        }
    }
    rendered
}

/// Renders token bytes for display: decoded lossily as UTF-8, with control characters escaped.
///
/// Tokens that end inside a multi-byte code point render with U+FFFD, so this is for humans
/// only and never round-trips.
#[must_use]
pub fn render_token(bytes: &[u8]) -> String {
    escape_control_chars(&bytes.to_str_lossy())
}
