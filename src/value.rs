use std::borrow::Cow;

use crate::env::Variables;
use crate::error::Result;
use crate::subst::{Evaluator, DOUBLE_QUOTED_ESCAPES};
use crate::types::{Position, QuoteStyle};

/// Turns a lexed value into the stored string.
///
/// `at` is where the raw text starts in the document, so substitution errors
/// point into the source rather than into the value.
pub fn parse_value<V: Variables + ?Sized>(
    raw: &str,
    quoting: QuoteStyle,
    at: Position,
    expand: bool,
    variables: &mut V,
) -> Result<String> {
    match quoting {
        QuoteStyle::Unquoted if expand => Evaluator::new(raw, variables).starting_at(at).run(),
        QuoteStyle::Unquoted => Ok(raw.to_string()),
        QuoteStyle::Double => {
            let normalized = normalize_line_breaks(raw);
            if expand {
                Evaluator::new(&normalized, variables)
                    .escapes(DOUBLE_QUOTED_ESCAPES)
                    .starting_at(at)
                    .run()
            } else {
                Ok(unescape_double_quoted(&normalized))
            }
        }
        QuoteStyle::Single => Ok(normalize_line_breaks(raw).into_owned()),
        QuoteStyle::EmbeddedJson | QuoteStyle::EmbeddedYaml => Ok(raw.to_string()),
    }
}

/// Rewrites `\n`, `\r\n` and lone `\r` as `\r\n`.
pub fn normalize_line_breaks(raw: &str) -> Cow<'_, str> {
    if !raw.contains(['\n', '\r']) {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len() + raw.len() / 8);
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                out.push_str("\r\n");
            }
            '\n' => out.push_str("\r\n"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

// Without expansion only the quote and the backslash itself are escapable.
fn unescape_double_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}
