use std::fmt;

use crate::document::Document;
use crate::types::{Assignment, Entry, QuoteStyle};

/// Render `doc` as dotenv text, one entry per line.
pub fn serialize(doc: &Document) -> String {
    let mut out = String::with_capacity(doc.len() * 24);
    for entry in doc {
        match entry {
            Entry::Assignment(a) => render_assignment(a, doc.is_expanded(), &mut out),
            Entry::Comment(text) => out.push_str(text),
            Entry::BlankLine => {}
        }
        out.push('\n');
    }
    out
}

pub fn write_document<W: fmt::Write>(doc: &Document, out: &mut W) -> fmt::Result {
    out.write_str(&serialize(doc))
}

/// Quoting used on output. The stored style wins unless the value can no
/// longer be read back through it, in which case double quotes are used.
pub fn effective_style(a: &Assignment, expanded: bool) -> QuoteStyle {
    let keep = match a.quoting {
        QuoteStyle::Unquoted => is_plain(&a.value, expanded),
        QuoteStyle::Single => !a.value.contains('\''),
        QuoteStyle::Double => true,
        QuoteStyle::EmbeddedJson => is_single_json_block(&a.value),
        QuoteStyle::EmbeddedYaml => is_yaml_body(&a.value),
    };
    if keep {
        a.quoting
    } else {
        QuoteStyle::Double
    }
}

fn render_assignment(a: &Assignment, expanded: bool, out: &mut String) {
    push_key(&a.key, out);
    out.push('=');

    match effective_style(a, expanded) {
        QuoteStyle::Unquoted | QuoteStyle::EmbeddedJson => out.push_str(&a.value),
        QuoteStyle::Single => {
            out.push('\'');
            out.push_str(&a.value);
            out.push('\'');
        }
        QuoteStyle::Double => {
            out.push('"');
            for c in a.value.chars() {
                match c {
                    '"' | '\\' => out.push('\\'),
                    '$' | '%' if expanded => out.push('\\'),
                    _ => {}
                }
                out.push(c);
            }
            out.push('"');
        }
        QuoteStyle::EmbeddedYaml => {
            out.push_str("---\n");
            out.push_str(&a.value);
            out.push_str("---");
        }
    }
}

fn push_key(key: &str, out: &mut String) {
    for c in key.chars() {
        if c == '=' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
}

fn is_plain(value: &str, expanded: bool) -> bool {
    let Some(first) = value.chars().next() else {
        return true;
    };
    if matches!(first, '"' | '\'' | '{' | ' ' | '\t') || value.starts_with("---") {
        return false;
    }
    if value.ends_with([' ', '\t']) || value.contains(['\n', '\r']) {
        return false;
    }
    !(expanded && value.contains(['$', '%', '\\']))
}

fn is_single_json_block(value: &str) -> bool {
    if !value.starts_with('{') || !value.ends_with('}') {
        return false;
    }
    let mut depth = 0usize;
    for (idx, c) in value.char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return idx + 1 == value.len();
                }
            }
            _ => {}
        }
    }
    false
}

fn is_yaml_body(value: &str) -> bool {
    (value.is_empty() || value.ends_with('\n'))
        && !value.lines().any(|line| line.trim_end_matches([' ', '\t', '\r']) == "---")
}
