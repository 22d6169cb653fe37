//! Variable expansion for `$NAME`, `${NAME}`, `${NAME:-default}`, `${NAME:=default}`,
//! `${NAME:?message}` and `%NAME%` references.
//!
//! Templates are scanned once, left to right. Substituted text is never scanned
//! again, so a value containing `$OTHER` is inserted as-is.

use tracing::trace;

use crate::env::{ProcessEnv, Variables};
use crate::error::{Error, Result};
use crate::options::SubstitutionOptions;
use crate::types::Position;

/// Characters a backslash turns into literals in plain templates.
pub const TEMPLATE_ESCAPES: &[char] = &['$', '%', '\\'];

/// Inside a double-quoted value a backslash also protects the closing quote.
pub const DOUBLE_QUOTED_ESCAPES: &[char] = &['$', '%', '\\', '"'];

pub struct Evaluator<'t, 'v, V: Variables + ?Sized> {
    src: &'t str,
    pos: usize,
    line: usize,
    col: usize,
    escapes: &'static [char],
    variables: &'v mut V,
}

impl<'t, 'v, V: Variables + ?Sized> Evaluator<'t, 'v, V> {
    pub fn new(template: &'t str, variables: &'v mut V) -> Self {
        Self {
            src: template,
            pos: 0,
            line: 1,
            col: 1,
            escapes: TEMPLATE_ESCAPES,
            variables,
        }
    }

    pub fn escapes(mut self, escapes: &'static [char]) -> Self {
        self.escapes = escapes;
        self
    }

    /// Report error locations relative to `origin`, where the template starts in a larger document.
    pub fn starting_at(mut self, origin: Position) -> Self {
        self.line = origin.line.max(1);
        self.col = origin.col.max(1);
        self
    }

    pub fn run(mut self) -> Result<String> {
        let mut out = String::with_capacity(self.src.len());

        while let Some(c) = self.peek() {
            match c {
                '\\' => {
                    self.bump();
                    match self.peek() {
                        Some(next) if self.escapes.contains(&next) => {
                            self.bump();
                            out.push(next);
                        }
                        _ => out.push('\\'),
                    }
                }
                '$' => self.dollar(&mut out)?,
                '%' => self.percent(&mut out)?,
                _ => {
                    self.bump();
                    out.push(c);
                }
            }
        }

        Ok(out)
    }

    fn dollar(&mut self, out: &mut String) -> Result<()> {
        let at = self.position();
        self.bump();

        match self.peek() {
            Some('{') => {
                self.bump();
                let expression = self
                    .take_until('}')
                    .ok_or_else(|| Error::unterminated(at, "variable reference"))?;
                out.push_str(&self.braced(expression, at)?);
            }
            Some(c) if is_name_char(c) => {
                let name = self.take_while(is_name_char);
                let value = self.variables.get(name).ok_or_else(|| undefined(name))?;
                out.push_str(&value);

                // `$WORD\_SUN`: a backslash that escapes nothing ends the name and is dropped.
                if self.peek() == Some('\\') {
                    let escaped = self.src[self.pos + 1..].chars().next();
                    if !escaped.is_some_and(|n| self.escapes.contains(&n)) {
                        self.bump();
                    }
                }
            }
            _ => out.push('$'),
        }

        Ok(())
    }

    fn braced(&mut self, expression: &str, at: Position) -> Result<String> {
        let (name, operation) = match expression.find(':') {
            Some(idx) => (&expression[..idx], Some(&expression[idx + 1..])),
            None => (expression, None),
        };

        if name.is_empty() || !name.chars().all(is_name_char) {
            return Err(bad_substitution(expression, at));
        }

        let current = self.variables.get(name);
        let Some(operation) = operation else {
            return current.ok_or_else(|| undefined(name));
        };

        if let Some(value) = current.filter(|v| !v.is_empty()) {
            return match operation.chars().next() {
                Some('-' | '=' | '?') => Ok(value),
                _ => Err(bad_substitution(expression, at)),
            };
        }

        let argument = operation.get(1..).unwrap_or_default();
        match operation.chars().next() {
            Some('-') => Ok(argument.to_string()),
            Some('=') => {
                trace!(name, "assigning default value to unset variable");
                self.variables.set(name, argument);
                Ok(argument.to_string())
            }
            Some('?') => {
                let message = if argument.is_empty() {
                    format!("{}: parameter null or not set", name)
                } else {
                    argument.to_string()
                };
                Err(Error::RequiredVariableMissing {
                    name: name.to_string(),
                    message,
                })
            }
            _ => Err(bad_substitution(expression, at)),
        }
    }

    fn percent(&mut self, out: &mut String) -> Result<()> {
        let at = self.position();
        self.bump();

        let src = self.src;
        let rest = &src[self.pos..];
        match rest.chars().next() {
            None | Some('%') => {
                out.push('%');
                return Ok(());
            }
            Some(c) if c.is_whitespace() => {
                out.push('%');
                return Ok(());
            }
            Some(_) => {}
        }

        match rest.find(|c: char| c == '%' || c.is_whitespace()) {
            Some(idx) if rest[idx..].starts_with('%') => {
                let name = &rest[..idx];
                let value = self.variables.get(name).ok_or_else(|| undefined(name))?;
                out.push_str(&value);
                let end = self.pos + idx + 1;
                self.advance_to(end);
                Ok(())
            }
            // whitespace before a closing `%`: plain text
            Some(_) => {
                out.push('%');
                Ok(())
            }
            None => Err(Error::unterminated(at, "variable reference")),
        }
    }
}

impl<'t, 'v, V: Variables + ?Sized> Evaluator<'t, 'v, V> {
    #[inline]
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    #[inline]
    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn advance_to(&mut self, end: usize) {
        while self.pos < end {
            self.bump();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'t str {
        let src = self.src;
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        &src[start..self.pos]
    }

    /// Consumes through `close` and returns the text before it, or `None` at end of input.
    fn take_until(&mut self, close: char) -> Option<&'t str> {
        let src = self.src;
        let start = self.pos;
        let end = start + src[start..].find(close)?;
        self.advance_to(end + close.len_utf8());
        Some(&src[start..end])
    }

    #[inline]
    fn position(&self) -> Position {
        Position::new(self.line, self.col)
    }
}

#[inline]
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn undefined(name: &str) -> Error {
    Error::UndefinedVariable { name: name.to_string() }
}

fn bad_substitution(expression: &str, at: Position) -> Error {
    Error::BadSubstitution {
        expression: expression.to_string(),
        line: at.line,
        column: at.col,
    }
}

/// Expand `template` against the accessor carried by `options`.
///
/// Always expands; `options.expand` only governs document values.
pub fn evaluate(template: &str, options: &mut SubstitutionOptions<'_>) -> Result<String> {
    Evaluator::new(template, options.variables_mut()).run()
}

/// Expand `template` against the process environment.
pub fn expand(template: &str) -> Result<String> {
    Evaluator::new(template, &mut ProcessEnv).run()
}
