use std::borrow::Cow;

use tracing::trace;

use crate::error::{Error, Result};
use crate::iter::Tokens;
use crate::types::{LexOptions, Lexeme, Position, QuoteStyle, Span, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    LineStart,
    Key,
    Equals,
    ValueStart,
    Unquoted,
    Quoted(u8),
    Json,
    Yaml,
    LineEnd,
    Done,
}

/// Finite-state lexer over a byte cursor.
///
/// Every delimiter the grammar cares about is ASCII, so scanning bytes never
/// splits a UTF-8 sequence at a token boundary. After the first error the
/// lexer is exhausted.
pub struct Lexer<'a> {
    bytes: &'a [u8],
    cursor: usize,
    line: usize,
    line_start: usize,
    mode: Mode,
    options: LexOptions,
}

impl<'a> Lexer<'a> {
    #[inline(always)]
    pub fn new(input: &'a str) -> Self {
        Self::with_options(input, LexOptions::default())
    }

    pub fn with_options(input: &'a str, options: LexOptions) -> Self {
        let bom = if input.starts_with('\u{FEFF}') { 3 } else { 0 };
        Self {
            bytes: input.as_bytes(),
            cursor: bom,
            line: 1,
            line_start: bom,
            mode: Mode::LineStart,
            options,
        }
    }

    pub fn tokens(self) -> Tokens<'a> {
        Tokens::new(self)
    }

    pub fn next_token(&mut self) -> Option<Result<Token>> {
        let token = self.step();
        if let Some(Err(_)) = token {
            self.mode = Mode::Done;
        }
        token
    }

    fn step(&mut self) -> Option<Result<Token>> {
        loop {
            match self.mode {
                Mode::Done => return None,
                Mode::LineStart => {
                    self.skip_horizontal_whitespace();
                    if self.is_eof() {
                        self.mode = Mode::Done;
                        return None;
                    }
                    if self.at_line_break() {
                        return Some(Ok(self.consume_line_break()));
                    }
                    if self.peek() == b'#' {
                        let start = self.position_at(self.line_start);
                        let mut end = self.line_end();
                        if end > self.cursor && self.bytes[end - 1] == b'\r' {
                            end -= 1;
                        }
                        let span = Span::new(start, self.position_at(end));
                        self.cursor = end;
                        self.mode = Mode::LineEnd;
                        return Some(Ok(Token::Comment(span)));
                    }
                    self.mode = Mode::Key;
                }
                Mode::Key => return Some(self.lex_key()),
                Mode::Equals => {
                    let at = self.position();
                    self.cursor += 1;
                    self.mode = Mode::ValueStart;
                    return Some(Ok(Token::Equals(at)));
                }
                Mode::ValueStart => {
                    self.skip_horizontal_whitespace();
                    self.mode = match self.bytes.get(self.cursor) {
                        Some(b'"') => Mode::Quoted(b'"'),
                        Some(b'\'') => Mode::Quoted(b'\''),
                        Some(b'{') if self.options.allow_json => Mode::Json,
                        Some(b'-') if self.options.allow_yaml && self.at_yaml_opener() => Mode::Yaml,
                        _ => Mode::Unquoted,
                    };
                }
                Mode::Unquoted => {
                    let start = self.position();
                    let line_end = self.line_end();
                    let end = self.trim_end(self.cursor, line_end);
                    let span = Span::new(start, self.position_at(end));
                    self.cursor = line_end;
                    self.mode = Mode::LineEnd;
                    return Some(Ok(Token::Value(span, QuoteStyle::Unquoted)));
                }
                Mode::Quoted(delimiter) => return Some(self.lex_quoted(delimiter)),
                Mode::Json => return Some(self.lex_json()),
                Mode::Yaml => return Some(self.lex_yaml()),
                Mode::LineEnd => {
                    let line_end = self.line_end();
                    if self.trim_end(self.cursor, line_end) > self.cursor {
                        trace!(line = self.line, "ignoring trailing text after value");
                    }
                    self.cursor = line_end;
                    if self.is_eof() {
                        self.mode = Mode::Done;
                        return None;
                    }
                    return Some(Ok(self.consume_line_break()));
                }
            }
        }
    }
}

impl<'a> Lexer<'a> {
    fn lex_key(&mut self) -> Result<Token> {
        let start = self.cursor;
        let start_pos = self.position();

        loop {
            if self.is_eof() || self.peek() == b'\n' {
                return Err(Error::malformed(start_pos, "missing '=' after key"));
            }
            match self.peek() {
                b'\\' if matches!(self.bytes.get(self.cursor + 1), Some(b'=' | b'\\')) => self.cursor += 2,
                b'=' => break,
                _ => self.cursor += 1,
            }
        }

        let end = self.trim_end(start, self.cursor);
        if end == start {
            return Err(Error::malformed(start_pos, "empty key"));
        }

        self.mode = Mode::Equals;
        Ok(Token::Key(Span::new(start_pos, self.position_at(end))))
    }

    fn lex_quoted(&mut self, delimiter: u8) -> Result<Token> {
        let (style, name) = if delimiter == b'"' {
            (QuoteStyle::Double, "double-quoted value")
        } else {
            (QuoteStyle::Single, "single-quoted value")
        };

        let open = self.position();
        self.cursor += 1;
        let start = self.position();

        loop {
            if self.is_eof() {
                return Err(Error::unterminated(open, name));
            }
            let b = self.peek();
            if b == delimiter {
                break;
            }
            if b == b'\\' && delimiter == b'"' && self.cursor + 1 < self.bytes.len() {
                self.bump();
            }
            self.bump();
        }

        let end = self.position();
        self.cursor += 1;
        self.mode = Mode::LineEnd;
        Ok(Token::Value(Span::new(start, end), style))
    }

    // Braces are balanced by count alone; quotes inside the block are not tracked,
    // so a `{` or `}` inside a JSON string literal shifts the depth.
    fn lex_json(&mut self) -> Result<Token> {
        let open = self.position();
        let mut depth = 0usize;

        loop {
            if self.is_eof() {
                return Err(Error::unterminated(open, "JSON block"));
            }
            let b = self.peek();
            self.bump();
            match b {
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }

        let end = self.position();
        let line_end = self.line_end();
        if self.trim_end(self.cursor, line_end) > self.cursor {
            return Err(Error::embedded(end, "JSON", "unbalanced braces, text after the closing brace"));
        }

        self.mode = Mode::LineEnd;
        Ok(Token::Value(Span::new(open, end), QuoteStyle::EmbeddedJson))
    }

    fn lex_yaml(&mut self) -> Result<Token> {
        let open = self.position();
        self.cursor = self.line_end();
        if self.is_eof() {
            return Err(Error::unterminated(open, "YAML block"));
        }
        self.bump();

        let start = self.position();
        loop {
            if self.is_eof() {
                return Err(Error::unterminated(open, "YAML block"));
            }
            let line_end = self.line_end();
            let content_end = self.trim_end(self.cursor, line_end);
            if &self.bytes[self.cursor..content_end] == b"---" {
                let end = self.position();
                self.cursor = line_end;
                self.mode = Mode::LineEnd;
                return Ok(Token::Value(Span::new(start, end), QuoteStyle::EmbeddedYaml));
            }
            self.cursor = line_end;
            if self.is_eof() {
                return Err(Error::unterminated(open, "YAML block"));
            }
            self.bump();
        }
    }
}

impl<'a> Lexer<'a> {
    #[inline(always)]
    fn peek(&self) -> u8 {
        debug_assert!(self.cursor < self.bytes.len(), "peek() called when at EOF");
        self.bytes[self.cursor]
    }

    #[inline(always)]
    fn is_eof(&self) -> bool {
        self.cursor >= self.bytes.len()
    }

    #[inline]
    fn bump(&mut self) {
        if self.bytes[self.cursor] == b'\n' {
            self.line += 1;
            self.line_start = self.cursor + 1;
        }
        self.cursor += 1;
    }

    /// A value line that is exactly `---` opens a YAML block; `---x` is plain text.
    fn at_yaml_opener(&self) -> bool {
        let end = self.trim_end(self.cursor, self.line_end());
        &self.bytes[self.cursor..end] == b"---"
    }

    #[inline]
    fn at_line_break(&self) -> bool {
        match self.peek() {
            b'\n' => true,
            b'\r' => self.bytes.get(self.cursor + 1) == Some(&b'\n'),
            _ => false,
        }
    }

    /// Consumes `\n` or `\r\n` at the cursor.
    fn consume_line_break(&mut self) -> Token {
        let at = self.position();
        if self.peek() == b'\r' {
            self.cursor += 1;
        }
        self.bump();
        self.mode = Mode::LineStart;
        Token::Newline(at)
    }

    #[inline]
    fn skip_horizontal_whitespace(&mut self) {
        if self.cursor < self.bytes.len() {
            let remaining = &self.bytes[self.cursor..];
            let advance = remaining.iter().position(|&b| b != b' ' && b != b'\t').unwrap_or(remaining.len());
            self.cursor += advance;
        }
    }

    /// Index of the next `\n`, or the end of input.
    #[inline]
    fn line_end(&self) -> usize {
        let remaining = &self.bytes[self.cursor..];
        self.cursor + remaining.iter().position(|&b| b == b'\n').unwrap_or(remaining.len())
    }

    #[inline]
    fn trim_end(&self, start: usize, mut end: usize) -> usize {
        while end > start && matches!(self.bytes[end - 1], b' ' | b'\t' | b'\r') {
            end -= 1;
        }
        end
    }

    #[inline]
    fn position(&self) -> Position {
        self.position_at(self.cursor)
    }

    /// `offset` must lie on the current line.
    fn position_at(&self, offset: usize) -> Position {
        let col = self.bytes[self.line_start..offset]
            .iter()
            .filter(|&&b| (b & 0xC0) != 0x80)
            .count()
            + 1;
        Position::new(self.line, col).with_offset(offset)
    }
}

/// Lex `input` into assignments, comments and blank lines, stopping at the first error.
pub fn tokenize(input: &str, options: LexOptions) -> Result<Vec<Lexeme<'_>>> {
    let mut lexemes = Vec::with_capacity(32);
    let mut pending_key: Option<Span> = None;
    let mut line_used = false;

    for token in Lexer::with_options(input, options).tokens() {
        match token? {
            Token::Key(span) => pending_key = Some(span),
            Token::Equals(_) => {}
            Token::Value(span, quoting) => {
                if let Some(key) = pending_key.take() {
                    lexemes.push(Lexeme::Assignment {
                        key: unescape_key(&input[key.range()]),
                        raw_value: &input[span.range()],
                        quoting,
                        value_start: span.start,
                    });
                }
                line_used = true;
            }
            Token::Comment(span) => {
                lexemes.push(Lexeme::Comment(&input[span.range()]));
                line_used = true;
            }
            Token::Newline(_) => {
                if !line_used {
                    lexemes.push(Lexeme::BlankLine);
                }
                line_used = false;
            }
        }
    }

    Ok(lexemes)
}

fn unescape_key(raw: &str) -> Cow<'_, str> {
    if !raw.contains('\\') {
        return Cow::Borrowed(raw);
    }
    let mut key = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '=' || next == '\\' {
                    key.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        key.push(c);
    }
    Cow::Owned(key)
}
