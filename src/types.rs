use std::borrow::Cow;
use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ==================================================================================
//  Configuration
// ==================================================================================

/// Switches that change how the lexer classifies a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LexOptions {
    pub allow_json: bool,
    pub allow_yaml: bool,
}

impl LexOptions {
    pub fn strict() -> Self {
        Self::default()
    }

    pub fn embedded() -> Self {
        Self {
            allow_json: true,
            allow_yaml: true,
        }
    }
}

// ==================================================================================
//  Position & Spans
// ==================================================================================

/// A location in the input. `line` and `col` are 1-based, `col` counts characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Position {
    pub line: usize,
    pub col: usize,
    pub offset: usize,
}

impl Position {
    #[inline]
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col, offset: 0 }
    }

    #[inline]
    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// Start of a document.
    #[inline]
    pub fn origin() -> Self {
        Self { line: 1, col: 1, offset: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Span {
    pub start: Position,
    pub end: Position,
}

impl Span {
    #[inline]
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.offset - self.start.offset
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn range(&self) -> Range<usize> {
        self.start.offset..self.end.offset
    }
}

// ==================================================================================
//  Tokens
// ==================================================================================

/// How a value was written in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum QuoteStyle {
    #[default]
    Unquoted,
    Double,       // "
    Single,       // '
    EmbeddedJson, // { ... }
    EmbeddedYaml, // --- ... ---
}

impl QuoteStyle {
    pub fn is_embedded(self) -> bool {
        matches!(self, QuoteStyle::EmbeddedJson | QuoteStyle::EmbeddedYaml)
    }
}

/// Output of the lexer state machine. Spans index into the lexed input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    Key(Span),
    Equals(Position),
    /// For quoted values the span excludes the delimiters; JSON spans keep their braces.
    Value(Span, QuoteStyle),
    Comment(Span),
    Newline(Position),
}

/// One logical line group of the input, before value parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexeme<'a> {
    Assignment {
        key: Cow<'a, str>,
        raw_value: &'a str,
        quoting: QuoteStyle,
        value_start: Position,
    },
    Comment(&'a str),
    BlankLine,
}

// ==================================================================================
//  Data Models
// ==================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Assignment {
    pub key: String,
    pub value: String,
    pub quoting: QuoteStyle,
}

impl Assignment {
    pub fn new(key: impl Into<String>, value: impl Into<String>, quoting: QuoteStyle) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            quoting,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Entry {
    Assignment(Assignment),
    /// The full source line, leading whitespace and `#` included.
    Comment(String),
    BlankLine,
}

impl Entry {
    pub fn as_assignment(&self) -> Option<&Assignment> {
        match self {
            Entry::Assignment(a) => Some(a),
            _ => None,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Entry::Comment(_))
    }

    pub fn is_blank(&self) -> bool {
        matches!(self, Entry::BlankLine)
    }
}

impl From<Assignment> for Entry {
    fn from(value: Assignment) -> Self {
        Entry::Assignment(value)
    }
}
