//! Layout-preserving dotenv documents with `$NAME`, `${NAME:-default}` and
//! `%NAME%` expansion.
//!
//! ```
//! use std::collections::HashMap;
//!
//! use envdoc::SubstitutionOptions;
//!
//! # fn main() -> envdoc::Result<()> {
//! let mut vars = HashMap::from([("WORD".to_string(), "World".to_string())]);
//! let mut options = SubstitutionOptions::new().with_variables(&mut vars);
//! let doc = envdoc::parse_with_options("# greeting\nHELLO=\"Hello $WORD\"\n", &mut options)?;
//! assert_eq!(doc.get("HELLO"), Some("Hello World"));
//! assert_eq!(envdoc::serialize(&doc), "# greeting\nHELLO=\"Hello World\"\n");
//! # Ok(())
//! # }
//! ```

mod builder;
mod document;
mod env;
mod error;
mod iter;
mod lexer;
mod options;
mod serializer;
mod subst;
mod types;
mod value;

use indexmap::IndexMap;

pub use builder::{EnvDoc, EnvDocBuilder};
pub use document::Document;
pub use env::{from_fn, FnVariables, ProcessEnv, Variables};
pub use error::{Error, Result};
pub use iter::Tokens;
pub use lexer::{tokenize, Lexer};
pub use options::SubstitutionOptions;
pub use serializer::effective_style;
pub use subst::{evaluate, expand, Evaluator, DOUBLE_QUOTED_ESCAPES, TEMPLATE_ESCAPES};
pub use types::{Assignment, Entry, LexOptions, Lexeme, Position, QuoteStyle, Span, Token};
pub use value::{normalize_line_breaks, parse_value};

/// Parse with default options: expansion on, embedded blocks off, process environment.
pub fn parse(input: &str) -> Result<Document> {
    Document::parse(input, &mut SubstitutionOptions::default())
}

pub fn parse_with_options(input: &str, options: &mut SubstitutionOptions<'_>) -> Result<Document> {
    Document::parse(input, options)
}

pub fn to_map(doc: &Document) -> IndexMap<String, String> {
    doc.to_map()
}

pub fn serialize(doc: &Document) -> String {
    serializer::serialize(doc)
}
