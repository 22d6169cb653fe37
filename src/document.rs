use std::fmt;
use std::io;

use indexmap::IndexMap;
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::env::{Scoped, Variables};
use crate::error::{Error, Result};
use crate::lexer::tokenize;
use crate::options::SubstitutionOptions;
use crate::serializer;
use crate::types::{Assignment, Entry, Lexeme, Position, QuoteStyle};
use crate::value::parse_value;

/// Parsed dotenv document. Entries keep their source order and are never
/// changed in place; updates return a new `Document`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Document {
    entries: Vec<Entry>,
    expanded: bool,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(input: &str, options: &mut SubstitutionOptions<'_>) -> Result<Self> {
        let lexemes = tokenize(input, options.lex_options())?;
        let expand = options.expand;

        let mut entries = Vec::with_capacity(lexemes.len());
        let mut seen: IndexMap<String, String> = IndexMap::new();

        for lexeme in lexemes {
            match lexeme {
                Lexeme::Assignment { key, raw_value, quoting, value_start } => {
                    let value = {
                        let mut scope = Scoped {
                            local: &seen,
                            outer: options.variables_mut(),
                        };
                        parse_value(raw_value, quoting, value_start, expand, &mut scope)?
                    };
                    let key = key.into_owned();
                    seen.insert(key.clone(), value.clone());
                    entries.push(Entry::Assignment(Assignment { key, value, quoting }));
                }
                Lexeme::Comment(text) => entries.push(Entry::Comment(text.to_string())),
                Lexeme::BlankLine => entries.push(Entry::BlankLine),
            }
        }

        debug!(entries = entries.len(), keys = seen.len(), expand, "parsed dotenv document");
        Ok(Self { entries, expanded: expand })
    }

    /// Build a document from entries that were not read from text.
    ///
    /// `expanded` tells the serializer whether the text will be read back with
    /// expansion, which decides how `$`, `%` and `\` get protected.
    pub fn from_entries(entries: Vec<Entry>, expanded: bool) -> Result<Self> {
        for entry in &entries {
            if let Entry::Assignment(a) = entry {
                validate_key(&a.key)?;
            }
        }
        Ok(Self { entries, expanded })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether values were expanded when this document was parsed.
    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn assignments(&self) -> impl Iterator<Item = &Assignment> {
        self.entries.iter().filter_map(Entry::as_assignment)
    }

    pub fn comments(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Comment(text) => Some(text.as_str()),
            _ => None,
        })
    }

    /// Value of the last assignment to `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.assignments().filter(|a| a.key == key).last().map(|a| a.value.as_str())
    }

    pub fn get_or<'b>(&'b self, key: &str, default: &'b str) -> &'b str {
        self.get(key).unwrap_or(default)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.assignments().any(|a| a.key == key)
    }

    /// Distinct keys in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let mut seen = IndexMap::new();
        for a in self.assignments() {
            seen.insert(a.key.as_str(), ());
        }
        seen.into_keys()
    }

    /// Key to value projection; a repeated key keeps its first position and its last value.
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut map = IndexMap::with_capacity(self.entries.len());
        for a in self.assignments() {
            map.insert(a.key.clone(), a.value.clone());
        }
        map
    }

    /// New document with `entry` appended.
    pub fn with_entry(&self, entry: impl Into<Entry>) -> Result<Self> {
        let entry = entry.into();
        if let Entry::Assignment(a) = &entry {
            validate_key(&a.key)?;
        }
        let mut entries = self.entries.clone();
        entries.push(entry);
        Ok(Self { entries, expanded: self.expanded })
    }

    /// New document where the last assignment to `key` carries `value`, or with
    /// a fresh unquoted assignment appended when `key` is absent.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<Self> {
        validate_key(key)?;
        let value = value.into();
        let mut entries = self.entries.clone();

        let last = entries
            .iter_mut()
            .rev()
            .find_map(|e| match e {
                Entry::Assignment(a) if a.key == key => Some(a),
                _ => None,
            });

        match last {
            Some(a) => a.value = value,
            None => entries.push(Entry::Assignment(Assignment::new(key, value, QuoteStyle::Unquoted))),
        }
        Ok(Self { entries, expanded: self.expanded })
    }

    /// New document without any assignment to `key`.
    pub fn remove(&self, key: &str) -> Self {
        let entries = self
            .entries
            .iter()
            .filter(|e| !matches!(e, Entry::Assignment(a) if a.key == key))
            .cloned()
            .collect();
        Self { entries, expanded: self.expanded }
    }

    /// Push the map projection into `variables`, leaving existing names alone unless `overwrite`.
    pub fn apply<V: Variables + ?Sized>(&self, variables: &mut V, overwrite: bool) -> usize {
        let mut applied = 0;
        for (key, value) in self.to_map() {
            if !overwrite && variables.contains(&key) {
                continue;
            }
            variables.set(&key, &value);
            applied += 1;
        }
        debug!(applied, overwrite, "applied dotenv document");
        applied
    }

    pub fn write_to<W: io::Write>(&self, mut writer: W) -> io::Result<()> {
        writer.write_all(serializer::serialize(self).as_bytes())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        serializer::write_document(self, f)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn validate_key(key: &str) -> Result<()> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(Error::malformed(Position::default(), "empty key"));
    }
    if trimmed.len() != key.len() || key.starts_with('#') || key.contains(['\n', '\r']) {
        return Err(Error::malformed(Position::default(), "key cannot be written back as text"));
    }
    Ok(())
}
