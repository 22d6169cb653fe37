use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::document::Document;
use crate::env::Variables;
use crate::error::{Error, Result};
use crate::options::SubstitutionOptions;

enum Source<'a> {
    Str(&'a str),
    Bytes(&'a [u8]),
    File(PathBuf),
    Reader(Box<dyn Read + 'a>),
}

/// Collects a text source and the parse switches, then produces a [`Document`].
pub struct EnvDocBuilder<'a, 'v> {
    source: Source<'a>,
    options: SubstitutionOptions<'v>,
}

impl<'a> EnvDocBuilder<'a, 'static> {
    fn new(source: Source<'a>) -> Self {
        Self {
            source,
            options: SubstitutionOptions::default(),
        }
    }
}

impl<'a, 'v> EnvDocBuilder<'a, 'v> {
    /// Expand `$NAME`, `${NAME}` and `%NAME%` references in values (on by default).
    pub fn expand(mut self, enabled: bool) -> Self {
        self.options = self.options.expand(enabled);
        self
    }

    /// Accept `KEY={ ... }` blocks.
    pub fn allow_json(mut self) -> Self {
        self.options = self.options.allow_json(true);
        self
    }

    /// Accept `KEY=---` blocks closed by a `---` line.
    pub fn allow_yaml(mut self) -> Self {
        self.options = self.options.allow_yaml(true);
        self
    }

    /// Resolve references through `variables` instead of the process environment.
    pub fn variables<'w>(self, variables: impl Variables + 'w) -> EnvDocBuilder<'a, 'w> {
        EnvDocBuilder {
            source: self.source,
            options: self.options.with_variables(variables),
        }
    }

    pub fn parse(self) -> Result<Document> {
        let EnvDocBuilder { source, mut options } = self;

        let content = match source {
            Source::Str(s) => return Document::parse(s, &mut options),
            Source::Bytes(b) => {
                let s = std::str::from_utf8(b).map_err(|e| Error::InvalidUtf8 { offset: e.valid_up_to() })?;
                return Document::parse(s, &mut options);
            }
            Source::File(path) => {
                debug!(path = %path.display(), "reading dotenv file");
                fs::read_to_string(&path)
                    .map_err(|e| Error::Io(format!("Failed to read file {}: {}", path.display(), e)))?
            }
            Source::Reader(mut reader) => {
                let mut s = String::new();
                reader
                    .read_to_string(&mut s)
                    .map_err(|e| Error::Io(format!("Failed to read from reader: {}", e)))?;
                s
            }
        };

        Document::parse(&content, &mut options)
    }
}

/// Main entry point for loading dotenv documents.
pub struct EnvDoc;

impl EnvDoc {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &str) -> EnvDocBuilder<'_, 'static> {
        EnvDocBuilder::new(Source::Str(input))
    }

    /// The bytes must be UTF-8; a leading byte order mark is skipped.
    pub fn from_bytes(input: &[u8]) -> EnvDocBuilder<'_, 'static> {
        EnvDocBuilder::new(Source::Bytes(input))
    }

    pub fn from_file(path: impl Into<PathBuf>) -> EnvDocBuilder<'static, 'static> {
        EnvDocBuilder::new(Source::File(path.into()))
    }

    pub fn from_reader<'a>(reader: impl Read + 'a) -> EnvDocBuilder<'a, 'static> {
        EnvDocBuilder::new(Source::Reader(Box::new(reader)))
    }

    /// Search for `filename` in the current directory and its ancestors.
    pub fn find_file(filename: &str) -> Result<EnvDocBuilder<'static, 'static>> {
        let current = std::env::current_dir()
            .map_err(|e| Error::Io(format!("Failed to get current directory: {}", e)))?;
        Self::find_file_from(&current, filename)
    }

    pub fn find_file_from(start: &Path, filename: &str) -> Result<EnvDocBuilder<'static, 'static>> {
        for dir in start.ancestors() {
            let file_path = dir.join(filename);
            if file_path.is_file() {
                debug!(path = %file_path.display(), "found dotenv file");
                return Ok(Self::from_file(file_path));
            }
        }

        Err(Error::Io(format!(
            "File '{}' not found in {} or its ancestors",
            filename,
            start.display()
        )))
    }
}
