use std::fmt;

use crate::env::{ProcessEnv, Variables};
use crate::types::LexOptions;

/// Controls value expansion and embedded blocks, and carries the variable accessor.
///
/// ```
/// use std::collections::HashMap;
///
/// use envdoc::{parse_with_options, SubstitutionOptions};
///
/// # fn main() -> envdoc::Result<()> {
/// let mut vars: HashMap<String, String> = HashMap::new();
/// let mut options = SubstitutionOptions::new().allow_json(true).with_variables(&mut vars);
/// let doc = parse_with_options("CONFIG={\"port\": 80}\nMODE=${MODE:=dev}", &mut options)?;
/// assert_eq!(doc.get("CONFIG"), Some("{\"port\": 80}"));
/// drop(options);
/// assert_eq!(vars.get("MODE").map(String::as_str), Some("dev"));
/// # Ok(())
/// # }
/// ```
pub struct SubstitutionOptions<'v> {
    pub expand: bool,
    pub allow_json: bool,
    pub allow_yaml: bool,
    variables: Box<dyn Variables + 'v>,
}

impl Default for SubstitutionOptions<'static> {
    fn default() -> Self {
        Self {
            expand: true,
            allow_json: false,
            allow_yaml: false,
            variables: Box::new(ProcessEnv),
        }
    }
}

impl SubstitutionOptions<'static> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values are kept exactly as lexed.
    pub fn literal() -> Self {
        Self::default().expand(false)
    }
}

impl<'v> SubstitutionOptions<'v> {
    pub fn expand(mut self, enabled: bool) -> Self {
        self.expand = enabled;
        self
    }

    pub fn allow_json(mut self, enabled: bool) -> Self {
        self.allow_json = enabled;
        self
    }

    pub fn allow_yaml(mut self, enabled: bool) -> Self {
        self.allow_yaml = enabled;
        self
    }

    /// Replace the variable accessor. Pass `&mut map` to inspect `:=` writes afterwards.
    pub fn with_variables<'w>(self, variables: impl Variables + 'w) -> SubstitutionOptions<'w> {
        SubstitutionOptions {
            expand: self.expand,
            allow_json: self.allow_json,
            allow_yaml: self.allow_yaml,
            variables: Box::new(variables),
        }
    }

    pub fn lex_options(&self) -> LexOptions {
        LexOptions {
            allow_json: self.allow_json,
            allow_yaml: self.allow_yaml,
        }
    }

    pub fn variables(&self) -> &(dyn Variables + 'v) {
        &*self.variables
    }

    pub fn variables_mut(&mut self) -> &mut (dyn Variables + 'v) {
        &mut *self.variables
    }
}

impl fmt::Debug for SubstitutionOptions<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstitutionOptions")
            .field("expand", &self.expand)
            .field("allow_json", &self.allow_json)
            .field("allow_yaml", &self.allow_yaml)
            .finish_non_exhaustive()
    }
}
