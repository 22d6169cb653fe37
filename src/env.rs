use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;

/// Lookup and assignment capability used by the substitution evaluator.
///
/// The evaluator keeps no variable storage of its own; every read and every
/// `${NAME:=default}` write goes through this trait.
pub trait Variables {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&mut self, name: &str, value: &str);

    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

impl<T: Variables + ?Sized> Variables for &mut T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        (**self).set(name, value)
    }
}

impl<T: Variables + ?Sized> Variables for Box<T> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        (**self).set(name, value)
    }
}

/// Reads and writes the environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Variables for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }

    fn set(&mut self, name: &str, value: &str) {
        std::env::set_var(name, value);
    }
}

impl Variables for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

impl Variables for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

impl Variables for IndexMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        IndexMap::get(self, name).cloned()
    }

    fn set(&mut self, name: &str, value: &str) {
        self.insert(name.to_string(), value.to_string());
    }
}

/// Adapter turning a pair of closures into a [`Variables`] implementation.
pub struct FnVariables<G, S> {
    get: G,
    set: S,
}

impl<G, S> Variables for FnVariables<G, S>
where
    G: Fn(&str) -> Option<String>,
    S: FnMut(&str, &str),
{
    fn get(&self, name: &str) -> Option<String> {
        (self.get)(name)
    }

    fn set(&mut self, name: &str, value: &str) {
        (self.set)(name, value)
    }
}

pub fn from_fn<G, S>(get: G, set: S) -> FnVariables<G, S>
where
    G: Fn(&str) -> Option<String>,
    S: FnMut(&str, &str),
{
    FnVariables { get, set }
}

/// Earlier assignments of the document being parsed, consulted before the outer accessor.
pub(crate) struct Scoped<'s, 'v> {
    pub(crate) local: &'s IndexMap<String, String>,
    pub(crate) outer: &'s mut (dyn Variables + 'v),
}

impl Variables for Scoped<'_, '_> {
    fn get(&self, name: &str) -> Option<String> {
        match self.local.get(name) {
            Some(v) => Some(v.clone()),
            None => self.outer.get(name),
        }
    }

    fn set(&mut self, name: &str, value: &str) {
        self.outer.set(name, value)
    }
}
