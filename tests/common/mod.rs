#![allow(dead_code)]

use std::collections::HashMap;

use envdoc::{parse_with_options, serialize, Document, Entry, Error, SubstitutionOptions};
use pretty_assertions::assert_eq;

pub fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

/// Parse with expansion against an empty map, never the process environment.
pub fn parse_isolated(input: &str) -> Result<Document, Error> {
    let mut env = HashMap::new();
    parse_in(input, &mut env)
}

pub fn parse_in(input: &str, env: &mut HashMap<String, String>) -> Result<Document, Error> {
    let mut options = SubstitutionOptions::new().with_variables(env);
    parse_with_options(input, &mut options)
}

pub fn parse_literal(input: &str) -> Result<Document, Error> {
    let mut options = SubstitutionOptions::literal().with_variables(HashMap::new());
    parse_with_options(input, &mut options)
}

pub fn parse_single_pair(input: &str) -> Option<(String, String)> {
    let doc = parse_isolated(input).ok()?;
    let first = doc.assignments().next().map(|a| (a.key.clone(), a.value.clone()));
    first
}

pub fn assert_pair(input: &str, expected_key: &str, expected_value: &str) {
    let pair = parse_single_pair(input).unwrap_or_else(|| panic!("Failed to parse pair from input: {:?}", input));
    assert_eq!(pair.0, expected_key, "Key mismatch");
    assert_eq!(pair.1, expected_value, "Value mismatch");
}

pub fn assert_error(input: &str, expected_part: &str) {
    let result = parse_isolated(input);
    assert!(result.is_err(), "Expected error for input: {:?} but got success", input);
    let msg = result.unwrap_err().to_string();
    assert!(msg.contains(expected_part), "Error message {:?} did not contain {:?}", msg, expected_part);
}

fn layout(doc: &Document) -> Vec<Entry> {
    doc.iter().filter(|e| e.as_assignment().is_none()).cloned().collect()
}

/// parse -> serialize -> parse keeps the map projection and every comment and blank line.
pub fn assert_round_trip(input: &str, make_options: impl Fn() -> SubstitutionOptions<'static>) -> String {
    let first = parse_with_options(input, &mut make_options()).expect("first parse");
    let text = serialize(&first);
    let second = parse_with_options(&text, &mut make_options())
        .unwrap_or_else(|e| panic!("serialized text did not parse: {}\n{}", e, text));

    assert_eq!(first.to_map(), second.to_map(), "map projection changed:\n{}", text);
    assert_eq!(layout(&first), layout(&second), "layout changed:\n{}", text);
    text
}
