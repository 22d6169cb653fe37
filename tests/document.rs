mod common;
use common::{parse_in, parse_isolated, vars};

use std::collections::HashMap;

use envdoc::{to_map, Assignment, Document, Entry, Error, QuoteStyle};
use pretty_assertions::assert_eq;

// --- 1. Duplicate keys ---

#[test]
fn test_duplicate_keys_last_wins() {
    let doc = parse_isolated("A=1\nB=2\nA=3").unwrap();
    assert_eq!(doc.assignments().count(), 3);
    assert_eq!(doc.get("A"), Some("3"));

    let map = to_map(&doc);
    assert_eq!(map.keys().collect::<Vec<_>>(), vec!["A", "B"]);
    assert_eq!(map["A"], "3");
}

#[test]
fn test_keys_distinct_in_first_appearance_order() {
    let doc = parse_isolated("B=1\nA=2\nB=3\nC=4").unwrap();
    assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["B", "A", "C"]);
}

#[test]
fn test_get_or_and_contains() {
    let doc = parse_isolated("A=1").unwrap();
    assert!(doc.contains_key("A"));
    assert!(!doc.contains_key("B"));
    assert_eq!(doc.get_or("B", "fallback"), "fallback");
}

// --- 2. References between entries ---

#[test]
fn test_reference_to_earlier_entry() {
    let doc = parse_isolated("BASE=/opt\nBIN=$BASE/bin").unwrap();
    assert_eq!(doc.get("BIN"), Some("/opt/bin"));
}

#[test]
fn test_document_entries_shadow_accessor() {
    let mut env = vars(&[("BASE", "/usr")]);
    let doc = parse_in("BASE=/opt\nBIN=${BASE}/bin", &mut env).unwrap();
    assert_eq!(doc.get("BIN"), Some("/opt/bin"));

    let doc = parse_in("BIN=${BASE}/bin\nBASE=/opt", &mut env).unwrap();
    assert_eq!(doc.get("BIN"), Some("/usr/bin"));
}

#[test]
fn test_assign_operator_writes_to_accessor() {
    let mut env = HashMap::new();
    let doc = parse_in("A=${NEW:=fallback}\nB=$NEW", &mut env).unwrap();
    assert_eq!(doc.get("A"), Some("fallback"));
    assert_eq!(doc.get("B"), Some("fallback"));
    assert_eq!(env.get("NEW").map(String::as_str), Some("fallback"));
}

#[test]
fn test_default_operator_leaves_accessor_alone() {
    let mut env = HashMap::new();
    parse_in("A=${NEW:-fallback}", &mut env).unwrap();
    assert!(env.is_empty());
}

// --- 3. Functional updates ---

#[test]
fn test_set_replaces_last_occurrence() {
    let doc = parse_isolated("A=1\nA=2\n# c").unwrap();
    let updated = doc.set("A", "9").unwrap();

    assert_eq!(doc.get("A"), Some("2"));
    assert_eq!(updated.get("A"), Some("9"));
    assert_eq!(updated.assignments().next().unwrap().value, "1");
    assert_eq!(updated.len(), doc.len());
}

#[test]
fn test_set_appends_new_key() {
    let doc = parse_isolated("A=1").unwrap();
    let updated = doc.set("B", "2").unwrap();
    assert_eq!(updated.len(), 2);
    assert_eq!(
        updated.entries()[1],
        Entry::Assignment(Assignment::new("B", "2", QuoteStyle::Unquoted))
    );
}

#[test]
fn test_set_rejects_empty_key() {
    let doc = Document::new();
    assert!(matches!(doc.set("  ", "v"), Err(Error::MalformedAssignment { .. })));
}

#[test]
fn test_remove_drops_every_occurrence() {
    let doc = parse_isolated("A=1\n# keep\nA=2\nB=3").unwrap();
    let updated = doc.remove("A");
    assert!(!updated.contains_key("A"));
    assert_eq!(updated.len(), 2);
    assert_eq!(doc.len(), 4);
}

#[test]
fn test_into_entries_keeps_layout() {
    let entries = parse_isolated("# c\n\nA=1").unwrap().into_entries();
    assert_eq!(
        entries,
        vec![
            Entry::Comment("# c".into()),
            Entry::BlankLine,
            Entry::Assignment(Assignment::new("A", "1", QuoteStyle::Unquoted)),
        ]
    );
    let rebuilt = Document::from_entries(entries, true).unwrap();
    assert_eq!(rebuilt.to_string(), "# c\n\nA=1\n");
}

#[test]
fn test_with_entry() {
    let doc = Document::new()
        .with_entry(Entry::Comment("# generated".into()))
        .unwrap()
        .with_entry(Assignment::new("A", "1", QuoteStyle::Double))
        .unwrap();
    assert_eq!(doc.to_string(), "# generated\nA=\"1\"\n");
}

#[test]
fn test_from_entries_validates_keys() {
    let entries = vec![Entry::Assignment(Assignment::new("", "v", QuoteStyle::Unquoted))];
    assert!(Document::from_entries(entries, true).is_err());

    let entries = vec![Entry::Assignment(Assignment::new("#A", "v", QuoteStyle::Unquoted))];
    assert!(Document::from_entries(entries, true).is_err());
}

// --- 4. Applying to an accessor ---

#[test]
fn test_apply_without_overwrite() {
    let doc = parse_isolated("A=new\nB=2").unwrap();
    let mut env = vars(&[("A", "old")]);
    assert_eq!(doc.apply(&mut env, false), 1);
    assert_eq!(env["A"], "old");
    assert_eq!(env["B"], "2");
}

#[test]
fn test_apply_with_overwrite() {
    let doc = parse_isolated("A=new\nB=2").unwrap();
    let mut env = vars(&[("A", "old")]);
    assert_eq!(doc.apply(&mut env, true), 2);
    assert_eq!(env.get("A").map(String::as_str), Some("new"));
}

// --- 5. Output ---

#[test]
fn test_display_matches_serialize() {
    let doc = parse_isolated("# c\nA=1").unwrap();
    assert_eq!(doc.to_string(), envdoc::serialize(&doc));
}

#[test]
fn test_write_to() {
    let doc = parse_isolated("A=1\n\nB='x y'").unwrap();
    let mut buf = Vec::new();
    doc.write_to(&mut buf).unwrap();
    assert_eq!(String::from_utf8(buf).unwrap(), "A=1\n\nB='x y'\n");
}

#[test]
fn test_document_is_shareable_across_threads() {
    let doc = std::sync::Arc::new(parse_isolated("A=1").unwrap());
    let handle = {
        let doc = doc.clone();
        std::thread::spawn(move || doc.get("A").map(str::to_string))
    };
    assert_eq!(handle.join().unwrap(), Some("1".to_string()));
}
