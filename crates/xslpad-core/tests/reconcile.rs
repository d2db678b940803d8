use std::borrow::Cow;

use xslpad_core::{ParameterEntry, inject, reconcile};

const ROOT: &str = r#"<xsl:stylesheet version="1.0" xmlns:xsl="http://www.w3.org/1999/XSL/Transform">"#;

fn stylesheet(globals: &[&str]) -> String {
    let mut out = format!("{ROOT}\n");
    for name in globals {
        out.push_str(&format!("<xsl:param name=\"{name}\"/>\n"));
    }
    out.push_str("<xsl:template match=\"/\"><out/></xsl:template>\n</xsl:stylesheet>");
    out
}

fn entry(name: &str, value: &str) -> ParameterEntry {
    ParameterEntry::new(name, value)
}

#[test]
fn new_global_is_appended_closed_and_empty() {
    let current = vec![
        ParameterEntry {
            name: "foo".to_string(),
            value: "1".to_string(),
            open: true,
        },
        entry("other", "<x/>"),
    ];
    let next = reconcile(&stylesheet(&["foo", "bar"]), &current);

    assert_eq!(next.len(), 3);
    assert_eq!(next[0], current[0]);
    assert_eq!(next[1], current[1]);
    assert_eq!(next[2], entry("bar", ""));
    assert!(!next[2].open);
}

#[test]
fn unreferenced_empty_entry_is_dropped_but_filled_one_is_kept() {
    let current = vec![entry("foo", ""), entry("baz", ""), entry("qux", "<a/>")];
    let next = reconcile(&stylesheet(&["foo"]), &current);
    assert_eq!(next.into_owned(), vec![entry("foo", ""), entry("qux", "<a/>")]);
}

#[test]
fn unchanged_list_is_borrowed() {
    let current = vec![entry("foo", ""), entry("bar", "2")];
    let next = reconcile(&stylesheet(&["foo", "bar"]), &current);
    assert!(matches!(next, Cow::Borrowed(_)));
}

#[test]
fn unnamed_rows_survive() {
    let current = vec![entry("", "")];
    let next = reconcile(&stylesheet(&[]), &current);
    assert!(matches!(next, Cow::Borrowed(_)));
}

#[test]
fn annotated_buffer_keeps_tracked_names() {
    let current = vec![entry("alpha", ""), entry("beta", "")];
    let buffer = inject(&stylesheet(&[]), &current);
    assert!(matches!(reconcile(&buffer, &current), Cow::Borrowed(_)));

    // Deleting a line from the block releases the entry.
    let edited = buffer.replace("<xsl:param name=\"beta\"/>\n", "");
    assert_eq!(reconcile(&edited, &current).into_owned(), vec![entry("alpha", "")]);
}

#[test]
fn scoped_parameters_are_never_added() {
    let source = format!(
        "{ROOT}\n<xsl:template name=\"t\"><xsl:param name=\"local\"/></xsl:template>\n</xsl:stylesheet>"
    );
    let next = reconcile(&source, &[]);
    assert!(next.is_empty());
}

#[test]
fn duplicate_entries_match_by_existence() {
    let current = vec![entry("foo", ""), entry("foo", "")];
    let next = reconcile(&stylesheet(&["foo"]), &current);
    assert!(matches!(next, Cow::Borrowed(_)));
}
