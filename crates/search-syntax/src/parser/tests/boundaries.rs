//! Boundary behavior: empty input, whitespace, unterminated quotes.

use super::{config, only_filter, parse_terms};
use crate::parser::{parse, parse_diagnostics};
use crate::token::Term;

#[test]
fn empty_input_is_an_empty_ast() {
    assert_eq!(parse("", &config()), Some(vec![]));
}

#[test]
fn pure_whitespace_is_a_single_spaces_node() {
    let terms = parse_terms("   \t ");
    assert_eq!(terms.len(), 1);
    match &terms[0] {
        Term::Spaces(spaces) => assert_eq!(spaces.text, "   \t "),
        other => panic!("expected spaces, got {other:#?}"),
    }
}

#[test]
fn unterminated_quote_fails_the_parse() {
    assert_eq!(parse("\"unterminated", &config()), None);
    assert_eq!(parse("foo \"unterminated", &config()), None);
    assert_eq!(parse("key:\"unterminated", &config()), None);
}

#[test]
fn unterminated_quote_reports_its_position() {
    let err = parse_diagnostics("foo \"bar", &config()).unwrap_err();
    assert_eq!(err.offset, 4);
    assert_eq!(err.message, "unterminated quoted string");
    // Rendered output points at the quote.
    assert!(err.render("foo \"bar").contains("unterminated quoted string"));
}

#[test]
fn missing_value_still_parses() {
    let filter = only_filter("foo:");
    let invalid = filter.invalid.expect("empty value should be flagged");
    assert_eq!(invalid.reason, "Filter must have a value");
}

#[test]
fn terms_reconstruct_the_input_exactly() {
    let query = "a  b\tc";
    let terms = parse_terms(query);
    let concatenated: String = terms.iter().map(Term::text).collect();
    assert_eq!(concatenated, query);
}
