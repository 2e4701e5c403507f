//! Parser test suite, split by area.

mod boundaries;
mod invalid;
mod roundtrip;
mod values;

use std::fmt::Write;

use crate::config::SearchConfig;
use crate::parser::parse;
use crate::token::{Filter, Term};

/// Default catalog used by most tests.
fn config() -> SearchConfig {
    SearchConfig::default()
}

fn parse_terms(query: &str) -> Vec<Term> {
    parse_terms_with(query, &config())
}

fn parse_terms_with(query: &str, config: &SearchConfig) -> Vec<Term> {
    parse(query, config).unwrap_or_else(|| panic!("query should parse: {query:?}"))
}

/// Parses a query expected to be exactly one filter term.
fn only_filter(query: &str) -> Filter {
    only_filter_with(query, &config())
}

fn only_filter_with(query: &str, config: &SearchConfig) -> Filter {
    let terms = parse_terms_with(query, config);
    assert_eq!(terms.len(), 1, "expected a single term for {query:?}, got {terms:#?}");
    match terms.into_iter().next() {
        Some(Term::Filter(filter)) => filter,
        other => panic!("expected a filter for {query:?}, got {other:#?}"),
    }
}

/// Compact structural dump for snapshot assertions.
fn dump(terms: &[Term]) -> String {
    let mut out = String::new();
    for term in terms {
        dump_term(term, 0, &mut out);
    }
    out
}

fn dump_term(term: &Term, indent: usize, out: &mut String) {
    let pad = "  ".repeat(indent);
    match term {
        Term::Spaces(_) => {
            let _ = writeln!(out, "{pad}Spaces");
        }
        Term::FreeText(t) => {
            let _ = writeln!(out, "{pad}FreeText {:?}", t.value);
        }
        Term::LogicBoolean(b) => {
            let _ = writeln!(out, "{pad}LogicBoolean {:?}", b.op);
        }
        Term::LogicGroup(g) => {
            let _ = writeln!(out, "{pad}LogicGroup");
            for child in &g.terms {
                dump_term(child, indent + 1, out);
            }
        }
        Term::Filter(f) => {
            let negated = if f.negated { " negated" } else { "" };
            let invalid = if f.invalid.is_some() { " invalid" } else { "" };
            let _ = writeln!(
                out,
                "{pad}Filter {:?} key={:?} op={:?} value={:?}{negated}{invalid}",
                f.filter,
                f.key.name(),
                f.operator.as_str(),
                f.value.text(),
            );
        }
    }
}
