//! The round-trip law and the structural invariants of committed filters.

use super::{config, parse_terms_with};
use crate::token::{join, Term};

/// Queries covering every term and filter shape. Each must reconstruct
/// byte-for-byte through `join`.
const CORPUS: &[&str] = &[
    "",
    " ",
    "  \t ",
    "is:unresolved",
    "!is:unresolved",
    "has:browser",
    r#"browser.name:"Chrome 33.0""#,
    "browser.name:[Chrome,Firefox]",
    "browser.name:[Chrome, Firefox]",
    "issue.id:1k",
    "issue.id:=5",
    "issue.id:[1, 2.5m, 3b]",
    "issue.id:[1,,3]",
    "transaction.duration:>500ms",
    "transaction.duration:<=4h",
    "measurements.fcp:>3s",
    "spans.http:>0.5s",
    "error.handled:true",
    "error.handled:0",
    "event.timestamp:>=2023-01-01T00:00:00Z",
    "event.timestamp:2023-01-01",
    "event.timestamp:-24h",
    "event.timestamp:+1w",
    "release.version:>=1.2.3",
    r#"tags[browser]:"Chrome""#,
    "count():>50",
    "count( ):>50",
    "p95(transaction.duration):>500ms",
    "count_if( transaction.duration , greater , 300 ):>5",
    "count():>notanumber",
    "foo:bar AND (baz:qux OR quux:[1,2,3])",
    "((a:1) OR b:2)",
    "(foo",
    "foo)",
    "hello world",
    r#""two words""#,
    "Error(foo)",
    "TypeError: foo",
    "foo:",
    "issue.id:abc",
    "foo:[a,,b]",
    "message:héllo",
    "a:1 and b:2",
    "!foo",
];

fn corpus_config() -> crate::config::SearchConfig {
    let mut config = config();
    config.numeric_keys.insert("quux".to_owned());
    config
}

#[test]
fn join_round_trips_every_query() {
    let config = corpus_config();
    for query in CORPUS {
        let terms = parse_terms_with(query, &config);
        assert_eq!(&join(&terms), query, "round-trip failed for {query:?}");
    }
}

#[test]
fn node_text_concatenates_to_the_input() {
    let config = corpus_config();
    for query in CORPUS {
        let terms = parse_terms_with(query, &config);
        let concatenated: String = terms.iter().map(Term::text).collect();
        assert_eq!(&concatenated, query, "text concatenation failed for {query:?}");
    }
}

/// Group text must equal `(` + children + `)` all the way down, or a
/// consumer slicing by spans would read the wrong bytes.
#[test]
fn group_text_composes_recursively() {
    fn check(terms: &[Term]) {
        for term in terms {
            if let Term::LogicGroup(group) = term {
                let inner: String = group.terms.iter().map(Term::text).collect();
                assert_eq!(group.text, format!("({inner})"));
                check(&group.terms);
            }
        }
    }
    let config = corpus_config();
    for query in CORPUS {
        check(&parse_terms_with(query, &config));
    }
}

#[test]
fn spans_slice_the_input() {
    let config = corpus_config();
    for query in CORPUS {
        let terms = parse_terms_with(query, &config);
        for term in &terms {
            let range = term.span();
            let slice = &query[usize::from(range.start())..usize::from(range.end())];
            assert_eq!(slice, term.text(), "span mismatch in {query:?}");
        }
    }
}

#[test]
fn committed_filters_satisfy_the_shape_table() {
    let config = corpus_config();
    for query in CORPUS {
        let terms = parse_terms_with(query, &config);
        for filter in crate::token::filters(&terms) {
            let table = filter.filter.config();
            assert!(
                !filter.negated || table.can_negate,
                "negation violates the table in {query:?}"
            );
            // Ordered-text keys expand the operator set; every other filter
            // stays within its row.
            if !(filter.filter == crate::filter::FilterType::Text
                && filter.operator != crate::token::Operator::Default)
            {
                assert!(
                    table.admits(filter) || filter.invalid.is_some(),
                    "shape violates the table in {query:?}: {filter:#?}"
                );
            }
        }
    }
}
