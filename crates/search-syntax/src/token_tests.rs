use crate::config::SearchConfig;
use crate::parser::parse;
use crate::token::{filters, join, join_with, Key, Operator, Term};

fn terms(query: &str) -> Vec<Term> {
    parse(query, &SearchConfig::default()).expect("query should parse")
}

#[test]
fn join_with_leading_space() {
    let ast = terms("foo:bar");
    assert_eq!(join_with(&ast, true, false), " foo:bar");
    // Nothing to lead: stays empty.
    assert_eq!(join_with(&[], true, false), "");
}

#[test]
fn join_with_space_between_top_level_terms() {
    // Spaces nodes are terms too, so extra separators stack.
    let ast = terms("a b");
    assert_eq!(join_with(&ast, false, true), "a   b");
    assert_eq!(join(&ast), "a b");
}

#[test]
fn filters_descend_into_groups() {
    let ast = terms("a:1 (b:2 (c:3))");
    let found = filters(&ast);
    let keys: Vec<&str> = found.iter().map(|f| f.key.name()).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn key_names_are_normalized() {
    let ast = terms(r#"tags[browser]:"x" p95(transaction.duration):>5ms "quoted key":x"#);
    let found = filters(&ast);
    assert_eq!(found[0].key.name(), "browser");
    assert_eq!(found[1].key.name(), "p95");
    assert_eq!(found[2].key.name(), "quoted key");
    assert!(matches!(&found[1].key, Key::Aggregate(_)));
}

#[test]
fn operator_strings() {
    assert_eq!(Operator::Default.as_str(), "");
    assert_eq!(Operator::Eq.as_str(), "=");
    assert_eq!(Operator::NotEq.as_str(), "!=");
    assert_eq!(Operator::GtEq.as_str(), ">=");
    assert!(Operator::Lt.is_comparison());
    assert!(!Operator::NotEq.is_comparison());
}

#[test]
fn terms_serialize_with_type_tags() {
    let ast = terms("is:unresolved");
    let json = serde_json::to_value(&ast).unwrap();
    assert_eq!(json[0]["type"], "Filter");
    assert_eq!(json[0]["filter"], "Is");
    assert_eq!(json[0]["key"]["type"], "Simple");
    assert_eq!(json[0]["operator"], "");
}
