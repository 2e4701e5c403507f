//! Invalid verdicts: value sanity, key-type repair hints, list hygiene.

use super::{config, only_filter, only_filter_with};
use crate::config::SearchConfig;
use crate::filter::FilterType;
use crate::token::Invalid;

fn invalid_of(query: &str) -> Invalid {
    invalid_with(query, &config())
}

fn invalid_with(query: &str, config: &SearchConfig) -> Invalid {
    only_filter_with(query, config)
        .invalid
        .unwrap_or_else(|| panic!("expected an invalid verdict for {query:?}"))
}

#[test]
fn unescaped_quotes_in_unquoted_values() {
    let invalid = invalid_of(r#"foo:ab"cd"#);
    assert_eq!(invalid.reason, "Quotes must enclose text or be escaped");
    assert_eq!(invalid.expected_type, None);
}

#[test]
fn escaped_quotes_are_fine() {
    let filter = only_filter(r#"foo:ab\"cd"#);
    assert_eq!(filter.invalid, None);
}

#[test]
fn empty_values() {
    assert_eq!(invalid_of("foo:").reason, "Filter must have a value");
    assert_eq!(invalid_of("is:").reason, "Filter must have a value");
}

#[test]
fn duration_key_with_text_value() {
    let mut config = config();
    config.duration_keys.insert("duration".to_owned());
    let invalid = invalid_with(r#"duration:"hello""#, &config);
    assert_eq!(
        invalid.reason,
        "Invalid duration. Expected number followed by duration unit suffix (e.g. 4h)"
    );
    assert_eq!(invalid.expected_type, Some(vec![FilterType::Duration]));
}

#[test]
fn date_key_with_text_value() {
    let invalid = invalid_of("timestamp:yesterday");
    assert!(invalid.reason.starts_with("Invalid date format."));
    assert_eq!(
        invalid.expected_type,
        Some(vec![FilterType::Date, FilterType::SpecificDate, FilterType::RelativeDate])
    );
}

#[test]
fn boolean_key_with_text_value() {
    let invalid = invalid_of("error.handled:maybe");
    assert_eq!(invalid.reason, "Invalid boolean. Expected true, 1, false, or 0.");
    assert_eq!(invalid.expected_type, Some(vec![FilterType::Boolean]));
}

#[test]
fn numeric_key_with_text_value() {
    let invalid = invalid_of("issue.id:abc");
    assert_eq!(
        invalid.reason,
        "Invalid number. Expected number then optional k, m, or b suffix (e.g. 500k)"
    );
    assert_eq!(invalid.expected_type, Some(vec![FilterType::Numeric, FilterType::NumericIn]));
}

#[test]
fn numeric_key_with_a_mixed_list() {
    // [1,a] cannot be a numeric list, so it lands as a text list with the
    // numeric repair hint.
    let invalid = invalid_of("issue.id:[1,a]");
    assert_eq!(invalid.expected_type, Some(vec![FilterType::Numeric, FilterType::NumericIn]));
    let filter = only_filter("issue.id:[1,a]");
    assert_eq!(filter.filter, FilterType::TextIn);
}

#[test]
fn numeric_list_on_a_non_numeric_key() {
    let filter = only_filter("quux:[1,2,3]");
    assert_eq!(filter.filter, FilterType::NumericIn);
    let invalid = filter.invalid.expect("non-numeric key should be flagged");
    assert_eq!(
        invalid.reason,
        "Invalid number. Expected number then optional k, m, or b suffix (e.g. 500k)"
    );
    assert_eq!(invalid.expected_type, Some(vec![FilterType::Numeric, FilterType::NumericIn]));
}

#[test]
fn numeric_list_on_a_key_of_another_type() {
    // The key's own type wins over the generic numeric hint.
    let invalid = invalid_of("transaction.duration:[1,2]");
    assert_eq!(invalid.expected_type, Some(vec![FilterType::Duration]));
}

#[test]
fn empty_slots_in_numeric_lists() {
    let filter = only_filter("issue.id:[1,,3]");
    assert_eq!(filter.filter, FilterType::NumericIn);
    let invalid = filter.invalid.expect("empty slot should be flagged");
    assert_eq!(invalid.reason, "Lists should not have empty values");
}

#[test]
fn explicit_tags_skip_type_hints() {
    let mut config = config();
    config.duration_keys.insert("duration".to_owned());
    let filter = only_filter_with(r#"tags[duration]:"hello""#, &config);
    assert_eq!(filter.invalid, None);
}

#[test]
fn empty_list_values() {
    let invalid = invalid_of("foo:[a,,b]");
    assert_eq!(invalid.reason, "Lists should not have empty values");
    let trailing = invalid_of("foo:[]");
    assert_eq!(trailing.reason, "Lists should not have empty values");
}

#[test]
fn negated_date_filters_fall_back_with_a_hint() {
    // Date filters cannot be negated, so the negation lands in the text
    // catch-all and the date hint explains the repair.
    let filter = only_filter("!timestamp:>2023-01-01");
    assert_eq!(filter.filter, FilterType::Text);
    assert!(filter.negated);
    let invalid = filter.invalid.expect("date hint expected");
    assert!(invalid.reason.starts_with("Invalid date format."));
}

#[test]
fn verdicts_do_not_fail_the_parse() {
    let terms = super::parse_terms("issue.id:abc browser.name:Chrome");
    assert_eq!(terms.len(), 3);
    let filters = crate::token::filters(&terms);
    assert!(filters[0].invalid.is_some());
    assert_eq!(filters[1].invalid, None);
}
