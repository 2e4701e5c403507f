//! Typed value payloads: numbers, booleans, durations, percentages, dates.

use chrono::{DateTime, Utc};

use super::only_filter;
use crate::filter::FilterType;
use crate::token::{DurationUnit, FilterValue, NumberUnit, RelativeDateUnit, Sign};

fn number_of(query: &str) -> (String, f64, NumberUnit) {
    let filter = only_filter(query);
    match filter.value {
        FilterValue::Number(n) => (n.value, n.raw_value, n.unit),
        other => panic!("expected a number for {query:?}, got {other:#?}"),
    }
}

#[test]
fn number_suffix_multipliers() {
    assert_eq!(number_of("issue.id:1k"), ("1".to_owned(), 1_000.0, NumberUnit::K));
    assert_eq!(number_of("issue.id:2.5m"), ("2.5".to_owned(), 2_500_000.0, NumberUnit::M));
    assert_eq!(number_of("issue.id:3b"), ("3".to_owned(), 3_000_000_000.0, NumberUnit::B));
    assert_eq!(number_of("issue.id:47"), ("47".to_owned(), 47.0, NumberUnit::None));
}

#[test]
fn signed_numbers() {
    assert_eq!(number_of("issue.id:-5").1, -5.0);
    assert_eq!(number_of("issue.id:+5").1, 5.0);
}

#[test]
fn dotted_runs_are_not_numbers() {
    let filter = only_filter("issue.id:1.2.3");
    assert_eq!(filter.filter, FilterType::Text);
}

fn boolean_of(query: &str) -> bool {
    let filter = only_filter(query);
    match filter.value {
        FilterValue::Boolean(b) => b.value,
        other => panic!("expected a boolean for {query:?}, got {other:#?}"),
    }
}

#[test]
fn boolean_spellings() {
    assert!(boolean_of("error.handled:1"));
    assert!(boolean_of("error.handled:true"));
    assert!(boolean_of("error.handled:TRUE"));
    assert!(!boolean_of("error.handled:0"));
    assert!(!boolean_of("error.handled:false"));
    assert!(!boolean_of("error.handled:False"));
}

fn duration_of(query: &str) -> (f64, DurationUnit) {
    let filter = only_filter(query);
    match filter.value {
        FilterValue::Duration(d) => (d.value, d.unit),
        other => panic!("expected a duration for {query:?}, got {other:#?}"),
    }
}

#[test]
fn duration_units() {
    assert_eq!(duration_of("transaction.duration:>500ms"), (500.0, DurationUnit::Ms));
    assert_eq!(duration_of("transaction.duration:90s"), (90.0, DurationUnit::S));
    assert_eq!(duration_of("transaction.duration:5min"), (5.0, DurationUnit::Min));
    assert_eq!(duration_of("transaction.duration:5m"), (5.0, DurationUnit::M));
    assert_eq!(duration_of("transaction.duration:2hr"), (2.0, DurationUnit::Hr));
    assert_eq!(duration_of("transaction.duration:2h"), (2.0, DurationUnit::H));
    assert_eq!(duration_of("transaction.duration:1day"), (1.0, DurationUnit::Day));
    assert_eq!(duration_of("transaction.duration:1d"), (1.0, DurationUnit::D));
    assert_eq!(duration_of("transaction.duration:1wk"), (1.0, DurationUnit::Wk));
    assert_eq!(duration_of("transaction.duration:1w"), (1.0, DurationUnit::W));
}

#[test]
fn duration_in_milliseconds() {
    let filter = only_filter("transaction.duration:<4h");
    match filter.value {
        FilterValue::Duration(d) => assert_eq!(d.in_milliseconds(), 14_400_000.0),
        other => panic!("expected a duration, got {other:#?}"),
    }
}

#[test]
fn measurement_keys_accept_durations() {
    let filter = only_filter("measurements.fcp:>3s");
    assert_eq!(filter.filter, FilterType::Duration);
    assert_eq!(filter.invalid, None);
}

#[test]
fn percentage_keeps_the_raw_figure() {
    let filter = only_filter("failure_rate():>50%");
    assert_eq!(filter.filter, FilterType::AggregatePercentage);
    match filter.value {
        // 50, never 0.5.
        FilterValue::Percentage(p) => assert_eq!(p.value, 50.0),
        other => panic!("expected a percentage, got {other:#?}"),
    }
}

fn date_of(query: &str) -> DateTime<Utc> {
    let filter = only_filter(query);
    match filter.value {
        FilterValue::Iso8601Date(d) => d.value,
        other => panic!("expected a date for {query:?}, got {other:#?}"),
    }
}

#[test]
fn iso_dates_normalize_to_utc() {
    let expected = DateTime::parse_from_rfc3339("2023-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(date_of("event.timestamp:>=2023-01-01T00:00:00Z"), expected);
    // A bare date is midnight UTC; an offset-less datetime is taken as UTC.
    assert_eq!(date_of("event.timestamp:2023-01-01"), expected);
    assert_eq!(date_of("event.timestamp:2023-01-01T00:00:00"), expected);
    // Offsets are applied.
    let offset = DateTime::parse_from_rfc3339("2023-01-01T12:00:00+02:00")
        .unwrap()
        .with_timezone(&Utc);
    assert_eq!(date_of("event.timestamp:>2023-01-01T12:00:00+02:00"), offset);
}

#[test]
fn relative_dates() {
    let past = only_filter("event.timestamp:-24h");
    match past.value {
        FilterValue::RelativeDate(rel) => {
            assert_eq!(rel.sign, Sign::Minus);
            assert_eq!(rel.value, 24);
            assert_eq!(rel.unit, RelativeDateUnit::H);
        }
        other => panic!("expected a relative date, got {other:#?}"),
    }

    let future = only_filter("event.timestamp:+1w");
    match future.value {
        FilterValue::RelativeDate(rel) => {
            assert_eq!(rel.sign, Sign::Plus);
            assert_eq!(rel.value, 1);
            assert_eq!(rel.unit, RelativeDateUnit::W);
        }
        other => panic!("expected a relative date, got {other:#?}"),
    }
}

#[test]
fn malformed_dates_fall_back_to_text() {
    // Shape matches, but chrono rejects month 13.
    let filter = only_filter("event.timestamp:2023-13-01");
    assert_eq!(filter.filter, FilterType::Text);
    assert!(filter.invalid.is_some());
}
