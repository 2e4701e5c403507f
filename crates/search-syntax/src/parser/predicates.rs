//! Semantic predicates consulted during filter alternation.
//!
//! A predicate is a side-effect-free check run after a candidate variant's
//! key has parsed but before the variant is committed. Rejection is cheap
//! (the cursor resets and the next alternative runs), so a typed variant
//! whose key is not cataloged with the matching type simply falls through,
//! usually to the universal text catch-all.

use crate::config::{FieldKind, SearchConfig, ValueType};
use crate::filter::FilterType;
use crate::token::Key;

/// Whether `filter_type` is admissible for `key` given the catalog.
pub(super) fn predicate_filter(config: &SearchConfig, filter_type: FilterType, key: &Key) -> bool {
    match filter_type {
        FilterType::Numeric => config.is_numeric(key.name()),
        // A well-formed bracketed number list always commits as an
        // in-filter. Whether the key is numeric is judged after the parse,
        // so the filter keeps its list shape and carries a repair hint
        // instead of degrading to text.
        FilterType::NumericIn => true,
        FilterType::Duration => config.is_duration(key.name()),
        FilterType::Boolean => config.is_boolean(key.name()),
        FilterType::Date | FilterType::RelativeDate | FilterType::SpecificDate => {
            config.is_date(key.name())
        }
        FilterType::AggregateDuration => aggregate_produces_duration(config, key),
        FilterType::AggregateNumeric
        | FilterType::AggregateDate
        | FilterType::AggregatePercentage
        | FilterType::AggregateRelativeDate => matches!(key, Key::Aggregate(_)),
        // `is`/`has` are keyed on the literal key name in the grammar; text
        // is the universal catch-all.
        FilterType::Has | FilterType::Is | FilterType::Text | FilterType::TextIn => true,
    }
}

/// A duration-valued aggregate: the function name itself is cataloged as a
/// duration, or any of its arguments refers to a duration column.
fn aggregate_produces_duration(config: &SearchConfig, key: &Key) -> bool {
    let Key::Aggregate(aggregate) = key else {
        return false;
    };
    if config.is_duration(&aggregate.name.value) {
        return true;
    }
    aggregate
        .arg_values()
        .iter()
        .any(|arg| is_duration_column(config, arg))
}

fn is_duration_column(config: &SearchConfig, name: &str) -> bool {
    config.is_duration(name)
        || config
            .field_definition(name)
            .is_some_and(|def| def.value_type == ValueType::Duration)
}

/// Whether a text filter on `key` may carry a comparison operator. True for
/// keys cataloged with ordered text values and for function-shaped keys
/// (the aggregate-to-text fallback keeps its operator).
pub(super) fn predicate_text_operator(config: &SearchConfig, key: &Key) -> bool {
    config.allows_text_operators(key.name()) || is_function_key(config, key)
}

/// Function-shaped keys: a parsed aggregate, a simple key that still carries
/// call parens (the text fallback of a failed aggregate variant), or a bare
/// name cataloged as a function.
pub(crate) fn is_function_key(config: &SearchConfig, key: &Key) -> bool {
    match key {
        Key::Aggregate(_) => true,
        Key::ExplicitTag(_) => false,
        Key::Simple(k) => {
            k.value.contains('(')
                || config.aggregations.contains_key(&k.value)
                || config
                    .fields
                    .get(&k.value)
                    .is_some_and(|def| def.kind == FieldKind::Function)
        }
    }
}
