//! Post-parse filter validation.
//!
//! Runs once per committed filter, in priority order: value sanity, then
//! key-type misuse hints for the text catch-all, then aggregate coherence
//! and parameter checks, then list hygiene. The verdict is data on the
//! node: validation never fails a parse and each filter is judged
//! independently.

use crate::config::{
    AggregateDefinition, AggregateOutput, AggregateParameter, ColumnTypes, ParameterKind,
    SearchConfig, ValueType,
};
use crate::filter::FilterType;
use crate::parser::predicates::is_function_key;
use crate::token::{Filter, FilterValue, Invalid, Key, KeyAggregate, ListItem, ValueText};

const EMPTY_LIST_REASON: &str = "Lists should not have empty values";
const INVALID_NUMBER_REASON: &str =
    "Invalid number. Expected number then optional k, m, or b suffix (e.g. 500k)";

pub(crate) fn validate_filter(filter: &Filter, config: &SearchConfig) -> Option<Invalid> {
    match filter.filter {
        FilterType::Is | FilterType::Has => match &filter.value {
            FilterValue::Text(value) => text_value_sanity(value),
            _ => None,
        },
        FilterType::Text => {
            let FilterValue::Text(value) = &filter.value else {
                return None;
            };
            text_value_sanity(value).or_else(|| key_type_hint(filter, config))
        }
        FilterType::TextIn => {
            let FilterValue::TextList(list) = &filter.value else {
                return None;
            };
            empty_items(&list.items, |v: &ValueText| v.value.is_empty())
                .or_else(|| key_type_hint(filter, config))
        }
        FilterType::NumericIn => {
            let FilterValue::NumberList(list) = &filter.value else {
                return None;
            };
            empty_items(&list.items, |_| false)
                .or_else(|| numeric_list_key_check(filter, config))
        }
        FilterType::AggregateDuration
        | FilterType::AggregateNumeric
        | FilterType::AggregatePercentage
        | FilterType::AggregateDate
        | FilterType::AggregateRelativeDate => aggregate_checks(filter, config),
        _ => None,
    }
}

/// Unquoted values must be non-empty and must not smuggle bare quotes.
fn text_value_sanity(value: &ValueText) -> Option<Invalid> {
    if value.quoted {
        return None;
    }
    if contains_unescaped_quote(&value.value) {
        return Some(Invalid::reason("Quotes must enclose text or be escaped"));
    }
    if value.value.is_empty() {
        return Some(Invalid::reason("Filter must have a value"));
    }
    None
}

fn contains_unescaped_quote(value: &str) -> bool {
    let mut escaped = false;
    for c in value.chars() {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}

/// A filter that landed in the text catch-all but whose key is cataloged
/// with a concrete type gets a repair hint naming the filter types the
/// value should have been. Function keys fall through silently, and the
/// explicit-tag escape opts out of typing altogether.
fn key_type_hint(filter: &Filter, config: &SearchConfig) -> Option<Invalid> {
    let Key::Simple(key) = &filter.key else {
        return None;
    };
    if is_function_key(config, &filter.key) {
        return None;
    }
    let name = key.value.as_str();
    if config.is_duration(name) {
        Some(Invalid::expecting(
            "Invalid duration. Expected number followed by duration unit suffix (e.g. 4h)",
            vec![FilterType::Duration],
        ))
    } else if config.is_date(name) {
        Some(Invalid::expecting(
            "Invalid date format. Expected +/-duration (e.g. +1h) or ISO 8601-like (e.g. 2022-01-02 or 2022-01-02T01:00:00)",
            vec![FilterType::Date, FilterType::SpecificDate, FilterType::RelativeDate],
        ))
    } else if config.is_boolean(name) {
        Some(Invalid::expecting(
            "Invalid boolean. Expected true, 1, false, or 0.",
            vec![FilterType::Boolean],
        ))
    } else if config.is_numeric(name) {
        Some(Invalid::expecting(
            INVALID_NUMBER_REASON,
            vec![FilterType::Numeric, FilterType::NumericIn],
        ))
    } else {
        None
    }
}

/// A well-formed numeric list keeps its shape on any key; key typing is a
/// verdict, not a parse decision. Keys cataloged with another type explain
/// themselves through the usual key-type hints, anything else that is not
/// numeric gets the numeric repair hint, and function keys stay silent.
fn numeric_list_key_check(filter: &Filter, config: &SearchConfig) -> Option<Invalid> {
    if config.is_numeric(filter.key.name()) || is_function_key(config, &filter.key) {
        return None;
    }
    key_type_hint(filter, config).or_else(|| {
        Some(Invalid::expecting(
            INVALID_NUMBER_REASON,
            vec![FilterType::Numeric, FilterType::NumericIn],
        ))
    })
}

fn empty_items<T>(items: &[ListItem<T>], is_empty: impl Fn(&T) -> bool) -> Option<Invalid> {
    let any_empty = items
        .iter()
        .any(|item| item.value.as_ref().map_or(true, &is_empty));
    any_empty.then(|| Invalid::reason(EMPTY_LIST_REASON))
}

fn aggregate_checks(filter: &Filter, config: &SearchConfig) -> Option<Invalid> {
    let Key::Aggregate(key) = &filter.key else {
        return None;
    };
    let name = key.name.value.as_str();
    // Functions the catalog does not know about pass through unflagged; the
    // parser already constrained the value shape.
    let definition = config.aggregations.get(name)?;
    if let Some(invalid) = return_type_check(filter, key, name, definition, config) {
        return Some(invalid);
    }
    parameter_checks(key, name, definition, config)
}

/// The aggregate's return type must agree with the committed value family.
fn return_type_check(
    filter: &Filter,
    key: &KeyAggregate,
    name: &str,
    definition: &AggregateDefinition,
    config: &SearchConfig,
) -> Option<Invalid> {
    let output = match definition.output {
        AggregateOutput::Fixed(ty) => Some(ty),
        AggregateOutput::ColumnArg => key
            .arg_values()
            .first()
            .and_then(|arg| config.key_value_type(arg)),
    }?;
    let coherent = match filter.filter {
        FilterType::AggregateDuration => output == ValueType::Duration,
        FilterType::AggregatePercentage => output == ValueType::Percentage,
        FilterType::AggregateDate | FilterType::AggregateRelativeDate => output == ValueType::Date,
        FilterType::AggregateNumeric => output.is_numeric_like(),
        _ => true,
    };
    if coherent {
        return None;
    }
    Some(Invalid::reason(format!(
        "'{}' returns a {}; '{}' is not valid here.",
        name,
        output,
        filter.value.text()
    )))
}

/// Arity first, then per-parameter kind checks. First failure wins.
fn parameter_checks(
    key: &KeyAggregate,
    name: &str,
    definition: &AggregateDefinition,
    config: &SearchConfig,
) -> Option<Invalid> {
    let expected = &definition.parameters;
    let provided = key.arg_values();
    for index in 0..expected.len().max(provided.len()) {
        let position = index + 1;
        match (expected.get(index), provided.get(index)) {
            (None, Some(_)) => return Some(arity(name, expected.len())),
            (Some(param), None) => {
                if param.required {
                    return Some(arity(name, expected.len()));
                }
            }
            (Some(param), Some(arg)) => {
                if let Some(invalid) = parameter_check(name, position, param, arg, config) {
                    return Some(invalid);
                }
            }
            (None, None) => {}
        }
    }
    None
}

fn arity(name: &str, expected: usize) -> Invalid {
    Invalid::reason(format!("{} is expecting {} arguments.", name, expected))
}

fn parameter_check(
    name: &str,
    position: usize,
    param: &AggregateParameter,
    arg: &str,
    config: &SearchConfig,
) -> Option<Invalid> {
    match param.kind {
        ParameterKind::Column => match &param.column_types {
            Some(ColumnTypes::Checker(check)) => {
                let data_type = config.key_value_type(arg);
                if !check(arg, data_type) {
                    return Some(Invalid::reason(format!(
                        "Argument {} is an invalid column type.",
                        position
                    )));
                }
                None
            }
            Some(ColumnTypes::Types(types)) => match config.field_definition(arg) {
                None => Some(Invalid::reason(format!(
                    "{} expects argument {} to be a column.",
                    name, position
                ))),
                Some(def) if !types.contains(&def.value_type) => {
                    let allowed = types
                        .iter()
                        .map(|ty| ty.as_str())
                        .collect::<Vec<_>>()
                        .join(", ");
                    Some(Invalid::reason(format!(
                        "{} expects argument {} to be a column of type: {}.",
                        name, position, allowed
                    )))
                }
                Some(_) => None,
            },
            None => None,
        },
        ParameterKind::Dropdown => {
            if param.options.iter().any(|option| option == arg) {
                return None;
            }
            let options = param
                .options
                .iter()
                .map(|option| format!("'{}'", option))
                .collect::<Vec<_>>()
                .join(", ");
            Some(Invalid::reason(format!(
                "{} expects argument {} to be one of: {}",
                name, position, options
            )))
        }
        ParameterKind::Value => {
            let data_type = param.data_type?;
            let inferred = if leading_float(arg).is_some() {
                ValueType::Number
            } else {
                ValueType::String
            };
            let matches = match data_type {
                ty if ty.is_numeric_like() => inferred == ValueType::Number,
                ValueType::String => inferred == ValueType::String,
                // Duration/date/percentage value parameters are carried as
                // written; the executing layer interprets them.
                _ => true,
            };
            if matches {
                return None;
            }
            Some(Invalid::reason(format!(
                "{} expects argument {} to be of type {}",
                name, position, data_type
            )))
        }
    }
}

/// Prefix float parse with the lenient semantics of a string-to-number
/// coercion: `300ms` infers as a number, `abc` does not.
fn leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut seen_digits = end > int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            seen_digits = true;
            end = frac_end;
        } else if seen_digits {
            end += 1;
        }
    }
    if !seen_digits {
        return None;
    }
    s[..end].parse().ok()
}
