//! Filter types and the static filter-type configuration table.
//!
//! One table drives everything: which key and value shapes a filter type
//! accepts, which operators it admits, and whether it can be negated. The
//! grammar consults it when selecting a variant during alternation and the
//! validator consults it when checking a committed filter's shape, so the
//! two can never disagree.

use serde::Serialize;

use crate::token::{Filter, FilterValue, Key, Operator};

/// Discriminator of the filter union. Exactly sixteen variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FilterType {
    Text,
    TextIn,
    Date,
    SpecificDate,
    RelativeDate,
    Duration,
    Numeric,
    NumericIn,
    Boolean,
    AggregateDuration,
    AggregateNumeric,
    AggregatePercentage,
    AggregateDate,
    AggregateRelativeDate,
    Has,
    Is,
}

/// Key shape discriminant, used by the shape table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyKind {
    Simple,
    ExplicitTag,
    Aggregate,
}

impl KeyKind {
    pub fn of(key: &Key) -> KeyKind {
        match key {
            Key::Simple(_) => KeyKind::Simple,
            Key::ExplicitTag(_) => KeyKind::ExplicitTag,
            Key::Aggregate(_) => KeyKind::Aggregate,
        }
    }
}

/// Value shape discriminant, used by the shape table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    TextList,
    Number,
    NumberList,
    Boolean,
    Duration,
    Percentage,
    Iso8601Date,
    RelativeDate,
}

impl ValueKind {
    pub fn of(value: &FilterValue) -> ValueKind {
        match value {
            FilterValue::Text(_) => ValueKind::Text,
            FilterValue::TextList(_) => ValueKind::TextList,
            FilterValue::Number(_) => ValueKind::Number,
            FilterValue::NumberList(_) => ValueKind::NumberList,
            FilterValue::Boolean(_) => ValueKind::Boolean,
            FilterValue::Duration(_) => ValueKind::Duration,
            FilterValue::Percentage(_) => ValueKind::Percentage,
            FilterValue::Iso8601Date(_) => ValueKind::Iso8601Date,
            FilterValue::RelativeDate(_) => ValueKind::RelativeDate,
        }
    }
}

/// One row of the filter-type table.
#[derive(Debug, Clone, Copy)]
pub struct FilterTypeConfig {
    pub valid_keys: &'static [KeyKind],
    pub valid_ops: &'static [Operator],
    pub valid_values: &'static [ValueKind],
    pub can_negate: bool,
    /// Filter types whose operator sets merge with this one when computing
    /// admissible operators for a key (operator pickers union across these).
    pub interchangeable: &'static [FilterType],
}

impl FilterTypeConfig {
    /// Shape check for a committed filter: key kind, value kind, operator
    /// and negation all listed in this row.
    pub fn admits(&self, filter: &Filter) -> bool {
        self.valid_keys.contains(&KeyKind::of(&filter.key))
            && self.valid_values.contains(&ValueKind::of(&filter.value))
            && (filter.operator == Operator::Default || self.valid_ops.contains(&filter.operator))
            && (!filter.negated || self.can_negate)
    }
}

pub const ALL_OPERATORS: &[Operator] = &[
    Operator::Default,
    Operator::Eq,
    Operator::NotEq,
    Operator::Gt,
    Operator::GtEq,
    Operator::Lt,
    Operator::LtEq,
];

const EQUALITY_OPERATORS: &[Operator] = &[Operator::Default, Operator::NotEq];
const NO_OPERATORS: &[Operator] = &[Operator::Default];

const SIMPLE_KEY: &[KeyKind] = &[KeyKind::Simple];
const TEXT_KEYS: &[KeyKind] = &[KeyKind::Simple, KeyKind::ExplicitTag];
const AGGREGATE_KEY: &[KeyKind] = &[KeyKind::Aggregate];

static TEXT: FilterTypeConfig = FilterTypeConfig {
    valid_keys: TEXT_KEYS,
    valid_ops: EQUALITY_OPERATORS,
    valid_values: &[ValueKind::Text],
    can_negate: true,
    interchangeable: &[],
};

static TEXT_IN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: TEXT_KEYS,
    valid_ops: NO_OPERATORS,
    valid_values: &[ValueKind::TextList],
    can_negate: true,
    interchangeable: &[],
};

static DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Iso8601Date],
    can_negate: false,
    interchangeable: &[FilterType::SpecificDate],
};

static SPECIFIC_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: NO_OPERATORS,
    valid_values: &[ValueKind::Iso8601Date],
    can_negate: false,
    interchangeable: &[FilterType::Date],
};

static RELATIVE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: NO_OPERATORS,
    valid_values: &[ValueKind::RelativeDate],
    can_negate: false,
    interchangeable: &[],
};

static DURATION: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Duration],
    can_negate: true,
    interchangeable: &[],
};

static NUMERIC: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Number],
    can_negate: true,
    interchangeable: &[],
};

static NUMERIC_IN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: NO_OPERATORS,
    valid_values: &[ValueKind::NumberList],
    can_negate: true,
    interchangeable: &[],
};

static BOOLEAN: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: EQUALITY_OPERATORS,
    valid_values: &[ValueKind::Boolean],
    can_negate: true,
    interchangeable: &[],
};

static AGGREGATE_DURATION: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Duration],
    can_negate: true,
    interchangeable: &[],
};

static AGGREGATE_NUMERIC: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Number],
    can_negate: true,
    interchangeable: &[],
};

static AGGREGATE_PERCENTAGE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Percentage],
    can_negate: true,
    interchangeable: &[],
};

static AGGREGATE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::Iso8601Date],
    can_negate: true,
    interchangeable: &[],
};

static AGGREGATE_RELATIVE_DATE: FilterTypeConfig = FilterTypeConfig {
    valid_keys: AGGREGATE_KEY,
    valid_ops: ALL_OPERATORS,
    valid_values: &[ValueKind::RelativeDate],
    can_negate: true,
    interchangeable: &[],
};

static HAS: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: EQUALITY_OPERATORS,
    valid_values: &[ValueKind::Text],
    can_negate: true,
    interchangeable: &[],
};

static IS: FilterTypeConfig = FilterTypeConfig {
    valid_keys: SIMPLE_KEY,
    valid_ops: EQUALITY_OPERATORS,
    valid_values: &[ValueKind::Text],
    can_negate: true,
    interchangeable: &[],
};

impl FilterType {
    pub const ALL: [FilterType; 16] = [
        FilterType::Text,
        FilterType::TextIn,
        FilterType::Date,
        FilterType::SpecificDate,
        FilterType::RelativeDate,
        FilterType::Duration,
        FilterType::Numeric,
        FilterType::NumericIn,
        FilterType::Boolean,
        FilterType::AggregateDuration,
        FilterType::AggregateNumeric,
        FilterType::AggregatePercentage,
        FilterType::AggregateDate,
        FilterType::AggregateRelativeDate,
        FilterType::Has,
        FilterType::Is,
    ];

    pub fn config(self) -> &'static FilterTypeConfig {
        match self {
            FilterType::Text => &TEXT,
            FilterType::TextIn => &TEXT_IN,
            FilterType::Date => &DATE,
            FilterType::SpecificDate => &SPECIFIC_DATE,
            FilterType::RelativeDate => &RELATIVE_DATE,
            FilterType::Duration => &DURATION,
            FilterType::Numeric => &NUMERIC,
            FilterType::NumericIn => &NUMERIC_IN,
            FilterType::Boolean => &BOOLEAN,
            FilterType::AggregateDuration => &AGGREGATE_DURATION,
            FilterType::AggregateNumeric => &AGGREGATE_NUMERIC,
            FilterType::AggregatePercentage => &AGGREGATE_PERCENTAGE,
            FilterType::AggregateDate => &AGGREGATE_DATE,
            FilterType::AggregateRelativeDate => &AGGREGATE_RELATIVE_DATE,
            FilterType::Has => &HAS,
            FilterType::Is => &IS,
        }
    }

    pub fn can_negate(self) -> bool {
        self.config().can_negate
    }

    pub fn interchangeable(self) -> &'static [FilterType] {
        self.config().interchangeable
    }

    /// Operators a picker should offer for this filter type: the union of
    /// `valid_ops` across this type and its interchangeable types, in table
    /// order, deduplicated.
    pub fn admissible_operators(self) -> Vec<Operator> {
        let mut out: Vec<Operator> = Vec::new();
        let mut push_all = |ops: &[Operator]| {
            for op in ops {
                if !out.contains(op) {
                    out.push(*op);
                }
            }
        };
        push_all(self.config().valid_ops);
        for other in self.interchangeable() {
            push_all(other.config().valid_ops);
        }
        out
    }
}
