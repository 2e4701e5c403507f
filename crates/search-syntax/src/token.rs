//! Typed AST nodes produced by the parser.
//!
//! Every node carries the exact source substring it spans (`text`) and its
//! byte range in the input (`span`). Concatenating the `text` of the
//! top-level terms in order reconstructs the input; [`join`] relies on
//! this, and nothing in the crate mutates a node after construction.
//!
//! Semantic problems are data, not errors: a [`Filter`] that parsed but
//! failed validation carries an [`Invalid`] verdict with a human-readable
//! reason and, where a repair is known, the filter types the value was
//! expected to be.

use chrono::{DateTime, Utc};
use serde::Serialize;
use text_size::TextRange;

use crate::filter::FilterType;

/// One top-level element of a parsed query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Term {
    LogicBoolean(LogicBoolean),
    LogicGroup(LogicGroup),
    Filter(Filter),
    FreeText(FreeText),
    Spaces(Spaces),
}

impl Term {
    pub fn text(&self) -> &str {
        match self {
            Term::LogicBoolean(t) => &t.text,
            Term::LogicGroup(t) => &t.text,
            Term::Filter(t) => &t.text,
            Term::FreeText(t) => &t.text,
            Term::Spaces(t) => &t.text,
        }
    }

    pub fn span(&self) -> TextRange {
        match self {
            Term::LogicBoolean(t) => t.span,
            Term::LogicGroup(t) => t.span,
            Term::Filter(t) => t.span,
            Term::FreeText(t) => t.span,
            Term::Spaces(t) => t.span,
        }
    }
}

/// `AND` / `OR`, recognized only when the catalog allows boolean logic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicBoolean {
    pub text: String,
    pub span: TextRange,
    pub op: BooleanOp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BooleanOp {
    And,
    Or,
}

/// Parenthesized group of terms. Groups nest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogicGroup {
    pub text: String,
    pub span: TextRange,
    pub terms: Vec<Term>,
}

/// A term that is not a filter, operator, group, or whitespace.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreeText {
    pub text: String,
    pub span: TextRange,
    pub value: String,
    pub quoted: bool,
}

/// A run of ASCII whitespace between terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Spaces {
    pub text: String,
    pub span: TextRange,
}

/// A `key:value` search filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Filter {
    pub text: String,
    pub span: TextRange,
    pub filter: FilterType,
    pub key: Key,
    pub value: FilterValue,
    pub operator: Operator,
    pub negated: bool,
    /// `None` when the filter passed every semantic check.
    pub invalid: Option<Invalid>,
}

/// Structured validation verdict attached to a filter that parsed but is
/// semantically wrong.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Invalid {
    pub reason: String,
    /// Repair hint: the filter types the value would have to be for the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_type: Option<Vec<FilterType>>,
}

impl Invalid {
    pub fn reason(reason: impl Into<String>) -> Self {
        Self { reason: reason.into(), expected_type: None }
    }

    pub fn expecting(reason: impl Into<String>, expected: Vec<FilterType>) -> Self {
        Self { reason: reason.into(), expected_type: Some(expected) }
    }
}

/// Comparison operator of a filter. `Default` is the empty operator: the
/// source had no operator character and equality is implied. It is distinct
/// from an explicit `=` and both survive [`join`] unchanged because node
/// text is preserved verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    #[serde(rename = "")]
    Default,
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    GtEq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    LtEq,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Default => "",
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::Gt => ">",
            Operator::GtEq => ">=",
            Operator::Lt => "<",
            Operator::LtEq => "<=",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, Operator::Gt | Operator::GtEq | Operator::Lt | Operator::LtEq)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Key {
    Simple(KeySimple),
    ExplicitTag(KeyExplicitTag),
    Aggregate(KeyAggregate),
}

impl Key {
    pub fn text(&self) -> &str {
        match self {
            Key::Simple(k) => &k.text,
            Key::ExplicitTag(k) => &k.text,
            Key::Aggregate(k) => &k.text,
        }
    }

    /// Normalized key name: quotes stripped, `tags[x]` reduced to `x`,
    /// aggregates reduced to the function name.
    pub fn name(&self) -> &str {
        match self {
            Key::Simple(k) => &k.value,
            Key::ExplicitTag(k) => &k.key.value,
            Key::Aggregate(k) => &k.name.value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeySimple {
    pub text: String,
    pub span: TextRange,
    pub value: String,
    pub quoted: bool,
}

/// The `tags[name]` escape, forcing text-filter interpretation regardless
/// of the underlying catalog type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyExplicitTag {
    pub text: String,
    pub span: TextRange,
    pub prefix: String,
    pub key: KeySimple,
}

/// Aggregate key: `fn(arg, ...)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyAggregate {
    pub text: String,
    pub span: TextRange,
    pub name: KeySimple,
    pub args: Option<AggregateArgs>,
    /// Whitespace between `(` and the first argument, preserved verbatim.
    pub space_before: String,
    /// Whitespace between the last argument and `)`.
    pub space_after: String,
}

impl KeyAggregate {
    /// Argument values in order, quoting stripped.
    pub fn arg_values(&self) -> Vec<&str> {
        self.args
            .as_ref()
            .map(|args| args.args.iter().map(|a| a.value.value.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateArgs {
    pub text: String,
    pub span: TextRange,
    pub args: Vec<AggregateArg>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateArg {
    /// Raw separator text preceding this argument (empty for the first).
    pub separator: String,
    pub value: AggregateParam,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateParam {
    pub text: String,
    pub span: TextRange,
    pub value: String,
    pub quoted: bool,
}

/// Value side of a filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum FilterValue {
    Text(ValueText),
    TextList(ValueTextList),
    Number(ValueNumber),
    NumberList(ValueNumberList),
    Boolean(ValueBoolean),
    Duration(ValueDuration),
    Percentage(ValuePercentage),
    Iso8601Date(ValueIso8601Date),
    RelativeDate(ValueRelativeDate),
}

impl FilterValue {
    pub fn text(&self) -> &str {
        match self {
            FilterValue::Text(v) => &v.text,
            FilterValue::TextList(v) => &v.text,
            FilterValue::Number(v) => &v.text,
            FilterValue::NumberList(v) => &v.text,
            FilterValue::Boolean(v) => &v.text,
            FilterValue::Duration(v) => &v.text,
            FilterValue::Percentage(v) => &v.text,
            FilterValue::Iso8601Date(v) => &v.text,
            FilterValue::RelativeDate(v) => &v.text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueText {
    pub text: String,
    pub span: TextRange,
    pub value: String,
    pub quoted: bool,
}

/// One entry of an in-list. `value` is `None` for an empty slot (`[a,,b]`),
/// which the validator flags.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListItem<T> {
    /// Raw separator text preceding this item (empty for the first).
    pub separator: String,
    pub value: Option<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueTextList {
    pub text: String,
    pub span: TextRange,
    pub items: Vec<ListItem<ValueText>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueNumberList {
    pub text: String,
    pub span: TextRange,
    pub items: Vec<ListItem<ValueNumber>>,
}

/// Multiplier suffix on a number: `500k`, `2.5m`, `3b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberUnit {
    #[serde(rename = "")]
    None,
    #[serde(rename = "k")]
    K,
    #[serde(rename = "m")]
    M,
    #[serde(rename = "b")]
    B,
}

impl NumberUnit {
    pub fn multiplier(self) -> f64 {
        match self {
            NumberUnit::None => 1.0,
            NumberUnit::K => 1e3,
            NumberUnit::M => 1e6,
            NumberUnit::B => 1e9,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NumberUnit::None => "",
            NumberUnit::K => "k",
            NumberUnit::M => "m",
            NumberUnit::B => "b",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueNumber {
    pub text: String,
    pub span: TextRange,
    /// Numeric portion of the source, without the multiplier suffix.
    pub value: String,
    /// Parsed value with the multiplier applied.
    pub raw_value: f64,
    pub unit: NumberUnit,
}

/// `true` iff the raw token, lowercased, was `1` or `true`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueBoolean {
    pub text: String,
    pub span: TextRange,
    pub value: bool,
}

/// Duration unit suffix, stored as spelled in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    Ms,
    S,
    Min,
    M,
    Hr,
    H,
    Day,
    D,
    Wk,
    W,
}

impl DurationUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Ms => "ms",
            DurationUnit::S => "s",
            DurationUnit::Min => "min",
            DurationUnit::M => "m",
            DurationUnit::Hr => "hr",
            DurationUnit::H => "h",
            DurationUnit::Day => "day",
            DurationUnit::D => "d",
            DurationUnit::Wk => "wk",
            DurationUnit::W => "w",
        }
    }

    fn millis_factor(self) -> f64 {
        match self {
            DurationUnit::Ms => 1.0,
            DurationUnit::S => 1e3,
            DurationUnit::Min | DurationUnit::M => 60e3,
            DurationUnit::Hr | DurationUnit::H => 3_600e3,
            DurationUnit::Day | DurationUnit::D => 86_400e3,
            DurationUnit::Wk | DurationUnit::W => 604_800e3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueDuration {
    pub text: String,
    pub span: TextRange,
    pub value: f64,
    pub unit: DurationUnit,
}

impl ValueDuration {
    pub fn in_milliseconds(&self) -> f64 {
        self.value * self.unit.millis_factor()
    }
}

/// Percentage value. `50%` stores `50.0`; the source convention is the raw
/// figure, never the fraction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePercentage {
    pub text: String,
    pub span: TextRange,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueIso8601Date {
    pub text: String,
    pub span: TextRange,
    pub value: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sign {
    #[serde(rename = "+")]
    Plus,
    #[serde(rename = "-")]
    Minus,
}

impl Sign {
    pub fn as_str(self) -> &'static str {
        match self {
            Sign::Plus => "+",
            Sign::Minus => "-",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeDateUnit {
    W,
    D,
    H,
    M,
}

impl RelativeDateUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            RelativeDateUnit::W => "w",
            RelativeDateUnit::D => "d",
            RelativeDateUnit::H => "h",
            RelativeDateUnit::M => "m",
        }
    }
}

/// Relative date: `-24h`, `+7d`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRelativeDate {
    pub text: String,
    pub span: TextRange,
    pub value: u64,
    pub sign: Sign,
    pub unit: RelativeDateUnit,
}

/// Reassembles a query from its AST. With default flags this is the exact
/// inverse of a successful parse.
pub fn join(terms: &[Term]) -> String {
    join_with(terms, false, false)
}

/// [`join`] with layout flags: `leading_space` prepends a single space when
/// the result is non-empty, `space_between` inserts a space between
/// top-level terms.
pub fn join_with(terms: &[Term], leading_space: bool, space_between: bool) -> String {
    let mut out = String::new();
    for (i, term) in terms.iter().enumerate() {
        if i > 0 && space_between {
            out.push(' ');
        }
        out.push_str(term.text());
    }
    if leading_space && !out.is_empty() {
        out.insert(0, ' ');
    }
    out
}

/// All filters in the AST, in source order, descending into groups.
pub fn filters(terms: &[Term]) -> Vec<&Filter> {
    let mut out = Vec::new();
    collect_filters(terms, &mut out);
    out
}

fn collect_filters<'a>(terms: &'a [Term], out: &mut Vec<&'a Filter>) {
    for term in terms {
        match term {
            Term::Filter(f) => out.push(f),
            Term::LogicGroup(g) => collect_filters(&g.terms, out),
            _ => {}
        }
    }
}
