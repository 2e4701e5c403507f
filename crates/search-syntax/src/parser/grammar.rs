//! Grammar productions.
//!
//! Top level is `term (space term)*`. A term is tried as a group, a logical
//! operator, a filter, and finally free text, the catch-all that makes any
//! non-whitespace run parse. Filters themselves are an ordered alternation
//! over the sixteen variants: aggregates before simple keys, in-lists
//! before scalars, typed value forms before generic text. Each variant's
//! shape (admissible keys, operators, negation) comes from the static
//! filter-type table, and a semantic predicate rejects typed variants whose
//! key is not cataloged with the matching type.

use super::core::Parser;
use super::predicates;
use crate::error::ParseError;
use crate::filter::{FilterType, ALL_OPERATORS};
use crate::token::{
    BooleanOp, Filter, FilterValue, FreeText, Key, KeySimple, LogicBoolean, LogicGroup, Operator,
    Spaces, Term,
};
use crate::validate;

/// Alternation order. Earlier variants win; `Text` never fails on a
/// key-colon shape, so anything that parses at all yields a filter.
const FILTER_TRY_ORDER: [FilterType; 16] = [
    FilterType::AggregateDuration,
    FilterType::AggregatePercentage,
    FilterType::AggregateNumeric,
    FilterType::AggregateDate,
    FilterType::AggregateRelativeDate,
    FilterType::Date,
    FilterType::SpecificDate,
    FilterType::RelativeDate,
    FilterType::Duration,
    FilterType::Boolean,
    FilterType::NumericIn,
    FilterType::Numeric,
    FilterType::Has,
    FilterType::Is,
    FilterType::TextIn,
    FilterType::Text,
];

impl<'a> Parser<'a> {
    pub(super) fn run(&mut self) -> Result<Vec<Term>, ParseError> {
        match self.parse_query() {
            Some(terms) => Ok(terms),
            None => Err(self.take_error("could not parse query")),
        }
    }

    fn parse_query(&mut self) -> Option<Vec<Term>> {
        let terms = self.parse_terms(false)?;
        if !self.at_eof() {
            self.record_error("unexpected trailing input");
            return None;
        }
        Some(terms)
    }

    fn parse_terms(&mut self, in_group: bool) -> Option<Vec<Term>> {
        let mut terms = Vec::new();
        loop {
            if self.at_eof() {
                break;
            }
            if in_group && self.peek() == Some(')') {
                break;
            }
            if let Some(spaces) = self.spaces() {
                terms.push(Term::Spaces(spaces));
                continue;
            }
            terms.push(self.parse_term(in_group)?);
        }
        Some(terms)
    }

    fn spaces(&mut self) -> Option<Spaces> {
        let start = self.mark();
        let run = self.take_while(|c| c.is_ascii_whitespace());
        if run.is_empty() {
            return None;
        }
        Some(Spaces { text: run.to_owned(), span: self.span_from(start) })
    }

    fn parse_term(&mut self, in_group: bool) -> Option<Term> {
        if self.peek() == Some('(') {
            let mark = self.mark();
            if let Some(group) = self.logic_group() {
                return Some(Term::LogicGroup(group));
            }
            self.reset(mark);
        }
        if self.config.allow_boolean {
            let mark = self.mark();
            if let Some(boolean) = self.logic_boolean() {
                return Some(Term::LogicBoolean(boolean));
            }
            self.reset(mark);
        }
        let mark = self.mark();
        if let Some(filter) = self.parse_filter() {
            return Some(Term::Filter(filter));
        }
        self.reset(mark);
        self.free_text(in_group).map(Term::FreeText)
    }

    fn logic_group(&mut self) -> Option<LogicGroup> {
        if !self.enter_recursion() {
            return None;
        }
        let group = self.logic_group_inner();
        self.exit_recursion();
        group
    }

    fn logic_group_inner(&mut self) -> Option<LogicGroup> {
        let start = self.mark();
        if !self.eat('(') {
            return None;
        }
        let terms = self.parse_terms(true)?;
        if !self.eat(')') {
            return None;
        }
        Some(LogicGroup {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            terms,
        })
    }

    /// `AND`/`OR`, case-insensitive, standing alone as a word.
    fn logic_boolean(&mut self) -> Option<LogicBoolean> {
        let start = self.mark();
        let run = self.take_while(|c| c.is_ascii_alphabetic());
        let op = if run.eq_ignore_ascii_case("and") {
            BooleanOp::And
        } else if run.eq_ignore_ascii_case("or") {
            BooleanOp::Or
        } else {
            return None;
        };
        match self.peek() {
            None => {}
            Some(c) if c.is_ascii_whitespace() => {}
            Some('(') | Some(')') => {}
            _ => return None,
        }
        Some(LogicBoolean {
            text: run.to_owned(),
            span: self.span_from(start),
            op,
        })
    }

    /// The catch-all term: a terminated quoted string or a bare run. A run
    /// stops at `"`: a quote must open a terminated string or the parse
    /// fails. Inside a group the run also stops at parens so the delimiter
    /// stays visible to the enclosing production; at top level parens are
    /// ordinary text (a failed group falls back here).
    fn free_text(&mut self, in_group: bool) -> Option<FreeText> {
        let start = self.mark();
        if self.peek() == Some('"') {
            let value = self.scan_quoted()?;
            return Some(FreeText {
                text: self.slice(start).to_owned(),
                span: self.span_from(start),
                value,
                quoted: true,
            });
        }
        let run = self.take_while(|c| {
            !c.is_ascii_whitespace() && c != '"' && !(in_group && matches!(c, '(' | ')'))
        });
        if run.is_empty() {
            self.record_error("expected a search term");
            return None;
        }
        Some(FreeText {
            text: run.to_owned(),
            span: self.span_from(start),
            value: run.to_owned(),
            quoted: false,
        })
    }

    fn parse_filter(&mut self) -> Option<Filter> {
        for filter_type in FILTER_TRY_ORDER {
            let mark = self.mark();
            if let Some(filter) = self.try_filter_variant(filter_type) {
                return Some(filter);
            }
            self.reset(mark);
        }
        None
    }

    fn try_filter_variant(&mut self, filter_type: FilterType) -> Option<Filter> {
        let start = self.mark();
        let config = filter_type.config();
        let negated = config.can_negate && self.eat('!');
        let key = self.parse_filter_key(filter_type)?;
        if !self.eat(':') {
            return None;
        }
        if !predicates::predicate_filter(self.config, filter_type, &key) {
            return None;
        }
        let operator = self.parse_filter_operator(filter_type, &key);
        // A date filter is the with-operator form; the bare one is SpecificDate.
        if filter_type == FilterType::Date && operator == Operator::Default {
            return None;
        }
        let value = self.parse_filter_value(filter_type)?;
        let mut filter = Filter {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            filter: filter_type,
            key,
            value,
            operator,
            negated,
            invalid: None,
        };
        filter.invalid = validate::validate_filter(&filter, self.config);
        Some(filter)
    }

    fn parse_filter_key(&mut self, filter_type: FilterType) -> Option<Key> {
        match filter_type {
            FilterType::AggregateDuration
            | FilterType::AggregateNumeric
            | FilterType::AggregatePercentage
            | FilterType::AggregateDate
            | FilterType::AggregateRelativeDate => self.key_aggregate().map(Key::Aggregate),
            FilterType::Has => {
                let key = self.key_simple()?;
                (key.value == "has").then(|| Key::Simple(key))
            }
            FilterType::Is => {
                let key = self.key_simple()?;
                (key.value == "is").then(|| Key::Simple(key))
            }
            FilterType::Text | FilterType::TextIn => {
                let mark = self.mark();
                if let Some(tag) = self.key_explicit_tag() {
                    return Some(Key::ExplicitTag(tag));
                }
                self.reset(mark);
                if filter_type == FilterType::Text {
                    // Aggregate-to-text fallback: keep the whole call text
                    // as a simple key so `count():>notanumber` still filters.
                    if let Some(aggregate) = self.key_aggregate() {
                        let text = aggregate.text.clone();
                        return Some(Key::Simple(KeySimple {
                            text: text.clone(),
                            span: aggregate.span,
                            value: text,
                            quoted: false,
                        }));
                    }
                    self.reset(mark);
                }
                self.key_simple().map(Key::Simple)
            }
            _ => self.key_simple().map(Key::Simple),
        }
    }

    fn parse_filter_operator(&mut self, filter_type: FilterType, key: &Key) -> Operator {
        if filter_type != FilterType::Text {
            return self.scan_operator(filter_type.config().valid_ops);
        }
        // Text filters scan the full operator set, then give the characters
        // back unless the key admits ordered comparison.
        let mark = self.mark();
        let operator = self.scan_operator(ALL_OPERATORS);
        let gated = operator.is_comparison() || operator == Operator::Eq;
        if gated && !predicates::predicate_text_operator(self.config, key) {
            self.reset(mark);
            return Operator::Default;
        }
        operator
    }

    fn scan_operator(&mut self, ops: &[Operator]) -> Operator {
        const TOKENS: [(&str, Operator); 6] = [
            (">=", Operator::GtEq),
            ("<=", Operator::LtEq),
            ("!=", Operator::NotEq),
            (">", Operator::Gt),
            ("<", Operator::Lt),
            ("=", Operator::Eq),
        ];
        for (token, op) in TOKENS {
            if ops.contains(&op) && self.eat_str(token) {
                return op;
            }
        }
        Operator::Default
    }

    fn parse_filter_value(&mut self, filter_type: FilterType) -> Option<FilterValue> {
        match filter_type {
            FilterType::Date | FilterType::SpecificDate | FilterType::AggregateDate => {
                self.value_iso_date().map(FilterValue::Iso8601Date)
            }
            FilterType::RelativeDate | FilterType::AggregateRelativeDate => {
                self.value_relative_date().map(FilterValue::RelativeDate)
            }
            FilterType::Duration | FilterType::AggregateDuration => {
                self.value_duration().map(FilterValue::Duration)
            }
            FilterType::AggregatePercentage => self.value_percentage().map(FilterValue::Percentage),
            FilterType::Numeric | FilterType::AggregateNumeric => {
                self.value_number().map(FilterValue::Number)
            }
            FilterType::NumericIn => self.value_number_list().map(FilterValue::NumberList),
            FilterType::Boolean => self.value_boolean().map(FilterValue::Boolean),
            FilterType::TextIn => self.value_text_list().map(FilterValue::TextList),
            FilterType::Text | FilterType::Is | FilterType::Has => {
                self.value_text().map(FilterValue::Text)
            }
        }
    }
}
