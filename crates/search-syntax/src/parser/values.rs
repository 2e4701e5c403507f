//! Scanners for keys and typed values.
//!
//! Each scanner is a total attempt: it either returns a fully-built node or
//! leaves a recognizable failure for the caller to backtrack over. Typed
//! value scanners insist on a value boundary (whitespace, EOF, or a
//! structural delimiter) after the token, so `1.0.0` never half-matches as
//! the number `1.0`: the variant fails and the text alternative takes the
//! whole run instead.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use super::core::Parser;
use crate::token::{
    AggregateArg, AggregateArgs, AggregateParam, DurationUnit, KeyAggregate, KeyExplicitTag,
    KeySimple, ListItem, NumberUnit, RelativeDateUnit, Sign, ValueBoolean, ValueDuration,
    ValueIso8601Date, ValueNumber, ValueNumberList, ValuePercentage, ValueRelativeDate, ValueText,
    ValueTextList,
};

/// Duration unit spellings, longest first so `ms`/`min` win over `m`.
const DURATION_UNITS: &[(&str, DurationUnit)] = &[
    ("ms", DurationUnit::Ms),
    ("min", DurationUnit::Min),
    ("wk", DurationUnit::Wk),
    ("day", DurationUnit::Day),
    ("hr", DurationUnit::Hr),
    ("s", DurationUnit::S),
    ("m", DurationUnit::M),
    ("h", DurationUnit::H),
    ("d", DurationUnit::D),
    ("w", DurationUnit::W),
];

impl<'a> Parser<'a> {
    /// Quoted string starting at the cursor. Backslash escapes `"` and `\`;
    /// any other backslash is literal. Resets and records an error when the
    /// closing quote is missing.
    pub(super) fn scan_quoted(&mut self) -> Option<String> {
        let mark = self.mark();
        if !self.eat('"') {
            return None;
        }
        let mut value = String::new();
        while let Some(c) = self.bump() {
            match c {
                '"' => return Some(value),
                '\\' => match self.peek() {
                    Some('"') => {
                        value.push('"');
                        self.bump();
                    }
                    Some('\\') => {
                        value.push('\\');
                        self.bump();
                    }
                    _ => value.push('\\'),
                },
                _ => value.push(c),
            }
        }
        self.reset(mark);
        self.record_error("unterminated quoted string");
        None
    }

    pub(super) fn key_simple(&mut self) -> Option<KeySimple> {
        let start = self.mark();
        if self.peek() == Some('"') {
            let value = self.scan_quoted()?;
            return Some(KeySimple {
                text: self.slice(start).to_owned(),
                span: self.span_from(start),
                value,
                quoted: true,
            });
        }
        match self.peek() {
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
            _ => return None,
        }
        let run = self.take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
        Some(KeySimple {
            text: run.to_owned(),
            span: self.span_from(start),
            value: run.to_owned(),
            quoted: false,
        })
    }

    /// `tags[name]`. The caller backtracks on `None`.
    pub(super) fn key_explicit_tag(&mut self) -> Option<KeyExplicitTag> {
        let start = self.mark();
        if !self.eat_str("tags[") {
            return None;
        }
        let key = self.key_simple()?;
        if !self.eat(']') {
            return None;
        }
        Some(KeyExplicitTag {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            prefix: "tags".to_owned(),
            key,
        })
    }

    /// `fn(arg, ...)`, with interior whitespace preserved verbatim.
    pub(super) fn key_aggregate(&mut self) -> Option<KeyAggregate> {
        let start = self.mark();
        let name = self.key_simple()?;
        if !self.eat('(') {
            return None;
        }
        let space_before = self.take_while(|c| c.is_ascii_whitespace()).to_owned();
        let args = self.aggregate_args();
        let space_after = self.take_while(|c| c.is_ascii_whitespace()).to_owned();
        if !self.eat(')') {
            return None;
        }
        Some(KeyAggregate {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            name,
            args,
            space_before,
            space_after,
        })
    }

    fn aggregate_args(&mut self) -> Option<AggregateArgs> {
        let start = self.mark();
        let first = self.aggregate_param()?;
        let mut args = vec![AggregateArg { separator: String::new(), value: first }];
        loop {
            let sep_start = self.mark();
            self.take_while(|c| c.is_ascii_whitespace());
            if !self.eat(',') {
                self.reset(sep_start);
                break;
            }
            self.take_while(|c| c.is_ascii_whitespace());
            let separator = self.slice(sep_start).to_owned();
            match self.aggregate_param() {
                Some(param) => args.push(AggregateArg { separator, value: param }),
                None => {
                    self.reset(sep_start);
                    break;
                }
            }
        }
        Some(AggregateArgs {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            args,
        })
    }

    fn aggregate_param(&mut self) -> Option<AggregateParam> {
        let start = self.mark();
        if self.peek() == Some('"') {
            let value = self.scan_quoted()?;
            return Some(AggregateParam {
                text: self.slice(start).to_owned(),
                span: self.span_from(start),
                value,
                quoted: true,
            });
        }
        let run = self.take_while(|c| {
            !c.is_ascii_whitespace() && !matches!(c, ',' | '(' | ')' | '[' | ']' | '"')
        });
        if run.is_empty() {
            return None;
        }
        Some(AggregateParam {
            text: run.to_owned(),
            span: self.span_from(start),
            value: run.to_owned(),
            quoted: false,
        })
    }

    /// `Sign? Digits ("." Digits)? ("k"|"m"|"b")?` ending at a boundary.
    pub(super) fn value_number(&mut self) -> Option<ValueNumber> {
        let start = self.mark();
        if !self.eat('-') {
            self.eat('+');
        }
        if !self.scan_decimal() {
            return None;
        }
        let numeric_end = self.pos;
        let unit = if self.eat('k') {
            NumberUnit::K
        } else if self.eat('m') {
            NumberUnit::M
        } else if self.eat('b') {
            NumberUnit::B
        } else {
            NumberUnit::None
        };
        if !self.at_value_boundary() {
            return None;
        }
        let value = self.src[start..numeric_end].to_owned();
        let parsed: f64 = value.parse().ok()?;
        Some(ValueNumber {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            value,
            raw_value: parsed * unit.multiplier(),
            unit,
        })
    }

    pub(super) fn value_duration(&mut self) -> Option<ValueDuration> {
        let start = self.mark();
        if !self.scan_decimal() {
            return None;
        }
        let value: f64 = self.slice(start).parse().ok()?;
        let unit = DURATION_UNITS
            .iter()
            .find(|(tok, _)| self.eat_str(tok))
            .map(|(_, unit)| *unit)?;
        if !self.at_value_boundary() {
            return None;
        }
        Some(ValueDuration {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            value,
            unit,
        })
    }

    pub(super) fn value_percentage(&mut self) -> Option<ValuePercentage> {
        let start = self.mark();
        if !self.scan_decimal() {
            return None;
        }
        let value: f64 = self.slice(start).parse().ok()?;
        if !self.eat('%') {
            return None;
        }
        if !self.at_value_boundary() {
            return None;
        }
        Some(ValuePercentage {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            value,
        })
    }

    pub(super) fn value_boolean(&mut self) -> Option<ValueBoolean> {
        let start = self.mark();
        let run = self.take_while(|c| c.is_ascii_alphanumeric());
        let value = match run.to_ascii_lowercase().as_str() {
            "1" | "true" => true,
            "0" | "false" => false,
            _ => return None,
        };
        if !self.at_value_boundary() {
            return None;
        }
        Some(ValueBoolean {
            text: run.to_owned(),
            span: self.span_from(start),
            value,
        })
    }

    /// `YYYY-MM-DD`, optionally `THH:MM[:SS[.f]]` and `Z`/`±HH[:MM]`.
    /// Shape-scanned here, then handed to chrono for real validation.
    pub(super) fn value_iso_date(&mut self) -> Option<ValueIso8601Date> {
        let start = self.mark();
        if !self.scan_digits(4) || !self.eat('-') {
            return None;
        }
        if !self.scan_digits(2) || !self.eat('-') {
            return None;
        }
        if !self.scan_digits(2) {
            return None;
        }
        if self.eat('T') {
            if !self.scan_digits(2) || !self.eat(':') || !self.scan_digits(2) {
                return None;
            }
            if self.eat(':') {
                if !self.scan_digits(2) {
                    return None;
                }
                if self.eat('.') && self.take_while(|c| c.is_ascii_digit()).is_empty() {
                    return None;
                }
            }
            if !self.eat('Z') && matches!(self.peek(), Some('+') | Some('-')) {
                self.bump();
                if !self.scan_digits(2) {
                    return None;
                }
                if self.eat(':') && !self.scan_digits(2) {
                    return None;
                }
            }
        }
        if !self.at_value_boundary() {
            return None;
        }
        let text = self.slice(start);
        let value = parse_datetime(text)?;
        Some(ValueIso8601Date {
            text: text.to_owned(),
            span: self.span_from(start),
            value,
        })
    }

    /// `+`/`-`, digits, one of `w d h m`.
    pub(super) fn value_relative_date(&mut self) -> Option<ValueRelativeDate> {
        let start = self.mark();
        let sign = if self.eat('-') {
            Sign::Minus
        } else if self.eat('+') {
            Sign::Plus
        } else {
            return None;
        };
        let digits = self.take_while(|c| c.is_ascii_digit());
        if digits.is_empty() {
            return None;
        }
        let value: u64 = digits.parse().ok()?;
        let unit = match self.peek() {
            Some('w') => RelativeDateUnit::W,
            Some('d') => RelativeDateUnit::D,
            Some('h') => RelativeDateUnit::H,
            Some('m') => RelativeDateUnit::M,
            _ => return None,
        };
        self.bump();
        if !self.at_value_boundary() {
            return None;
        }
        Some(ValueRelativeDate {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            value,
            sign,
            unit,
        })
    }

    /// Scalar text value: a terminated quoted string, or a run up to
    /// whitespace or a paren. The run may be empty (`key:` with no value;
    /// the validator flags it) and may contain interior quotes (flagged
    /// too). A run never *starts* with `"`; that position must be a valid
    /// quoted string or the whole parse fails.
    pub(super) fn value_text(&mut self) -> Option<ValueText> {
        let start = self.mark();
        if self.peek() == Some('"') {
            let value = self.scan_quoted()?;
            return Some(ValueText {
                text: self.slice(start).to_owned(),
                span: self.span_from(start),
                value,
                quoted: true,
            });
        }
        let run = self.take_while(|c| !c.is_ascii_whitespace() && !matches!(c, '(' | ')'));
        Some(ValueText {
            text: run.to_owned(),
            span: self.span_from(start),
            value: run.to_owned(),
            quoted: false,
        })
    }

    fn value_text_list_item(&mut self) -> Option<ValueText> {
        let start = self.mark();
        if self.peek() == Some('"') {
            let value = self.scan_quoted()?;
            return Some(ValueText {
                text: self.slice(start).to_owned(),
                span: self.span_from(start),
                value,
                quoted: true,
            });
        }
        let run = self.take_while(|c| {
            !c.is_ascii_whitespace() && !matches!(c, ',' | ']' | '(' | ')')
        });
        if run.is_empty() {
            return None;
        }
        Some(ValueText {
            text: run.to_owned(),
            span: self.span_from(start),
            value: run.to_owned(),
            quoted: false,
        })
    }

    /// `[a, b, c]` of text items. Empty slots are kept (`value: None`) for
    /// the validator to flag.
    pub(super) fn value_text_list(&mut self) -> Option<ValueTextList> {
        let start = self.mark();
        if !self.eat('[') {
            return None;
        }
        let mut items = vec![ListItem { separator: String::new(), value: self.value_text_list_item() }];
        loop {
            let sep_start = self.mark();
            self.take_while(|c| c.is_ascii_whitespace());
            if !self.eat(',') {
                self.reset(sep_start);
                break;
            }
            self.take_while(|c| c.is_ascii_whitespace());
            let separator = self.slice(sep_start).to_owned();
            items.push(ListItem { separator, value: self.value_text_list_item() });
        }
        self.take_while(|c| c.is_ascii_whitespace());
        if !self.eat(']') {
            return None;
        }
        if !self.at_value_boundary() {
            return None;
        }
        Some(ValueTextList {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            items,
        })
    }

    /// One slot of a numeric list: `None` for an empty slot, preserved for
    /// the validator exactly like the text list's. A non-empty slot that
    /// does not scan as a number fails the whole list so the input falls
    /// through to the text alternatives.
    fn value_number_list_item(&mut self) -> Option<Option<ValueNumber>> {
        if matches!(self.peek(), Some(',') | Some(']')) {
            return Some(None);
        }
        self.value_number().map(Some)
    }

    /// `[1, 2, 3]` of numbers, empty slots kept as `None` items.
    pub(super) fn value_number_list(&mut self) -> Option<ValueNumberList> {
        let start = self.mark();
        if !self.eat('[') {
            return None;
        }
        let mut items =
            vec![ListItem { separator: String::new(), value: self.value_number_list_item()? }];
        loop {
            let sep_start = self.mark();
            self.take_while(|c| c.is_ascii_whitespace());
            if !self.eat(',') {
                self.reset(sep_start);
                break;
            }
            self.take_while(|c| c.is_ascii_whitespace());
            let separator = self.slice(sep_start).to_owned();
            items.push(ListItem { separator, value: self.value_number_list_item()? });
        }
        self.take_while(|c| c.is_ascii_whitespace());
        if !self.eat(']') {
            return None;
        }
        if !self.at_value_boundary() {
            return None;
        }
        Some(ValueNumberList {
            text: self.slice(start).to_owned(),
            span: self.span_from(start),
            items,
        })
    }

    /// Digits with an optional fractional part. At least one integer digit.
    fn scan_decimal(&mut self) -> bool {
        if self.take_while(|c| c.is_ascii_digit()).is_empty() {
            return false;
        }
        let mark = self.mark();
        if self.eat('.') && self.take_while(|c| c.is_ascii_digit()).is_empty() {
            self.reset(mark);
        }
        true
    }

    fn scan_digits(&mut self, n: usize) -> bool {
        for _ in 0..n {
            match self.peek() {
                Some(c) if c.is_ascii_digit() => {
                    self.bump();
                }
                _ => return false,
            }
        }
        true
    }
}

fn parse_datetime(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M") {
        return Some(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    None
}
