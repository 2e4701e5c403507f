//! Structured parser for observability search-query strings.
//!
//! Accepts a free-form query like
//! `is:unresolved browser.name:"Chrome 33.0" count():>50 event.timestamp:-24h`
//! and produces a typed AST in which every node carries its exact source
//! text, its byte span, and, for filters, a structured validation
//! verdict. Parsing is steered by a supplied field catalog
//! ([`SearchConfig`]): the same token is a duration filter, a numeric
//! filter, or plain text depending on how the key is cataloged.
//!
//! The parser is a pure function. It executes nothing, infers no schema,
//! and rewrites nothing; consumers walk the returned terms.
//!
//! ```
//! use search_syntax::{join, parse, SearchConfig};
//!
//! let config = SearchConfig::default();
//! let query = r#"is:unresolved browser.name:"Chrome 89.0""#;
//! let ast = parse(query, &config).unwrap();
//! assert_eq!(join(&ast), query);
//! ```
//!
//! Grammar failures return `None`; [`parse_diagnostics`] surfaces the
//! failure position instead. Semantic problems never fail a parse: they
//! are recorded on the offending [`Filter`](token::Filter) as an
//! [`Invalid`](token::Invalid) verdict with a reason and, where a repair is
//! known, the expected filter types.

pub mod config;
pub mod error;
pub mod filter;
mod parser;
pub mod token;
mod validate;

#[cfg(test)]
mod token_tests;

pub use config::{
    AggregateDefinition, AggregateOutput, AggregateParameter, ColumnTypes, FieldDefinition,
    FieldKind, ParameterKind, SearchConfig, ValueType,
};
pub use error::ParseError;
pub use filter::{FilterType, FilterTypeConfig, KeyKind, ValueKind};
pub use parser::{parse, parse_diagnostics};
pub use token::{filters, join, join_with, Filter, FilterValue, Invalid, Key, Operator, Term};
