//! Scannerless PEG-style parser for the search-query language.
//!
//! # Architecture
//!
//! ```text
//! Source text → grammar (ordered alternation + backtracking)
//!                  │  semantic predicates consult the field catalog
//!                  ▼
//!            typed AST nodes (text + span captured per production)
//!                  │
//!                  ▼
//!            validator stamps `invalid` verdicts on filters
//! ```
//!
//! - [`core`]: byte cursor, mark/reset backtracking, span capture.
//! - [`values`]: scanners for keys and typed values. Each insists on a
//!   value boundary so partial matches fall through to the text catch-all.
//! - [`grammar`]: term and filter productions, variant order, operator
//!   scanning.
//! - [`predicates`]: catalog-driven admissibility checks run before a
//!   filter variant commits.
//!
//! # Failure model
//!
//! The grammar never panics and the default entry point never errors: a
//! query either parses (possibly with invalid-annotated filters) or `parse`
//! returns `None`. [`parse_diagnostics`] exposes the first failure position
//! for tooling that wants to point at the problem.

mod core;
mod grammar;
pub(crate) mod predicates;
mod values;

#[cfg(test)]
mod tests;

use crate::config::SearchConfig;
use crate::error::ParseError;
use crate::token::Term;

use self::core::Parser;

/// Parses `query` against `config`.
///
/// Returns `None` on grammar-level failure. A successful parse may contain
/// filters annotated as invalid; that is not a parse failure. The empty
/// query parses to an empty AST.
pub fn parse(query: &str, config: &SearchConfig) -> Option<Vec<Term>> {
    Parser::new(query, config).run().ok()
}

/// Like [`parse`], but reports where recognition stopped instead of
/// swallowing the failure.
pub fn parse_diagnostics(query: &str, config: &SearchConfig) -> Result<Vec<Term>, ParseError> {
    Parser::new(query, config).run()
}
