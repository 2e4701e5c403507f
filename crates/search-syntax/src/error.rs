//! Parse errors for the opt-in diagnostic API.
//!
//! The default [`parse`](crate::parse) swallows grammar errors and returns
//! `None` for compatibility with callers that only care whether the query
//! parsed. [`parse_diagnostics`](crate::parse_diagnostics) surfaces the
//! failure position instead; [`ParseError::render`] turns it into an
//! annotated snippet for terminals and logs.

use annotate_snippets::{Level, Renderer, Snippet};

/// A grammar-level parse failure with the byte offset where recognition
/// stopped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("parse error at offset {offset}: {message}")]
pub struct ParseError {
    pub offset: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(offset: usize, message: impl Into<String>) -> Self {
        Self { offset, message: message.into() }
    }

    /// Renders the error against its source query as an annotated snippet.
    pub fn render(&self, source: &str) -> String {
        let start = self.offset.min(source.len());
        // Zero-width spans render invisibly; widen to one character.
        let end = (start + 1).min(source.len()).max(start);
        let message = Level::Error.title(&self.message).snippet(
            Snippet::source(source)
                .line_start(1)
                .annotation(Level::Error.span(start..end)),
        );
        Renderer::plain().render(message).to_string()
    }
}
