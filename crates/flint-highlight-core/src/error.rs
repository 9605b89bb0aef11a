//! Recoverable scan diagnostics.
//!
//! Highlighting never fails: every problem the tokenizer runs into is
//! recovered locally and reported here so callers can surface it.

use thiserror::Error;

use crate::span::Span;

/// Diagnostic categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A mode hit its illegal matcher and was abandoned.
    MalformedMode,
    /// A string or comment reached end of input without its closing delimiter.
    Unterminated,
    /// Nesting exceeded the configured maximum depth; open modes were force-closed.
    NestingLimit,
    /// `</` outside a string or comment.
    SuspectMarkup,
}

impl DiagnosticKind {
    /// Stable lowercase name, used by the CLI and bindings.
    pub const fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::MalformedMode => "malformed_mode",
            DiagnosticKind::Unterminated => "unterminated",
            DiagnosticKind::NestingLimit => "nesting_limit",
            DiagnosticKind::SuspectMarkup => "suspect_markup",
        }
    }
}

/// A diagnostic with its location in the source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at bytes {span}")]
pub struct Diagnostic {
    /// Human-readable description.
    pub message: String,
    /// Source location the diagnostic refers to.
    pub span: Span,
    /// Diagnostic categorization.
    pub kind: DiagnosticKind,
}

impl Diagnostic {
    /// Create a new diagnostic.
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
            kind,
        }
    }

    /// A mode abandoned because of an illegal lexeme.
    pub fn malformed_mode(mode: &str, span: Span) -> Self {
        Self::new(
            DiagnosticKind::MalformedMode,
            format!("malformed {}", mode),
            span,
        )
    }

    /// A construct left open at end of input.
    pub fn unterminated(mode: &str, span: Span) -> Self {
        Self::new(
            DiagnosticKind::Unterminated,
            format!("unterminated {}", mode),
            span,
        )
    }

    /// Nesting depth exceeded.
    pub fn nesting_limit(max_depth: usize, span: Span) -> Self {
        Self::new(
            DiagnosticKind::NestingLimit,
            format!("nesting deeper than {} modes", max_depth),
            span,
        )
    }

    /// Markup-like `</` sequence outside strings and comments.
    pub fn suspect_markup(span: Span) -> Self {
        Self::new(
            DiagnosticKind::SuspectMarkup,
            "markup-like `</` outside string or comment",
            span,
        )
    }
}

/// Diagnostics collected during one scan.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a diagnostic.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.items.push(diagnostic);
    }

    /// Check if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of diagnostics.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Iterate over the diagnostics in report order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Count diagnostics of one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Check whether any diagnostic of `kind` was reported.
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.items.iter().any(|d| d.kind == kind)
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
