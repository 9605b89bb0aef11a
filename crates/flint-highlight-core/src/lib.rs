//! # Flint Highlight Core
//!
//! A syntax-highlighting tokenizer for the Flint programming language.
//!
//! The highlighter classifies source text into a flat stream of tokens that
//! covers the input exactly, plus the list of modes (comments, strings,
//! declaration headers, ...) that produced them. It never fails: malformed
//! input is recovered locally and reported as diagnostics.
//!
//! ## Quick Start
//!
//! ```rust
//! use flint_highlight_core::{highlight, TokenKind};
//!
//! let result = highlight("def main():\n    print($\"1 + 1 = {1 + 1}\")");
//!
//! for token in &result.tokens {
//!     println!("{:>10} {:?}", token.kind, token.text);
//! }
//! assert_eq!(result.reconstruct(), "def main():\n    print($\"1 + 1 = {1 + 1}\")");
//! assert!(result.tokens_of(TokenKind::Subst).count() >= 2);
//! ```
//!
//! ## Error Recovery
//!
//! ```rust
//! use flint_highlight_core::{highlight, DiagnosticKind, TokenKind};
//!
//! let result = highlight("\"never closed");
//!
//! // The string is force-closed at end of input.
//! assert_eq!(result.tokens.len(), 1);
//! assert_eq!(result.tokens[0].kind, TokenKind::String);
//! assert!(result.diagnostics.has(DiagnosticKind::Unterminated));
//! ```
//!
//! ## Languages
//!
//! Highlighters are selected by language id or alias through the registry:
//!
//! ```rust
//! use flint_highlight_core::Highlighter;
//!
//! let highlighter = Highlighter::for_name("ft").unwrap().with_max_depth(32);
//! assert_eq!(highlighter.language().name, "Flint");
//! ```

pub mod error;
pub mod flint;
pub mod grammar;
pub mod highlighter;
pub mod registry;
pub mod scan;
pub mod span;
pub mod token;

pub use error::{Diagnostic, DiagnosticKind, Diagnostics};
pub use highlighter::{
    highlight, HighlightOptions, HighlightResult, Highlighter, DEFAULT_MAX_DEPTH,
};
pub use registry::{find_language, find_language_by_extension, languages, Language};
pub use span::Span;
pub use token::{Scope, Token, TokenKind};
