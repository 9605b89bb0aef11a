//! Token and scope types produced by the highlighter.
//!
//! The output of a scan is designed to be:
//!
//! - **Zero-copy**: token text borrows directly from the input
//! - **Lossless**: concatenating token text reproduces the input exactly
//! - **Flat plus tree**: tokens are a flat, non-overlapping stream; scopes
//!   record the nesting of the modes that produced them

use std::fmt;

use crate::span::Span;

/// Classification of a highlighted span.
///
/// Each kind maps to a stable class name taken from the highlight.js
/// vocabulary, so existing stylesheets keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TokenKind {
    /// Text no rule claimed.
    Plain,
    /// Reserved word.
    Keyword,
    /// Literal constant: `true`, `none`, `MAX_SIZE`.
    Literal,
    /// Built-in type name such as `i32` or `f64x4`.
    BuiltIn,
    /// Capitalized identifier used as a type reference.
    Type,
    /// Operator or arrow.
    Operator,
    /// Numeric literal.
    Number,
    /// String or character literal.
    String,
    /// Substitution block inside an interpolated string.
    Subst,
    /// Line or block comment.
    Comment,
    /// `'name` symbol literal.
    Symbol,
    /// Function header or called function name.
    Function,
    /// Name declared by a function or type header.
    Title,
    /// Type/entity declaration header.
    ClassHeader,
    /// Text of a header abandoned as malformed.
    Error,
    /// Markup-like sequence flagged by the injection heuristic.
    Illegal,
}

impl TokenKind {
    /// Every kind, in declaration order.
    pub const ALL: [TokenKind; 16] = [
        TokenKind::Plain,
        TokenKind::Keyword,
        TokenKind::Literal,
        TokenKind::BuiltIn,
        TokenKind::Type,
        TokenKind::Operator,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::Subst,
        TokenKind::Comment,
        TokenKind::Symbol,
        TokenKind::Function,
        TokenKind::Title,
        TokenKind::ClassHeader,
        TokenKind::Error,
        TokenKind::Illegal,
    ];

    /// Class name used by renderers (`hljs-<name>`).
    pub const fn class_name(self) -> &'static str {
        match self {
            TokenKind::Plain => "plain",
            TokenKind::Keyword => "keyword",
            TokenKind::Literal => "literal",
            TokenKind::BuiltIn => "built_in",
            TokenKind::Type => "type",
            TokenKind::Operator => "operator",
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Subst => "subst",
            TokenKind::Comment => "comment",
            TokenKind::Symbol => "symbol",
            TokenKind::Function => "function",
            TokenKind::Title => "title",
            TokenKind::ClassHeader => "class",
            TokenKind::Error => "error",
            TokenKind::Illegal => "illegal",
        }
    }

    /// Whether a renderer should leave this kind unstyled.
    #[inline]
    pub const fn is_plain(self) -> bool {
        matches!(self, TokenKind::Plain)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class_name())
    }
}

/// A classified, non-overlapping span of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Classification.
    pub kind: TokenKind,
    /// Byte range in the input.
    pub span: Span,
    /// The covered text, borrowed from the input.
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// Create a token.
    #[inline]
    pub const fn new(kind: TokenKind, span: Span, text: &'a str) -> Self {
        Self { kind, span, text }
    }
}

/// The extent of one closed mode.
///
/// Scopes are listed in the order they were opened, so a parent always
/// precedes its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    /// Kind of the mode.
    pub kind: TokenKind,
    /// Byte range from the mode's start text to its end (or end of input).
    pub span: Span,
}
