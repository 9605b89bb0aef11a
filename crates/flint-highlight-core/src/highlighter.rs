//! Mode-stack tokenizer.
//!
//! Scans the input once, left to right. At each position the active mode
//! (top of an explicit frame stack) gets to end first, then to reject the
//! position as illegal, then its nested rules are tried in priority order.
//! Anything unclaimed becomes content of the active mode.
//!
//! Tokens borrow from the input and are coalesced as they are emitted, so
//! a nested block comment comes out as one comment token while the scope
//! list still records both comment modes.

use memchr::{memchr, memchr2, memchr3};
use tracing::{debug, trace};

use crate::error::{Diagnostic, Diagnostics};
use crate::grammar::{Grammar, Head, Hit, Rule, RuleId, Scan};
use crate::registry::{find_language, Language, FLINT};
use crate::scan;
use crate::span::Span;
use crate::token::{Scope, Token, TokenKind};

/// Default cap on simultaneously open modes, root included.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Root plus one mode is the shallowest stack that can make progress.
const MIN_DEPTH: usize = 2;

/// Per-highlighter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    /// Maximum number of open modes, root included. Never below 2.
    pub max_depth: usize,
    /// Flag `</` outside strings and comments as [`TokenKind::Illegal`].
    pub flag_markup: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            flag_markup: true,
        }
    }
}

/// Output of one highlight pass.
#[derive(Debug)]
pub struct HighlightResult<'a> {
    /// Language the input was highlighted as.
    pub language: &'static Language,
    /// Non-overlapping tokens covering the whole input, in order.
    pub tokens: Vec<Token<'a>>,
    /// Closed modes, in the order they were opened.
    pub scopes: Vec<Scope>,
    /// Recovered problems.
    pub diagnostics: Diagnostics,
}

impl<'a> HighlightResult<'a> {
    /// Check if the scan completed without diagnostics.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Find the token covering a byte offset.
    pub fn token_at(&self, offset: u32) -> Option<&Token<'a>> {
        self.tokens
            .binary_search_by(|t| {
                if t.span.end <= offset {
                    std::cmp::Ordering::Less
                } else if t.span.start > offset {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            })
            .ok()
            .map(|i| &self.tokens[i])
    }

    /// Iterate over tokens of one kind.
    pub fn tokens_of(&self, kind: TokenKind) -> impl Iterator<Item = &Token<'a>> {
        self.tokens.iter().filter(move |t| t.kind == kind)
    }

    /// Rebuild the source text from the tokens.
    pub fn reconstruct(&self) -> String {
        let mut out = String::with_capacity(self.tokens.last().map_or(0, |t| t.span.end as usize));
        for token in &self.tokens {
            out.push_str(token.text);
        }
        out
    }
}

/// A configured highlighter for one language.
///
/// Cheap to copy; the grammar it uses is shared and immutable, so one
/// highlighter can serve any number of threads.
///
/// # Example
///
/// ```rust
/// use flint_highlight_core::{Highlighter, TokenKind};
///
/// let result = Highlighter::default().highlight("def add(a: i32)");
/// let title = result.tokens_of(TokenKind::Title).next().unwrap();
/// assert_eq!(title.text, "add");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Highlighter {
    language: &'static Language,
    options: HighlightOptions,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(&FLINT)
    }
}

impl Highlighter {
    /// Create a highlighter with default options.
    #[inline]
    pub fn new(language: &'static Language) -> Self {
        Self {
            language,
            options: HighlightOptions::default(),
        }
    }

    /// Create a highlighter for a registered language id or alias.
    pub fn for_name(name: &str) -> Option<Self> {
        find_language(name).map(Self::new)
    }

    /// Replace all options at once.
    pub fn with_options(mut self, options: HighlightOptions) -> Self {
        self.options = HighlightOptions {
            max_depth: options.max_depth.max(MIN_DEPTH),
            ..options
        };
        self
    }

    /// Set the maximum nesting depth (clamped to at least 2).
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.options.max_depth = max_depth.max(MIN_DEPTH);
        self
    }

    /// Enable or disable the `</` markup heuristic.
    pub fn with_markup_check(mut self, enabled: bool) -> Self {
        self.options.flag_markup = enabled;
        self
    }

    #[inline]
    pub fn language(&self) -> &'static Language {
        self.language
    }

    #[inline]
    pub fn options(&self) -> HighlightOptions {
        self.options
    }

    /// Tokenize `input`. Never fails.
    pub fn highlight<'a>(&self, input: &'a str) -> HighlightResult<'a> {
        let mut scanner = Scanner::new(self.language.grammar(), self.options, input);
        scanner.run();

        trace!(
            language = self.language.id,
            bytes = input.len(),
            tokens = scanner.tokens.len(),
            scopes = scanner.scopes.len(),
            diagnostics = scanner.diagnostics.len(),
            "highlighted"
        );

        HighlightResult {
            language: self.language,
            tokens: scanner.tokens,
            scopes: scanner.scopes,
            diagnostics: scanner.diagnostics,
        }
    }
}

/// Highlight Flint source with default options.
#[inline]
pub fn highlight(input: &str) -> HighlightResult<'_> {
    Highlighter::default().highlight(input)
}

/// Owner id that never matches, used after tokens are rewound.
const NO_OWNER: u32 = u32::MAX;

#[derive(Debug, Clone, Copy)]
struct Frame {
    rule: RuleId,
    start: usize,
    /// Segments only coalesce with the previous token when they share an
    /// owner. A mode nested in a parent of the same kind inherits the
    /// parent's owner.
    owner: u32,
    /// Slot in `scopes`; `None` for the root.
    scope: Option<usize>,
    hashes: u16,
}

struct Scanner<'a> {
    grammar: &'static Grammar,
    options: HighlightOptions,
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    stack: Vec<Frame>,
    tokens: Vec<Token<'a>>,
    scopes: Vec<Scope>,
    diagnostics: Diagnostics,
    last_owner: u32,
    next_owner: u32,
}

impl<'a> Scanner<'a> {
    fn new(grammar: &'static Grammar, options: HighlightOptions, input: &'a str) -> Self {
        let mut stack = Vec::with_capacity(options.max_depth.min(16));
        stack.push(Frame {
            rule: grammar.root(),
            start: 0,
            owner: 0,
            scope: None,
            hashes: 0,
        });
        Self {
            grammar,
            options,
            input,
            bytes: input.as_bytes(),
            pos: 0,
            stack,
            // Roughly one token per five bytes of typical source.
            tokens: Vec::with_capacity(input.len() / 5 + 1),
            scopes: Vec::new(),
            diagnostics: Diagnostics::new(),
            last_owner: NO_OWNER,
            next_owner: 1,
        }
    }

    #[inline(always)]
    fn top(&self) -> Frame {
        // The root frame is only removed by `finish`, after the loop.
        self.stack[self.stack.len() - 1]
    }

    #[inline(always)]
    fn fresh_owner(&mut self) -> u32 {
        let owner = self.next_owner;
        self.next_owner = self.next_owner.wrapping_add(1) % NO_OWNER;
        owner
    }

    fn run(&mut self) {
        let grammar = self.grammar;

        while self.pos < self.bytes.len() {
            let frame = self.top();
            let rule = grammar.rule(frame.rule);

            if let Some(end) = rule.end {
                if let Some(hit) = end.find(self.bytes, self.pos, frame.hashes) {
                    self.close(hit.end, rule.exclude_end);
                    continue;
                }
            }

            if let Some(illegal) = rule.illegal {
                if let Some(hit) = illegal.find(self.bytes, self.pos, frame.hashes) {
                    if self.stack.len() > 1 {
                        self.abandon();
                        continue;
                    }
                    if self.options.flag_markup {
                        self.flag_markup(hit.end);
                        continue;
                    }
                }
            }

            if self.try_nested(rule) {
                continue;
            }

            self.skip_content(rule);
        }

        self.finish();
    }

    /// Try the active mode's nested rules in declaration order.
    fn try_nested(&mut self, rule: &'static Rule) -> bool {
        let grammar = self.grammar;
        for &id in &rule.contains {
            let child = grammar.rule(id);
            if let Some(hit) = child.start.find(self.bytes, self.pos, 0) {
                if child.is_mode() {
                    self.open(id, child, hit);
                } else {
                    self.emit_leaf(child, hit);
                }
                return true;
            }
        }
        false
    }

    fn head_kind(&self, rule: &Rule, start: usize, end: usize) -> TokenKind {
        match rule.head {
            Head::Rule => rule.kind,
            Head::Kind(kind) => kind,
            Head::Lookup { table, fallback } => table
                .classify(&self.input[start..end])
                .unwrap_or(fallback),
        }
    }

    fn emit_leaf(&mut self, rule: &Rule, hit: Hit) {
        let start = self.pos;
        let head = self.head_kind(rule, start, hit.head_end);
        self.emit(head, start, hit.head_end);
        self.emit(rule.kind, hit.head_end, hit.end);
        self.pos = hit.end;
    }

    fn open(&mut self, id: RuleId, rule: &Rule, hit: Hit) {
        if self.stack.len() >= self.options.max_depth {
            self.unwind_to_root();
            return;
        }

        let parent_kind = self.grammar.rule(self.top().rule).kind;
        let owner = if rule.kind == parent_kind {
            self.top().owner
        } else {
            self.fresh_owner()
        };

        let start = self.pos;
        let scope = self.scopes.len();
        self.scopes.push(Scope {
            kind: rule.kind,
            span: Span::from_range(start, start),
        });

        let head = self.head_kind(rule, start, hit.head_end);
        let head_owner = if head == rule.kind {
            owner
        } else {
            self.fresh_owner()
        };
        self.push_token(head, start, hit.head_end, head_owner);
        self.push_token(rule.kind, hit.head_end, hit.end, owner);

        self.stack.push(Frame {
            rule: id,
            start,
            owner,
            scope: Some(scope),
            hashes: hit.hashes,
        });
        self.pos = hit.end;
    }

    fn close(&mut self, end: usize, exclude_end: bool) {
        debug_assert!(self.stack.len() > 1, "root mode has no end");
        let Some(frame) = self.stack.pop() else {
            return;
        };
        if !exclude_end {
            let kind = self.grammar.rule(frame.rule).kind;
            self.push_token(kind, self.pos, end, frame.owner);
            self.pos = end;
        }
        if let Some(slot) = frame.scope {
            self.scopes[slot].span.end = self.pos as u32;
        }
    }

    /// Drop the active mode, turning everything it emitted into one error
    /// token. The parent resumes at the same position.
    fn abandon(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };
        let rule = self.grammar.rule(frame.rule);
        let input = self.input;

        while self
            .tokens
            .last()
            .is_some_and(|t| t.span.start as usize >= frame.start)
        {
            self.tokens.pop();
        }
        if let Some(last) = self.tokens.last_mut() {
            if last.span.end as usize > frame.start {
                last.span.end = frame.start as u32;
                last.text = &input[last.span.start as usize..frame.start];
            }
        }
        if let Some(slot) = frame.scope {
            self.scopes.truncate(slot);
        }
        self.last_owner = NO_OWNER;

        let span = Span::from_range(frame.start, self.pos);
        let owner = self.fresh_owner();
        self.push_token(TokenKind::Error, frame.start, self.pos, owner);
        debug!(mode = rule.name, %span, "abandoned malformed mode");
        self.diagnostics.push(Diagnostic::malformed_mode(rule.name, span));
    }

    fn flag_markup(&mut self, end: usize) {
        let span = Span::from_range(self.pos, end);
        let owner = self.fresh_owner();
        self.push_token(TokenKind::Illegal, self.pos, end, owner);
        debug!(%span, "markup-like sequence in source");
        self.diagnostics.push(Diagnostic::suspect_markup(span));
        self.pos = end;
    }

    /// Force-close every mode above the root at the current position.
    fn unwind_to_root(&mut self) {
        let at = self.pos;
        let mut outer = at;
        while self.stack.len() > 1 {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            if let Some(slot) = frame.scope {
                self.scopes[slot].span.end = at as u32;
            }
            outer = frame.start;
        }
        self.last_owner = NO_OWNER;

        let span = Span::from_range(outer, at);
        debug!(max_depth = self.options.max_depth, %span, "nesting limit reached");
        self.diagnostics
            .push(Diagnostic::nesting_limit(self.options.max_depth, span));
    }

    /// Consume unclaimed text as content of the active mode.
    fn skip_content(&mut self, rule: &Rule) {
        let start = self.pos;
        let bytes = self.bytes;

        let until = |found: Option<usize>, from: usize| found.map_or(bytes.len(), |i| from + i);
        let (end, kind) = match rule.scan {
            Scan::Each if scan::is_ident_byte(bytes[start]) => {
                let end = scan::word_end(bytes, start);
                let kind = rule
                    .keywords
                    .and_then(|table| table.classify(&self.input[start..end]))
                    .unwrap_or(rule.kind);
                (end, kind)
            }
            Scan::Each => (scan::next_char(bytes, start), rule.kind),
            Scan::Until1(a) => {
                let from = scan::next_char(bytes, start);
                (until(memchr(a, &bytes[from..]), from), rule.kind)
            }
            Scan::Until2(a, b) => {
                let from = scan::next_char(bytes, start);
                (until(memchr2(a, b, &bytes[from..]), from), rule.kind)
            }
            Scan::Until3(a, b, c) => {
                let from = scan::next_char(bytes, start);
                (until(memchr3(a, b, c, &bytes[from..]), from), rule.kind)
            }
        };

        self.emit(kind, start, end);
        self.pos = end;
    }

    /// Emit a segment inside the active mode.
    fn emit(&mut self, kind: TokenKind, start: usize, end: usize) {
        let top = self.top();
        let owner = if kind == self.grammar.rule(top.rule).kind {
            top.owner
        } else {
            self.fresh_owner()
        };
        self.push_token(kind, start, end, owner);
    }

    fn push_token(&mut self, kind: TokenKind, start: usize, end: usize, owner: u32) {
        if start >= end {
            return;
        }
        let input = self.input;
        let merge = owner == self.last_owner
            && self
                .tokens
                .last()
                .is_some_and(|t| t.kind == kind && t.span.end as usize == start);
        if merge {
            if let Some(last) = self.tokens.last_mut() {
                last.span.end = end as u32;
                last.text = &input[last.span.start as usize..end];
            }
        } else {
            self.tokens.push(Token::new(
                kind,
                Span::from_range(start, end),
                &input[start..end],
            ));
        }
        self.last_owner = owner;
    }

    /// Close whatever is still open at end of input.
    fn finish(&mut self) {
        let end = self.bytes.len();
        while self.stack.len() > 1 {
            let Some(frame) = self.stack.pop() else {
                break;
            };
            let rule = self.grammar.rule(frame.rule);
            if let Some(slot) = frame.scope {
                self.scopes[slot].span.end = end as u32;
            }
            let span = Span::from_range(frame.start, end);
            debug!(mode = rule.name, %span, "unterminated mode closed at end of input");
            self.diagnostics.push(Diagnostic::unterminated(rule.name, span));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<(TokenKind, &str)> {
        highlight(input)
            .tokens
            .iter()
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_empty_input() {
        let result = highlight("");
        assert!(result.tokens.is_empty());
        assert!(result.scopes.is_empty());
        assert!(result.is_clean());
    }

    #[test]
    fn test_plain_text_coalesces() {
        assert_eq!(kinds("   ;;  "), vec![(TokenKind::Plain, "   ;;  ")]);
    }

    #[test]
    fn test_sibling_operators_stay_separate() {
        assert_eq!(
            kinds("=-"),
            vec![(TokenKind::Operator, "="), (TokenKind::Operator, "-")]
        );
    }

    #[test]
    fn test_escape_coalesces_into_string() {
        assert_eq!(kinds(r#""a\"b""#), vec![(TokenKind::String, r#""a\"b""#)]);
    }

    #[test]
    fn test_token_at() {
        let result = highlight("x == 1");
        assert_eq!(result.token_at(2).map(|t| t.text), Some("=="));
        assert_eq!(result.token_at(3).map(|t| t.text), Some("=="));
        assert_eq!(result.token_at(5).map(|t| t.kind), Some(TokenKind::Number));
        assert!(result.token_at(6).is_none());
    }

    #[test]
    fn test_max_depth_is_clamped() {
        let h = Highlighter::default().with_max_depth(0);
        assert_eq!(h.options().max_depth, MIN_DEPTH);
    }
}
