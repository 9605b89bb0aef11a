//! Grammar model: an arena of lexical rules addressed by [`RuleId`].
//!
//! Rules reference the rules allowed inside them by id, so a rule that may
//! contain itself (block comments, substitution blocks) simply lists its own
//! id. The arena is built once and never mutated afterwards.

use crate::scan;
use crate::token::TokenKind;

/// Stable index of a rule within its grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RuleId(u16);

impl RuleId {
    /// Index into the rule arena.
    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reserved words split into highlight categories.
///
/// Each list must be sorted; lookups are binary searches.
#[derive(Debug)]
pub struct KeywordTable {
    pub keyword: &'static [&'static str],
    pub literal: &'static [&'static str],
    pub built_in: &'static [&'static str],
}

impl KeywordTable {
    /// Classify `word`, or `None` when it is not reserved.
    pub fn classify(&self, word: &str) -> Option<TokenKind> {
        if self.keyword.binary_search(&word).is_ok() {
            Some(TokenKind::Keyword)
        } else if self.literal.binary_search(&word).is_ok() {
            Some(TokenKind::Literal)
        } else if self.built_in.binary_search(&word).is_ok() {
            Some(TokenKind::BuiltIn)
        } else {
            None
        }
    }

    /// True when `word` belongs to any category.
    #[inline]
    pub fn contains(&self, word: &str) -> bool {
        self.classify(word).is_some()
    }

    fn is_sorted(&self) -> bool {
        [self.keyword, self.literal, self.built_in]
            .iter()
            .all(|list| list.windows(2).all(|w| w[0] < w[1]))
    }
}

/// Pattern variants a rule can use for its start, end and illegal matchers.
///
/// Each variant is backed by a linear scanner in [`crate::scan`].
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Exact text.
    Literal(&'static str),
    /// One byte out of a set.
    AnyOf(&'static [u8]),
    /// One of the words at a word start, followed by whitespace.
    KeywordThenSpace(&'static [&'static str]),
    /// A character that is neither an identifier byte nor in the set.
    Stray(&'static [u8]),
    LineComment,
    QuoteOpen,
    RawOpen,
    /// Closes a raw string opened with the frame's hash count.
    RawClose,
    CharLiteral,
    Symbol,
    ScreamingCase,
    Capitalized,
    Operator,
    Number,
    Identifier,
    /// `ident::`; the identifier is the head.
    QualifiedPath,
    /// `ident (` for identifiers outside the reserved table.
    Call(&'static KeywordTable),
    Escape,
}

/// A successful match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    /// End of the matched text.
    pub end: usize,
    /// End of the head part; equal to `end` unless the match splits.
    pub head_end: usize,
    /// Hash count captured by [`Matcher::RawOpen`].
    pub hashes: u16,
}

impl Hit {
    #[inline(always)]
    const fn to(end: usize) -> Self {
        Self {
            end,
            head_end: end,
            hashes: 0,
        }
    }
}

impl Matcher {
    /// Try this matcher at `pos` (which must be inside `bytes`).
    ///
    /// `hashes` is the raw-string hash count of the active frame.
    pub fn find(&self, bytes: &[u8], pos: usize, hashes: u16) -> Option<Hit> {
        let end = match *self {
            Matcher::Literal(lit) => scan::literal(bytes, pos, lit.as_bytes()),
            Matcher::AnyOf(set) => scan::any_of(bytes, pos, set),
            Matcher::KeywordThenSpace(words) => scan::keyword_then_space(bytes, pos, words),
            Matcher::Stray(allowed) => scan::stray(bytes, pos, allowed),
            Matcher::LineComment => scan::line_comment(bytes, pos),
            Matcher::QuoteOpen => scan::quote_open(bytes, pos),
            Matcher::RawOpen => {
                return scan::raw_open(bytes, pos).map(|(end, hashes)| Hit {
                    end,
                    head_end: end,
                    hashes,
                })
            }
            Matcher::RawClose => scan::raw_close(bytes, pos, hashes),
            Matcher::CharLiteral => scan::char_literal(bytes, pos),
            Matcher::Symbol => scan::symbol(bytes, pos),
            Matcher::ScreamingCase => scan::screaming_case(bytes, pos),
            Matcher::Capitalized => scan::capitalized(bytes, pos),
            Matcher::Operator => scan::operator(bytes, pos),
            Matcher::Number => scan::number(bytes, pos),
            Matcher::Identifier => scan::identifier(bytes, pos),
            Matcher::QualifiedPath => {
                return scan::qualified_path(bytes, pos).map(|(head_end, end)| Hit {
                    end,
                    head_end,
                    hashes: 0,
                })
            }
            Matcher::Call(reserved) => scan::call(bytes, pos).filter(|&end| {
                // Identifier bytes are ASCII, so this never fails.
                std::str::from_utf8(&bytes[pos..end]).is_ok_and(|word| !reserved.contains(word))
            }),
            Matcher::Escape => scan::escape(bytes, pos),
        };
        end.map(Hit::to)
    }
}

/// How the start text of a rule is classified.
#[derive(Debug, Clone, Copy)]
pub enum Head {
    /// Same kind as the rule.
    Rule,
    /// A fixed kind, e.g. the `def` keyword opening a function header.
    Kind(TokenKind),
    /// Looked up in a keyword table, falling back to a fixed kind.
    Lookup {
        table: &'static KeywordTable,
        fallback: TokenKind,
    },
}

/// How content inside a mode is skipped when no rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scan {
    /// One character (or one identifier) at a time.
    Each,
    /// Jump to the next occurrence of any of these bytes.
    Until1(u8),
    Until2(u8, u8),
    Until3(u8, u8, u8),
}

/// A lexical rule. Rules without an `end` are leaves: they emit their match
/// and never become an active mode.
#[derive(Debug, Clone)]
pub struct Rule {
    /// Human-readable name used in diagnostics.
    pub name: &'static str,
    pub kind: TokenKind,
    pub head: Head,
    pub start: Matcher,
    pub end: Option<Matcher>,
    /// Stop before the end text instead of consuming it.
    pub exclude_end: bool,
    pub illegal: Option<Matcher>,
    /// Table used to classify identifiers in this mode's own content.
    pub keywords: Option<&'static KeywordTable>,
    /// Rules tried inside this mode, in priority order.
    pub contains: Vec<RuleId>,
    pub scan: Scan,
}

impl Rule {
    /// A rule that emits its match as a single token.
    pub fn leaf(name: &'static str, kind: TokenKind, start: Matcher) -> Self {
        Self {
            name,
            kind,
            head: Head::Rule,
            start,
            end: None,
            exclude_end: false,
            illegal: None,
            keywords: None,
            contains: Vec::new(),
            scan: Scan::Each,
        }
    }

    /// A rule that opens a mode running until `end` matches.
    pub fn mode(name: &'static str, kind: TokenKind, start: Matcher, end: Matcher) -> Self {
        Self {
            end: Some(end),
            ..Self::leaf(name, kind, start)
        }
    }

    pub fn head(mut self, head: Head) -> Self {
        self.head = head;
        self
    }

    pub fn exclude_end(mut self) -> Self {
        self.exclude_end = true;
        self
    }

    pub fn illegal(mut self, matcher: Matcher) -> Self {
        self.illegal = Some(matcher);
        self
    }

    pub fn keywords(mut self, table: &'static KeywordTable) -> Self {
        self.keywords = Some(table);
        self
    }

    pub fn scan(mut self, scan: Scan) -> Self {
        self.scan = scan;
        self
    }

    /// True for rules that push a mode.
    #[inline(always)]
    pub fn is_mode(&self) -> bool {
        self.end.is_some()
    }
}

/// An immutable set of rules with a designated root.
#[derive(Debug)]
pub struct Grammar {
    rules: Vec<Rule>,
    root: RuleId,
}

impl Grammar {
    #[inline(always)]
    pub fn rule(&self, id: RuleId) -> &Rule {
        &self.rules[id.index()]
    }

    #[inline(always)]
    pub fn root(&self) -> RuleId {
        self.root
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules
            .iter()
            .enumerate()
            .map(|(i, rule)| (RuleId(i as u16), rule))
    }

    /// Find a rule by name.
    pub fn find(&self, name: &str) -> Option<RuleId> {
        self.rules().find(|(_, r)| r.name == name).map(|(id, _)| id)
    }
}

/// Incremental grammar construction.
///
/// Rules are added first and wired together afterwards with
/// [`GrammarBuilder::nest`], which is what lets a rule list itself.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    rules: Vec<Rule>,
}

impl GrammarBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, rule: Rule) -> RuleId {
        debug_assert!(
            rule.keywords.map_or(true, |table| table.is_sorted()),
            "keyword table for `{}` is not sorted",
            rule.name
        );
        let id = RuleId(self.rules.len() as u16);
        self.rules.push(rule);
        id
    }

    /// Set the rules allowed inside `parent`, in priority order.
    pub fn nest(&mut self, parent: RuleId, children: impl IntoIterator<Item = RuleId>) {
        self.rules[parent.index()].contains = children.into_iter().collect();
    }

    pub fn build(self, root: RuleId) -> Grammar {
        Grammar {
            rules: self.rules,
            root,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static TABLE: KeywordTable = KeywordTable {
        keyword: &["def", "if"],
        literal: &["true"],
        built_in: &["i32"],
    };

    #[test]
    fn test_classify() {
        assert_eq!(TABLE.classify("if"), Some(TokenKind::Keyword));
        assert_eq!(TABLE.classify("true"), Some(TokenKind::Literal));
        assert_eq!(TABLE.classify("i32"), Some(TokenKind::BuiltIn));
        assert_eq!(TABLE.classify("iff"), None);
        assert!(TABLE.is_sorted());
    }

    #[test]
    fn test_self_nesting_by_id() {
        let mut g = GrammarBuilder::new();
        let root = g.add(Rule::leaf("root", TokenKind::Plain, Matcher::Literal("")));
        let comment = g.add(Rule::mode(
            "comment",
            TokenKind::Comment,
            Matcher::Literal("/*"),
            Matcher::Literal("*/"),
        ));
        g.nest(comment, [comment]);
        g.nest(root, [comment]);
        let grammar = g.build(root);

        assert_eq!(grammar.rule(comment).contains, vec![comment]);
        assert_eq!(grammar.find("comment"), Some(comment));
    }

    #[test]
    fn test_call_skips_reserved_words() {
        let call = Matcher::Call(&TABLE);
        assert_eq!(call.find(b"if (x)", 0, 0), None);
        assert_eq!(call.find(b"go(x)", 0, 0), Some(Hit::to(2)));
    }

    #[test]
    fn test_qualified_path_splits_head() {
        let hit = Matcher::QualifiedPath.find(b"i32::max", 0, 0);
        assert_eq!(
            hit,
            Some(Hit {
                end: 5,
                head_end: 3,
                hashes: 0
            })
        );
    }
}
