//! The Flint rule table.
//!
//! Rule order inside a mode is priority order: the first rule whose start
//! matches wins. Screaming-case must precede capitalized identifiers, the
//! arrow must precede operators, and declaration headers must precede bare
//! calls.

use std::sync::OnceLock;

use crate::grammar::{Grammar, GrammarBuilder, Head, KeywordTable, Matcher, Rule, RuleId, Scan};
use crate::token::TokenKind;

// Lists are kept sorted for binary search.
const BUILT_IN: &[&str] = &[
    "anyerror", "bool", "bool8", "bp", "const", "f32", "f32x2", "f32x3", "f32x4", "f64", "f64x2",
    "f64x3", "f64x4", "float", "fn", "i16", "i32", "i32x2", "i32x3", "i32x4", "i32x8", "i64",
    "i64x2", "i64x3", "i64x4", "i8", "int", "mut", "opaque", "str", "u16", "u32", "u64", "u8",
    "u8x2", "u8x3", "u8x4", "u8x8", "void",
];

/// Reserved words of Flint.
pub static KEYWORDS: KeywordTable = KeywordTable {
    keyword: &[
        "as", "async", "break", "catch", "continue", "data", "def", "do", "else", "entity", "enum",
        "error", "extends", "extern", "for", "func", "hook", "if", "in", "link", "requires",
        "return", "spawn", "sync", "throw", "type", "use", "variant", "while",
    ],
    literal: &["false", "none", "null", "true"],
    built_in: BUILT_IN,
};

/// Built-in types only, for `ident::` paths.
static BUILT_INS_ONLY: KeywordTable = KeywordTable {
    keyword: &[],
    literal: &[],
    built_in: BUILT_IN,
};

const TYPE_HEADER_KEYWORDS: &[&str] = &["data", "func", "entity", "variant", "enum", "error"];

/// The shared Flint grammar, built on first use.
pub fn grammar() -> &'static Grammar {
    static GRAMMAR: OnceLock<Grammar> = OnceLock::new();
    GRAMMAR.get_or_init(build)
}

fn build() -> Grammar {
    use TokenKind as K;

    let mut g = GrammarBuilder::new();

    let root = g.add(
        Rule::leaf("source", K::Plain, Matcher::Literal(""))
            .illegal(Matcher::Literal("</"))
            .keywords(&KEYWORDS),
    );

    let line_comment = g.add(Rule::leaf("line comment", K::Comment, Matcher::LineComment));
    let block_comment = g.add(
        Rule::mode(
            "block comment",
            K::Comment,
            Matcher::Literal("/*"),
            Matcher::Literal("*/"),
        )
        .scan(Scan::Until2(b'*', b'/')),
    );

    let escape = g.add(Rule::leaf("escape", K::String, Matcher::Escape));
    let quoted = g.add(
        Rule::mode("string", K::String, Matcher::QuoteOpen, Matcher::Literal("\""))
            .scan(Scan::Until2(b'"', b'\\')),
    );
    let raw = g.add(
        Rule::mode("raw string", K::String, Matcher::RawOpen, Matcher::RawClose)
            .scan(Scan::Until1(b'"')),
    );
    let char_literal = g.add(Rule::leaf(
        "character literal",
        K::String,
        Matcher::CharLiteral,
    ));
    let interpolated = g.add(
        Rule::mode(
            "interpolated string",
            K::String,
            Matcher::Literal("$\""),
            Matcher::Literal("\""),
        )
        .scan(Scan::Until3(b'"', b'\\', b'{')),
    );
    let subst = g.add(Rule::mode(
        "substitution",
        K::Subst,
        Matcher::Literal("{"),
        Matcher::Literal("}"),
    ));

    let symbol = g.add(Rule::leaf("symbol", K::Symbol, Matcher::Symbol));
    let screaming = g.add(Rule::leaf("constant", K::Literal, Matcher::ScreamingCase));
    let capitalized = g.add(Rule::leaf("type name", K::Type, Matcher::Capitalized));
    let arrow = g.add(Rule::leaf("arrow", K::Operator, Matcher::Literal("->")));
    let operator = g.add(Rule::leaf("operator", K::Operator, Matcher::Operator));
    let number = g.add(Rule::leaf("number", K::Number, Matcher::Number));

    let title = g.add(Rule::leaf("title", K::Title, Matcher::Identifier));
    let function_header = g.add(
        Rule::mode(
            "function header",
            K::Function,
            Matcher::KeywordThenSpace(&["def"]),
            Matcher::AnyOf(b"(<"),
        )
        .head(Head::Kind(K::Keyword))
        .exclude_end(),
    );
    let type_header = g.add(
        Rule::mode(
            "type header",
            K::ClassHeader,
            Matcher::KeywordThenSpace(TYPE_HEADER_KEYWORDS),
            Matcher::Literal(":"),
        )
        .head(Head::Kind(K::Keyword))
        .illegal(Matcher::Stray(b" \t\r\n\x0c:")),
    );
    let qualified_path = g.add(
        Rule::leaf("qualified path", K::Operator, Matcher::QualifiedPath).head(Head::Lookup {
            table: &BUILT_INS_ONLY,
            fallback: K::Plain,
        }),
    );
    let call = g.add(Rule::leaf("call", K::Function, Matcher::Call(&KEYWORDS)));

    let common: [RuleId; 10] = [
        symbol,
        screaming,
        capitalized,
        arrow,
        operator,
        number,
        function_header,
        type_header,
        qualified_path,
        call,
    ];
    let strings = [quoted, raw, char_literal, interpolated];
    let comments = [line_comment, block_comment];

    g.nest(root, comments.into_iter().chain(strings).chain(common));
    g.nest(block_comment, [block_comment]);
    g.nest(quoted, [escape]);
    g.nest(interpolated, [escape, subst]);
    g.nest(
        subst,
        [subst]
            .into_iter()
            .chain(comments)
            .chain(strings)
            .chain(common),
    );
    g.nest(function_header, [title]);
    g.nest(type_header, [title]);

    g.build(root)
}
