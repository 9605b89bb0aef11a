//! Robustness tests: coverage, ordering and termination on hostile input.
//!
//! Property tests feed both arbitrary text and text assembled from Flint
//! fragments (delimiters, headers, escapes) so that unbalanced nesting and
//! abandoned headers are hit constantly.

use std::time::{Duration, Instant};

use flint_highlight_core::{highlight, HighlightResult, Highlighter, Span};
use proptest::prelude::*;

/// Check every structural invariant of a highlight result.
fn check_invariants(input: &str, result: &HighlightResult<'_>) {
    assert_eq!(result.reconstruct(), input, "tokens must cover the input");

    let mut cursor = 0u32;
    for token in &result.tokens {
        assert!(!token.span.is_empty(), "empty token {:?}", token);
        assert_eq!(token.span.start, cursor, "gap or overlap at {:?}", token);
        assert_eq!(token.span.slice(input), Some(token.text));
        cursor = token.span.end;
    }
    assert_eq!(cursor as usize, input.len());

    // Scopes come in open order, so any two are either disjoint or nested
    // exactly when each one fits inside the innermost scope still open.
    let whole = Span::new(0, input.len() as u32);
    let mut open: Vec<Span> = Vec::new();
    for scope in &result.scopes {
        assert!(whole.encloses(scope.span), "scope out of bounds {:?}", scope);
        assert!(!scope.span.is_empty(), "empty scope {:?}", scope);
        while open.last().is_some_and(|outer| outer.end <= scope.span.start) {
            open.pop();
        }
        if let Some(outer) = open.last() {
            assert!(outer.start < scope.span.start, "scopes out of order");
            assert!(outer.encloses(scope.span), "{} crosses {:?}", outer, scope);
        }
        open.push(scope.span);
    }

    for diagnostic in &result.diagnostics {
        assert!(whole.encloses(diagnostic.span), "{}", diagnostic);
    }
}

// ============================================================================
// Edge Inputs
// ============================================================================

#[test]
fn test_empty_input() {
    let result = highlight("");
    assert!(result.tokens.is_empty());
    check_invariants("", &result);
}

#[test]
fn test_lone_delimiters() {
    for input in [
        "\"", "$\"", "r\"", "r#\"", "'", "b'", "/*", "*/", "{", "}", "def ", "data ", "\\", "</",
        "$\"{", "$\"{\"", "r##", "0x", "0b_", "->", "?",
    ] {
        check_invariants(input, &highlight(input));
    }
}

#[test]
fn test_binary_garbage() {
    let bytes: Vec<u8> = (0u32..4096).map(|i| (i.wrapping_mul(2654435761) >> 13) as u8).collect();
    let input = String::from_utf8_lossy(&bytes);
    check_invariants(&input, &highlight(&input));
}

#[test]
fn test_multibyte_text() {
    let input = "données := \"héllo ✓\" // ünïcödé\n'é' $\"{ü}\" 🦀";
    check_invariants(input, &highlight(input));
}

#[test]
fn test_crlf_line_comment() {
    let input = "x // note\r\ny";
    let result = highlight(input);
    check_invariants(input, &result);
    assert_eq!(result.tokens[1].text, "// note\r");
}

// ============================================================================
// Linear Time on Pathological Input
// ============================================================================

const BUDGET: Duration = Duration::from_secs(10);

fn timed(input: &str) -> HighlightResult<'_> {
    let start = Instant::now();
    let result = highlight(input);
    let elapsed = start.elapsed();
    assert!(
        elapsed < BUDGET,
        "{} bytes took {:?}",
        input.len(),
        elapsed
    );
    result
}

#[test]
fn test_deeply_nested_comments() {
    let input = "/*".repeat(100_000);
    let result = timed(&input);
    check_invariants(&input, &result);
    assert!(!result.is_clean());
}

#[test]
fn test_long_numeric_literal() {
    let input = format!("{}.{}e{}", "9_".repeat(100_000), "1".repeat(50_000), "7".repeat(1000));
    let result = timed(&input);
    assert_eq!(result.tokens.len(), 1);
}

#[test]
fn test_raw_string_hash_runs() {
    let hashes = "#".repeat(2_000);
    let input = format!("r{hashes}\"{}", format!("\"{}", &hashes[1..]).repeat(200));
    let result = timed(&input);
    check_invariants(&input, &result);
}

#[test]
fn test_repeated_abandoned_headers() {
    let input = "data data data data (".repeat(20_000);
    let result = timed(&input);
    check_invariants(&input, &result);
}

#[test]
fn test_unclosed_function_headers() {
    let input = "def f def g def h ".repeat(20_000);
    let result = timed(&input);
    check_invariants(&input, &result);
}

#[test]
fn test_deep_interpolation() {
    let input = "$\"{".repeat(50_000);
    let result = Highlighter::default().with_max_depth(16).highlight(&input);
    check_invariants(&input, &result);
}

#[test]
fn test_long_identifiers_before_paren() {
    let input = format!("{}{}(", "a".repeat(200_000), " ".repeat(200_000));
    let result = timed(&input);
    check_invariants(&input, &result);
}

// ============================================================================
// Properties
// ============================================================================

fn fragment() -> impl Strategy<Value = &'static str> {
    prop::sample::select(vec![
        "/*", "*/", "//", "\n", "\"", "$\"", "{", "}", "\\", "r#\"", "\"#", "'", "b'", "'a'",
        "def ", "data ", "enum ", "(", "<", ":", "->", "==", "=", "::", "</", "ABC", "Foo", "foo",
        "i32", "if", "0x1F", "1.5e3", " ", "é", "🦀", "\t",
    ])
}

proptest! {
    #[test]
    fn prop_arbitrary_text_is_covered(input in any::<String>()) {
        check_invariants(&input, &highlight(&input));
    }

    #[test]
    fn prop_fragment_soup_is_covered(parts in prop::collection::vec(fragment(), 0..64)) {
        let input = parts.concat();
        check_invariants(&input, &highlight(&input));
    }

    #[test]
    fn prop_depth_limit_keeps_coverage(
        parts in prop::collection::vec(fragment(), 0..64),
        depth in 0usize..8,
    ) {
        let input = parts.concat();
        let result = Highlighter::default().with_max_depth(depth).highlight(&input);
        check_invariants(&input, &result);
    }

    #[test]
    fn prop_highlighting_is_deterministic(parts in prop::collection::vec(fragment(), 0..32)) {
        let input = parts.concat();
        prop_assert_eq!(highlight(&input).tokens, highlight(&input).tokens);
    }
}
