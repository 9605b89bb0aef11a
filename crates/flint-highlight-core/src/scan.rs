//! Byte-level scanners behind the grammar's matchers.
//!
//! Every scanner takes the input bytes and a start position and returns the
//! end of the match, or `None`. Scanners never look behind their start
//! beyond one byte (word boundaries) and never backtrack over more than a
//! constant number of bytes, which keeps a full highlight pass linear.
//!
//! All positions returned fall on UTF-8 character boundaries: scanners stop
//! on ASCII bytes or step over whole characters with [`char_len`].

use memchr::memchr;

/// `[A-Za-z0-9_]`
#[inline(always)]
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// `[A-Za-z_]`
#[inline(always)]
pub fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline(always)]
fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c')
}

/// Width in bytes of the UTF-8 character starting with `lead`.
#[inline(always)]
pub fn char_len(lead: u8) -> usize {
    match lead {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xff => 4,
        // Continuation byte: only reachable on a broken boundary, step one.
        _ => 1,
    }
}

/// Position just past the character at `pos`, clamped to the input.
#[inline(always)]
pub fn next_char(bytes: &[u8], pos: usize) -> usize {
    (pos + char_len(bytes[pos])).min(bytes.len())
}

/// True when no identifier byte precedes `pos`.
#[inline(always)]
pub fn at_word_start(bytes: &[u8], pos: usize) -> bool {
    pos == 0 || !is_ident_byte(bytes[pos - 1])
}

/// End of the identifier-byte run starting at `pos`.
#[inline]
pub fn word_end(bytes: &[u8], pos: usize) -> usize {
    let mut i = pos;
    while i < bytes.len() && is_ident_byte(bytes[i]) {
        i += 1;
    }
    i
}

#[inline(always)]
fn run_of(bytes: &[u8], mut i: usize, pred: impl Fn(u8) -> bool) -> usize {
    while i < bytes.len() && pred(bytes[i]) {
        i += 1;
    }
    i
}

/// Exact byte sequence.
#[inline]
pub fn literal(bytes: &[u8], pos: usize, lit: &[u8]) -> Option<usize> {
    bytes[pos..].starts_with(lit).then_some(pos + lit.len())
}

/// `//` up to, not including, the next newline.
#[inline]
pub fn line_comment(bytes: &[u8], pos: usize) -> Option<usize> {
    if !bytes[pos..].starts_with(b"//") {
        return None;
    }
    let body = pos + 2;
    Some(match memchr(b'\n', &bytes[body..]) {
        Some(offset) => body + offset,
        None => bytes.len(),
    })
}

/// `b?"`
#[inline]
pub fn quote_open(bytes: &[u8], pos: usize) -> Option<usize> {
    match bytes[pos] {
        b'"' => Some(pos + 1),
        b'b' if bytes.get(pos + 1) == Some(&b'"') => Some(pos + 2),
        _ => None,
    }
}

/// `r#*"`, returning the end and the number of hashes.
#[inline]
pub fn raw_open(bytes: &[u8], pos: usize) -> Option<(usize, u16)> {
    if bytes[pos] != b'r' {
        return None;
    }
    let hashes_end = run_of(bytes, pos + 1, |b| b == b'#');
    if bytes.get(hashes_end) != Some(&b'"') {
        return None;
    }
    let hashes = u16::try_from(hashes_end - pos - 1).ok()?;
    Some((hashes_end + 1, hashes))
}

/// `"` followed by exactly `hashes` hashes and no further `#`.
#[inline]
pub fn raw_close(bytes: &[u8], pos: usize, hashes: u16) -> Option<usize> {
    if bytes[pos] != b'"' {
        return None;
    }
    let want = hashes as usize;
    let run = run_of(bytes, pos + 1, |b| b == b'#') - pos - 1;
    (run == want).then_some(pos + 1 + want)
}

/// `b?'` + `\`? + (`x\w{2}` | `u\w{4}` | `U\w{8}` | any char but newline) + `'`.
///
/// Alternatives are tried in that order, first with the backslash consumed
/// and then without, so `'\''` and `'\'` are both accepted.
pub fn char_literal(bytes: &[u8], pos: usize) -> Option<usize> {
    let mut i = pos;
    if bytes[i] == b'b' {
        i += 1;
    }
    if bytes.get(i) != Some(&b'\'') {
        return None;
    }
    i += 1;

    let body = |start: usize| -> Option<usize> {
        let counted = |lead: u8, n: usize| -> Option<usize> {
            if bytes.get(start) != Some(&lead) {
                return None;
            }
            let end = start + 1 + n;
            (end <= bytes.len() && bytes[start + 1..end].iter().all(|&b| is_ident_byte(b)))
                .then_some(end)
        };
        let closes = |end: usize| (bytes.get(end) == Some(&b'\'')).then_some(end + 1);

        counted(b'x', 2)
            .and_then(closes)
            .or_else(|| counted(b'u', 4).and_then(closes))
            .or_else(|| counted(b'U', 8).and_then(closes))
            .or_else(|| {
                let lead = *bytes.get(start)?;
                if lead == b'\n' {
                    return None;
                }
                closes(next_char(bytes, start))
            })
    };

    if bytes.get(i) == Some(&b'\\') {
        if let Some(end) = body(i + 1) {
            return Some(end);
        }
    }
    body(i)
}

/// `'` followed by an identifier.
#[inline]
pub fn symbol(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes[pos] != b'\'' || !bytes.get(pos + 1).is_some_and(|&b| is_ident_start(b)) {
        return None;
    }
    Some(word_end(bytes, pos + 1))
}

/// Whole word matching `[A-Z_][A-Z0-9_]*`.
#[inline]
pub fn screaming_case(bytes: &[u8], pos: usize) -> Option<usize> {
    let lead = bytes[pos];
    if !(lead.is_ascii_uppercase() || lead == b'_') || !at_word_start(bytes, pos) {
        return None;
    }
    let end = word_end(bytes, pos);
    bytes[pos..end]
        .iter()
        .all(|b| !b.is_ascii_lowercase())
        .then_some(end)
}

/// Whole word matching `[A-Z_][a-zA-Z0-9_]*`.
#[inline]
pub fn capitalized(bytes: &[u8], pos: usize) -> Option<usize> {
    let lead = bytes[pos];
    if !(lead.is_ascii_uppercase() || lead == b'_') || !at_word_start(bytes, pos) {
        return None;
    }
    Some(word_end(bytes, pos))
}

/// Operators longest-first.
const OPERATORS_2: [&[u8; 2]; 15] = [
    b"++", b"--", b"==", b"!=", b"<=", b">=", b"+=", b"-=", b"*=", b"/=", b":=", b"::", b"|>",
    b"?.", b"??",
];
const OPERATORS_2_BANG_DOT: &[u8; 2] = b"!.";
const OPERATORS_1: &[u8] = b"=<>+-*/&!%";

/// Maximal-munch operator.
///
/// Two-byte operators are tried before single bytes, so `==` is one token;
/// a lone `?` only counts when a `(` follows.
pub fn operator(bytes: &[u8], pos: usize) -> Option<usize> {
    let rest = &bytes[pos..];
    if rest.len() >= 2 {
        let pair = &rest[..2];
        if OPERATORS_2.iter().any(|op| pair == &op[..]) || pair == &OPERATORS_2_BANG_DOT[..] {
            return Some(pos + 2);
        }
    }
    let lead = rest[0];
    if OPERATORS_1.contains(&lead) {
        return Some(pos + 1);
    }
    (lead == b'?' && rest.get(1) == Some(&b'(')).then_some(pos + 1)
}

/// Numeric literal at a word start.
///
/// Prefixed forms need at least one digit after the prefix; otherwise the
/// leading `0` is read as a decimal.
pub fn number(bytes: &[u8], pos: usize) -> Option<usize> {
    if !bytes[pos].is_ascii_digit() || !at_word_start(bytes, pos) {
        return None;
    }

    if bytes[pos] == b'0' {
        let prefixed = |digit: fn(u8) -> bool| {
            let end = run_of(bytes, pos + 2, |b| digit(b) || b == b'_');
            (end > pos + 2).then_some(end)
        };
        let found = match bytes.get(pos + 1) {
            Some(b'b') => prefixed(|b| b == b'0' || b == b'1'),
            Some(b'o') => prefixed(|b| (b'0'..=b'7').contains(&b)),
            Some(b'x') => prefixed(|b| b.is_ascii_hexdigit()),
            _ => None,
        };
        if found.is_some() {
            return found;
        }
    }

    let digits = |b: u8| b.is_ascii_digit() || b == b'_';
    let mut end = run_of(bytes, pos + 1, digits);

    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(|&b| digits(b)) {
        end = run_of(bytes, end + 1, digits);
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = run_of(bytes, exp, digits);
        if exp_end > exp {
            end = exp_end;
        }
    }

    Some(end)
}

/// One of `words` at a word start, followed by whitespace. Returns the end
/// of the word only.
#[inline]
pub fn keyword_then_space(bytes: &[u8], pos: usize, words: &[&str]) -> Option<usize> {
    if !is_ident_start(bytes[pos]) || !at_word_start(bytes, pos) {
        return None;
    }
    let end = word_end(bytes, pos);
    let word = &bytes[pos..end];
    if !words.iter().any(|w| w.as_bytes() == word) {
        return None;
    }
    bytes.get(end).is_some_and(|&b| is_space(b)).then_some(end)
}

/// `[a-zA-Z_]\w*`
#[inline]
pub fn identifier(bytes: &[u8], pos: usize) -> Option<usize> {
    is_ident_start(bytes[pos]).then(|| word_end(bytes, pos))
}

/// Identifier at a word start immediately followed by `::`. Returns
/// `(identifier_end, match_end)`.
#[inline]
pub fn qualified_path(bytes: &[u8], pos: usize) -> Option<(usize, usize)> {
    if !is_ident_start(bytes[pos]) || !at_word_start(bytes, pos) {
        return None;
    }
    let ident_end = word_end(bytes, pos);
    literal(bytes, ident_end, b"::").map(|end| (ident_end, end))
}

/// Lowercase-leading identifier at a word start, then optional whitespace,
/// then `(`. Returns the end of the identifier.
#[inline]
pub fn call(bytes: &[u8], pos: usize) -> Option<usize> {
    let lead = bytes[pos];
    if !(lead.is_ascii_lowercase() || lead == b'_') || !at_word_start(bytes, pos) {
        return None;
    }
    let ident_end = word_end(bytes, pos);
    let paren = run_of(bytes, ident_end, is_space);
    (bytes.get(paren) == Some(&b'(')).then_some(ident_end)
}

/// Backslash followed by any character.
#[inline]
pub fn escape(bytes: &[u8], pos: usize) -> Option<usize> {
    if bytes[pos] != b'\\' || pos + 1 >= bytes.len() {
        return None;
    }
    Some(next_char(bytes, pos + 1))
}

/// A single byte from `set`.
#[inline]
pub fn any_of(bytes: &[u8], pos: usize, set: &[u8]) -> Option<usize> {
    set.contains(&bytes[pos]).then_some(pos + 1)
}

/// A character that is neither an identifier byte nor in `allowed`.
#[inline]
pub fn stray(bytes: &[u8], pos: usize, allowed: &[u8]) -> Option<usize> {
    let b = bytes[pos];
    (!is_ident_byte(b) && !allowed.contains(&b)).then(|| next_char(bytes, pos))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(s: &str) -> Option<&str> {
        number(s.as_bytes(), 0).map(|end| &s[..end])
    }

    #[test]
    fn test_number_forms() {
        assert_eq!(num("0b1010_1"), Some("0b1010_1"));
        assert_eq!(num("0o777x"), Some("0o777"));
        assert_eq!(num("0xFF_a0g"), Some("0xFF_a0"));
        assert_eq!(num("0b2"), Some("0"));
        assert_eq!(num("1_000.25e-3;"), Some("1_000.25e-3"));
        assert_eq!(num("3.x"), Some("3"));
        assert_eq!(num("7e"), Some("7"));
        assert_eq!(num("x1"), None);
    }

    #[test]
    fn test_number_requires_word_start() {
        assert_eq!(number(b"a1", 1), None);
    }

    #[test]
    fn test_operator_maximal_munch() {
        assert_eq!(operator(b"==", 0), Some(2));
        assert_eq!(operator(b"=a", 0), Some(1));
        assert_eq!(operator(b"|>", 0), Some(2));
        assert_eq!(operator(b"|x", 0), None);
        assert_eq!(operator(b"?(", 0), Some(1));
        assert_eq!(operator(b"?x", 0), None);
        assert_eq!(operator(b"!.", 0), Some(2));
    }

    #[test]
    fn test_raw_delimiters() {
        assert_eq!(raw_open(b"r##\"x", 0), Some((4, 2)));
        assert_eq!(raw_open(b"r##x", 0), None);
        assert_eq!(raw_close(b"\"##", 0, 2), Some(3));
        assert_eq!(raw_close(b"\"#", 0, 2), None);
        assert_eq!(raw_close(b"\"###", 0, 2), None);
        assert_eq!(raw_close(b"\"", 0, 0), Some(1));
    }

    #[test]
    fn test_char_literal_alternatives() {
        assert_eq!(char_literal(b"'a'", 0), Some(3));
        assert_eq!(char_literal(b"b'\\n'", 0), Some(5));
        assert_eq!(char_literal(b"'\\x41'", 0), Some(6));
        assert_eq!(char_literal(b"'\\u00e9'", 0), Some(8));
        assert_eq!(char_literal(b"'\\''", 0), Some(4));
        assert_eq!(char_literal(b"'ab'", 0), None);
        assert_eq!(char_literal("'é'".as_bytes(), 0), Some(4));
        assert_eq!(char_literal(b"'\n'", 0), None);
    }

    #[test]
    fn test_case_rules() {
        assert_eq!(screaming_case(b"MAX_SIZE ", 0), Some(8));
        assert_eq!(screaming_case(b"Max", 0), None);
        assert_eq!(capitalized(b"Max", 0), Some(3));
        assert_eq!(capitalized(b"aMax", 1), None);
    }

    #[test]
    fn test_call_lookahead() {
        assert_eq!(call(b"print  (", 0), Some(5));
        assert_eq!(call(b"print x", 0), None);
        assert_eq!(call(b"Print(", 0), None);
    }

    #[test]
    fn test_keyword_then_space() {
        let words = ["data", "enum"];
        assert_eq!(keyword_then_space(b"data Point", 0, &words), Some(4));
        assert_eq!(keyword_then_space(b"data(", 0, &words), None);
        assert_eq!(keyword_then_space(b"database x", 0, &words), None);
    }

    #[test]
    fn test_line_comment_stops_before_newline() {
        assert_eq!(line_comment(b"// hi\nx", 0), Some(5));
        assert_eq!(line_comment(b"// hi", 0), Some(5));
    }
}
