//! Process-wide language registration.
//!
//! Host renderers select a highlighter per code block by name. Languages
//! are registered once, on first lookup, and never change afterwards.

use std::fmt;
use std::sync::OnceLock;

use crate::flint;
use crate::grammar::Grammar;

/// A registered language.
pub struct Language {
    /// Display name.
    pub name: &'static str,
    /// Canonical identifier.
    pub id: &'static str,
    /// Alternative names accepted by [`find_language`].
    pub aliases: &'static [&'static str],
    /// File extensions (without the dot).
    pub extensions: &'static [&'static str],
    grammar: fn() -> &'static Grammar,
}

impl Language {
    /// The language's rule table.
    #[inline]
    pub fn grammar(&self) -> &'static Grammar {
        (self.grammar)()
    }

    /// Check if `name` is the id or one of the aliases (ASCII case-insensitive).
    pub fn matches(&self, name: &str) -> bool {
        self.id.eq_ignore_ascii_case(name)
            || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name)
            .field("id", &self.id)
            .field("aliases", &self.aliases)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Language {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Language {}

/// Flint, the only language this crate ships.
pub static FLINT: Language = Language {
    name: "Flint",
    id: "flint",
    aliases: &["flint", "ft"],
    extensions: &["ft", "flint"],
    grammar: flint::grammar,
};

fn registry() -> &'static [&'static Language] {
    static REGISTRY: OnceLock<Vec<&'static Language>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        tracing::debug!(language = FLINT.id, aliases = ?FLINT.aliases, "registering language");
        vec![&FLINT]
    })
}

/// All registered languages.
pub fn languages() -> &'static [&'static Language] {
    registry()
}

/// Look up a language by id or alias.
pub fn find_language(name: &str) -> Option<&'static Language> {
    registry().iter().copied().find(|lang| lang.matches(name))
}

/// Look up a language by file extension, with or without the leading dot.
pub fn find_language_by_extension(ext: &str) -> Option<&'static Language> {
    let ext = ext.strip_prefix('.').unwrap_or(ext);
    registry()
        .iter()
        .copied()
        .find(|lang| lang.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_alias() {
        assert_eq!(find_language("flint"), Some(&FLINT));
        assert_eq!(find_language("FT"), Some(&FLINT));
        assert_eq!(find_language("rust"), None);
    }

    #[test]
    fn test_lookup_by_extension() {
        assert_eq!(find_language_by_extension(".ft"), Some(&FLINT));
        assert_eq!(find_language_by_extension("flint"), Some(&FLINT));
        assert_eq!(find_language_by_extension("md"), None);
    }
}
