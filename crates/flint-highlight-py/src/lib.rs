//! Python bindings for the Flint highlighter.

use flint_highlight_core::{
    find_language, languages as core_languages, Diagnostic as CoreDiagnostic,
    DiagnosticKind as CoreDiagnosticKind, HighlightResult as CoreHighlightResult,
    Highlighter as CoreHighlighter, Scope as CoreScope, Span as CoreSpan, Token as CoreToken,
    TokenKind as CoreTokenKind, DEFAULT_MAX_DEPTH,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

// ============================================================================
// Span
// ============================================================================

/// Source location in the input text (byte offsets).
#[pyclass(frozen, get_all, name = "Span")]
#[derive(Clone)]
pub struct PySpan {
    pub start: u32,
    pub end: u32,
}

#[pymethods]
impl PySpan {
    fn __repr__(&self) -> String {
        format!("Span({}, {})", self.start, self.end)
    }

    #[getter]
    fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }
}

impl From<CoreSpan> for PySpan {
    fn from(s: CoreSpan) -> Self {
        PySpan {
            start: s.start,
            end: s.end,
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Token classification.
#[pyclass(frozen, eq, eq_int, name = "TokenKind")]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PyTokenKind {
    Plain,
    Keyword,
    Literal,
    BuiltIn,
    Type,
    Operator,
    Number,
    String,
    Subst,
    Comment,
    Symbol,
    Function,
    Title,
    ClassHeader,
    Error,
    Illegal,
}

#[pymethods]
impl PyTokenKind {
    /// CSS class suffix, as in `hljs-<class_name>`.
    #[getter]
    fn class_name(&self) -> &'static str {
        CoreTokenKind::from(*self).class_name()
    }
}

impl From<CoreTokenKind> for PyTokenKind {
    fn from(k: CoreTokenKind) -> Self {
        match k {
            CoreTokenKind::Plain => PyTokenKind::Plain,
            CoreTokenKind::Keyword => PyTokenKind::Keyword,
            CoreTokenKind::Literal => PyTokenKind::Literal,
            CoreTokenKind::BuiltIn => PyTokenKind::BuiltIn,
            CoreTokenKind::Type => PyTokenKind::Type,
            CoreTokenKind::Operator => PyTokenKind::Operator,
            CoreTokenKind::Number => PyTokenKind::Number,
            CoreTokenKind::String => PyTokenKind::String,
            CoreTokenKind::Subst => PyTokenKind::Subst,
            CoreTokenKind::Comment => PyTokenKind::Comment,
            CoreTokenKind::Symbol => PyTokenKind::Symbol,
            CoreTokenKind::Function => PyTokenKind::Function,
            CoreTokenKind::Title => PyTokenKind::Title,
            CoreTokenKind::ClassHeader => PyTokenKind::ClassHeader,
            CoreTokenKind::Error => PyTokenKind::Error,
            CoreTokenKind::Illegal => PyTokenKind::Illegal,
        }
    }
}

impl From<PyTokenKind> for CoreTokenKind {
    fn from(k: PyTokenKind) -> Self {
        match k {
            PyTokenKind::Plain => CoreTokenKind::Plain,
            PyTokenKind::Keyword => CoreTokenKind::Keyword,
            PyTokenKind::Literal => CoreTokenKind::Literal,
            PyTokenKind::BuiltIn => CoreTokenKind::BuiltIn,
            PyTokenKind::Type => CoreTokenKind::Type,
            PyTokenKind::Operator => CoreTokenKind::Operator,
            PyTokenKind::Number => CoreTokenKind::Number,
            PyTokenKind::String => CoreTokenKind::String,
            PyTokenKind::Subst => CoreTokenKind::Subst,
            PyTokenKind::Comment => CoreTokenKind::Comment,
            PyTokenKind::Symbol => CoreTokenKind::Symbol,
            PyTokenKind::Function => CoreTokenKind::Function,
            PyTokenKind::Title => CoreTokenKind::Title,
            PyTokenKind::ClassHeader => CoreTokenKind::ClassHeader,
            PyTokenKind::Error => CoreTokenKind::Error,
            PyTokenKind::Illegal => CoreTokenKind::Illegal,
        }
    }
}

/// Diagnostic category.
#[pyclass(frozen, eq, eq_int, name = "DiagnosticKind")]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PyDiagnosticKind {
    MalformedMode,
    Unterminated,
    NestingLimit,
    SuspectMarkup,
}

impl From<CoreDiagnosticKind> for PyDiagnosticKind {
    fn from(k: CoreDiagnosticKind) -> Self {
        match k {
            CoreDiagnosticKind::MalformedMode => PyDiagnosticKind::MalformedMode,
            CoreDiagnosticKind::Unterminated => PyDiagnosticKind::Unterminated,
            CoreDiagnosticKind::NestingLimit => PyDiagnosticKind::NestingLimit,
            CoreDiagnosticKind::SuspectMarkup => PyDiagnosticKind::SuspectMarkup,
        }
    }
}

// ============================================================================
// Tokens, scopes, diagnostics
// ============================================================================

/// A classified span of the input.
#[pyclass(frozen, get_all, name = "Token")]
#[derive(Clone)]
pub struct PyToken {
    pub kind: PyTokenKind,
    pub span: PySpan,
    pub text: String,
}

#[pymethods]
impl PyToken {
    fn __repr__(&self) -> String {
        format!("Token({:?}, {:?})", self.kind, self.text)
    }
}

impl From<&CoreToken<'_>> for PyToken {
    fn from(t: &CoreToken<'_>) -> Self {
        PyToken {
            kind: t.kind.into(),
            span: t.span.into(),
            text: t.text.to_string(),
        }
    }
}

/// The extent of one closed mode.
#[pyclass(frozen, get_all, name = "Scope")]
#[derive(Clone)]
pub struct PyScope {
    pub kind: PyTokenKind,
    pub span: PySpan,
}

#[pymethods]
impl PyScope {
    fn __repr__(&self) -> String {
        format!("Scope({:?}, {}..{})", self.kind, self.span.start, self.span.end)
    }
}

impl From<&CoreScope> for PyScope {
    fn from(s: &CoreScope) -> Self {
        PyScope {
            kind: s.kind.into(),
            span: s.span.into(),
        }
    }
}

/// A recovered scan problem.
#[pyclass(frozen, get_all, name = "Diagnostic")]
#[derive(Clone)]
pub struct PyDiagnostic {
    pub message: String,
    pub span: PySpan,
    pub kind: PyDiagnosticKind,
}

#[pymethods]
impl PyDiagnostic {
    fn __repr__(&self) -> String {
        format!("Diagnostic({:?}, {:?})", self.message, self.kind)
    }

    fn __str__(&self) -> String {
        format!(
            "{} at bytes {}..{}",
            self.message, self.span.start, self.span.end
        )
    }
}

impl From<&CoreDiagnostic> for PyDiagnostic {
    fn from(d: &CoreDiagnostic) -> Self {
        PyDiagnostic {
            message: d.message.clone(),
            span: d.span.into(),
            kind: d.kind.into(),
        }
    }
}

// ============================================================================
// HighlightResult
// ============================================================================

/// Output of one highlight pass.
#[pyclass(frozen, name = "HighlightResult")]
pub struct PyHighlightResult {
    #[pyo3(get)]
    pub language: String,
    #[pyo3(get)]
    pub tokens: Vec<PyToken>,
    #[pyo3(get)]
    pub scopes: Vec<PyScope>,
    #[pyo3(get)]
    pub diagnostics: Vec<PyDiagnostic>,
}

#[pymethods]
impl PyHighlightResult {
    #[getter]
    fn clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Concatenated token text; always equals the highlighted input.
    fn text(&self) -> String {
        self.tokens.iter().map(|t| t.text.as_str()).collect()
    }

    fn __len__(&self) -> usize {
        self.tokens.len()
    }

    fn __repr__(&self) -> String {
        format!(
            "HighlightResult(language={:?}, tokens={}, scopes={}, diagnostics={})",
            self.language,
            self.tokens.len(),
            self.scopes.len(),
            self.diagnostics.len()
        )
    }
}

impl From<CoreHighlightResult<'_>> for PyHighlightResult {
    fn from(r: CoreHighlightResult<'_>) -> Self {
        PyHighlightResult {
            language: r.language.id.to_string(),
            tokens: r.tokens.iter().map(PyToken::from).collect(),
            scopes: r.scopes.iter().map(PyScope::from).collect(),
            diagnostics: r.diagnostics.iter().map(PyDiagnostic::from).collect(),
        }
    }
}

// ============================================================================
// Highlighter
// ============================================================================

/// Configured highlighter for one language.
///
/// Args:
///     language: Language id or alias (default: "flint")
///     max_depth: Maximum mode nesting depth, at least 2 (default: 64)
///     flag_markup: Flag `</` outside strings and comments (default: True)
///
/// Raises:
///     ValueError: On an unknown language
#[pyclass(frozen, name = "Highlighter")]
pub struct PyHighlighter {
    inner: CoreHighlighter,
}

#[pymethods]
impl PyHighlighter {
    #[new]
    #[pyo3(
        signature = (language="flint", max_depth=DEFAULT_MAX_DEPTH, flag_markup=true),
        text_signature = "(language='flint', max_depth=64, flag_markup=True)"
    )]
    fn new(language: &str, max_depth: usize, flag_markup: bool) -> PyResult<Self> {
        let inner = CoreHighlighter::for_name(language)
            .ok_or_else(|| PyValueError::new_err(format!("unknown language: {}", language)))?
            .with_max_depth(max_depth)
            .with_markup_check(flag_markup);
        Ok(PyHighlighter { inner })
    }

    /// Highlight a source string. Never raises.
    #[pyo3(text_signature = "(self, input)")]
    fn highlight(&self, py: Python<'_>, input: &str) -> PyHighlightResult {
        let inner = self.inner;
        py.allow_threads(|| inner.highlight(input).into())
    }

    #[getter]
    fn language(&self) -> &'static str {
        self.inner.language().id
    }

    #[getter]
    fn max_depth(&self) -> usize {
        self.inner.options().max_depth
    }

    #[getter]
    fn flag_markup(&self) -> bool {
        self.inner.options().flag_markup
    }

    fn __repr__(&self) -> String {
        let options = self.inner.options();
        format!(
            "Highlighter(language={:?}, max_depth={}, flag_markup={})",
            self.inner.language().id,
            options.max_depth,
            options.flag_markup
        )
    }
}

// ============================================================================
// Module functions
// ============================================================================

/// Highlight a source string.
///
/// Args:
///     input: Source text
///     language: Language id or alias (default: "flint")
///
/// Returns:
///     HighlightResult: Tokens, scopes and diagnostics
///
/// Raises:
///     ValueError: On an unknown language
#[pyfunction]
#[pyo3(signature = (input, language="flint"), text_signature = "(input, language='flint')")]
fn highlight(py: Python<'_>, input: &str, language: &str) -> PyResult<PyHighlightResult> {
    let language = find_language(language)
        .ok_or_else(|| PyValueError::new_err(format!("unknown language: {}", language)))?;
    let highlighter = CoreHighlighter::new(language);
    Ok(py.allow_threads(|| highlighter.highlight(input).into()))
}

/// Ids of all registered languages.
#[pyfunction]
fn languages() -> Vec<&'static str> {
    core_languages().iter().map(|lang| lang.id).collect()
}

// ============================================================================
// Module
// ============================================================================

/// Flint syntax highlighting tokenizer.
#[pymodule]
fn pyflint(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PySpan>()?;
    m.add_class::<PyTokenKind>()?;
    m.add_class::<PyToken>()?;
    m.add_class::<PyScope>()?;
    m.add_class::<PyDiagnosticKind>()?;
    m.add_class::<PyDiagnostic>()?;
    m.add_class::<PyHighlightResult>()?;
    m.add_class::<PyHighlighter>()?;
    m.add_function(wrap_pyfunction!(highlight, m)?)?;
    m.add_function(wrap_pyfunction!(languages, m)?)?;
    Ok(())
}
