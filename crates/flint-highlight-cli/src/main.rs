//! Flint Highlight CLI - Tokenize, check, and render Flint source
//!
//! Usage:
//!   fhl [OPTIONS] [COMMAND] <FILE|->
//!
//! Commands:
//!   tokens    Print the token stream (default)
//!   check     Report diagnostics, exit 1 when any
//!   stats     Show per-kind token statistics
//!   html      Render highlight.js-style HTML spans

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use anyhow::{bail, Context, Result};
use flint_highlight_core::{
    find_language, find_language_by_extension, HighlightResult, Highlighter, Language, Scope,
    TokenKind, DEFAULT_MAX_DEPTH,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    if let Err(e) = run(&args) {
        eprintln!("error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> Result<()> {
    let config = parse_args(args)?;
    init_tracing(config.verbose);

    let input = read_input(&config.file)?;
    let language = resolve_language(&config)?;
    tracing::debug!(language = language.id, bytes = input.len(), "highlighting");

    let highlighter = Highlighter::new(language).with_max_depth(config.max_depth);
    let result = highlighter.highlight(&input);

    match config.command {
        Command::Tokens => cmd_tokens(&result, &config),
        Command::Check => cmd_check(&result, &config),
        Command::Stats => cmd_stats(&result, &input, &config),
        Command::Html => cmd_html(&result, &input),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        return Ok(input);
    }
    fs::read_to_string(file).with_context(|| format!("failed to read '{}'", file))
}

fn resolve_language(config: &Config) -> Result<&'static Language> {
    if let Some(name) = &config.lang {
        return match find_language(name) {
            Some(language) => Ok(language),
            None => bail!("unknown language: {}", name),
        };
    }

    // Infer from extension, fall back to Flint
    let by_extension = Path::new(&config.file)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(find_language_by_extension);
    Ok(by_extension.unwrap_or_else(|| Highlighter::default().language()))
}

#[derive(Debug)]
struct Config {
    command: Command,
    file: String,
    lang: Option<String>,
    max_depth: usize,
    format: OutputFormat,
    verbose: bool,
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Tokens,
    Check,
    Stats,
    Html,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

fn parse_args(args: &[String]) -> Result<Config> {
    let mut command = Command::Tokens;
    let mut format = OutputFormat::Text;
    let mut verbose = false;
    let mut lang = None;
    let mut max_depth = DEFAULT_MAX_DEPTH;
    let mut file = None;

    let mut i = 1;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                process::exit(0);
            }
            "-V" | "--version" => {
                println!("fhl {}", env!("CARGO_PKG_VERSION"));
                process::exit(0);
            }
            "-v" | "--verbose" => verbose = true,
            "-j" | "--json" => format = OutputFormat::Json,
            "-l" | "--lang" => {
                i += 1;
                let value = args.get(i).context("--lang requires a language name")?;
                lang = Some(value.clone());
            }
            "-d" | "--max-depth" => {
                i += 1;
                let value = args.get(i).context("--max-depth requires a number")?;
                max_depth = value
                    .parse()
                    .with_context(|| format!("invalid --max-depth: {}", value))?;
            }
            "tokens" => command = Command::Tokens,
            "check" => command = Command::Check,
            "stats" => command = Command::Stats,
            "html" => command = Command::Html,
            "-" => {
                if file.is_some() {
                    bail!("multiple files specified");
                }
                file = Some(arg.clone());
            }
            _ if arg.starts_with('-') => {
                bail!("unknown option: {}", arg);
            }
            _ => {
                if file.is_some() {
                    bail!("multiple files specified");
                }
                file = Some(arg.clone());
            }
        }
        i += 1;
    }

    let file = file.context("no input file specified (use - for stdin)")?;

    Ok(Config {
        command,
        file,
        lang,
        max_depth,
        format,
        verbose,
    })
}

fn print_help() {
    eprintln!(
        r#"fhl - Flint syntax highlighting tokenizer

USAGE:
    fhl [OPTIONS] [COMMAND] <FILE|->

COMMANDS:
    tokens      Print the token stream (default)
    check       Report diagnostics; exit status 1 when any are found
    stats       Show per-kind token statistics
    html        Render <span class="hljs-KIND"> markup

OPTIONS:
    -l, --lang <NAME>       Language id or alias (default: from extension, else flint)
    -d, --max-depth <N>     Maximum mode nesting depth (default: 64, minimum: 2)
    -v, --verbose           Include plain tokens and scopes; debug logging
    -j, --json              Output in JSON format
    -h, --help              Print help information
    -V, --version           Print version information

ENVIRONMENT:
    RUST_LOG                Log filter, e.g. RUST_LOG=flint_highlight_core=trace

EXAMPLES:
    fhl main.ft                 Print highlighted tokens
    fhl -j main.ft              Output tokens as JSON
    fhl check main.ft           Report malformed or unterminated constructs
    cat main.ft | fhl html -    Render HTML from stdin
"#
    );
}

// =============================================================================
// Tokens Command
// =============================================================================

fn cmd_tokens(result: &HighlightResult<'_>, config: &Config) -> Result<()> {
    for diagnostic in &result.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }

    match config.format {
        OutputFormat::Json => print_json(&convert_result(result))?,
        OutputFormat::Text => print_tokens(result, config.verbose),
    }

    Ok(())
}

fn print_tokens(result: &HighlightResult<'_>, verbose: bool) {
    println!("Language: {}", result.language.name);
    println!("Tokens: {}", result.tokens.len());

    for token in &result.tokens {
        if token.kind.is_plain() && !verbose {
            continue;
        }
        println!(
            "  {:>12} {:<9} {:?}",
            token.span.to_string(),
            token.kind,
            token.text
        );
    }

    if verbose {
        println!();
        println!("Scopes: {}", result.scopes.len());
        for scope in &result.scopes {
            println!("  {:>12} {}", scope.span.to_string(), scope.kind);
        }
    }
}

// =============================================================================
// Check Command
// =============================================================================

fn cmd_check(result: &HighlightResult<'_>, config: &Config) -> Result<()> {
    if result.is_clean() {
        if config.format == OutputFormat::Json {
            println!(r#"{{"clean": true, "diagnostics": []}}"#);
        } else {
            println!("Clean: no diagnostics");
        }
        return Ok(());
    }

    if config.format == OutputFormat::Json {
        let diagnostics: Vec<_> = result.diagnostics.iter().map(convert_diagnostic).collect();
        println!(
            "{}",
            serde_json::json!({"clean": false, "diagnostics": diagnostics})
        );
    } else {
        eprintln!("{} diagnostic(s) found", result.diagnostics.len());
        for diagnostic in &result.diagnostics {
            eprintln!("  - [{}] {}", diagnostic.kind.as_str(), diagnostic);
        }
    }
    bail!("{} diagnostic(s) found", result.diagnostics.len())
}

// =============================================================================
// Stats Command
// =============================================================================

fn cmd_stats(result: &HighlightResult<'_>, input: &str, config: &Config) -> Result<()> {
    let stats = HighlightStats::from_result(result, input);

    if config.format == OutputFormat::Json {
        return print_json(&stats);
    }

    println!("Highlight Statistics");
    println!("--------------------");
    println!("Language:     {}", stats.language);
    println!("Bytes:        {}", stats.bytes);
    println!("Lines:        {}", stats.lines);
    println!();
    println!("Tokens:       {}", stats.tokens);
    for kind in &stats.kinds {
        println!(
            "  {:<12} {:>7} tokens {:>9} bytes",
            format!("{}:", kind.kind),
            kind.tokens,
            kind.bytes
        );
    }
    println!();
    println!("Scopes:       {}", stats.scopes);
    println!("Max nesting:  {}", stats.max_nesting);
    println!("Diagnostics:  {}", stats.diagnostics);

    Ok(())
}

#[derive(Serialize)]
struct HighlightStats {
    language: &'static str,
    bytes: usize,
    lines: usize,
    tokens: usize,
    kinds: Vec<KindStats>,
    scopes: usize,
    max_nesting: usize,
    diagnostics: usize,
}

#[derive(Serialize)]
struct KindStats {
    kind: &'static str,
    tokens: usize,
    bytes: usize,
}

impl HighlightStats {
    fn from_result(result: &HighlightResult<'_>, input: &str) -> Self {
        let kinds = TokenKind::ALL
            .iter()
            .map(|&kind| {
                let (tokens, bytes) = result
                    .tokens_of(kind)
                    .fold((0, 0), |(n, b), t| (n + 1, b + t.span.len() as usize));
                KindStats {
                    kind: kind.class_name(),
                    tokens,
                    bytes,
                }
            })
            .filter(|k| k.tokens > 0)
            .collect();

        Self {
            language: result.language.name,
            bytes: input.len(),
            lines: input.lines().count(),
            tokens: result.tokens.len(),
            kinds,
            scopes: result.scopes.len(),
            max_nesting: max_nesting(&result.scopes),
            diagnostics: result.diagnostics.len(),
        }
    }
}

/// Deepest chain of nested scopes.
fn max_nesting(scopes: &[Scope]) -> usize {
    let mut open: Vec<u32> = Vec::new();
    let mut deepest = 0;
    for scope in scopes {
        while open.last().is_some_and(|&end| end <= scope.span.start) {
            open.pop();
        }
        open.push(scope.span.end);
        deepest = deepest.max(open.len());
    }
    deepest
}

// =============================================================================
// HTML Command
// =============================================================================

fn cmd_html(result: &HighlightResult<'_>, input: &str) -> Result<()> {
    for diagnostic in &result.diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
    print!("{}", render_html(result, input));
    Ok(())
}

/// Render tokens as nested `<span class="hljs-KIND">` elements.
///
/// Each scope becomes a span wrapping everything it covers. Token segments
/// inside a scope of the same kind are written bare; plain text is never
/// wrapped.
fn render_html(result: &HighlightResult<'_>, input: &str) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    let mut open: Vec<&Scope> = Vec::new();
    let mut scopes = result.scopes.iter().peekable();

    for token in &result.tokens {
        let mut cursor = token.span.start;
        while cursor < token.span.end {
            while open.last().is_some_and(|s| s.span.end <= cursor) {
                open.pop();
                out.push_str("</span>");
            }
            while let Some(scope) = scopes.next_if(|s| s.span.start <= cursor) {
                push_open_tag(&mut out, scope.kind);
                open.push(scope);
            }

            let mut next = token.span.end;
            if let Some(scope) = scopes.peek() {
                next = next.min(scope.span.start);
            }
            if let Some(scope) = open.last() {
                next = next.min(scope.span.end);
            }

            let text = &input[cursor as usize..next as usize];
            let inherited = open.last().is_some_and(|s| s.kind == token.kind);
            if token.kind.is_plain() || inherited {
                push_escaped(&mut out, text);
            } else {
                push_open_tag(&mut out, token.kind);
                push_escaped(&mut out, text);
                out.push_str("</span>");
            }
            cursor = next;
        }
    }

    for _ in open {
        out.push_str("</span>");
    }
    out
}

fn push_open_tag(out: &mut String, kind: TokenKind) {
    out.push_str("<span class=\"hljs-");
    out.push_str(kind.class_name());
    out.push_str("\">");
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}

// =============================================================================
// JSON Output
// =============================================================================

#[derive(Serialize)]
struct JsonResult<'a> {
    language: &'static str,
    tokens: Vec<JsonToken<'a>>,
    scopes: Vec<JsonScope>,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(Serialize)]
struct JsonToken<'a> {
    kind: &'static str,
    start: u32,
    end: u32,
    text: &'a str,
}

#[derive(Serialize)]
struct JsonScope {
    kind: &'static str,
    start: u32,
    end: u32,
}

#[derive(Serialize)]
struct JsonDiagnostic<'a> {
    kind: &'static str,
    message: &'a str,
    start: u32,
    end: u32,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn convert_result<'a>(result: &'a HighlightResult<'a>) -> JsonResult<'a> {
    JsonResult {
        language: result.language.id,
        tokens: result
            .tokens
            .iter()
            .map(|t| JsonToken {
                kind: t.kind.class_name(),
                start: t.span.start,
                end: t.span.end,
                text: t.text,
            })
            .collect(),
        scopes: result
            .scopes
            .iter()
            .map(|s| JsonScope {
                kind: s.kind.class_name(),
                start: s.span.start,
                end: s.span.end,
            })
            .collect(),
        diagnostics: result.diagnostics.iter().map(convert_diagnostic).collect(),
    }
}

fn convert_diagnostic(diagnostic: &flint_highlight_core::Diagnostic) -> JsonDiagnostic<'_> {
    JsonDiagnostic {
        kind: diagnostic.kind.as_str(),
        message: &diagnostic.message,
        start: diagnostic.span.start,
        end: diagnostic.span.end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flint_highlight_core::highlight;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("fhl")
            .chain(list.iter().copied())
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_parse_args_defaults() {
        let config = parse_args(&args(&["main.ft"])).unwrap();
        assert!(matches!(config.command, Command::Tokens));
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.file, "main.ft");
    }

    #[test]
    fn test_parse_args_options() {
        let config = parse_args(&args(&["-j", "-d", "8", "-l", "ft", "check", "-"])).unwrap();
        assert!(matches!(config.command, Command::Check));
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.lang.as_deref(), Some("ft"));
        assert_eq!(config.file, "-");
    }

    #[test]
    fn test_parse_args_errors() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["a.ft", "b.ft"])).is_err());
        assert!(parse_args(&args(&["--bogus", "a.ft"])).is_err());
        assert!(parse_args(&args(&["-d", "deep", "a.ft"])).is_err());
        assert!(parse_args(&args(&["a.ft", "-l"])).is_err());
    }

    #[test]
    fn test_resolve_language() {
        let mut config = parse_args(&args(&["main.flint"])).unwrap();
        assert_eq!(resolve_language(&config).unwrap().id, "flint");

        config.file = "notes.txt".to_string();
        assert_eq!(resolve_language(&config).unwrap().id, "flint");

        config.lang = Some("cobol".to_string());
        assert!(resolve_language(&config).is_err());
    }

    #[test]
    fn test_render_html_escapes() {
        let input = "a < b";
        let html = render_html(&highlight(input), input);
        assert_eq!(html, "a <span class=\"hljs-operator\">&lt;</span> b");
    }

    #[test]
    fn test_render_html_nested_comment() {
        let input = "/* a /* b */ */";
        let html = render_html(&highlight(input), input);
        assert_eq!(
            html,
            "<span class=\"hljs-comment\">/* a <span class=\"hljs-comment\">/* b */</span> */</span>"
        );
    }

    #[test]
    fn test_render_html_keeps_text() {
        let input = "def main():\n    print($\"x={1 + 2}\") // <done>\n";
        let html = render_html(&highlight(input), input);
        assert!(html.contains("<span class=\"hljs-title\">main</span>"));
        assert!(html.contains("<span class=\"hljs-subst\">"));
        assert!(html.contains("&lt;done&gt;"));
        assert_eq!(html.matches("<span").count(), html.matches("</span>").count());
    }

    #[test]
    fn test_stats_counts_kinds() {
        let input = "x := 1 + 2";
        let stats = HighlightStats::from_result(&highlight(input), input);
        let number = stats.kinds.iter().find(|k| k.kind == "number").unwrap();
        assert_eq!(number.tokens, 2);
        assert_eq!(number.bytes, 2);
        assert_eq!(stats.max_nesting, 0);
    }

    #[test]
    fn test_max_nesting() {
        let input = "/* /* /* */ */ */ /* */";
        assert_eq!(max_nesting(&highlight(input).scopes), 3);
    }
}
