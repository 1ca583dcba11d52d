//! Lexical scanner that locates Chinese copy in JS/TS/JSX/Vue sources.
//!
//! This is not a parser. It knows just enough about the token structure
//! (strings, template literals, comments, regular expressions, brackets and
//! JSX/Vue markup) to report every literal that contains Chinese together with
//! the exact byte range a later rewrite may replace. In restore mode the same
//! walk reports `I18N.*` key references passed to a set of target calls.

use std::collections::BTreeSet;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::KEY_ROOT;
use crate::error::{Error, Result};

lazy_static! {
    static ref CHINESE_REGEX: Regex = Regex::new(r"[\x{4e00}-\x{9fa5}]").unwrap();
}

/// Keywords after which an expression (and so a regex or JSX element) may start.
const EXPR_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "instanceof", "new", "void", "delete",
    "throw", "yield", "await", "of",
];

/// Returns `true` when `text` contains at least one CJK unified ideograph.
pub fn contains_chinese(text: &str) -> bool {
    CHINESE_REGEX.is_match(text)
}

/// Source dialect, chosen from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Plain script: `.ts`. `<` is never markup.
    Script,
    /// Script with JSX markup: `.js`, `.jsx`, `.tsx`.
    Jsx,
    /// Vue single-file component.
    Vue,
}

impl Dialect {
    pub fn from_path(path: &Path) -> Dialect {
        match path.extension().and_then(|s| s.to_str()) {
            Some("vue") => Dialect::Vue,
            Some("js") | Some("jsx") | Some("tsx") => Dialect::Jsx,
            _ => Dialect::Script,
        }
    }
}

/// A `[start, end)` byte range into the original, unmodified file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

/// What kind of token an occurrence was found in; decides the replacement syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum OccurrenceKind {
    /// `'…'` or `"…"`; the range includes the quotes.
    StringLiteral,
    /// `` `…` ``; `expressions` holds the source of each `${…}` in order.
    TemplateLiteral { expressions: Vec<String> },
    /// Trimmed JSX text child.
    JsxText,
    /// Quoted JSX attribute value; the range includes the quotes.
    JsxAttribute,
    /// Trimmed text inside a Vue `<template>`.
    VueText,
    /// Static Vue attribute; the range runs from the name to the closing quote.
    VueAttribute { name: String },
    /// `I18N.a.b` passed to a target call (restore mode).
    KeyReference,
    /// `I18N.get(I18N.a.b, { val1: x })` passed to a target call (restore mode).
    KeyCall { values: Vec<(String, String)> },
}

/// One instance of literal text (or, in restore mode, a key reference) in one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextOccurrence {
    pub text: String,
    pub range: Range,
    pub kind: OccurrenceKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    /// Find Chinese literals; arguments of the listed calls are skipped.
    Extract,
    /// Find key references; only arguments of the listed calls are considered.
    Restore,
}

/// Scanner configuration: the mode plus the call names it skips or targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub mode: ScanMode,
    pub functions: BTreeSet<String>,
}

impl ScanOptions {
    pub fn extract<I, S>(ignore_functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScanOptions {
            mode: ScanMode::Extract,
            functions: ignore_functions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn restore<I, S>(target_functions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScanOptions {
            mode: ScanMode::Restore,
            functions: target_functions.into_iter().map(Into::into).collect(),
        }
    }

    fn is_listed(&self, callee: &str) -> bool {
        self.functions.contains(callee)
            || callee
                .rsplit('.')
                .next()
                .is_some_and(|last| self.functions.contains(last))
    }
}

/// Scans `source` (the content of `path`) and returns every occurrence in
/// source order. Ranges are pairwise disjoint.
pub fn find_chinese_text(
    source: &str,
    path: &Path,
    options: &ScanOptions,
) -> Result<Vec<TextOccurrence>> {
    let dialect = Dialect::from_path(path);
    let mut scanner = Scanner::new(source, path, options, dialect == Dialect::Jsx);
    match dialect {
        Dialect::Script | Dialect::Jsx => scanner.scan_code(false)?,
        Dialect::Vue => scanner.scan_vue()?,
    }
    Ok(scanner.out)
}

/// Byte offset where an import statement may be inserted: the start of the
/// file (after a `#!` line), or the start of the first `<script>` block.
/// `None` for a Vue component without a script block.
pub fn script_start(source: &str, path: &Path) -> Option<usize> {
    match Dialect::from_path(path) {
        Dialect::Vue => vue_blocks(source).scripts.first().map(|script| {
            // Keep the inserted line off the `<script>` tag line.
            if source[script.start..].starts_with("\r\n") {
                script.start + 2
            } else if source[script.start..].starts_with('\n') {
                script.start + 1
            } else {
                script.start
            }
        }),
        _ => {
            if source.starts_with("#!") {
                Some(source.find('\n').map(|i| i + 1).unwrap_or(source.len()))
            } else {
                Some(0)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Punct(u8),
    Dot,
    Keyword,
    Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Paren,
    Bracket,
    Brace,
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    listed: bool,
    module: bool,
}

#[derive(Debug, Clone)]
struct Chain {
    start: usize,
    end: usize,
    text: String,
}

struct Scanner<'a> {
    src: &'a str,
    bytes: &'a [u8],
    file: &'a Path,
    options: &'a ScanOptions,
    jsx: bool,
    pos: usize,
    limit: usize,
    frames: Vec<Frame>,
    prev: Prev,
    chain: Option<Chain>,
    module_specifier_pending: bool,
    next_paren_module: bool,
    silent: usize,
    out: Vec<TextOccurrence>,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_' || b == b'$' || b >= 0x80
}

fn is_ident_continue(b: u8) -> bool {
    is_ident_start(b) || b.is_ascii_digit()
}

fn utf8_width(b: u8) -> usize {
    match b {
        0xF0..=0xFF => 4,
        0xE0..=0xEF => 3,
        0xC0..=0xDF => 2,
        _ => 1,
    }
}

/// Trims whitespace from `src[start..end]` and returns the narrowed range.
fn trimmed_range(src: &str, start: usize, end: usize) -> (usize, usize) {
    let slice = &src[start..end];
    let lead = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim().len();
    (start + lead, start + lead + trimmed)
}

/// Resolves escape sequences of a JS string or template chunk.
pub(crate) fn cook(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('\r') => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            Some('\n') => {}
            Some('x') => {
                let hex: String = chars.by_ref().take(2).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\x");
                        out.push_str(&hex);
                    }
                }
            }
            Some('u') => {
                let hex: String = if chars.peek() == Some(&'{') {
                    chars.next();
                    chars.by_ref().take_while(|&ch| ch != '}').collect()
                } else {
                    chars.by_ref().take(4).collect()
                };
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

impl<'a> Scanner<'a> {
    fn new(src: &'a str, file: &'a Path, options: &'a ScanOptions, jsx: bool) -> Self {
        Scanner {
            src,
            bytes: src.as_bytes(),
            file,
            options,
            jsx,
            pos: 0,
            limit: src.len(),
            frames: Vec::new(),
            prev: Prev::Start,
            chain: None,
            module_specifier_pending: false,
            next_paren_module: false,
            silent: 0,
            out: Vec::new(),
        }
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> Error {
        Error::scan(self.file, offset, message)
    }

    fn peek(&self) -> Option<u8> {
        (self.pos < self.limit).then(|| self.bytes[self.pos])
    }

    fn peek_at(&self, ahead: usize) -> Option<u8> {
        let i = self.pos + ahead;
        (i < self.limit).then(|| self.bytes[i])
    }

    fn starts_with(&self, pat: &str) -> bool {
        self.bytes[self.pos..self.limit].starts_with(pat.as_bytes())
    }

    fn find_from(&self, from: usize, pat: &str) -> Option<usize> {
        self.src[from..self.limit].find(pat).map(|i| from + i)
    }

    fn advance_char(&mut self) {
        self.pos = (self.pos + utf8_width(self.bytes[self.pos])).min(self.limit);
    }

    /// Next non-whitespace, non-comment byte at or after `from`, without consuming.
    fn significant_from(&self, mut i: usize) -> Option<u8> {
        while i < self.limit {
            match self.bytes[i] {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => i += 1,
                b'/' if self.bytes.get(i + 1) == Some(&b'/') => {
                    while i < self.limit && self.bytes[i] != b'\n' {
                        i += 1;
                    }
                }
                b'/' if self.bytes.get(i + 1) == Some(&b'*') => {
                    i = self.src[i + 2..self.limit]
                        .find("*/")
                        .map(|e| i + 2 + e + 2)
                        .unwrap_or(self.limit);
                }
                b => return Some(b),
            }
        }
        None
    }

    fn skip_trivia(&mut self) -> Result<()> {
        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => self.pos += 1,
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek_at(1) == Some(b'*') => self.skip_block_comment()?,
                _ => break,
            }
        }
        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while let Some(b) = self.peek() {
            if b == b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn skip_block_comment(&mut self) -> Result<()> {
        let start = self.pos;
        match self.find_from(self.pos + 2, "*/") {
            Some(end) => {
                self.pos = end + 2;
                Ok(())
            }
            None => Err(self.error(start, "unterminated block comment")),
        }
    }

    fn in_listed(&self) -> bool {
        self.frames.last().is_some_and(|f| f.listed)
    }

    fn in_module(&self) -> bool {
        self.frames.last().is_some_and(|f| f.module)
    }

    fn extract_allowed(&self) -> bool {
        self.options.mode == ScanMode::Extract && !self.in_listed() && !self.in_module()
    }

    fn expr_allowed(&self) -> bool {
        match self.prev {
            Prev::Start | Prev::Keyword => true,
            Prev::Punct(_) => true,
            Prev::Dot | Prev::Value => false,
        }
    }

    fn emit(&mut self, start: usize, end: usize, text: String, kind: OccurrenceKind) {
        if self.silent == 0 {
            self.out.push(TextOccurrence {
                text,
                range: Range { start, end },
                kind,
            });
        }
    }

    fn push_frame(&mut self, kind: FrameKind, callee: Option<&str>, module: bool) {
        let parent_listed = self.in_listed();
        let listed = parent_listed || callee.is_some_and(|c| self.options.is_listed(c));
        self.frames.push(Frame {
            kind,
            listed,
            module,
        });
    }

    /// Scans script code until the limit, or (with `until_brace`) until an
    /// unmatched `}` which is left unconsumed.
    fn scan_code(&mut self, until_brace: bool) -> Result<()> {
        let base = self.frames.len();
        let start = self.pos;

        while let Some(b) = self.peek() {
            match b {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => {
                    self.pos += 1;
                    continue;
                }
                b'/' if self.peek_at(1) == Some(b'/') => {
                    self.skip_line_comment();
                    continue;
                }
                b'/' if self.peek_at(1) == Some(b'*') => {
                    self.skip_block_comment()?;
                    continue;
                }
                _ => {}
            }

            if is_ident_start(b) {
                self.scan_ident()?;
                continue;
            }
            if b == b'.'
                && !self.peek_at(1).is_some_and(|n| n.is_ascii_digit())
                && !self.starts_with("...")
            {
                self.pos += 1;
                self.prev = Prev::Dot;
                continue;
            }
            if b == b'?'
                && self.peek_at(1) == Some(b'.')
                && !self.peek_at(2).is_some_and(|n| n.is_ascii_digit())
            {
                self.pos += 2;
                self.prev = Prev::Dot;
                continue;
            }

            let chain = self.chain.take();
            let callee = chain.as_ref().map(|c| c.text.clone());
            if let Some(chain) = chain {
                if self.end_chain(chain, b)? {
                    continue;
                }
            }

            match b {
                b'\'' | b'"' => self.scan_string(b)?,
                b'`' => self.scan_template()?,
                b'/' if self.expr_allowed() => self.skip_regex()?,
                b'<' if self.jsx
                    && self.expr_allowed()
                    && self
                        .peek_at(1)
                        .is_some_and(|n| n.is_ascii_alphabetic() || n == b'>')
                    && !self.type_parameters_ahead() =>
                {
                    self.scan_jsx_element()?;
                    self.prev = Prev::Value;
                }
                b'0'..=b'9' => self.skip_number(),
                b'.' => {
                    // numeric literal like `.5` or a spread `...`
                    if self.starts_with("...") {
                        self.pos += 3;
                        self.prev = Prev::Punct(b'.');
                    } else {
                        self.skip_number();
                    }
                }
                b'(' => {
                    let module = std::mem::take(&mut self.next_paren_module);
                    self.push_frame(FrameKind::Paren, callee.as_deref(), module);
                    self.pos += 1;
                    self.prev = Prev::Punct(b);
                }
                b'[' => {
                    self.push_frame(FrameKind::Bracket, None, false);
                    self.pos += 1;
                    self.prev = Prev::Punct(b);
                }
                b'{' => {
                    self.push_frame(FrameKind::Brace, None, false);
                    self.pos += 1;
                    self.prev = Prev::Punct(b);
                }
                b')' | b']' | b'}' => {
                    if self.frames.len() == base {
                        if b == b'}' && until_brace {
                            return Ok(());
                        }
                        return Err(self.error(self.pos, format!("unmatched `{}`", b as char)));
                    }
                    let expected = match b {
                        b')' => FrameKind::Paren,
                        b']' => FrameKind::Bracket,
                        _ => FrameKind::Brace,
                    };
                    let frame = self.frames.pop();
                    if frame.map(|f| f.kind) != Some(expected) {
                        return Err(self.error(self.pos, format!("mismatched `{}`", b as char)));
                    }
                    self.pos += 1;
                    self.prev = if b == b'}' { Prev::Punct(b) } else { Prev::Value };
                }
                b'+' | b'-' if self.peek_at(1) == Some(b) => {
                    // `x++ / 2` divides; `++x` is followed by an operand anyway
                    self.pos += 2;
                    self.prev = Prev::Value;
                }
                b';' => {
                    self.module_specifier_pending = false;
                    self.pos += 1;
                    self.prev = Prev::Punct(b);
                }
                _ => {
                    self.advance_char();
                    self.prev = Prev::Punct(b);
                }
            }
        }

        if let Some(chain) = self.chain.take() {
            self.end_chain(chain, 0)?;
        }
        if self.frames.len() > base {
            self.frames.truncate(base);
            return Err(self.error(start, "unclosed bracket"));
        }
        if until_brace {
            return Err(self.error(start, "unterminated expression"));
        }
        Ok(())
    }

    fn read_ident(&mut self) -> (usize, usize) {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !is_ident_continue(b) {
                break;
            }
            self.advance_char();
        }
        (start, self.pos)
    }

    fn scan_ident(&mut self) -> Result<()> {
        let src = self.src;
        let after_dot = self.prev == Prev::Dot;
        if !after_dot {
            if let Some(chain) = self.chain.take() {
                // Two adjacent identifiers: the previous chain ends here.
                self.end_chain(chain, self.bytes[self.pos])?;
            }
        }
        let (start, end) = self.read_ident();
        let word = &src[start..end];

        match (&mut self.chain, after_dot) {
            (Some(chain), true) => {
                chain.text.push('.');
                chain.text.push_str(word);
                chain.end = end;
            }
            _ => {
                self.chain = Some(Chain {
                    start,
                    end,
                    text: word.to_string(),
                });
            }
        }

        if !after_dot {
            let next = self.significant_from(end);
            match word {
                "import" if next != Some(b'.') => {
                    if next == Some(b'(') {
                        self.next_paren_module = true;
                    } else {
                        self.module_specifier_pending = true;
                    }
                }
                "require" if next == Some(b'(') => self.next_paren_module = true,
                "from" if matches!(next, Some(b'\'') | Some(b'"')) => {
                    self.module_specifier_pending = true
                }
                _ => {}
            }
        }

        self.prev = if !after_dot && EXPR_KEYWORDS.contains(&word) {
            Prev::Keyword
        } else {
            Prev::Value
        };
        Ok(())
    }

    /// Called when a member chain like `I18N.home.title` is followed by `next`.
    /// Returns `true` if it consumed input (an `I18N.get(…)` call).
    fn end_chain(&mut self, chain: Chain, next: u8) -> Result<bool> {
        if self.options.mode != ScanMode::Restore || !self.in_listed() {
            return Ok(false);
        }
        let get_callee = format!("{KEY_ROOT}.get");
        let root_prefix = format!("{KEY_ROOT}.");

        if next == b'(' && chain.text == get_callee {
            let save = (self.pos, self.prev);
            if let Some((key, values)) = self.parse_key_call() {
                let end = self.pos;
                self.emit(chain.start, end, key, OccurrenceKind::KeyCall { values });
                self.prev = Prev::Value;
                return Ok(true);
            }
            (self.pos, self.prev) = save;
            return Ok(false);
        }

        if next != b'(' && chain.text.starts_with(&root_prefix) {
            self.emit(chain.start, chain.end, chain.text, OccurrenceKind::KeyReference);
        }
        Ok(false)
    }

    /// Parses `(I18N.a.b, { val1: expr, … })` starting at `(`.
    fn parse_key_call(&mut self) -> Option<(String, Vec<(String, String)>)> {
        self.pos += 1;
        self.skip_trivia().ok()?;

        let mut key = String::new();
        loop {
            let (s, e) = self.read_ident();
            if s == e {
                return None;
            }
            key.push_str(&self.src[s..e]);
            self.skip_trivia().ok()?;
            if self.peek() == Some(b'.') {
                self.pos += 1;
                key.push('.');
                self.skip_trivia().ok()?;
            } else {
                break;
            }
        }
        if !key.starts_with(&format!("{KEY_ROOT}.")) {
            return None;
        }

        let mut values = Vec::new();
        if self.peek() == Some(b',') {
            self.pos += 1;
            self.skip_trivia().ok()?;
            if self.peek() == Some(b'{') {
                self.pos += 1;
                loop {
                    self.skip_trivia().ok()?;
                    match self.peek()? {
                        b'}' => {
                            self.pos += 1;
                            break;
                        }
                        b'\'' | b'"' => {
                            let quote = self.bytes[self.pos];
                            let (s, e) = self.read_string_span(quote).ok()?;
                            let name = cook(&self.src[s + 1..e - 1]);
                            values.push((name, String::new()));
                        }
                        _ => {
                            let (s, e) = self.read_ident();
                            if s == e {
                                return None;
                            }
                            values.push((self.src[s..e].to_string(), String::new()));
                        }
                    }
                    self.skip_trivia().ok()?;
                    if self.peek() != Some(b':') {
                        return None;
                    }
                    self.pos += 1;
                    let expr_start = self.pos;
                    self.skip_expression(&[b',', b'}']).ok()?;
                    let expr = self.src[expr_start..self.pos].trim().to_string();
                    if let Some(last) = values.last_mut() {
                        last.1 = expr;
                    }
                    if self.peek() == Some(b',') {
                        self.pos += 1;
                    }
                }
                self.skip_trivia().ok()?;
            }
            if self.peek() == Some(b',') {
                self.pos += 1;
                self.skip_trivia().ok()?;
            }
        }
        if self.peek() != Some(b')') {
            return None;
        }
        self.pos += 1;
        Some((key, values))
    }

    /// Skips a balanced expression up to (not including) one of `stops` at depth zero.
    fn skip_expression(&mut self, stops: &[u8]) -> Result<()> {
        let start = self.pos;
        let saved = (self.prev, self.chain.take());
        self.silent += 1;
        let mut depth = 0usize;
        let result = loop {
            let Some(b) = self.peek() else {
                break Err(self.error(start, "unterminated expression"));
            };
            match b {
                b'/' if self.peek_at(1) == Some(b'/') => self.skip_line_comment(),
                b'/' if self.peek_at(1) == Some(b'*') => {
                    if let Err(e) = self.skip_block_comment() {
                        break Err(e);
                    }
                }
                b'\'' | b'"' => {
                    if let Err(e) = self.read_string_span(b) {
                        break Err(e);
                    }
                }
                b'`' => {
                    if let Err(e) = self.scan_template() {
                        break Err(e);
                    }
                }
                b'(' | b'[' | b'{' => {
                    depth += 1;
                    self.pos += 1;
                }
                b')' | b']' | b'}' if depth > 0 => {
                    depth -= 1;
                    self.pos += 1;
                }
                _ if depth == 0 && stops.contains(&b) => break Ok(()),
                b')' | b']' | b'}' => break Err(self.error(self.pos, "unbalanced expression")),
                _ => self.advance_char(),
            }
        };
        self.silent -= 1;
        (self.prev, self.chain) = saved;
        result
    }

    /// Reads a quoted string at `pos` and returns its span including quotes.
    fn read_string_span(&mut self, quote: u8) -> Result<(usize, usize)> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(self.error(start, "unterminated string literal")),
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek().is_some() {
                        self.advance_char();
                    }
                }
                Some(b) if b == quote => {
                    self.pos += 1;
                    return Ok((start, self.pos));
                }
                Some(_) => self.advance_char(),
            }
        }
    }

    fn scan_string(&mut self, quote: u8) -> Result<()> {
        let prev = self.prev;
        let (start, end) = self.read_string_span(quote)?;
        self.prev = Prev::Value;

        if std::mem::take(&mut self.module_specifier_pending) || !self.extract_allowed() {
            return Ok(());
        }
        let is_property_key = matches!(prev, Prev::Punct(b'{') | Prev::Punct(b','))
            && self.frames.last().is_some_and(|f| f.kind == FrameKind::Brace)
            && self.significant_from(end) == Some(b':');
        if is_property_key {
            return Ok(());
        }

        let text = cook(&self.src[start + 1..end - 1]);
        if contains_chinese(&text) {
            self.emit(start, end, text, OccurrenceKind::StringLiteral);
        }
        Ok(())
    }

    fn scan_template(&mut self) -> Result<()> {
        let src = self.src;
        let start = self.pos;
        let outer = (self.prev, self.chain.take());
        self.pos += 1;

        let mut quasis: Vec<&'a str> = Vec::new();
        let mut exprs: Vec<(usize, usize)> = Vec::new();
        let mut quasi_start = self.pos;
        loop {
            match self.peek() {
                None => return Err(self.error(start, "unterminated template literal")),
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek().is_some() {
                        self.advance_char();
                    }
                }
                Some(b'`') => {
                    quasis.push(&src[quasi_start..self.pos]);
                    self.pos += 1;
                    break;
                }
                Some(b'$') if self.peek_at(1) == Some(b'{') => {
                    quasis.push(&src[quasi_start..self.pos]);
                    self.pos += 2;
                    let expr_start = self.pos;
                    let saved_prev = self.prev;
                    self.prev = Prev::Start;
                    self.silent += 1;
                    let scanned = self.scan_code(true);
                    self.silent -= 1;
                    self.prev = saved_prev;
                    scanned?;
                    exprs.push((expr_start, self.pos));
                    self.pos += 1;
                    quasi_start = self.pos;
                }
                Some(_) => self.advance_char(),
            }
        }
        let end = self.pos;
        (self.prev, self.chain) = outer;
        self.prev = Prev::Value;

        let cooked: Vec<String> = quasis.iter().map(|q| cook(q)).collect();
        let is_specifier = std::mem::take(&mut self.module_specifier_pending);
        if !is_specifier && self.extract_allowed() && cooked.iter().any(|q| contains_chinese(q)) {
            let mut text = String::new();
            for (i, quasi) in cooked.iter().enumerate() {
                text.push_str(quasi);
                if i < exprs.len() {
                    text.push_str(&format!("{{val{}}}", i + 1));
                }
            }
            let expressions = exprs
                .iter()
                .map(|&(s, e)| src[s..e].trim().to_string())
                .collect();
            self.emit(start, end, text, OccurrenceKind::TemplateLiteral { expressions });
            return Ok(());
        }

        if self.silent == 0 {
            // No Chinese in the template's own text: its interpolations are ordinary code.
            let saved = (self.pos, self.limit, self.prev);
            for (s, e) in exprs {
                self.pos = s;
                self.limit = e;
                self.prev = Prev::Start;
                self.scan_code(false)?;
            }
            (self.pos, self.limit, self.prev) = saved;
        }
        Ok(())
    }

    fn skip_regex(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        let mut in_class = false;
        loop {
            match self.peek() {
                None | Some(b'\n') => return Err(self.error(start, "unterminated regex literal")),
                Some(b'\\') => {
                    self.pos += 1;
                    if self.peek().is_some() {
                        self.advance_char();
                    }
                }
                Some(b'[') => {
                    in_class = true;
                    self.pos += 1;
                }
                Some(b']') => {
                    in_class = false;
                    self.pos += 1;
                }
                Some(b'/') if !in_class => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.advance_char(),
            }
        }
        while self.peek().is_some_and(|b| b.is_ascii_alphabetic()) {
            self.pos += 1;
        }
        self.prev = Prev::Value;
        Ok(())
    }

    fn skip_number(&mut self) {
        while self
            .peek()
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_')
        {
            self.pos += 1;
        }
        self.prev = Prev::Value;
    }

    /// `<T,` or `<T extends …` at `pos`: generic arrow parameters, not a JSX tag.
    fn type_parameters_ahead(&self) -> bool {
        let name_start = self.pos + 1;
        let mut i = name_start;
        while i < self.limit && is_ident_continue(self.bytes[i]) {
            i += 1;
        }
        if i == name_start {
            return false;
        }
        let name_end = i;
        while i < self.limit && self.bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < self.limit && self.bytes[i] == b',' {
            return true;
        }
        i > name_end
            && self.src[i..self.limit].starts_with("extends")
            && self.bytes[..self.limit]
                .get(i + "extends".len())
                .is_some_and(|b| b.is_ascii_whitespace())
    }

    /// Scans a JSX element (or fragment) starting at `<`.
    fn scan_jsx_element(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;

        if self.peek() != Some(b'>') {
            while self
                .peek()
                .is_some_and(|b| is_ident_continue(b) || matches!(b, b'.' | b'-' | b':'))
            {
                self.advance_char();
            }
            // attributes
            loop {
                self.skip_trivia()?;
                match self.peek() {
                    None => return Err(self.error(start, "unterminated JSX tag")),
                    Some(b'/') if self.peek_at(1) == Some(b'>') => {
                        self.pos += 2;
                        return Ok(());
                    }
                    Some(b'>') => break,
                    Some(b'{') => self.scan_jsx_expression()?,
                    Some(_) => self.scan_jsx_attribute()?,
                }
            }
        }
        self.pos += 1;

        // children
        loop {
            match self.peek() {
                None => return Err(self.error(start, "unterminated JSX element")),
                Some(b'<') if self.peek_at(1) == Some(b'/') => {
                    match self.find_from(self.pos, ">") {
                        Some(close) => self.pos = close + 1,
                        None => return Err(self.error(self.pos, "unterminated JSX closing tag")),
                    }
                    return Ok(());
                }
                Some(b'<') => self.scan_jsx_element()?,
                Some(b'{') => self.scan_jsx_expression()?,
                Some(_) => {
                    let src = self.src;
                    let text_start = self.pos;
                    while self.peek().is_some_and(|b| b != b'<' && b != b'{') {
                        self.advance_char();
                    }
                    let (s, e) = trimmed_range(src, text_start, self.pos);
                    let text = &src[s..e];
                    if self.extract_allowed() && contains_chinese(text) {
                        self.emit(s, e, text.to_string(), OccurrenceKind::JsxText);
                    }
                }
            }
        }
    }

    fn scan_jsx_expression(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        let saved = (self.prev, self.chain.take());
        self.prev = Prev::Start;
        self.scan_code(true)?;
        (self.prev, self.chain) = saved;
        if self.peek() != Some(b'}') {
            return Err(self.error(start, "unterminated JSX expression"));
        }
        self.pos += 1;
        Ok(())
    }

    fn scan_jsx_attribute(&mut self) -> Result<()> {
        let name_start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/' | b'{'))
        {
            self.advance_char();
        }
        if self.pos == name_start {
            return Err(self.error(name_start, "malformed JSX attribute"));
        }
        self.skip_trivia()?;
        if self.peek() != Some(b'=') {
            return Ok(());
        }
        self.pos += 1;
        self.skip_trivia()?;
        match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                let src = self.src;
                let start = self.pos;
                let close = self
                    .find_from(self.pos + 1, if q == b'"' { "\"" } else { "'" })
                    .ok_or_else(|| self.error(start, "unterminated JSX attribute"))?;
                self.pos = close + 1;
                let text = &src[start + 1..close];
                if self.extract_allowed() && contains_chinese(text) {
                    self.emit(start, self.pos, text.to_string(), OccurrenceKind::JsxAttribute);
                }
                Ok(())
            }
            Some(b'{') => self.scan_jsx_expression(),
            Some(b'<') => self.scan_jsx_element(),
            _ => Err(self.error(self.pos, "malformed JSX attribute value")),
        }
    }

    fn scan_vue(&mut self) -> Result<()> {
        let blocks = vue_blocks(self.src);
        if let Some(template) = blocks.template {
            self.limit = template.end;
            self.pos = template.start;
            self.scan_vue_markup()?;
        }
        for script in blocks.scripts {
            self.limit = script.end;
            self.pos = script.start;
            self.prev = Prev::Start;
            self.jsx = script.jsx;
            self.scan_code(false)?;
        }
        self.limit = self.src.len();
        Ok(())
    }

    /// Scans `src[start..end]` as script code (a Vue binding or interpolation).
    fn scan_code_range(&mut self, start: usize, end: usize) -> Result<()> {
        let saved = (self.pos, self.limit, self.prev);
        self.pos = start;
        self.limit = end;
        self.prev = Prev::Start;
        let result = self.scan_code(false);
        (self.pos, self.limit, self.prev) = saved;
        result
    }

    fn scan_vue_markup(&mut self) -> Result<()> {
        while let Some(b) = self.peek() {
            if self.starts_with("<!--") {
                let start = self.pos;
                let end = self
                    .find_from(self.pos + 4, "-->")
                    .ok_or_else(|| self.error(start, "unterminated HTML comment"))?;
                self.pos = end + 3;
            } else if self.starts_with("</") {
                let start = self.pos;
                let end = self
                    .find_from(self.pos, ">")
                    .ok_or_else(|| self.error(start, "unterminated closing tag"))?;
                self.pos = end + 1;
            } else if b == b'<' && self.peek_at(1).is_some_and(|n| n.is_ascii_alphabetic()) {
                self.scan_vue_tag()?;
            } else if self.starts_with("{{") {
                let start = self.pos;
                let end = self
                    .find_from(self.pos + 2, "}}")
                    .ok_or_else(|| self.error(start, "unterminated interpolation"))?;
                self.scan_code_range(start + 2, end)?;
                self.pos = end + 2;
            } else {
                let src = self.src;
                let text_start = self.pos;
                // a stray `<` that opens no tag is plain text
                self.advance_char();
                while self.peek().is_some_and(|b| b != b'<') && !self.starts_with("{{") {
                    self.advance_char();
                }
                let (s, e) = trimmed_range(src, text_start, self.pos);
                let text = &src[s..e];
                if self.extract_allowed() && contains_chinese(text) {
                    self.emit(s, e, text.to_string(), OccurrenceKind::VueText);
                }
            }
        }
        Ok(())
    }

    fn scan_vue_tag(&mut self) -> Result<()> {
        let start = self.pos;
        self.pos += 1;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && b != b'>' && b != b'/')
        {
            self.advance_char();
        }
        loop {
            while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
                self.pos += 1;
            }
            match self.peek() {
                None => return Err(self.error(start, "unterminated tag")),
                Some(b'>') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'/') => self.pos += 1,
                Some(_) => self.scan_vue_attribute()?,
            }
        }
    }

    fn scan_vue_attribute(&mut self) -> Result<()> {
        let src = self.src;
        let name_start = self.pos;
        while self
            .peek()
            .is_some_and(|b| !b.is_ascii_whitespace() && !matches!(b, b'=' | b'>' | b'/'))
        {
            self.advance_char();
        }
        let name_end = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        if self.peek() != Some(b'=') {
            if name_end == name_start {
                // stray character inside a tag
                self.advance_char();
            }
            return Ok(());
        }
        self.pos += 1;
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }

        let (value_start, value_end, after) = match self.peek() {
            Some(q @ (b'"' | b'\'')) => {
                let close = self
                    .find_from(self.pos + 1, if q == b'"' { "\"" } else { "'" })
                    .ok_or_else(|| self.error(self.pos, "unterminated attribute value"))?;
                (self.pos + 1, close, close + 1)
            }
            _ => {
                let s = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| !b.is_ascii_whitespace() && b != b'>')
                {
                    self.advance_char();
                }
                (s, self.pos, self.pos)
            }
        };

        let name = &src[name_start..name_end];
        if name.starts_with(':') || name.starts_with('@') || name.starts_with('#') || name.starts_with("v-") {
            self.scan_code_range(value_start, value_end)?;
        } else {
            let text = &src[value_start..value_end];
            if self.extract_allowed() && contains_chinese(text) {
                self.emit(
                    name_start,
                    after,
                    text.to_string(),
                    OccurrenceKind::VueAttribute {
                        name: name.to_string(),
                    },
                );
            }
        }
        self.pos = after;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
struct Block {
    start: usize,
    end: usize,
    jsx: bool,
}

#[derive(Debug, Default)]
struct VueBlocks {
    template: Option<Block>,
    scripts: Vec<Block>,
}

/// Locates the root `<template>` content and each `<script>` content of a Vue SFC.
fn vue_blocks(src: &str) -> VueBlocks {
    let mut blocks = VueBlocks::default();

    if let Some(open) = src.find("<template") {
        if let (Some(gt), Some(close)) = (src[open..].find('>'), src.rfind("</template>")) {
            let start = open + gt + 1;
            if start <= close {
                blocks.template = Some(Block {
                    start,
                    end: close,
                    jsx: false,
                });
            }
        }
    }

    let mut from = 0;
    while let Some(i) = src[from..].find("<script") {
        let open = from + i;
        if blocks
            .template
            .is_some_and(|t| open >= t.start && open < t.end)
        {
            from = open + 7;
            continue;
        }
        let Some(gt) = src[open..].find('>') else { break };
        let tag = &src[open..open + gt];
        let start = open + gt + 1;
        let Some(close) = src[start..].find("</script>") else { break };
        blocks.scripts.push(Block {
            start,
            end: start + close,
            jsx: tag.contains("tsx") || tag.contains("jsx"),
        });
        from = start + close + "</script>".len();
    }
    blocks
}
