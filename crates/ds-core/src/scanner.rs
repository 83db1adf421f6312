//! Project scanning and dependency extraction
//!
//! Walks a directory tree of `.sql` definition files and reconstructs the
//! reference graph from three marker shapes in the raw text:
//!
//! - `ref("model_name")` — dependency on another model
//! - `source("group", "table")` — dependency on an external raw table
//! - `config(key=value, ...)` — inline key/value configuration
//!
//! Extraction is a character-level state machine, not a set of regular
//! expressions: markers inside line comments (`--`), block comments
//! (`/* */`), and string literals are ignored, and nested quotes cannot
//! produce pathological matches.

use crate::error::{CoreError, CoreResult};
use crate::model::{ConfigValue, ModelGraph, ModelNode, SourceRef};
use crate::name::ModelName;
use std::collections::BTreeMap;
use std::path::Path;

/// Everything extracted from one definition file.
#[derive(Debug, Default, PartialEq)]
pub struct Extraction {
    pub refs: Vec<ModelName>,
    pub sources: Vec<SourceRef>,
    pub config: BTreeMap<String, ConfigValue>,
}

/// Scan a project directory into a [`ModelGraph`].
///
/// Files that cannot be read or parsed are logged and skipped; the scan as
/// a whole only fails when the root directory itself is unusable.
pub fn scan_project(root: &Path) -> CoreResult<ModelGraph> {
    if !root.exists() {
        return Err(CoreError::ProjectNotFound {
            path: root.display().to_string(),
        });
    }

    let mut nodes = Vec::new();
    walk_sql_files(root, root, &mut nodes)?;
    // Directory iteration order is platform-dependent; fix it here.
    nodes.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));
    Ok(ModelGraph::from_nodes(nodes))
}

fn walk_sql_files(root: &Path, dir: &Path, nodes: &mut Vec<ModelNode>) -> CoreResult<()> {
    for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
        path: dir.display().to_string(),
        source: e,
    })? {
        let entry = entry.map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })?;
        let path = entry.path();
        if path.is_dir() {
            walk_sql_files(root, &path, nodes)?;
            continue;
        }
        if !path.extension().is_some_and(|e| e == "sql") {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            log::warn!("Skipping {}: non-UTF-8 file name", path.display());
            continue;
        };
        let raw_text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };

        match extract_markers(name, &raw_text) {
            Ok(extraction) => {
                let rel_path = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                nodes.push(ModelNode {
                    name: ModelName::new(name),
                    path: path.clone(),
                    rel_path,
                    raw_text,
                    refs: extraction.refs,
                    sources: extraction.sources,
                    config: extraction.config,
                });
            }
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
            }
        }
    }
    Ok(())
}

/// Extract `ref` / `source` / `config` markers from raw definition text.
pub fn extract_markers(name: &str, text: &str) -> CoreResult<Extraction> {
    let mut cursor = Cursor::new(name, text);
    let mut out = Extraction::default();

    while let Some(c) = cursor.peek() {
        match c {
            '-' if cursor.peek_at(1) == Some('-') => cursor.skip_line_comment(),
            '/' if cursor.peek_at(1) == Some('*') => cursor.skip_block_comment(),
            '\'' | '"' => {
                cursor.skip_string(c);
            }
            c if is_ident_start(c) => {
                let ident = cursor.read_identifier();
                match ident.as_str() {
                    "ref" => {
                        if let Some(args) = cursor.try_call_args(1)? {
                            out.refs.push(ModelName::new(args.into_iter().next().unwrap()));
                        }
                    }
                    "source" => {
                        if let Some(args) = cursor.try_call_args(2)? {
                            let mut it = args.into_iter();
                            out.sources.push(SourceRef {
                                source: it.next().unwrap(),
                                table: it.next().unwrap(),
                            });
                        }
                    }
                    "config" => {
                        if let Some(pairs) = cursor.try_config_args()? {
                            out.config.extend(pairs);
                        }
                    }
                    _ => {}
                }
            }
            _ => {
                cursor.bump();
            }
        }
    }

    Ok(out)
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Character cursor over one definition file.
struct Cursor<'a> {
    name: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(name: &'a str, text: &str) -> Self {
        Self {
            name,
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.pos += 1;
        }
        c
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn skip_block_comment(&mut self) {
        self.pos += 2; // consume "/*"
        while let Some(c) = self.bump() {
            if c == '*' && self.peek() == Some('/') {
                self.bump();
                break;
            }
        }
    }

    /// Skip a quoted literal, honoring SQL-style doubled-quote escapes.
    fn skip_string(&mut self, quote: char) {
        self.bump(); // opening quote
        while let Some(c) = self.bump() {
            if c == quote {
                if self.peek() == Some(quote) {
                    self.bump(); // escaped quote, keep going
                } else {
                    break;
                }
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if is_ident_continue(c) {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        ident
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    /// Read a quoted string argument, returning its unquoted content.
    fn read_string_arg(&mut self) -> CoreResult<String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            other => {
                return Err(self.parse_error(format!(
                    "expected quoted string, found {:?}",
                    other
                )))
            }
        };
        self.bump();
        let mut value = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => {
                    if self.peek() == Some(quote) {
                        value.push(quote);
                        self.bump();
                    } else {
                        return Ok(value);
                    }
                }
                Some(c) => value.push(c),
                None => return Err(self.parse_error("unterminated string literal".into())),
            }
        }
    }

    /// If the cursor sits on a call's opening paren, read exactly `arity`
    /// quoted-string arguments. Returns `None` when the identifier was not
    /// followed by `(` (a plain word, not a marker).
    fn try_call_args(&mut self, arity: usize) -> CoreResult<Option<Vec<String>>> {
        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Ok(None);
        }
        self.bump();

        let mut args = Vec::with_capacity(arity);
        for i in 0..arity {
            self.skip_whitespace();
            args.push(self.read_string_arg()?);
            self.skip_whitespace();
            if i + 1 < arity {
                if self.peek() != Some(',') {
                    return Err(self.parse_error("expected ',' between arguments".into()));
                }
                self.bump();
            }
        }
        self.skip_whitespace();
        if self.peek() != Some(')') {
            return Err(self.parse_error("expected ')' after arguments".into()));
        }
        self.bump();
        Ok(Some(args))
    }

    /// Parse a `config(key=value, ...)` argument list with the restricted
    /// key=value grammar. Returns `None` when `config` was a plain word.
    fn try_config_args(&mut self) -> CoreResult<Option<Vec<(String, ConfigValue)>>> {
        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Ok(None);
        }
        self.bump();

        let mut pairs = Vec::new();
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(')') => {
                    self.bump();
                    break;
                }
                Some(c) if is_ident_start(c) => {
                    let key = self.read_identifier();
                    self.skip_whitespace();
                    if self.peek() != Some('=') {
                        return Err(self.parse_error(format!("expected '=' after key '{key}'")));
                    }
                    self.bump();
                    self.skip_whitespace();
                    let raw = self.read_config_value()?;
                    pairs.push((key, ConfigValue::parse(&raw)));
                    self.skip_whitespace();
                    if self.peek() == Some(',') {
                        self.bump();
                    }
                }
                other => {
                    return Err(self.parse_error(format!(
                        "unexpected {:?} in config block",
                        other
                    )))
                }
            }
        }
        Ok(Some(pairs))
    }

    /// Read one config value token: a quoted string (returned with its
    /// quotes so type recognition can tell it apart from a bareword) or a
    /// bare token up to the next `,` or `)`.
    fn read_config_value(&mut self) -> CoreResult<String> {
        match self.peek() {
            Some(q @ ('\'' | '"')) => {
                let inner = self.read_string_arg()?;
                Ok(format!("{q}{inner}{q}"))
            }
            Some(_) => {
                let mut raw = String::new();
                while let Some(c) = self.peek() {
                    if c == ',' || c == ')' {
                        break;
                    }
                    raw.push(c);
                    self.pos += 1;
                }
                let raw = raw.trim().to_string();
                if raw.is_empty() {
                    return Err(self.parse_error("empty config value".into()));
                }
                Ok(raw)
            }
            None => Err(self.parse_error("unterminated config block".into())),
        }
    }

    fn parse_error(&self, message: String) -> CoreError {
        CoreError::ModelParseError {
            name: self.name.to_string(),
            message,
        }
    }
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod tests;
