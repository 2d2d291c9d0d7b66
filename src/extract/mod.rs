//! Token extraction and keyword ranking
//!
//! Parses a Python snippet with tree-sitter and walks the syntax tree
//! collecting candidate topic tokens: imported names, called
//! function/method names, attribute accesses, and standalone identifier
//! uses. String literals and comments are additionally scanned against the
//! known keyword vocabulary, longest keywords first, so keywords mentioned
//! only in documentation are still recovered.
//!
//! Extraction never fails: malformed input simply contributes an empty
//! syntax-tree token set, and the literal scan still runs over the raw
//! text.

use crate::store::KeywordEntry;
use regex::Regex;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tree_sitter::{Language, Node, Parser};

/// Generic builtin and common names that carry no topical signal
const STOPLIST: &[&str] = &[
    "print", "str", "len", "list", "dict", "int", "float", "range", "enumerate", "self", "cls",
];

/// Extractor configuration
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Tokens starting with any of these prefixes are treated as
    /// self-referential and dropped
    pub self_prefixes: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            self_prefixes: vec!["didact".to_string()],
        }
    }
}

/// Collects candidate topic tokens from Python source text
pub struct KeywordExtractor {
    language: Language,
    string_re: Regex,
    comment_re: Regex,
    config: ExtractorConfig,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordExtractor {
    /// Create an extractor with the default configuration
    pub fn new() -> Self {
        Self::with_config(ExtractorConfig::default())
    }

    /// Create an extractor with a specific configuration
    pub fn with_config(config: ExtractorConfig) -> Self {
        Self {
            language: tree_sitter_python::LANGUAGE.into(),
            string_re: Regex::new(r#"["']([^"']+)["']"#).expect("string literal pattern"),
            comment_re: Regex::new(r"(?m)#.*$").expect("comment pattern"),
            config,
        }
    }

    /// Extract the deduplicated candidate token set from a snippet.
    ///
    /// `vocabulary` is the known keyword list sorted longest first; it
    /// drives the substring scan over string literals and comments.
    pub fn extract(&self, code: &str, vocabulary: &[String]) -> HashSet<String> {
        let mut tokens = self.collect_syntax_tokens(code);
        tokens.extend(self.scan_literals(code, vocabulary));
        tokens.retain(|t| self.keep_token(t));
        tokens
    }

    /// Walk the syntax tree collecting imports, call names, attribute
    /// names, and identifiers. A failed parse yields the empty set.
    fn collect_syntax_tokens(&self, code: &str) -> HashSet<String> {
        let mut tokens = HashSet::new();

        let mut parser = Parser::new();
        if parser.set_language(&self.language).is_err() {
            return tokens;
        }
        let Some(tree) = parser.parse(code, None) else {
            return tokens;
        };

        collect_from_node(tree.root_node(), code.as_bytes(), &mut tokens);
        tokens
    }

    /// Scan string literals and comments for known keywords, longest first
    fn scan_literals(&self, code: &str, vocabulary: &[String]) -> HashSet<String> {
        let mut tokens = HashSet::new();

        for capture in self.string_re.captures_iter(code) {
            if let Some(text) = capture.get(1) {
                scan_text(text.as_str(), vocabulary, &mut tokens);
            }
        }
        for matched in self.comment_re.find_iter(code) {
            scan_text(matched.as_str(), vocabulary, &mut tokens);
        }

        tokens
    }

    /// Filter out self-referential, builtin, and non-identifier tokens
    fn keep_token(&self, token: &str) -> bool {
        let is_self = self
            .config
            .self_prefixes
            .iter()
            .any(|prefix| token.starts_with(prefix.as_str()));
        !is_self && !STOPLIST.contains(&token) && is_valid_identifier(token)
    }
}

/// Rank candidate tokens against the keyword mapping: survivors are the
/// intersection with the mapping key set, ordered by declared weight
/// descending, equal weights alphabetical.
pub fn rank_keywords(
    tokens: &HashSet<String>,
    mapping: &HashMap<String, KeywordEntry>,
) -> Vec<String> {
    let mut ranked: Vec<(&String, f64)> = tokens
        .iter()
        .filter_map(|token| mapping.get(token).map(|entry| (token, entry.weight)))
        .collect();

    ranked.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    ranked.into_iter().map(|(token, _)| token.clone()).collect()
}

fn collect_from_node(node: Node, src: &[u8], tokens: &mut HashSet<String>) {
    match node.kind() {
        "import_statement" => {
            collect_import_names(node, src, tokens);
        }
        "import_from_statement" => {
            if let Some(module) = node.child_by_field_name("module_name") {
                push_text(module, src, tokens);
            }
            collect_import_names(node, src, tokens);
        }
        "call" => {
            if let Some(function) = node.child_by_field_name("function") {
                match function.kind() {
                    "identifier" => push_text(function, src, tokens),
                    "attribute" => {
                        if let Some(attr) = function.child_by_field_name("attribute") {
                            push_text(attr, src, tokens);
                        }
                    }
                    _ => {}
                }
            }
        }
        "attribute" => {
            if let Some(attr) = node.child_by_field_name("attribute") {
                push_text(attr, src, tokens);
            }
        }
        "identifier" => {
            push_text(node, src, tokens);
        }
        _ => {}
    }

    for i in 0..node.child_count() as u32 {
        if let Some(child) = node.child(i) {
            collect_from_node(child, src, tokens);
        }
    }
}

/// Collect the `name` fields of an import statement; aliased imports
/// contribute the imported name, not the alias.
fn collect_import_names(node: Node, src: &[u8], tokens: &mut HashSet<String>) {
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        match child.kind() {
            "aliased_import" => {
                if let Some(name) = child.child_by_field_name("name") {
                    push_text(name, src, tokens);
                }
            }
            _ => push_text(child, src, tokens),
        }
    }
}

fn push_text(node: Node, src: &[u8], tokens: &mut HashSet<String>) {
    if let Ok(text) = node.utf8_text(src) {
        if !text.is_empty() {
            tokens.insert(text.to_string());
        }
    }
}

fn scan_text(text: &str, vocabulary: &[String], tokens: &mut HashSet<String>) {
    for keyword in vocabulary {
        if text.contains(keyword.as_str()) {
            tokens.insert(keyword.clone());
        }
    }
}

/// Python identifier validity: leading alphabetic or underscore, the rest
/// alphanumeric or underscore.
fn is_valid_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}
