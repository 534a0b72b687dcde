//! Reverse extraction: recover a structural model from raw source text.
//!
//! One extractor per source language, all behind [`SourceExtractor`].
//! Extraction is lexical and best-effort — regex heuristics over declaration
//! keywords and doc-comment conventions, not a full parser. "No match" is a
//! normal outcome, never an error, and inaccuracy in one language's
//! heuristics cannot leak into another's.

mod go;
mod java;
mod python;
mod rust_lang;
mod typescript;

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use go::GoExtractor;
pub use java::JavaExtractor;
pub use python::PythonExtractor;
pub use rust_lang::RustExtractor;
pub use typescript::TypeScriptExtractor;

use crate::pseudo_types::TargetLanguage;
use crate::spec_model::{Field, Param, TypeDefKind};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("No extractor for language: {0}")]
    UnsupportedLanguage(String),
    #[error("No recognized source files under '{0}'")]
    NoSourceFiles(String),
}

/// A type recovered from source, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedType {
    pub name: String,
    pub kind: TypeDefKind,
    #[serde(default)]
    pub description: String,
    /// Field types are already mapped back to pseudo-types.
    pub fields: Vec<Field>,
    #[serde(rename = "sourceFile")]
    pub source_file: String,
    #[serde(rename = "lineNumber")]
    pub line_number: usize,
}

/// A function recovered from source, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedFunction {
    pub name: String,
    pub params: Vec<Param>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    /// Doc-comment text attributed to the declaration, tag lines stripped.
    #[serde(default)]
    pub description: String,
    /// Raw signature line, kept for parity fix hints.
    #[serde(default)]
    pub signature: String,
    #[serde(rename = "sourceFile")]
    pub source_file: String,
    #[serde(rename = "lineNumber")]
    pub line_number: usize,
}

/// A test case recovered from source, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedTest {
    /// Test identifier as written in source.
    pub name: String,
    /// Human-readable name of the function under test, inferred from the
    /// test identifier.
    pub function: String,
    #[serde(rename = "sourceFile")]
    pub source_file: String,
    #[serde(rename = "lineNumber")]
    pub line_number: usize,
}

/// Common contract every language extractor implements. All methods take
/// whole-file content plus the file's path relative to the scanned root.
pub trait SourceExtractor {
    fn extract_types(&self, content: &str, file: &str) -> Vec<ExtractedType>;
    fn extract_functions(&self, content: &str, file: &str) -> Vec<ExtractedFunction>;
    fn extract_tests(&self, content: &str, file: &str) -> Vec<ExtractedTest>;
    /// Package/module-level description, if the file opens with one.
    fn extract_package_description(&self, content: &str) -> Option<String>;
    /// Reverse of the pseudo-type mapper: concrete source type ->
    /// pseudo-type, with container recursion and identity fallback.
    fn map_type(&self, concrete: &str) -> String;
}

/// The closed set of extractors, dispatched by explicit language tag.
pub struct Extractors {
    python: PythonExtractor,
    typescript: TypeScriptExtractor,
    go: GoExtractor,
    rust: RustExtractor,
    java: JavaExtractor,
}

impl Extractors {
    pub fn new() -> Self {
        Self {
            python: PythonExtractor::new(),
            typescript: TypeScriptExtractor::new(),
            go: GoExtractor::new(),
            rust: RustExtractor::new(),
            java: JavaExtractor::new(),
        }
    }

    pub fn for_language(&self, lang: TargetLanguage) -> &dyn SourceExtractor {
        match lang {
            TargetLanguage::Python => &self.python,
            TargetLanguage::TypeScript => &self.typescript,
            TargetLanguage::Go => &self.go,
            TargetLanguage::Rust => &self.rust,
            TargetLanguage::Java => &self.java,
        }
    }
}

impl Default for Extractors {
    fn default() -> Self {
        Self::new()
    }
}

/// Language recognized from a file extension, if any.
pub fn language_for_extension(ext: &str) -> Option<TargetLanguage> {
    match ext {
        "py" => Some(TargetLanguage::Python),
        "ts" | "tsx" | "js" | "jsx" | "mjs" | "cjs" => Some(TargetLanguage::TypeScript),
        "go" => Some(TargetLanguage::Go),
        "rs" => Some(TargetLanguage::Rust),
        "java" => Some(TargetLanguage::Java),
        _ => None,
    }
}

/// Whether a file should be routed to test extraction instead of
/// type/function extraction, by filename and path convention. Rust files
/// with inline `#[cfg(test)]` modules are not test files; the importer
/// extracts both their public API and their tests.
pub fn is_test_file(path: &Path, lang: TargetLanguage) -> bool {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    let stem = file_name.rsplit_once('.').map(|(s, _)| s).unwrap_or(file_name);

    match lang {
        TargetLanguage::Python => stem.starts_with("test_") || stem.ends_with("_test"),
        TargetLanguage::TypeScript => stem.ends_with(".test") || stem.ends_with(".spec"),
        TargetLanguage::Go => stem.ends_with("_test"),
        TargetLanguage::Rust => {
            stem == "tests"
                || stem.ends_with("_test")
                || path.components().any(|c| c.as_os_str() == "tests")
        }
        TargetLanguage::Java => stem.ends_with("Test") || stem.ends_with("Tests"),
    }
}

/// Attribute the comment block immediately above `decl_line` to that
/// declaration. A block counts only if no non-blank, non-comment line sits
/// between it and the declaration. Comment markers and `@tag`/`:tag` lines
/// are stripped from the returned text.
pub fn doc_comment_above(lines: &[&str], decl_line: usize, markers: &[&str]) -> Option<String> {
    let mut collected: Vec<String> = Vec::new();
    let mut i = decl_line;

    while i > 0 {
        i -= 1;
        let trimmed = lines[i].trim();
        if trimmed.is_empty() {
            // A blank line between comment and declaration breaks the
            // association only if we already collected something.
            if collected.is_empty() {
                continue;
            }
            break;
        }

        let comment = markers.iter().find_map(|m| trimmed.strip_prefix(m));
        let comment = match comment {
            Some(c) => Some(c),
            // Block-comment fences (possibly single-line), then interior
            // lines ("* text").
            None if trimmed == "*/" => Some(""),
            None if trimmed.starts_with("/*") => {
                Some(trimmed.trim_start_matches('/').trim_start_matches('*'))
            }
            None if trimmed.starts_with('*') => Some(trimmed.trim_start_matches('*')),
            None => None,
        };

        match comment {
            Some(text) => {
                let text = text.trim().trim_end_matches("*/").trim();
                if text.starts_with('@') || text.starts_with(':') {
                    continue; // tag line, excluded from the description
                }
                if !text.is_empty() {
                    collected.push(text.to_string());
                }
            }
            None => break,
        }
    }

    if collected.is_empty() {
        None
    } else {
        collected.reverse();
        Some(collected.join(" "))
    }
}

/// Split `Outer<Args>` / `Outer[Args]` into `(Outer, Args)`.
pub fn generic_parts<'a>(s: &'a str, open: char, close: char) -> Option<(&'a str, &'a str)> {
    let start = s.find(open)?;
    let end = crate::text_utils::find_matching(s, start, open, close)?;
    if end != s.len() - close.len_utf8() {
        return None;
    }
    Some((s[..start].trim(), s[start + open.len_utf8()..end].trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_for_extension() {
        assert_eq!(language_for_extension("py"), Some(TargetLanguage::Python));
        assert_eq!(language_for_extension("tsx"), Some(TargetLanguage::TypeScript));
        assert_eq!(language_for_extension("md"), None);
    }

    #[test]
    fn test_is_test_file_conventions() {
        let cases = [
            ("test_auth.py", TargetLanguage::Python, true),
            ("auth.py", TargetLanguage::Python, false),
            ("auth.test.ts", TargetLanguage::TypeScript, true),
            ("auth.ts", TargetLanguage::TypeScript, false),
            ("server_test.go", TargetLanguage::Go, true),
            ("AuthServiceTest.java", TargetLanguage::Java, true),
        ];
        for (name, lang, expected) in cases {
            assert_eq!(is_test_file(Path::new(name), lang), expected, "{name}");
        }
    }

    #[test]
    fn test_rust_test_file_conventions() {
        assert!(is_test_file(Path::new("slug_test.rs"), TargetLanguage::Rust));
        assert!(is_test_file(
            Path::new("tests/integration.rs"),
            TargetLanguage::Rust
        ));
        assert!(!is_test_file(Path::new("lib.rs"), TargetLanguage::Rust));
    }

    #[test]
    fn test_doc_comment_above_simple() {
        let src = "// Validates a token.\n// Returns claims.\nfunc Validate() {}";
        let lines: Vec<&str> = src.lines().collect();
        assert_eq!(
            doc_comment_above(&lines, 2, &["//"]),
            Some("Validates a token. Returns claims.".to_string())
        );
    }

    #[test]
    fn test_doc_comment_above_excludes_tag_lines() {
        let src = "/**\n * Parses a header.\n * @param raw the input\n * @return the header\n */\npublic Header parse(String raw) {}";
        let lines: Vec<&str> = src.lines().collect();
        assert_eq!(
            doc_comment_above(&lines, 5, &["///", "//"]),
            Some("Parses a header.".to_string())
        );
    }

    #[test]
    fn test_doc_comment_broken_by_code_line() {
        let src = "// Unrelated comment.\nlet x = 1;\nfunc F() {}";
        let lines: Vec<&str> = src.lines().collect();
        assert_eq!(doc_comment_above(&lines, 2, &["//"]), None);
    }

    #[test]
    fn test_generic_parts() {
        assert_eq!(generic_parts("Vec<Option<i64>>", '<', '>'), Some(("Vec", "Option<i64>")));
        assert_eq!(generic_parts("List[int]", '[', ']'), Some(("List", "int")));
        assert_eq!(generic_parts("plain", '<', '>'), None);
        assert_eq!(generic_parts("Vec<u8>suffix", '<', '>'), None);
    }
}
