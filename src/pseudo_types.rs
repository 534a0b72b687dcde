//! Pseudo-type vocabulary and its per-target-language concrete spellings.
//!
//! Specs describe types with a small abstract vocabulary (`Text`, `Integer`,
//! `List of X`, `Optional X`, `Map of K to V`). The mapper turns those into
//! concrete type spellings for one target language. Unrecognized tokens pass
//! through unchanged: specs reference their own declared types by name, so
//! an unknown identifier is never an error here.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LanguageError {
    #[error("Unsupported target language: {0}")]
    Unsupported(String),
}

/// Supported target languages, in the declaration order used to break
/// dominant-language ties during extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetLanguage {
    Python,
    TypeScript,
    Go,
    Rust,
    Java,
}

impl TargetLanguage {
    pub const ALL: [TargetLanguage; 5] = [
        TargetLanguage::Python,
        TargetLanguage::TypeScript,
        TargetLanguage::Go,
        TargetLanguage::Rust,
        TargetLanguage::Java,
    ];
}

impl std::str::FromStr for TargetLanguage {
    type Err = LanguageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "python" | "py" => Ok(TargetLanguage::Python),
            "typescript" | "ts" | "javascript" | "js" => Ok(TargetLanguage::TypeScript),
            "go" | "golang" => Ok(TargetLanguage::Go),
            "rust" | "rs" => Ok(TargetLanguage::Rust),
            "java" => Ok(TargetLanguage::Java),
            _ => Err(LanguageError::Unsupported(s.to_string())),
        }
    }
}

impl std::fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TargetLanguage::Python => "python",
            TargetLanguage::TypeScript => "typescript",
            TargetLanguage::Go => "go",
            TargetLanguage::Rust => "rust",
            TargetLanguage::Java => "java",
        };
        write!(f, "{name}")
    }
}

/// Map a pseudo-type token to its concrete spelling in `lang`.
///
/// Handles `List of X`, `Optional X` and `Map of K to V` recursively;
/// anything not in the closed vocabulary is passed through unchanged.
pub fn map_pseudo_type(pseudo: &str, lang: TargetLanguage) -> String {
    map_inner(pseudo, lang, false)
}

fn map_inner(pseudo: &str, lang: TargetLanguage, in_generic: bool) -> String {
    let token = pseudo.trim();
    let lower = token.to_lowercase();

    if let Some(inner) = strip_prefix_ci(token, "list of ") {
        let mapped = map_inner(inner, lang, true);
        return match lang {
            TargetLanguage::Python => format!("List[{mapped}]"),
            TargetLanguage::TypeScript => format!("Array<{mapped}>"),
            TargetLanguage::Go => format!("[]{mapped}"),
            TargetLanguage::Rust => format!("Vec<{mapped}>"),
            TargetLanguage::Java => format!("List<{mapped}>"),
        };
    }

    if let Some(inner) = strip_prefix_ci(token, "optional ") {
        let mapped = map_inner(inner, lang, true);
        return match lang {
            TargetLanguage::Python => format!("Optional[{mapped}]"),
            TargetLanguage::TypeScript => format!("{mapped} | null"),
            TargetLanguage::Go => format!("*{mapped}"),
            TargetLanguage::Rust => format!("Option<{mapped}>"),
            TargetLanguage::Java => format!("Optional<{mapped}>"),
        };
    }

    if let Some(inner) = strip_prefix_ci(token, "map of ") {
        // "Map of K to V" — split on the last top-level " to " so the key
        // side may itself be a container.
        if let Some((key, value)) = split_map_args(inner) {
            let k = map_inner(key, lang, true);
            let v = map_inner(value, lang, true);
            return match lang {
                TargetLanguage::Python => format!("Dict[{k}, {v}]"),
                TargetLanguage::TypeScript => format!("Map<{k}, {v}>"),
                TargetLanguage::Go => format!("map[{k}]{v}"),
                TargetLanguage::Rust => format!("HashMap<{k}, {v}>"),
                TargetLanguage::Java => format!("Map<{k}, {v}>"),
            };
        }
    }

    let flat = match lang {
        TargetLanguage::Python => match lower.as_str() {
            "text" => Some("str"),
            "integer" => Some("int"),
            "float" => Some("float"),
            "boolean" => Some("bool"),
            "bytes" => Some("bytes"),
            "any" => Some("Any"),
            "none" | "nothing" | "void" => Some("None"),
            _ => None,
        },
        TargetLanguage::TypeScript => match lower.as_str() {
            "text" => Some("string"),
            "integer" | "float" => Some("number"),
            "boolean" => Some("boolean"),
            "bytes" => Some("Uint8Array"),
            "any" => Some("any"),
            "none" | "nothing" | "void" => Some("void"),
            _ => None,
        },
        TargetLanguage::Go => match lower.as_str() {
            "text" => Some("string"),
            "integer" => Some("int64"),
            "float" => Some("float64"),
            "boolean" => Some("bool"),
            "bytes" => Some("[]byte"),
            "any" => Some("interface{}"),
            "none" | "nothing" | "void" => Some(""),
            _ => None,
        },
        TargetLanguage::Rust => match lower.as_str() {
            "text" => Some("String"),
            "integer" => Some("i64"),
            "float" => Some("f64"),
            "boolean" => Some("bool"),
            "bytes" => Some("Vec<u8>"),
            "any" => Some("serde_json::Value"),
            "none" | "nothing" | "void" => Some("()"),
            _ => None,
        },
        TargetLanguage::Java => match lower.as_str() {
            // Primitives box inside generic type arguments.
            "text" => Some("String"),
            "integer" => Some(if in_generic { "Long" } else { "long" }),
            "float" => Some(if in_generic { "Double" } else { "double" }),
            "boolean" => Some(if in_generic { "Boolean" } else { "boolean" }),
            "bytes" => Some("byte[]"),
            "any" => Some("Object"),
            "none" | "nothing" | "void" => Some("void"),
            _ => None,
        },
    };

    match flat {
        Some(spelling) => spelling.to_string(),
        // User-defined type name from the same spec.
        None => token.to_string(),
    }
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
    {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

/// Split `K to V`, using the last ` to ` so keys like `List of Text` work.
fn split_map_args(s: &str) -> Option<(&str, &str)> {
    let lower = s.to_lowercase();
    let idx = lower.rfind(" to ")?;
    Some((s[..idx].trim(), s[idx + 4..].trim()))
}
