//! The normalized forward model built from a markdown specification.
//!
//! `Spec` is constructed once by the parser, finalized with [`Spec::normalize`]
//! and treated as read-only by everything downstream. List fields always
//! serialize as arrays (never absent) — downstream JSON consumers rely on it.

use serde::{Deserialize, Serialize};

/// Complete specification parsed from a markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Spec {
    /// Project name, from the document's single H1 heading.
    pub name: String,
    /// Free-text description, from the Meta section or leading prose.
    #[serde(default)]
    pub description: String,
    /// Version string from the Meta section, if any.
    #[serde(default)]
    pub version: String,
    /// Ordered, deduplicated target language identifiers. May be empty after
    /// a successful parse; validation, not parsing, rejects that.
    pub target_languages: Vec<String>,
    pub types: Vec<TypeDef>,
    pub functions: Vec<Function>,
    pub tests: Vec<TestCase>,
    pub dependencies: Vec<NamedItem>,
    pub configuration: Vec<NamedItem>,
    /// Non-fatal issues collected while parsing.
    pub warnings: Vec<String>,
}

/// A type declared in the spec.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeDefKind,
    #[serde(default)]
    pub description: String,
    pub fields: Vec<Field>,
    /// Target of an alias type, unused for other kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TypeDefKind {
    #[default]
    Struct,
    Enum,
    Interface,
    Alias,
}

/// A field of a struct/enum/interface type. `field_type` is a pseudo-type
/// token (`Text`, `List of Integer`, or a user-defined type name).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Field {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// A function declared in the spec.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Function {
    pub name: String,
    pub accepts: Vec<Param>,
    /// Pseudo-type of the return value, if the function returns one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    /// Imperative free text. Deliberately opaque: consumed by a generation
    /// step outside this crate, never parsed into structured steps here.
    #[serde(default)]
    pub logic: String,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Param {
    pub name: String,
    pub param_type: String,
    #[serde(default)]
    pub description: String,
}

/// A test case. `function` is the name under test and need not resolve to a
/// declared function. `given`/`expect` are loosely typed: a JSON scalar when
/// the source text is unambiguous, a raw string otherwise, or absent.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TestCase {
    pub name: String,
    pub function: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub given: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expect: Option<serde_json::Value>,
}

/// A named, described list item (dependency or configuration entry).
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct NamedItem {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Spec {
    /// Finalize a freshly built spec. Idempotent.
    ///
    /// Trims the name, lowercases and deduplicates target languages
    /// (preserving first-occurrence order), and trims identifier fields.
    /// Scalar free-text fields (`logic`, descriptions) are left untouched.
    pub fn normalize(&mut self) {
        self.name = self.name.trim().to_string();

        let mut seen = Vec::new();
        for lang in &self.target_languages {
            let norm = lang.trim().to_lowercase();
            if !norm.is_empty() && !seen.contains(&norm) {
                seen.push(norm);
            }
        }
        self.target_languages = seen;

        for ty in &mut self.types {
            ty.name = ty.name.trim().to_string();
            for field in &mut ty.fields {
                field.name = field.name.trim().to_string();
                field.field_type = field.field_type.trim().to_string();
            }
        }
        for func in &mut self.functions {
            func.name = func.name.trim().to_string();
            for param in &mut func.accepts {
                param.name = param.name.trim().to_string();
                param.param_type = param.param_type.trim().to_string();
            }
        }
    }
}
