//! Rust source extractor.

use regex::Regex;

use super::{
    doc_comment_above, generic_parts, ExtractedFunction, ExtractedTest, ExtractedType,
    SourceExtractor,
};
use crate::spec_model::{Field, Param, TypeDefKind};
use crate::spec_parser::function_under_test;
use crate::text_utils::{block_end_line, find_matching, split_balanced};

/// Extractor for Rust files. Only `pub` declarations are recovered.
pub struct RustExtractor {
    struct_re: Regex,
    enum_re: Regex,
    trait_re: Regex,
    alias_re: Regex,
    fn_re: Regex,
    field_re: Regex,
    variant_re: Regex,
    test_attr_re: Regex,
    fn_name_re: Regex,
}

impl RustExtractor {
    pub fn new() -> Self {
        Self {
            // pub struct Name {
            struct_re: Regex::new(r"^\s*pub\s+struct\s+(\w+)").unwrap(),

            // pub enum Name {
            enum_re: Regex::new(r"^\s*pub\s+enum\s+(\w+)").unwrap(),

            // pub trait Name {
            trait_re: Regex::new(r"^\s*pub\s+trait\s+(\w+)").unwrap(),

            // pub type Name = Other;
            alias_re: Regex::new(r"^\s*pub\s+type\s+(\w+)\s*(?:<[^>]*>)?\s*=").unwrap(),

            // pub fn name( / pub async fn name(
            fn_re: Regex::new(r"^\s*pub\s+(?:async\s+)?fn\s+(\w+)\s*(?:<[^>]*>)?\s*\(").unwrap(),

            // pub name: Type,
            field_re: Regex::new(r"^\s*pub\s+(\w+)\s*:\s*(.+?),?\s*$").unwrap(),

            // VariantName / VariantName(..) / VariantName { .. }
            variant_re: Regex::new(r"^\s*([A-Z]\w*)\s*(?:[,({]|$)").unwrap(),

            test_attr_re: Regex::new(r"^\s*#\[(?:tokio::)?test\]").unwrap(),

            fn_name_re: Regex::new(r"^\s*(?:async\s+)?fn\s+(\w+)").unwrap(),
        }
    }

    fn parse_params(&self, raw: &str) -> Vec<Param> {
        let mut params = Vec::new();
        for part in split_balanced(raw, ',') {
            let part = part.trim();
            if part.is_empty() || part == "self" || part == "&self" || part == "&mut self" {
                continue;
            }
            match part.split_once(':') {
                Some((name, ty)) => params.push(Param {
                    name: name.trim().trim_start_matches("mut ").to_string(),
                    param_type: self.map_type(ty.trim()),
                    description: String::new(),
                }),
                None => params.push(Param {
                    name: part.to_string(),
                    ..Default::default()
                }),
            }
        }
        params
    }

    /// Return type after `->`, with `Result<T, E>` unwrapped to its
    /// success payload.
    fn parse_returns(&self, after_params: &str) -> Option<String> {
        let rest = after_params.trim();
        let rest = rest.strip_prefix("->")?.trim();
        let rest = rest.trim_end_matches('{').trim().trim_end_matches(';').trim();
        if rest.is_empty() || rest == "()" {
            return None;
        }
        let payload = match generic_parts(rest, '<', '>') {
            Some(("Result", args)) => {
                split_balanced(args, ',').into_iter().next().unwrap_or_default()
            }
            _ => rest.to_string(),
        };
        if payload.is_empty() || payload == "()" {
            None
        } else {
            Some(self.map_type(&payload))
        }
    }
}

impl SourceExtractor for RustExtractor {
    fn extract_types(&self, content: &str, file: &str) -> Vec<ExtractedType> {
        let lines: Vec<&str> = content.lines().collect();
        let mut types = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if let Some(caps) = self.struct_re.captures(line) {
                let end = block_end_line(&lines, i);
                let mut fields = Vec::new();
                for body_line in &lines[i + 1..end] {
                    if let Some(fc) = self.field_re.captures(body_line) {
                        fields.push(Field {
                            name: fc[1].to_string(),
                            field_type: self.map_type(fc[2].trim()),
                            description: String::new(),
                            required: false,
                        });
                    }
                }
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Struct,
                    description: doc_comment_above(&lines, i, &["///", "//"]).unwrap_or_default(),
                    fields,
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            } else if let Some(caps) = self.enum_re.captures(line) {
                let end = block_end_line(&lines, i);
                let mut fields = Vec::new();
                for body_line in &lines[i + 1..end] {
                    let trimmed = body_line.trim();
                    if trimmed.starts_with("//") || trimmed.starts_with('#') {
                        continue;
                    }
                    if let Some(fc) = self.variant_re.captures(body_line) {
                        fields.push(Field {
                            name: fc[1].to_string(),
                            ..Default::default()
                        });
                    }
                }
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Enum,
                    description: doc_comment_above(&lines, i, &["///", "//"]).unwrap_or_default(),
                    fields,
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            } else if let Some(caps) = self.trait_re.captures(line) {
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Interface,
                    description: doc_comment_above(&lines, i, &["///", "//"]).unwrap_or_default(),
                    fields: Vec::new(),
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            } else if let Some(caps) = self.alias_re.captures(line) {
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Alias,
                    description: doc_comment_above(&lines, i, &["///", "//"]).unwrap_or_default(),
                    fields: Vec::new(),
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            }
        }

        types
    }

    fn extract_functions(&self, content: &str, file: &str) -> Vec<ExtractedFunction> {
        let lines: Vec<&str> = content.lines().collect();
        let mut functions = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let Some(caps) = self.fn_re.captures(line) else {
                continue;
            };

            let Some(open) = line.find('(') else { continue };
            let Some(close) = find_matching(line, open, '(', ')') else {
                continue;
            };

            let params = self.parse_params(&line[open + 1..close]);
            // Methods taking self still count as functions of the module's
            // surface; self itself is dropped from the parameter list.

            functions.push(ExtractedFunction {
                name: caps[1].to_string(),
                params,
                returns: self.parse_returns(&line[close + 1..]),
                description: doc_comment_above(&lines, i, &["///", "//"]).unwrap_or_default(),
                signature: line.trim().trim_end_matches('{').trim().to_string(),
                source_file: file.to_string(),
                line_number: i + 1,
            });
        }

        functions
    }

    fn extract_tests(&self, content: &str, file: &str) -> Vec<ExtractedTest> {
        let lines: Vec<&str> = content.lines().collect();
        let mut tests = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if !self.test_attr_re.is_match(line) {
                continue;
            }
            // The fn usually follows directly; tolerate further attributes.
            for follow in &lines[i + 1..(i + 4).min(lines.len())] {
                if let Some(caps) = self.fn_name_re.captures(follow) {
                    let name = caps[1].to_string();
                    tests.push(ExtractedTest {
                        function: function_under_test(&name),
                        name,
                        source_file: file.to_string(),
                        line_number: i + 1,
                    });
                    break;
                }
                if !follow.trim().starts_with('#') {
                    break;
                }
            }
        }

        tests
    }

    fn extract_package_description(&self, content: &str) -> Option<String> {
        let mut doc_lines = Vec::new();
        for line in content.lines() {
            let trimmed = line.trim();
            if let Some(text) = trimmed.strip_prefix("//!") {
                let text = text.trim();
                if !text.is_empty() {
                    doc_lines.push(text.to_string());
                } else if !doc_lines.is_empty() {
                    break; // first paragraph only
                }
            } else if !trimmed.is_empty() {
                break;
            }
        }
        if doc_lines.is_empty() {
            None
        } else {
            Some(doc_lines.join(" "))
        }
    }

    fn map_type(&self, concrete: &str) -> String {
        let t = concrete.trim();
        let t = t.strip_prefix('&').unwrap_or(t).trim_start_matches("mut ").trim();

        if t == "Vec<u8>" {
            return "Bytes".to_string();
        }
        if let Some((outer, args)) = generic_parts(t, '<', '>') {
            match outer {
                "Vec" | "VecDeque" | "HashSet" | "BTreeSet" => {
                    return format!("List of {}", self.map_type(args));
                }
                "Option" => return format!("Optional {}", self.map_type(args)),
                "HashMap" | "BTreeMap" => {
                    let parts = split_balanced(args, ',');
                    if parts.len() == 2 {
                        return format!(
                            "Map of {} to {}",
                            self.map_type(&parts[0]),
                            self.map_type(&parts[1])
                        );
                    }
                }
                "Box" | "Rc" | "Arc" => return self.map_type(args),
                _ => {}
            }
        }

        match t {
            "String" | "str" => "Text".to_string(),
            "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
            | "u128" | "usize" => "Integer".to_string(),
            "f32" | "f64" => "Float".to_string(),
            "bool" => "Boolean".to_string(),
            "serde_json::Value" | "Value" => "Any".to_string(),
            _ => t.rsplit("::").next().unwrap_or(t).to_string(),
        }
    }
}

impl Default for RustExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"//! URL shortener core.

use std::collections::HashMap;

/// A registered account.
pub struct User {
    pub id: i64,
    pub email: String,
    pub tags: Vec<String>,
    secret: String,
}

/// Account standing.
pub enum Status {
    Active,
    Suspended,
}

pub type UserId = i64;

/// Lowercases text and joins words with hyphens.
pub fn slugify(text: &str) -> String {
    text.to_string()
}

/// Resolves a slug.
pub fn lookup(slug: &str, strict: bool) -> Result<Option<User>, LookupError> {
    unimplemented!()
}

fn private_helper() {}
"#;

    #[test]
    fn test_extract_rust_types() {
        let ex = RustExtractor::new();
        let types = ex.extract_types(SOURCE, "lib.rs");
        assert_eq!(types.len(), 3);

        let user = &types[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.kind, TypeDefKind::Struct);
        assert_eq!(user.description, "A registered account.");
        // private field skipped
        assert_eq!(user.fields.len(), 3);
        assert_eq!(user.fields[2].field_type, "List of Text");

        assert_eq!(types[1].kind, TypeDefKind::Enum);
        assert_eq!(types[1].fields.len(), 2);
        assert_eq!(types[2].kind, TypeDefKind::Alias);
    }

    #[test]
    fn test_extract_rust_functions() {
        let ex = RustExtractor::new();
        let funcs = ex.extract_functions(SOURCE, "lib.rs");
        assert_eq!(funcs.len(), 2);

        assert_eq!(funcs[0].name, "slugify");
        assert_eq!(funcs[0].params[0].param_type, "Text");
        assert_eq!(funcs[0].returns.as_deref(), Some("Text"));

        assert_eq!(funcs[1].name, "lookup");
        assert_eq!(funcs[1].returns.as_deref(), Some("Optional User"));
    }

    #[test]
    fn test_extract_rust_tests() {
        let ex = RustExtractor::new();
        let src = "#[cfg(test)]\nmod tests {\n    #[test]\n    fn test_slugify_basic() {}\n\n    #[tokio::test]\n    async fn test_lookup_missing() {}\n}\n";
        let tests = ex.extract_tests(src, "lib.rs");
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].function, "slugify basic");
        assert_eq!(tests[1].function, "lookup missing");
    }

    #[test]
    fn test_extract_rust_module_doc() {
        let ex = RustExtractor::new();
        assert_eq!(
            ex.extract_package_description(SOURCE),
            Some("URL shortener core.".to_string())
        );
    }

    #[test]
    fn test_rust_type_mapping() {
        let ex = RustExtractor::new();
        assert_eq!(ex.map_type("Vec<Option<i64>>"), "List of Optional Integer");
        assert_eq!(ex.map_type("HashMap<String, i64>"), "Map of Text to Integer");
        assert_eq!(ex.map_type("Vec<u8>"), "Bytes");
        assert_eq!(ex.map_type("&str"), "Text");
        assert_eq!(ex.map_type("crate::model::User"), "User");
    }
}
