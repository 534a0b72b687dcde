//! Java source extractor.

use regex::Regex;

use super::{
    doc_comment_above, generic_parts, ExtractedFunction, ExtractedTest, ExtractedType,
    SourceExtractor,
};
use crate::spec_model::{Field, Param, TypeDefKind};
use crate::text_utils::{block_end_line, find_matching, split_balanced};

/// Extractor for Java files. Public declarations only; static members are
/// excluded from instance field extraction.
pub struct JavaExtractor {
    class_re: Regex,
    interface_re: Regex,
    enum_re: Regex,
    record_re: Regex,
    field_re: Regex,
    method_re: Regex,
    enum_constant_re: Regex,
    test_annotation_re: Regex,
    method_name_re: Regex,
    package_re: Regex,
}

impl JavaExtractor {
    pub fn new() -> Self {
        Self {
            // public [abstract|final] class Name
            class_re: Regex::new(r"^\s*public\s+(?:abstract\s+|final\s+)*class\s+(\w+)").unwrap(),

            interface_re: Regex::new(r"^\s*public\s+interface\s+(\w+)").unwrap(),

            enum_re: Regex::new(r"^\s*public\s+enum\s+(\w+)").unwrap(),

            // public record Name(Type a, Type b)
            record_re: Regex::new(r"^\s*public\s+record\s+(\w+)\s*\(").unwrap(),

            // private final Type name;  (instance fields; static excluded)
            field_re: Regex::new(
                r"^\s*(?:private|protected|public)\s+(?:final\s+)?([\w<>\[\],\s.]+?)\s+(\w+)\s*(?:=|;)",
            )
            .unwrap(),

            // public [static] ReturnType name(
            // Constructors carry no return type token and never match.
            method_re: Regex::new(
                r"^\s*public\s+(?:static\s+)?(?:final\s+)?([\w<>\[\],\s.]+?)\s+(\w+)\s*\(",
            )
            .unwrap(),

            // CONSTANT, / CONSTANT("value"),
            enum_constant_re: Regex::new(r"^\s*([A-Z][A-Z0-9_]*)\s*(?:[,;(]|$)").unwrap(),

            test_annotation_re: Regex::new(r"^\s*@(?:Test|ParameterizedTest)\b").unwrap(),

            method_name_re: Regex::new(r"\b(\w+)\s*\(").unwrap(),

            package_re: Regex::new(r"^package\s+[\w.]+;").unwrap(),
        }
    }

    fn parse_params(&self, raw: &str) -> Vec<Param> {
        let mut params = Vec::new();
        for part in split_balanced(raw, ',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            // Strip annotations and final before the "Type name" pair.
            let cleaned: Vec<&str> = part
                .split_whitespace()
                .filter(|tok| !tok.starts_with('@') && *tok != "final")
                .collect();
            if cleaned.len() >= 2 {
                let name = cleaned[cleaned.len() - 1];
                let ty = cleaned[..cleaned.len() - 1].join(" ");
                params.push(Param {
                    name: name.to_string(),
                    param_type: self.map_type(&ty),
                    description: String::new(),
                });
            } else if let Some(tok) = cleaned.first() {
                params.push(Param {
                    name: tok.to_string(),
                    ..Default::default()
                });
            }
        }
        params
    }

    fn extract_class_fields(&self, lines: &[&str], class_line: usize) -> Vec<Field> {
        let end = block_end_line(lines, class_line);
        let mut fields = Vec::new();
        for body_line in &lines[class_line + 1..end] {
            let trimmed = body_line.trim();
            // Static members are class-level, not instance fields.
            if trimmed.contains("static ") || trimmed.contains('(') {
                continue;
            }
            if let Some(fc) = self.field_re.captures(body_line) {
                fields.push(Field {
                    name: fc[2].to_string(),
                    field_type: self.map_type(fc[1].trim()),
                    description: String::new(),
                    required: false,
                });
            }
        }
        fields
    }
}

impl SourceExtractor for JavaExtractor {
    fn extract_types(&self, content: &str, file: &str) -> Vec<ExtractedType> {
        let lines: Vec<&str> = content.lines().collect();
        let mut types = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if let Some(caps) = self.record_re.captures(line) {
                let name = caps[1].to_string();
                let mut fields = Vec::new();
                if let Some(open) = line.find('(') {
                    if let Some(close) = find_matching(line, open, '(', ')') {
                        for param in self.parse_params(&line[open + 1..close]) {
                            fields.push(Field {
                                name: param.name,
                                field_type: param.param_type,
                                description: String::new(),
                                required: true,
                            });
                        }
                    }
                }
                types.push(ExtractedType {
                    name,
                    kind: TypeDefKind::Struct,
                    description: doc_comment_above(&lines, i, &["//"]).unwrap_or_default(),
                    fields,
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            } else if let Some(caps) = self.enum_re.captures(line) {
                let end = block_end_line(&lines, i);
                let mut fields = Vec::new();
                for body_line in &lines[i + 1..end] {
                    if let Some(fc) = self.enum_constant_re.captures(body_line) {
                        fields.push(Field {
                            name: fc[1].to_string(),
                            ..Default::default()
                        });
                    } else if body_line.contains(';') {
                        break; // constants end at the first semicolon block
                    }
                }
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Enum,
                    description: doc_comment_above(&lines, i, &["//"]).unwrap_or_default(),
                    fields,
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            } else if let Some(caps) = self.interface_re.captures(line) {
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Interface,
                    description: doc_comment_above(&lines, i, &["//"]).unwrap_or_default(),
                    fields: Vec::new(),
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            } else if let Some(caps) = self.class_re.captures(line) {
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Struct,
                    description: doc_comment_above(&lines, i, &["//"]).unwrap_or_default(),
                    fields: self.extract_class_fields(&lines, i),
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
            // Type declarations also start with public; skip them.
            if self.class_re.is_match(line)
                || self.interface_re.is_match(line)
                || self.enum_re.is_match(line)
                || self.record_re.is_match(line)
            {
                continue;
            }
            let Some(caps) = self.method_re.captures(line) else {
                continue;
            };
            let return_type = caps[1].trim().to_string();
            let name = caps[2].to_string();

            let Some(open) = line.find('(') else { continue };
            let Some(close) = find_matching(line, open, '(', ')') else {
                continue;
            };

            let returns = if return_type == "void" {
                None
            } else {
                Some(self.map_type(&return_type))
            };

            functions.push(ExtractedFunction {
                name,
                params: self.parse_params(&line[open + 1..close]),
                returns,
                description: doc_comment_above(&lines, i, &["//"]).unwrap_or_default(),
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
            if !self.test_annotation_re.is_match(line) {
                continue;
            }
            for follow in &lines[i + 1..(i + 4).min(lines.len())] {
                let trimmed = follow.trim();
                if trimmed.starts_with('@') {
                    continue; // further annotations
                }
                if let Some(caps) = self.method_name_re.captures(follow) {
                    let name = caps[1].to_string();
                    tests.push(ExtractedTest {
                        function: crate::spec_parser::function_under_test(&name),
                        name,
                        source_file: file.to_string(),
                        line_number: i + 1,
                    });
                }
                break;
            }
        }

        tests
    }

    fn extract_package_description(&self, content: &str) -> Option<String> {
        let lines: Vec<&str> = content.lines().collect();
        // Javadoc above the package declaration, else above the first
        // public type.
        if let Some(pkg) = lines.iter().position(|l| self.package_re.is_match(l)) {
            if let Some(doc) = doc_comment_above(&lines, pkg, &["//"]) {
                return Some(doc);
            }
        }
        let first_type = lines.iter().position(|l| {
            self.class_re.is_match(l)
                || self.interface_re.is_match(l)
                || self.enum_re.is_match(l)
                || self.record_re.is_match(l)
        })?;
        doc_comment_above(&lines, first_type, &["//"])
    }

    fn map_type(&self, concrete: &str) -> String {
        let t = concrete.trim();

        if t == "byte[]" {
            return "Bytes".to_string();
        }
        if let Some(inner) = t.strip_suffix("[]") {
            return format!("List of {}", self.map_type(inner));
        }
        if let Some((outer, args)) = generic_parts(t, '<', '>') {
            match outer {
                "List" | "ArrayList" | "Collection" | "Set" | "HashSet" | "Iterable" => {
                    return format!("List of {}", self.map_type(args));
                }
                "Optional" => return format!("Optional {}", self.map_type(args)),
                "Map" | "HashMap" | "TreeMap" => {
                    let parts = split_balanced(args, ',');
                    if parts.len() == 2 {
                        return format!(
                            "Map of {} to {}",
                            self.map_type(&parts[0]),
                            self.map_type(&parts[1])
                        );
                    }
                }
                _ => {}
            }
        }

        match t {
            "String" | "CharSequence" => "Text".to_string(),
            "int" | "long" | "short" | "Integer" | "Long" | "Short" | "BigInteger" => {
                "Integer".to_string()
            }
            "double" | "float" | "Double" | "Float" | "BigDecimal" => "Float".to_string(),
            "boolean" | "Boolean" => "Boolean".to_string(),
            "Object" => "Any".to_string(),
            _ => t.rsplit('.').next().unwrap_or(t).to_string(),
        }
    }
}

impl Default for JavaExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"/**
 * URL shortener service.
 */
package com.example.shortener;

/** A registered account. */
public class User {
    private final long id;
    private String email;
    private List<String> tags;
    private static int instances;

    public User(long id) {
        this.id = id;
    }

    /**
     * Renames the account.
     * @param email new address
     */
    public void rename(String email) {
        this.email = email;
    }

    public Optional<User> lookup(String slug, boolean strict) {
        return Optional.empty();
    }
}

public enum Status {
    ACTIVE,
    SUSPENDED;

    private int weight;
}
"#;

    #[test]
    fn test_extract_java_types() {
        let ex = JavaExtractor::new();
        let types = ex.extract_types(SOURCE, "User.java");
        assert_eq!(types.len(), 2);

        let user = &types[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.kind, TypeDefKind::Struct);
        assert_eq!(user.description, "A registered account.");
        // static counter excluded
        assert_eq!(user.fields.len(), 3);
        assert_eq!(user.fields[0].field_type, "Integer");
        assert_eq!(user.fields[2].field_type, "List of Text");

        let status = &types[1];
        assert_eq!(status.kind, TypeDefKind::Enum);
        assert_eq!(status.fields.len(), 2);
    }

    #[test]
    fn test_extract_java_methods() {
        let ex = JavaExtractor::new();
        let funcs = ex.extract_functions(SOURCE, "User.java");
        // constructor excluded
        assert_eq!(funcs.len(), 2);

        assert_eq!(funcs[0].name, "rename");
        assert_eq!(funcs[0].returns, None);
        assert_eq!(funcs[0].description, "Renames the account.");
        assert_eq!(funcs[0].params[0].param_type, "Text");

        assert_eq!(funcs[1].name, "lookup");
        assert_eq!(funcs[1].returns.as_deref(), Some("Optional User"));
        assert_eq!(funcs[1].params.len(), 2);
    }

    #[test]
    fn test_extract_java_record() {
        let ex = JavaExtractor::new();
        let types = ex.extract_types(
            "public record Point(int x, int y) {}\n",
            "Point.java",
        );
        assert_eq!(types.len(), 1);
        assert_eq!(types[0].fields.len(), 2);
        assert!(types[0].fields[0].required);
        assert_eq!(types[0].fields[0].field_type, "Integer");
    }

    #[test]
    fn test_extract_java_tests() {
        let ex = JavaExtractor::new();
        let src = "@Test\nvoid shouldRejectEmptySlug() {}\n\n@Test\npublic void testLookupMissing() {}\n";
        let tests = ex.extract_tests(src, "UserTest.java");
        assert_eq!(tests.len(), 2);
        assert_eq!(tests[0].function, "reject empty slug");
        assert_eq!(tests[1].function, "lookup missing");
    }

    #[test]
    fn test_extract_java_package_description() {
        let ex = JavaExtractor::new();
        assert_eq!(
            ex.extract_package_description(SOURCE),
            Some("URL shortener service.".to_string())
        );
    }

    #[test]
    fn test_java_type_mapping() {
        let ex = JavaExtractor::new();
        assert_eq!(ex.map_type("List<Optional<Long>>"), "List of Optional Integer");
        assert_eq!(ex.map_type("Map<String, Long>"), "Map of Text to Integer");
        assert_eq!(ex.map_type("byte[]"), "Bytes");
        assert_eq!(ex.map_type("com.example.Claims"), "Claims");
    }
}
