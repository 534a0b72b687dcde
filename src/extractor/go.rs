//! Go source extractor.

use regex::Regex;

use super::{
    doc_comment_above, ExtractedFunction, ExtractedTest, ExtractedType, SourceExtractor,
};
use crate::spec_model::{Field, Param, TypeDefKind};
use crate::spec_parser::function_under_test;
use crate::text_utils::{block_end_line, find_matching, split_balanced};

/// Extractor for Go files. Only exported (uppercase-initial) declarations
/// are recovered.
pub struct GoExtractor {
    struct_re: Regex,
    interface_re: Regex,
    alias_re: Regex,
    func_re: Regex,
    field_re: Regex,
    test_func_re: Regex,
    package_re: Regex,
}

impl GoExtractor {
    pub fn new() -> Self {
        Self {
            // type Name struct {
            struct_re: Regex::new(r"^type\s+(\w+)\s+struct\s*\{").unwrap(),

            // type Name interface {
            interface_re: Regex::new(r"^type\s+(\w+)\s+interface\s*\{").unwrap(),

            // type Name = Other  /  type Name Other
            alias_re: Regex::new(r"^type\s+(\w+)\s+=?\s*([^\s{]+)\s*$").unwrap(),

            // func Name(...)  — a leading '(' after func means a method
            // receiver, which is excluded
            func_re: Regex::new(r"^func\s+([A-Z]\w*)\s*\(").unwrap(),

            // FieldName Type `tags`
            field_re: Regex::new(r"^\s*([A-Z]\w*)\s+(\S+)").unwrap(),

            // func TestXxx(t *testing.T)
            test_func_re: Regex::new(r"^func\s+(Test\w+)\s*\(").unwrap(),

            package_re: Regex::new(r"^package\s+\w+").unwrap(),
        }
    }

    fn parse_params(&self, raw: &str) -> Vec<Param> {
        let mut params = Vec::new();
        for part in split_balanced(raw, ',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            // "name Type" — a lone token is a name sharing the next
            // parameter's type, which this heuristic does not chase.
            match part.split_once(' ') {
                Some((name, ty)) => params.push(Param {
                    name: name.trim().to_string(),
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

    /// First non-error component of a return clause, mapped to a
    /// pseudo-type. `(User, error)` yields `User`; `error` alone yields none.
    fn parse_returns(&self, raw: &str) -> Option<String> {
        let raw = raw.trim().trim_end_matches('{').trim();
        if raw.is_empty() {
            return None;
        }
        let inner = raw
            .strip_prefix('(')
            .and_then(|r| r.strip_suffix(')'))
            .unwrap_or(raw);
        split_balanced(inner, ',')
            .into_iter()
            .map(|part| {
                // Named return value: "u User"
                match part.rsplit_once(' ') {
                    Some((_, ty)) => ty.trim().to_string(),
                    None => part,
                }
            })
            .find(|ty| ty != "error")
            .map(|ty| self.map_type(&ty))
    }
}

impl SourceExtractor for GoExtractor {
    fn extract_types(&self, content: &str, file: &str) -> Vec<ExtractedType> {
        let lines: Vec<&str> = content.lines().collect();
        let mut types = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if let Some(caps) = self.struct_re.captures(line) {
                let end = block_end_line(&lines, i);
                let mut fields = Vec::new();
                for body_line in &lines[i + 1..end] {
                    let trimmed = body_line.trim();
                    if trimmed.is_empty() || trimmed.starts_with("//") {
                        continue;
                    }
                    if let Some(fc) = self.field_re.captures(body_line) {
                        fields.push(Field {
                            name: fc[1].to_string(),
                            field_type: self.map_type(&fc[2]),
                            description: String::new(),
                            required: false,
                        });
                    }
                }
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Struct,
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
            } else if let Some(caps) = self.alias_re.captures(line) {
                let target = &caps[2];
                if target != "struct" && target != "interface" {
                    types.push(ExtractedType {
                        name: caps[1].to_string(),
                        kind: TypeDefKind::Alias,
                        description: doc_comment_above(&lines, i, &["//"]).unwrap_or_default(),
                        fields: Vec::new(),
                        source_file: file.to_string(),
                        line_number: i + 1,
                    });
                }
            }
        }

        types
    }

    fn extract_functions(&self, content: &str, file: &str) -> Vec<ExtractedFunction> {
        let lines: Vec<&str> = content.lines().collect();
        let mut functions = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let Some(caps) = self.func_re.captures(line) else {
                continue;
            };
            let name = caps[1].to_string();

            // Param list bounded by matching parens, not the regex, so
            // nested function types survive.
            let open = match line.find('(') {
                Some(idx) => idx,
                None => continue,
            };
            let Some(close) = find_matching(line, open, '(', ')') else {
                continue;
            };
            let params = self.parse_params(&line[open + 1..close]);
            let returns = self.parse_returns(&line[close + 1..]);

            functions.push(ExtractedFunction {
                name,
                params,
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
        let mut tests = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if let Some(caps) = self.test_func_re.captures(line) {
                let name = caps[1].to_string();
                tests.push(ExtractedTest {
                    function: function_under_test(&name),
                    name,
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            }
        }
        tests
    }

    fn extract_package_description(&self, content: &str) -> Option<String> {
        let lines: Vec<&str> = content.lines().collect();
        let pkg_line = lines.iter().position(|l| self.package_re.is_match(l))?;
        doc_comment_above(&lines, pkg_line, &["//"])
    }

    fn map_type(&self, concrete: &str) -> String {
        let t = concrete.trim();

        if t == "[]byte" {
            return "Bytes".to_string();
        }
        if let Some(inner) = t.strip_prefix("[]") {
            return format!("List of {}", self.map_type(inner));
        }
        if let Some(inner) = t.strip_prefix('*') {
            return format!("Optional {}", self.map_type(inner));
        }
        if let Some(rest) = t.strip_prefix("map[") {
            // map[K]V — the key ends at the bracket matching the opener
            if let Some(close) = find_matching(t, 3, '[', ']') {
                let key = &t[4..close];
                let value = &rest[close - 3..];
                return format!(
                    "Map of {} to {}",
                    self.map_type(key),
                    self.map_type(value)
                );
            }
        }

        match t {
            "string" => "Text".to_string(),
            "int" | "int8" | "int16" | "int32" | "int64" | "uint" | "uint32" | "uint64" => {
                "Integer".to_string()
            }
            "float32" | "float64" => "Float".to_string(),
            "bool" => "Boolean".to_string(),
            "interface{}" | "any" => "Any".to_string(),
            _ => t.rsplit('.').next().unwrap_or(t).to_string(),
        }
    }
}

impl Default for GoExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#"// Package shortener turns long URLs into slugs.
package shortener

// User is a registered account.
type User struct {
	ID    int64
	Email string
	Tags  []string
	quota int
}

// Store persists slugs.
type Store interface {
	Save(slug string) error
}

type UserID = int64

// Slugify lowercases text and joins words with hyphens.
func Slugify(text string) string {
	return text
}

// Lookup resolves a slug.
func Lookup(slug string, strict bool) (*User, error) {
	return nil, nil
}

func internalHelper(x int) int { return x }
"#;

    #[test]
    fn test_extract_go_types() {
        let ex = GoExtractor::new();
        let types = ex.extract_types(SOURCE, "shortener.go");
        assert_eq!(types.len(), 3);

        let user = &types[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.kind, TypeDefKind::Struct);
        assert_eq!(user.description, "User is a registered account.");
        // unexported quota field is skipped
        assert_eq!(user.fields.len(), 3);
        assert_eq!(user.fields[0].field_type, "Integer");
        assert_eq!(user.fields[2].field_type, "List of Text");
        assert_eq!(user.line_number, 5);

        assert_eq!(types[1].kind, TypeDefKind::Interface);
        assert_eq!(types[2].kind, TypeDefKind::Alias);
    }

    #[test]
    fn test_extract_go_functions() {
        let ex = GoExtractor::new();
        let funcs = ex.extract_functions(SOURCE, "shortener.go");
        // internalHelper is unexported
        assert_eq!(funcs.len(), 2);

        assert_eq!(funcs[0].name, "Slugify");
        assert_eq!(funcs[0].params.len(), 1);
        assert_eq!(funcs[0].params[0].param_type, "Text");
        assert_eq!(funcs[0].returns.as_deref(), Some("Text"));
        assert!(funcs[0].description.contains("lowercases"));

        assert_eq!(funcs[1].name, "Lookup");
        assert_eq!(funcs[1].returns.as_deref(), Some("Optional User"));
    }

    #[test]
    fn test_extract_go_tests() {
        let ex = GoExtractor::new();
        let tests = ex.extract_tests(
            "func TestSlugifyBasic(t *testing.T) {}\nfunc helper() {}\n",
            "shortener_test.go",
        );
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].name, "TestSlugifyBasic");
        assert_eq!(tests[0].function, "slugify basic");
    }

    #[test]
    fn test_extract_go_package_description() {
        let ex = GoExtractor::new();
        assert_eq!(
            ex.extract_package_description(SOURCE),
            Some("Package shortener turns long URLs into slugs.".to_string())
        );
    }

    #[test]
    fn test_go_type_mapping_roundtrip_shape() {
        let ex = GoExtractor::new();
        assert_eq!(ex.map_type("[]*int64"), "List of Optional Integer");
        assert_eq!(ex.map_type("map[string]int64"), "Map of Text to Integer");
        assert_eq!(ex.map_type("[]byte"), "Bytes");
        assert_eq!(ex.map_type("pkg.Custom"), "Custom");
    }
}
