//! Python source extractor.

use regex::Regex;

use super::{
    generic_parts, ExtractedFunction, ExtractedTest, ExtractedType, SourceExtractor,
};
use crate::spec_model::{Field, Param, TypeDefKind};
use crate::spec_parser::function_under_test;
use crate::text_utils::split_balanced;

/// Extractor for Python files. Module-level declarations only; names with a
/// leading underscore are treated as private and skipped.
pub struct PythonExtractor {
    class_re: Regex,
    def_re: Regex,
    field_annotation_re: Regex,
    enum_member_re: Regex,
    docstring_re: Regex,
}

impl PythonExtractor {
    pub fn new() -> Self {
        Self {
            // class Name: / class Name(Base):
            class_re: Regex::new(r"^class\s+(\w+)\s*(?:\(([^)]*)\))?\s*:").unwrap(),

            // def name(params) -> ret:
            def_re: Regex::new(r"^def\s+(\w+)\s*\(([^)]*)\)\s*(?:->\s*([^:]+))?\s*:").unwrap(),

            // indented "name: type" annotation (class body)
            field_annotation_re: Regex::new(r"^\s+(\w+)\s*:\s*([^=#]+?)\s*(?:=.*)?$").unwrap(),

            // indented "NAME = value" (enum member)
            enum_member_re: Regex::new(r"^\s+([A-Za-z]\w*)\s*=").unwrap(),

            // """one-line docstring"""
            docstring_re: Regex::new(r#"^\s*(?:"{3}|'{3})(.*?)(?:"{3}|'{3})?\s*$"#).unwrap(),
        }
    }

    /// First line of the docstring opening at `start`, if one opens there.
    fn docstring_at(&self, lines: &[&str], start: usize) -> Option<String> {
        let line = lines.get(start)?.trim();
        if !line.starts_with("\"\"\"") && !line.starts_with("'''") {
            return None;
        }
        let caps = self.docstring_re.captures(line)?;
        let first = caps[1].trim().to_string();
        if !first.is_empty() {
            return Some(first);
        }
        // Opening fence on its own line: take the next non-empty line.
        lines
            .get(start + 1)
            .map(|l| l.trim().trim_end_matches("\"\"\"").trim_end_matches("'''").trim().to_string())
            .filter(|l| !l.is_empty())
    }

    /// Docstring attached to a declaration whose header is at `decl_line`.
    fn declaration_docstring(&self, lines: &[&str], decl_line: usize) -> String {
        self.docstring_at(lines, decl_line + 1).unwrap_or_default()
    }

    /// End of an indented block opened by the header at `start` (exclusive).
    fn block_end(&self, lines: &[&str], start: usize) -> usize {
        for (i, line) in lines.iter().enumerate().skip(start + 1) {
            if !line.trim().is_empty() && !line.starts_with([' ', '\t']) {
                return i;
            }
        }
        lines.len()
    }

    fn parse_params(&self, raw: &str) -> Vec<Param> {
        let mut params = Vec::new();
        for part in split_balanced(raw, ',') {
            let part = part.trim();
            if part.is_empty()
                || part == "self"
                || part == "cls"
                || part.starts_with('*')
                || part == "/"
            {
                continue;
            }
            let part = part.split('=').next().unwrap_or(part).trim();
            match part.split_once(':') {
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
}

impl SourceExtractor for PythonExtractor {
    fn extract_types(&self, content: &str, file: &str) -> Vec<ExtractedType> {
        let lines: Vec<&str> = content.lines().collect();
        let mut types = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let Some(caps) = self.class_re.captures(line) else {
                continue;
            };
            let name = caps[1].to_string();
            if name.starts_with('_') {
                continue;
            }

            let bases = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            let is_enum = bases.split(',').any(|b| {
                let b = b.trim();
                b == "Enum" || b == "IntEnum" || b == "StrEnum" || b.ends_with(".Enum")
            });

            // Dataclasses and plain classes both map to struct.
            let kind = if is_enum {
                TypeDefKind::Enum
            } else {
                TypeDefKind::Struct
            };

            let end = self.block_end(&lines, i);
            let mut fields = Vec::new();
            for body_line in &lines[i + 1..end] {
                let trimmed = body_line.trim();
                if trimmed.starts_with("def ") || trimmed.starts_with("async def ") {
                    break; // methods follow the field block
                }
                if is_enum {
                    if let Some(fc) = self.enum_member_re.captures(body_line) {
                        fields.push(Field {
                            name: fc[1].to_string(),
                            ..Default::default()
                        });
                    }
                } else if let Some(fc) = self.field_annotation_re.captures(body_line) {
                    let field_name = fc[1].to_string();
                    if field_name.starts_with('_') {
                        continue;
                    }
                    fields.push(Field {
                        name: field_name,
                        field_type: self.map_type(fc[2].trim()),
                        description: String::new(),
                        required: false,
                    });
                }
            }

            types.push(ExtractedType {
                name,
                kind,
                description: self.declaration_docstring(&lines, i),
                fields,
                source_file: file.to_string(),
                line_number: i + 1,
            });
        }

        types
    }

    fn extract_functions(&self, content: &str, file: &str) -> Vec<ExtractedFunction> {
        let lines: Vec<&str> = content.lines().collect();
        let mut functions = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            // Module-level defs only; indented defs are methods.
            let line_for_match = line.strip_prefix("async ").unwrap_or(line);
            let Some(caps) = self.def_re.captures(line_for_match) else {
                continue;
            };
            let name = caps[1].to_string();
            if name.starts_with('_') {
                continue;
            }

            let params = self.parse_params(caps.get(2).map(|m| m.as_str()).unwrap_or(""));
            let returns = caps
                .get(3)
                .map(|m| m.as_str().trim())
                .filter(|r| !r.is_empty() && *r != "None")
                .map(|r| self.map_type(r));

            functions.push(ExtractedFunction {
                name,
                params,
                returns,
                description: self.declaration_docstring(&lines, i),
                signature: line.trim().trim_end_matches(':').to_string(),
                source_file: file.to_string(),
                line_number: i + 1,
            });
        }

        functions
    }

    fn extract_tests(&self, content: &str, file: &str) -> Vec<ExtractedTest> {
        let mut tests = Vec::new();
        for (i, line) in content.lines().enumerate() {
            let trimmed = line.trim_start();
            let Some(caps) = self.def_re.captures(trimmed) else {
                continue;
            };
            let name = caps[1].to_string();
            if name.starts_with("test_") || name.starts_with("test") && name != "test" {
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
        let first_code = lines
            .iter()
            .position(|l| !l.trim().is_empty() && !l.trim_start().starts_with('#'))?;
        self.docstring_at(&lines, first_code)
    }

    fn map_type(&self, concrete: &str) -> String {
        let t = concrete.trim();

        // "X | None" union form of Optional
        if let Some(inner) = t.strip_suffix("| None") {
            return format!("Optional {}", self.map_type(inner.trim()));
        }

        if let Some((outer, args)) = generic_parts(t, '[', ']') {
            match outer {
                "List" | "list" | "Sequence" | "Set" | "set" | "FrozenSet" | "frozenset"
                | "Tuple" | "tuple" => {
                    let first = split_balanced(args, ',').into_iter().next().unwrap_or_default();
                    return format!("List of {}", self.map_type(&first));
                }
                "Optional" => return format!("Optional {}", self.map_type(args)),
                "Dict" | "dict" | "Mapping" => {
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
            "str" => "Text".to_string(),
            "int" => "Integer".to_string(),
            "float" => "Float".to_string(),
            "bool" => "Boolean".to_string(),
            "bytes" | "bytearray" => "Bytes".to_string(),
            "Any" | "object" => "Any".to_string(),
            _ => t.rsplit('.').next().unwrap_or(t).to_string(),
        }
    }
}

impl Default for PythonExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = r#""""URL shortener service."""

from dataclasses import dataclass
from enum import Enum


@dataclass
class User:
    """A registered account."""
    id: int
    email: str
    tags: List[str]
    _secret: str

    def rename(self, email: str) -> None:
        self.email = email


class Status(Enum):
    ACTIVE = "active"
    SUSPENDED = "suspended"


def slugify(text: str, max_length: int = 64) -> str:
    """Lowercase text and join words with hyphens."""
    return text


def _helper(x):
    return x
"#;

    #[test]
    fn test_extract_python_types() {
        let ex = PythonExtractor::new();
        let types = ex.extract_types(SOURCE, "shortener.py");
        assert_eq!(types.len(), 2);

        let user = &types[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.kind, TypeDefKind::Struct);
        assert_eq!(user.description, "A registered account.");
        // _secret is private; rename is a method, not a field
        assert_eq!(user.fields.len(), 3);
        assert_eq!(user.fields[0].field_type, "Integer");
        assert_eq!(user.fields[2].field_type, "List of Text");

        let status = &types[1];
        assert_eq!(status.kind, TypeDefKind::Enum);
        assert_eq!(status.fields.len(), 2);
        assert_eq!(status.fields[0].name, "ACTIVE");
    }

    #[test]
    fn test_extract_python_functions() {
        let ex = PythonExtractor::new();
        let funcs = ex.extract_functions(SOURCE, "shortener.py");
        assert_eq!(funcs.len(), 1);

        let slugify = &funcs[0];
        assert_eq!(slugify.name, "slugify");
        assert_eq!(slugify.params.len(), 2);
        assert_eq!(slugify.params[0].name, "text");
        assert_eq!(slugify.params[0].param_type, "Text");
        assert_eq!(slugify.params[1].param_type, "Integer");
        assert_eq!(slugify.returns.as_deref(), Some("Text"));
        assert_eq!(slugify.description, "Lowercase text and join words with hyphens.");
    }

    #[test]
    fn test_extract_python_tests() {
        let ex = PythonExtractor::new();
        let tests = ex.extract_tests(
            "def test_slugify_basic():\n    assert True\n\ndef helper():\n    pass\n",
            "test_shortener.py",
        );
        assert_eq!(tests.len(), 1);
        assert_eq!(tests[0].name, "test_slugify_basic");
        assert_eq!(tests[0].function, "slugify basic");
        assert_eq!(tests[0].line_number, 1);
    }

    #[test]
    fn test_extract_python_module_docstring() {
        let ex = PythonExtractor::new();
        assert_eq!(
            ex.extract_package_description(SOURCE),
            Some("URL shortener service.".to_string())
        );
    }

    #[test]
    fn test_python_type_mapping() {
        let ex = PythonExtractor::new();
        assert_eq!(ex.map_type("List[Optional[int]]"), "List of Optional Integer");
        assert_eq!(ex.map_type("Dict[str, int]"), "Map of Text to Integer");
        assert_eq!(ex.map_type("str | None"), "Optional Text");
        assert_eq!(ex.map_type("UserProfile"), "UserProfile");
    }
}
