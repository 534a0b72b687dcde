//! TypeScript/JavaScript source extractor.

use regex::Regex;

use super::{
    doc_comment_above, generic_parts, ExtractedFunction, ExtractedTest, ExtractedType,
    SourceExtractor,
};
use crate::spec_model::{Field, Param, TypeDefKind};
use crate::text_utils::{block_end_line, find_matching, split_balanced};

/// Extractor for TypeScript and JavaScript files. Only `export`ed
/// declarations are recovered.
pub struct TypeScriptExtractor {
    interface_re: Regex,
    type_alias_re: Regex,
    enum_re: Regex,
    func_re: Regex,
    arrow_fn_re: Regex,
    field_re: Regex,
    enum_member_re: Regex,
    test_call_re: Regex,
}

impl TypeScriptExtractor {
    pub fn new() -> Self {
        Self {
            // export interface Name {
            interface_re: Regex::new(r"^export\s+interface\s+(\w+)").unwrap(),

            // export type Name = ...
            type_alias_re: Regex::new(r"^export\s+type\s+(\w+)\s*=\s*(.+?);?\s*$").unwrap(),

            // export enum Name { / export const enum Name {
            enum_re: Regex::new(r"^export\s+(?:const\s+)?enum\s+(\w+)").unwrap(),

            // export async function name(
            func_re: Regex::new(r"^export\s+(?:async\s+)?function\s+(\w+)\s*\(").unwrap(),

            // export const name = (params): Ret =>
            arrow_fn_re: Regex::new(r"^export\s+const\s+(\w+)\s*=\s*(?:async\s+)?\(").unwrap(),

            // fieldName?: type;
            field_re: Regex::new(r"^\s*(?:readonly\s+)?(\w+)(\?)?\s*:\s*([^;]+);?\s*$").unwrap(),

            // EnumMember = "value",  /  EnumMember,
            enum_member_re: Regex::new(r"^\s*([A-Za-z]\w*)\s*[,=]?").unwrap(),

            // it('title', ...) / test("title", ...)
            test_call_re: Regex::new(r#"(?:\bit|\btest)\s*\(\s*['"`]([^'"`]+)['"`]"#).unwrap(),
        }
    }

    fn parse_params(&self, raw: &str) -> Vec<Param> {
        let mut params = Vec::new();
        for part in split_balanced(raw, ',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            let part = part.split('=').next().unwrap_or(part).trim();
            match part.split_once(':') {
                Some((name, ty)) => params.push(Param {
                    name: name.trim().trim_end_matches('?').to_string(),
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

    /// Return type between the parameter list's closing paren and the body
    /// opener (or arrow).
    fn parse_return(&self, after_params: &str) -> Option<String> {
        let rest = after_params.trim();
        let rest = rest.strip_prefix(':')?;
        let rest = rest
            .split("=>")
            .next()
            .unwrap_or(rest)
            .trim()
            .trim_end_matches('{')
            .trim();
        if rest.is_empty() || rest == "void" {
            return None;
        }
        // Promise<T> unwraps to its payload.
        let rest = match generic_parts(rest, '<', '>') {
            Some(("Promise", inner)) => inner.to_string(),
            _ => rest.to_string(),
        };
        if rest == "void" {
            None
        } else {
            Some(self.map_type(&rest))
        }
    }
}

impl SourceExtractor for TypeScriptExtractor {
    fn extract_types(&self, content: &str, file: &str) -> Vec<ExtractedType> {
        let lines: Vec<&str> = content.lines().collect();
        let mut types = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            if let Some(caps) = self.interface_re.captures(line) {
                let end = block_end_line(&lines, i);
                let mut fields = Vec::new();
                for body_line in &lines[i + 1..end] {
                    let trimmed = body_line.trim();
                    if trimmed.is_empty() || trimmed.starts_with("//") || trimmed.starts_with('*')
                    {
                        continue;
                    }
                    // Method signatures carry parens; fields do not.
                    if trimmed.contains('(') {
                        continue;
                    }
                    if let Some(fc) = self.field_re.captures(body_line) {
                        fields.push(Field {
                            name: fc[1].to_string(),
                            field_type: self.map_type(fc[3].trim()),
                            description: String::new(),
                            required: fc.get(2).is_none(),
                        });
                    }
                }
                types.push(ExtractedType {
                    name: caps[1].to_string(),
                    kind: TypeDefKind::Interface,
                    description: doc_comment_above(&lines, i, &["//"]).unwrap_or_default(),
                    fields,
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            } else if let Some(caps) = self.enum_re.captures(line) {
                let end = block_end_line(&lines, i);
                let mut fields = Vec::new();
                for body_line in &lines[i + 1..end] {
                    let trimmed = body_line.trim();
                    if trimmed.is_empty() || trimmed.starts_with("//") {
                        continue;
                    }
                    if let Some(fc) = self.enum_member_re.captures(body_line) {
                        fields.push(Field {
                            name: fc[1].to_string(),
                            ..Default::default()
                        });
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
            } else if let Some(caps) = self.type_alias_re.captures(line) {
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

        types
    }

    fn extract_functions(&self, content: &str, file: &str) -> Vec<ExtractedFunction> {
        let lines: Vec<&str> = content.lines().collect();
        let mut functions = Vec::new();

        for (i, line) in lines.iter().enumerate() {
            let name = if let Some(caps) = self.func_re.captures(line) {
                caps[1].to_string()
            } else if let Some(caps) = self.arrow_fn_re.captures(line) {
                // Arrow assignments count only when the line reads as a
                // function (has a => on it).
                if !line.contains("=>") {
                    continue;
                }
                caps[1].to_string()
            } else {
                continue;
            };

            let Some(open) = line.find('(') else { continue };
            let Some(close) = find_matching(line, open, '(', ')') else {
                continue;
            };

            functions.push(ExtractedFunction {
                name,
                params: self.parse_params(&line[open + 1..close]),
                returns: self.parse_return(&line[close + 1..]),
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
            if let Some(caps) = self.test_call_re.captures(line) {
                let title = caps[1].trim().to_string();
                let function = title
                    .strip_prefix("should ")
                    .unwrap_or(&title)
                    .to_string();
                tests.push(ExtractedTest {
                    name: title.clone(),
                    function,
                    source_file: file.to_string(),
                    line_number: i + 1,
                });
            }
        }
        tests
    }

    fn extract_package_description(&self, content: &str) -> Option<String> {
        // Leading block or line comment before the first code line.
        let lines: Vec<&str> = content.lines().collect();
        let first_code = lines.iter().position(|l| {
            let t = l.trim();
            !t.is_empty()
                && !t.starts_with("//")
                && !t.starts_with("/*")
                && !t.starts_with('*')
        })?;
        doc_comment_above(&lines, first_code, &["//"])
    }

    fn map_type(&self, concrete: &str) -> String {
        let t = concrete.trim();

        // Union with null/undefined is the optional form.
        let union_parts = split_balanced(t, '|');
        if union_parts.len() == 2 {
            if let Some(payload) = union_parts
                .iter()
                .find(|p| *p != "null" && *p != "undefined")
            {
                if union_parts.iter().any(|p| p == "null" || p == "undefined") {
                    return format!("Optional {}", self.map_type(payload));
                }
            }
        }

        if let Some(inner) = t.strip_suffix("[]") {
            return format!("List of {}", self.map_type(inner));
        }
        if let Some((outer, args)) = generic_parts(t, '<', '>') {
            match outer {
                "Array" | "ReadonlyArray" | "Set" => {
                    return format!("List of {}", self.map_type(args));
                }
                "Map" | "Record" => {
                    let parts = split_balanced(args, ',');
                    if parts.len() == 2 {
                        return format!(
                            "Map of {} to {}",
                            self.map_type(&parts[0]),
                            self.map_type(&parts[1])
                        );
                    }
                }
                "Promise" => return self.map_type(args),
                _ => {}
            }
        }

        match t {
            "string" => "Text".to_string(),
            "number" | "bigint" => "Integer".to_string(),
            "boolean" => "Boolean".to_string(),
            "Uint8Array" | "Buffer" => "Bytes".to_string(),
            "any" | "unknown" | "object" => "Any".to_string(),
            _ => t.to_string(),
        }
    }
}

impl Default for TypeScriptExtractor {
    fn default() -> Self {
        Self::new()
    }
}
