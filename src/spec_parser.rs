//! Markdown specification parser: section splitter plus spec builder.
//!
//! Spec documents are user-authored prose, not a machine format. The parser
//! therefore degrades gracefully: malformed fragments are skipped with a
//! collected warning, and only structural violations (no H1 heading) fail
//! the parse outright.

use std::path::Path;

use regex::Regex;
use thiserror::Error;

use crate::spec_model::{
    Field, Function, NamedItem, Param, Spec, TestCase, TypeDef, TypeDefKind,
};
use crate::text_utils::humanize_identifier;

/// Level-2 section names the builder knows how to interpret. Matching is
/// case-insensitive; anything else folds into the spec description.
pub const RECOGNIZED_SECTIONS: [&str; 7] = [
    "Meta",
    "Target Languages",
    "Types",
    "Functions",
    "Tests",
    "Dependencies",
    "Configuration",
];

/// Errors for spec parsing. Only structural violations appear here;
/// everything recoverable becomes a warning on the resulting [`Spec`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Cannot read spec file '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Spec document has no level-1 heading to name it")]
    MissingName,
}

/// One heading-delimited region of the document.
#[derive(Debug, Clone)]
struct Section {
    name: String,
    level: usize,
    content: Vec<String>,
}

/// Parser for markdown specification documents.
pub struct SpecParser {
    heading_re: Regex,
    field_re: Regex,
    kv_re: Regex,
    named_item_re: Regex,
}

impl SpecParser {
    pub fn new() -> Self {
        Self {
            // # Heading / ## Heading / ### Heading
            heading_re: Regex::new(r"^(#{1,6})\s+(.+?)\s*$").unwrap(),

            // - `name` (Type): description
            field_re: Regex::new(r"^[-*]\s*`([^`]+)`\s*(?:\(([^)]*)\))?\s*:?\s*(.*)$").unwrap(),

            // key: value  (given:, expect:, returns:, accepts:, ...),
            // tolerating bold markers around the key
            kv_re: Regex::new(r"^\**([A-Za-z ]+?)\**\s*:\s*\**\s*(.*?)\s*$").unwrap(),

            // - `name`: description   or   - name: description
            named_item_re: Regex::new(r"^[-*]\s*`?([^`:]+)`?\s*(?::\s*(.*))?$").unwrap(),
        }
    }

    /// Parse a spec document from disk.
    pub fn parse_file(&self, path: &Path) -> Result<Spec, ParseError> {
        let content = std::fs::read_to_string(path).map_err(|e| ParseError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;
        self.parse(&content)
    }

    /// Parse spec markdown into a normalized [`Spec`].
    pub fn parse(&self, content: &str) -> Result<Spec, ParseError> {
        let sections = self.split_sections(content);

        let mut spec = Spec::default();

        spec.name = sections
            .iter()
            .find(|s| s.level == 1)
            .map(|s| s.name.clone())
            .ok_or(ParseError::MissingName)?;

        // Preamble prose under the H1 becomes the description unless Meta
        // overrides it later.
        if let Some(h1) = sections.iter().find(|s| s.level == 1) {
            let prose = h1.content.join("\n").trim().to_string();
            if !prose.is_empty() {
                spec.description = prose;
            }
        }

        self.build_meta(&sections, &mut spec);
        self.build_target_languages(&sections, &mut spec);
        self.build_types(&sections, &mut spec);
        self.build_functions(&sections, &mut spec);
        self.build_tests(&sections, &mut spec);
        spec.dependencies = self.build_named_list(&sections, "Dependencies");
        spec.configuration = self.build_named_list(&sections, "Configuration");
        self.collect_overview(&sections, &mut spec);

        spec.normalize();
        Ok(spec)
    }

    /// Split the document into heading-delimited sections. Every heading
    /// opens a new section; body lines attach to the nearest heading above.
    fn split_sections(&self, content: &str) -> Vec<Section> {
        let mut sections: Vec<Section> = Vec::new();
        let mut in_fence = false;

        for line in content.lines() {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
            }
            let caps = if in_fence || line.trim_start().starts_with("```") {
                None
            } else {
                self.heading_re.captures(line)
            };
            if let Some(caps) = caps {
                sections.push(Section {
                    level: caps[1].len(),
                    name: caps[2].trim().to_string(),
                    content: Vec::new(),
                });
            } else if let Some(section) = sections.last_mut() {
                section.content.push(line.to_string());
            }
        }

        sections
    }

    /// Find the H2 section with a recognized name, case-insensitively.
    fn find_h2<'a>(&self, sections: &'a [Section], name: &str) -> Option<&'a Section> {
        sections
            .iter()
            .find(|s| s.level == 2 && s.name.trim().eq_ignore_ascii_case(name))
    }

    /// All H3+ subsections between the named H2 and the next heading of
    /// level <= 2, paired with the index they appear at.
    fn subsections<'a>(&self, sections: &'a [Section], h2_name: &str) -> Vec<&'a Section> {
        let mut inside = false;
        let mut subs = Vec::new();
        for section in sections {
            if section.level <= 2 {
                inside = section.level == 2
                    && section.name.trim().eq_ignore_ascii_case(h2_name);
                continue;
            }
            if inside {
                subs.push(section);
            }
        }
        subs
    }

    fn build_meta(&self, sections: &[Section], spec: &mut Spec) {
        let Some(meta) = self.find_h2(sections, "Meta") else {
            return;
        };
        for line in &meta.content {
            let trimmed = line.trim().trim_start_matches(['-', '*']).trim();
            if let Some(caps) = self.kv_re.captures(trimmed) {
                let key = caps[1].trim().to_lowercase();
                let value = caps[2].trim().to_string();
                match key.as_str() {
                    "version" => spec.version = value,
                    "description" => spec.description = value,
                    _ => {}
                }
            }
        }
    }

    fn build_target_languages(&self, sections: &[Section], spec: &mut Spec) {
        let Some(section) = self.find_h2(sections, "Target Languages") else {
            return;
        };
        for line in &section.content {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let body = trimmed.trim_start_matches(['-', '*']).trim();
            // Bullets carry one language each; a bare line may carry a
            // comma-separated list.
            for lang in body.split(',') {
                let lang = lang.trim().trim_matches('`');
                if !lang.is_empty() {
                    spec.target_languages.push(lang.to_string());
                }
            }
        }
    }

    fn build_types(&self, sections: &[Section], spec: &mut Spec) {
        for sub in self.subsections(sections, "Types") {
            let (name, kind, alias_of) = self.parse_type_heading(&sub.name);
            if name.is_empty() {
                spec.warnings
                    .push(format!("Skipped type with empty name: '{}'", sub.name));
                continue;
            }

            let mut ty = TypeDef {
                name,
                kind,
                alias_of,
                ..Default::default()
            };

            let mut prose = Vec::new();
            for line in &sub.content {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if let Some(caps) = self.field_re.captures(trimmed) {
                    let description = caps.get(3).map(|m| m.as_str()).unwrap_or("").trim();
                    let (description, required) = strip_required_marker(description);
                    ty.fields.push(Field {
                        name: caps[1].trim().to_string(),
                        field_type: caps
                            .get(2)
                            .map(|m| m.as_str().trim().to_string())
                            .unwrap_or_default(),
                        description,
                        required,
                    });
                } else if let Some(rest) = strip_key(trimmed, "alias of") {
                    ty.kind = TypeDefKind::Alias;
                    ty.alias_of = Some(rest.trim_matches('`').to_string());
                } else if !trimmed.starts_with('-') && !trimmed.starts_with('*') {
                    prose.push(trimmed.to_string());
                }
            }
            ty.description = prose.join(" ");
            spec.types.push(ty);
        }
    }

    /// `### Name`, `### Name (enum)`, `### Name (alias of Text)`.
    fn parse_type_heading(&self, heading: &str) -> (String, TypeDefKind, Option<String>) {
        let heading = heading.trim().trim_matches('`');
        if let Some(open) = heading.find('(') {
            let name = heading[..open].trim().trim_matches('`').to_string();
            let qualifier = heading[open + 1..].trim_end_matches(')').trim();
            if qualifier.eq_ignore_ascii_case("enum") {
                return (name, TypeDefKind::Enum, None);
            }
            if qualifier.eq_ignore_ascii_case("interface") {
                return (name, TypeDefKind::Interface, None);
            }
            if qualifier.eq_ignore_ascii_case("struct") {
                return (name, TypeDefKind::Struct, None);
            }
            if let Some(target) = strip_prefix_ci(qualifier, "alias of ") {
                return (name, TypeDefKind::Alias, Some(target.trim().to_string()));
            }
            return (name, TypeDefKind::Struct, None);
        }
        (heading.to_string(), TypeDefKind::Struct, None)
    }

    fn build_functions(&self, sections: &[Section], spec: &mut Spec) {
        for sub in self.subsections(sections, "Functions") {
            let name = sub.name.trim().trim_matches('`').to_string();
            if name.is_empty() {
                spec.warnings.push("Skipped function with empty name".to_string());
                continue;
            }

            let mut func = Function {
                name,
                ..Default::default()
            };

            // Bold labels ("**Accepts:**", "Logic:") switch the block the
            // following lines belong to. Logic stays opaque free text.
            let mut block = FunctionBlock::None;
            let mut logic_lines: Vec<String> = Vec::new();
            let mut in_fence = false;

            for line in &sub.content {
                let trimmed = line.trim();
                if trimmed.starts_with("```") {
                    in_fence = !in_fence;
                    continue;
                }
                if in_fence {
                    if block == FunctionBlock::Logic {
                        logic_lines.push(line.to_string());
                    }
                    continue;
                }
                if trimmed.is_empty() {
                    continue;
                }

                let label = self.kv_re.captures(trimmed).map(|caps| {
                    (
                        caps[1].trim().to_lowercase(),
                        caps.get(2).map(|m| m.as_str().trim().to_string()).unwrap_or_default(),
                    )
                });

                match label.as_ref().map(|(k, v)| (k.as_str(), v.as_str())) {
                    Some(("accepts", rest)) => {
                        block = FunctionBlock::Accepts;
                        if is_inline_param_list(rest) {
                            self.push_inline_params(rest, &mut func);
                        }
                    }
                    Some(("returns", rest)) => {
                        block = FunctionBlock::None;
                        let rest = rest.trim_matches('`').trim();
                        if !rest.is_empty() && !rest.eq_ignore_ascii_case("none") {
                            func.returns = Some(rest.to_string());
                        }
                    }
                    Some(("logic", rest)) => {
                        block = FunctionBlock::Logic;
                        if !rest.is_empty() {
                            logic_lines.push(rest.to_string());
                        }
                    }
                    Some(("errors", rest)) => {
                        block = FunctionBlock::Errors;
                        if !rest.is_empty() {
                            func.errors.push(rest.to_string());
                        }
                    }
                    _ => match block {
                        FunctionBlock::Accepts => {
                            if let Some(caps) = self.field_re.captures(trimmed) {
                                func.accepts.push(Param {
                                    name: caps[1].trim().to_string(),
                                    param_type: caps
                                        .get(2)
                                        .map(|m| m.as_str().trim().to_string())
                                        .unwrap_or_default(),
                                    description: caps
                                        .get(3)
                                        .map(|m| m.as_str().trim().to_string())
                                        .unwrap_or_default(),
                                });
                            } else {
                                // Prose between parameter lines is skipped.
                                let bare = trimmed.trim_start_matches(['-', '*']).trim();
                                if is_inline_param_list(bare) {
                                    self.push_inline_params(bare, &mut func);
                                }
                            }
                        }
                        FunctionBlock::Errors => {
                            let err = trimmed.trim_start_matches(['-', '*']).trim();
                            if !err.is_empty() {
                                func.errors.push(err.to_string());
                            }
                        }
                        FunctionBlock::Logic => logic_lines.push(line.to_string()),
                        FunctionBlock::None => {}
                    },
                }
            }

            func.logic = logic_lines.join("\n").trim().to_string();
            spec.functions.push(func);
        }
    }

    /// Inline parameter form: `text: Text, limit: Integer`.
    fn push_inline_params(&self, text: &str, func: &mut Function) {
        for part in crate::text_utils::split_balanced(text, ',') {
            if let Some((name, ty)) = part.split_once(':') {
                func.accepts.push(Param {
                    name: name.trim().trim_matches('`').to_string(),
                    param_type: ty.trim().trim_matches('`').to_string(),
                    description: String::new(),
                });
            } else if !part.trim().is_empty() {
                func.accepts.push(Param {
                    name: part.trim().trim_matches('`').to_string(),
                    ..Default::default()
                });
            }
        }
    }

    fn build_tests(&self, sections: &[Section], spec: &mut Spec) {
        for sub in self.subsections(sections, "Tests") {
            let heading = sub.name.trim().trim_matches('`').to_string();
            let mut case = TestCase {
                name: heading.clone(),
                function: heading,
                ..Default::default()
            };
            let mut saw_any = false;

            for line in &sub.content {
                let trimmed = line.trim().trim_start_matches(['-', '*']).trim();
                let Some(caps) = self.kv_re.captures(trimmed) else {
                    continue;
                };
                let key = caps[1].trim().to_lowercase();
                let value = caps[2].trim();
                match key.as_str() {
                    "given" => {
                        case.given = Some(parse_loose_value(value));
                        saw_any = true;
                    }
                    "expect" => {
                        case.expect = Some(parse_loose_value(value));
                        saw_any = true;
                    }
                    "function" => {
                        case.function = value.trim_matches('`').to_string();
                        saw_any = true;
                    }
                    _ => {}
                }
            }

            if saw_any {
                spec.tests.push(case);
            } else if sub.content.iter().any(|l| !l.trim().is_empty()) {
                spec.warnings.push(format!(
                    "Test section '{}' has no given/expect/function lines",
                    case.name
                ));
            }
            // A bare heading with no body is a grouping heading, not a case.
        }
    }

    fn build_named_list(&self, sections: &[Section], h2_name: &str) -> Vec<NamedItem> {
        let Some(section) = self.find_h2(sections, h2_name) else {
            return Vec::new();
        };
        let mut items = Vec::new();
        for line in &section.content {
            let trimmed = line.trim();
            if trimmed.is_empty() || !trimmed.starts_with(['-', '*']) {
                continue;
            }
            if let Some(caps) = self.named_item_re.captures(trimmed) {
                let name = caps[1].trim().to_string();
                if name.is_empty() || name.eq_ignore_ascii_case("none") {
                    continue;
                }
                items.push(NamedItem {
                    name,
                    description: caps
                        .get(2)
                        .map(|m| m.as_str().trim().to_string())
                        .unwrap_or_default(),
                });
            }
        }
        items
    }

    /// Unrecognized H2 sections are preserved as free text, not discarded —
    /// prose-heavy specs carry real content outside the rigid sections.
    fn collect_overview(&self, sections: &[Section], spec: &mut Spec) {
        let mut extra = Vec::new();
        for section in sections {
            if section.level != 2 {
                continue;
            }
            let recognized = RECOGNIZED_SECTIONS
                .iter()
                .any(|r| r.eq_ignore_ascii_case(section.name.trim()));
            if !recognized {
                let body = section.content.join("\n").trim().to_string();
                if !body.is_empty() {
                    extra.push(format!("{}: {}", section.name.trim(), body));
                }
            }
        }
        if !extra.is_empty() {
            if !spec.description.is_empty() {
                spec.description.push('\n');
            }
            spec.description.push_str(&extra.join("\n"));
        }
    }
}

impl Default for SpecParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(PartialEq)]
enum FunctionBlock {
    None,
    Accepts,
    Logic,
    Errors,
}

/// Parse a `given:`/`expect:` value: JSON scalar when unambiguous
/// (quoted string, number, boolean, null, inline array/object), raw text
/// otherwise.
fn parse_loose_value(raw: &str) -> serde_json::Value {
    let trimmed = raw.trim().trim_matches('`').trim();
    match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(_) => serde_json::Value::String(trimmed.to_string()),
    }
}

/// Split a trailing "(required)" / "(optional)" marker off a field
/// description. Fields default to optional.
fn strip_required_marker(description: &str) -> (String, bool) {
    let trimmed = description.trim();
    if let Some(rest) = strip_suffix_ci(trimmed, "(required)") {
        return (rest.trim().to_string(), true);
    }
    if let Some(rest) = strip_suffix_ci(trimmed, "(optional)") {
        return (rest.trim().to_string(), false);
    }
    (trimmed.to_string(), false)
}

fn strip_key<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let rest = strip_prefix_ci(line, key)?;
    let rest = rest.strip_prefix(':')?;
    Some(rest.trim())
}

/// ASCII case-insensitive prefix strip. Markers are ASCII, but the
/// surrounding text need not be; slicing is guarded against landing off a
/// character boundary (lowercasing can change byte lengths, e.g. `İ`).
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

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    if s.is_char_boundary(cut) && s[cut..].eq_ignore_ascii_case(suffix) {
        Some(&s[..cut])
    } else {
        None
    }
}

/// Whether a bare line reads as an inline parameter list
/// (`text: Text, limit`) rather than prose: every comma part must start
/// with a lone identifier.
fn is_inline_param_list(text: &str) -> bool {
    let parts = crate::text_utils::split_balanced(text, ',');
    !parts.is_empty()
        && parts.iter().all(|part| {
            let name = part.split(':').next().unwrap_or("").trim().trim_matches('`');
            !name.is_empty() && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        })
}

/// Derive a function-under-test name from a test identifier by stripping
/// conventional prefixes and humanizing the rest. Shared with the source
/// extractors' test discovery.
pub fn function_under_test(test_name: &str) -> String {
    let stripped = ["test_", "test", "should_", "should"]
        .iter()
        .find_map(|prefix| strip_prefix_ci(test_name, prefix))
        .unwrap_or(test_name);
    let stripped = stripped.trim_start_matches('_');
    if stripped.is_empty() {
        test_name.to_string()
    } else {
        humanize_identifier(stripped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requires_h1() {
        let parser = SpecParser::new();
        let err = parser.parse("## Functions\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingName));
    }

    #[test]
    fn test_parse_name_and_description() {
        let parser = SpecParser::new();
        let spec = parser
            .parse("# url-shortener\n\nShortens URLs.\n\n## Target Languages\n- python\n")
            .unwrap();
        assert_eq!(spec.name, "url-shortener");
        assert_eq!(spec.description, "Shortens URLs.");
        assert_eq!(spec.target_languages, vec!["python"]);
    }

    #[test]
    fn test_parse_meta_section() {
        let parser = SpecParser::new();
        let spec = parser
            .parse("# demo\n\n## Meta\n- version: 1.2.0\n- description: A demo spec\n")
            .unwrap();
        assert_eq!(spec.version, "1.2.0");
        assert_eq!(spec.description, "A demo spec");
    }

    #[test]
    fn test_parse_target_languages_comma_form() {
        let parser = SpecParser::new();
        let spec = parser
            .parse("# demo\n\n## Target Languages\npython, Go, python\n")
            .unwrap();
        assert_eq!(spec.target_languages, vec!["python", "go"]);
    }

    #[test]
    fn test_parse_struct_type_with_fields() {
        let parser = SpecParser::new();
        let content = r#"# demo

## Types

### User
A registered account.

- `id` (Integer): unique identifier (required)
- `email` (Text): contact address
- `tags` (List of Text): labels
"#;
        let spec = parser.parse(content).unwrap();
        assert_eq!(spec.types.len(), 1);
        let ty = &spec.types[0];
        assert_eq!(ty.name, "User");
        assert_eq!(ty.kind, TypeDefKind::Struct);
        assert_eq!(ty.description, "A registered account.");
        assert_eq!(ty.fields.len(), 3);
        assert!(ty.fields[0].required);
        assert_eq!(ty.fields[0].description, "unique identifier");
        assert!(!ty.fields[1].required);
        assert_eq!(ty.fields[2].field_type, "List of Text");
    }

    #[test]
    fn test_parse_enum_and_alias_types() {
        let parser = SpecParser::new();
        let content = r#"# demo

## Types

### Status (enum)
- `active`
- `suspended`

### UserId (alias of Integer)
"#;
        let spec = parser.parse(content).unwrap();
        assert_eq!(spec.types[0].kind, TypeDefKind::Enum);
        assert_eq!(spec.types[0].fields.len(), 2);
        assert_eq!(spec.types[1].kind, TypeDefKind::Alias);
        assert_eq!(spec.types[1].alias_of.as_deref(), Some("Integer"));
    }

    #[test]
    fn test_parse_function_inline_accepts() {
        let parser = SpecParser::new();
        let content = r#"# demo

## Functions

### slugify
accepts: text: Text
returns: Text

Logic:
```
Lowercase the text and replace spaces with hyphens.
```
"#;
        let spec = parser.parse(content).unwrap();
        assert_eq!(spec.functions.len(), 1);
        let func = &spec.functions[0];
        assert_eq!(func.name, "slugify");
        assert_eq!(func.accepts.len(), 1);
        assert_eq!(func.accepts[0].name, "text");
        assert_eq!(func.accepts[0].param_type, "Text");
        assert_eq!(func.returns.as_deref(), Some("Text"));
        assert!(func.logic.contains("replace spaces"));
    }

    #[test]
    fn test_parse_function_bullet_accepts_and_errors() {
        let parser = SpecParser::new();
        let content = r#"# demo

## Functions

### register_user
**Accepts:**
- `email` (Text): contact address
- `age` (Optional Integer): years

**Returns:** User

**Logic:** Create the account and persist it.

**Errors:**
- email already taken
- age below 13
"#;
        let spec = parser.parse(content).unwrap();
        let func = &spec.functions[0];
        assert_eq!(func.accepts.len(), 2);
        assert_eq!(func.accepts[1].param_type, "Optional Integer");
        assert_eq!(func.returns.as_deref(), Some("User"));
        assert_eq!(func.logic, "Create the account and persist it.");
        assert_eq!(func.errors.len(), 2);
    }

    #[test]
    fn test_parse_test_case_scalar_values() {
        let parser = SpecParser::new();
        let content = r#"# demo

## Tests

### slugify
- given: "Hello World"
- expect: "hello-world"
"#;
        let spec = parser.parse(content).unwrap();
        assert_eq!(spec.tests.len(), 1);
        let case = &spec.tests[0];
        assert_eq!(case.function, "slugify");
        assert_eq!(case.given, Some(serde_json::json!("Hello World")));
        assert_eq!(case.expect, Some(serde_json::json!("hello-world")));
    }

    #[test]
    fn test_parse_test_case_typed_values() {
        let parser = SpecParser::new();
        let content = "# demo\n\n## Tests\n\n### counting\ngiven: 41\nexpect: true\n";
        let spec = parser.parse(content).unwrap();
        assert_eq!(spec.tests[0].given, Some(serde_json::json!(41)));
        assert_eq!(spec.tests[0].expect, Some(serde_json::json!(true)));
    }

    #[test]
    fn test_parse_test_case_raw_text_value() {
        let parser = SpecParser::new();
        let content = "# demo\n\n## Tests\n\n### t\ngiven: hello-world unquoted\n";
        let spec = parser.parse(content).unwrap();
        assert_eq!(
            spec.tests[0].given,
            Some(serde_json::json!("hello-world unquoted"))
        );
    }

    #[test]
    fn test_parse_dependencies_and_configuration() {
        let parser = SpecParser::new();
        let content = r#"# demo

## Dependencies
- `redis`: cache layer
- postgres: primary store

## Configuration
- `PORT`: listen port
"#;
        let spec = parser.parse(content).unwrap();
        assert_eq!(spec.dependencies.len(), 2);
        assert_eq!(spec.dependencies[0].name, "redis");
        assert_eq!(spec.dependencies[0].description, "cache layer");
        assert_eq!(spec.configuration.len(), 1);
        assert_eq!(spec.configuration[0].name, "PORT");
    }

    #[test]
    fn test_unrecognized_sections_preserved() {
        let parser = SpecParser::new();
        let content = "# demo\n\n## Background\nWhy this exists.\n\n## Target Languages\n- go\n";
        let spec = parser.parse(content).unwrap();
        assert!(spec.description.contains("Why this exists."));
        assert_eq!(spec.target_languages, vec!["go"]);
    }

    #[test]
    fn test_sections_in_any_order_and_mixed_case() {
        let parser = SpecParser::new();
        let content = "# demo\n\n## tests\n\n### t\ngiven: 1\n\n## TARGET LANGUAGES\n- rust\n";
        let spec = parser.parse(content).unwrap();
        assert_eq!(spec.tests.len(), 1);
        assert_eq!(spec.target_languages, vec!["rust"]);
    }

    #[test]
    fn test_empty_target_languages_is_a_valid_parse() {
        let parser = SpecParser::new();
        let spec = parser.parse("# demo\n\n## Functions\n\n### f\nreturns: Text\n").unwrap();
        assert!(spec.target_languages.is_empty());
        assert_eq!(spec.functions.len(), 1);
    }

    #[test]
    fn test_function_under_test_prefixes() {
        assert_eq!(function_under_test("test_slugify_basic"), "slugify basic");
        assert_eq!(function_under_test("shouldRejectEmptyInput"), "reject empty input");
        assert_eq!(function_under_test("TestParseHeader"), "parse header");
    }

    #[test]
    fn test_function_under_test_non_ascii_identifier() {
        assert_eq!(function_under_test("test_überschuss"), "überschuss");
        // `İ` lowercases to `i` plus a combining dot; the prefix strip must
        // not index the original name with the lowered length.
        assert_eq!(function_under_test("Testİstanbul"), "i\u{307}stanbul");
    }

    #[test]
    fn test_required_marker_survives_non_ascii_description() {
        let parser = SpecParser::new();
        let content = "# demo\n\n## Types\n\n### User\n- `name` (Text): İİİİİİİİİİİ (required)\n";
        let spec = parser.parse(content).unwrap();
        let field = &spec.types[0].fields[0];
        assert!(field.required);
        assert_eq!(field.description, "İİİİİİİİİİİ");
    }

    #[test]
    fn test_alias_target_with_non_ascii_name() {
        let parser = SpecParser::new();
        let spec = parser
            .parse("# demo\n\n## Types\n\n### Id (alias of İdentifier)\n")
            .unwrap();
        assert_eq!(spec.types[0].alias_of.as_deref(), Some("İdentifier"));
    }

    #[test]
    fn test_accepts_prose_is_not_a_parameter() {
        let parser = SpecParser::new();
        let content = r#"# demo

## Functions

### register
**Accepts:**
- `email` (Text): contact address
All other values are validated upstream.

**Returns:** User
"#;
        let spec = parser.parse(content).unwrap();
        let func = &spec.functions[0];
        assert_eq!(func.accepts.len(), 1);
        assert_eq!(func.accepts[0].name, "email");
    }
}
