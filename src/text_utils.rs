//! String scanning helpers shared by the spec parser and the source extractors.
//!
//! All helpers respect balanced delimiters so that generic types
//! (`Map<string, number>`) and nested parameter lists survive splitting.

/// Split `s` on `delimiter`, ignoring delimiters nested inside `<>`, `()`,
/// `[]` or `{}` pairs.
///
/// # Examples
/// ```
/// use specbridge::text_utils::split_balanced;
///
/// let parts = split_balanced("Map<string, int>, List<string>", ',');
/// assert_eq!(parts, vec!["Map<string, int>", "List<string>"]);
/// ```
pub fn split_balanced(s: &str, delimiter: char) -> Vec<String> {
    const PAIRS: [(char, char); 4] = [('<', '>'), ('(', ')'), ('[', ']'), ('{', '}')];

    let mut parts = Vec::new();
    let mut current = String::new();
    let mut depths = [0u32; 4];

    for c in s.chars() {
        if let Some(i) = PAIRS.iter().position(|&(open, _)| open == c) {
            depths[i] += 1;
        } else if let Some(i) = PAIRS.iter().position(|&(_, close)| close == c) {
            depths[i] = depths[i].saturating_sub(1);
        } else if c == delimiter && depths.iter().all(|&d| d == 0) {
            parts.push(current.trim().to_string());
            current = String::new();
            continue;
        }
        current.push(c);
    }

    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }

    parts
}

/// Byte index of the `close` delimiter matching the `open` delimiter at
/// `start`, or `None` if the input is unbalanced. `s[start]` must be `open`.
pub fn find_matching(s: &str, start: usize, open: char, close: char) -> Option<usize> {
    let mut iter = s[start..].char_indices();
    let (_, first) = iter.next()?;
    if first != open {
        return None;
    }
    let mut depth = 1u32;
    for (offset, c) in iter {
        if c == open {
            depth += 1;
        } else if c == close {
            depth -= 1;
            if depth == 0 {
                return Some(start + offset);
            }
        }
    }
    None
}

/// Index of the line (0-based, inclusive) on which a brace-delimited block
/// ends, given the index of the line containing the opening brace.
///
/// Counts `{`/`}` per line starting from `open_line`. Used by the source
/// extractors to bound declaration bodies, where a regex alone is unsound
/// for nested blocks. Returns the last line if the block never closes.
pub fn block_end_line(lines: &[&str], open_line: usize) -> usize {
    let mut depth: i32 = 0;
    let mut seen_open = false;

    for (i, line) in lines.iter().enumerate().skip(open_line) {
        for c in line.chars() {
            match c {
                '{' => {
                    depth += 1;
                    seen_open = true;
                }
                '}' => depth -= 1,
                _ => {}
            }
        }
        if seen_open && depth <= 0 {
            return i;
        }
    }

    lines.len().saturating_sub(1)
}

/// Convert an identifier in camelCase, PascalCase or snake_case into
/// lower-case space-separated words: `parseUserName` -> `parse user name`.
pub fn humanize_identifier(name: &str) -> String {
    let mut words = String::new();
    let mut prev_lower = false;

    for c in name.chars() {
        if c == '_' || c == '-' {
            if !words.ends_with(' ') {
                words.push(' ');
            }
            prev_lower = false;
        } else if c.is_uppercase() {
            if prev_lower && !words.ends_with(' ') {
                words.push(' ');
            }
            words.extend(c.to_lowercase());
            prev_lower = false;
        } else {
            words.push(c);
            prev_lower = c.is_lowercase() || c.is_ascii_digit();
        }
    }

    words.trim().to_string()
}

/// Collapse runs of whitespace into single spaces and lower-case the result.
/// Feature identifiers in the parity matrix are normalized with this.
pub fn normalize_feature_id(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_balanced_nested_generics() {
        let parts = split_balanced("Map<string, List<int>>, name: string", ',');
        assert_eq!(parts, vec!["Map<string, List<int>>", "name: string"]);
    }

    #[test]
    fn test_split_balanced_plain() {
        assert_eq!(split_balanced("a, b, c", ','), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_split_balanced_empty() {
        assert!(split_balanced("", ',').is_empty());
    }

    #[test]
    fn test_find_matching_nested() {
        let s = "fn f(a: (u8, u8)) -> u8";
        let open = s.find('(').unwrap();
        assert_eq!(find_matching(s, open, '(', ')'), Some(16));
    }

    #[test]
    fn test_find_matching_unbalanced() {
        assert_eq!(find_matching("f(a, (b", 1, '(', ')'), None);
    }

    #[test]
    fn test_block_end_line_nested() {
        let src = "func F() {\n  if x {\n    y()\n  }\n}\nfunc G() {}";
        let lines: Vec<&str> = src.lines().collect();
        assert_eq!(block_end_line(&lines, 0), 4);
        assert_eq!(block_end_line(&lines, 5), 5);
    }

    #[test]
    fn test_humanize_camel_case() {
        assert_eq!(humanize_identifier("parseUserName"), "parse user name");
    }

    #[test]
    fn test_humanize_snake_case() {
        assert_eq!(humanize_identifier("slugify_title_text"), "slugify title text");
    }

    #[test]
    fn test_humanize_pascal_with_digits() {
        assert_eq!(humanize_identifier("ParseHttp2Frame"), "parse http2 frame");
    }

    #[test]
    fn test_normalize_feature_id() {
        assert_eq!(normalize_feature_id("  Parse   User  "), "parse user");
    }
}
