//! Structural validation of a parsed [`Spec`].
//!
//! Validation never fails: it returns a list of issues for the caller to
//! act on. Errors mark specs no generator could act on; warnings mark
//! likely authoring mistakes that still leave the spec usable.

use serde::{Deserialize, Serialize};

use crate::pseudo_types::TargetLanguage;
use crate::spec_model::{Spec, TypeDefKind};
use crate::text_utils::normalize_feature_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    /// The type, function, or test the issue is about, when there is one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub message: String,
}

impl ValidationIssue {
    fn error(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            subject: subject.map(str::to_string),
            message: message.into(),
        }
    }

    fn warning(subject: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            subject: subject.map(str::to_string),
            message: message.into(),
        }
    }
}

/// Validate a spec, returning all issues found. An empty list means the
/// spec is clean.
pub fn validate(spec: &Spec) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if spec.target_languages.is_empty() {
        issues.push(ValidationIssue::error(
            None,
            "Spec declares no target languages",
        ));
    }
    for lang in &spec.target_languages {
        if lang.parse::<TargetLanguage>().is_err() {
            issues.push(ValidationIssue::error(
                Some(lang),
                format!("Unsupported target language '{lang}'"),
            ));
        }
    }

    check_duplicates(
        spec.types.iter().map(|t| t.name.as_str()),
        "type",
        &mut issues,
    );
    check_duplicates(
        spec.functions.iter().map(|f| f.name.as_str()),
        "function",
        &mut issues,
    );

    if spec.types.is_empty() && spec.functions.is_empty() {
        issues.push(ValidationIssue::warning(
            None,
            "Spec defines no types and no functions",
        ));
    }

    for ty in &spec.types {
        let fieldless = matches!(ty.kind, TypeDefKind::Struct | TypeDefKind::Enum)
            && ty.fields.is_empty();
        if fieldless {
            issues.push(ValidationIssue::warning(
                Some(&ty.name),
                format!("Type '{}' has no fields", ty.name),
            ));
        }
    }

    for func in &spec.functions {
        if func.logic.is_empty() {
            issues.push(ValidationIssue::warning(
                Some(&func.name),
                format!("Function '{}' has no logic description", func.name),
            ));
        }
    }

    let known_functions: Vec<String> = spec
        .functions
        .iter()
        .map(|f| normalize_feature_id(&f.name))
        .collect();
    for case in &spec.tests {
        let target = normalize_feature_id(&case.function);
        if !known_functions.iter().any(|f| *f == target) {
            issues.push(ValidationIssue::warning(
                Some(&case.name),
                format!(
                    "Test '{}' references unknown function '{}'",
                    case.name, case.function
                ),
            ));
        }
    }

    issues
}

fn check_duplicates<'a>(
    names: impl Iterator<Item = &'a str>,
    what: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut seen = std::collections::HashSet::new();
    for name in names {
        if !seen.insert(normalize_feature_id(name)) {
            issues.push(ValidationIssue::error(
                Some(name),
                format!("Duplicate {what} name '{name}'"),
            ));
        }
    }
}
