//! Cross-implementation feature parity.
//!
//! Compares the reference implementation's extracted feature set against one
//! or more candidates and reports what each candidate is missing. Matching
//! is by normalized name only — presence/absence, not semantic equivalence.
//! Legitimately renamed features under-count; that is a documented
//! limitation of the comparison, not a defect in it.

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::importer::ExtractedProject;
use crate::text_utils::normalize_feature_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Function,
    Type,
}

/// One row of the feature matrix: a reference feature and which candidates
/// implement it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Normalized feature identifier (lower-cased, whitespace collapsed).
    pub feature: String,
    pub kind: FeatureKind,
    /// Candidate label -> implemented.
    pub candidates: BTreeMap<String, bool>,
}

/// A reference feature missing in at least one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gap {
    pub feature: String,
    pub kind: FeatureKind,
    #[serde(rename = "missingIn")]
    pub missing_in: Vec<String>,
    /// The reference's extracted description/signature, carried as a hint
    /// for corrective regeneration.
    pub hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateScore {
    pub candidate: String,
    pub score: f64,
    pub implemented: usize,
    pub total: usize,
}

/// Parity report consumed by the regeneration prompt builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParityReport {
    /// Mean parity across candidates, in [0, 1].
    #[serde(rename = "parityScore")]
    pub parity_score: f64,
    #[serde(rename = "referenceLanguage")]
    pub reference_language: String,
    #[serde(rename = "featureMatrix")]
    pub feature_matrix: Vec<FeatureRow>,
    pub gaps: Vec<Gap>,
    #[serde(rename = "candidateScores")]
    pub candidate_scores: Vec<CandidateScore>,
    #[serde(rename = "fixInstructions")]
    pub fix_instructions: String,
}

/// Compare a reference project's features against candidate projects'.
pub fn compare(reference: &ExtractedProject, candidates: &[&ExtractedProject]) -> ParityReport {
    let labels: Vec<String> = candidates
        .iter()
        .enumerate()
        .map(|(i, c)| candidate_label(c, i))
        .collect();

    let candidate_features: Vec<HashSet<String>> =
        candidates.iter().map(|c| feature_set(c)).collect();

    // Reference features in extraction order: functions first, then types.
    let mut feature_matrix = Vec::new();
    let mut gaps = Vec::new();
    let mut seen = HashSet::new();

    let reference_features = reference
        .functions
        .iter()
        .map(|f| {
            let hint = if f.description.is_empty() {
                f.signature.clone()
            } else {
                f.description.clone()
            };
            (normalize_feature_id(&f.name), FeatureKind::Function, hint)
        })
        .chain(reference.types.iter().map(|t| {
            (
                normalize_feature_id(&t.name),
                FeatureKind::Type,
                t.description.clone(),
            )
        }));

    for (feature, kind, hint) in reference_features {
        if feature.is_empty() || !seen.insert(feature.clone()) {
            continue;
        }

        let mut row = BTreeMap::new();
        let mut missing_in = Vec::new();
        for (label, features) in labels.iter().zip(&candidate_features) {
            let implemented = features.contains(&feature);
            row.insert(label.clone(), implemented);
            if !implemented {
                missing_in.push(label.clone());
            }
        }

        feature_matrix.push(FeatureRow {
            feature: feature.clone(),
            kind,
            candidates: row,
        });
        if !missing_in.is_empty() {
            gaps.push(Gap {
                feature,
                kind,
                missing_in,
                hint,
            });
        }
    }

    let total = feature_matrix.len();
    let candidate_scores: Vec<CandidateScore> = labels
        .iter()
        .map(|label| {
            let implemented = feature_matrix
                .iter()
                .filter(|row| row.candidates.get(label).copied().unwrap_or(false))
                .count();
            CandidateScore {
                candidate: label.clone(),
                // An empty reference has nothing to miss.
                score: if total == 0 {
                    1.0
                } else {
                    implemented as f64 / total as f64
                },
                implemented,
                total,
            }
        })
        .collect();

    let parity_score = if candidate_scores.is_empty() {
        0.0
    } else {
        candidate_scores.iter().map(|c| c.score).sum::<f64>() / candidate_scores.len() as f64
    };

    let fix_instructions = render_fix_instructions(&gaps);

    ParityReport {
        parity_score,
        reference_language: reference
            .language
            .map(|l| l.to_string())
            .unwrap_or_default(),
        feature_matrix,
        gaps,
        candidate_scores,
        fix_instructions,
    }
}

fn candidate_label(project: &ExtractedProject, index: usize) -> String {
    if let Some(lang) = project.language {
        return lang.to_string();
    }
    if !project.name.is_empty() {
        return project.name.clone();
    }
    format!("candidate-{}", index + 1)
}

fn feature_set(project: &ExtractedProject) -> HashSet<String> {
    project
        .functions
        .iter()
        .map(|f| normalize_feature_id(&f.name))
        .chain(project.types.iter().map(|t| normalize_feature_id(&t.name)))
        .collect()
}

/// Numbered plain-text block suitable for a regeneration prompt.
fn render_fix_instructions(gaps: &[Gap]) -> String {
    let mut out = String::new();
    for (i, gap) in gaps.iter().enumerate() {
        let kind = match gap.kind {
            FeatureKind::Function => "function",
            FeatureKind::Type => "type",
        };
        out.push_str(&format!(
            "{}. Implement {kind} `{}` (missing in: {})",
            i + 1,
            gap.feature,
            gap.missing_in.join(", ")
        ));
        if !gap.hint.is_empty() {
            out.push_str(&format!("\n   Reference: {}", gap.hint));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ExtractedFunction, ExtractedType};
    use crate::pseudo_types::TargetLanguage;

    fn project(name: &str, lang: Option<TargetLanguage>, functions: &[&str]) -> ExtractedProject {
        ExtractedProject {
            name: name.to_string(),
            language: lang,
            functions: functions
                .iter()
                .map(|f| ExtractedFunction {
                    name: f.to_string(),
                    description: format!("does {f}"),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_two_thirds_parity_with_one_gap() {
        let reference = project("ref", Some(TargetLanguage::Go), &["a", "b", "c"]);
        let candidate = project("cand", Some(TargetLanguage::Python), &["a", "b"]);

        let report = compare(&reference, &[&candidate]);
        assert!((report.parity_score - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(report.reference_language, "go");
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].feature, "c");
        assert_eq!(report.gaps[0].missing_in, vec!["python"]);
        assert_eq!(report.gaps[0].hint, "does c");
        assert!(report.fix_instructions.contains("Implement function `c`"));
    }

    #[test]
    fn test_full_parity_scores_one() {
        let reference = project("ref", Some(TargetLanguage::Go), &["a", "b"]);
        let candidate = project("cand", Some(TargetLanguage::Rust), &["b", "a", "extra"]);

        let report = compare(&reference, &[&candidate]);
        assert_eq!(report.parity_score, 1.0);
        assert!(report.gaps.is_empty());
        assert!(report.fix_instructions.is_empty());
    }

    #[test]
    fn test_zero_parity() {
        let reference = project("ref", Some(TargetLanguage::Go), &["a", "b"]);
        let candidate = project("cand", Some(TargetLanguage::Java), &["x"]);

        let report = compare(&reference, &[&candidate]);
        assert_eq!(report.parity_score, 0.0);
        assert_eq!(report.gaps.len(), 2);
    }

    #[test]
    fn test_aggregate_is_mean_across_candidates() {
        let reference = project("ref", Some(TargetLanguage::Go), &["a", "b"]);
        let full = project("full", Some(TargetLanguage::Python), &["a", "b"]);
        let half = project("half", Some(TargetLanguage::Rust), &["a"]);

        let report = compare(&reference, &[&full, &half]);
        assert!((report.parity_score - 0.75).abs() < 1e-9);
        assert_eq!(report.candidate_scores.len(), 2);
        assert_eq!(report.candidate_scores[0].score, 1.0);
        assert_eq!(report.candidate_scores[1].score, 0.5);
    }

    #[test]
    fn test_matching_normalizes_case_and_whitespace() {
        let reference = project("ref", Some(TargetLanguage::Go), &["ParseHeader"]);
        let candidate = project("cand", Some(TargetLanguage::Python), &["parseheader"]);

        let report = compare(&reference, &[&candidate]);
        assert_eq!(report.parity_score, 1.0);
    }

    #[test]
    fn test_types_count_as_features() {
        let mut reference = project("ref", Some(TargetLanguage::Go), &["f"]);
        reference.types.push(ExtractedType {
            name: "User".to_string(),
            ..Default::default()
        });
        let candidate = project("cand", Some(TargetLanguage::Rust), &["f"]);

        let report = compare(&reference, &[&candidate]);
        assert_eq!(report.feature_matrix.len(), 2);
        assert_eq!(report.gaps.len(), 1);
        assert_eq!(report.gaps[0].kind, FeatureKind::Type);
    }

    #[test]
    fn test_empty_reference_scores_one() {
        let reference = project("ref", Some(TargetLanguage::Go), &[]);
        let candidate = project("cand", Some(TargetLanguage::Rust), &["x"]);

        let report = compare(&reference, &[&candidate]);
        assert_eq!(report.parity_score, 1.0);
        assert!(report.gaps.is_empty());
    }
}
