//! Extraction coordinator: walks a source tree, detects the dominant
//! language, runs the matching extractor per file and merges the results
//! into one deduplicated [`ExtractedProject`].

use std::collections::HashMap;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::extractor::{
    is_test_file, language_for_extension, ExtractError, ExtractedFunction, ExtractedTest,
    ExtractedType, Extractors,
};
use crate::pseudo_types::TargetLanguage;

/// Directories never descended into during the walk.
pub const EXCLUDED_DIRS: [&str; 9] = [
    ".git",
    "node_modules",
    "target",
    "__pycache__",
    ".venv",
    "venv",
    "build",
    "dist",
    "vendor",
];

/// The reverse model: everything recovered from one source tree.
/// Built incrementally during the walk, deduplicated once at the end, then
/// read-only.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ExtractedProject {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Dominant language the project was extracted as.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<TargetLanguage>,
    pub types: Vec<ExtractedType>,
    pub functions: Vec<ExtractedFunction>,
    pub tests: Vec<ExtractedTest>,
    /// Non-fatal extraction failures. A bad file degrades the result,
    /// never the run.
    pub warnings: Vec<String>,
}

impl ExtractedProject {
    /// Deduplicate by name, first occurrence wins. Files are visited in
    /// sorted path order, so "first" is deterministic.
    fn dedup(&mut self) {
        let mut seen = HashSet::new();
        self.types.retain(|t| seen.insert(t.name.clone()));
        seen.clear();
        self.functions.retain(|f| seen.insert(f.name.clone()));
        seen.clear();
        self.tests.retain(|t| seen.insert(t.name.clone()));
    }
}

/// Walks a directory and coordinates per-language extraction.
pub struct Importer {
    extractors: Extractors,
    excluded_dirs: HashSet<&'static str>,
}

impl Importer {
    pub fn new() -> Self {
        Self {
            extractors: Extractors::new(),
            excluded_dirs: EXCLUDED_DIRS.iter().copied().collect(),
        }
    }

    /// Extract a structural model from every dominant-language file under
    /// `root`. Fails only for an unreadable root or a tree with no
    /// recognized source files; individual bad files become warnings.
    pub fn import_project(&self, root: &Path) -> Result<ExtractedProject, ExtractError> {
        if !root.is_dir() {
            return Err(ExtractError::FileRead {
                path: root.display().to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "not a readable directory",
                ),
            });
        }

        let mut project = ExtractedProject {
            name: root
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default(),
            ..Default::default()
        };

        let files = self.collect_source_files(root, &mut project.warnings);
        if files.is_empty() {
            return Err(ExtractError::NoSourceFiles(root.display().to_string()));
        }

        let language = dominant_language(files.iter().map(|(_, lang)| *lang));
        project.language = Some(language);
        let extractor = self.extractors.for_language(language);

        for (path, lang) in &files {
            if *lang != language {
                continue;
            }
            let content = match std::fs::read_to_string(path) {
                Ok(content) => content,
                Err(e) => {
                    project
                        .warnings
                        .push(format!("Skipped unreadable file {}: {e}", path.display()));
                    continue;
                }
            };
            let rel = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            if is_test_file(path, language) {
                project.tests.extend(extractor.extract_tests(&content, &rel));
            } else {
                project.types.extend(extractor.extract_types(&content, &rel));
                project
                    .functions
                    .extend(extractor.extract_functions(&content, &rel));
                // Rust keeps tests in inline #[cfg(test)] modules next to
                // the code they cover; such files contribute both.
                if language == TargetLanguage::Rust && content.contains("#[cfg(test)]") {
                    project.tests.extend(extractor.extract_tests(&content, &rel));
                }
                // Package description comes from the first file that
                // yields one; later files never overwrite it.
                if project.description.is_empty() {
                    if let Some(desc) = extractor.extract_package_description(&content) {
                        project.description = desc;
                    }
                }
            }
        }

        project.dedup();
        Ok(project)
    }

    /// All recognized source files under `root` in sorted path order.
    /// Unreadable entries are recorded and skipped.
    fn collect_source_files(
        &self,
        root: &Path,
        warnings: &mut Vec<String>,
    ) -> Vec<(PathBuf, TargetLanguage)> {
        let walker = WalkDir::new(root).into_iter().filter_entry(|e| {
            if e.file_type().is_dir() {
                let name = e.file_name().to_string_lossy();
                return !self.excluded_dirs.contains(name.as_ref());
            }
            true
        });

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warnings.push(format!("Skipped unreadable entry: {e}"));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let Some(lang) = path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(language_for_extension)
            else {
                continue;
            };
            files.push((path, lang));
        }

        files.sort_by(|(a, _), (b, _)| a.cmp(b));
        files
    }
}

impl Default for Importer {
    fn default() -> Self {
        Self::new()
    }
}

/// Highest file count wins; ties resolve to the earliest language in
/// [`TargetLanguage::ALL`] declaration order.
pub fn dominant_language(langs: impl Iterator<Item = TargetLanguage>) -> TargetLanguage {
    let mut counts: HashMap<TargetLanguage, usize> = HashMap::new();
    for lang in langs {
        *counts.entry(lang).or_insert(0) += 1;
    }
    let max = counts.values().copied().max().unwrap_or(0);
    TargetLanguage::ALL
        .into_iter()
        .find(|lang| counts.get(lang).copied().unwrap_or(0) == max)
        .unwrap_or(TargetLanguage::Python)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_dominant_language_by_count() {
        let dir = TempDir::new().unwrap();
        for i in 0..10 {
            write(dir.path(), &format!("pkg/f{i}.go"), "package pkg\n");
        }
        write(dir.path(), "a.py", "x = 1\n");
        write(dir.path(), "b.py", "y = 2\n");

        let project = Importer::new().import_project(dir.path()).unwrap();
        assert_eq!(project.language, Some(TargetLanguage::Go));
    }

    #[test]
    fn test_dominant_language_tie_breaks_by_declaration_order() {
        let langs = vec![TargetLanguage::Go, TargetLanguage::Python];
        assert_eq!(dominant_language(langs.into_iter()), TargetLanguage::Python);
    }

    #[test]
    fn test_import_merges_and_dedups_first_wins() {
        let dir = TempDir::new().unwrap();
        // a.go sorts before b.go, so its Slugify wins.
        write(
            dir.path(),
            "a.go",
            "// Slugify from a.\nfunc Slugify(text string) string { return text }\n",
        );
        write(
            dir.path(),
            "b.go",
            "// Slugify from b.\nfunc Slugify(text string) string { return text }\nfunc Lookup(slug string) string { return slug }\n",
        );

        let project = Importer::new().import_project(dir.path()).unwrap();
        assert_eq!(project.functions.len(), 2);
        assert_eq!(project.functions[0].name, "Slugify");
        assert_eq!(project.functions[0].source_file, "a.go");
        assert_eq!(project.functions[0].description, "Slugify from a.");
    }

    #[test]
    fn test_test_files_route_to_test_extraction() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib.go", "func Slugify(t string) string { return t }\n");
        write(
            dir.path(),
            "lib_test.go",
            "func TestSlugifyBasic(t *testing.T) {}\n",
        );

        let project = Importer::new().import_project(dir.path()).unwrap();
        assert_eq!(project.functions.len(), 1);
        assert_eq!(project.tests.len(), 1);
        assert_eq!(project.tests[0].function, "slugify basic");
    }

    #[test]
    fn test_rust_inline_tests_keep_public_api() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "lib.rs",
            "pub fn slugify(text: &str) -> String {\n    text.to_string()\n}\n\n#[cfg(test)]\nmod tests {\n    #[test]\n    fn test_slugify_basic() {}\n}\n",
        );

        let project = Importer::new().import_project(dir.path()).unwrap();
        assert_eq!(project.functions.len(), 1);
        assert_eq!(project.functions[0].name, "slugify");
        assert_eq!(project.tests.len(), 1);
        assert_eq!(project.tests[0].function, "slugify basic");
    }

    #[test]
    fn test_description_from_first_yielding_file() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.go", "package pkg\n\nfunc A() {}\n");
        write(
            dir.path(),
            "b.go",
            "// Package pkg does things.\npackage pkg\n\nfunc B() {}\n",
        );
        let project = Importer::new().import_project(dir.path()).unwrap();
        assert_eq!(project.description, "Package pkg does things.");
    }

    #[test]
    fn test_empty_tree_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "README.md", "# nothing\n");
        let err = Importer::new().import_project(dir.path()).unwrap_err();
        assert!(matches!(err, ExtractError::NoSourceFiles(_)));
    }

    #[test]
    fn test_excluded_dirs_pruned() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "src.py", "def real(): ...\n");
        write(dir.path(), "node_modules/dep.js", "export function fake() {}\n");
        let project = Importer::new().import_project(dir.path()).unwrap();
        assert_eq!(project.language, Some(TargetLanguage::Python));
        assert_eq!(project.functions.len(), 1);
        assert_eq!(project.functions[0].name, "real");
    }

    #[test]
    fn test_project_json_shape() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "lib.py", "def f() -> int:\n    return 1\n");
        let project = Importer::new().import_project(dir.path()).unwrap();
        let json = serde_json::to_value(&project).unwrap();
        assert!(json["types"].is_array());
        assert!(json["functions"].is_array());
        assert!(json["tests"].is_array());
        assert!(json["warnings"].is_array());
        assert_eq!(json["functions"][0]["sourceFile"], "lib.py");
        assert_eq!(json["functions"][0]["lineNumber"], 1);
    }
}
