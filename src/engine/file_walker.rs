#![forbid(unsafe_code)]

//! File discovery for the `check` command
//!
//! Walks the requested paths with `ignore` (so `.gitignore` is respected),
//! keeps C sources and headers, and applies the configured include/exclude
//! globs. Reading the files is left to the caller.

use crate::types::GlobPattern;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use ignore::types::{Types, TypesBuilder};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during file walking
#[derive(Debug, Error)]
pub enum FileWalkerError {
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },

    #[error("Walk error: {0}")]
    Walk(#[from] ignore::Error),

    #[error("No paths to walk")]
    NoPaths,
}

/// Recognizes C translation units and headers by extension
#[derive(Clone)]
pub struct SourceDetector {
    types: Option<Types>,
}

impl SourceDetector {
    pub fn new() -> Self {
        let mut builder = TypesBuilder::new();
        builder.add_defaults();
        builder.select("c");
        let types = match builder.build() {
            Ok(types) => Some(types),
            Err(e) => {
                tracing::warn!(error = %e, "failed to build C file type matcher");
                None
            }
        };
        Self { types }
    }

    /// Whether `path` names a C source or header
    pub fn is_c_source(&self, path: &Path) -> bool {
        match &self.types {
            Some(types) => types.matched(path, false).is_whitelist(),
            None => matches!(
                path.extension().and_then(|e| e.to_str()),
                Some("c" | "h")
            ),
        }
    }
}

impl Default for SourceDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SourceDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDetector")
            .field("types", &self.types.is_some())
            .finish()
    }
}

/// Reason why a file was skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    ExcludedByPattern,
    NotCSource,
    NotAFile,
}

/// Result of walking a single entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WalkResult {
    File(PathBuf),
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Walks paths and yields the C files to analyze
pub struct FileWalker {
    walker: ignore::Walk,
    include_set: Option<GlobSet>,
    exclude_set: GlobSet,
    detector: SourceDetector,
}

impl FileWalker {
    /// Create a walker over `roots` with include and exclude patterns
    ///
    /// # Errors
    ///
    /// Returns `FileWalkerError` if `roots` is empty or a glob pattern is invalid.
    pub fn new(
        roots: &[PathBuf],
        include: &[GlobPattern],
        exclude: &[GlobPattern],
    ) -> Result<Self, FileWalkerError> {
        let (first, rest) = roots.split_first().ok_or(FileWalkerError::NoPaths)?;
        let mut builder = WalkBuilder::new(first);
        for root in rest {
            builder.add(root);
        }
        let walker = builder.hidden(false).git_ignore(true).build();

        let include_set = if include.is_empty() {
            None
        } else {
            Some(build_globset(include)?)
        };

        let mut exclude_patterns = Vec::from(exclude);
        exclude_patterns.push(GlobPattern::new("**/.git/**"));
        let exclude_set = build_globset(&exclude_patterns)?;

        Ok(Self {
            walker,
            include_set,
            exclude_set,
            detector: SourceDetector::new(),
        })
    }

    /// Iterate over discovered C files
    pub fn walk(self) -> impl Iterator<Item = Result<PathBuf, FileWalkerError>> {
        self.walk_with_skip_info()
            .filter_map(|result| match result {
                Ok(WalkResult::File(path)) => Some(Ok(path)),
                Ok(WalkResult::Skipped { path, reason }) => {
                    tracing::trace!(path = %path.display(), ?reason, "skipped");
                    None
                }
                Err(e) => Some(Err(e)),
            })
    }

    /// Iterate over every entry, reporting why non-matching ones were skipped
    pub fn walk_with_skip_info(self) -> impl Iterator<Item = Result<WalkResult, FileWalkerError>> {
        let include_set = self.include_set;
        let exclude_set = self.exclude_set;
        let detector = self.detector;

        self.walker.map(move |result| {
            let entry = result?;
            let path = entry.path().to_path_buf();

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                return Ok(WalkResult::Skipped {
                    path,
                    reason: SkipReason::NotAFile,
                });
            }
            // `./src/a.c` is matched as `src/a.c`
            let candidate = path.strip_prefix(".").unwrap_or(&path);
            if include_set.as_ref().is_some_and(|set| !set.is_match(candidate))
                || exclude_set.is_match(candidate)
            {
                return Ok(WalkResult::Skipped {
                    path,
                    reason: SkipReason::ExcludedByPattern,
                });
            }
            if !detector.is_c_source(&path) {
                return Ok(WalkResult::Skipped {
                    path,
                    reason: SkipReason::NotCSource,
                });
            }
            Ok(WalkResult::File(path))
        })
    }
}

/// Compile glob patterns into a set
///
/// # Errors
///
/// Returns `FileWalkerError::InvalidGlob` naming the first invalid pattern.
pub fn build_globset(patterns: &[GlobPattern]) -> Result<GlobSet, FileWalkerError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern.as_str()).map_err(|e| FileWalkerError::InvalidGlob {
            pattern: pattern.as_str().to_string(),
            source: e,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| FileWalkerError::InvalidGlob {
        pattern: "<globset>".to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn walk_names(root: &Path, include: &[&str], exclude: &[&str]) -> Vec<String> {
        let include: Vec<GlobPattern> = include.iter().map(|p| GlobPattern::new(*p)).collect();
        let exclude: Vec<GlobPattern> = exclude.iter().map(|p| GlobPattern::new(*p)).collect();
        let walker = FileWalker::new(&[root.to_path_buf()], &include, &exclude).unwrap();
        let mut names: Vec<String> = walker
            .walk()
            .map(|r| {
                r.unwrap()
                    .strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_detector_recognizes_c_files() {
        let detector = SourceDetector::new();
        assert!(detector.is_c_source(Path::new("main.c")));
        assert!(detector.is_c_source(Path::new("include/util.h")));
        assert!(!detector.is_c_source(Path::new("main.rs")));
        assert!(!detector.is_c_source(Path::new("README.md")));
    }

    #[test]
    fn test_walk_finds_only_c_files() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("src")).unwrap();
        fs::write(temp.path().join("src/main.c"), "int main(void) { return 0; }\n").unwrap();
        fs::write(temp.path().join("src/util.h"), "#define X 1\n").unwrap();
        fs::write(temp.path().join("notes.md"), "# notes\n").unwrap();

        assert_eq!(walk_names(temp.path(), &[], &[]), vec!["src/main.c", "src/util.h"]);
    }

    #[test]
    fn test_walk_include_and_exclude() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::create_dir_all(temp.path().join("vendor")).unwrap();
        fs::write(temp.path().join("src/a.c"), "").unwrap();
        fs::write(temp.path().join("src/a.h"), "").unwrap();
        fs::write(temp.path().join("vendor/b.c"), "").unwrap();

        assert_eq!(
            walk_names(temp.path(), &["**/*.c"], &["**/vendor/**"]),
            vec!["src/a.c"]
        );
    }

    #[test]
    fn test_invalid_glob() {
        let temp = TempDir::new().unwrap();
        let result = FileWalker::new(&[temp.path().to_path_buf()], &[GlobPattern::new("[")], &[]);
        assert!(matches!(result, Err(FileWalkerError::InvalidGlob { .. })));
    }

    #[test]
    fn test_no_paths() {
        let result = FileWalker::new(&[], &[], &[]);
        assert!(matches!(result, Err(FileWalkerError::NoPaths)));
    }

    #[test]
    fn test_skip_reasons_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.py"), "").unwrap();
        let walker = FileWalker::new(&[temp.path().to_path_buf()], &[], &[]).unwrap();
        let skipped: Vec<SkipReason> = walker
            .walk_with_skip_info()
            .filter_map(|r| match r.unwrap() {
                WalkResult::Skipped { reason, .. } => Some(reason),
                WalkResult::File(_) => None,
            })
            .collect();
        assert!(skipped.contains(&SkipReason::NotCSource));
        assert!(skipped.contains(&SkipReason::NotAFile));
    }
}
