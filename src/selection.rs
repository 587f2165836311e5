//! Selection of the files and directories of a template tree that take part in a run.
//!
//! Paths are handled as [`RelPath`]s: forward-slash relative paths from the
//! template root, independent of the host separator.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Canonical forward-slash path relative to a tree root. The root itself is the empty path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RelPath(String);

impl RelPath {
    /// Normalizes `raw`: backslashes become `/`, `.` and empty components are dropped.
    ///
    /// # Errors
    /// * `Error::ConfigError` for absolute paths or `..` components
    pub fn new(raw: &str) -> Result<Self> {
        let unified = raw.replace('\\', "/");
        if unified.starts_with('/') || has_drive_prefix(&unified) {
            return Err(Error::ConfigError(format!(
                "'{}' must be relative to the template root",
                raw
            )));
        }
        let mut parts = Vec::new();
        for part in unified.split('/') {
            match part {
                "" | "." => continue,
                ".." => {
                    return Err(Error::ConfigError(format!(
                        "'{}' must not leave the template root",
                        raw
                    )))
                }
                part => parts.push(part),
            }
        }
        Ok(Self(parts.join("/")))
    }

    /// Builds the relative path of `path` below `root`.
    pub fn from_root(root: &Path, path: &Path) -> Result<Self> {
        let relative = path.strip_prefix(root).map_err(|_| {
            Error::TemplateError(format!(
                "'{}' is outside of '{}'",
                path.display(),
                root.display()
            ))
        })?;
        let mut parts = Vec::new();
        for component in relative.components() {
            let part = component.as_os_str().to_str().ok_or_else(|| {
                Error::TemplateError(format!("'{}' is not valid UTF-8", path.display()))
            })?;
            parts.push(part);
        }
        Ok(Self(parts.join("/")))
    }

    /// Wraps an already forward-slash path without normalizing it.
    ///
    /// Returns `None` for empty or absolute paths and for empty, `.` or `..`
    /// components. Backslashes and colons are ordinary name characters here.
    pub fn from_slash_path(path: &str) -> Option<Self> {
        let valid = !path.is_empty()
            && path
                .split('/')
                .all(|part| !part.is_empty() && part != "." && part != "..");
        valid.then(|| Self(path.to_string()))
    }

    pub fn root() -> Self {
        Self::default()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final component, or the empty string for the root.
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or_default()
    }

    pub fn parent(&self) -> RelPath {
        match self.0.rfind('/') {
            Some(idx) => Self(self.0[..idx].to_string()),
            None => Self::root(),
        }
    }

    /// True when `self` is `dir` or lies below it. Everything lies below the root.
    pub fn is_within(&self, dir: &RelPath) -> bool {
        dir.is_root()
            || self.0 == dir.0
            || (self.0.starts_with(&dir.0) && self.0.as_bytes()[dir.0.len()] == b'/')
    }

    /// Converts to a host path below `root`, using the native separator.
    pub fn to_native(&self, root: &Path) -> PathBuf {
        self.0
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(root.to_path_buf(), |path, part| path.join(part))
    }
}

impl fmt::Display for RelPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Decides which parts of a template tree participate in a generation.
///
/// Exclusion always wins over inclusion.
#[derive(Debug, Clone)]
pub struct Selection {
    include_dirs: Vec<RelPath>,
    exclude_dirs: Vec<RelPath>,
    exclude_names: GlobSet,
    exclude_paths: GlobSet,
}

impl Default for Selection {
    fn default() -> Self {
        Self {
            include_dirs: Vec::new(),
            exclude_dirs: Vec::new(),
            exclude_names: GlobSet::empty(),
            exclude_paths: GlobSet::empty(),
        }
    }
}

impl Selection {
    /// Selection that takes the whole tree.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn builder() -> SelectionBuilder {
        SelectionBuilder::default()
    }

    /// A directory is entered when it is inside an include entry (or there are none)
    /// and not inside any exclude entry.
    pub fn should_enter_dir(&self, dir: &RelPath) -> bool {
        let included =
            self.include_dirs.is_empty() || self.include_dirs.iter().any(|inc| dir.is_within(inc));
        included && !self.is_dir_excluded(dir)
    }

    /// Like [`Selection::should_enter_dir`], but also descends into the ancestors of
    /// include entries so a walk can reach them.
    pub fn should_descend(&self, dir: &RelPath) -> bool {
        if self.is_dir_excluded(dir) {
            return false;
        }
        self.include_dirs.is_empty()
            || self
                .include_dirs
                .iter()
                .any(|inc| dir.is_within(inc) || inc.is_within(dir))
    }

    /// A file is included when its directory would be entered and no exclude pattern matches it.
    pub fn should_include_file(&self, file: &RelPath) -> bool {
        self.should_enter_dir(&file.parent()) && !self.is_file_excluded(file)
    }

    fn is_dir_excluded(&self, dir: &RelPath) -> bool {
        self.exclude_dirs.iter().any(|exc| dir.is_within(exc))
    }

    fn is_file_excluded(&self, file: &RelPath) -> bool {
        self.exclude_names.is_match(file.file_name()) || self.exclude_paths.is_match(file.as_str())
    }
}

/// Collects selection entries, validating them on [`SelectionBuilder::build`].
#[derive(Debug, Default, Clone)]
pub struct SelectionBuilder {
    include_dirs: Vec<String>,
    exclude_dirs: Vec<String>,
    exclude_files: Vec<String>,
}

impl SelectionBuilder {
    /// Limits the run to this subdirectory (and everything below it).
    pub fn include_dir<S: Into<String>>(mut self, dir: S) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn exclude_dir<S: Into<String>>(mut self, dir: S) -> Self {
        self.exclude_dirs.push(dir.into());
        self
    }

    /// Skips files matching `pattern`. Patterns without a `/` match the file name,
    /// patterns with one match the whole relative path.
    pub fn exclude_file<S: Into<String>>(mut self, pattern: S) -> Self {
        self.exclude_files.push(pattern.into());
        self
    }

    pub fn include_dirs<I, S>(self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        dirs.into_iter().fold(self, |builder, dir| builder.include_dir(dir))
    }

    pub fn exclude_dirs<I, S>(self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        dirs.into_iter().fold(self, |builder, dir| builder.exclude_dir(dir))
    }

    pub fn exclude_files<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        patterns
            .into_iter()
            .fold(self, |builder, pattern| builder.exclude_file(pattern))
    }

    /// # Errors
    /// * `Error::ConfigError` if a directory entry is absolute or leaves the root
    /// * `Error::PatternError` if a file pattern is not a valid glob
    pub fn build(self) -> Result<Selection> {
        let include_dirs = self
            .include_dirs
            .iter()
            .map(|dir| RelPath::new(dir))
            .collect::<Result<Vec<_>>>()?;
        let exclude_dirs = self
            .exclude_dirs
            .iter()
            .map(|dir| RelPath::new(dir))
            .collect::<Result<Vec<_>>>()?;

        let mut names = GlobSetBuilder::new();
        let mut paths = GlobSetBuilder::new();
        for pattern in &self.exclude_files {
            let unified = pattern.replace('\\', "/");
            let pattern = unified.trim_start_matches("./");
            let glob = GlobBuilder::new(pattern).literal_separator(true).build()?;
            if pattern.contains('/') {
                paths.add(glob);
            } else {
                names.add(glob);
            }
        }

        Ok(Selection {
            include_dirs,
            exclude_dirs,
            exclude_names: names.build()?,
            exclude_paths: paths.build()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(path: &str) -> RelPath {
        RelPath::new(path).unwrap()
    }

    #[test]
    fn test_rel_path_normalization() {
        assert_eq!(rel("api\\types\\").as_str(), "api/types");
        assert_eq!(rel("./api//types/").as_str(), "api/types");
        assert!(rel(".").is_root());
        assert!(RelPath::new("../api").is_err());
        assert!(RelPath::new("/api").is_err());
        assert!(RelPath::new("C:\\api").is_err());
    }

    #[test]
    fn test_rel_path_from_slash_path() {
        assert_eq!(RelPath::from_slash_path("a\\b.txt").unwrap().as_str(), "a\\b.txt");
        assert_eq!(RelPath::from_slash_path("a:b.txt").unwrap().as_str(), "a:b.txt");
        assert_eq!(RelPath::from_slash_path("api/types").unwrap(), rel("api/types"));
        for invalid in ["", "/abs", "a//b", "a/./b", "../b", "a/"] {
            assert!(RelPath::from_slash_path(invalid).is_none(), "{}", invalid);
        }
    }

    #[test]
    fn test_rel_path_within() {
        assert!(rel("api/types").is_within(&rel("api")));
        assert!(rel("api").is_within(&rel("api")));
        assert!(!rel("apis").is_within(&rel("api")));
        assert!(!rel("api").is_within(&rel("api/types")));
        assert!(rel("anything").is_within(&RelPath::root()));
    }

    #[test]
    fn test_rel_path_parent_and_name() {
        assert_eq!(rel("api/types/types.proto").parent(), rel("api/types"));
        assert_eq!(rel("go.mod").parent(), RelPath::root());
        assert_eq!(rel("api/types/types.proto").file_name(), "types.proto");
    }

    #[test]
    fn test_rel_path_to_native() {
        let path = rel("api/types/types.proto").to_native(Path::new("out"));
        assert_eq!(path, Path::new("out").join("api").join("types").join("types.proto"));
    }

    #[test]
    fn test_empty_selection_takes_everything() {
        let selection = Selection::all();
        assert!(selection.should_enter_dir(&rel("internal/model")));
        assert!(selection.should_include_file(&rel("go.mod")));
    }

    #[test]
    fn test_include_dirs_are_prefixes() {
        let selection = Selection::builder().include_dir("api/types").build().unwrap();
        assert!(selection.should_enter_dir(&rel("api/types")));
        assert!(selection.should_enter_dir(&rel("api/types/nested")));
        assert!(!selection.should_enter_dir(&rel("api")));
        assert!(!selection.should_enter_dir(&rel("api/user")));

        assert!(selection.should_descend(&rel("api")));
        assert!(!selection.should_descend(&rel("internal")));

        assert!(selection.should_include_file(&rel("api/types/nested/a.proto")));
        assert!(!selection.should_include_file(&rel("api/readme.md")));
        assert!(!selection.should_include_file(&rel("go.mod")));
    }

    #[test]
    fn test_exclusion_wins() {
        let selection = Selection::builder()
            .include_dir("api")
            .exclude_dir("api")
            .build()
            .unwrap();
        assert!(!selection.should_enter_dir(&rel("api")));
        assert!(!selection.should_descend(&rel("api")));

        let selection = Selection::builder()
            .include_dir("api")
            .exclude_dir("api/internal")
            .build()
            .unwrap();
        assert!(selection.should_enter_dir(&rel("api/types")));
        assert!(!selection.should_enter_dir(&rel("api/internal/x")));
        assert!(!selection.should_include_file(&rel("api/internal/x.go")));
    }

    #[test]
    fn test_exclude_files_by_name_and_path() {
        let selection = Selection::builder()
            .exclude_file("types.pb.go")
            .exclude_file("*.tmp")
            .exclude_file("api/readme.md")
            .build()
            .unwrap();
        assert!(!selection.should_include_file(&rel("api/types/types.pb.go")));
        assert!(!selection.should_include_file(&rel("types.pb.go")));
        assert!(!selection.should_include_file(&rel("deep/cache.tmp")));
        assert!(!selection.should_include_file(&rel("api/readme.md")));
        assert!(selection.should_include_file(&rel("docs/readme.md")));
        assert!(selection.should_include_file(&rel("api/types/types.proto")));
    }

    #[test]
    fn test_invalid_pattern() {
        let result = Selection::builder().exclude_file("a[").build();
        assert!(matches!(result, Err(Error::PatternError(_))));
    }
}
