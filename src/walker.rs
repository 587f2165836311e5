//! Depth-first traversal of a template tree, pruned by a [`Selection`].

use log::debug;
use std::fs::Permissions;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::CONFIG_FILES;
use crate::error::{Error, Result};
use crate::selection::{RelPath, Selection};

/// A template file that survived the selection.
#[derive(Debug, Clone)]
pub struct TemplateFile {
    pub rel_path: RelPath,
    pub source: PathBuf,
    pub permissions: Permissions,
}

/// Lazy, single-pass iterator over the selected files of a template tree.
///
/// Entries come in file-name order. Directories the selection rejects are
/// skipped without being read.
pub struct TemplateFiles<'a> {
    root: PathBuf,
    entries: walkdir::IntoIter,
    selection: &'a Selection,
}

impl<'a> TemplateFiles<'a> {
    pub fn new<P: AsRef<Path>>(root: P, selection: &'a Selection) -> Self {
        let root = root.as_ref().to_path_buf();
        let entries = WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();
        Self {
            root,
            entries,
            selection,
        }
    }

    fn visit(&mut self, entry: walkdir::DirEntry) -> Result<Option<TemplateFile>> {
        let rel_path = RelPath::from_root(&self.root, entry.path())?;
        if entry.file_type().is_dir() {
            if !self.selection.should_descend(&rel_path) {
                debug!("Skipping directory {}", rel_path);
                self.entries.skip_current_dir();
            }
            return Ok(None);
        }
        if entry.depth() == 1 && CONFIG_FILES.contains(&rel_path.as_str()) {
            return Ok(None);
        }
        if !self.selection.should_include_file(&rel_path) {
            debug!("Skipping file {}", rel_path);
            return Ok(None);
        }
        let metadata = entry.metadata()?;
        Ok(Some(TemplateFile {
            rel_path,
            source: entry.into_path(),
            permissions: metadata.permissions(),
        }))
    }
}

impl Iterator for TemplateFiles<'_> {
    type Item = Result<TemplateFile>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::from(e))),
            };
            if entry.depth() == 0 {
                if !entry.file_type().is_dir() {
                    return Some(Err(Error::TemplateError(format!(
                        "'{}' is not a directory",
                        entry.path().display()
                    ))));
                }
                continue;
            }
            match self.visit(entry) {
                Ok(Some(file)) => return Some(Ok(file)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, rel).unwrap();
    }

    fn collect(root: &Path, selection: &Selection) -> Vec<String> {
        TemplateFiles::new(root, selection)
            .map(|file| file.unwrap().rel_path.to_string())
            .collect()
    }

    #[test]
    fn test_walk_is_sorted_and_skips_manifest() {
        let temp_dir = TempDir::new().unwrap();
        for rel in ["b.txt", "a/z.txt", "a/b.txt", "template.yaml", "sub/template.yaml"] {
            touch(temp_dir.path(), rel);
        }
        assert_eq!(
            collect(temp_dir.path(), &Selection::all()),
            ["a/b.txt", "a/z.txt", "b.txt", "sub/template.yaml"]
        );
    }

    #[test]
    fn test_walk_prunes_unselected_dirs() {
        let temp_dir = TempDir::new().unwrap();
        for rel in ["api/types/t.proto", "api/user/u.proto", "internal/x.go", "go.mod"] {
            touch(temp_dir.path(), rel);
        }
        let selection = Selection::builder().include_dir("api/types").build().unwrap();
        assert_eq!(collect(temp_dir.path(), &selection), ["api/types/t.proto"]);
    }

    #[test]
    fn test_missing_root_is_an_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let selection = Selection::all();
        let mut files = TemplateFiles::new(temp_dir.path().join("missing"), &selection);
        assert!(matches!(files.next(), Some(Err(Error::IoError { .. }))));
    }
}
