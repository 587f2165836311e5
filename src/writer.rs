//! Persistence of rendered files below a destination root.
//!
//! Every file goes through a temporary file in its destination directory and is
//! renamed into place, so a file is either absent or complete. Files written
//! before a failure are left on disk. Directories, the root included, are
//! created only when a file is about to land in them.

use log::debug;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::error::{Error, Result};
use crate::processor::RenderedFile;

/// What a successful [`persist`] wrote.
#[derive(Debug, Clone, Default)]
pub struct WriteReport {
    pub root: PathBuf,
    pub written: Vec<PathBuf>,
}

/// Writes every file of `files` below `root`, creating directories as needed.
///
/// Stops at the first error, which carries the offending path. A run that
/// completes without writing any file still leaves an empty `root` behind.
pub fn persist<P, I>(root: P, files: I) -> Result<WriteReport>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = Result<RenderedFile>>,
{
    let root = root.as_ref();
    let mut report = WriteReport {
        root: root.to_path_buf(),
        written: Vec::new(),
    };
    for file in files {
        let file = file?;
        let target = file.rel_path.to_native(root);
        write_file(&target, &file)?;
        debug!("Wrote {}", target.display());
        report.written.push(target);
    }
    if report.written.is_empty() {
        create_dir_all(root)?;
    }
    Ok(report)
}

fn create_dir_all(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

fn write_file(target: &Path, file: &RenderedFile) -> Result<()> {
    let parent = target.parent().ok_or_else(|| {
        Error::TemplateError(format!("'{}' has no parent directory", target.display()))
    })?;
    create_dir_all(parent)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(|e| Error::io(parent, e))?;
    temp.write_all(&file.contents)
        .map_err(|e| Error::io(temp.path(), e))?;
    temp.as_file()
        .set_permissions(file.permissions.clone())
        .map_err(|e| Error::io(target, e))?;
    temp.persist(target).map_err(|e| Error::io(target, e.error))?;
    Ok(())
}
