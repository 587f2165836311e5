//! Destination handling: where a run writes, and whether it should write at all.

use chrono::{DateTime, Local};
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::selection::RelPath;

/// Timestamp appended to default output directories. Second granularity.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Where a run writes its output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Caller-supplied directory, used verbatim.
    Explicit(PathBuf),
    /// Fresh `<prefix>_<timestamp>` directory.
    Default { prefix: PathBuf },
}

impl Destination {
    /// Picks [`Destination::Explicit`] for a non-empty `path`, the default otherwise.
    pub fn from_option<P: Into<PathBuf>>(path: Option<PathBuf>, default_prefix: P) -> Self {
        match path {
            Some(path) if !path.as_os_str().is_empty() => Destination::Explicit(path),
            _ => Destination::Default {
                prefix: default_prefix.into(),
            },
        }
    }
}

/// A computed destination root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub root: PathBuf,
    pub used_default: bool,
}

/// Resolves `destination` against the current local time.
pub fn resolve_output(destination: &Destination) -> Result<ResolvedOutput> {
    resolve_output_at(destination, Local::now())
}

/// Resolves `destination`, stamping default directories with `now`.
///
/// # Errors
/// * `Error::ResolutionError` if the default directory for `now` already exists
pub fn resolve_output_at(destination: &Destination, now: DateTime<Local>) -> Result<ResolvedOutput> {
    match destination {
        Destination::Explicit(root) => Ok(ResolvedOutput {
            root: root.clone(),
            used_default: false,
        }),
        Destination::Default { prefix } => {
            let root = default_output_dir(prefix, now);
            if root.exists() {
                return Err(Error::ResolutionError(format!(
                    "default output directory '{}' already exists",
                    root.display()
                )));
            }
            debug!("Resolved default output directory {}", root.display());
            Ok(ResolvedOutput {
                root,
                used_default: true,
            })
        }
    }
}

/// `<prefix>_<timestamp>`, keeping the prefix's parent directory.
pub fn default_output_dir(prefix: &Path, now: DateTime<Local>) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push("_");
    name.push(now.format(TIMESTAMP_FORMAT).to_string());
    PathBuf::from(name)
}

/// Whether `marker` already exists below `root`.
pub fn check_marker(root: &Path, marker: &RelPath) -> bool {
    marker.to_native(root).exists()
}

/// First marker that already exists below `root`.
pub fn find_marker(root: &Path, markers: &[RelPath]) -> Option<PathBuf> {
    markers
        .iter()
        .find(|marker| check_marker(root, marker))
        .map(|marker| marker.to_native(root))
}
