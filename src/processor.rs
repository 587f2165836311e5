//! Content rewriting of selected template files.
//! Turns the walker's files into the entries the writer persists.

use log::debug;
use std::borrow::Cow;
use std::fs::{self, Permissions};

use crate::error::{Error, Result};
use crate::rules::FieldRules;
use crate::selection::{RelPath, Selection};
use crate::template::Template;
use crate::walker::{TemplateFile, TemplateFiles};

/// A rewritten file, ready to be written below a destination root.
#[derive(Debug, Clone)]
pub struct RenderedFile {
    pub rel_path: RelPath,
    pub contents: Vec<u8>,
    pub permissions: Permissions,
}

/// Lazy sequence of [`RenderedFile`]s for one template walk.
pub struct Rendered<'a> {
    files: TemplateFiles<'a>,
    rules: &'a FieldRules,
}

impl Iterator for Rendered<'_> {
    type Item = Result<RenderedFile>;

    fn next(&mut self) -> Option<Self::Item> {
        let file = self.files.next()?;
        Some(file.and_then(|file| render_file(file, self.rules)))
    }
}

/// Walks `template` and rewrites every selected file with `rules`.
///
/// Nothing is read until the returned iterator is advanced.
pub fn render<'a>(template: &Template, selection: &'a Selection, rules: &'a FieldRules) -> Rendered<'a> {
    Rendered {
        files: TemplateFiles::new(template.root(), selection),
        rules,
    }
}

/// Rewrites a single template file.
///
/// # Errors
/// * `Error::IoError` if the file cannot be read
/// * `Error::TemplateError` if path rules produce an unusable relative path
pub fn render_file(file: TemplateFile, rules: &FieldRules) -> Result<RenderedFile> {
    let raw = fs::read(&file.source).map_err(|e| Error::io(&file.source, e))?;
    let rel_path = resolve_target_path(&file.rel_path, rules)?;
    let rewritten = match rules.rewrite_contents(&raw) {
        Cow::Owned(contents) => Some(contents),
        Cow::Borrowed(_) => None,
    };
    if rewritten.is_some() {
        debug!("Rewrote contents of {}", file.rel_path);
    }
    let contents = rewritten.unwrap_or(raw);
    if rel_path != file.rel_path {
        debug!("Renamed {} to {}", file.rel_path, rel_path);
    }

    Ok(RenderedFile {
        rel_path,
        contents,
        permissions: file.permissions,
    })
}

/// Applies path rules to `rel_path`, checking the result is still a usable relative path.
///
/// A path no rule touches is kept exactly as the walker produced it.
pub fn resolve_target_path(rel_path: &RelPath, rules: &FieldRules) -> Result<RelPath> {
    let rewritten = match rules.rewrite_path(rel_path.as_str())? {
        Cow::Borrowed(_) => return Ok(rel_path.clone()),
        Cow::Owned(rewritten) => rewritten,
    };
    if !is_rendered_path_valid(&rewritten) {
        return Err(Error::TemplateError(format!(
            "'{}' was rewritten to the invalid path '{}'",
            rel_path, rewritten
        )));
    }
    RelPath::from_slash_path(&rewritten).ok_or_else(|| {
        Error::TemplateError(format!(
            "'{}' was rewritten to '{}', which leaves the output root",
            rel_path, rewritten
        ))
    })
}

/// A rewritten path must be non-empty, relative and free of empty components.
pub fn is_rendered_path_valid(path: &str) -> bool {
    !path.is_empty() && !path.starts_with('/') && path.split('/').all(|part| !part.is_empty())
}
