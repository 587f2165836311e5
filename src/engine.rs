//! Single entry point of a generation run.
//!
//! A [`GenerationRequest`] is built once and consumed by [`generate`]; there is
//! no shared engine state between runs.

use log::info;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::output::{find_marker, resolve_output, Destination};
use crate::processor::render;
use crate::rules::FieldRules;
use crate::selection::{RelPath, Selection};
use crate::template::Template;
use crate::writer::persist;

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct GenerationRequest<'a> {
    pub template: &'a Template,
    pub selection: Selection,
    pub rules: FieldRules,
    pub destination: Destination,
    /// Files whose presence at an explicit destination means the work is already done.
    pub markers: Vec<RelPath>,
}

/// Outcome of a run that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generation {
    /// The destination already held `marker`; nothing was written.
    Skipped { root: PathBuf, marker: PathBuf },
    /// The output tree was written.
    Generated {
        root: PathBuf,
        used_default: bool,
        files: usize,
    },
}

impl Generation {
    pub fn root(&self) -> &PathBuf {
        match self {
            Generation::Skipped { root, .. } | Generation::Generated { root, .. } => root,
        }
    }
}

/// Replicates the selected part of the template below the resolved destination.
///
/// # Flow
/// 1. Rejects an empty rule set before touching the filesystem
/// 2. Resolves the destination root
/// 3. Skips the run if an explicit destination already holds a marker
/// 4. Walks, rewrites and writes the selected files
///
/// # Errors
/// * `Error::ConfigError` if no rules are configured
/// * `Error::ResolutionError` if the default destination already exists
/// * `Error::IoError` / `Error::TemplateError` from walking, reading or writing
pub fn generate(request: GenerationRequest<'_>) -> Result<Generation> {
    if request.rules.is_empty() {
        return Err(Error::ConfigError(format!(
            "no field rules configured for template '{}'",
            request.template.name()
        )));
    }

    let output = resolve_output(&request.destination)?;
    if !output.used_default {
        if let Some(marker) = find_marker(&output.root, &request.markers) {
            info!("'{}' already exists, skipping generation", marker.display());
            return Ok(Generation::Skipped {
                root: output.root,
                marker,
            });
        }
    }

    info!(
        "Generating template '{}' into {}",
        request.template.name(),
        output.root.display()
    );
    let files = render(request.template, &request.selection, &request.rules);
    let report = persist(&output.root, files)?;
    info!("Wrote {} files to {}", report.written.len(), report.root.display());

    Ok(Generation::Generated {
        root: report.root,
        used_default: output.used_default,
        files: report.written.len(),
    })
}
