//! Named template trees.
//!
//! Templates are looked up explicitly through a [`TemplateCatalog`] and handed to
//! the engine as [`Template`] values; nothing is registered globally.

use log::debug;
use std::path::{Path, PathBuf};

use crate::config::{get_manifest, Manifest, Preset};
use crate::error::{Error, Result};
use crate::rules::{FieldRule, FieldRules};

/// Directory holding one template tree per subdirectory.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    root: PathBuf,
}

impl TemplateCatalog {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    /// Opens the template called `name`.
    ///
    /// # Errors
    /// * `Error::ConfigError` if there is no such template directory
    pub fn open(&self, name: &str) -> Result<Template> {
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(Error::ConfigError(format!("invalid template name '{}'", name)));
        }
        Template::open(name, self.root.join(name))
    }

    /// Names of all templates in the catalog, sorted.
    pub fn names(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| Error::io(&self.root, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::io(&self.root, e))?;
            if entry.path().is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Handle to one read-only template tree and its manifest.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    root: PathBuf,
    manifest: Manifest,
}

impl Template {
    /// Opens the template tree at `root`.
    ///
    /// # Errors
    /// * `Error::ConfigError` if `root` is not a directory or its manifest is invalid
    pub fn open<S: Into<String>, P: Into<PathBuf>>(name: S, root: P) -> Result<Self> {
        let name = name.into();
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::ConfigError(format!(
                "template '{}' not found at '{}'",
                name,
                root.display()
            )));
        }
        let manifest = get_manifest(&root)?;
        debug!(
            "Opened template '{}' at {} ({} presets)",
            name,
            root.display(),
            manifest.presets.len()
        );
        Ok(Self {
            name,
            root,
            manifest,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// # Errors
    /// * `Error::ConfigError` if the manifest declares no such preset
    pub fn preset(&self, name: &str) -> Result<&Preset> {
        self.manifest.presets.get(name).ok_or_else(|| {
            Error::ConfigError(format!(
                "template '{}' has no preset '{}'",
                self.name, name
            ))
        })
    }

    /// Rules that inject `module_name` in place of the template's placeholder.
    ///
    /// # Errors
    /// * `Error::ConfigError` if the manifest declares no placeholder
    pub fn rules(&self, module_name: &str) -> Result<FieldRules> {
        let placeholder = self.manifest.placeholder.as_deref().ok_or_else(|| {
            Error::ConfigError(format!(
                "template '{}' declares no placeholder to replace",
                self.name
            ))
        })?;
        let rule = FieldRule::new(placeholder, module_name)?.case_sensitive(false);
        Ok(FieldRules::new(vec![rule]))
    }
}
