//! Template manifest handling.
//! A template may carry a manifest at its root declaring the placeholder identifier
//! used throughout its files and the named presets it can be generated with.

use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;
use std::path::Path;

use crate::error::{Error, Result};
use crate::selection::{RelPath, Selection};

/// Supported manifest file names, in lookup order.
pub const CONFIG_FILES: [&str; 3] = ["template.json", "template.yml", "template.yaml"];

/// Parsed template manifest.
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Identifier in the template files that gets replaced by the module name.
    #[serde(default)]
    pub placeholder: Option<String>,

    /// Named presets, kept in declaration order.
    #[serde(default)]
    pub presets: IndexMap<String, Preset>,
}

/// A named slice of a template: what to select, which files mark a finished
/// generation and where default output goes.
#[derive(Debug, Default, Deserialize, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Preset {
    #[serde(default)]
    pub include_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_dirs: Vec<String>,
    #[serde(default)]
    pub exclude_files: Vec<String>,
    /// Files whose presence at the destination means the preset was already generated.
    #[serde(default)]
    pub markers: Vec<String>,
    /// Prefix of the timestamped default output directory.
    #[serde(default)]
    pub output_prefix: Option<String>,
    /// Message shown when output went to a default directory.
    #[serde(default)]
    pub hint: Option<String>,
}

impl Preset {
    pub fn selection(&self) -> Result<Selection> {
        Selection::builder()
            .include_dirs(&self.include_dirs)
            .exclude_dirs(&self.exclude_dirs)
            .exclude_files(&self.exclude_files)
            .build()
    }

    pub fn markers(&self) -> Result<Vec<RelPath>> {
        self.markers.iter().map(|marker| RelPath::new(marker)).collect()
    }

    /// Prefix of the default output directory, falling back to the preset's own name.
    pub fn default_prefix(&self, preset_name: &str) -> String {
        self.output_prefix
            .clone()
            .unwrap_or_else(|| preset_name.to_string())
    }
}

/// Reads the first manifest found in `template_dir`.
///
/// # Returns
/// * `Result<Option<String>>` - Contents of the manifest, `None` if the template has none
pub fn load_manifest<P: AsRef<Path>>(template_dir: P, config_files: &[&str]) -> Result<Option<String>> {
    for file in config_files {
        let config_path = template_dir.as_ref().join(file);
        if config_path.is_file() {
            debug!("Loading manifest from {}", config_path.display());
            return std::fs::read_to_string(&config_path)
                .map(Some)
                .map_err(|e| Error::io(&config_path, e));
        }
    }
    debug!(
        "No manifest in {} (tried: {})",
        template_dir.as_ref().display(),
        config_files.join(", ")
    );
    Ok(None)
}

/// Parses manifest content, trying JSON first and YAML second.
///
/// # Errors
/// * `Error::ConfigError` if the content is neither valid JSON nor valid YAML for a manifest
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    match serde_json::from_str(content) {
        Ok(manifest) => Ok(manifest),
        Err(_) => serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(format!("Invalid manifest format: {}", e))),
    }
}

/// Loads and parses the manifest of a template, falling back to an empty one.
pub fn get_manifest<P: AsRef<Path>>(template_dir: P) -> Result<Manifest> {
    match load_manifest(template_dir, &CONFIG_FILES)? {
        Some(content) => parse_manifest(&content),
        None => Ok(Manifest::default()),
    }
}
