//! Module name detection for output directories that already hold a Go module.

use log::debug;
use std::path::Path;

use crate::error::{Error, Result};

pub const GO_MOD_FILE: &str = "go.mod";

/// Reads the module name from `dir/go.mod`, if that file exists.
pub fn module_name<P: AsRef<Path>>(dir: P) -> Result<Option<String>> {
    let path = dir.as_ref().join(GO_MOD_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
    let name = parse_module_name(&content);
    if let Some(name) = &name {
        debug!("Found module '{}' in {}", name, path.display());
    }
    Ok(name)
}

/// Extracts the argument of the `module` directive.
pub fn parse_module_name(content: &str) -> Option<String> {
    content.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or_default().trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let name = rest.trim().trim_matches('"');
        (!name.is_empty()).then(|| name.to_string())
    })
}
