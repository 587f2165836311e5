//! Common constants used throughout stencil.

/// Template used when a command does not name one
pub const DEFAULT_TEMPLATE: &str = "sponge";

/// Preset generated by the `gen-types-pb` command
pub const TYPES_PB_PRESET: &str = "types-pb";

/// Template directory shipped with the crate, resolved at build time
pub const DEFAULT_TEMPLATES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/templates");
