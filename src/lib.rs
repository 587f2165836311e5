//! stencil replicates template trees for code scaffolding.
//! It selects part of a template tree, rewrites file contents with ordered
//! literal substitutions and writes the result to a fresh or caller-supplied
//! directory without clobbering earlier output.

/// Command-line interface module for the stencil application
pub mod cli;

/// Template manifest loading (template.json, template.yml, template.yaml)
pub mod config;

/// Names of the built-in template and preset
pub mod constants;

/// Generation requests and the `generate` entry point
pub mod engine;

/// Error types and handling for the stencil application
pub mod error;

/// Module name detection from go.mod
pub mod gomod;

/// Logging setup for the stencil binary
pub mod logger;

/// Destination resolution and collision checks
pub mod output;

/// Content and path rewriting of template files
pub mod processor;

/// Ordered literal substitution rules
pub mod rules;

/// Command execution behind the CLI
pub mod runner;

/// Include/exclude decisions over template paths
pub mod selection;

/// Template catalog and template handles
pub mod template;

/// Pruned traversal of template trees
pub mod walker;

/// Per-file atomic persistence of rendered files
pub mod writer;
