//! Glue between the parsed command line and the generation engine.

use log::debug;

use crate::cli::{Args, Command, OutputArgs};
use crate::constants::{DEFAULT_TEMPLATE, TYPES_PB_PRESET};
use crate::engine::{generate, Generation, GenerationRequest};
use crate::error::{Error, Result};
use crate::gomod;
use crate::output::Destination;
use crate::template::TemplateCatalog;

/// Runs the parsed command.
pub fn run(args: Args) -> Result<()> {
    let catalog = TemplateCatalog::new(&args.templates);
    match args.command {
        Command::GenTypesPb(output) => {
            generate_preset(&catalog, DEFAULT_TEMPLATE, TYPES_PB_PRESET, output)
        }
        Command::Generate {
            preset,
            template,
            output,
        } => generate_preset(&catalog, &template, &preset, output),
        Command::List => list_templates(&catalog),
    }
}

/// Picks the module name: a go.mod in the output directory wins over `--module-name`.
///
/// # Errors
/// * `Error::ConfigError` if neither source provides a name
pub fn resolve_module_name(output: &OutputArgs, command: &str) -> Result<String> {
    if let Some(out) = &output.out {
        if let Some(name) = gomod::module_name(out)? {
            return Ok(name);
        }
    }
    match output.module_name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(Error::ConfigError(format!(
            "required flag(s) \"module-name\" not set, use \"stencil {} -h\" for help",
            command
        ))),
    }
}

fn generate_preset(
    catalog: &TemplateCatalog,
    template_name: &str,
    preset_name: &str,
    output: OutputArgs,
) -> Result<()> {
    let template = catalog.open(template_name)?;
    let preset = template.preset(preset_name)?;
    let command = if preset_name == TYPES_PB_PRESET && template_name == DEFAULT_TEMPLATE {
        "gen-types-pb"
    } else {
        "generate"
    };
    let module_name = resolve_module_name(&output, command)?;
    debug!("Using module name '{}'", module_name);

    let markers = preset.markers()?;
    let prefix = preset.default_prefix(preset_name);
    let request = GenerationRequest {
        template: &template,
        selection: preset.selection()?,
        rules: template.rules(&module_name)?,
        destination: Destination::from_option(output.out, prefix),
        markers: markers.clone(),
    };

    match generate(request)? {
        Generation::Skipped { marker, .. } => {
            println!("'{}' already exists, no need to generate it.", marker.display());
        }
        Generation::Generated {
            root, used_default, ..
        } => {
            if used_default {
                if let Some(hint) = &preset.hint {
                    println!("\nusing help:\n  {}\n", hint);
                }
            }
            let target = markers
                .first()
                .map(|marker| marker.to_native(&root))
                .unwrap_or(root);
            println!(
                "generate \"{}\" code successfully, out = {}",
                preset_name,
                target.display()
            );
        }
    }
    Ok(())
}

fn list_templates(catalog: &TemplateCatalog) -> Result<()> {
    for name in catalog.names()? {
        let template = catalog.open(&name)?;
        println!("{}", name);
        for preset in template.manifest().presets.keys() {
            println!("  {}", preset);
        }
    }
    Ok(())
}
