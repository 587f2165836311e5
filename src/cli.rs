//! Command-line interface implementation for stencil.
//! Provides argument parsing and help text formatting using clap.

use clap::{error::ErrorKind, Args as ClapArgs, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use crate::constants::{DEFAULT_TEMPLATE, DEFAULT_TEMPLATES_DIR};

/// Command-line arguments structure for stencil.
#[derive(Parser, Debug)]
#[command(author, version, about = "stencil: generate code from template trees", long_about = None)]
pub struct Args {
    /// Enable verbose logging output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory holding the template trees
    #[arg(long, value_name = "DIR", default_value = DEFAULT_TEMPLATES_DIR, global = true)]
    pub templates: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate types.proto code
    ///
    /// Code generation is skipped when the output directory already holds the generated files.
    GenTypesPb(OutputArgs),

    /// Generate code from a preset declared in a template manifest
    Generate {
        /// Preset name, as declared in the template manifest
        #[arg(value_name = "PRESET")]
        preset: String,

        /// Template to generate from
        #[arg(short, long, default_value = DEFAULT_TEMPLATE)]
        template: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List templates and their presets
    List,
}

/// Module name and output directory shared by the generating commands.
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Module name written in place of the template's placeholder
    #[arg(short, long)]
    pub module_name: Option<String>,

    /// Output directory, default is ./<preset>_<time>.
    /// If it holds a go.mod, its module name is used and --module-name can be omitted.
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With status code 1 and the help text if no command is given
/// * With clap's default error handling for other argument errors
pub fn get_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            if matches!(
                e.kind(),
                ErrorKind::MissingRequiredArgument
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                    | ErrorKind::MissingSubcommand
            ) {
                if let Err(err) = Args::command()
                    .help_template(
                        r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#,
                    )
                    .print_help()
                {
                    eprintln!("Failed to print help: {}", err);
                }
                std::process::exit(1);
            } else {
                e.exit();
            }
        }
    }
}
