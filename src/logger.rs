//! Logger initialization for the stencil binary.

/// Routes `log` output to stderr: debug details with `--verbose`, warnings and errors otherwise.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .init();
}
