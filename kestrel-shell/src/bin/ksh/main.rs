//! Entry point for the ksh binary.

mod args;
mod tracing_setup;

use std::fs::File;
use std::io::{self, BufReader};

use anyhow::{Context, Result};
use kestrel_shell::surface::stdout_output;
use kestrel_shell::{Shell, ShellConfig};

fn main() -> Result<()> {
    let args = args::parse_args()?;

    let config = match &args.config {
        Some(path) => ShellConfig::load_from(path),
        None => ShellConfig::load_default(),
    }
    .unwrap_or_else(|err| {
        eprintln!("Warning: failed to load configuration: {err:#}");
        eprintln!("Using default configuration");
        ShellConfig::default()
    });

    tracing_setup::init(&config.logging);

    log::info!("Starting ksh");

    // Completion workers run on the blocking pool of this runtime.
    let runtime = tokio::runtime::Runtime::new()?;
    let _guard = runtime.enter();

    let shell = Shell::new(&config, stdout_output(), runtime.handle().clone());
    match &args.script {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening script {}", path.display()))?;
            shell.run(BufReader::new(file))
        }
        None => shell.run(io::stdin().lock()),
    }
}
