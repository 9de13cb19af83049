//! Command-line argument parsing.

use std::path::PathBuf;

use anyhow::{bail, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    /// Overrides the default configuration file.
    pub config: Option<PathBuf>,
    /// Read input lines from this file instead of stdin.
    pub script: Option<PathBuf>,
}

const USAGE: &str = "usage: ksh [--config <path>] [--script <path>]";

pub fn parse_args() -> Result<Args> {
    parse(std::env::args().skip(1))
}

fn parse(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        let slot = match arg.as_str() {
            "--config" | "-c" => &mut parsed.config,
            "--script" | "-s" => &mut parsed.script,
            "--help" | "-h" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            other => bail!("unexpected argument '{other}'\n{USAGE}"),
        };
        let Some(value) = args.next() else {
            bail!("'{arg}' expects a path\n{USAGE}");
        };
        *slot = Some(PathBuf::from(value));
    }
    Ok(parsed)
}
