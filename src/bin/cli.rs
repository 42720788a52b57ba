// src/bin/cli.rs
use std::process::ExitCode;

use royale_harvest::cli;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;
    cli::run()
}
