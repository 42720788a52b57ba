// src/cli.rs
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::WrapErr;

use crate::api::HttpApi;
use crate::config::PipelineOptions;
use crate::progress::ConsoleProgress;
use crate::{stages, verify};

#[derive(Debug, Parser)]
#[command(name = "royale_harvest", version, about = "Resumable clan / player / battle harvester")]
pub struct Cli {
    /// TOML file layered over the built-in defaults
    #[arg(short, long, env = "ROYALE_HARVEST_CONFIG")]
    pub config: Option<PathBuf>,

    /// File holding the API bearer token
    #[arg(long, env = "ROYALE_HARVEST_KEY_FILE")]
    pub key_file: Option<PathBuf>,

    #[arg(long)]
    pub base_url: Option<String>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Log to stderr only
    #[arg(long)]
    pub no_log_file: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Probe every clan tag, shortest first
    Enumerate {
        #[arg(long)]
        checkpoint_interval: Option<u64>,
        #[arg(long)]
        max_length: Option<usize>,
        /// Stop after N probes
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Collect member tags of every valid clan
    Members {
        /// Stop after N clans
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Extract complete battles of every known player
    Battles {
        /// Pause between two players, in milliseconds
        #[arg(long)]
        pause_ms: Option<u64>,
        /// Stop after N players
        #[arg(long)]
        limit: Option<u64>,
    },
    /// enumerate, members, battles in sequence
    All,
    /// Checkpoints and output sizes (offline)
    Status,
    /// Check the battle output schema (offline)
    Verify {
        /// Defaults to the configured battle output
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

impl Cli {
    /// Command-line values win over the config file.
    pub fn apply_overrides(&self, opts: &mut PipelineOptions) {
        if let Some(k) = &self.key_file {
            opts.api.key_file = k.clone();
        }
        if let Some(u) = &self.base_url {
            opts.api.base_url = u.clone();
        }
        match &self.command {
            Command::Enumerate { checkpoint_interval, max_length, limit } => {
                if let Some(n) = checkpoint_interval { opts.enumerate.checkpoint_interval = *n; }
                if let Some(n) = max_length { opts.enumerate.max_length = *n; }
                if limit.is_some() { opts.enumerate.limit = *limit; }
            }
            Command::Members { limit } => {
                if limit.is_some() { opts.members.limit = *limit; }
            }
            Command::Battles { pause_ms, limit } => {
                if let Some(ms) = pause_ms { opts.battles.pause_ms = *ms; }
                if limit.is_some() { opts.battles.limit = *limit; }
            }
            Command::All | Command::Status | Command::Verify { .. } => {}
        }
    }
}

/// The key file is read before the stage touches any file; a missing key
/// aborts the command.
fn connect(opts: &PipelineOptions) -> color_eyre::Result<HttpApi> {
    HttpApi::from_options(&opts.api).wrap_err("cannot start without an API key")
}

pub fn run() -> color_eyre::Result<ExitCode> {
    execute(Cli::parse())
}

pub fn execute(cli: Cli) -> color_eyre::Result<ExitCode> {
    let mut opts = PipelineOptions::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut opts);
    opts.validate()?;

    let log_path = (!cli.no_log_file).then_some(opts.log_file.as_path());
    crate::log::init(log_path, cli.verbose)?;

    let mut progress = ConsoleProgress::default();

    match &cli.command {
        Command::Enumerate { .. } => {
            let api = connect(&opts)?;
            let s = stages::enumerate::run(&api, &opts.enumerate, &mut progress)?;
            println!("{} probed, {} valid clans", s.probed, s.valid);
        }
        Command::Members { .. } => {
            let api = connect(&opts)?;
            let s = stages::members::run(&api, &opts.members, &mut progress)?;
            println!("{} clans processed, {} new players", s.clans_processed, s.new_members);
        }
        Command::Battles { .. } => {
            let api = connect(&opts)?;
            let s = stages::battles::run(&api, &opts.battles, &mut progress)?;
            println!("{} players processed, {} battles written, {} dropped", s.players_processed, s.written, s.dropped);
        }
        Command::All => {
            let api = connect(&opts)?;
            let e = stages::enumerate::run(&api, &opts.enumerate, &mut progress)?;
            let m = stages::members::run(&api, &opts.members, &mut progress)?;
            let b = stages::battles::run(&api, &opts.battles, &mut progress)?;
            println!(
                "{} valid clans, {} new players, {} battles written",
                e.valid, m.new_members, b.written
            );
        }
        Command::Status => {
            for st in stages::status(&opts)? {
                println!(
                    "{:<10} rows={:<10} checkpoint={}",
                    st.stage,
                    st.output_rows,
                    st.checkpoint.as_deref().unwrap_or("-")
                );
            }
        }
        Command::Verify { file } => {
            let path = file.clone().unwrap_or_else(|| opts.battles.output.clone());
            let report = verify::check_event_file(&path)?;
            for v in report.violations.iter().take(20) {
                println!("row {}: {}", v.row, v.reason);
            }
            println!("{}: {} rows, {} violations", path.display(), report.rows, report.violations.len());
            if !report.is_clean() {
                loge!("{}: {} schema violations", path.display(), report.violations.len());
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_reach_the_right_stage() {
        let cli = Cli::parse_from([
            "royale_harvest", "--key-file", "/tmp/k.txt",
            "enumerate", "--checkpoint-interval", "25", "--max-length", "3", "--limit", "10",
        ]);
        let mut opts = PipelineOptions::default();
        cli.apply_overrides(&mut opts);
        assert_eq!(opts.api.key_file, PathBuf::from("/tmp/k.txt"));
        assert_eq!(opts.enumerate.checkpoint_interval, 25);
        assert_eq!(opts.enumerate.max_length, 3);
        assert_eq!(opts.enumerate.limit, Some(10));
        assert_eq!(opts.battles, PipelineOptions::default().battles);
    }

    #[test]
    fn battle_flags_only_touch_battles() {
        let cli = Cli::parse_from(["royale_harvest", "battles", "--pause-ms", "0", "--limit", "5"]);
        let mut opts = PipelineOptions::default();
        cli.apply_overrides(&mut opts);
        assert_eq!(opts.battles.pause_ms, 0);
        assert_eq!(opts.battles.limit, Some(5));
        assert_eq!(opts.members.limit, None);
    }
}
