// src/config/options.rs
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;
use crate::error::{HarvestError, Result};

/// Everything a run needs, built once at startup and handed to each stage.
/// Loaded from an optional TOML file; any missing key falls back to defaults.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    pub api: ApiOptions,
    pub enumerate: EnumerateOptions,
    pub members: MemberOptions,
    pub battles: BattleOptions,
    pub log_file: PathBuf,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            api: ApiOptions::default(),
            enumerate: EnumerateOptions::default(),
            members: MemberOptions::default(),
            battles: BattleOptions::default(),
            log_file: PathBuf::from(STORE_DIR).join(LOG_FILE),
        }
    }
}

impl PipelineOptions {
    /// Defaults, or the given TOML file layered over them.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let opts = match path {
            None => Self::default(),
            Some(p) => {
                let text = fs::read_to_string(p).map_err(|e| HarvestError::io(p, e))?;
                toml::from_str(&text).map_err(|source| HarvestError::Config {
                    path: p.to_path_buf(),
                    source,
                })?
            }
        };
        opts.validate()?;
        Ok(opts)
    }

    pub fn validate(&self) -> Result<()> {
        let e = &self.enumerate;
        if e.alphabet.is_empty() {
            return Err(HarvestError::InvalidOption(s!("enumerate.alphabet is empty")));
        }
        let mut seen: Vec<char> = e.alphabet.chars().collect();
        seen.sort_unstable();
        seen.dedup();
        if seen.len() != e.alphabet.chars().count() {
            return Err(HarvestError::InvalidOption(format!(
                "enumerate.alphabet has repeated symbols: {}",
                e.alphabet
            )));
        }
        if e.min_length == 0 || e.min_length > e.max_length {
            return Err(HarvestError::InvalidOption(format!(
                "enumerate lengths must satisfy 1 <= min ({}) <= max ({})",
                e.min_length, e.max_length
            )));
        }
        if e.checkpoint_interval == 0 {
            return Err(HarvestError::InvalidOption(s!(
                "enumerate.checkpoint_interval must be at least 1"
            )));
        }
        Ok(())
    }

    /// Re-anchor every relative file path under `root`.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        let anchor = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = root.join(&*p);
            }
        };
        anchor(&mut self.api.key_file);
        anchor(&mut self.enumerate.output);
        anchor(&mut self.enumerate.checkpoint);
        anchor(&mut self.members.source);
        anchor(&mut self.members.output);
        anchor(&mut self.members.checkpoint);
        anchor(&mut self.battles.source);
        anchor(&mut self.battles.output);
        anchor(&mut self.battles.checkpoint);
        anchor(&mut self.log_file);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApiOptions {
    pub base_url: String,
    pub key_file: PathBuf,
    pub user_agent: String,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            base_url: s!(BASE_URL),
            key_file: PathBuf::from(DEFAULT_KEY_FILE),
            user_agent: s!(USER_AGENT),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnumerateOptions {
    pub alphabet: String,
    pub min_length: usize,
    pub max_length: usize,
    /// Probes between two checkpoint writes.
    pub checkpoint_interval: u64,
    /// Emit a progress line every N probes.
    pub report_every: u64,
    pub timeout_ms: u64,
    /// Stop after this many probes; the last one is checkpointed.
    pub limit: Option<u64>,
    pub output: PathBuf,
    pub checkpoint: PathBuf,
}

impl Default for EnumerateOptions {
    fn default() -> Self {
        Self {
            alphabet: s!(TAG_ALPHABET),
            min_length: MIN_TAG_LEN,
            max_length: MAX_TAG_LEN,
            checkpoint_interval: CHECKPOINT_INTERVAL,
            report_every: PROBE_REPORT_EVERY,
            timeout_ms: PROBE_TIMEOUT_MS,
            limit: None,
            output: PathBuf::from(DATASET_DIR).join(CLANS_FILE),
            checkpoint: PathBuf::from(PROGRESS_DIR).join(CLANS_PROGRESS),
        }
    }
}

impl EnumerateOptions {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MemberOptions {
    pub timeout_ms: u64,
    /// Stop after this many clans.
    pub limit: Option<u64>,
    /// Enumeration output (read-only here).
    pub source: PathBuf,
    pub output: PathBuf,
    pub checkpoint: PathBuf,
}

impl Default for MemberOptions {
    fn default() -> Self {
        Self {
            timeout_ms: MEMBERS_TIMEOUT_MS,
            limit: None,
            source: PathBuf::from(DATASET_DIR).join(CLANS_FILE),
            output: PathBuf::from(DATASET_DIR).join(PLAYERS_FILE),
            checkpoint: PathBuf::from(PROGRESS_DIR).join(PLAYERS_PROGRESS),
        }
    }
}

impl MemberOptions {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BattleOptions {
    pub timeout_ms: u64,
    /// Blocking pause between two players.
    pub pause_ms: u64,
    /// Stop after this many players.
    pub limit: Option<u64>,
    /// Member output (read-only here).
    pub source: PathBuf,
    pub output: PathBuf,
    pub checkpoint: PathBuf,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            timeout_ms: BATTLELOG_TIMEOUT_MS,
            pause_ms: REQUEST_PAUSE_MS,
            limit: None,
            source: PathBuf::from(DATASET_DIR).join(PLAYERS_FILE),
            output: PathBuf::from(DATASET_DIR).join(BATTLES_FILE),
            checkpoint: PathBuf::from(PROGRESS_DIR).join(BATTLES_PROGRESS),
        }
    }
}

impl BattleOptions {
    pub fn timeout(&self) -> Duration { Duration::from_millis(self.timeout_ms) }
    pub fn pause(&self) -> Duration { Duration::from_millis(self.pause_ms) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let text = r#"
            [enumerate]
            checkpoint_interval = 50
            max_length = 4

            [battles]
            pause_ms = 0
        "#;
        let opts: PipelineOptions = toml::from_str(text).unwrap();
        assert_eq!(opts.enumerate.checkpoint_interval, 50);
        assert_eq!(opts.enumerate.max_length, 4);
        assert_eq!(opts.enumerate.alphabet, TAG_ALPHABET);
        assert_eq!(opts.battles.pause(), Duration::ZERO);
        assert_eq!(opts.members.timeout(), Duration::from_millis(MEMBERS_TIMEOUT_MS));
        assert!(opts.validate().is_ok());
    }

    #[test]
    fn rejects_bad_enumeration_settings() {
        let mut opts = PipelineOptions::default();
        opts.enumerate.alphabet = s!("AAB");
        assert!(opts.validate().is_err());

        let mut opts = PipelineOptions::default();
        opts.enumerate.min_length = 5;
        opts.enumerate.max_length = 3;
        assert!(opts.validate().is_err());

        let mut opts = PipelineOptions::default();
        opts.enumerate.checkpoint_interval = 0;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn rooted_at_only_moves_relative_paths() {
        let mut opts = PipelineOptions::default();
        opts.api.key_file = PathBuf::from("/etc/key.txt");
        let opts = opts.rooted_at(Path::new("/tmp/run"));
        assert_eq!(opts.api.key_file, PathBuf::from("/etc/key.txt"));
        assert_eq!(opts.enumerate.output, Path::new("/tmp/run").join(DATASET_DIR).join(CLANS_FILE));
        assert_eq!(opts.members.source, opts.enumerate.output);
        assert_eq!(opts.battles.source, opts.members.output);
    }
}
