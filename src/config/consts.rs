// src/config/consts.rs

// Net config
pub const BASE_URL: &str = "https://api.clashroyale.com/v1";
pub const USER_AGENT: &str = "royale_harvest/0.3";
pub const DEFAULT_KEY_FILE: &str = "cle_api.txt";

// Per-endpoint timeouts (ms)
pub const PROBE_TIMEOUT_MS: u64 = 1_500;
pub const MEMBERS_TIMEOUT_MS: u64 = 4_000;
pub const BATTLELOG_TIMEOUT_MS: u64 = 5_000;

// Enumeration
pub const TAG_PREFIX: char = '#';
pub const TAG_ALPHABET: &str = "0289PYLQGRJCUV";
pub const MIN_TAG_LEN: usize = 1;
pub const MAX_TAG_LEN: usize = 9;
pub const CHECKPOINT_INTERVAL: u64 = 200;
pub const PROBE_REPORT_EVERY: u64 = 200;

// Battle log
pub const DECK_SIZE: usize = 8;
pub const REQUEST_PAUSE_MS: u64 = 300; // be polite

// Files
pub const DATASET_DIR: &str = "dataset";
pub const PROGRESS_DIR: &str = "progression";
pub const STORE_DIR: &str = ".store";
pub const LOG_FILE: &str = "harvest.log";

pub const CLANS_FILE: &str = "clans_trouves.csv";
pub const PLAYERS_FILE: &str = "recherche_joueurs.csv";
pub const BATTLES_FILE: &str = "combats_joueurs.csv";

pub const CLANS_PROGRESS: &str = "progress.txt";
pub const PLAYERS_PROGRESS: &str = "progress_joueurs.txt";
pub const BATTLES_PROGRESS: &str = "progress_combats.txt";

// CSV
pub const STATUS_VALID: &str = "valid";
pub const STATUS_VALID_LEGACY: &str = "valide";
pub const STATUS_INVALID: &str = "non valide";
