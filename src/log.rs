// src/log.rs
//
// File logger behind the `log` facade. Every record lands in the log file with
// an elapsed-time stamp; Info and above are mirrored to stderr so long stage
// runs stay observable from the terminal.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use ::log::{Level, LevelFilter, Log, Metadata, Record};

use crate::error::{HarvestError, Result};

static START: OnceLock<Instant> = OnceLock::new();

fn start() -> Instant {
    *START.get_or_init(Instant::now)
}

pub fn fmt_elapsed(ms: u128) -> String {
    let total_ms = ms as u64;
    let h = total_ms / 3_600_000;
    let m = (total_ms % 3_600_000) / 60_000;
    let s = (total_ms % 60_000) / 1_000;
    let ms = total_ms % 1_000;
    format!("{h:02}:{m:02}:{s:02}.{ms:03}")
}

pub struct FileLogger {
    file: Option<Mutex<File>>,
    level: LevelFilter,
}

impl FileLogger {
    fn line(record: &Record) -> String {
        let elapsed = fmt_elapsed(start().elapsed().as_millis());
        format!("[{elapsed}][{}] {}\n", record.level(), record.args())
    }
}

impl Log for FileLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = Self::line(record);

        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.write_all(line.as_bytes());
            }
        }
        if record.level() <= Level::Info {
            eprint!("{line}");
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut f) = file.lock() {
                let _ = f.flush();
            }
        }
    }
}

/// Install the global logger. `path = None` logs to stderr only.
/// Calling twice is harmless; the first logger stays installed.
pub fn init(path: Option<&Path>, verbose: bool) -> Result<()> {
    start();

    let file = match path {
        Some(p) => {
            if let Some(parent) = p.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent).map_err(|e| HarvestError::io(parent, e))?;
                }
            }
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .map_err(|e| HarvestError::io(p, e))?;
            Some(Mutex::new(f))
        }
        None => None,
    };

    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };
    let logger = FileLogger { file, level };

    if ::log::set_boxed_logger(Box::new(logger)).is_ok() {
        ::log::set_max_level(level);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installed_logger_writes_stamped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".store").join("harvest.log");
        init(Some(&path), false).unwrap();
        // a second install keeps the first
        init(None, true).unwrap();

        logf!("harvest started");
        logd!("below the level");
        ::log::logger().flush();

        let text = fs::read_to_string(&path).unwrap();
        let line = text.lines().find(|l| l.ends_with("harvest started")).unwrap();
        assert!(line.starts_with("[00:"));
        assert!(line.contains("][INFO] "));
        assert!(!text.contains("below the level"));
    }

    #[test]
    fn elapsed_is_zero_padded() {
        assert_eq!(fmt_elapsed(0), "00:00:00.000");
        assert_eq!(fmt_elapsed(3_723_004), "01:02:03.004");
    }
}
