// src/file.rs
//
// Stage artifacts: append-only CSV outputs and the readers the next stage
// uses on them. Outputs are never truncated or rewritten.

use std::{
    fs::{self, File, OpenOptions},
    io::{BufRead, BufReader, BufWriter, Lines, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use crate::config::consts::{STATUS_VALID, STATUS_VALID_LEGACY};
use crate::csv::{matches_header, parse_line, write_row};
use crate::error::{HarvestError, Result};

pub const ENTITY_HEADER: [&str; 2] = ["Identifier", "Status"];
pub const MEMBER_HEADER: [&str; 1] = ["PlayerTag"];
pub const EVENT_HEADER: [&str; 20] = [
    "winner_id", "winner_metric",
    "payload_1", "payload_2", "payload_3", "payload_4",
    "payload_5", "payload_6", "payload_7", "payload_8",
    "loser_id", "loser_metric",
    "payload_1", "payload_2", "payload_3", "payload_4",
    "payload_5", "payload_6", "payload_7", "payload_8",
];

/// Headers written by the first generation of collection scripts.
pub const LEGACY_ENTITY_HEADER: [&str; 2] = ["ClanTag", "Statut"];
pub const LEGACY_EVENT_HEADER: [&str; 20] = [
    "jgagnant", "tropheesg",
    "cg1", "cg2", "cg3", "cg4", "cg5", "cg6", "cg7", "cg8",
    "jperdant", "tropheesp",
    "cp1", "cp2", "cp3", "cp4", "cp5", "cp6", "cp7", "cp8",
];

/// Header lines a reader skips, per file kind.
pub const ENTITY_HEADERS: &[&[&str]] = &[&ENTITY_HEADER, &LEGACY_ENTITY_HEADER];
pub const MEMBER_HEADERS: &[&[&str]] = &[&MEMBER_HEADER];
pub const EVENT_HEADERS: &[&[&str]] = &[&EVENT_HEADER, &LEGACY_EVENT_HEADER];

/// Append-only CSV output. Every row is flushed before `append` returns.
pub struct CsvAppender {
    path: PathBuf,
    out: BufWriter<File>,
}

impl CsvAppender {
    /// Open `path` for appending, writing `header` first if the file is new
    /// or empty. A torn last line (no trailing newline) is terminated so the
    /// next row starts on its own line.
    pub fn open(path: &Path, header: &[&str]) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                ensure_directory(parent)?;
            }
        }
        let io_err = |e| HarvestError::io(path, e);

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)
            .map_err(io_err)?;

        let len = file.metadata().map_err(io_err)?.len();
        let mut out_needs_newline = false;
        if len > 0 {
            let mut last = [0u8; 1];
            file.seek(SeekFrom::Start(len - 1)).map_err(io_err)?;
            file.read_exact(&mut last).map_err(io_err)?;
            out_needs_newline = last[0] != b'\n';
        }

        let mut out = BufWriter::new(file);
        if len == 0 {
            write_row(&mut out, header).map_err(io_err)?;
        } else if out_needs_newline {
            logw!("{}: terminating torn last line", path.display());
            out.write_all(b"\n").map_err(io_err)?;
        }
        out.flush().map_err(io_err)?;

        Ok(Self { path: path.to_path_buf(), out })
    }

    pub fn append<S: AsRef<str>>(&mut self, row: &[S]) -> Result<()> {
        write_row(&mut self.out, row).map_err(|e| HarvestError::io(&self.path, e))?;
        self.out.flush().map_err(|e| HarvestError::io(&self.path, e))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Data lines of a CSV file, read one at a time. Blank lines are skipped,
/// and so is a first line matching any of `headers`. A missing file yields
/// nothing.
pub struct DataLines {
    path: PathBuf,
    lines: Option<Lines<BufReader<File>>>,
    headers: &'static [&'static [&'static str]],
    at_start: bool,
}

impl DataLines {
    pub fn open(path: &Path, headers: &'static [&'static [&'static str]]) -> Result<Self> {
        let lines = if path.exists() {
            let f = File::open(path).map_err(|e| HarvestError::io(path, e))?;
            Some(BufReader::new(f).lines())
        } else {
            None
        };
        Ok(Self { path: path.to_path_buf(), lines, headers, at_start: true })
    }
}

impl Iterator for DataLines {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let lines = self.lines.as_mut()?;
        loop {
            let line = match lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(HarvestError::io(&self.path, e))),
            };
            if line.trim().is_empty() {
                continue;
            }
            if std::mem::take(&mut self.at_start) {
                let first = parse_line(&line);
                if self.headers.iter().any(|h| matches_header(&first, h)) {
                    continue;
                }
            }
            return Some(Ok(line));
        }
    }
}

/// First column of every row, trimmed, blanks skipped.
pub fn read_first_column(path: &Path, headers: &'static [&'static [&'static str]]) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for line in DataLines::open(path, headers)? {
        let first = parse_line(&line?).into_iter().next().unwrap_or_default();
        let first = first.trim();
        if !first.is_empty() {
            out.push(s!(first));
        }
    }
    Ok(out)
}

pub fn is_valid_status(status: &str) -> bool {
    let s = status.trim();
    s.eq_ignore_ascii_case(STATUS_VALID) || s.eq_ignore_ascii_case(STATUS_VALID_LEGACY)
}

/// Clan tags marked valid in the enumeration output, in file order. Only
/// those are kept in memory; the file itself holds every probe ever made.
/// Repeats (re-probes across a restart) are kept; the harvester's own
/// checkpoint and dedup make them harmless.
pub fn read_valid_clans(path: &Path) -> Result<Vec<String>> {
    let mut out = Vec::new();
    for line in DataLines::open(path, ENTITY_HEADERS)? {
        let row = parse_line(&line?);
        if row.len() >= 2 && is_valid_status(&row[1]) {
            out.push(s!(row[0].trim()));
        }
    }
    Ok(out)
}

/// Count data rows (header excluded) without splitting them. Missing file = 0.
pub fn count_rows(path: &Path, headers: &'static [&'static [&'static str]]) -> Result<usize> {
    let mut n = 0;
    for line in DataLines::open(path, headers)? {
        line?;
        n += 1;
    }
    Ok(n)
}

pub fn ensure_directory(dir: &Path) -> Result<()> {
    if dir.exists() && !dir.is_dir() {
        return Err(HarvestError::io(
            dir,
            std::io::Error::other("path exists but is not a directory"),
        ));
    }
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| HarvestError::io(dir, e))?;
    }
    Ok(())
}
