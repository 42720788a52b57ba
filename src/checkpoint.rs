// src/checkpoint.rs
//
// Per-stage resume cursors. A checkpoint always means "done up to and
// including this key". Files are replaced whole through a temporary sibling
// and a rename, so a crash mid-write leaves either the old or the new cursor.
//
// Formats (one line, no newline):
//   enumeration  `<tag or None>;<length>`   e.g. `#P0Q;3`, `None;4`
//   members      `<last clan tag>`
//   battles      `<last player tag>`

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{HarvestError, Result};

const NONE_LITERAL: &str = "None";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagCheckpoint {
    /// Last candidate confirmed written; `None` = start of `length`.
    pub last: Option<String>,
    pub length: usize,
}

impl TagCheckpoint {
    pub fn start_of(length: usize) -> Self {
        Self { last: None, length }
    }

    pub fn encode(&self) -> String {
        format!("{};{}", self.last.as_deref().unwrap_or(NONE_LITERAL), self.length)
    }

    pub fn decode(text: &str) -> std::result::Result<Self, String> {
        let text = text.trim();
        let (tag, len) = text
            .rsplit_once(';')
            .ok_or_else(|| format!("expected `<tag>;<length>`, got {text:?}"))?;
        let length: usize = len
            .trim()
            .parse()
            .map_err(|_| format!("bad length {len:?}"))?;
        let tag = tag.trim();
        let last = match tag {
            NONE_LITERAL | "" => None,
            t => Some(s!(t)),
        };
        Ok(Self { last, length })
    }

    /// `Ok(None)` when no checkpoint was ever written.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        let Some(text) = read_trimmed(path)? else { return Ok(None) };
        Self::decode(&text)
            .map(Some)
            .map_err(|reason| HarvestError::Checkpoint { path: path.to_path_buf(), reason })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.encode())
    }
}

/// Last key processed by a single-key stage, if any.
pub fn load_key(path: &Path) -> Result<Option<String>> {
    read_trimmed(path)
}

pub fn save_key(path: &Path, key: &str) -> Result<()> {
    write_atomic(path, key.trim())
}

fn read_trimmed(path: &Path) -> Result<Option<String>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path).map_err(|e| HarvestError::io(path, e))?;
    let text = text.trim();
    Ok(if text.is_empty() { None } else { Some(s!(text)) })
}

fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write `contents` to `path` via `<path>.tmp` + rename.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| HarvestError::io(parent, e))?;
        }
    }
    let tmp = tmp_sibling(path);
    let mut f = File::create(&tmp).map_err(|e| HarvestError::io(&tmp, e))?;
    f.write_all(contents.as_bytes()).map_err(|e| HarvestError::io(&tmp, e))?;
    f.sync_all().map_err(|e| HarvestError::io(&tmp, e))?;
    drop(f);
    fs::rename(&tmp, path).map_err(|e| HarvestError::io(path, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_checkpoint_codec() {
        let cp = TagCheckpoint { last: Some(s!("#AB")), length: 2 };
        assert_eq!(cp.encode(), "#AB;2");
        assert_eq!(TagCheckpoint::decode("#AB;2").unwrap(), cp);

        let fresh = TagCheckpoint::start_of(4);
        assert_eq!(fresh.encode(), "None;4");
        assert_eq!(TagCheckpoint::decode("None;4\n").unwrap(), fresh);
    }

    #[test]
    fn malformed_tag_checkpoints_are_rejected() {
        assert!(TagCheckpoint::decode("#AB").is_err());
        assert!(TagCheckpoint::decode("#AB;x").is_err());
        assert!(TagCheckpoint::decode(";").is_err());
    }

    #[test]
    fn tmp_sibling_keeps_directory() {
        let p = Path::new("progression/progress.txt");
        assert_eq!(tmp_sibling(p), Path::new("progression/progress.txt.tmp"));
    }
}
