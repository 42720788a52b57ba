// src/stages/mod.rs
//! # Pipeline stages
//!
//! Three sequential, independently resumable stages connected by files:
//!
//! ```text
//! enumerate ──clans_trouves.csv──▶ members ──recherche_joueurs.csv──▶ battles ──▶ combats_joueurs.csv
//! ```
//!
//! ## Conventions & invariants
//! - Every stage reads its predecessor's output (complete or partial) and
//!   never writes to it.
//! - Outputs are append-only; a row is flushed before the checkpoint that
//!   covers it is written, so after a crash the output is a superset of what
//!   the checkpoint claims.
//! - Order is deterministic (product order, then file order). That is what
//!   lets a single key stand in for "everything before it is done".
//! - Remote failures never abort a stage. Local I/O failures do.

pub mod battles;
pub mod enumerate;
pub mod members;

use std::path::Path;

use crate::checkpoint::{self, TagCheckpoint};
use crate::config::PipelineOptions;
use crate::error::Result;
use crate::file::{self, ENTITY_HEADERS, EVENT_HEADERS, MEMBER_HEADERS};

/// Index of the first key still to process, given the last confirmed key.
/// `None` when `last` does not occur in `keys`: a skip-until over this list
/// would never start, so there is nothing to do.
pub fn frontier_start(keys: &[String], last: Option<&str>) -> Option<usize> {
    match last {
        None => Some(0),
        Some(last) => keys.iter().position(|k| k == last).map(|i| i + 1),
    }
}

/// Shared by the two key-checkpointed stages: where to resume in `keys`.
pub(crate) fn resume_index(stage: &str, keys: &[String], checkpoint: &Path) -> Result<usize> {
    let last = checkpoint::load_key(checkpoint)?;
    match frontier_start(keys, last.as_deref()) {
        Some(i) => {
            if let Some(last) = &last {
                logf!("{stage}: resuming after {last} ({i}/{} done)", keys.len());
            }
            Ok(i)
        }
        None => {
            logw!(
                "{stage}: checkpoint key {:?} not found in source ({} keys); nothing to resume",
                last.unwrap_or_default(),
                keys.len()
            );
            Ok(keys.len())
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StageStatus {
    pub stage: &'static str,
    pub checkpoint: Option<String>,
    pub output_rows: usize,
}

/// Checkpoint and output size of every stage. Reads local files only.
pub fn status(opts: &PipelineOptions) -> Result<Vec<StageStatus>> {
    let enum_cp = match TagCheckpoint::load(&opts.enumerate.checkpoint) {
        Ok(cp) => cp.map(|c| c.encode()),
        Err(e) => Some(format!("unreadable ({e})")),
    };
    Ok(vec![
        StageStatus {
            stage: "enumerate",
            checkpoint: enum_cp,
            output_rows: file::count_rows(&opts.enumerate.output, ENTITY_HEADERS)?,
        },
        StageStatus {
            stage: "members",
            checkpoint: checkpoint::load_key(&opts.members.checkpoint)?,
            output_rows: file::count_rows(&opts.members.output, MEMBER_HEADERS)?,
        },
        StageStatus {
            stage: "battles",
            checkpoint: checkpoint::load_key(&opts.battles.checkpoint)?,
            output_rows: file::count_rows(&opts.battles.output, EVENT_HEADERS)?,
        },
    ])
}
