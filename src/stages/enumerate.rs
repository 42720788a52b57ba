// src/stages/enumerate.rs
//
// Brute-force clan discovery: every tag of every length, in product order,
// probed once and recorded as valid / non valide.

use crate::api::{Clan, Fetch, RoyaleApi};
use crate::checkpoint::TagCheckpoint;
use crate::config::consts::{STATUS_INVALID, STATUS_VALID};
use crate::config::options::EnumerateOptions;
use crate::core::{tag, TagCursor};
use crate::error::{HarvestError, Result};
use crate::file::{CsvAppender, ENTITY_HEADER};
use crate::progress::Progress;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumerateSummary {
    pub probed: u64,
    pub valid: u64,
    /// Length the next run will start from.
    pub next_length: usize,
    pub stopped_early: bool,
}

/// Probe policy: only a clan that answered with at least one member counts.
/// Not-found and transient failures are both "non valide"; a flaky network
/// therefore undercounts clans rather than inventing them.
pub fn is_populated_clan(fetch: Fetch<Clan>) -> bool {
    match fetch {
        Fetch::Found(clan) => !clan.member_list.is_empty(),
        Fetch::NotFound => false,
        Fetch::Transient(why) => {
            logd!("probe failed, recorded as non valide: {why}");
            false
        }
    }
}

/// Where to start: `(length, cursor on that length)`. A checkpoint that does
/// not decode means a fresh start; one that cannot be read aborts the stage.
fn resume_point(opts: &EnumerateOptions) -> Result<(usize, TagCursor)> {
    let fresh = || (opts.min_length, TagCursor::new(&opts.alphabet, opts.min_length));
    let cp = match TagCheckpoint::load(&opts.checkpoint) {
        Ok(cp) => cp,
        Err(e @ HarvestError::Checkpoint { .. }) => {
            logw!("{e}; starting from length {}", opts.min_length);
            None
        }
        Err(e) => return Err(e),
    };

    let Some(cp) = cp else {
        return Ok(fresh());
    };
    if cp.length < opts.min_length {
        logw!("checkpoint length {} below min_length {}; ignoring it", cp.length, opts.min_length);
        return Ok(fresh());
    }

    let len = cp.length;
    let cursor = match &cp.last {
        None => TagCursor::new(&opts.alphabet, len),
        Some(last) => TagCursor::after(&opts.alphabet, len, tag::body(last)).unwrap_or_else(|| {
            logw!("checkpoint tag {last} is not a length-{len} tag over {}; skipping length {len}", opts.alphabet);
            TagCursor::exhausted(&opts.alphabet, len)
        }),
    };
    logf!("enumerate: resuming at length {len} after {}", cp.last.as_deref().unwrap_or("None"));
    Ok((len, cursor))
}

pub fn run(
    api: &dyn RoyaleApi,
    opts: &EnumerateOptions,
    progress: &mut dyn Progress,
) -> Result<EnumerateSummary> {
    let (start_len, first_cursor) = resume_point(opts)?;
    let mut out = CsvAppender::open(&opts.output, &ENTITY_HEADER)?;
    let mut summary = EnumerateSummary { next_length: start_len, ..Default::default() };

    progress.begin("enumerate", None);

    let mut first = Some(first_cursor);
    let mut last_probed: Option<(String, usize)> = None;
    'lengths: for len in start_len..=opts.max_length {
        let cursor = first.take().unwrap_or_else(|| TagCursor::new(&opts.alphabet, len));
        progress.log(&format!("Tag length = {len} ({} candidates, starting at index {})", cursor.total(), cursor.position()));

        for body in cursor {
            if opts.limit.is_some_and(|n| summary.probed >= n) {
                summary.stopped_early = true;
                if let Some((last, length)) = last_probed.take() {
                    TagCheckpoint { last: Some(last), length }.save(&opts.checkpoint)?;
                }
                break 'lengths;
            }

            let candidate = tag::with_prefix(&body);
            summary.probed += 1;
            if opts.report_every > 0 && summary.probed % opts.report_every == 0 {
                progress.log(&format!("Probe {candidate}"));
            }

            let valid = is_populated_clan(api.clan(&candidate, opts.timeout()));
            let status = if valid { STATUS_VALID } else { STATUS_INVALID };
            out.append(&[candidate.as_str(), status])?;

            if valid {
                summary.valid += 1;
                progress.log(&format!("Valid clan found: {candidate}"));
            }

            // row above is already flushed
            if summary.probed % opts.checkpoint_interval.max(1) == 0 {
                TagCheckpoint { last: Some(candidate.clone()), length: len }.save(&opts.checkpoint)?;
            }
            progress.item_done(&candidate);
            last_probed = Some((candidate, len));
        }

        TagCheckpoint::start_of(len + 1).save(&opts.checkpoint)?;
        last_probed = None;
        summary.next_length = len + 1;
        logf!("enumerate: length {len} complete, moving to {}", len + 1);
    }

    logf!(
        "enumerate: {} probed, {} valid{}",
        summary.probed,
        summary.valid,
        if summary.stopped_early { " (limit reached)" } else { "" }
    );
    progress.finish();
    Ok(summary)
}
