// src/stages/members.rs
//
// Valid clans → their member tags, each tag written once across all runs.

use std::collections::HashSet;

use crate::api::{Clan, Fetch, RoyaleApi};
use crate::checkpoint;
use crate::config::options::MemberOptions;
use crate::error::Result;
use crate::file::{self, CsvAppender, MEMBER_HEADER, MEMBER_HEADERS};
use crate::progress::Progress;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberSummary {
    /// Valid clans in the source file.
    pub clans: usize,
    pub clans_processed: u64,
    /// Tags already in the output before this run.
    pub known_before: usize,
    pub new_members: u64,
    pub stopped_early: bool,
}

/// Member policy: anything but a successful answer means "no members this
/// run". The clan is still checkpointed and is not retried.
pub fn members_or_empty(clan_tag: &str, fetch: Fetch<Clan>) -> Vec<String> {
    match fetch {
        Fetch::Found(clan) => clan
            .member_list
            .into_iter()
            .filter_map(|m| m.tag)
            .map(|t| s!(t.trim()))
            .filter(|t| !t.is_empty())
            .collect(),
        Fetch::NotFound => {
            logd!("{clan_tag}: clan not found");
            Vec::new()
        }
        Fetch::Transient(why) => {
            logw!("{clan_tag}: member list unavailable ({why})");
            Vec::new()
        }
    }
}

/// Every tag already written, so dedup holds across restarts.
pub fn load_known(opts: &MemberOptions) -> Result<HashSet<String>> {
    Ok(file::read_first_column(&opts.output, MEMBER_HEADERS)?.into_iter().collect())
}

pub fn run(
    api: &dyn RoyaleApi,
    opts: &MemberOptions,
    progress: &mut dyn Progress,
) -> Result<MemberSummary> {
    let clans = file::read_valid_clans(&opts.source)?;
    let start = super::resume_index("members", &clans, &opts.checkpoint)?;

    let mut known = load_known(opts)?;
    let mut out = CsvAppender::open(&opts.output, &MEMBER_HEADER)?;
    let mut summary = MemberSummary {
        clans: clans.len(),
        known_before: known.len(),
        ..Default::default()
    };

    progress.begin("members", Some((clans.len() - start) as u64));
    logf!("members: {} valid clans, {} already done, {} players known", clans.len(), start, known.len());

    for clan_tag in &clans[start..] {
        if opts.limit.is_some_and(|n| summary.clans_processed >= n) {
            summary.stopped_early = true;
            break;
        }

        let members = members_or_empty(clan_tag, api.clan(clan_tag, opts.timeout()));
        let mut added = 0u64;
        for tag in &members {
            if known.insert(tag.clone()) {
                out.append(&[tag.as_str()])?;
                added += 1;
            }
        }

        checkpoint::save_key(&opts.checkpoint, clan_tag)?;
        summary.clans_processed += 1;
        summary.new_members += added;

        progress.log(&format!("Clan processed: {clan_tag} ({} players, {added} new)", members.len()));
        progress.item_done(clan_tag);
    }

    logf!(
        "members: {} clans processed, {} new players{}",
        summary.clans_processed,
        summary.new_members,
        if summary.stopped_early { " (limit reached)" } else { "" }
    );
    progress.finish();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Member;

    fn clan(tags: &[Option<&str>]) -> Clan {
        Clan {
            tag: Some(s!("#C")),
            member_list: tags.iter().map(|t| Member { tag: t.map(String::from) }).collect(),
        }
    }

    #[test]
    fn found_clan_yields_its_tags() {
        let got = members_or_empty("#C", Fetch::Found(clan(&[Some("#A"), None, Some(" #B "), Some("")])));
        assert_eq!(got, vec!["#A", "#B"]);
    }

    #[test]
    fn failures_collapse_to_empty() {
        assert!(members_or_empty("#C", Fetch::NotFound).is_empty());
        assert!(members_or_empty("#C", Fetch::Transient(s!("timeout"))).is_empty());
    }
}
