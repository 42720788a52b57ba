// src/stages/battles.rs
//
// Players → one fixed-width row per complete battle in their log.
//
// Row shape (20 columns):
//   winner tag, winner starting trophies, 8 winner cards,
//   loser tag,  loser starting trophies,  8 loser cards

use std::{thread, time::Duration};

use serde::Deserialize;
use thiserror::Error;

use crate::api::{Battle, Fetch, RoyaleApi, Side};
use crate::checkpoint;
use crate::config::consts::DECK_SIZE;
use crate::config::options::BattleOptions;
use crate::error::Result;
use crate::file::{self, CsvAppender, EVENT_HEADER, MEMBER_HEADERS};
use crate::progress::Progress;

pub type Deck = [String; DECK_SIZE];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SideRecord {
    pub tag: String,
    pub trophies: i64,
    pub cards: Deck,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventRecord {
    pub winner: SideRecord,
    pub loser: SideRecord,
}

impl EventRecord {
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(EVENT_HEADER.len());
        for side in [&self.winner, &self.loser] {
            row.push(side.tag.clone());
            row.push(side.trophies.to_string());
            row.extend(side.cards.iter().cloned());
        }
        row
    }
}

/// Why a battle did not make it into the output. Only counted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("undecodable entry")]
    Undecodable,
    #[error("missing side")]
    MissingSide,
    #[error("missing crowns")]
    MissingCrowns,
    #[error("missing tag")]
    MissingTag,
    #[error("missing starting trophies")]
    MissingTrophies,
    #[error("deck of {0} cards")]
    DeckSize(usize),
    #[error("unnamed card")]
    UnnamedCard,
}

/// Team wins only on strictly more crowns; a draw goes to the opponent.
pub fn winner_is_team(team_crowns: i64, opponent_crowns: i64) -> bool {
    team_crowns > opponent_crowns
}

fn side_record(side: &Side) -> std::result::Result<SideRecord, Rejection> {
    let tag = side
        .tag
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(Rejection::MissingTag)?;
    let trophies = side.starting_trophies.ok_or(Rejection::MissingTrophies)?;
    let cards = side.cards.as_deref().ok_or(Rejection::DeckSize(0))?;
    if cards.len() != DECK_SIZE {
        return Err(Rejection::DeckSize(cards.len()));
    }

    let names: Vec<String> = cards
        .iter()
        .map(|c| {
            c.name
                .as_deref()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(String::from)
                .ok_or(Rejection::UnnamedCard)
        })
        .collect::<std::result::Result<_, _>>()?;
    let cards: Deck = names.try_into().map_err(|v: Vec<String>| Rejection::DeckSize(v.len()))?;

    Ok(SideRecord { tag: s!(tag), trophies, cards })
}

/// Validate and orient one battle. All of the following must hold:
/// both sides have crowns, a tag, starting trophies, and exactly
/// `DECK_SIZE` cards that all carry a name.
pub fn extract_battle(battle: &Battle) -> std::result::Result<EventRecord, Rejection> {
    let team = battle.team.first().ok_or(Rejection::MissingSide)?;
    let opponent = battle.opponent.first().ok_or(Rejection::MissingSide)?;

    let team_crowns = team.crowns.ok_or(Rejection::MissingCrowns)?;
    let opponent_crowns = opponent.crowns.ok_or(Rejection::MissingCrowns)?;

    let (winner, loser) = if winner_is_team(team_crowns, opponent_crowns) {
        (team, opponent)
    } else {
        (opponent, team)
    };

    Ok(EventRecord {
        winner: side_record(winner)?,
        loser: side_record(loser)?,
    })
}

/// Same as `extract_battle`, straight from a raw log entry.
pub fn extract_event(raw: &serde_json::Value) -> std::result::Result<EventRecord, Rejection> {
    let battle = Battle::deserialize(raw).map_err(|_| Rejection::Undecodable)?;
    extract_battle(&battle)
}

/// Battle-log policy: a failed fetch is an empty log; the player is still
/// checkpointed and not retried.
pub fn events_or_empty(player_tag: &str, fetch: Fetch<Vec<serde_json::Value>>) -> Vec<serde_json::Value> {
    match fetch {
        Fetch::Found(log) => log,
        Fetch::NotFound => {
            logd!("{player_tag}: player not found");
            Vec::new()
        }
        Fetch::Transient(why) => {
            logw!("{player_tag}: battle log unavailable ({why})");
            Vec::new()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleSummary {
    pub players: usize,
    pub players_processed: u64,
    pub battles_seen: u64,
    pub written: u64,
    pub dropped: u64,
    pub stopped_early: bool,
}

pub fn run(
    api: &dyn RoyaleApi,
    opts: &BattleOptions,
    progress: &mut dyn Progress,
) -> Result<BattleSummary> {
    let players = file::read_first_column(&opts.source, MEMBER_HEADERS)?;
    let start = super::resume_index("battles", &players, &opts.checkpoint)?;

    let mut out = CsvAppender::open(&opts.output, &EVENT_HEADER)?;
    let mut summary = BattleSummary { players: players.len(), ..Default::default() };
    let pause = opts.pause();

    progress.begin("battles", Some((players.len() - start) as u64));
    logf!("battles: {} players, {} already done", players.len(), start);

    for player in &players[start..] {
        if opts.limit.is_some_and(|n| summary.players_processed >= n) {
            summary.stopped_early = true;
            break;
        }
        if summary.players_processed > 0 && pause > Duration::ZERO {
            thread::sleep(pause);
        }

        let log = events_or_empty(player, api.battle_log(player, opts.timeout()));
        let mut kept = 0u64;
        for raw in &log {
            match extract_event(raw) {
                Ok(event) => {
                    out.append(&event.to_row())?;
                    kept += 1;
                }
                Err(why) => {
                    logd!("{player}: battle dropped ({why})");
                    summary.dropped += 1;
                }
            }
        }

        checkpoint::save_key(&opts.checkpoint, player)?;
        summary.players_processed += 1;
        summary.battles_seen += log.len() as u64;
        summary.written += kept;

        progress.log(&format!("Player processed: {player} ({} battles received, {kept} complete)", log.len()));
        progress.item_done(player);
    }

    logf!(
        "battles: {} players, {} rows written, {} battles dropped{}",
        summary.players_processed,
        summary.written,
        summary.dropped,
        if summary.stopped_early { " (limit reached)" } else { "" }
    );
    progress.finish();
    Ok(summary)
}
