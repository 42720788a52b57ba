// src/api/models.rs
//
// Only the fields the pipeline reads. Everything is optional or defaulted so
// that a sparse payload decodes and the stage decides what "incomplete" means.

use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clan {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub member_list: Vec<Member>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub tag: Option<String>,
}

/// One battle-log entry. Both sides are arrays upstream (2v2 modes carry two
/// players); the pipeline only ever looks at the first player of each.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Battle {
    #[serde(default)]
    pub team: Vec<Side>,
    #[serde(default)]
    pub opponent: Vec<Side>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Side {
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub crowns: Option<i64>,
    #[serde(default)]
    pub starting_trophies: Option<i64>,
    #[serde(default)]
    pub cards: Option<Vec<Card>>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct Card {
    #[serde(default)]
    pub name: Option<String>,
}
