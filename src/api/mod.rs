// src/api/mod.rs
//
// Seam between the stages and the remote API. Stages only see `RoyaleApi`,
// so tests drive them with an in-memory fake and the binary with `HttpApi`.

pub mod http;
pub mod models;

use std::time::Duration;

pub use http::{Credential, HttpApi};
pub use models::{Battle, Card, Clan, Member, Side};

/// Outcome of one remote call.
///
/// The API answers 404 for unknown tags, but a timeout or a 5xx says nothing
/// about existence. The variants keep that apart; each call site then picks
/// how to collapse them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Fetch<T> {
    Found(T),
    NotFound,
    Transient(String),
}

impl<T> Fetch<T> {
    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Fetch::Found(_) => "found",
            Fetch::NotFound => "not found",
            Fetch::Transient(_) => "transient",
        }
    }
}

pub trait RoyaleApi {
    /// `GET /clans/{tag}`
    fn clan(&self, tag: &str, timeout: Duration) -> Fetch<Clan>;

    /// `GET /players/{tag}/battlelog`, entries left undecoded so that one
    /// malformed battle cannot sink the whole log.
    fn battle_log(&self, player_tag: &str, timeout: Duration) -> Fetch<Vec<serde_json::Value>>;
}
