// src/api/http.rs
//
// Blocking HTTPS client for the official API. One agent per process; the
// bearer header is built once from the key file.

use std::fmt;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{Clan, Fetch, RoyaleApi};
use crate::config::options::ApiOptions;
use crate::core::tag;
use crate::error::{HarvestError, Result};

/// API token read from a local file. Never printed.
#[derive(Clone)]
pub struct Credential(String);

impl Credential {
    /// Missing, unreadable or blank key file is fatal: no stage may start
    /// without a usable token.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| HarvestError::Credential {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let token = text.trim();
        if token.is_empty() {
            return Err(HarvestError::Credential {
                path: path.to_path_buf(),
                reason: s!("file is empty"),
            });
        }
        Ok(Self(s!(token)))
    }

    fn bearer(&self) -> String {
        join!("Bearer ", &self.0)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

pub struct HttpApi {
    agent: ureq::Agent,
    base_url: String,
    auth: String,
}

impl HttpApi {
    pub fn new(opts: &ApiOptions, credential: &Credential) -> Self {
        let agent = ureq::AgentBuilder::new()
            .user_agent(&opts.user_agent)
            .build();
        Self {
            agent,
            base_url: s!(opts.base_url.trim_end_matches('/')),
            auth: credential.bearer(),
        }
    }

    /// Load the key file named in `opts` and build the client.
    pub fn from_options(opts: &ApiOptions) -> Result<Self> {
        let credential = Credential::load(&opts.key_file)?;
        Ok(Self::new(opts, &credential))
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str, timeout: Duration) -> Fetch<T> {
        let url = join!(&self.base_url, path);
        let resp = self
            .agent
            .get(&url)
            .timeout(timeout)
            .set("Accept", "application/json")
            .set("Authorization", &self.auth)
            .call();

        match resp {
            Ok(r) if r.status() == 200 => match r.into_json::<T>() {
                Ok(v) => Fetch::Found(v),
                Err(e) => Fetch::Transient(format!("decode {path}: {e}")),
            },
            Ok(r) => Fetch::Transient(format!("HTTP {} {path}", r.status())),
            Err(ureq::Error::Status(404, _)) => Fetch::NotFound,
            Err(ureq::Error::Status(code, _)) => Fetch::Transient(format!("HTTP {code} {path}")),
            Err(ureq::Error::Transport(t)) => Fetch::Transient(format!("{path}: {t}")),
        }
    }
}

impl RoyaleApi for HttpApi {
    fn clan(&self, clan_tag: &str, timeout: Duration) -> Fetch<Clan> {
        let path = join!("/clans/", &tag::url_segment(clan_tag));
        let out = self.get_json(&path, timeout);
        logd!("GET {path}: {}", out.label());
        out
    }

    fn battle_log(&self, player_tag: &str, timeout: Duration) -> Fetch<Vec<serde_json::Value>> {
        let path = join!("/players/", &tag::url_segment(player_tag), "/battlelog");
        let out = self.get_json(&path, timeout);
        logd!("GET {path}: {}", out.label());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn credential_is_trimmed_and_redacted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "  abc.def  ").unwrap();
        let c = Credential::load(f.path()).unwrap();
        assert_eq!(c.bearer(), "Bearer abc.def");
        assert_eq!(format!("{c:?}"), "Credential(***)");
    }

    #[test]
    fn missing_or_blank_key_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("cle_api.txt");
        assert!(matches!(
            Credential::load(&missing),
            Err(HarvestError::Credential { .. })
        ));

        std::fs::write(&missing, "\n  \n").unwrap();
        assert!(matches!(
            Credential::load(&missing),
            Err(HarvestError::Credential { .. })
        ));
    }
}
