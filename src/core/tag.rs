// src/core/tag.rs
//
// Tags travel with their `#` prefix everywhere (CSV rows, checkpoints, logs);
// the prefix is only dropped to position a cursor and escaped to build a URL.

use crate::config::consts::TAG_PREFIX;

pub fn with_prefix(body: &str) -> String {
    let mut out = String::with_capacity(body.len() + 1);
    out.push(TAG_PREFIX);
    out.push_str(body);
    out
}

/// Tag without its leading `#` (if any).
pub fn body(tag: &str) -> &str {
    tag.strip_prefix(TAG_PREFIX).unwrap_or(tag)
}

/// Path segment for the API (`#P0Q` → `%23P0Q`).
pub fn url_segment(tag: &str) -> String {
    urlencoding::encode(tag.trim()).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_round_trip() {
        assert_eq!(with_prefix("P0Q"), "#P0Q");
        assert_eq!(body("#P0Q"), "P0Q");
        assert_eq!(body("P0Q"), "P0Q");
    }

    #[test]
    fn hash_is_escaped_in_urls() {
        assert_eq!(url_segment("#2PYL"), "%232PYL");
        assert_eq!(url_segment(" #2PYL\n"), "%232PYL");
    }
}
