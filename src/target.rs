//! Destination identifiers and invite links as typed by the operator

use std::fmt;

use crate::error::{Error, Result};

/// Prefix of Bot-API style channel ids (`-100<channel id>`).
const CHANNEL_ID_PREFIX: &str = "-100";

/// A destination as entered on the command line or in the menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// Numeric id, possibly in Bot-API form (`-100…` or `-…`)
    Id(i64),
    /// Public handle, stored without the leading `@`
    Handle(String),
}

impl Target {
    /// Parse operator input; empty input falls back to `default`.
    ///
    /// Input starting with `-` or made of digits only is a numeric id,
    /// anything else is treated as a handle.
    pub fn parse(input: &str, default: &str) -> Result<Self> {
        let input = input.trim();
        let input = if input.is_empty() { default.trim() } else { input };

        if input.is_empty() {
            return Err(Error::InvalidArgument("пустой идентификатор группы".into()));
        }

        if input.starts_with('-') || input.chars().all(|c| c.is_ascii_digit()) {
            return input
                .parse::<i64>()
                .map(Target::Id)
                .map_err(|_| Error::InvalidArgument(format!("Неверный формат ID: {}", input)));
        }

        let handle = input.strip_prefix('@').unwrap_or(input);
        if handle.is_empty() {
            return Err(Error::InvalidArgument(format!("Неверный username: {}", input)));
        }
        Ok(Target::Handle(handle.to_string()))
    }

    /// Candidate raw ids this target may refer to.
    ///
    /// `-1001234` matches channel `1234`, `-5678` matches basic group `5678`,
    /// and the literal value is always included.
    pub fn candidate_ids(&self) -> Vec<i64> {
        let Target::Id(id) = self else {
            return Vec::new();
        };

        let mut ids = vec![*id];
        let text = id.to_string();
        if let Some(bare) = text
            .strip_prefix(CHANNEL_ID_PREFIX)
            .and_then(|rest| rest.parse::<i64>().ok())
        {
            ids.push(bare);
        }
        if *id < 0 {
            ids.push(id.saturating_neg());
        }
        ids.dedup();
        ids
    }

    /// Whether a peer with `peer_id` is this target.
    pub fn matches_id(&self, peer_id: i64) -> bool {
        self.candidate_ids().contains(&peer_id)
    }

    pub fn handle(&self) -> Option<&str> {
        match self {
            Target::Handle(handle) => Some(handle),
            Target::Id(_) => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Id(id) => write!(f, "{}", id),
            Target::Handle(handle) => write!(f, "@{}", handle),
        }
    }
}

/// Extract the invite hash from a `t.me` link or return the input as-is.
///
/// Accepts `https://t.me/+HASH`, `t.me/joinchat/HASH` and bare hashes.
pub fn parse_invite_hash(link: &str) -> Result<String> {
    let link = link.trim();

    let hash = if link.contains("t.me/") || link.contains("telegram.me/") {
        let path = link.split(['?', '#']).next().unwrap_or_default();
        path.trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or_default()
    } else {
        link
    };
    let hash = hash.strip_prefix('+').unwrap_or(hash);

    if hash.is_empty() || hash == "joinchat" {
        return Err(Error::InvalidInvite(link.to_string()));
    }
    Ok(hash.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_are_ids() {
        assert_eq!(Target::parse("3669051362", "").unwrap(), Target::Id(3669051362));
        assert_eq!(Target::parse(" 42 ", "").unwrap(), Target::Id(42));
    }

    #[test]
    fn leading_minus_is_id() {
        assert_eq!(
            Target::parse("-1001234567", "").unwrap(),
            Target::Id(-1001234567)
        );
    }

    #[test]
    fn malformed_negative_is_rejected() {
        assert!(matches!(
            Target::parse("-abc", ""),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn text_is_handle_without_at() {
        assert_eq!(
            Target::parse("@groupname", "").unwrap(),
            Target::Handle("groupname".into())
        );
        assert_eq!(
            Target::parse("groupname", "").unwrap(),
            Target::Handle("groupname".into())
        );
    }

    #[test]
    fn empty_input_uses_default() {
        assert_eq!(Target::parse("", "3669051362").unwrap(), Target::Id(3669051362));
        assert_eq!(Target::parse("   ", "@chan").unwrap(), Target::Handle("chan".into()));
    }

    #[test]
    fn empty_input_without_default_fails() {
        assert!(Target::parse("", "").is_err());
        assert!(Target::parse("@", "").is_err());
    }

    #[test]
    fn candidate_ids_cover_bot_api_forms() {
        assert_eq!(Target::Id(-1001234).candidate_ids(), vec![-1001234, 1234, 1001234]);
        assert_eq!(Target::Id(-5678).candidate_ids(), vec![-5678, 5678]);
        assert_eq!(Target::Id(99).candidate_ids(), vec![99]);
        assert!(Target::Handle("x".into()).candidate_ids().is_empty());
    }

    #[test]
    fn matches_id_uses_candidates() {
        let target = Target::Id(-1001234);
        assert!(target.matches_id(1234));
        assert!(!target.matches_id(4321));
        assert!(!Target::Handle("abc".into()).matches_id(1));
    }

    #[test]
    fn display_formats() {
        assert_eq!(Target::Id(5).to_string(), "5");
        assert_eq!(Target::Handle("chan".into()).to_string(), "@chan");
    }

    #[test]
    fn invite_hash_from_plus_link() {
        assert_eq!(parse_invite_hash("https://t.me/+AbCdEf123").unwrap(), "AbCdEf123");
        assert_eq!(parse_invite_hash("t.me/+AbC").unwrap(), "AbC");
    }

    #[test]
    fn invite_hash_from_joinchat_link() {
        assert_eq!(
            parse_invite_hash("https://t.me/joinchat/XyZ987/").unwrap(),
            "XyZ987"
        );
    }

    #[test]
    fn invite_hash_ignores_query() {
        assert_eq!(parse_invite_hash("https://t.me/+Hash?start=1").unwrap(), "Hash");
    }

    #[test]
    fn bare_hash_is_returned() {
        assert_eq!(parse_invite_hash("  +RawHash ").unwrap(), "RawHash");
        assert_eq!(parse_invite_hash("RawHash").unwrap(), "RawHash");
    }

    #[test]
    fn empty_invite_is_rejected() {
        assert!(matches!(parse_invite_hash(""), Err(Error::InvalidInvite(_))));
        assert!(matches!(
            parse_invite_hash("https://t.me/joinchat/"),
            Err(Error::InvalidInvite(_))
        ));
    }
}
