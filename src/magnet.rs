//! Magnet URI construction.

use crate::error::Error;
use std::fmt;
use std::str::FromStr;

/// Public UDP trackers appended to every magnet link unless configured otherwise.
pub const DEFAULT_TRACKERS: [&str; 8] = [
    "udp://open.demonii.com:1337/announce",
    "udp://tracker.openbittorrent.com:80",
    "udp://tracker.coppersurfer.tk:6969",
    "udp://glotorrents.pw:6969/announce",
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://torrent.gresille.org:80/announce",
    "udp://p4p.arenabg.com:1337",
    "udp://tracker.leechers-paradise.org:6969",
];

const MAGNET_PREFIX: &str = "magnet:?xt=urn:btih:";

/// A 40-character hex BitTorrent info hash, kept exactly as the provider spelled it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoHash(String);

impl InfoHash {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for InfoHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() == 40 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(s.to_string()))
        } else {
            Err(Error::InvalidHash(s.to_string()))
        }
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `magnet:?xt=urn:btih:<hash>&tr=<tracker>...`
///
/// Trackers are appended verbatim and in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagnetLink(String);

impl MagnetLink {
    pub fn new<S: AsRef<str>>(hash: &InfoHash, trackers: &[S]) -> Self {
        let mut uri = format!("{}{}", MAGNET_PREFIX, hash);
        for tracker in trackers {
            uri.push_str("&tr=");
            uri.push_str(tracker.as_ref());
        }
        Self(uri)
    }

    /// Validate `hash` and build the link in one step.
    pub fn from_hash<S: AsRef<str>>(hash: &str, trackers: &[S]) -> crate::Result<Self> {
        Ok(Self::new(&hash.parse()?, trackers))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MagnetLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "ABCDEF0123456789ABCDEF0123456789ABCDEF01";

    #[test]
    fn test_magnet_starts_with_hash() {
        let magnet = MagnetLink::from_hash(HASH, &DEFAULT_TRACKERS).unwrap();
        assert!(
            magnet
                .as_str()
                .starts_with(&format!("magnet:?xt=urn:btih:{HASH}"))
        );
    }

    #[test]
    fn test_magnet_lists_trackers_in_order() {
        let magnet = MagnetLink::from_hash(HASH, &DEFAULT_TRACKERS).unwrap();
        let segments: Vec<&str> = magnet.as_str().split("&tr=").skip(1).collect();

        assert_eq!(magnet.as_str().matches("&tr=").count(), 8);
        assert_eq!(segments, DEFAULT_TRACKERS);
    }

    #[test]
    fn test_magnet_is_deterministic() {
        let first = MagnetLink::from_hash(HASH, &DEFAULT_TRACKERS).unwrap();
        let second = MagnetLink::from_hash(HASH, &DEFAULT_TRACKERS).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.to_string(), second.to_string());
    }

    #[test]
    fn test_magnet_without_trackers() {
        let magnet = MagnetLink::from_hash(HASH, &[] as &[&str]).unwrap();
        assert_eq!(magnet.as_str(), format!("magnet:?xt=urn:btih:{HASH}"));
    }

    #[test]
    fn test_custom_trackers() {
        let trackers = vec!["udp://a:1".to_string(), "udp://b:2".to_string()];
        let magnet = MagnetLink::from_hash(&HASH.to_lowercase(), &trackers).unwrap();
        assert!(magnet.as_str().ends_with("&tr=udp://a:1&tr=udp://b:2"));
    }

    #[test]
    fn test_invalid_hashes() {
        for hash in [
            "",
            "ABCDEF",
            "ZBCDEF0123456789ABCDEF0123456789ABCDEF01",
            "ABCDEF0123456789ABCDEF0123456789ABCDEF012",
        ] {
            assert!(matches!(
                MagnetLink::from_hash(hash, &DEFAULT_TRACKERS),
                Err(Error::InvalidHash(h)) if h == hash
            ));
        }
    }
}
