use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque identifier of an authenticated user
///
/// Principals are totally ordered by byte-wise comparison of their string
/// form, which is what makes the (low, high) layout of a match deterministic.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Wrap a raw identifier. Returns `None` for an empty or blank string.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction-carrying decision one user makes about another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Pass,
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Pass => "pass",
        }
    }

    pub fn is_like(&self) -> bool {
        matches!(self, SwipeAction::Like)
    }
}

impl FromStr for SwipeAction {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "like" => Ok(SwipeAction::Like),
            "pass" => Ok(SwipeAction::Pass),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

impl fmt::Display for SwipeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when an action string is neither `like` nor `pass`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown swipe action: {0}")]
pub struct UnknownAction(pub String);

/// A recorded swipe, at most one per ordered (swiper, target) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swipe {
    pub swiper_id: PrincipalId,
    pub target_id: PrincipalId,
    pub action: SwipeAction,
    pub recorded_at: chrono::DateTime<chrono::Utc>,
}

/// Unordered pair of distinct principals in canonical (low, high) order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MatchPair {
    low: PrincipalId,
    high: PrincipalId,
}

impl MatchPair {
    /// Build the canonical pair. Returns `None` when both sides are the same principal.
    pub fn new(a: &PrincipalId, b: &PrincipalId) -> Option<Self> {
        match a.cmp(b) {
            std::cmp::Ordering::Less => Some(Self { low: a.clone(), high: b.clone() }),
            std::cmp::Ordering::Greater => Some(Self { low: b.clone(), high: a.clone() }),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn low(&self) -> &PrincipalId {
        &self.low
    }

    pub fn high(&self) -> &PrincipalId {
        &self.high
    }

    /// Stable string key for the pair, used for storage-side locking
    pub fn key(&self) -> String {
        format!("{}\u{1f}{}", self.low, self.high)
    }
}

/// Canonical record that two principals liked each other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub low_id: PrincipalId,
    pub high_id: PrincipalId,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Match {
    pub fn involves(&self, principal: &PrincipalId) -> bool {
        &self.low_id == principal || &self.high_id == principal
    }

    /// The other side of the match, if `principal` is part of it
    pub fn partner_of(&self, principal: &PrincipalId) -> Option<&PrincipalId> {
        if &self.low_id == principal {
            Some(&self.high_id)
        } else if &self.high_id == principal {
            Some(&self.low_id)
        } else {
            None
        }
    }
}

/// Outcome of a conflict-tolerant match insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchInsert {
    Created(Match),
    AlreadyExisted(Match),
}

impl MatchInsert {
    pub fn was_created(&self) -> bool {
        matches!(self, MatchInsert::Created(_))
    }

    pub fn into_match(self) -> Match {
        match self {
            MatchInsert::Created(m) | MatchInsert::AlreadyExisted(m) => m,
        }
    }
}

/// Result of recording a swipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwipeResult {
    pub swipe: Swipe,
    pub is_mutual: bool,
    #[serde(rename = "match")]
    pub match_record: Option<Match>,
    /// Whether this call created the match row (false if it already existed)
    pub match_created: bool,
}
