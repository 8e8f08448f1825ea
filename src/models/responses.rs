use serde::{Deserialize, Serialize};
use crate::models::domain::{Match, PrincipalId, SwipeResult};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

/// Record swipe response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwipeResponse {
    pub ok: bool,
    #[serde(flatten)]
    pub result: SwipeResult,
}

/// Targets the caller has already swiped
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeenProfilesResponse {
    #[serde(rename = "userId")]
    pub user_id: PrincipalId,
    #[serde(rename = "seenProfiles")]
    pub seen_profiles: Vec<PrincipalId>,
    pub count: usize,
}

/// A match seen from one side, with the other principal spelled out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchSummary {
    #[serde(rename = "partnerId")]
    pub partner_id: PrincipalId,
    #[serde(flatten)]
    pub match_record: Match,
}

impl MatchSummary {
    /// Returns `None` if `viewer` is not part of the match
    pub fn for_viewer(viewer: &PrincipalId, match_record: Match) -> Option<Self> {
        let partner_id = match_record.partner_of(viewer)?.clone();
        Some(Self { partner_id, match_record })
    }
}

/// Matches the caller is part of
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchesResponse {
    #[serde(rename = "userId")]
    pub user_id: PrincipalId,
    pub matches: Vec<MatchSummary>,
    pub count: usize,
}
