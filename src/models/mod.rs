// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{PrincipalId, SwipeAction, Swipe, Match, MatchPair, MatchInsert, SwipeResult, UnknownAction};
pub use requests::{RecordSwipeRequest, ListQuery};
pub use responses::{HealthResponse, ErrorResponse, SwipeResponse, SeenProfilesResponse, MatchSummary, MatchesResponse};
