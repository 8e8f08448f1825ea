use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to record a swipe
///
/// Fields are optional at the wire level so that a missing field surfaces as
/// a `missing_fields` rejection instead of a generic JSON error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RecordSwipeRequest {
    #[validate(required, length(min = 1))]
    #[serde(alias = "targetUserId")]
    pub target_user_id: Option<String>,
    #[validate(required, length(min = 1))]
    pub action: Option<String>,
}

impl RecordSwipeRequest {
    pub fn new(target_user_id: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            target_user_id: Some(target_user_id.into()),
            action: Some(action.into()),
        }
    }
}

/// Paging for list endpoints
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = 200))]
    pub limit: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { limit: default_limit() }
    }
}

fn default_limit() -> u32 {
    50
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_fail_validation() {
        let req: RecordSwipeRequest = serde_json::from_str(r#"{"action":"like"}"#).unwrap();
        assert!(req.validate().is_err());

        let req: RecordSwipeRequest =
            serde_json::from_str(r#"{"target_user_id":"","action":"like"}"#).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_camel_case_alias() {
        let req: RecordSwipeRequest =
            serde_json::from_str(r#"{"targetUserId":"u2","action":"pass"}"#).unwrap();
        assert_eq!(req.target_user_id.as_deref(), Some("u2"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_list_query_bounds() {
        assert!(ListQuery { limit: 0 }.validate().is_err());
        assert!(ListQuery { limit: 500 }.validate().is_err());
        assert!(ListQuery::default().validate().is_ok());
    }
}
