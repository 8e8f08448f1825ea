use validator::Validate;

use crate::error::InvalidReason;
use crate::models::{PrincipalId, RecordSwipeRequest, SwipeAction};

/// A swipe request that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeCommand {
    pub target: PrincipalId,
    pub action: SwipeAction,
}

impl SwipeCommand {
    /// Validate a raw request on behalf of `actor`
    ///
    /// Checks run in order: required fields, action value, self-target.
    pub fn parse(actor: &PrincipalId, request: &RecordSwipeRequest) -> Result<Self, InvalidReason> {
        if request.validate().is_err() {
            return Err(InvalidReason::MissingFields);
        }

        let target = request
            .target_user_id
            .as_deref()
            .and_then(PrincipalId::new)
            .ok_or(InvalidReason::MissingFields)?;

        let action = request
            .action
            .as_deref()
            .ok_or(InvalidReason::MissingFields)?
            .parse::<SwipeAction>()
            .map_err(|_| InvalidReason::InvalidAction)?;

        if &target == actor {
            return Err(InvalidReason::CannotSwipeSelf);
        }

        Ok(Self { target, action })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor() -> PrincipalId {
        PrincipalId::new("me").unwrap()
    }

    #[test]
    fn test_valid_request() {
        let cmd = SwipeCommand::parse(&actor(), &RecordSwipeRequest::new("you", "like")).unwrap();
        assert_eq!(cmd.target.as_str(), "you");
        assert_eq!(cmd.action, SwipeAction::Like);
    }

    #[test]
    fn test_missing_target() {
        let req = RecordSwipeRequest {
            target_user_id: None,
            action: Some("like".to_string()),
        };
        assert_eq!(SwipeCommand::parse(&actor(), &req), Err(InvalidReason::MissingFields));
    }

    #[test]
    fn test_blank_target() {
        let req = RecordSwipeRequest::new("  ", "like");
        assert_eq!(SwipeCommand::parse(&actor(), &req), Err(InvalidReason::MissingFields));
    }

    #[test]
    fn test_missing_action() {
        let req = RecordSwipeRequest {
            target_user_id: Some("you".to_string()),
            action: None,
        };
        assert_eq!(SwipeCommand::parse(&actor(), &req), Err(InvalidReason::MissingFields));
    }

    #[test]
    fn test_unknown_action() {
        let req = RecordSwipeRequest::new("you", "superlike");
        assert_eq!(SwipeCommand::parse(&actor(), &req), Err(InvalidReason::InvalidAction));
    }

    #[test]
    fn test_self_target() {
        let req = RecordSwipeRequest::new("me", "pass");
        assert_eq!(SwipeCommand::parse(&actor(), &req), Err(InvalidReason::CannotSwipeSelf));
    }

    #[test]
    fn test_invalid_action_checked_before_self() {
        let req = RecordSwipeRequest::new("me", "nope");
        assert_eq!(SwipeCommand::parse(&actor(), &req), Err(InvalidReason::InvalidAction));
    }
}
