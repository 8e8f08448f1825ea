use tracing::Instrument;

use crate::core::validate::SwipeCommand;
use crate::error::{InvalidReason, SwipeError};
use crate::models::{Match, MatchPair, PrincipalId, RecordSwipeRequest, SwipeAction, SwipeResult};
use crate::services::{StoreError, SwipeStore, UnitOfWork};

/// Records swipes and turns reciprocal likes into matches
///
/// Every call is one unit of work against the store: upsert the swipe, check
/// for a reciprocal like, create the match conflict-tolerantly, commit. The
/// engine keeps no state of its own between calls.
#[derive(Debug, Clone)]
pub struct SwipeEngine<S> {
    store: S,
}

impl<S: SwipeStore> SwipeEngine<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Validate a raw request from `actor` and record it
    pub async fn record_swipe(
        &self,
        actor: &PrincipalId,
        request: &RecordSwipeRequest,
    ) -> Result<SwipeResult, SwipeError> {
        let command = SwipeCommand::parse(actor, request)?;
        self.record(actor, &command.target, command.action).await
    }

    /// Record a swipe from already validated parts
    ///
    /// All-or-nothing: if any step fails the swipe is not recorded and the
    /// identical call may be retried.
    pub async fn record(
        &self,
        actor: &PrincipalId,
        target: &PrincipalId,
        action: SwipeAction,
    ) -> Result<SwipeResult, SwipeError> {
        let pair = MatchPair::new(actor, target).ok_or(InvalidReason::CannotSwipeSelf)?;

        let span = tracing::info_span!(
            "record_swipe",
            request_id = %uuid::Uuid::new_v4(),
            actor = %actor,
            target = %target,
            action = %action,
        );

        async move {
            let mut unit = self.store.begin(&pair).await.map_err(|e| {
                tracing::error!("Failed to begin unit of work: {}", e);
                SwipeError::from(e)
            })?;

            match apply(&mut unit, actor, target, action, &pair).await {
                Ok(result) => {
                    unit.commit().await.map_err(|e| {
                        tracing::error!("Failed to commit swipe: {}", e);
                        SwipeError::from(e)
                    })?;

                    if result.match_created {
                        tracing::info!("New match between {} and {}", pair.low(), pair.high());
                    } else {
                        tracing::debug!("Recorded swipe (mutual: {})", result.is_mutual);
                    }
                    Ok(result)
                }
                Err(e) => {
                    tracing::error!("Swipe failed, rolling back: {}", e);
                    if let Err(rollback_err) = unit.rollback().await {
                        tracing::warn!("Rollback failed: {}", rollback_err);
                    }
                    Err(SwipeError::from(e))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Targets `actor` has already swiped, for discovery to exclude
    pub async fn swiped_targets(&self, actor: &PrincipalId, limit: u32) -> Result<Vec<PrincipalId>, SwipeError> {
        Ok(self.store.swiped_targets(actor, limit).await?)
    }

    pub async fn matches_for(&self, principal: &PrincipalId, limit: u32) -> Result<Vec<Match>, SwipeError> {
        Ok(self.store.matches_for(principal, limit).await?)
    }

    pub async fn health_check(&self) -> bool {
        match self.store.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                tracing::warn!("Storage health check failed: {}", e);
                false
            }
        }
    }
}

async fn apply<U: UnitOfWork>(
    unit: &mut U,
    actor: &PrincipalId,
    target: &PrincipalId,
    action: SwipeAction,
    pair: &MatchPair,
) -> Result<SwipeResult, StoreError> {
    let swipe = unit.upsert_swipe(actor, target, action).await?;

    let one_sided = SwipeResult {
        swipe,
        is_mutual: false,
        match_record: None,
        match_created: false,
    };

    if !action.is_like() {
        return Ok(one_sided);
    }

    let reciprocal = unit.find_swipe(target, actor).await?;
    if !reciprocal.is_some_and(|s| s.action.is_like()) {
        return Ok(one_sided);
    }

    let insert = unit.insert_match(pair).await?;
    let match_created = insert.was_created();

    Ok(SwipeResult {
        is_mutual: true,
        match_record: Some(insert.into_match()),
        match_created,
        ..one_sided
    })
}
