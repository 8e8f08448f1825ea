use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::{Match, MatchInsert, MatchPair, PrincipalId, Swipe, SwipeAction};
use crate::services::store::{StoreError, SwipeStore, UnitOfWork};

/// Step at which the next unit of work should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FailPoint {
    Begin = 1,
    UpsertSwipe = 2,
    FindSwipe = 3,
    InsertMatch = 4,
    Commit = 5,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    swipes: HashMap<(PrincipalId, PrincipalId), Swipe>,
    matches: HashMap<MatchPair, Match>,
}

/// In-process store with the same atomicity contract as PostgreSQL
///
/// A unit of work holds the store lock for its whole lifetime and keeps its own
/// writes in an overlay, which is merged into the live state only on commit.
/// That serializes all units, which is stricter than the per-pair isolation the
/// port asks for.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    fail_point: Arc<AtomicU8>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next unit of work reaching `point` fail with a transaction error
    pub fn fail_next(&self, point: FailPoint) {
        self.fail_point.store(point as u8, Ordering::SeqCst);
    }

    pub async fn swipe(&self, swiper: &PrincipalId, target: &PrincipalId) -> Option<Swipe> {
        let state = self.state.lock().await;
        state.swipes.get(&(swiper.clone(), target.clone())).cloned()
    }

    pub async fn match_for(&self, pair: &MatchPair) -> Option<Match> {
        self.state.lock().await.matches.get(pair).cloned()
    }

    pub async fn swipe_count(&self) -> usize {
        self.state.lock().await.swipes.len()
    }

    pub async fn match_count(&self) -> usize {
        self.state.lock().await.matches.len()
    }
}

fn trip(fail_point: &AtomicU8, point: FailPoint) -> Result<(), StoreError> {
    let armed = fail_point
        .compare_exchange(point as u8, 0, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok();
    if !armed {
        return Ok(());
    }
    match point {
        FailPoint::Begin => Err(StoreError::Unavailable("injected failure at begin".to_string())),
        other => Err(StoreError::Aborted(format!("injected failure at {:?}", other))),
    }
}

#[async_trait]
impl SwipeStore for MemoryStore {
    type Unit = MemoryUnit;

    async fn begin(&self, _pair: &MatchPair) -> Result<MemoryUnit, StoreError> {
        trip(&self.fail_point, FailPoint::Begin)?;
        let guard = self.state.clone().lock_owned().await;
        Ok(MemoryUnit {
            guard,
            staged: MemoryState::default(),
            fail_point: self.fail_point.clone(),
        })
    }

    async fn swiped_targets(&self, swiper: &PrincipalId, limit: u32) -> Result<Vec<PrincipalId>, StoreError> {
        let state = self.state.lock().await;
        let mut swipes: Vec<&Swipe> = state
            .swipes
            .values()
            .filter(|s| &s.swiper_id == swiper)
            .collect();
        swipes.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(swipes
            .into_iter()
            .take(limit as usize)
            .map(|s| s.target_id.clone())
            .collect())
    }

    async fn matches_for(&self, principal: &PrincipalId, limit: u32) -> Result<Vec<Match>, StoreError> {
        let state = self.state.lock().await;
        let mut matches: Vec<Match> = state
            .matches
            .values()
            .filter(|m| m.involves(principal))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matches.truncate(limit as usize);
        Ok(matches)
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Unit of work over [`MemoryStore`]
pub struct MemoryUnit {
    guard: OwnedMutexGuard<MemoryState>,
    // Writes of this unit only; reads fall through to `guard`
    staged: MemoryState,
    fail_point: Arc<AtomicU8>,
}

#[async_trait]
impl UnitOfWork for MemoryUnit {
    async fn upsert_swipe(
        &mut self,
        swiper: &PrincipalId,
        target: &PrincipalId,
        action: SwipeAction,
    ) -> Result<Swipe, StoreError> {
        trip(&self.fail_point, FailPoint::UpsertSwipe)?;
        let swipe = Swipe {
            swiper_id: swiper.clone(),
            target_id: target.clone(),
            action,
            recorded_at: chrono::Utc::now(),
        };
        self.staged
            .swipes
            .insert((swiper.clone(), target.clone()), swipe.clone());
        Ok(swipe)
    }

    async fn find_swipe(
        &mut self,
        swiper: &PrincipalId,
        target: &PrincipalId,
    ) -> Result<Option<Swipe>, StoreError> {
        trip(&self.fail_point, FailPoint::FindSwipe)?;
        let key = (swiper.clone(), target.clone());
        Ok(self
            .staged
            .swipes
            .get(&key)
            .or_else(|| self.guard.swipes.get(&key))
            .cloned())
    }

    async fn insert_match(&mut self, pair: &MatchPair) -> Result<MatchInsert, StoreError> {
        trip(&self.fail_point, FailPoint::InsertMatch)?;
        let existing = self
            .staged
            .matches
            .get(pair)
            .or_else(|| self.guard.matches.get(pair));
        if let Some(existing) = existing {
            return Ok(MatchInsert::AlreadyExisted(existing.clone()));
        }
        let created = Match {
            low_id: pair.low().clone(),
            high_id: pair.high().clone(),
            created_at: chrono::Utc::now(),
        };
        self.staged.matches.insert(pair.clone(), created.clone());
        Ok(MatchInsert::Created(created))
    }

    async fn commit(self) -> Result<(), StoreError> {
        trip(&self.fail_point, FailPoint::Commit)?;
        let MemoryUnit { mut guard, staged, .. } = self;
        guard.swipes.extend(staged.swipes);
        guard.matches.extend(staged.matches);
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        Ok(())
    }
}
