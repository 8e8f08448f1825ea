use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Match, MatchInsert, MatchPair, PrincipalId, Swipe, SwipeAction};

/// Errors raised by storage adapters
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Unit of work aborted: {0}")]
    Aborted(String),

    #[error("Corrupt row: {0}")]
    CorruptRow(String),
}

impl StoreError {
    /// True when the store could not be reached at all, as opposed to a unit of work
    /// that ran and failed.
    pub fn is_unavailable(&self) -> bool {
        match self {
            StoreError::Unavailable(_) => true,
            StoreError::Sqlx(err) => matches!(
                err,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
                    | sqlx::Error::Configuration(_)
            ),
            _ => false,
        }
    }
}

/// Transactional storage for swipes and matches
///
/// `begin` opens a unit of work for one unordered pair. Implementations must
/// serialize units of work on the same pair, so a unit that reads the
/// reciprocal swipe sees every swipe committed before it started.
#[async_trait]
pub trait SwipeStore: Send + Sync {
    type Unit: UnitOfWork;

    /// Open a unit of work scoped to `pair`
    async fn begin(&self, pair: &MatchPair) -> Result<Self::Unit, StoreError>;

    /// Targets `swiper` has already swiped, newest first
    async fn swiped_targets(&self, swiper: &PrincipalId, limit: u32) -> Result<Vec<PrincipalId>, StoreError>;

    /// Matches that include `principal`, newest first
    async fn matches_for(&self, principal: &PrincipalId, limit: u32) -> Result<Vec<Match>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Writes and reads that commit or roll back together
///
/// Dropping a unit without calling `commit` discards everything it did.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Insert the swipe, or overwrite action and timestamp of the existing one
    async fn upsert_swipe(
        &mut self,
        swiper: &PrincipalId,
        target: &PrincipalId,
        action: SwipeAction,
    ) -> Result<Swipe, StoreError>;

    async fn find_swipe(
        &mut self,
        swiper: &PrincipalId,
        target: &PrincipalId,
    ) -> Result<Option<Swipe>, StoreError>;

    /// Create the match for `pair` unless it exists; either way return the stored row
    async fn insert_match(&mut self, pair: &MatchPair) -> Result<MatchInsert, StoreError>;

    async fn commit(self) -> Result<(), StoreError>;

    async fn rollback(self) -> Result<(), StoreError>;
}
