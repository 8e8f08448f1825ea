use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;

use crate::config::DatabaseSettings;
use crate::models::{Match, MatchInsert, MatchPair, PrincipalId, Swipe, SwipeAction};
use crate::services::store::{StoreError, SwipeStore, UnitOfWork};

/// PostgreSQL-backed swipe store
///
/// Swipes and matches live in two tables guarded by unique constraints on
/// `(swiper_id, target_id)` and `(low_id, high_id)`. Each unit of work is a
/// transaction that first takes a transaction-scoped advisory lock on the
/// canonical pair, so the reciprocal lookup of one side always sees the other
/// side's committed swipe.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store from a connection string and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create a new store from settings
    pub async fn from_settings(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        tracing::info!(
            "Connecting to PostgreSQL (max: {}, min: {})",
            settings.max_connections(),
            settings.min_connections()
        );

        Self::new(
            &settings.url,
            settings.max_connections(),
            settings.min_connections(),
            Duration::from_secs(settings.acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(settings.idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    /// Wrap an existing pool without running migrations
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn principal_column(row: &PgRow, column: &str) -> Result<PrincipalId, StoreError> {
    let raw: String = row.try_get(column)?;
    PrincipalId::new(raw).ok_or_else(|| StoreError::CorruptRow(format!("empty {}", column)))
}

fn swipe_from_row(row: &PgRow) -> Result<Swipe, StoreError> {
    let action: String = row.try_get("action")?;
    let action = action
        .parse::<SwipeAction>()
        .map_err(|e| StoreError::CorruptRow(e.to_string()))?;

    Ok(Swipe {
        swiper_id: principal_column(row, "swiper_id")?,
        target_id: principal_column(row, "target_id")?,
        action,
        recorded_at: row.try_get("recorded_at")?,
    })
}

fn match_from_row(row: &PgRow) -> Result<Match, StoreError> {
    Ok(Match {
        low_id: principal_column(row, "low_id")?,
        high_id: principal_column(row, "high_id")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl SwipeStore for PostgresStore {
    type Unit = PgUnitOfWork;

    async fn begin(&self, pair: &MatchPair) -> Result<PgUnitOfWork, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(pair.key())
            .execute(&mut *tx)
            .await?;

        Ok(PgUnitOfWork { tx })
    }

    async fn swiped_targets(&self, swiper: &PrincipalId, limit: u32) -> Result<Vec<PrincipalId>, StoreError> {
        let query = r#"
            SELECT target_id
            FROM swipes
            WHERE swiper_id = $1
            ORDER BY recorded_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(swiper.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        let targets = rows
            .iter()
            .map(|row| principal_column(row, "target_id"))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("User {} has swiped {} profiles", swiper, targets.len());

        Ok(targets)
    }

    async fn matches_for(&self, principal: &PrincipalId, limit: u32) -> Result<Vec<Match>, StoreError> {
        let query = r#"
            SELECT low_id, high_id, created_at
            FROM matches
            WHERE low_id = $1 OR high_id = $1
            ORDER BY created_at DESC
            LIMIT $2
        "#;

        let rows = sqlx::query(query)
            .bind(principal.as_str())
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        rows.iter().map(match_from_row).collect()
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Unit of work over one PostgreSQL transaction
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn upsert_swipe(
        &mut self,
        swiper: &PrincipalId,
        target: &PrincipalId,
        action: SwipeAction,
    ) -> Result<Swipe, StoreError> {
        let query = r#"
            INSERT INTO swipes (swiper_id, target_id, action, recorded_at)
            VALUES ($1, $2, $3, NOW())
            ON CONFLICT (swiper_id, target_id)
            DO UPDATE SET
                action = EXCLUDED.action,
                recorded_at = EXCLUDED.recorded_at
            RETURNING swiper_id, target_id, action, recorded_at
        "#;

        let row = sqlx::query(query)
            .bind(swiper.as_str())
            .bind(target.as_str())
            .bind(action.as_str())
            .fetch_one(&mut *self.tx)
            .await?;

        swipe_from_row(&row)
    }

    async fn find_swipe(
        &mut self,
        swiper: &PrincipalId,
        target: &PrincipalId,
    ) -> Result<Option<Swipe>, StoreError> {
        let query = r#"
            SELECT swiper_id, target_id, action, recorded_at
            FROM swipes
            WHERE swiper_id = $1 AND target_id = $2
        "#;

        let row = sqlx::query(query)
            .bind(swiper.as_str())
            .bind(target.as_str())
            .fetch_optional(&mut *self.tx)
            .await?;

        row.as_ref().map(swipe_from_row).transpose()
    }

    /// Uses INSERT ... ON CONFLICT DO NOTHING; when nothing is returned the
    /// row already existed and is read back.
    async fn insert_match(&mut self, pair: &MatchPair) -> Result<MatchInsert, StoreError> {
        let insert = r#"
            INSERT INTO matches (low_id, high_id, created_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (low_id, high_id) DO NOTHING
            RETURNING low_id, high_id, created_at
        "#;

        let created = sqlx::query(insert)
            .bind(pair.low().as_str())
            .bind(pair.high().as_str())
            .fetch_optional(&mut *self.tx)
            .await?;

        if let Some(row) = created {
            return Ok(MatchInsert::Created(match_from_row(&row)?));
        }

        let select = r#"
            SELECT low_id, high_id, created_at
            FROM matches
            WHERE low_id = $1 AND high_id = $2
        "#;

        let existing = sqlx::query(select)
            .bind(pair.low().as_str())
            .bind(pair.high().as_str())
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| {
                StoreError::Aborted(format!(
                    "match {}/{} conflicted but is not visible",
                    pair.low(),
                    pair.high()
                ))
            })?;

        Ok(MatchInsert::AlreadyExisted(match_from_row(&existing)?))
    }

    async fn commit(self) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}
