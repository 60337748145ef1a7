use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, types::Json, FromRow, PgPool, Postgres, Transaction};
use std::time::Duration;

use super::{MatchFilter, MatchStore, SortOrder};
use crate::model::{MatchId, MatchModel, NewMatch};

#[derive(Debug, FromRow)]
struct MatchRow {
    id: MatchId,
    player1: Option<String>,
    player2: Option<String>,
    winner: String,
    loser: String,
    session_id: Option<String>,
    match_time: Option<Json<Value>>,
    created_at: Option<DateTime<Utc>>,
}

impl From<MatchRow> for MatchModel {
    fn from(row: MatchRow) -> Self {
        Self {
            id: row.id,
            player1: row.player1,
            player2: row.player2,
            winner: row.winner,
            loser: row.loser,
            session_id: row.session_id,
            match_time: row.match_time.map(|Json(v)| v),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgMatchStore {
    db: PgPool,
}

impl PgMatchStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Open a pool and bring the schema up to date.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(|e| anyhow!("Unable to connect to database: {}", e))?;

        sqlx::migrate!("./migrations")
            .run(&db)
            .await
            .map_err(|e| anyhow!("Unable to run migrations: {}", e))?;

        Ok(Self::new(db))
    }
}

const SELECT_MATCHES: &str = r#"
    SELECT id, player1, player2, winner, loser, session_id, match_time, created_at
    FROM matches
    WHERE ($1::text IS NULL OR session_id = $1)
"#;

async fn insert_row<'c, E>(executor: E, id: &MatchId, record: &NewMatch) -> Result<()>
where
    E: sqlx::Executor<'c, Database = Postgres>,
{
    sqlx::query(
        r#"
        INSERT INTO matches (id, player1, player2, winner, loser, session_id, match_time, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(id)
    .bind(&record.player1)
    .bind(&record.player2)
    .bind(&record.winner)
    .bind(&record.loser)
    .bind(&record.session_id)
    .bind(Json(&record.match_time))
    .bind(record.created_at)
    .execute(executor)
    .await
    .map_err(|e| anyhow!("Unable to insert match into db: {}", e))?;

    Ok(())
}

async fn session_exists(tx: &mut Transaction<'_, Postgres>, session_id: &str) -> Result<bool> {
    // Serialises concurrent submissions for the same session until commit.
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
        .bind(session_id)
        .execute(&mut **tx)
        .await
        .map_err(|e| anyhow!("Unable to lock session: {}", e))?;

    let exists: bool =
        sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM matches WHERE session_id = $1)"#)
            .bind(session_id)
            .fetch_one(&mut **tx)
            .await
            .map_err(|e| anyhow!("Unable to query model from db: {}", e))?;

    Ok(exists)
}

#[async_trait]
impl MatchStore for PgMatchStore {
    async fn query(
        &self,
        filter: &MatchFilter,
        order: Option<SortOrder>,
    ) -> Result<Vec<MatchModel>> {
        let sql = match order {
            Some(SortOrder::CreatedAtDesc) => {
                format!("{SELECT_MATCHES} ORDER BY created_at DESC NULLS LAST")
            }
            None => SELECT_MATCHES.to_string(),
        };

        let rows: Vec<MatchRow> = sqlx::query_as(&sql)
            .bind(filter.session_id.as_deref())
            .fetch_all(&self.db)
            .await
            .map_err(|e| anyhow!("Unable to query model from db: {}", e))?;

        Ok(rows.into_iter().map(MatchModel::from).collect())
    }

    async fn insert(&self, record: NewMatch) -> Result<MatchId> {
        let id = MatchId::generate();
        insert_row(&self.db, &id, &record).await?;
        Ok(id)
    }

    async fn insert_if_session_absent(&self, record: NewMatch) -> Result<Option<MatchId>> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(|e| anyhow!("Unable to start transaction: {}", e))?;

        if session_exists(&mut tx, &record.session_id).await? {
            tx.rollback()
                .await
                .map_err(|e| anyhow!("Unable to roll back transaction: {}", e))?;
            return Ok(None);
        }

        let id = MatchId::generate();
        insert_row(&mut *tx, &id, &record).await?;
        tx.commit()
            .await
            .map_err(|e| anyhow!("Unable to commit transaction: {}", e))?;

        Ok(Some(id))
    }
}
