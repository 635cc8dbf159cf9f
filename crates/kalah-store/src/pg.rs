use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio_postgres::binary_copy::BinaryCopyInWriter;
use tokio_postgres::types::Type;
use tokio_postgres::Client;

use kalah_core::{Fingerprint, SolveError, SolveResult};

use crate::record::PositionRecord;
use crate::schema::{Positions, Schema, POSITIONS};
use crate::store::Store;

const STAGING: &str = "positions_staging";
const RETRY_ATTEMPTS: usize = 3;
const RETRY_BASE_DELAY: Duration = Duration::from_millis(50);

/// PostgreSQL-backed [`Store`]: bulk writes go through the binary `COPY`
/// protocol into a staging table, then an `INSERT ... ON CONFLICT DO
/// NOTHING` folds the staged rows into `positions`; point reads/writes use
/// prepared statements.
pub struct PgStore {
    client: Arc<Client>,
}

impl PgStore {
    pub async fn connect() -> SolveResult<Self> {
        let db_url = std::env::var("DB_URL")
            .map_err(|_| SolveError::Precondition("DB_URL is not set".into()))?;
        let (client, connection) = tokio_postgres::connect(&db_url, tokio_postgres::NoTls)
            .await
            .map_err(|e| SolveError::StoreTransient(e.to_string()))?;
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                log::error!("postgres connection closed: {e}");
            }
        });
        client
            .execute("SET client_min_messages TO WARNING", &[])
            .await
            .map_err(|e| SolveError::StoreTransient(e.to_string()))?;
        Ok(Self {
            client: Arc::new(client),
        })
    }

    pub async fn ensure_schema(&self) -> SolveResult<()> {
        self.client
            .batch_execute(Positions::creates())
            .await
            .map_err(|e| SolveError::StorePermanent(e.to_string()))?;
        self.client
            .batch_execute(Positions::indices())
            .await
            .map_err(|e| SolveError::StorePermanent(e.to_string()))?;
        let staging = format!(
            "CREATE UNLOGGED TABLE IF NOT EXISTS {STAGING} (
                fingerprint  BIGINT,
                packed_cells BYTEA,
                depth        SMALLINT,
                seed_level   SMALLINT
            );"
        );
        self.client
            .batch_execute(&staging)
            .await
            .map_err(|e| SolveError::StorePermanent(e.to_string()))?;
        Ok(())
    }
}

/// Retries a fallible Postgres operation up to [`RETRY_ATTEMPTS`] times with
/// a short linear backoff, escalating to `SolveError::StoreTransient` once
/// exhausted. Errors carrying no SQLSTATE code (connection/I/O failures)
/// are the retryable class; errors with a code (constraint violations,
/// malformed statements) are permanent and returned immediately.
async fn retry<F, Fut, T>(op: F) -> SolveResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, tokio_postgres::Error>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.code().is_none() && attempt + 1 < RETRY_ATTEMPTS => {
                log::warn!("transient store error on attempt {attempt}: {e}");
                tokio::time::sleep(RETRY_BASE_DELAY * (attempt as u32 + 1)).await;
                attempt += 1;
            }
            Err(e) if e.code().is_none() => {
                return Err(SolveError::StoreTransient(e.to_string()));
            }
            Err(e) => return Err(SolveError::StorePermanent(e.to_string())),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_batch(&self, records: Vec<PositionRecord>) -> SolveResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.client
            .batch_execute(&format!("TRUNCATE {STAGING};"))
            .await
            .map_err(|e| SolveError::StoreTransient(e.to_string()))?;

        let copy_sql = format!(
            "COPY {STAGING} (fingerprint, packed_cells, depth, seed_level) FROM STDIN BINARY"
        );
        let sink = self
            .client
            .copy_in(&copy_sql)
            .await
            .map_err(|e| SolveError::StoreTransient(e.to_string()))?;
        let types = [Type::INT8, Type::BYTEA, Type::INT2, Type::INT2];
        let writer = BinaryCopyInWriter::new(sink, &types);
        let mut writer = pin!(writer);
        for record in &records {
            writer
                .as_mut()
                .write(&[
                    &record.fingerprint,
                    &record.packed_cells,
                    &record.depth,
                    &record.seed_level,
                ])
                .await
                .map_err(|e| SolveError::StoreTransient(e.to_string()))?;
        }
        writer
            .finish()
            .await
            .map_err(|e| SolveError::StoreTransient(e.to_string()))?;

        let inserted = retry(|| async {
            self.client
                .execute(
                    &format!(
                        "INSERT INTO {POSITIONS} (fingerprint, packed_cells, depth, seed_level)
                         SELECT fingerprint, packed_cells, depth, seed_level FROM {STAGING}
                         ON CONFLICT (fingerprint) DO NOTHING"
                    ),
                    &[],
                )
                .await
        })
        .await?;
        Ok(inserted as usize)
    }

    async fn exists(&self, fingerprint: Fingerprint) -> SolveResult<bool> {
        let row = retry(|| async {
            self.client
                .query_opt(
                    &format!("SELECT 1 FROM {POSITIONS} WHERE fingerprint = $1"),
                    &[&fingerprint],
                )
                .await
        })
        .await?;
        Ok(row.is_some())
    }

    async fn get(&self, fingerprint: Fingerprint) -> SolveResult<Option<PositionRecord>> {
        let row = retry(|| async {
            self.client
                .query_opt(
                    &format!(
                        "SELECT fingerprint, packed_cells, depth, seed_level, score, best_move
                         FROM {POSITIONS} WHERE fingerprint = $1"
                    ),
                    &[&fingerprint],
                )
                .await
        })
        .await?;
        Ok(row.map(|row| PositionRecord {
            fingerprint: row.get(0),
            packed_cells: row.get(1),
            depth: row.get(2),
            seed_level: row.get(3),
            score: row.get(4),
            best_move: row.get(5),
        }))
    }

    async fn scan_by_depth(
        &self,
        depth: i16,
        offset: i64,
        limit: i64,
    ) -> SolveResult<Vec<PositionRecord>> {
        let rows = retry(|| async {
            self.client
                .query(
                    &format!(
                        "SELECT fingerprint, packed_cells, depth, seed_level, score, best_move
                         FROM {POSITIONS} WHERE depth = $1
                         ORDER BY fingerprint OFFSET $2 LIMIT $3"
                    ),
                    &[&depth, &offset, &limit],
                )
                .await
        })
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| PositionRecord {
                fingerprint: row.get(0),
                packed_cells: row.get(1),
                depth: row.get(2),
                seed_level: row.get(3),
                score: row.get(4),
                best_move: row.get(5),
            })
            .collect())
    }

    async fn scan_unsolved_by_level(
        &self,
        seed_level: i16,
        offset: i64,
        limit: i64,
    ) -> SolveResult<Vec<PositionRecord>> {
        let rows = retry(|| async {
            self.client
                .query(
                    &format!(
                        "SELECT fingerprint, packed_cells, depth, seed_level, score, best_move
                         FROM {POSITIONS} WHERE seed_level = $1 AND score IS NULL
                         ORDER BY fingerprint OFFSET $2 LIMIT $3"
                    ),
                    &[&seed_level, &offset, &limit],
                )
                .await
        })
        .await?;
        Ok(rows
            .into_iter()
            .map(|row| PositionRecord {
                fingerprint: row.get(0),
                packed_cells: row.get(1),
                depth: row.get(2),
                seed_level: row.get(3),
                score: row.get(4),
                best_move: row.get(5),
            })
            .collect())
    }

    async fn count_by_depth(&self, depth: i16) -> SolveResult<i64> {
        let row = retry(|| async {
            self.client
                .query_one(
                    &format!("SELECT count(*) FROM {POSITIONS} WHERE depth = $1"),
                    &[&depth],
                )
                .await
        })
        .await?;
        Ok(row.get(0))
    }

    async fn count_unsolved_by_level(&self, seed_level: i16) -> SolveResult<i64> {
        let row = retry(|| async {
            self.client
                .query_one(
                    &format!(
                        "SELECT count(*) FROM {POSITIONS} WHERE seed_level = $1 AND score IS NULL"
                    ),
                    &[&seed_level],
                )
                .await
        })
        .await?;
        Ok(row.get(0))
    }

    async fn update_score(
        &self,
        fingerprint: Fingerprint,
        score: i16,
        best_move: Option<i16>,
    ) -> SolveResult<()> {
        retry(|| async {
            self.client
                .execute(
                    &format!(
                        "UPDATE {POSITIONS} SET score = $2, best_move = $3 WHERE fingerprint = $1"
                    ),
                    &[&fingerprint, &score, &best_move],
                )
                .await
        })
        .await?;
        Ok(())
    }

    async fn flush(&self) -> SolveResult<()> {
        Ok(())
    }

    /// Physically reorders the table around its seed_level index so
    /// retrograde's ascending-level scans hit fewer distinct heap pages.
    /// Advisory only: a failure here does not invalidate anything already
    /// written, so it is logged and swallowed rather than escalated.
    async fn reorganize_by_seed_level(&self) -> SolveResult<()> {
        let sql = format!("CLUSTER {POSITIONS} USING {}", Positions::seed_level_index_name());
        if let Err(e) = self.client.batch_execute(&sql).await {
            log::warn!("advisory CLUSTER by seed_level failed, continuing unclustered: {e}");
        }
        Ok(())
    }
}
