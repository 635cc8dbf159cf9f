use async_trait::async_trait;
use kalah_core::{Fingerprint, SolveResult};

use crate::record::PositionRecord;

/// The position store's capability set. Implemented by [`crate::PgStore`]
/// (real solve runs) and [`crate::MemoryStore`] (tests, small boards).
///
/// `insert_batch` deduplicates on fingerprint: re-inserting an already-
/// stored position is a no-op, not an error, so the BFS driver never has to
/// pre-filter a chunk before writing it.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts records not already present (by fingerprint). Returns the
    /// number of records actually inserted.
    async fn insert_batch(&self, records: Vec<PositionRecord>) -> SolveResult<usize>;

    async fn exists(&self, fingerprint: Fingerprint) -> SolveResult<bool>;

    async fn get(&self, fingerprint: Fingerprint) -> SolveResult<Option<PositionRecord>>;

    /// Positions at exactly `depth`, in an arbitrary but stable order,
    /// starting at `offset` and returning at most `limit`.
    async fn scan_by_depth(
        &self,
        depth: i16,
        offset: i64,
        limit: i64,
    ) -> SolveResult<Vec<PositionRecord>>;

    /// Positions at exactly `seed_level` with `score IS NULL`.
    async fn scan_unsolved_by_level(
        &self,
        seed_level: i16,
        offset: i64,
        limit: i64,
    ) -> SolveResult<Vec<PositionRecord>>;

    async fn count_by_depth(&self, depth: i16) -> SolveResult<i64>;

    async fn count_unsolved_by_level(&self, seed_level: i16) -> SolveResult<i64>;

    /// Sets a position's score and best move. Idempotent: applying the same
    /// `(score, best_move)` twice leaves the record unchanged.
    async fn update_score(
        &self,
        fingerprint: Fingerprint,
        score: i16,
        best_move: Option<i16>,
    ) -> SolveResult<()>;

    /// Ensures all writes issued so far are durable before the caller
    /// proceeds to depend on their visibility (e.g. before a depth's
    /// `count_by_depth` is trusted as final).
    async fn flush(&self) -> SolveResult<()>;

    /// Advisory hook: after BFS completes, the driver may ask the store to
    /// cluster its physical layout by `seed_level`. Affects only the
    /// performance of retrograde's level-ordered scans, never correctness,
    /// so a no-op default is a valid implementation.
    async fn reorganize_by_seed_level(&self) -> SolveResult<()> {
        Ok(())
    }
}
