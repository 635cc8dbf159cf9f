use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use kalah_core::{Fingerprint, SolveResult};

use crate::record::PositionRecord;
use crate::store::Store;

/// In-memory [`Store`], used for unit/integration tests and boards small
/// enough to solve without PostgreSQL. A plain `RwLock<HashMap<..>>` rather
/// than a concurrent map crate.
#[derive(Default)]
pub struct MemoryStore {
    positions: RwLock<HashMap<Fingerprint, PositionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_batch(&self, records: Vec<PositionRecord>) -> SolveResult<usize> {
        use std::collections::hash_map::Entry;
        let mut guard = self.positions.write().expect("poisoned");
        let mut inserted = 0;
        for record in records {
            if let Entry::Vacant(slot) = guard.entry(record.fingerprint) {
                slot.insert(record);
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    async fn exists(&self, fingerprint: Fingerprint) -> SolveResult<bool> {
        Ok(self
            .positions
            .read()
            .expect("poisoned")
            .contains_key(&fingerprint))
    }

    async fn get(&self, fingerprint: Fingerprint) -> SolveResult<Option<PositionRecord>> {
        Ok(self
            .positions
            .read()
            .expect("poisoned")
            .get(&fingerprint)
            .cloned())
    }

    async fn scan_by_depth(
        &self,
        depth: i16,
        offset: i64,
        limit: i64,
    ) -> SolveResult<Vec<PositionRecord>> {
        let guard = self.positions.read().expect("poisoned");
        let mut matches: Vec<_> = guard
            .values()
            .filter(|r| r.depth == depth)
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.fingerprint);
        Ok(page(matches, offset, limit))
    }

    async fn scan_unsolved_by_level(
        &self,
        seed_level: i16,
        offset: i64,
        limit: i64,
    ) -> SolveResult<Vec<PositionRecord>> {
        let guard = self.positions.read().expect("poisoned");
        let mut matches: Vec<_> = guard
            .values()
            .filter(|r| r.seed_level == seed_level && r.unsolved())
            .cloned()
            .collect();
        matches.sort_by_key(|r| r.fingerprint);
        Ok(page(matches, offset, limit))
    }

    async fn count_by_depth(&self, depth: i16) -> SolveResult<i64> {
        let guard = self.positions.read().expect("poisoned");
        Ok(guard.values().filter(|r| r.depth == depth).count() as i64)
    }

    async fn count_unsolved_by_level(&self, seed_level: i16) -> SolveResult<i64> {
        let guard = self.positions.read().expect("poisoned");
        Ok(guard
            .values()
            .filter(|r| r.seed_level == seed_level && r.unsolved())
            .count() as i64)
    }

    async fn update_score(
        &self,
        fingerprint: Fingerprint,
        score: i16,
        best_move: Option<i16>,
    ) -> SolveResult<()> {
        let mut guard = self.positions.write().expect("poisoned");
        if let Some(record) = guard.get_mut(&fingerprint) {
            record.score = Some(score);
            record.best_move = best_move;
        }
        Ok(())
    }

    async fn flush(&self) -> SolveResult<()> {
        Ok(())
    }
}

fn page(items: Vec<PositionRecord>, offset: i64, limit: i64) -> Vec<PositionRecord> {
    let offset = offset.max(0) as usize;
    let limit = limit.max(0) as usize;
    if offset >= items.len() {
        return Vec::new();
    }
    let mut remainder = items;
    remainder.drain(..offset);
    remainder.truncate(limit);
    remainder
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(fingerprint: Fingerprint, depth: i16) -> PositionRecord {
        PositionRecord {
            fingerprint,
            packed_cells: vec![0],
            depth,
            seed_level: 0,
            score: None,
            best_move: None,
        }
    }

    #[tokio::test]
    async fn insert_batch_deduplicates_on_fingerprint() {
        let store = MemoryStore::new();
        let inserted = store.insert_batch(vec![record(1, 0), record(1, 0)]).await.unwrap();
        assert_eq!(inserted, 1);
        let inserted_again = store.insert_batch(vec![record(1, 0)]).await.unwrap();
        assert_eq!(inserted_again, 0);
        assert_eq!(store.count_by_depth(0).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_score_is_idempotent() {
        let store = MemoryStore::new();
        store.insert_batch(vec![record(7, 1)]).await.unwrap();
        store.update_score(7, 3, Some(2)).await.unwrap();
        store.update_score(7, 3, Some(2)).await.unwrap();
        let record = store.get(7).await.unwrap().unwrap();
        assert_eq!(record.score, Some(3));
        assert_eq!(record.best_move, Some(2));
    }

    #[tokio::test]
    async fn scan_by_depth_pages_and_orders_by_fingerprint() {
        let store = MemoryStore::new();
        store
            .insert_batch(vec![record(3, 0), record(1, 0), record(2, 0), record(9, 1)])
            .await
            .unwrap();
        let page1 = store.scan_by_depth(0, 0, 2).await.unwrap();
        assert_eq!(
            page1.iter().map(|r| r.fingerprint).collect::<Vec<_>>(),
            vec![1, 2]
        );
        let page2 = store.scan_by_depth(0, 2, 2).await.unwrap();
        assert_eq!(page2.iter().map(|r| r.fingerprint).collect::<Vec<_>>(), vec![3]);
    }
}
