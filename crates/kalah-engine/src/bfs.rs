use std::collections::HashSet;
use std::sync::Arc;

use rayon::prelude::*;

use kalah_core::{Cancellation, Metrics, SolveError, SolveResult, SolverConfig};
use kalah_rules::Rules;
use kalah_store::{PositionRecord, Store};

/// Breadth-first enumeration of every reachable position, depth by depth.
///
/// Built around an `Arc`-shared store, a dedicated writer drain task, and a
/// `rayon`-parallel map over each CPU-bound batch of sowing simulations.
pub struct BfsDriver<S: Store> {
    store: Arc<S>,
    rules: Arc<Rules>,
    config: SolverConfig,
    governor: Arc<crate::Governor>,
    metrics: Metrics,
}

impl<S: Store + 'static> BfsDriver<S> {
    pub fn new(
        store: Arc<S>,
        rules: Arc<Rules>,
        config: SolverConfig,
        governor: Arc<crate::Governor>,
    ) -> Self {
        Self {
            store,
            rules,
            config,
            governor,
            metrics: Metrics::default(),
        }
    }

    /// Runs BFS to a fixed point: the frontier at `depth` is read in
    /// chunks, each chunk's children are generated in parallel and sent to
    /// a dedicated writer task through a bounded queue, and the loop
    /// advances to `depth + 1` once the writer has drained the whole
    /// frontier. Stops when a depth's frontier is empty.
    pub async fn run(&self, cancellation: &Cancellation) -> SolveResult<()> {
        let opening = self.rules.opening();
        let opening_record = PositionRecord {
            fingerprint: self.rules.fingerprint(&opening),
            packed_cells: self.rules.pack(&opening),
            depth: 0,
            seed_level: opening.seed_level(self.rules.params()) as i16,
            score: None,
            best_move: None,
        };
        self.store.insert_batch(vec![opening_record]).await?;

        let mut depth: i16 = 0;
        loop {
            if cancellation.requested() {
                log::info!("BFS cancelled at depth {depth}");
                break;
            }
            let frontier_size = self.store.count_by_depth(depth).await?;
            if frontier_size == 0 {
                break;
            }

            let (tx, mut rx) = tokio::sync::mpsc::channel::<Vec<PositionRecord>>(
                self.config.queue_capacity,
            );
            let writer_store = self.store.clone();
            let writer = tokio::spawn(async move {
                let mut total = 0usize;
                while let Some(batch) = rx.recv().await {
                    total += writer_store.insert_batch(batch).await?;
                }
                Ok::<usize, SolveError>(total)
            });

            let mut seen: HashSet<i64> = HashSet::new();
            let mut offset: i64 = 0;
            while offset < frontier_size {
                // Re-consulted every chunk (not just once per depth) so a
                // mid-depth swing in available memory is reflected before
                // the next chunk is even read.
                let chunk_size = self.governor.adjust_chunk_size(self.config.chunk_size) as i64;
                let dedup_allowed =
                    !self.config.fast_mode && self.governor.worker_side_dedup_allowed();

                let parents = self.store.scan_by_depth(depth, offset, chunk_size).await?;
                if parents.is_empty() {
                    break;
                }
                offset += parents.len() as i64;

                let rules = self.rules.clone();
                let next_depth = depth + 1;
                let mut children: Vec<PositionRecord> = tokio::task::spawn_blocking(move || {
                    parents
                        .par_iter()
                        .flat_map_iter(|parent| {
                            let state = rules.unpack(&parent.packed_cells);
                            rules.legal_moves(&state).into_iter().map(move |pit| {
                                let child = rules.apply(&state, pit);
                                PositionRecord {
                                    fingerprint: rules.fingerprint(&child),
                                    packed_cells: rules.pack(&child),
                                    depth: next_depth,
                                    seed_level: child.seed_level(rules.params()) as i16,
                                    score: None,
                                    best_move: None,
                                }
                            })
                        })
                        .collect()
                })
                .await
                .map_err(|e| SolveError::WriterPanic(e.to_string()))?;

                if dedup_allowed && seen.len() < self.config.dedup_set_max {
                    children.retain(|child| seen.insert(child.fingerprint));
                }

                self.metrics.add_positions(children.len());
                if tx.send(children).await.is_err() {
                    return Err(SolveError::WriterPanic(
                        "BFS writer task exited early".into(),
                    ));
                }
                if let Some(line) = self.metrics.checkpoint() {
                    log::info!("bfs depth {depth} {line}");
                }
            }

            drop(tx);
            let inserted = writer
                .await
                .map_err(|e| SolveError::WriterPanic(e.to_string()))??;
            self.store.flush().await?;
            log::info!("depth {depth}: {inserted} new positions");
            self.metrics.inc_epoch();
            depth += 1;
        }

        if !cancellation.requested() {
            // Retrograde scans by ascending seed_level next, so clustering
            // the table's physical layout around that access pattern now is
            // pure upside; this is advisory and never affects correctness.
            self.store.reorganize_by_seed_level().await?;
        }
        Ok(())
    }
}
