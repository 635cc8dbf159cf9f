use std::sync::Arc;

use futures::stream::{self, StreamExt};

use kalah_core::{Cancellation, Metrics, SolveError, SolveResult, SolverConfig};
use kalah_rules::{Rules, Side};
use kalah_store::{PositionRecord, Store};

/// Backward-induction minimax scoring, processing seed levels in ascending
/// order (`L = 0, 1, 2, ...`): every non-extra-turn move strictly decreases
/// the seed level, and the terminal sweep empties every pit, so terminal
/// positions all live at level 0. A position at level `L` can only depend
/// on children at level `<= L`, so solving levels ascending guarantees every
/// child a position needs is already scored once its own level is reached,
/// modulo extra-turn chains resolved within the level itself.
///
/// Grounded on the backward-tagging structure of a tablebase generator that
/// re-scans a queue of positions until a pass makes no further progress —
/// here applied per seed level instead of per win/loss queue.
pub struct RetrogradeDriver<S: Store> {
    store: Arc<S>,
    rules: Arc<Rules>,
    config: SolverConfig,
    governor: Arc<crate::Governor>,
    metrics: Metrics,
}

impl<S: Store> RetrogradeDriver<S> {
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

    pub async fn run(&self, cancellation: &Cancellation) -> SolveResult<()> {
        let max_level = self.rules.params().total_seeds() as i16;

        for level in 0..=max_level {
            if cancellation.requested() {
                log::info!("retrograde cancelled at seed level {level}");
                break;
            }

            loop {
                let unsolved_before = self.store.count_unsolved_by_level(level).await?;
                if unsolved_before == 0 {
                    break;
                }

                let mut offset: i64 = 0;
                let mut resolved_this_pass = 0usize;
                loop {
                    // Re-consulted every batch so a mid-level swing in
                    // available memory shrinks the next read before it even
                    // happens, mirroring the BFS driver's chunk sizing.
                    let batch_size = self.governor.adjust_chunk_size(self.config.batch_size) as i64;
                    let batch = self
                        .store
                        .scan_unsolved_by_level(level, offset, batch_size)
                        .await?;
                    if batch.is_empty() {
                        break;
                    }
                    offset += batch.len() as i64;

                    // Each position in the batch is resolved independently (a
                    // worker reads only its own children's scores), so the
                    // batch fans out across up to `worker_count` concurrent
                    // lookups; only the resulting writes are serialized
                    // through the single store handle.
                    let resolutions: Vec<SolveResult<Option<(i64, i16, Option<i16>)>>> =
                        stream::iter(batch.iter())
                            .map(|record| async move {
                                let resolved = self.try_resolve(record).await?;
                                Ok(resolved.map(|(score, best_move)| {
                                    (record.fingerprint, score, best_move)
                                }))
                            })
                            .buffer_unordered(self.config.worker_count.max(1))
                            .collect()
                            .await;

                    for resolution in resolutions {
                        if let Some((fingerprint, score, best_move)) = resolution? {
                            self.store.update_score(fingerprint, score, best_move).await?;
                            resolved_this_pass += 1;
                        }
                    }
                }

                self.metrics.add_positions(resolved_this_pass);
                if let Some(line) = self.metrics.checkpoint() {
                    log::info!("retrograde level {level} {line}");
                }

                let unsolved_after = self.store.count_unsolved_by_level(level).await?;
                if unsolved_after == unsolved_before {
                    return Err(SolveError::FixpointStalled {
                        level,
                        unsolved: unsolved_after,
                    });
                }
                if unsolved_after == 0 {
                    break;
                }
            }

            self.store.flush().await?;
            self.metrics.inc_epoch();
        }
        Ok(())
    }

    /// Attempts to score a single unsolved position. Returns `None` if at
    /// least one child is itself unsolved (the caller retries it on the
    /// next fixpoint pass).
    async fn try_resolve(
        &self,
        record: &PositionRecord,
    ) -> SolveResult<Option<(i16, Option<i16>)>> {
        let state = self.rules.unpack(&record.packed_cells);

        if self.rules.is_terminal(&state) {
            return Ok(Some((self.rules.payoff(&state) as i16, None)));
        }

        let maximizing = state.side() == Side::A;
        let mut best_score: Option<i32> = None;
        let mut best_move: Option<i16> = None;

        for pit in self.rules.legal_moves(&state) {
            let child = self.rules.apply(&state, pit);
            let child_fp = self.rules.fingerprint(&child);
            let child_record = match self.store.get(child_fp).await? {
                Some(r) => r,
                None => return Ok(None),
            };
            let child_score = match child_record.score {
                Some(s) => s as i32,
                None => return Ok(None),
            };

            let better = match best_score {
                None => true,
                Some(best) if maximizing => child_score > best,
                Some(best) => child_score < best,
            };
            if better {
                best_score = Some(child_score);
                best_move = Some(pit as i16);
            }
        }

        Ok(best_score.map(|score| (score as i16, best_move)))
    }
}
