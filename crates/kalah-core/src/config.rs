/// Explicit, constructible configuration for a solve run, replacing the
/// process-level globals a coroutine-oriented implementation might reach for
/// (Design Notes §9: "replace process-level globals ... with explicit
/// parameter structs").
///
/// Every field has a default drawn from the Configuration table; callers
/// build one with `SolverConfig::default()` and override only what they need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverConfig {
    /// Pits per side.
    pub pits: u8,
    /// Seeds per pit at the opening position.
    pub seeds: u8,
    /// Number of worker tasks/threads fanned out over a chunk.
    pub worker_count: usize,
    /// Number of parent positions read from the store per chunk.
    pub chunk_size: usize,
    /// Number of child records written to the store per `insert_batch` call.
    pub batch_size: usize,
    /// Upper bound on the size of a worker-side dedup set before the worker
    /// falls back to relying on store-side dedup alone.
    pub dedup_set_max: usize,
    /// Capacity of the bounded writer queue between generator and writer.
    pub queue_capacity: usize,
    /// Available-memory threshold below which the governor enters
    /// `Throttled` mode.
    pub mem_warn_bytes: u64,
    /// Available-memory threshold below which the governor enters
    /// `Critical` mode.
    pub mem_crit_bytes: u64,
    /// Skips worker-side dedup unconditionally, trading store load for
    /// generator throughput. Set from `KALAH_FAST_MODE`.
    pub fast_mode: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pits: 6,
            seeds: 6,
            worker_count: num_cpus::get(),
            chunk_size: 100_000,
            batch_size: 100_000,
            dedup_set_max: 10_000_000,
            queue_capacity: 1_000,
            mem_warn_bytes: 4 * 1024 * 1024 * 1024,
            mem_crit_bytes: 2 * 1024 * 1024 * 1024,
            fast_mode: false,
        }
    }
}

impl SolverConfig {
    pub fn with_board(pits: u8, seeds: u8) -> Self {
        Self {
            pits,
            seeds,
            ..Self::default()
        }
    }
}
