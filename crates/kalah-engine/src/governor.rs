use std::sync::Mutex;

use sysinfo::System;

/// Governor modes, switched on available system memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceState {
    Normal,
    Throttled,
    Critical,
}

/// Polled by the BFS and retrograde drivers between chunks/passes to decide
/// chunk sizing and whether worker-side dedup is worth its own memory cost.
pub struct Governor {
    system: Mutex<System>,
    mem_warn_bytes: u64,
    mem_crit_bytes: u64,
}

impl Governor {
    pub fn new(mem_warn_bytes: u64, mem_crit_bytes: u64) -> Self {
        Self {
            system: Mutex::new(System::new()),
            mem_warn_bytes,
            mem_crit_bytes,
        }
    }

    pub fn poll(&self) -> ResourceState {
        let mut system = self.system.lock().expect("poisoned");
        system.refresh_memory();
        let available = system.available_memory();
        if available <= self.mem_crit_bytes {
            ResourceState::Critical
        } else if available <= self.mem_warn_bytes {
            ResourceState::Throttled
        } else {
            ResourceState::Normal
        }
    }

    /// Halves the chunk size under memory pressure, quarters it when
    /// critical, always leaving at least one item per chunk.
    pub fn adjust_chunk_size(&self, base: usize) -> usize {
        match self.poll() {
            ResourceState::Normal => base,
            ResourceState::Throttled => (base / 2).max(1),
            ResourceState::Critical => (base / 4).max(1),
        }
    }

    /// Worker-side dedup sets cost memory proportional to the frontier; the
    /// governor disables them once memory is critical, relying on the
    /// store's own `insert_batch` dedup instead.
    pub fn worker_side_dedup_allowed(&self) -> bool {
        self.poll() != ResourceState::Critical
    }
}
