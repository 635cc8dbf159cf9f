use thiserror::Error;

/// Errors surfaced by the rules engine, the position store, and the BFS /
/// retrograde drivers. Variants distinguish retryable-transient conditions
/// from fatal-permanent ones so callers can decide whether to back off or
/// abort.
#[derive(Debug, Error)]
pub enum SolveError {
    /// An operation's precondition was violated, e.g. applying a move to an
    /// empty pit or reading a score from a non-terminal state.
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A store operation failed in a way that may succeed on retry
    /// (connection reset, timeout, resource exhaustion). Retried internally
    /// up to a fixed bound before being surfaced.
    #[error("transient store error: {0}")]
    StoreTransient(String),

    /// A store operation failed in a way retrying cannot fix (schema
    /// mismatch, constraint violation, malformed data).
    #[error("permanent store error: {0}")]
    StorePermanent(String),

    /// The dedicated writer task terminated unexpectedly.
    #[error("writer task panicked: {0}")]
    WriterPanic(String),

    /// A retrograde fixpoint pass made no progress within a seed level that
    /// still has unsolved positions, indicating a cycle the solver cannot
    /// break (should not occur if BFS reachability is complete).
    #[error("retrograde fixpoint stalled at seed level {level} with {unsolved} unsolved")]
    FixpointStalled { level: i16, unsolved: i64 },
}

pub type SolveResult<T> = Result<T, SolveError>;
