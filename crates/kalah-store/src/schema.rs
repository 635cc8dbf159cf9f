/// Table name for the position store.
pub const POSITIONS: &str = "positions";

/// Schema of a Postgres-backed table: DDL and index/truncate statements are
/// associated functions returning `'static str`s built at compile time with
/// `const_format::concatcp!`, rather than formatted at runtime.
pub trait Schema {
    fn name() -> &'static str;
    fn creates() -> &'static str;
    fn indices() -> &'static str;
    fn seed_level_index_name() -> &'static str;
    fn truncates() -> &'static str;
}

pub struct Positions;

impl Schema for Positions {
    fn name() -> &'static str {
        POSITIONS
    }

    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            POSITIONS,
            " (
                fingerprint  BIGINT PRIMARY KEY,
                packed_cells BYTEA NOT NULL,
                depth        SMALLINT NOT NULL,
                seed_level   SMALLINT NOT NULL,
                score        SMALLINT,
                best_move    SMALLINT
            );"
        )
    }

    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE INDEX IF NOT EXISTS ",
            POSITIONS,
            "_depth_idx ON ",
            POSITIONS,
            " (depth);
            CREATE INDEX IF NOT EXISTS ",
            POSITIONS,
            "_seed_level_idx ON ",
            POSITIONS,
            " (seed_level);
            CREATE INDEX IF NOT EXISTS ",
            POSITIONS,
            "_unsolved_level_idx ON ",
            POSITIONS,
            " (seed_level) WHERE score IS NULL;"
        )
    }

    /// Name of the full (non-partial) seed_level index, the one `CLUSTER`
    /// physically reorganizes the table around; the partial
    /// `_unsolved_level_idx` only covers unsolved rows and cannot anchor a
    /// whole-table `CLUSTER`.
    fn seed_level_index_name() -> &'static str {
        const_format::concatcp!(POSITIONS, "_seed_level_idx")
    }

    fn truncates() -> &'static str {
        const_format::concatcp!("TRUNCATE ", POSITIONS, ";")
    }
}
