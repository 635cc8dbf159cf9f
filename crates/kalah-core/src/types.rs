/// 64-bit Zobrist fingerprint used as the position store's primary key.
pub type Fingerprint = i64;

/// A perfect-play minimax score: store A's seed count minus store B's.
pub type Score = i16;
