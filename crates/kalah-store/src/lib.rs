//! The position store: capability set used by both the BFS and retrograde
//! drivers, with a PostgreSQL-backed implementation for real solve runs and
//! an in-memory implementation for tests and small boards.

mod memory;
mod pg;
mod record;
mod schema;
mod store;

pub use memory::MemoryStore;
pub use pg::PgStore;
pub use record::PositionRecord;
pub use schema::Schema;
pub use store::Store;
