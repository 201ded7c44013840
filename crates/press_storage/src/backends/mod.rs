pub mod file;
pub mod memory;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::FileKeyValue;
pub use memory::{InMemoryRepository, MemoryKeyValue};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteRepository;
