// Storage infrastructure
pub mod aggregate;        // Joined-row folding shared by the SQL queries
pub mod id_generator;     // Atomic ids for the in-memory backend
pub mod memory_database;  // BTreeMap-backed storage
pub mod sqlite_database;  // SQLite-backed storage
pub mod storage;          // Storage traits

pub use aggregate::{aggregate, FanOutRow};
pub use id_generator::SequentialIdGenerator;
pub use memory_database::InMemoryDatabase;
pub use sqlite_database::SqliteDatabase;
pub use storage::{FilmStorage, FriendshipStorage, UserStorage};
