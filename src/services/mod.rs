// Service exports
pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::{MemoryStore, MemoryUnit, FailPoint};
pub use postgres::{PostgresStore, PgUnitOfWork};
pub use store::{StoreError, SwipeStore, UnitOfWork};
