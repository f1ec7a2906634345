//! Account repository boundary.
//!
//! The provisioning saga only consumes the [`AccountRepository`]
//! contract; the backing store is an external collaborator. Two
//! implementations are provided: an in-memory store with failure
//! injection for tests, and a PostgreSQL store whose unique constraints
//! are the system-wide source of truth for slug and email uniqueness.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{ConflictField, Result, StoreError};
pub use memory::{BusinessWriteFailure, InMemoryAccountRepository};
pub use postgres::PostgresAccountRepository;
pub use repository::AccountRepository;
