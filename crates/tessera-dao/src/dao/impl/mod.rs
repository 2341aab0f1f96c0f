//! DAO implementations.
//!
//! The trait lives in the parent `dao/` module; implementations are
//! organized by database.

pub mod postgres;

pub use postgres::PgDao;
