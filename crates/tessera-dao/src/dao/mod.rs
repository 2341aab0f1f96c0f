//! Generic DAO layer.
//!
//! [`CrudDao`] is the uniform CRUD surface over any [`Model`]; the
//! PostgreSQL implementation lives under `impl/`.
//!
//! ```text
//! caller → CrudDao<M> (interface) → PgDao<M> (SQLx) → PostgreSQL
//!              ↑ DTOs in / DTOs out        ↑ Session (one transaction)
//! ```

mod options;
pub mod r#impl;

pub use options::{Changes, FetchOptions, Filters, OrderBy};
pub use r#impl::PgDao;

use crate::model::Model;
use crate::session::Session;
use crate::value::Value;
use async_trait::async_trait;
use tessera_core::{Page, PageRequest, TesseraResult};

/// Uniform create/read/update/delete operations for one model type.
///
/// Every operation runs on the caller's session; nothing is committed
/// until the session is.
#[async_trait]
pub trait CrudDao<M: Model>: Send + Sync {
    /// Inserts one row built from `dto` and returns it as persisted,
    /// including database-generated values.
    async fn insert(&self, session: &mut Session, dto: &M::Dto) -> TesseraResult<M::Dto>;

    /// Inserts all rows in one statement. Results follow input order.
    async fn insert_many(&self, session: &mut Session, dtos: &[M::Dto]) -> TesseraResult<Vec<M::Dto>>;

    /// The only row matching `filters`, if any.
    ///
    /// Fails with `AmbiguousMatch` if more than one row matches.
    async fn fetch_one(&self, session: &mut Session, filters: Filters) -> TesseraResult<Option<M::Dto>>;

    /// All rows matching `filters`, ordered and paged by `options`.
    async fn fetch_all(
        &self,
        session: &mut Session,
        options: FetchOptions,
        filters: Filters,
    ) -> TesseraResult<Vec<M::Dto>>;

    /// The first row matching `filters` under `order_by`.
    async fn fetch_first(
        &self,
        session: &mut Session,
        order_by: Option<OrderBy>,
        filters: Filters,
    ) -> TesseraResult<Option<M::Dto>>;

    /// Applies `changes` to the row with primary key `key` and returns it.
    ///
    /// Fails with `NotFound` if no row has that key.
    async fn update(&self, session: &mut Session, key: Value, changes: Changes) -> TesseraResult<M::Dto>;

    /// Deletes the row with primary key `key` and returns its prior state.
    ///
    /// Fails with `NotFound` if no row has that key.
    async fn delete(&self, session: &mut Session, key: Value) -> TesseraResult<M::Dto>;

    /// Number of rows matching `filters`.
    async fn count(&self, session: &mut Session, filters: Filters) -> TesseraResult<u64>;

    /// One page of rows matching `filters` plus the total match count.
    async fn fetch_page(
        &self,
        session: &mut Session,
        page: PageRequest,
        order_by: Option<OrderBy>,
        filters: Filters,
    ) -> TesseraResult<Page<M::Dto>>;
}
