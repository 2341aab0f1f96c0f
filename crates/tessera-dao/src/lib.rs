//! # Tessera DAO
//!
//! Generic data access over PostgreSQL with a DTO ⇄ model mapping engine.
//!
//! ```text
//! caller
//!   ↓  DTOs, Filters, Changes
//! CrudDao<M> / PgDao<M>       (generic DAO, every operation guarded)
//!   ↓  Model::from_dto / Model::to_dto
//! Session                     (one connection, one transaction)
//!   ↓
//! DbController                (lazy pool, shaku component)
//!   ↓
//! PostgreSQL
//! ```
//!
//! ## Structure
//!
//! ```text
//! src/
//!   value.rs        ← Value, ValueKind, FromValue
//!   record.rs       ← Record, Slot
//!   transfer.rs     ← TransferObject, Field, Unbound
//!   model.rs        ← Model, ModelMeta, Attribute
//!   controller.rs   ← DatabaseController, DbController
//!   session.rs      ← Session, unit_of_work
//!   guard.rs        ← guarded
//!   statements.rs   ← SQL builders
//!   dao/
//!     mod.rs        ← CrudDao trait, Filters, Changes, FetchOptions
//!     impl/
//!       postgres.rs ← PgDao
//!   di.rs           ← DataModule
//! ```

pub mod controller;
pub mod dao;
pub mod di;
pub mod guard;
pub mod model;
pub mod record;
pub mod session;
mod statements;
pub mod transfer;
pub mod value;

pub use controller::{DatabaseController, DbController, DbControllerParameters};
pub use dao::{Changes, CrudDao, FetchOptions, Filters, OrderBy, PgDao};
pub use di::{build_data_module, DataModule};
pub use guard::guarded;
pub use model::{Attribute, Column, Model, ModelMeta, Related, Relation};
pub use record::{Record, Slot};
pub use session::{unit_of_work, Session};
pub use transfer::{Field, FieldKind, NestedDto, TransferObject, Unbound};
pub use value::{FromValue, Value, ValueKind};
