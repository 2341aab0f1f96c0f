//! # Tessera Core
//!
//! Foundational types shared by every Tessera crate: the unified error
//! enum, result aliases, pagination primitives and logging setup.

pub mod error;
pub mod pagination;
pub mod result;
pub mod telemetry;

pub use error::*;
pub use pagination::*;
pub use result::*;

// Re-export shaku for dependency injection
pub use shaku::{module, HasComponent, Interface};
