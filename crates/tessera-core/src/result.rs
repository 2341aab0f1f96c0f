//! Result type aliases for Tessera.

use crate::TesseraError;

/// A specialized `Result` type for Tessera operations.
pub type TesseraResult<T> = Result<T, TesseraError>;

/// A boxed future returning a `TesseraResult`.
///
/// Used for closures that borrow a session for the duration of a unit of work.
pub type BoxFuture<'a, T> = std::pin::Pin<Box<dyn std::future::Future<Output = TesseraResult<T>> + Send + 'a>>;
