//! Database sessions: one pooled connection, one transaction.

use crate::controller::DatabaseController;
use sqlx::{PgConnection, Postgres, Transaction};
use tessera_core::{BoxFuture, TesseraResult};
use tracing::{debug, warn};
use uuid::Uuid;

/// A unit of work bound to one pooled connection and one transaction.
///
/// Dropping a session that was neither committed nor rolled back rolls the
/// transaction back and returns the connection to the pool.
pub struct Session {
    id: Uuid,
    tx: Transaction<'static, Postgres>,
}

impl Session {
    pub(crate) fn new(tx: Transaction<'static, Postgres>) -> Self {
        let id = Uuid::now_v7();
        debug!("Session {} opened", id);
        Self { id, tx }
    }

    /// Identifier used in log lines.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// The connection statements run on.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut *self.tx
    }

    /// Commits the transaction.
    pub async fn commit(self) -> TesseraResult<()> {
        self.tx.commit().await?;
        debug!("Session {} committed", self.id);
        Ok(())
    }

    /// Rolls the transaction back.
    pub async fn rollback(self) -> TesseraResult<()> {
        self.tx.rollback().await?;
        debug!("Session {} rolled back", self.id);
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Runs `work` in a fresh session.
///
/// Commits when `work` succeeds. On failure the session is rolled back and
/// the original error is returned; a failed rollback is only logged.
///
/// ```ignore
/// let book = unit_of_work(&controller, move |session| {
///     Box::pin(async move { PgDao::<Book>::new().insert(session, &dto).await })
/// })
/// .await?;
/// ```
pub async fn unit_of_work<C, T, F>(controller: &C, work: F) -> TesseraResult<T>
where
    C: DatabaseController + ?Sized,
    T: Send,
    F: for<'s> FnOnce(&'s mut Session) -> BoxFuture<'s, T> + Send,
{
    let mut session = controller.session().await?;
    let id = session.id();

    match work(&mut session).await {
        Ok(value) => {
            session.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = session.rollback().await {
                warn!("Rollback of session {} failed: {}", id, rollback_err);
            }
            Err(err)
        }
    }
}
