//! One storage session per request.
//!
//! Handlers never see the pool. They get a connection inside [`with_session`],
//! which hands it back on every exit path, including early returns and errors.
//! A panic inside the scope still returns the connection when the guard drops.

use diesel::r2d2::{ConnectionManager, PooledConnection, R2D2Connection};
use diesel::sqlite::SqliteConnection;

use crate::db::DbPool;
use crate::error::{ApiResult, SessionReleaseError, StorageError};
use crate::utils::logs;

pub type Session = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Source of storage sessions, injected into the dispatcher at startup.
pub trait SessionFactory: Send + Sync + 'static {
    fn acquire(&self) -> Result<Session, StorageError>;

    fn release(&self, session: Session) -> Result<(), SessionReleaseError>;
}

impl SessionFactory for DbPool {
    fn acquire(&self) -> Result<Session, StorageError> {
        Ok(self.get()?)
    }

    /// A connection left with an open or failed transaction is reported here;
    /// the pool discards it when the guard drops.
    fn release(&self, mut session: Session) -> Result<(), SessionReleaseError> {
        if R2D2Connection::is_broken(&mut *session) {
            return Err(SessionReleaseError::Broken);
        }
        Ok(())
    }
}

/// Runs `work` against a freshly acquired session and releases it afterwards.
/// Release failures are logged and never replace the outcome of `work`.
pub fn with_session<T>(
    factory: &dyn SessionFactory,
    work: impl FnOnce(&mut SqliteConnection) -> ApiResult<T>,
) -> ApiResult<T> {
    let mut session = factory.acquire()?;
    let outcome = work(&mut session);

    if let Err(e) = factory.release(session) {
        logs::log_session_release_failed(&e.to_string());
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::establish_pool;
    use crate::error::ApiError;
    use crate::settings::Database;
    use diesel::connection::{AnsiTransactionManager, TransactionManager};
    use tempfile::TempDir;

    fn single_connection_pool() -> (TempDir, DbPool) {
        let dir = TempDir::new().unwrap();
        let config = Database {
            url: dir.path().join("session.db").to_string_lossy().into_owned(),
            pool_size: 1,
            connection_timeout_ms: 200,
            busy_timeout_ms: 100,
        };
        (dir, establish_pool(&config).unwrap())
    }

    #[test]
    fn test_session_released_after_success() {
        let (_dir, pool) = single_connection_pool();

        let value = with_session(&pool, |_| Ok(5)).unwrap();
        assert_eq!(value, 5);
        assert_eq!(pool.state().idle_connections, 1);
    }

    #[test]
    fn test_session_released_after_error() {
        let (_dir, pool) = single_connection_pool();

        let outcome: ApiResult<()> = with_session(&pool, |_| Err(ApiError::NotFound));
        assert!(matches!(outcome, Err(ApiError::NotFound)));
        assert_eq!(pool.state().idle_connections, 1);
        assert!(with_session(&pool, |_| Ok(())).is_ok());
    }

    #[test]
    fn test_acquire_failure_is_storage_error() {
        let (_dir, pool) = single_connection_pool();
        let _held = pool.get().unwrap();

        let outcome = with_session(&pool, |_| Ok(()));
        assert!(matches!(
            outcome,
            Err(ApiError::Storage(StorageError::Acquire(_)))
        ));
    }

    #[test]
    fn test_release_reports_open_transaction() {
        let (_dir, pool) = single_connection_pool();

        let mut session = pool.acquire().unwrap();
        AnsiTransactionManager::begin_transaction(&mut *session).unwrap();
        assert!(matches!(
            pool.release(session),
            Err(SessionReleaseError::Broken)
        ));
    }

    #[test]
    fn test_release_failure_does_not_mask_outcome() {
        let (_dir, pool) = single_connection_pool();

        let outcome = with_session(&pool, |conn| {
            AnsiTransactionManager::begin_transaction(conn)?;
            Ok("sent")
        });
        assert_eq!(outcome.unwrap(), "sent");
    }

    #[tokio::test]
    async fn test_panic_in_scope_returns_connection() {
        let (_dir, pool) = single_connection_pool();

        let scoped = pool.clone();
        let joined = tokio::task::spawn_blocking(move || {
            with_session(&scoped, |_| -> ApiResult<()> { panic!("handler blew up") })
        })
        .await;

        assert!(joined.unwrap_err().is_panic());
        assert_eq!(pool.state().idle_connections, 1);
        assert!(with_session(&pool, |_| Ok(())).is_ok());
    }
}
