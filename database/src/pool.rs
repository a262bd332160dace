//! Session pool over SQLite connections.
//!
//! Every physical connection opens a private in-memory main database and
//! attaches each configured database file under its own schema name, so a
//! single connection can serve every database the process knows about.

use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::Connection;
use tokio::sync::{Semaphore, SemaphorePermit};

use crate::{DatabaseConfig, DatabaseError};

#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub data_dir: PathBuf,
    pub databases: Vec<String>,
}

impl StoreOptions {
    pub fn database_path(&self, database: &str) -> PathBuf {
        self.data_dir.join(format!("{database}.db"))
    }

    async fn dial(&self) -> Result<SqliteConnection, DatabaseError> {
        let options = SqliteConnectOptions::new().create_if_missing(true);
        let mut conn = SqliteConnection::connect_with(&options)
            .await
            .map_err(|e| DatabaseError::Connection(e.to_string()))?;

        for database in &self.databases {
            let path = self.database_path(database);
            sqlx::query(&format!("ATTACH DATABASE ? AS \"{database}\""))
                .bind(path.to_string_lossy().into_owned())
                .execute(&mut conn)
                .await
                .map_err(|e| DatabaseError::Connection(format!("{}: {e}", path.display())))?;
            sqlx::query(&format!("PRAGMA \"{database}\".journal_mode = WAL"))
                .execute(&mut conn)
                .await
                .map_err(|e| DatabaseError::Connection(e.to_string()))?;
        }

        Ok(conn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    /// Reuse an idle pooled connection when there is one.
    #[default]
    Shared,
    /// Always dial a fresh connection and discard it afterwards.
    Dedicated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub pooled: bool,
    pub max_size: i32,
    pub idle: usize,
    pub in_use: usize,
}

pub struct Pool {
    options: StoreOptions,
    max_size: i32,
    idle: Mutex<Vec<SqliteConnection>>,
    permits: Semaphore,
    in_use: AtomicUsize,
    closed: AtomicBool,
}

impl Pool {
    /// Wraps an already established `seed` connection. At most `max_size`
    /// sessions are out at once; `max_size <= 0` turns pooling off and every
    /// session gets its own connection. An unpooled pool has no use for the
    /// seed beyond proving the store is reachable and drops it unclosed;
    /// [`Pool::connect`] closes it first.
    pub fn new(seed: SqliteConnection, options: StoreOptions, max_size: i32) -> Self {
        Self::build(Some(seed), options, max_size)
    }

    fn build(seed: Option<SqliteConnection>, options: StoreOptions, max_size: i32) -> Self {
        let pooled = max_size > 0;
        let idle = if pooled { seed.into_iter().collect() } else { Vec::new() };

        Self {
            options,
            max_size,
            idle: Mutex::new(idle),
            permits: Semaphore::new(if pooled { max_size as usize } else { 0 }),
            in_use: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Dials the seed connection and builds the pool around it. A failure
    /// here means the store is unreachable; no retry is attempted.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = config.store_options()?;
        tokio::fs::create_dir_all(&options.data_dir)
            .await
            .map_err(|e| {
                DatabaseError::Connection(format!("{}: {e}", options.data_dir.display()))
            })?;

        let seed = options.dial().await?;
        let seed = if config.pool_size > 0 {
            Some(seed)
        } else {
            seed.close()
                .await
                .map_err(|e| DatabaseError::Connection(e.to_string()))?;
            None
        };
        tracing::info!(
            "Connected to document store at {} (databases: {:?}, pool size: {})",
            options.data_dir.display(),
            options.databases,
            config.pool_size
        );
        Ok(Self::build(seed, options, config.pool_size))
    }

    pub fn is_pooled(&self) -> bool {
        self.max_size > 0
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Borrows a session for one unit of work. Waits while the pool is at
    /// capacity.
    pub async fn session(&self, affinity: Affinity) -> Result<Session<'_>, DatabaseError> {
        if self.is_closed() {
            return Err(DatabaseError::PoolClosed);
        }

        if !self.is_pooled() {
            let conn = self.options.dial().await?;
            return Ok(Session::new(self, conn, false, None));
        }

        let permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| DatabaseError::PoolClosed)?;

        let reused = match affinity {
            Affinity::Shared => self.take_idle().await,
            Affinity::Dedicated => None,
        };
        let conn = match reused {
            Some(conn) => conn,
            None => self.options.dial().await?,
        };

        Ok(Session::new(
            self,
            conn,
            affinity == Affinity::Shared,
            Some(permit),
        ))
    }

    async fn take_idle(&self) -> Option<SqliteConnection> {
        loop {
            let mut conn = self.idle.lock().pop()?;
            match conn.ping().await {
                Ok(()) => return Some(conn),
                Err(e) => {
                    tracing::warn!("Dropping broken pooled connection: {}", e);
                }
            }
        }
    }

    /// `closed` is read under the idle lock so a session dropped while
    /// [`Pool::close`] drains cannot land in the list after the drain.
    fn release(&self, conn: SqliteConnection, reusable: bool) {
        if !reusable {
            return;
        }
        let mut idle = self.idle.lock();
        if !self.is_closed() {
            idle.push(conn);
        }
    }

    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            pooled: self.is_pooled(),
            max_size: self.max_size,
            idle: self.idle.lock().len(),
            in_use: self.in_use.load(Ordering::Acquire),
        }
    }

    /// Closes every idle connection. Borrowing afterwards fails with
    /// [`DatabaseError::PoolClosed`]; sessions still out are discarded when
    /// dropped.
    pub async fn close(&self) {
        let idle = {
            let mut idle = self.idle.lock();
            if self.closed.swap(true, Ordering::AcqRel) {
                return;
            }
            std::mem::take(&mut *idle)
        };
        self.permits.close();

        for conn in idle {
            if let Err(e) = conn.close().await {
                tracing::warn!("Failed to close pooled connection: {}", e);
            }
        }
        tracing::info!("Connection pool closed");
    }
}

/// A borrowed connection. Derefs to [`SqliteConnection`] and goes back to
/// the pool on drop.
pub struct Session<'a> {
    pool: &'a Pool,
    conn: Option<SqliteConnection>,
    reusable: bool,
    _permit: Option<SemaphorePermit<'a>>,
}

impl<'a> Session<'a> {
    fn new(
        pool: &'a Pool,
        conn: SqliteConnection,
        reusable: bool,
        permit: Option<SemaphorePermit<'a>>,
    ) -> Self {
        pool.in_use.fetch_add(1, Ordering::AcqRel);
        Self {
            pool,
            conn: Some(conn),
            reusable,
            _permit: permit,
        }
    }
}

const DEREF_ERR: &str = "session connection is only taken on drop";

impl Deref for Session<'_> {
    type Target = SqliteConnection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect(DEREF_ERR)
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect(DEREF_ERR)
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.pool.release(conn, self.reusable);
        }
        self.pool.in_use.fetch_sub(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    async fn pool_with_size(max_size: i32) -> (TempDir, Pool) {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = DatabaseConfig::new(dir.path()).with_pool_size(max_size);
        let pool = Pool::connect(&config).await.expect("Failed to connect");
        (dir, pool)
    }

    #[tokio::test]
    async fn test_seed_connection_is_reused() {
        let (_dir, pool) = pool_with_size(4).await;
        assert_eq!(pool.status().idle, 1);

        {
            let _session = pool.session(Affinity::Shared).await.unwrap();
            let status = pool.status();
            assert_eq!(status.idle, 0);
            assert_eq!(status.in_use, 1);
        }

        let status = pool.status();
        assert_eq!(status.idle, 1);
        assert_eq!(status.in_use, 0);
    }

    #[tokio::test]
    async fn test_dedicated_sessions_are_not_returned() {
        let (_dir, pool) = pool_with_size(4).await;

        {
            let _session = pool.session(Affinity::Dedicated).await.unwrap();
            assert_eq!(pool.status().idle, 1);
        }

        assert_eq!(pool.status().idle, 1);
        assert_eq!(pool.status().in_use, 0);
    }

    #[tokio::test]
    async fn test_borrowers_wait_beyond_capacity() {
        let (_dir, pool) = pool_with_size(1).await;

        let held = pool.session(Affinity::Shared).await.unwrap();
        let blocked =
            tokio::time::timeout(Duration::from_millis(100), pool.session(Affinity::Shared)).await;
        assert!(blocked.is_err());

        drop(held);
        let session =
            tokio::time::timeout(Duration::from_secs(5), pool.session(Affinity::Shared)).await;
        assert!(matches!(session, Ok(Ok(_))));
    }

    #[tokio::test]
    async fn test_pooling_disabled_dials_every_session() {
        let (_dir, pool) = pool_with_size(0).await;
        assert!(!pool.is_pooled());
        assert_eq!(pool.status().idle, 0);

        let first = pool.session(Affinity::Shared).await.unwrap();
        let second = pool.session(Affinity::Shared).await.unwrap();
        let third = pool.session(Affinity::Shared).await.unwrap();
        assert_eq!(pool.status().in_use, 3);

        drop((first, second, third));
        assert_eq!(pool.status().idle, 0);
        assert_eq!(pool.status().in_use, 0);
    }

    #[tokio::test]
    async fn test_sessions_do_not_see_each_others_uncommitted_writes() {
        let (_dir, pool) = pool_with_size(2).await;

        let mut writer = pool.session(Affinity::Shared).await.unwrap();
        let mut reader = pool.session(Affinity::Shared).await.unwrap();

        sqlx::query("CREATE TABLE \"rank\".scratch (x INTEGER)")
            .execute(&mut *writer)
            .await
            .unwrap();
        sqlx::query("BEGIN").execute(&mut *writer).await.unwrap();
        sqlx::query("INSERT INTO \"rank\".scratch (x) VALUES (1)")
            .execute(&mut *writer)
            .await
            .unwrap();

        let visible: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM \"rank\".scratch")
            .fetch_one(&mut *reader)
            .await
            .unwrap();
        assert_eq!(visible, 0);

        sqlx::query("ROLLBACK").execute(&mut *writer).await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_pool_refuses_sessions() {
        let (_dir, pool) = pool_with_size(2).await;
        pool.close().await;
        pool.close().await;

        assert!(pool.is_closed());
        assert_eq!(pool.status().idle, 0);
        assert!(matches!(
            pool.session(Affinity::Shared).await,
            Err(DatabaseError::PoolClosed)
        ));
    }

    #[tokio::test]
    async fn test_sessions_returned_during_close_are_discarded() {
        let (_dir, pool) = pool_with_size(4).await;
        let mut sessions = Vec::new();
        for _ in 0..4 {
            sessions.push(pool.session(Affinity::Shared).await.unwrap());
        }

        tokio::join!(pool.close(), async move {
            for session in sessions {
                tokio::task::yield_now().await;
                drop(session);
            }
        });

        let status = pool.status();
        assert_eq!(status.idle, 0);
        assert_eq!(status.in_use, 0);
    }

    #[tokio::test]
    async fn test_release_after_close_keeps_idle_empty() {
        let (_dir, pool) = pool_with_size(2).await;
        let first = pool.session(Affinity::Shared).await.unwrap();
        let second = pool.session(Affinity::Shared).await.unwrap();

        pool.close().await;
        drop(first);
        drop(second);

        assert_eq!(pool.status().idle, 0);
        assert!(pool.is_closed());
    }

    #[tokio::test]
    async fn test_unpooled_connect_keeps_no_seed() {
        let dir = tempfile::tempdir().unwrap();
        let config = DatabaseConfig::new(dir.path()).with_pool_size(-1);
        let pool = Pool::connect(&config).await.unwrap();

        assert!(!pool.is_pooled());
        assert_eq!(pool.status().idle, 0);

        let mut session = pool.session(Affinity::Shared).await.unwrap();
        let one: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&mut *session)
            .await
            .unwrap();
        assert_eq!(one, 1);
    }

    #[tokio::test]
    async fn test_new_without_pooling_drops_seed() {
        let dir = tempfile::tempdir().unwrap();
        let options = DatabaseConfig::new(dir.path()).store_options().unwrap();
        tokio::fs::create_dir_all(&options.data_dir).await.unwrap();
        let seed = options.dial().await.unwrap();

        let pool = Pool::new(seed, options, 0);
        assert_eq!(pool.status().idle, 0);
        assert_eq!(pool.status().max_size, 0);
    }

    #[tokio::test]
    async fn test_databases_are_attached_as_files() {
        let (dir, pool) = pool_with_size(1).await;
        let mut session = pool.session(Affinity::Shared).await.unwrap();

        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM pragma_database_list")
            .fetch_all(&mut *session)
            .await
            .unwrap();
        assert!(names.contains(&"rank".to_string()));
        assert!(dir.path().join("rank.db").exists());
    }
}
