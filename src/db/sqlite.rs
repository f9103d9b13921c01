use crate::db::models::DbUser;
use crate::db::schema::{SQLITE_INIT, TABLES, statements};
use crate::db::seed::{SeedCredential, SeedSink};
use crate::error::PocketError;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tokio::sync::Mutex;
use tracing::{debug, info};

pub type SqlitePool = Pool<Sqlite>;

/// Outcome of [`Database::ensure_initialized`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bootstrap {
    /// Every expected relation was present; nothing was touched.
    AlreadyInitialized,
    /// The store was wiped, recreated and seeded with this username.
    Created { username: String },
}

/// Handle to the application's SQLite store.
///
/// Constructed once at startup and shared with the components that need it.
/// The underlying pool is opened by [`Database::ensure_initialized`] and
/// released by [`Database::close`]; in between closing and the next bootstrap
/// every operation fails with [`PocketError::StorageClosed`].
pub struct Database {
    connect_opts: SqliteConnectOptions,
    seed_username: String,
    pool: Mutex<Option<SqlitePool>>,
}

impl Database {
    pub fn new(database_url: &str, seed_username: impl Into<String>) -> Result<Self, PocketError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        Ok(Self::with_options(connect_opts, seed_username))
    }

    pub fn with_options(connect_opts: SqliteConnectOptions, seed_username: impl Into<String>) -> Self {
        Self {
            connect_opts,
            seed_username: seed_username.into(),
            pool: Mutex::new(None),
        }
    }

    /// Open the store (creating the file if absent), reusing a live pool.
    pub async fn open(&self) -> Result<SqlitePool, PocketError> {
        let mut guard = self.pool.lock().await;
        if let Some(pool) = guard.as_ref()
            && !pool.is_closed()
        {
            return Ok(pool.clone());
        }

        // One connection: writes are serialized and the schema reset runs on
        // the same connection as the recreate.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(self.connect_opts.clone())
            .await?;
        debug!(filename = %self.connect_opts.get_filename().display(), "storage opened");
        *guard = Some(pool.clone());
        Ok(pool)
    }

    /// The live pool, or `StorageClosed` when the handle is not open.
    pub async fn pool(&self) -> Result<SqlitePool, PocketError> {
        match self.pool.lock().await.as_ref() {
            Some(pool) if !pool.is_closed() => Ok(pool.clone()),
            _ => Err(PocketError::StorageClosed),
        }
    }

    pub async fn is_open(&self) -> bool {
        self.pool().await.is_ok()
    }

    /// Flush and close the pool. Idempotent.
    pub async fn close(&self) {
        let pool = self.pool.lock().await.take();
        if let Some(pool) = pool {
            pool.close().await;
            info!("storage closed");
        }
    }

    /// Make sure the four application relations and the seed credential exist.
    ///
    /// Idempotent when the store is complete. When the number of expected
    /// relations present is anything other than all of them (including a
    /// partial set left by an earlier crash), the whole database is wiped
    /// before the schema is recreated: every other table, view and trigger and
    /// any previously seeded credential is destroyed without confirmation.
    ///
    /// A failure after the wipe leaves the store without a schema; the error
    /// is returned as is.
    pub async fn ensure_initialized(&self, sink: &dyn SeedSink) -> Result<Bootstrap, PocketError> {
        let pool = self.open().await?;

        let existing = count_tables(&pool).await?;
        if existing == TABLES.len() as i64 {
            info!("database already setup");
            return Ok(Bootstrap::AlreadyInitialized);
        }

        info!(
            existing,
            expected = TABLES.len(),
            "schema incomplete; resetting database"
        );
        reset(&pool).await?;

        let seed = SeedCredential::generate(self.seed_username.as_str());
        let now = Utc::now().to_rfc3339();

        let mut tx = pool.begin().await?;
        for stmt in statements(SQLITE_INIT) {
            sqlx::query(stmt).execute(&mut *tx).await?;
        }
        sqlx::query(
            r#"INSERT INTO users (username, password, created_at, updated_at)
               VALUES (?, ?, ?, ?)"#,
        )
        .bind(&seed.username)
        .bind(seed.digest())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        sink.disclose(&seed);
        info!(tables = TABLES.len(), "database initialized");

        Ok(Bootstrap::Created {
            username: seed.username,
        })
    }

    /// Number of the expected relations currently present.
    pub async fn table_count(&self) -> Result<i64, PocketError> {
        let pool = self.pool().await?;
        count_tables(&pool).await
    }

    pub async fn users(&self) -> Result<Vec<DbUser>, PocketError> {
        let pool = self.pool().await?;
        let rows = sqlx::query(
            r#"SELECT id, username, password, created_at, updated_at
               FROM users ORDER BY id"#,
        )
        .fetch_all(&pool)
        .await?;
        rows.into_iter().map(row_to_user).collect()
    }
}

async fn count_tables(pool: &SqlitePool) -> Result<i64, PocketError> {
    let placeholders = vec!["?"; TABLES.len()].join(", ");
    let sql = format!(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name IN ({placeholders})"
    );
    let mut query = sqlx::query_as::<_, (i64,)>(&sql);
    for table in TABLES {
        query = query.bind(table);
    }
    let (count,) = query.fetch_one(pool).await?;
    Ok(count)
}

/// Drop every user schema object, reclaim space and verify the file.
///
/// Foreign key enforcement is suspended for the duration so leftover tables
/// that reference each other can be dropped in any order.
async fn reset(pool: &SqlitePool) -> Result<(), PocketError> {
    sqlx::query("PRAGMA foreign_keys = OFF").execute(pool).await?;
    let wiped = wipe(pool).await;
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;
    wiped
}

async fn wipe(pool: &SqlitePool) -> Result<(), PocketError> {
    let objects: Vec<(String, String)> = sqlx::query_as(
        r#"SELECT type, name FROM sqlite_master
           WHERE type IN ('view', 'trigger', 'table')
             AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
           ORDER BY CASE type WHEN 'view' THEN 0 WHEN 'trigger' THEN 1 ELSE 2 END"#,
    )
    .fetch_all(pool)
    .await?;

    for (kind, name) in &objects {
        let stmt = format!(
            "DROP {} IF EXISTS \"{}\"",
            kind.to_uppercase(),
            name.replace('"', "\"\"")
        );
        sqlx::query(&stmt).execute(pool).await?;
    }
    debug!(dropped = objects.len(), "schema objects dropped");

    // VACUUM cannot run inside a transaction.
    sqlx::query("VACUUM").execute(pool).await?;

    let report: Vec<(String,)> = sqlx::query_as("PRAGMA integrity_check")
        .fetch_all(pool)
        .await?;
    match report.as_slice() {
        [(line,)] if line == "ok" => Ok(()),
        _ => Err(PocketError::Integrity(
            report
                .into_iter()
                .map(|(line,)| line)
                .collect::<Vec<_>>()
                .join("; "),
        )),
    }
}

fn row_to_user(row: SqliteRow) -> Result<DbUser, PocketError> {
    let id: i64 = row.try_get("id")?;
    let username: String = row.try_get("username")?;
    let password: String = row.try_get("password")?;
    let created_at: String = row.try_get("created_at")?;
    let updated_at: String = row.try_get("updated_at")?;

    Ok(DbUser {
        id,
        username,
        password,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
    })
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>, PocketError> {
    Ok(DateTime::parse_from_rfc3339(s)
        .map_err(|e| sqlx::Error::Decode(Box::new(e)))?
        .with_timezone(&Utc))
}
