//! SQLite-backed entity store.
//!
//! The store is the only authoritative shared state. Mutating passes
//! (order submission, cancellation, admin flows) take the `write_lock` so a
//! matching pass and its settlements see a stable book and commit as one
//! transaction; read-only projections go straight to the pool.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, SqlitePool};
use tokio::sync::{Mutex, MutexGuard};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        ticker        TEXT PRIMARY KEY,
        name          TEXT NOT NULL,
        total_shares  INTEGER NOT NULL CHECK (total_shares > 0),
        float_shares  INTEGER NOT NULL CHECK (float_shares >= 0),
        CHECK (float_shares <= total_shares)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS accounts (
        id                  TEXT PRIMARY KEY,
        api_key_hash        TEXT NOT NULL UNIQUE,
        cash_balance_cents  INTEGER NOT NULL DEFAULT 0 CHECK (cash_balance_cents >= 0),
        created_at          TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS holdings (
        account_id        TEXT NOT NULL REFERENCES accounts (id),
        ticker            TEXT NOT NULL REFERENCES companies (ticker),
        quantity          INTEGER NOT NULL CHECK (quantity > 0),
        cost_basis_cents  INTEGER NOT NULL DEFAULT 0 CHECK (cost_basis_cents >= 0),
        PRIMARY KEY (account_id, ticker)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS orders (
        id                  TEXT PRIMARY KEY,
        account_id          TEXT NOT NULL REFERENCES accounts (id),
        ticker              TEXT NOT NULL REFERENCES companies (ticker),
        side                TEXT NOT NULL CHECK (side IN ('BUY', 'SELL')),
        order_type          TEXT NOT NULL CHECK (order_type IN ('LIMIT', 'MARKET')),
        price_cents         INTEGER CHECK (price_cents IS NULL OR price_cents > 0),
        quantity            INTEGER NOT NULL CHECK (quantity > 0),
        remaining_quantity  INTEGER NOT NULL
            CHECK (remaining_quantity >= 0 AND remaining_quantity <= quantity),
        status              TEXT NOT NULL
            CHECK (status IN ('OPEN', 'PARTIAL', 'FILLED', 'CANCELLED')),
        timestamp           TEXT NOT NULL,
        CHECK (price_cents IS NOT NULL OR order_type = 'MARKET')
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_orders_book
         ON orders (ticker, side, status, price_cents, timestamp)",
    r#"
    CREATE TABLE IF NOT EXISTS trades (
        id             TEXT PRIMARY KEY,
        ticker         TEXT NOT NULL REFERENCES companies (ticker),
        price_cents    INTEGER NOT NULL CHECK (price_cents > 0),
        quantity       INTEGER NOT NULL CHECK (quantity > 0),
        buyer_id       TEXT NOT NULL REFERENCES accounts (id),
        seller_id      TEXT NOT NULL REFERENCES accounts (id),
        buy_order_id   TEXT NOT NULL REFERENCES orders (id),
        sell_order_id  TEXT NOT NULL REFERENCES orders (id),
        timestamp      TEXT NOT NULL,
        CHECK (buyer_id <> seller_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_trades_ticker_time ON trades (ticker, timestamp)",
];

const TABLES: &[&str] = &["trades", "orders", "holdings", "accounts", "companies"];

pub struct Database {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl Database {
    /// Open (creating if missing) the database at `url` and ensure the
    /// schema exists.
    pub async fn connect(url: &str, sql_echo: bool) -> Result<Self, sqlx::Error> {
        let level = if sql_echo {
            log::LevelFilter::Info
        } else {
            log::LevelFilter::Debug
        };
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(level);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            write_lock: Mutex::new(()),
        };
        db.init_schema().await?;
        Ok(db)
    }

    /// Private in-memory database on a single connection; used by the test
    /// suite and throwaway tooling.
    pub async fn in_memory() -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            write_lock: Mutex::new(()),
        };
        db.init_schema().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Serialize mutating passes. Held for the duration of a submission or
    /// cancellation, including all of its fills.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    /// Drop and recreate every table.
    pub async fn reset(&self) -> Result<(), sqlx::Error> {
        let _guard = self.lock_writes().await;
        for table in TABLES {
            sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
                .execute(&self.pool)
                .await?;
        }
        self.init_schema().await
    }

    async fn init_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

/// True when `err` is a unique-constraint violation, used to turn raw
/// integrity errors into duplicate-key responses.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation)
    )
}
