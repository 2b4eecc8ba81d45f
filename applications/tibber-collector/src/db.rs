use crate::error::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

pub type DbPool = Pool<Sqlite>;

/// Opens the database read-write, creating the file on first run.
/// SQLite is single-writer, so the pool is capped at one connection;
/// the query API opens the same file read-only.
pub async fn connect(path: &str) -> Result<DbPool> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;

    Ok(pool)
}

pub async fn init_schema(pool: &DbPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS hourly_consumption (
            from_time TEXT NOT NULL,
            to_time TEXT NOT NULL,
            consumption REAL,
            consumption_unit TEXT,
            cost REAL,
            unit_price REAL,
            unit_price_vat REAL,
            currency TEXT,
            PRIMARY KEY (from_time, to_time)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS daily_consumption (
            date TEXT PRIMARY KEY,
            total_consumption REAL,
            total_cost REAL,
            avg_unit_price REAL,
            currency TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS monthly_consumption (
            year INTEGER,
            month INTEGER,
            total_consumption REAL,
            total_cost REAL,
            avg_unit_price REAL,
            currency TEXT,
            PRIMARY KEY (year, month)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
