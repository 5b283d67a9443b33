//! # SQLite Database methods
//!
//! This module contains "low-level" SQLite database interactions.
//!
//! All these interaction are maintained by simple functions (rather than stateful structs) that accept a
//! `&mut SqliteConnection` argument. Callers can obtain a connection from a pool,
//! or create an atomic transaction as the need arises and call through to the functions without any other changes.
//!
//! Status changes are written as compare-and-set updates (`... WHERE status = <expected>`) and report whether a row
//! was changed, so callers can detect that they lost a race.
//!
//! Single-row queries are read with `fetch_all` and unpacked with [`first_row`] or [`optional_row`]. SQLite only
//! finishes a statement once it has been stepped to the end, and an unfinished statement keeps its read snapshot
//! (or, for `INSERT ... RETURNING`, its write lock) open on the pooled connection.
use std::{env, str::FromStr, time::Duration};

use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

pub mod demands;
pub mod listings;
pub mod notifications;
pub mod proposals;
pub mod references;
pub mod transactions;
pub mod users;
pub mod weights;

const SQLITE_DB_URL: &str = "sqlite://data/cattle.db";
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);
const WRITER_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

pub fn db_url() -> String {
    let result = env::var("CMS_DATABASE_URL").unwrap_or_else(|_| {
        info!("🗃️ CMS_DATABASE_URL is not set. Using the default.");
        SQLITE_DB_URL.to_string()
    });
    info!("🗃️ Using database URL: {result}");
    result
}

fn connect_options(url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(BUSY_TIMEOUT);
    Ok(options)
}

/// The read pool. Readers never block the writer in WAL mode.
pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new().max_connections(max_connections).connect_with(connect_options(url)?).await?;
    Ok(pool)
}

/// The write pool holds exactly one connection, so every mutation queues for it and no transaction can start on a
/// snapshot that another connection has since written past.
pub async fn new_writer_pool(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .acquire_timeout(WRITER_ACQUIRE_TIMEOUT)
        .connect_with(connect_options(url)?)
        .await?;
    Ok(pool)
}

pub fn first_row<T>(rows: Vec<T>) -> Result<T, sqlx::Error> {
    rows.into_iter().next().ok_or(sqlx::Error::RowNotFound)
}

pub fn optional_row<T>(rows: Vec<T>) -> Option<T> {
    rows.into_iter().next()
}
