use chrono::Utc;
use sqlx::SqliteConnection;

use super::first_row;
use crate::db_types::{ListingId, NewWeightEntry, WeightEntry};

pub async fn insert_weight_entry(
    listing_id: &ListingId,
    recorded_by: &str,
    entry: NewWeightEntry,
    conn: &mut SqliteConnection,
) -> Result<WeightEntry, sqlx::Error> {
    let timestamp = entry.timestamp.unwrap_or_else(Utc::now);
    let entry = sqlx::query_as(
        r#"
            INSERT INTO weight_entries (listing_id, batch_number, quantity, total_weight, recorded_by, timestamp)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(listing_id)
    .bind(entry.batch_number)
    .bind(entry.quantity)
    .bind(entry.total_weight)
    .bind(recorded_by)
    .bind(timestamp)
    .fetch_all(conn)
    .await?;
    first_row(entry)
}

/// All weighing records for the listing, in the order they were recorded
pub async fn fetch_weight_entries(
    listing_id: &ListingId,
    conn: &mut SqliteConnection,
) -> Result<Vec<WeightEntry>, sqlx::Error> {
    let entries = sqlx::query_as("SELECT * FROM weight_entries WHERE listing_id = $1 ORDER BY id ASC")
        .bind(listing_id)
        .fetch_all(conn)
        .await?;
    Ok(entries)
}

/// The number of head weighed so far for the listing
pub async fn total_weighed(listing_id: &ListingId, conn: &mut SqliteConnection) -> Result<i64, sqlx::Error> {
    let total = sqlx::query_scalar("SELECT COALESCE(SUM(quantity), 0) FROM weight_entries WHERE listing_id = $1")
        .bind(listing_id)
        .fetch_all(conn)
        .await?;
    first_row(total)
}
