use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use super::{first_row, optional_row};
use crate::db_types::{AdvancePaymentStatus, Listing, ListingId, ListingStatus, NewListing, TransactionId};

/// Inserts a new `OPEN` listing. This is not atomic on its own. Embed the call in a transaction and pass `&mut *tx` as
/// the connection if you need it to be.
pub async fn insert_listing(owner: &str, listing: NewListing, conn: &mut SqliteConnection) -> Result<Listing, sqlx::Error> {
    let now = Utc::now();
    let listing = sqlx::query_as(
        r#"
            INSERT INTO listings (
                id,
                owner,
                breed,
                quantity,
                city,
                state,
                average_weight,
                price,
                photo,
                nfe_file,
                gta_file,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $13)
            RETURNING *;
        "#,
    )
    .bind(ListingId::random())
    .bind(owner)
    .bind(listing.breed)
    .bind(listing.quantity)
    .bind(listing.city)
    .bind(listing.state)
    .bind(listing.average_weight)
    .bind(listing.price)
    .bind(listing.photo)
    .bind(listing.nfe_file)
    .bind(listing.gta_file)
    .bind(ListingStatus::Open)
    .bind(now)
    .fetch_all(conn)
    .await?;
    first_row(listing)
}

pub async fn fetch_listing(id: &ListingId, conn: &mut SqliteConnection) -> Result<Option<Listing>, sqlx::Error> {
    let listing = sqlx::query_as("SELECT * FROM listings WHERE id = $1").bind(id).fetch_all(conn).await?;
    Ok(optional_row(listing))
}

/// Listings with the given status, newest first
pub async fn fetch_listings_with_status(
    status: ListingStatus,
    conn: &mut SqliteConnection,
) -> Result<Vec<Listing>, sqlx::Error> {
    let listings = sqlx::query_as("SELECT * FROM listings WHERE status = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(status)
        .fetch_all(conn)
        .await?;
    Ok(listings)
}

/// Listings for the given owner, newest first
pub async fn fetch_listings_for_owner(owner: &str, conn: &mut SqliteConnection) -> Result<Vec<Listing>, sqlx::Error> {
    let listings = sqlx::query_as("SELECT * FROM listings WHERE owner = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(owner)
        .fetch_all(conn)
        .await?;
    Ok(listings)
}

pub async fn fetch_all_listings(conn: &mut SqliteConnection) -> Result<Vec<Listing>, sqlx::Error> {
    let listings = sqlx::query_as("SELECT * FROM listings ORDER BY created_at DESC, rowid DESC").fetch_all(conn).await?;
    Ok(listings)
}

/// Moves an `OPEN` listing to `AWAITING_PAYMENT` and records the buyer. Returns `false` if the listing was not `OPEN`.
pub async fn reserve_for_buyer(id: &ListingId, buyer: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE listings SET status = $1, buyer = $2, updated_at = $3 WHERE id = $4 AND status = $5",
    )
    .bind(ListingStatus::AwaitingPayment)
    .bind(buyer)
    .bind(Utc::now())
    .bind(id)
    .bind(ListingStatus::Open)
    .execute(conn)
    .await?;
    trace!("🗃️ Reserve listing {id} for {buyer}: {} rows affected", result.rows_affected());
    Ok(result.rows_affected() == 1)
}

/// Changes the status of a listing if, and only if, its current status is `from`.
pub async fn update_status(
    id: &ListingId,
    from: ListingStatus,
    to: ListingStatus,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE listings SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4")
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .execute(conn)
        .await?;
    trace!("🗃️ Listing {id} {from} -> {to}: {} rows affected", result.rows_affected());
    Ok(result.rows_affected() == 1)
}

/// Moves a `SOLD` listing to `COMPLETED` and links the settlement transaction.
pub async fn mark_completed(
    id: &ListingId,
    transaction_id: &TransactionId,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE listings SET status = $1, transaction_id = $2, updated_at = $3 WHERE id = $4 AND status = $5",
    )
    .bind(ListingStatus::Completed)
    .bind(transaction_id)
    .bind(Utc::now())
    .bind(id)
    .bind(ListingStatus::Sold)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn record_internal_weight(
    id: &ListingId,
    estimated_weight: f64,
    conn: &mut SqliteConnection,
) -> Result<Option<Listing>, sqlx::Error> {
    let now = Utc::now();
    let listing = sqlx::query_as(
        r#"UPDATE listings SET internal_estimated_weight = $1, internal_weight_recorded_at = $2, updated_at = $2
           WHERE id = $3 RETURNING *"#,
    )
    .bind(estimated_weight)
    .bind(now)
    .bind(id)
    .fetch_all(conn)
    .await?;
    Ok(optional_row(listing))
}

pub async fn record_advance_request(
    id: &ListingId,
    pauta_value: f64,
    conn: &mut SqliteConnection,
) -> Result<Option<Listing>, sqlx::Error> {
    let now = Utc::now();
    let listing = sqlx::query_as(
        r#"UPDATE listings SET pauta_value_requested = $1, advance_payment_status = $2, advance_requested_at = $3,
           updated_at = $3 WHERE id = $4 RETURNING *"#,
    )
    .bind(pauta_value)
    .bind(AdvancePaymentStatus::Pending)
    .bind(now)
    .bind(id)
    .fetch_all(conn)
    .await?;
    Ok(optional_row(listing))
}

pub async fn delete_listing(id: &ListingId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM listings WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
