use chrono::Utc;
use sqlx::SqliteConnection;

use super::{first_row, optional_row};
use crate::db_types::{
    ListingId,
    NewTransaction,
    Settlement,
    SettlementAmounts,
    Transaction,
    TransactionId,
    TransactionStatus,
};

const DEAD_WEIGHT_NOTE: &str = "Waiting for slaughterhouse weighing";

pub async fn insert_transaction(tx: NewTransaction, conn: &mut SqliteConnection) -> Result<Transaction, sqlx::Error> {
    let now = Utc::now();
    let (amounts, status, note, completed_at) = match tx.settlement {
        Settlement::LiveWeight(amounts) => (Some(amounts), TransactionStatus::Completed, None, Some(now)),
        Settlement::DeadWeight => {
            (None, TransactionStatus::AwaitingSlaughterhouseWeight, Some(DEAD_WEIGHT_NOTE), None)
        },
    };
    let transaction = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                id,
                listing_id,
                proposal_id,
                buyer,
                seller,
                nfe_document,
                gta_document,
                transport_fee,
                funrural_tax,
                total_weight,
                at_quantity,
                yield_rate,
                price_per_unit,
                gross_amount,
                final_amount,
                status,
                note,
                created_at,
                completed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *;
        "#,
    )
    .bind(tx.id)
    .bind(tx.listing_id)
    .bind(tx.proposal_id)
    .bind(tx.buyer)
    .bind(tx.seller)
    .bind(tx.nfe_document)
    .bind(tx.gta_document)
    .bind(tx.transport_fee)
    .bind(tx.funrural_tax)
    .bind(amounts.map(|a| a.total_weight))
    .bind(amounts.map(|a| a.at_quantity))
    .bind(amounts.map(|a| a.yield_rate))
    .bind(tx.price_per_unit)
    .bind(amounts.map(|a| a.gross_amount))
    .bind(amounts.map(|a| a.final_amount))
    .bind(status)
    .bind(note)
    .bind(now)
    .bind(completed_at)
    .fetch_all(conn)
    .await?;
    first_row(transaction)
}

pub async fn fetch_transaction(
    id: &TransactionId,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let transaction = sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_all(conn).await?;
    Ok(optional_row(transaction))
}

pub async fn fetch_transaction_for_listing(
    listing_id: &ListingId,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let transaction = sqlx::query_as("SELECT * FROM transactions WHERE listing_id = $1")
        .bind(listing_id)
        .fetch_all(conn)
        .await?;
    Ok(optional_row(transaction))
}

/// Fills in the slaughterhouse weighing for a transaction that is waiting for it, and marks it as completed.
/// Returns `None` if the transaction does not exist or is not waiting for a slaughterhouse weight.
pub async fn complete_dead_weight(
    id: &TransactionId,
    amounts: SettlementAmounts,
    price_per_unit: f64,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, sqlx::Error> {
    let transaction = sqlx::query_as(
        r#"
            UPDATE transactions SET
                slaughterhouse_weight = $1,
                at_quantity = $2,
                yield_rate = $3,
                price_per_unit = $4,
                gross_amount = $5,
                final_amount = $6,
                status = $7,
                note = NULL,
                completed_at = $8
            WHERE id = $9 AND status = $10
            RETURNING *;
        "#,
    )
    .bind(amounts.total_weight)
    .bind(amounts.at_quantity)
    .bind(amounts.yield_rate)
    .bind(price_per_unit)
    .bind(amounts.gross_amount)
    .bind(amounts.final_amount)
    .bind(TransactionStatus::Completed)
    .bind(Utc::now())
    .bind(id)
    .bind(TransactionStatus::AwaitingSlaughterhouseWeight)
    .fetch_all(conn)
    .await?;
    Ok(optional_row(transaction))
}
