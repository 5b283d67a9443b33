use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use super::{first_row, optional_row};
use crate::db_types::{ListingId, NewProposal, Proposal, ProposalId, ProposalStatus};

pub async fn insert_proposal(proposal: NewProposal, conn: &mut SqliteConnection) -> Result<Proposal, sqlx::Error> {
    let now = Utc::now();
    let proposal = sqlx::query_as(
        r#"
            INSERT INTO proposals (
                id,
                listing_id,
                buyer,
                buyer_contact,
                price_offer,
                message,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING *;
        "#,
    )
    .bind(ProposalId::random())
    .bind(proposal.listing_id)
    .bind(proposal.buyer)
    .bind(proposal.buyer_contact)
    .bind(proposal.price_offer)
    .bind(proposal.message)
    .bind(ProposalStatus::Pending)
    .bind(now)
    .fetch_all(conn)
    .await?;
    first_row(proposal)
}

pub async fn fetch_proposal(id: &ProposalId, conn: &mut SqliteConnection) -> Result<Option<Proposal>, sqlx::Error> {
    let proposal = sqlx::query_as("SELECT * FROM proposals WHERE id = $1").bind(id).fetch_all(conn).await?;
    Ok(optional_row(proposal))
}

/// Proposals made against any listing owned by `owner`, newest first
pub async fn fetch_proposals_for_owner(owner: &str, conn: &mut SqliteConnection) -> Result<Vec<Proposal>, sqlx::Error> {
    let proposals = sqlx::query_as(
        r#"SELECT proposals.* FROM proposals JOIN listings ON proposals.listing_id = listings.id
           WHERE listings.owner = $1
           ORDER BY proposals.created_at DESC, proposals.rowid DESC"#,
    )
    .bind(owner)
    .fetch_all(conn)
    .await?;
    Ok(proposals)
}

pub async fn fetch_proposals_for_buyer(buyer: &str, conn: &mut SqliteConnection) -> Result<Vec<Proposal>, sqlx::Error> {
    let proposals = sqlx::query_as("SELECT * FROM proposals WHERE buyer = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(buyer)
        .fetch_all(conn)
        .await?;
    Ok(proposals)
}

/// The proposal whose deposit has been paid for the listing, if any
pub async fn fetch_paid_proposal(
    listing_id: &ListingId,
    conn: &mut SqliteConnection,
) -> Result<Option<Proposal>, sqlx::Error> {
    let proposal = sqlx::query_as("SELECT * FROM proposals WHERE listing_id = $1 AND status = $2 LIMIT 1")
        .bind(listing_id)
        .bind(ProposalStatus::Paid)
        .fetch_all(conn)
        .await?;
    Ok(optional_row(proposal))
}

/// Changes the status of a proposal if, and only if, its current status is `from`.
pub async fn update_status(
    id: &ProposalId,
    from: ProposalStatus,
    to: ProposalStatus,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE proposals SET status = $1, updated_at = $2 WHERE id = $3 AND status = $4")
        .bind(to)
        .bind(Utc::now())
        .bind(id)
        .bind(from)
        .execute(conn)
        .await?;
    trace!("🗃️ Proposal {id} {from} -> {to}: {} rows affected", result.rows_affected());
    Ok(result.rows_affected() == 1)
}
