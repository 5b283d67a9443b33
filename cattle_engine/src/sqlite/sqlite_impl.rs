//! `SqliteDatabase` is a concrete implementation of a cattle marketplace backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`]
//! module.
//!
//! Every state transition runs inside a single SQLite transaction. Mutations all go through a write pool holding one
//! connection, so two requests racing on the same listing queue up rather than failing with `SQLITE_BUSY`. Reads use
//! a separate pool. The status updates themselves are compare-and-set, so a request that loses the race sees the new
//! state and fails cleanly.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{
    db_url,
    demands,
    listings,
    new_pool,
    new_writer_pool,
    notifications,
    proposals,
    references,
    transactions,
    users,
    weights,
};
use crate::{
    db_types::{
        CustomCity,
        Demand,
        DemandId,
        Listing,
        ListingId,
        ListingStatus,
        NewDemand,
        NewListing,
        NewNotification,
        NewProposal,
        NewTransaction,
        NewUserAccount,
        NewWeightEntry,
        Notification,
        Proposal,
        ProposalId,
        ProposalStatus,
        References,
        Settlement,
        Transaction,
        TransactionId,
        UserAccount,
        WeightEntry,
        YieldRate,
    },
    helpers::{settle, weight_summary},
    traits::{
        ListingManagement,
        MarketplaceDatabase,
        MarketplaceError,
        NotificationManagement,
        ProposalUpdate,
        ReferenceData,
        SettlementTerms,
        UserApiError,
        UserManagement,
        WeighingResult,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
    writer: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let writer = new_writer_pool(url).await?;
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool, writer })
    }

    /// Applies any outstanding schema migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.writer).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), sqlx::Error> {
        self.pool.close().await;
        self.writer.close().await;
        Ok(())
    }
}

async fn require_listing(
    id: &ListingId,
    conn: &mut sqlx::SqliteConnection,
) -> Result<Listing, MarketplaceError> {
    listings::fetch_listing(id, conn).await?.ok_or_else(|| MarketplaceError::ListingNotFound(id.clone()))
}

async fn require_proposal(
    id: &ProposalId,
    conn: &mut sqlx::SqliteConnection,
) -> Result<Proposal, MarketplaceError> {
    proposals::fetch_proposal(id, conn).await?.ok_or_else(|| MarketplaceError::ProposalNotFound(id.clone()))
}

fn require_owner(listing: &Listing, actor: &str) -> Result<(), MarketplaceError> {
    if listing.is_owned_by(actor) {
        Ok(())
    } else {
        Err(MarketplaceError::Forbidden(format!("{actor} does not own listing {}", listing.id)))
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_proposal(&self, proposal: NewProposal) -> Result<Proposal, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let listing = require_listing(&proposal.listing_id, &mut tx).await?;
        if listing.status != ListingStatus::Open {
            return Err(MarketplaceError::listing_state(&listing.id, listing.status, "It is not accepting offers."));
        }
        let proposal = proposals::insert_proposal(proposal, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Proposal {} for listing {} saved", proposal.id, proposal.listing_id);
        Ok(proposal)
    }

    async fn fetch_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(proposals::fetch_proposal(id, &mut conn).await?)
    }

    async fn fetch_proposals_for_owner(&self, owner: &str) -> Result<Vec<Proposal>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(proposals::fetch_proposals_for_owner(owner, &mut conn).await?)
    }

    async fn fetch_proposals_for_buyer(&self, buyer: &str) -> Result<Vec<Proposal>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(proposals::fetch_proposals_for_buyer(buyer, &mut conn).await?)
    }

    async fn accept_proposal(&self, id: &ProposalId, owner: &str) -> Result<ProposalUpdate, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let proposal = require_proposal(id, &mut tx).await?;
        let listing = require_listing(&proposal.listing_id, &mut tx).await?;
        require_owner(&listing, owner)?;
        if proposal.status != ProposalStatus::Pending {
            return Err(MarketplaceError::proposal_state(id, proposal.status, "Only pending proposals can be accepted."));
        }
        if !proposals::update_status(id, ProposalStatus::Pending, ProposalStatus::Accepted, &mut tx).await? {
            return Err(MarketplaceError::InvalidState(format!("Proposal {id} changed while it was being accepted")));
        }
        if !listings::reserve_for_buyer(&listing.id, &proposal.buyer, &mut tx).await? {
            // Dropping the transaction rolls back the proposal update
            return Err(MarketplaceError::listing_state(
                &listing.id,
                listing.status,
                "Another proposal has already been accepted.",
            ));
        }
        let proposal = require_proposal(id, &mut tx).await?;
        let listing = require_listing(&listing.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Proposal {id} accepted. Listing {} is awaiting payment from {}", listing.id, proposal.buyer);
        Ok(ProposalUpdate { proposal, listing })
    }

    async fn reject_proposal(&self, id: &ProposalId, owner: &str) -> Result<Proposal, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let proposal = require_proposal(id, &mut tx).await?;
        let listing = require_listing(&proposal.listing_id, &mut tx).await?;
        require_owner(&listing, owner)?;
        if !proposals::update_status(id, ProposalStatus::Pending, ProposalStatus::Rejected, &mut tx).await? {
            return Err(MarketplaceError::proposal_state(id, proposal.status, "Only pending proposals can be rejected."));
        }
        let proposal = require_proposal(id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Proposal {id} rejected");
        Ok(proposal)
    }

    async fn pay_for_proposal(&self, id: &ProposalId, buyer: &str) -> Result<ProposalUpdate, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let proposal = require_proposal(id, &mut tx).await?;
        if proposal.buyer != buyer {
            return Err(MarketplaceError::Forbidden(format!("Proposal {id} was not made by {buyer}")));
        }
        let listing = require_listing(&proposal.listing_id, &mut tx).await?;
        if proposal.status != ProposalStatus::Accepted {
            return Err(MarketplaceError::proposal_state(id, proposal.status, "Only accepted proposals can be paid."));
        }
        let moved = listings::update_status(
            &listing.id,
            ListingStatus::AwaitingPayment,
            ListingStatus::Sold,
            &mut tx,
        )
        .await?;
        if !moved {
            return Err(MarketplaceError::listing_state(&listing.id, listing.status, "It is not awaiting payment."));
        }
        if !proposals::update_status(id, ProposalStatus::Accepted, ProposalStatus::Paid, &mut tx).await? {
            return Err(MarketplaceError::InvalidState(format!("Proposal {id} changed while it was being paid")));
        }
        let proposal = require_proposal(id, &mut tx).await?;
        let listing = require_listing(&listing.id, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Deposit for proposal {id} paid. Listing {} is sold", listing.id);
        Ok(ProposalUpdate { proposal, listing })
    }

    async fn insert_weight_entry(
        &self,
        listing_id: &ListingId,
        owner: &str,
        entry: NewWeightEntry,
    ) -> Result<WeighingResult, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let listing = require_listing(listing_id, &mut tx).await?;
        require_owner(&listing, owner)?;
        if !matches!(listing.status, ListingStatus::AwaitingPayment | ListingStatus::Sold) {
            return Err(MarketplaceError::listing_state(
                listing_id,
                listing.status,
                "Weights can only be recorded once a proposal has been accepted.",
            ));
        }
        let entry = weights::insert_weight_entry(listing_id, owner, entry, &mut tx).await?;
        let total_weighed = weights::total_weighed(listing_id, &mut tx).await?;
        tx.commit().await?;
        let remaining = listing.quantity - total_weighed;
        trace!("🗃️ Batch {} recorded for listing {listing_id}. {total_weighed} weighed", entry.batch_number);
        Ok(WeighingResult { listing, entry, total_weighed, remaining })
    }

    async fn fetch_weight_entries(&self, listing_id: &ListingId) -> Result<Vec<WeightEntry>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(weights::fetch_weight_entries(listing_id, &mut conn).await?)
    }

    async fn finalize_listing(
        &self,
        listing_id: &ListingId,
        owner: &str,
        terms: SettlementTerms,
    ) -> Result<Transaction, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let listing = require_listing(listing_id, &mut tx).await?;
        require_owner(&listing, owner)?;
        let proposal = proposals::fetch_paid_proposal(listing_id, &mut tx).await?.ok_or_else(|| {
            MarketplaceError::InvalidState(format!("Listing {listing_id} has no paid proposal to settle"))
        })?;
        if listing.status != ListingStatus::Sold {
            return Err(MarketplaceError::listing_state(listing_id, listing.status, "Only sold listings can be settled."));
        }
        let entries = weights::fetch_weight_entries(listing_id, &mut tx).await?;
        let settlement = if entries.is_empty() {
            Settlement::DeadWeight
        } else {
            let total_mass = entries.iter().map(|e| e.total_weight).sum::<f64>();
            let amounts =
                settle(total_mass, terms.yield_rate, proposal.price_offer, terms.transport_fee, terms.funrural_tax);
            trace!("🗃️ Live weight settlement for {listing_id}: {:?}", weight_summary(&entries));
            Settlement::LiveWeight(amounts)
        };
        let new_tx = NewTransaction {
            id: TransactionId::random(),
            listing_id: listing_id.clone(),
            proposal_id: proposal.id.clone(),
            buyer: proposal.buyer.clone(),
            seller: listing.owner.clone(),
            nfe_document: terms.nfe_document,
            gta_document: terms.gta_document,
            transport_fee: terms.transport_fee,
            funrural_tax: terms.funrural_tax,
            price_per_unit: proposal.price_offer,
            settlement,
        };
        let transaction = transactions::insert_transaction(new_tx, &mut tx).await?;
        if !listings::mark_completed(listing_id, &transaction.id, &mut tx).await? {
            return Err(MarketplaceError::InvalidState(format!("Listing {listing_id} changed while being settled")));
        }
        tx.commit().await?;
        debug!("🗃️ Listing {listing_id} settled in transaction {} ({})", transaction.id, transaction.status);
        Ok(transaction)
    }

    async fn fetch_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_transaction(id, &mut conn).await?)
    }

    async fn fetch_transaction_for_listing(
        &self,
        listing_id: &ListingId,
    ) -> Result<Option<Transaction>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(transactions::fetch_transaction_for_listing(listing_id, &mut conn).await?)
    }

    async fn complete_slaughterhouse_settlement(
        &self,
        id: &TransactionId,
        final_weight: f64,
        yield_rate: YieldRate,
        price_per_unit: f64,
    ) -> Result<Transaction, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let existing = transactions::fetch_transaction(id, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::TransactionNotFound(id.to_string()))?;
        if existing.is_complete() {
            return Err(MarketplaceError::InvalidState(format!("Transaction {id} has already been completed")));
        }
        let amounts = settle(final_weight, yield_rate, price_per_unit, existing.transport_fee, existing.funrural_tax);
        let transaction = transactions::complete_dead_weight(id, amounts, price_per_unit, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::InvalidState(format!("Transaction {id} changed while being completed")))?;
        tx.commit().await?;
        debug!("🗃️ Slaughterhouse weight recorded for transaction {id}. Final amount: {:?}", transaction.final_amount);
        Ok(transaction)
    }
}

impl ListingManagement for SqliteDatabase {
    async fn insert_listing(&self, owner: &str, listing: NewListing) -> Result<Listing, MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        let listing = listings::insert_listing(owner, listing, &mut conn).await?;
        debug!("🗃️ Listing {} ({} x {}) saved for {owner}", listing.id, listing.quantity, listing.breed);
        Ok(listing)
    }

    async fn insert_demand(&self, owner: &str, demand: NewDemand) -> Result<Demand, MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        let demand = demands::insert_demand(owner, demand, &mut conn).await?;
        debug!("🗃️ Demand {} ({} x {}) saved for {owner}", demand.id, demand.quantity, demand.breed);
        Ok(demand)
    }

    async fn fetch_listing(&self, id: &ListingId) -> Result<Option<Listing>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(listings::fetch_listing(id, &mut conn).await?)
    }

    async fn fetch_open_listings(&self) -> Result<Vec<Listing>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(listings::fetch_listings_with_status(ListingStatus::Open, &mut conn).await?)
    }

    async fn fetch_open_demands(&self) -> Result<Vec<Demand>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(demands::fetch_open_demands(&mut conn).await?)
    }

    async fn fetch_listings_for_owner(&self, owner: &str) -> Result<Vec<Listing>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(listings::fetch_listings_for_owner(owner, &mut conn).await?)
    }

    async fn fetch_demands_for_owner(&self, owner: &str) -> Result<Vec<Demand>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(demands::fetch_demands_for_owner(owner, &mut conn).await?)
    }

    async fn fetch_all_listings(&self) -> Result<Vec<Listing>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(listings::fetch_all_listings(&mut conn).await?)
    }

    async fn fetch_all_demands(&self) -> Result<Vec<Demand>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(demands::fetch_all_demands(&mut conn).await?)
    }

    async fn record_internal_weight(
        &self,
        id: &ListingId,
        owner: &str,
        estimated_weight: f64,
    ) -> Result<Listing, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let listing = require_listing(id, &mut tx).await?;
        require_owner(&listing, owner)?;
        let listing = listings::record_internal_weight(id, estimated_weight, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::ListingNotFound(id.clone()))?;
        tx.commit().await?;
        Ok(listing)
    }

    async fn record_advance_request(
        &self,
        id: &ListingId,
        owner: &str,
        pauta_value: f64,
    ) -> Result<Listing, MarketplaceError> {
        let mut tx = self.writer.begin().await?;
        let listing = require_listing(id, &mut tx).await?;
        require_owner(&listing, owner)?;
        let listing = listings::record_advance_request(id, pauta_value, &mut tx)
            .await?
            .ok_or_else(|| MarketplaceError::ListingNotFound(id.clone()))?;
        tx.commit().await?;
        Ok(listing)
    }

    async fn delete_listing(&self, id: &ListingId) -> Result<bool, MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        Ok(listings::delete_listing(id, &mut conn).await?)
    }

    async fn delete_demand(&self, id: &DemandId) -> Result<bool, MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        Ok(demands::delete_demand(id, &mut conn).await?)
    }
}

impl NotificationManagement for SqliteDatabase {
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        Ok(notifications::insert_notification(notification, &mut conn).await?)
    }

    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(notifications::fetch_notifications_for_user(user_id, &mut conn).await?)
    }

    async fn fetch_recent_notifications(&self, limit: i64) -> Result<Vec<Notification>, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        Ok(notifications::fetch_recent_notifications(limit, &mut conn).await?)
    }
}

impl ReferenceData for SqliteDatabase {
    async fn fetch_references(&self) -> Result<References, MarketplaceError> {
        let mut conn = self.pool.acquire().await?;
        let breeds = references::fetch_breeds(&mut conn).await?;
        let custom_cities = references::fetch_custom_cities(&mut conn).await?;
        Ok(References { breeds, custom_cities })
    }

    async fn insert_breed(&self, name: &str) -> Result<(), MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        Ok(references::insert_breed(name, &mut conn).await?)
    }

    async fn delete_breed(&self, name: &str) -> Result<bool, MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        Ok(references::delete_breed(name, &mut conn).await?)
    }

    async fn insert_custom_city(&self, city: &CustomCity) -> Result<(), MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        Ok(references::insert_custom_city(city, &mut conn).await?)
    }

    async fn delete_custom_city(&self, state: &str, name: &str) -> Result<bool, MarketplaceError> {
        let mut conn = self.writer.acquire().await?;
        Ok(references::delete_custom_city(state, name, &mut conn).await?)
    }
}

impl UserManagement for SqliteDatabase {
    async fn create_user(&self, user: NewUserAccount) -> Result<UserAccount, UserApiError> {
        let mut tx = self.writer.begin().await?;
        if users::fetch_user(&user.username, &mut tx).await?.is_some() {
            return Err(UserApiError::UsernameTaken(user.username));
        }
        let user = users::insert_user(user, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ User {} ({}) created", user.username, user.role);
        Ok(user)
    }

    async fn fetch_user(&self, username: &str) -> Result<Option<UserAccount>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_user(username, &mut conn).await?)
    }

    async fn fetch_all_users(&self) -> Result<Vec<UserAccount>, UserApiError> {
        let mut conn = self.pool.acquire().await?;
        Ok(users::fetch_all_users(&mut conn).await?)
    }

    async fn toggle_user_active(&self, username: &str) -> Result<bool, UserApiError> {
        let mut conn = self.writer.acquire().await?;
        users::toggle_active(username, &mut conn).await?.ok_or_else(|| UserApiError::UserNotFound(username.to_string()))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, UserApiError> {
        let mut conn = self.writer.acquire().await?;
        Ok(users::delete_user(username, &mut conn).await?)
    }
}
