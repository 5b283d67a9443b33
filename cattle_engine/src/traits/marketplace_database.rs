use thiserror::Error;

use crate::{
    db_types::{
        ListingId,
        ListingStatus,
        NewProposal,
        NewWeightEntry,
        Proposal,
        ProposalId,
        ProposalStatus,
        Transaction,
        TransactionId,
        WeightEntry,
        YieldRate,
    },
    traits::{
        data_objects::{ProposalUpdate, SettlementTerms, WeighingResult},
        ListingManagement,
        NotificationManagement,
        UserApiError,
    },
};

/// Errors raised by the marketplace lifecycle, listing, notification and reference operations.
#[derive(Debug, Clone, Error)]
pub enum MarketplaceError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Listing {0} does not exist")]
    ListingNotFound(ListingId),
    #[error("Demand {0} does not exist")]
    DemandNotFound(String),
    #[error("Proposal {0} does not exist")]
    ProposalNotFound(ProposalId),
    #[error("Transaction {0} does not exist")]
    TransactionNotFound(String),
    #[error("User {0} does not exist")]
    UserNotFound(String),
    #[error("Forbidden. {0}")]
    Forbidden(String),
    #[error("Listing {id} is {status}. {reason}")]
    InvalidListingState { id: ListingId, status: ListingStatus, reason: String },
    #[error("Proposal {id} is {status}. {reason}")]
    InvalidProposalState { id: ProposalId, status: ProposalStatus, reason: String },
    #[error("Invalid state. {0}")]
    InvalidState(String),
    #[error("Invalid input. {0}")]
    InvalidInput(String),
}

/// The broad class of a [`MarketplaceError`]. Callers (like the HTTP server) use this to decide how to report an
/// error without having to match on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    InvalidInput,
    Backend,
}

impl MarketplaceError {
    pub fn kind(&self) -> ErrorKind {
        use MarketplaceError::*;
        match self {
            DatabaseError(_) => ErrorKind::Backend,
            ListingNotFound(_) | DemandNotFound(_) | ProposalNotFound(_) | TransactionNotFound(_) | UserNotFound(_) => {
                ErrorKind::NotFound
            },
            Forbidden(_) => ErrorKind::Forbidden,
            InvalidListingState { .. } | InvalidProposalState { .. } | InvalidState(_) => ErrorKind::InvalidState,
            InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub fn listing_state(id: &ListingId, status: ListingStatus, reason: &str) -> Self {
        Self::InvalidListingState { id: id.clone(), status, reason: reason.to_string() }
    }

    pub fn proposal_state(id: &ProposalId, status: ProposalStatus, reason: &str) -> Self {
        Self::InvalidProposalState { id: id.clone(), status, reason: reason.to_string() }
    }
}

impl From<sqlx::Error> for MarketplaceError {
    fn from(e: sqlx::Error) -> Self {
        MarketplaceError::DatabaseError(e.to_string())
    }
}

impl From<UserApiError> for MarketplaceError {
    fn from(e: UserApiError) -> Self {
        match e {
            UserApiError::UserNotFound(u) => MarketplaceError::UserNotFound(u),
            UserApiError::AccountDisabled(u) | UserApiError::RoleNotAllowed(u) => MarketplaceError::Forbidden(u),
            UserApiError::InvalidInput(s) => MarketplaceError::InvalidInput(s),
            UserApiError::UsernameTaken(u) => MarketplaceError::InvalidInput(format!("Username {u} is already taken")),
            UserApiError::InvalidCredentials => MarketplaceError::Forbidden("Invalid credentials".into()),
            UserApiError::DatabaseError(s) => MarketplaceError::DatabaseError(s),
        }
    }
}

/// This trait defines the highest level of behaviour for backends supporting the cattle marketplace.
///
/// Every method that changes state MUST check its preconditions and apply all of its writes in a single atomic unit.
/// When two callers race on the same listing or proposal, exactly one of them may succeed. The loser must see an
/// `InvalidState` error (or `NotFound` / `Forbidden` as appropriate), never a partially applied update.
///
/// Notifications are *not* written by these methods. The API layer appends them after the state change has been
/// committed.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + ListingManagement + NotificationManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Stores a new `PENDING` proposal against an `OPEN` listing.
    ///
    /// Errors:
    /// * `ListingNotFound` if the listing does not exist.
    /// * `InvalidListingState` if the listing is no longer `OPEN`.
    async fn insert_proposal(&self, proposal: NewProposal) -> Result<Proposal, MarketplaceError>;

    async fn fetch_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, MarketplaceError>;

    /// All proposals made against listings owned by `owner`, newest first.
    async fn fetch_proposals_for_owner(&self, owner: &str) -> Result<Vec<Proposal>, MarketplaceError>;

    /// All proposals made by `buyer`, newest first.
    async fn fetch_proposals_for_buyer(&self, buyer: &str) -> Result<Vec<Proposal>, MarketplaceError>;

    /// Accepts a `PENDING` proposal on behalf of the listing owner. The proposal becomes `ACCEPTED`, the listing moves
    /// from `OPEN` to `AWAITING_PAYMENT`, and the proposal's buyer is recorded on the listing.
    ///
    /// Returns the updated proposal and listing.
    async fn accept_proposal(&self, id: &ProposalId, owner: &str) -> Result<ProposalUpdate, MarketplaceError>;

    /// Rejects a `PENDING` proposal on behalf of the listing owner. The listing is unaffected.
    async fn reject_proposal(&self, id: &ProposalId, owner: &str) -> Result<Proposal, MarketplaceError>;

    /// Marks the deposit for an `ACCEPTED` proposal as paid by its buyer. The proposal becomes `PAID` and the listing
    /// moves from `AWAITING_PAYMENT` to `SOLD`.
    async fn pay_for_proposal(&self, id: &ProposalId, buyer: &str) -> Result<ProposalUpdate, MarketplaceError>;

    /// Appends a weighing record for the listing. Only the owner may weigh, and only once a proposal has been
    /// accepted (`AWAITING_PAYMENT` or `SOLD`).
    async fn insert_weight_entry(
        &self,
        listing_id: &ListingId,
        owner: &str,
        entry: NewWeightEntry,
    ) -> Result<WeighingResult, MarketplaceError>;

    /// Weighing records for a listing in the order they were recorded.
    async fn fetch_weight_entries(&self, listing_id: &ListingId) -> Result<Vec<WeightEntry>, MarketplaceError>;

    /// Settles a `SOLD` listing. If weighing records exist, the deal is settled on live weight and the transaction is
    /// complete. Otherwise the transaction waits for a slaughterhouse weight. Either way the listing becomes
    /// `COMPLETED` and is linked to the new transaction.
    async fn finalize_listing(
        &self,
        listing_id: &ListingId,
        owner: &str,
        terms: SettlementTerms,
    ) -> Result<Transaction, MarketplaceError>;

    async fn fetch_transaction(&self, id: &TransactionId) -> Result<Option<Transaction>, MarketplaceError>;

    async fn fetch_transaction_for_listing(
        &self,
        listing_id: &ListingId,
    ) -> Result<Option<Transaction>, MarketplaceError>;

    /// Completes a dead-weight transaction using the carcass weight reported by the slaughterhouse. The fees captured
    /// when the listing was finalized are deducted.
    async fn complete_slaughterhouse_settlement(
        &self,
        id: &TransactionId,
        final_weight: f64,
        yield_rate: YieldRate,
        price_per_unit: f64,
    ) -> Result<Transaction, MarketplaceError>;
}
