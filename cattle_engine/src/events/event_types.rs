use serde::{Deserialize, Serialize};

use crate::{
    db_types::{Listing, Proposal, Transaction},
    events::MarketEvent,
};

/// Emitted once the buyer has paid the deposit on an accepted proposal and the listing is sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealClosedEvent {
    pub proposal: Proposal,
    pub listing: Listing,
}

impl DealClosedEvent {
    pub fn new(proposal: Proposal, listing: Listing) -> Self {
        Self { proposal, listing }
    }
}

/// Emitted when a transaction reaches the `completed` state, either from live weighing or from a slaughterhouse
/// weighing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementCompletedEvent {
    pub transaction: Transaction,
}

impl SettlementCompletedEvent {
    pub fn new(transaction: Transaction) -> Self {
        Self { transaction }
    }
}

impl MarketEvent for DealClosedEvent {
    const KIND: &'static str = "deal closed";

    fn listing_ref(&self) -> String {
        self.listing.id.to_string()
    }
}

impl MarketEvent for SettlementCompletedEvent {
    const KIND: &'static str = "settlement completed";

    fn listing_ref(&self) -> String {
        self.transaction.listing_id.to_string()
    }
}
