use serde::{Deserialize, Serialize};

use crate::db_types::{Listing, Proposal, WeightEntry, YieldRate};

/// The state of a proposal and its listing after a transition (accept or pay).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalUpdate {
    pub proposal: Proposal,
    pub listing: Listing,
}

/// The outcome of recording a batch weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeighingResult {
    pub listing: Listing,
    pub entry: WeightEntry,
    /// Head of cattle weighed so far, across all batches
    pub total_weighed: i64,
    /// Head still to be weighed. Negative if more animals were weighed than were listed.
    pub remaining: i64,
}

impl WeighingResult {
    pub fn is_complete(&self) -> bool {
        self.remaining <= 0
    }
}

fn default_yield_rate() -> YieldRate {
    YieldRate::default()
}

/// Documents and deductions supplied by the seller when closing out a deal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementTerms {
    pub nfe_document: String,
    pub gta_document: String,
    #[serde(default)]
    pub transport_fee: f64,
    #[serde(default)]
    pub funrural_tax: f64,
    #[serde(default = "default_yield_rate")]
    pub yield_rate: YieldRate,
}

impl SettlementTerms {
    pub fn new<S: Into<String>>(nfe_document: S, gta_document: S) -> Self {
        Self {
            nfe_document: nfe_document.into(),
            gta_document: gta_document.into(),
            transport_fee: 0.0,
            funrural_tax: 0.0,
            yield_rate: YieldRate::default(),
        }
    }

    pub fn with_fees(mut self, transport_fee: f64, funrural_tax: f64) -> Self {
        self.transport_fee = transport_fee;
        self.funrural_tax = funrural_tax;
        self
    }

    pub fn with_yield_rate(mut self, yield_rate: YieldRate) -> Self {
        self.yield_rate = yield_rate;
        self
    }
}

/// A condensed view of a listing, attached to the proposals a buyer has sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingSummary {
    pub breed: String,
    pub quantity: i64,
    pub location: String,
    pub photo: Option<String>,
}

impl From<&Listing> for ListingSummary {
    fn from(listing: &Listing) -> Self {
        Self {
            breed: listing.breed.clone(),
            quantity: listing.quantity,
            location: format!("{}, {}", listing.city, listing.state),
            photo: listing.photo.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposalWithListing {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub listing_detail: Option<ListingSummary>,
}
