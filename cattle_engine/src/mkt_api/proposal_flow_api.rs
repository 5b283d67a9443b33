use std::fmt::Debug;

use log::*;
use serde::Serialize;

use crate::{
    db_types::{ListingId, ListingStatus, NewProposal, Proposal, ProposalAction, ProposalId, Role},
    events::{DealClosedEvent, EventProducers},
    mkt_api::{
        brl,
        notification_api::{details_of, notify},
    },
    traits::{ListingSummary, MarketplaceDatabase, MarketplaceError, ProposalWithListing, UserManagement},
};

const UNKNOWN_CONTACT: &str = "Unknown";

/// The settlement documents released to the buyer once the deposit is paid. Either may still be missing if the
/// farmer has not uploaded it yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealDocuments {
    pub nfe: Option<String>,
    pub gta: Option<String>,
}

/// `ProposalFlowApi` is the primary API for negotiating a sale: buyers make offers against open listings, farmers
/// accept or reject them, and the buyer locks the deal by paying a deposit.
///
/// All state transitions are delegated to the storage backend, which applies them atomically. This API adds input
/// validation, role checks, notifications and event hooks on top.
pub struct ProposalFlowApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for ProposalFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ProposalFlowApi")
    }
}

impl<B> ProposalFlowApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> ProposalFlowApi<B>
where B: MarketplaceDatabase + UserManagement
{
    /// Makes an offer of `price_offer` per arroba against an `OPEN` listing.
    ///
    /// Farmers cannot make offers. The buyer's phone number is copied onto the proposal so that the listing owner can
    /// get in touch.
    pub async fn submit_proposal(
        &self,
        buyer: &str,
        listing_id: &ListingId,
        price_offer: f64,
        message: Option<String>,
    ) -> Result<Proposal, MarketplaceError> {
        if !price_offer.is_finite() || price_offer <= 0.0 {
            return Err(MarketplaceError::InvalidInput(format!("The offered price must be positive, got {price_offer}")));
        }
        let listing =
            self.db.fetch_listing(listing_id).await?.ok_or_else(|| MarketplaceError::ListingNotFound(listing_id.clone()))?;
        if listing.status != ListingStatus::Open {
            return Err(MarketplaceError::listing_state(listing_id, listing.status, "It is not accepting offers."));
        }
        let account = self.db.fetch_user(buyer).await?;
        if account.as_ref().is_some_and(|a| a.role == Role::Farmer) {
            return Err(MarketplaceError::Forbidden("Farmers cannot make offers".into()));
        }
        let buyer_contact = account
            .map(|a| a.phone)
            .filter(|phone| !phone.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_CONTACT.to_string());
        let new_proposal = NewProposal {
            listing_id: listing_id.clone(),
            buyer: buyer.to_string(),
            buyer_contact,
            price_offer,
            message: message.unwrap_or_default(),
        };
        let proposal = self.db.insert_proposal(new_proposal).await?;
        notify(&self.db, &listing.owner, &format!("New Offer: {}", brl(price_offer)), details_of(&proposal)).await;
        info!("🔄️🤝️ {buyer} offered {} on listing {listing_id}. Proposal {}", brl(price_offer), proposal.id);
        Ok(proposal)
    }

    /// Accepts or rejects a `PENDING` proposal. Only the owner of the listing may respond.
    ///
    /// Accepting reserves the listing for the proposal's buyer (`AWAITING_PAYMENT`) and tells the buyer to pay the
    /// deposit. Rejecting has no effect on the listing.
    pub async fn respond_to_proposal(
        &self,
        id: &ProposalId,
        action: ProposalAction,
        actor: &str,
    ) -> Result<Proposal, MarketplaceError> {
        match action {
            ProposalAction::Accept => {
                let update = self.db.accept_proposal(id, actor).await?;
                let proposal = update.proposal;
                notify(&self.db, &proposal.buyer, "Offer Accepted! Pay fee to lock.", details_of(&proposal)).await;
                info!("🔄️🤝️ Proposal {id} accepted. Listing {} is reserved for {}", update.listing.id, proposal.buyer);
                Ok(proposal)
            },
            ProposalAction::Reject => {
                let proposal = self.db.reject_proposal(id, actor).await?;
                info!("🔄️🤝️ Proposal {id} rejected");
                Ok(proposal)
            },
        }
    }

    /// Records the buyer's deposit for an accepted proposal. The listing is `SOLD` to the buyer and the settlement
    /// documents are released.
    pub async fn pay_deposit(&self, id: &ProposalId, buyer: &str) -> Result<DealDocuments, MarketplaceError> {
        let update = self.db.pay_for_proposal(id, buyer).await?;
        let (proposal, listing) = (update.proposal, update.listing);
        notify(&self.db, &listing.owner, "Deal Closed! Buyer paid fee.", details_of(&proposal)).await;
        let documents = DealDocuments { nfe: listing.nfe_file.clone(), gta: listing.gta_file.clone() };
        info!("🔄️💰️ Deposit paid on proposal {id}. Listing {} is sold to {buyer}", listing.id);
        self.producers.publish_deal_closed(DealClosedEvent::new(proposal, listing)).await;
        Ok(documents)
    }

    /// Proposals made against the owner's listings, newest first.
    pub async fn received_proposals(&self, owner: &str) -> Result<Vec<Proposal>, MarketplaceError> {
        self.db.fetch_proposals_for_owner(owner).await
    }

    /// Proposals the buyer has made, newest first, each with a summary of the listing it was made against.
    pub async fn sent_proposals(&self, buyer: &str) -> Result<Vec<ProposalWithListing>, MarketplaceError> {
        let proposals = self.db.fetch_proposals_for_buyer(buyer).await?;
        let mut result = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            let listing_detail = self.db.fetch_listing(&proposal.listing_id).await?.as_ref().map(ListingSummary::from);
            result.push(ProposalWithListing { proposal, listing_detail });
        }
        Ok(result)
    }
}
