use std::fmt::Debug;

use log::*;
use serde::Serialize;
use serde_json::json;

use crate::{
    db_types::{Listing, ListingId, NewWeightEntry, Transaction, TransactionId, WeightEntry, YieldRate},
    events::{EventProducers, SettlementCompletedEvent},
    helpers::{weight_summary, WeightSummary},
    mkt_api::{
        brl,
        notification_api::{details_of, notify},
    },
    traits::{MarketplaceDatabase, MarketplaceError, SettlementTerms, WeighingResult},
};

/// All the weighing records for a listing, with running totals.
#[derive(Debug, Clone, Serialize)]
pub struct WeightReport {
    pub data: Vec<WeightEntry>,
    pub summary: WeightSummary,
}

fn require_positive(name: &str, value: f64) -> Result<(), MarketplaceError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(MarketplaceError::InvalidInput(format!("{name} must be positive, got {value}")))
    }
}

fn require_non_negative(name: &str, value: f64) -> Result<(), MarketplaceError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(MarketplaceError::InvalidInput(format!("{name} cannot be negative, got {value}")))
    }
}

/// `SettlementApi` handles everything that happens after a proposal is accepted: weighing the animals, requesting an
/// advance on the payment, and finally settling the deal.
///
/// Two settlement modes are supported. If the farmer weighed the animals alive, the deal is settled immediately when
/// it is finalized. Otherwise the transaction waits until the slaughterhouse reports the carcass weight. Both modes
/// use the same formula (see [`crate::helpers::settle`]).
pub struct SettlementApi<B> {
    db: B,
    producers: EventProducers,
}

impl<B> Debug for SettlementApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SettlementApi")
    }
}

impl<B> SettlementApi<B> {
    pub fn new(db: B, producers: EventProducers) -> Self {
        Self { db, producers }
    }
}

impl<B> SettlementApi<B>
where B: MarketplaceDatabase
{
    /// Records one weighed batch. When the number of animals weighed reaches the listed quantity, the farmer is told
    /// that weighing is complete.
    pub async fn record_weight(
        &self,
        listing_id: &ListingId,
        actor: &str,
        entry: NewWeightEntry,
    ) -> Result<WeighingResult, MarketplaceError> {
        if entry.quantity <= 0 {
            return Err(MarketplaceError::InvalidInput(format!("Batch quantity must be positive, got {}", entry.quantity)));
        }
        require_positive("Batch weight", entry.total_weight)?;
        let result = self.db.insert_weight_entry(listing_id, actor, entry).await?;
        if result.remaining < 0 {
            warn!(
                "⚖️ Listing {listing_id} lists {} head but {} have been weighed",
                result.listing.quantity, result.total_weighed
            );
        }
        if result.is_complete() {
            let details = json!({ "listing_id": listing_id, "total_weighed": result.total_weighed });
            notify(&self.db, actor, &format!("Weighing completed for listing #{listing_id}"), details).await;
            info!("⚖️ All {} head on listing {listing_id} have been weighed", result.total_weighed);
        }
        Ok(result)
    }

    pub async fn weights(&self, listing_id: &ListingId) -> Result<WeightReport, MarketplaceError> {
        let data = self.db.fetch_weight_entries(listing_id).await?;
        let summary = weight_summary(&data);
        Ok(WeightReport { data, summary })
    }

    /// Stores the farmer's own estimate of the lot weight. This is for reference only.
    pub async fn record_internal_weight(
        &self,
        listing_id: &ListingId,
        actor: &str,
        estimated_weight: f64,
    ) -> Result<Listing, MarketplaceError> {
        require_positive("Estimated weight", estimated_weight)?;
        let listing = self.db.record_internal_weight(listing_id, actor, estimated_weight).await?;
        debug!("⚖️ Internal weight estimate of {estimated_weight} kg recorded on listing {listing_id}");
        Ok(listing)
    }

    /// Asks the buyer for an advance ("pauta") payment. The request is advisory; no money moves.
    pub async fn request_advance(
        &self,
        listing_id: &ListingId,
        actor: &str,
        pauta_value: f64,
    ) -> Result<Listing, MarketplaceError> {
        require_positive("Advance value", pauta_value)?;
        let listing = self.db.record_advance_request(listing_id, actor, pauta_value).await?;
        if let Some(buyer) = &listing.buyer {
            let details = json!({ "listing_id": listing_id, "amount": pauta_value });
            notify(&self.db, buyer, &format!("Advance payment requested: {}", brl(pauta_value)), details).await;
        }
        debug!("⚖️ Advance of {} requested on listing {listing_id}", brl(pauta_value));
        Ok(listing)
    }

    /// Settles a sold listing.
    ///
    /// If weighing records exist the deal is settled on live weight straight away. If not, the transaction waits for
    /// [`Self::submit_slaughterhouse_weight`]. Either way the listing is completed and the buyer is told that the
    /// deal has closed and that their deposit has been refunded.
    pub async fn finalize(
        &self,
        listing_id: &ListingId,
        actor: &str,
        terms: SettlementTerms,
    ) -> Result<Transaction, MarketplaceError> {
        require_non_negative("Transport fee", terms.transport_fee)?;
        require_non_negative("FUNRURAL tax", terms.funrural_tax)?;
        let transaction = self.db.finalize_listing(listing_id, actor, terms).await?;
        notify(
            &self.db,
            &transaction.buyer,
            &format!("Transaction completed - Listing #{listing_id}"),
            details_of(&transaction),
        )
        .await;
        notify(
            &self.db,
            &transaction.buyer,
            &format!("Deposit refunded - Listing #{listing_id}"),
            json!({ "transaction_id": transaction.id }),
        )
        .await;
        if transaction.is_complete() {
            info!("⚖️ Listing {listing_id} settled on live weight. Final amount: {:?}", transaction.final_amount);
            self.producers.publish_settlement_completed(SettlementCompletedEvent::new(transaction.clone())).await;
        } else {
            info!("⚖️ Listing {listing_id} finalized. Transaction {} awaits a slaughterhouse weight", transaction.id);
        }
        Ok(transaction)
    }

    /// Completes a dead-weight transaction with the carcass weight reported by the slaughterhouse.
    pub async fn submit_slaughterhouse_weight(
        &self,
        id: &TransactionId,
        final_weight: f64,
        yield_rate: f64,
        price_per_unit: f64,
    ) -> Result<Transaction, MarketplaceError> {
        let yield_rate = YieldRate::new(yield_rate).map_err(|e| MarketplaceError::InvalidInput(e.to_string()))?;
        require_positive("Final weight", final_weight)?;
        require_positive("Price per unit", price_per_unit)?;
        let transaction = self.db.complete_slaughterhouse_settlement(id, final_weight, yield_rate, price_per_unit).await?;
        let details = json!({ "transaction_id": id, "final_amount": transaction.final_amount });
        notify(&self.db, &transaction.seller, "Final weighing completed", details).await;
        info!("⚖️ Transaction {id} settled on dead weight. Final amount: {:?}", transaction.final_amount);
        self.producers.publish_settlement_completed(SettlementCompletedEvent::new(transaction.clone())).await;
        Ok(transaction)
    }

    /// The transaction for a listing, if it has been finalized.
    pub async fn transaction_for_listing(&self, listing_id: &ListingId) -> Result<Transaction, MarketplaceError> {
        self.db
            .fetch_transaction_for_listing(listing_id)
            .await?
            .ok_or_else(|| MarketplaceError::TransactionNotFound(format!("for listing {listing_id}")))
    }
}
