use crate::{
    db_types::{Demand, DemandId, Listing, ListingId, NewDemand, NewListing},
    traits::MarketplaceError,
};

/// The `ListingManagement` trait defines behaviour for creating and querying both sides of the market: supply
/// listings posted by farmers and demands posted by buyers.
///
/// Status transitions of a listing are *not* part of this trait. Those belong to [`super::MarketplaceDatabase`].
#[allow(async_fn_in_trait)]
pub trait ListingManagement {
    /// Stores a new `OPEN` supply listing owned by `owner`.
    async fn insert_listing(&self, owner: &str, listing: NewListing) -> Result<Listing, MarketplaceError>;

    /// Stores a new `OPEN` demand owned by `owner`.
    async fn insert_demand(&self, owner: &str, demand: NewDemand) -> Result<Demand, MarketplaceError>;

    async fn fetch_listing(&self, id: &ListingId) -> Result<Option<Listing>, MarketplaceError>;

    /// All `OPEN` supply listings, newest first.
    async fn fetch_open_listings(&self) -> Result<Vec<Listing>, MarketplaceError>;

    /// All `OPEN` demands, newest first.
    async fn fetch_open_demands(&self) -> Result<Vec<Demand>, MarketplaceError>;

    async fn fetch_listings_for_owner(&self, owner: &str) -> Result<Vec<Listing>, MarketplaceError>;

    async fn fetch_demands_for_owner(&self, owner: &str) -> Result<Vec<Demand>, MarketplaceError>;

    async fn fetch_all_listings(&self) -> Result<Vec<Listing>, MarketplaceError>;

    async fn fetch_all_demands(&self) -> Result<Vec<Demand>, MarketplaceError>;

    /// Records the owner's own estimate of the lot's weight. This has no effect on the listing status.
    /// Fails with `Forbidden` if `owner` does not own the listing.
    async fn record_internal_weight(
        &self,
        id: &ListingId,
        owner: &str,
        estimated_weight: f64,
    ) -> Result<Listing, MarketplaceError>;

    /// Stores a request for an advance payment ("pauta") and marks it as pending.
    /// Fails with `Forbidden` if `owner` does not own the listing.
    async fn record_advance_request(
        &self,
        id: &ListingId,
        owner: &str,
        pauta_value: f64,
    ) -> Result<Listing, MarketplaceError>;

    /// Administrative removal. Returns `false` if there was nothing to delete.
    async fn delete_listing(&self, id: &ListingId) -> Result<bool, MarketplaceError>;

    /// Administrative removal. Returns `false` if there was nothing to delete.
    async fn delete_demand(&self, id: &DemandId) -> Result<bool, MarketplaceError>;
}
