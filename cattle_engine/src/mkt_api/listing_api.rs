use std::fmt::Debug;

use log::*;
use serde::Serialize;

use crate::{
    db_types::{Demand, Listing, NewDemand, NewListing},
    mkt_api::{
        matcher::{find_matches, match_message, MarketSide, Matchable},
        notification_api::{details_of, notify},
    },
    traits::{ListingManagement, MarketplaceError, NotificationManagement},
};

/// The result of posting a supply listing or a demand.
#[derive(Debug, Clone, Serialize)]
pub struct PostResult<T> {
    pub record: T,
    pub matches: usize,
}

/// The caller's own supply listings and demands.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MyListings {
    pub supply: Vec<Listing>,
    pub demand: Vec<Demand>,
}

/// `ListingApi` manages both sides of the market: supply listings posted by farmers and demands posted by buyers.
/// Posting either kind of record runs the matcher against the other side.
pub struct ListingApi<B> {
    db: B,
}

impl<B> Debug for ListingApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ListingApi")
    }
}

impl<B> ListingApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

fn validate(breed: &str, quantity: i64) -> Result<(), MarketplaceError> {
    if breed.trim().is_empty() {
        return Err(MarketplaceError::InvalidInput("A breed is required".into()));
    }
    if quantity <= 0 {
        return Err(MarketplaceError::InvalidInput(format!("Quantity must be positive, got {quantity}")));
    }
    Ok(())
}

impl<B> ListingApi<B>
where B: ListingManagement + NotificationManagement
{
    /// Posts a new `OPEN` supply listing and notifies the owners of every open demand for the same breed.
    pub async fn create_listing(&self, owner: &str, listing: NewListing) -> Result<PostResult<Listing>, MarketplaceError> {
        validate(&listing.breed, listing.quantity)?;
        let listing = self.db.insert_listing(owner, listing).await?;
        let demands = self.db.fetch_open_demands().await?;
        let matches = self.notify_matches(MarketSide::Farmer, &listing, &demands).await;
        debug!("🔄️🐄️ Listing {} posted by {owner}. {matches} matching demands", listing.id);
        Ok(PostResult { record: listing, matches })
    }

    /// Posts a new `OPEN` demand and notifies the owners of every open supply listing for the same breed.
    pub async fn create_demand(&self, owner: &str, demand: NewDemand) -> Result<PostResult<Demand>, MarketplaceError> {
        validate(&demand.breed, demand.quantity)?;
        let demand = self.db.insert_demand(owner, demand).await?;
        let listings = self.db.fetch_open_listings().await?;
        let matches = self.notify_matches(MarketSide::Buyer, &demand, &listings).await;
        debug!("🔄️🐄️ Demand {} posted by {owner}. {matches} matching listings", demand.id);
        Ok(PostResult { record: demand, matches })
    }

    async fn notify_matches<N, T>(&self, side: MarketSide, new_record: &N, candidates: &[T]) -> usize
    where
        N: Matchable + Serialize,
        T: Matchable,
    {
        let matches = find_matches(new_record.breed(), candidates);
        let message = match_message(side, new_record.breed());
        let details = details_of(new_record);
        for candidate in &matches {
            notify(&self.db, candidate.owner(), &message, details.clone()).await;
        }
        matches.len()
    }

    /// All `OPEN` supply listings, newest first.
    pub async fn market(&self) -> Result<Vec<Listing>, MarketplaceError> {
        self.db.fetch_open_listings().await
    }

    pub async fn my_listings(&self, owner: &str) -> Result<MyListings, MarketplaceError> {
        let supply = self.db.fetch_listings_for_owner(owner).await?;
        let demand = self.db.fetch_demands_for_owner(owner).await?;
        Ok(MyListings { supply, demand })
    }
}
