//! Cattle Marketplace Engine
//!
//! The cattle marketplace engine connects farmers selling lots of cattle with buyers looking for them. This library
//! contains the core logic of the marketplace. It knows nothing about HTTP or authentication; callers identify users by
//! username.
//!
//! The library is divided into three main sections:
//! 1. Storage contracts ([`mod@traits`]) and the SQLite backend ([`SqliteDatabase`]). The traits define the behaviour a
//!    backend must provide, including the atomic state transitions of the proposal and settlement lifecycle. The data
//!    types stored by the backend live in [`db_types`] and are public.
//! 2. The marketplace public API ([`mod@mkt_api`]). Listings and matching, proposals, settlement, notifications,
//!    reference data, accounts and administration. The APIs are generic over the storage traits.
//! 3. Events ([`mod@events`]). Hooks fire when a deal closes and when a settlement completes, so that other systems can
//!    react without touching the engine.
pub mod db_types;
pub mod events;
pub mod helpers;
mod mkt_api;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use mkt_api::{
    admin_api::{AdminApi, AdminStats, AllListings, ListingKind},
    catalog_api::CatalogApi,
    listing_api::{ListingApi, MyListings, PostResult},
    matcher,
    notification_api::NotificationApi,
    proposal_flow_api::{DealDocuments, ProposalFlowApi},
    settlement_api::{SettlementApi, WeightReport},
    user_api::UserApi,
};
pub use traits::{
    ErrorKind,
    ListingManagement,
    MarketplaceDatabase,
    MarketplaceError,
    NotificationManagement,
    ReferenceData,
    UserApiError,
    UserManagement,
};
