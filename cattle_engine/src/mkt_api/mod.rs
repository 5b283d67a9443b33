//! # Cattle marketplace public API
//!
//! The `mkt_api` module exposes the programmatic API for the cattle marketplace. Like the storage traits it is
//! built on, the API is modular, so clients can pick the parts they need.
//!
//! * [`listing_api`] creates supply listings and demands, runs the matcher and serves the market feed.
//! * [`proposal_flow_api`] drives the negotiation: submitting, accepting, rejecting and paying for proposals.
//! * [`settlement_api`] records weights and advance payment requests, and settles deals in live-weight or
//!   dead-weight mode.
//! * [`notification_api`] reads the per-user inbox.
//! * [`catalog_api`] manages breed and city reference data.
//! * [`user_api`] registers users and checks their account state on login.
//! * [`admin_api`] holds the administrative overrides and statistics.
//!
//! # API usage
//!
//! Every API is created by supplying a storage backend that implements the traits the API needs. The APIs that fire
//! hooks ([`ProposalFlowApi`](proposal_flow_api::ProposalFlowApi) and [`SettlementApi`](settlement_api::SettlementApi))
//! also take the event producers.
//!
//! ```rust,ignore
//! use cattle_engine::{events::EventProducers, ListingApi, ProposalFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/cattle.db", 5).await?;
//! let market = ListingApi::new(db.clone()).market().await?;
//! let proposals = ProposalFlowApi::new(db, EventProducers::default());
//! ```
//!
//! Notifications are appended by the APIs *after* the storage backend has committed a state change. A notification
//! that fails to save is logged, but does not undo the change.

pub mod admin_api;
pub mod catalog_api;
pub mod listing_api;
pub mod matcher;
pub mod notification_api;
pub mod proposal_flow_api;
pub mod settlement_api;
pub mod user_api;

/// Formats a monetary value in Brazilian reais for notification messages.
pub(crate) fn brl(amount: f64) -> String {
    format!("R$ {amount:.2}")
}
