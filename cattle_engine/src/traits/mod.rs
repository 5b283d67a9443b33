//! # Storage contracts
//!
//! This module defines the behaviour that a storage backend must provide in order to run the cattle marketplace.
//! The lifecycle APIs in [`crate::mkt_api`] are generic over these traits, so that tests can substitute mocks and so
//! that the record store is an injected dependency rather than global state.
//!
//! * [`MarketplaceDatabase`] is the highest-level trait. It owns the proposal, weighing and settlement state machine
//!   and must apply every transition atomically.
//! * [`ListingManagement`] creates and queries supply listings and demands.
//! * [`NotificationManagement`] appends to and reads from the per-user notification inbox.
//! * [`ReferenceData`] manages the breed and city catalogs.
//! * [`UserManagement`] stores user accounts.
mod data_objects;
mod listing_management;
mod marketplace_database;
mod notification_management;
mod reference_data;
mod user_management;

pub use data_objects::{ListingSummary, ProposalUpdate, ProposalWithListing, SettlementTerms, WeighingResult};
pub use listing_management::ListingManagement;
pub use marketplace_database::{ErrorKind, MarketplaceDatabase, MarketplaceError};
pub use notification_management::NotificationManagement;
pub use reference_data::ReferenceData;
pub use user_management::{UserApiError, UserManagement};
