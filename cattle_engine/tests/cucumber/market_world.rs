use std::collections::HashMap;

use cattle_engine::{
    db_types::{ListingId, ProposalId, TransactionId},
    events::EventProducers,
    test_utils::prepare_env::{prepare_test_env, random_db_path},
    traits::WeighingResult,
    ListingApi,
    MarketplaceError,
    NotificationApi,
    ProposalFlowApi,
    SettlementApi,
    SqliteDatabase,
    UserApi,
};
use cucumber::World;
use log::*;

#[derive(Default, Debug, World)]
pub struct MarketWorld {
    pub system: Option<MarketSystem>,
    /// Listings, proposals and transactions created during the scenario, by the alias used in the feature file
    pub listings: HashMap<String, ListingId>,
    pub proposals: HashMap<String, ProposalId>,
    pub transactions: HashMap<String, TransactionId>,
    pub last_error: Option<MarketplaceError>,
    pub last_match_count: usize,
    pub last_weighing: Option<WeighingResult>,
}

#[derive(Debug)]
pub struct MarketSystem {
    pub db_path: String,
    pub db: SqliteDatabase,
    pub listings: ListingApi<SqliteDatabase>,
    pub proposals: ProposalFlowApi<SqliteDatabase>,
    pub settlement: SettlementApi<SqliteDatabase>,
    pub notifications: NotificationApi<SqliteDatabase>,
    pub users: UserApi<SqliteDatabase>,
}

impl MarketWorld {
    pub fn system(&self) -> &MarketSystem {
        self.system.as_ref().expect("Marketplace not initialised")
    }

    pub fn listing_id(&self, alias: &str) -> ListingId {
        self.listings.get(alias).cloned().unwrap_or_else(|| panic!("No listing called {alias}"))
    }

    pub fn proposal_id(&self, alias: &str) -> ProposalId {
        self.proposals.get(alias).cloned().unwrap_or_else(|| panic!("No proposal called {alias}"))
    }

    pub fn transaction_id(&self, alias: &str) -> TransactionId {
        self.transactions.get(alias).cloned().unwrap_or_else(|| panic!("No transaction called {alias}"))
    }

    /// Stores the outcome of an operation that is allowed to fail. Successes clear any previous error.
    pub fn record<T>(&mut self, result: Result<T, MarketplaceError>) -> Option<T> {
        match result {
            Ok(v) => {
                self.last_error = None;
                Some(v)
            },
            Err(e) => {
                debug!("🚀️ Operation failed: {e}");
                self.last_error = Some(e);
                None
            },
        }
    }
}

impl MarketSystem {
    pub async fn new() -> Self {
        let url = random_db_path();
        prepare_test_env(&url).await;
        let db = SqliteDatabase::new_with_url(&url, 5).await.expect("Error creating connection to database");
        debug!("🚀️ Created database: {url}");
        let producers = EventProducers::default();
        Self {
            db_path: url,
            listings: ListingApi::new(db.clone()),
            proposals: ProposalFlowApi::new(db.clone(), producers.clone()),
            settlement: SettlementApi::new(db.clone(), producers),
            notifications: NotificationApi::new(db.clone()),
            users: UserApi::new(db.clone()),
            db,
        }
    }
}
