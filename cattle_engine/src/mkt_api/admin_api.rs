use std::{fmt::Debug, str::FromStr};

use log::*;
use serde::Serialize;

use crate::{
    db_types::{ConversionError, Demand, DemandId, Listing, ListingId, UserAccount},
    traits::{ListingManagement, MarketplaceError, NotificationManagement, UserManagement},
};

const RECENT_ACTIVITY_LIMIT: i64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub total_users: usize,
    pub total_supply: usize,
    pub total_demand: usize,
    /// The messages of the most recent notifications, newest first
    pub recent_activity: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AllListings {
    pub supply: Vec<Listing>,
    pub demand: Vec<Demand>,
}

/// Which side of the market a record to delete belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Supply,
    Demand,
}

impl FromStr for ListingKind {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "supply" => Ok(Self::Supply),
            "demand" => Ok(Self::Demand),
            _ => Err(ConversionError(format!("Invalid listing type: {s}. Expected supply or demand"))),
        }
    }
}

/// Administrative overrides and site statistics. Every method here should only be reachable by users with the
/// `admin` role; this API does not check roles itself.
pub struct AdminApi<B> {
    db: B,
}

impl<B> Debug for AdminApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AdminApi")
    }
}

impl<B> AdminApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> AdminApi<B>
where B: UserManagement + ListingManagement + NotificationManagement
{
    pub async fn stats(&self) -> Result<AdminStats, MarketplaceError> {
        let total_users = self.db.fetch_all_users().await?.len();
        let total_supply = self.db.fetch_all_listings().await?.len();
        let total_demand = self.db.fetch_all_demands().await?.len();
        let recent_activity = self
            .db
            .fetch_recent_notifications(RECENT_ACTIVITY_LIMIT)
            .await?
            .into_iter()
            .map(|n| n.message)
            .collect();
        Ok(AdminStats { total_users, total_supply, total_demand, recent_activity })
    }

    pub async fn users(&self) -> Result<Vec<UserAccount>, MarketplaceError> {
        Ok(self.db.fetch_all_users().await?)
    }

    /// Enables a disabled account, or disables an enabled one. Returns the new `is_active` value.
    pub async fn toggle_user(&self, username: &str) -> Result<bool, MarketplaceError> {
        let is_active = self.db.toggle_user_active(username).await?;
        info!("🔄️🛡️ Account {username} is now {}", if is_active { "active" } else { "disabled" });
        Ok(is_active)
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), MarketplaceError> {
        if !self.db.delete_user(username).await? {
            return Err(MarketplaceError::UserNotFound(username.to_string()));
        }
        info!("🔄️🛡️ Account {username} deleted");
        Ok(())
    }

    pub async fn all_listings(&self) -> Result<AllListings, MarketplaceError> {
        let supply = self.db.fetch_all_listings().await?;
        let demand = self.db.fetch_all_demands().await?;
        Ok(AllListings { supply, demand })
    }

    /// Deletes a supply listing or demand by id. `kind` must be `supply` or `demand`.
    pub async fn delete_listing(&self, kind: &str, id: &str) -> Result<(), MarketplaceError> {
        let kind = ListingKind::from_str(kind).map_err(|e| MarketplaceError::InvalidInput(e.to_string()))?;
        match kind {
            ListingKind::Supply => {
                let id = ListingId::from(id);
                if !self.db.delete_listing(&id).await? {
                    return Err(MarketplaceError::ListingNotFound(id));
                }
            },
            ListingKind::Demand => {
                if !self.db.delete_demand(&DemandId::from(id)).await? {
                    return Err(MarketplaceError::DemandNotFound(id.to_string()));
                }
            },
        }
        warn!("🔄️🛡️ {kind:?} record {id} deleted by an administrator");
        Ok(())
    }
}
