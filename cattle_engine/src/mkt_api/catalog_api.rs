use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{CustomCity, References},
    traits::{MarketplaceError, ReferenceData},
};

/// Reference data for building listing forms: the breed catalog and custom cities.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

fn required(field: &str, value: &str) -> Result<String, MarketplaceError> {
    let value = value.trim();
    if value.is_empty() {
        Err(MarketplaceError::InvalidInput(format!("{field} cannot be empty")))
    } else {
        Ok(value.to_string())
    }
}

impl<B> CatalogApi<B>
where B: ReferenceData
{
    pub async fn references(&self) -> Result<References, MarketplaceError> {
        self.db.fetch_references().await
    }

    /// Adds a breed to the catalog. Adding an existing breed is a no-op.
    pub async fn add_breed(&self, name: &str) -> Result<References, MarketplaceError> {
        let name = required("Breed name", name)?;
        self.db.insert_breed(&name).await?;
        info!("🔄️📚️ Breed {name} added to the catalog");
        self.db.fetch_references().await
    }

    pub async fn delete_breed(&self, name: &str) -> Result<References, MarketplaceError> {
        if self.db.delete_breed(name).await? {
            info!("🔄️📚️ Breed {name} removed from the catalog");
        } else {
            debug!("🔄️📚️ Breed {name} was not in the catalog");
        }
        self.db.fetch_references().await
    }

    pub async fn add_city(&self, state: &str, name: &str) -> Result<References, MarketplaceError> {
        let city = CustomCity { state: required("State", state)?, name: required("City name", name)? };
        self.db.insert_custom_city(&city).await?;
        info!("🔄️📚️ City {}/{} added", city.state, city.name);
        self.db.fetch_references().await
    }

    pub async fn delete_city(&self, state: &str, name: &str) -> Result<References, MarketplaceError> {
        if self.db.delete_custom_city(state, name).await? {
            info!("🔄️📚️ City {state}/{name} removed");
        }
        self.db.fetch_references().await
    }
}
