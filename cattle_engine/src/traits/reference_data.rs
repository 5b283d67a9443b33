use crate::{
    db_types::{CustomCity, References},
    traits::MarketplaceError,
};

/// Catalogs of reference data used by the front end to build listing forms.
#[allow(async_fn_in_trait)]
pub trait ReferenceData {
    /// Returns the breeds (sorted) and custom cities.
    async fn fetch_references(&self) -> Result<References, MarketplaceError>;

    /// Adds a breed to the catalog. Adding a breed that already exists is not an error.
    async fn insert_breed(&self, name: &str) -> Result<(), MarketplaceError>;

    async fn delete_breed(&self, name: &str) -> Result<bool, MarketplaceError>;

    async fn insert_custom_city(&self, city: &CustomCity) -> Result<(), MarketplaceError>;

    async fn delete_custom_city(&self, state: &str, name: &str) -> Result<bool, MarketplaceError>;
}
