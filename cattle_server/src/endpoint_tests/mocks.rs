use cattle_engine::{
    db_types::{CustomCity, NewNotification, NewUserAccount, Notification, References, UserAccount},
    traits::{MarketplaceError, NotificationManagement, ReferenceData, UserApiError, UserManagement},
};
use mockall::mock;

mock! {
    pub UserManager {}
    impl UserManagement for UserManager {
        async fn create_user(&self, user: NewUserAccount) -> Result<UserAccount, UserApiError>;
        async fn fetch_user(&self, username: &str) -> Result<Option<UserAccount>, UserApiError>;
        async fn fetch_all_users(&self) -> Result<Vec<UserAccount>, UserApiError>;
        async fn toggle_user_active(&self, username: &str) -> Result<bool, UserApiError>;
        async fn delete_user(&self, username: &str) -> Result<bool, UserApiError>;
    }
}

mock! {
    pub ReferenceStore {}
    impl ReferenceData for ReferenceStore {
        async fn fetch_references(&self) -> Result<References, MarketplaceError>;
        async fn insert_breed(&self, name: &str) -> Result<(), MarketplaceError>;
        async fn delete_breed(&self, name: &str) -> Result<bool, MarketplaceError>;
        async fn insert_custom_city(&self, city: &CustomCity) -> Result<(), MarketplaceError>;
        async fn delete_custom_city(&self, state: &str, name: &str) -> Result<bool, MarketplaceError>;
    }
    impl UserManagement for ReferenceStore {
        async fn create_user(&self, user: NewUserAccount) -> Result<UserAccount, UserApiError>;
        async fn fetch_user(&self, username: &str) -> Result<Option<UserAccount>, UserApiError>;
        async fn fetch_all_users(&self) -> Result<Vec<UserAccount>, UserApiError>;
        async fn toggle_user_active(&self, username: &str) -> Result<bool, UserApiError>;
        async fn delete_user(&self, username: &str) -> Result<bool, UserApiError>;
    }
}

mock! {
    pub NotificationStore {}
    impl NotificationManagement for NotificationStore {
        async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, MarketplaceError>;
        async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, MarketplaceError>;
        async fn fetch_recent_notifications(&self, limit: i64) -> Result<Vec<Notification>, MarketplaceError>;
    }
}
