use crate::{
    db_types::{NewNotification, Notification},
    traits::MarketplaceError,
};

#[allow(async_fn_in_trait)]
pub trait NotificationManagement {
    /// Appends a notification to the recipient's inbox. The id and timestamp are assigned by the backend.
    async fn insert_notification(&self, notification: NewNotification) -> Result<Notification, MarketplaceError>;

    /// The notifications for `user_id`, newest first.
    async fn fetch_notifications_for_user(&self, user_id: &str) -> Result<Vec<Notification>, MarketplaceError>;

    /// The `limit` most recent notifications across all users.
    async fn fetch_recent_notifications(&self, limit: i64) -> Result<Vec<Notification>, MarketplaceError>;
}
