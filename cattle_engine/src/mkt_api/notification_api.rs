use std::fmt::Debug;

use log::*;
use serde::Serialize;
use serde_json::Value;

use crate::{
    db_types::{NewNotification, Notification},
    traits::{MarketplaceError, NotificationManagement},
};

/// Appends a notification to `recipient`'s inbox.
///
/// Failures are logged and swallowed. Callers only notify after their own state change has committed, and a lost
/// notification must not turn a successful operation into an error.
pub async fn notify<B: NotificationManagement>(db: &B, recipient: &str, message: &str, details: Value) {
    let notification = NewNotification::new(recipient, message, details);
    match db.insert_notification(notification).await {
        Ok(n) => trace!("📬️ Notification {} sent to {recipient}: {message}", n.id),
        Err(e) => warn!("📬️ Could not save notification \"{message}\" for {recipient}. {e}"),
    }
}

/// Serializes a record for use as a notification payload. Anything that fails to serialize becomes `null`.
pub fn details_of<T: Serialize>(record: &T) -> Value {
    serde_json::to_value(record).unwrap_or_default()
}

pub struct NotificationApi<B> {
    db: B,
}

impl<B> Debug for NotificationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NotificationApi")
    }
}

impl<B> NotificationApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> NotificationApi<B>
where B: NotificationManagement
{
    /// The user's inbox, newest first.
    pub async fn inbox(&self, user_id: &str) -> Result<Vec<Notification>, MarketplaceError> {
        self.db.fetch_notifications_for_user(user_id).await
    }
}
