use chrono::Utc;
use sqlx::{types::Json, SqliteConnection};

use super::first_row;
use crate::db_types::{NewNotification, Notification, NotificationId};

pub async fn insert_notification(
    notification: NewNotification,
    conn: &mut SqliteConnection,
) -> Result<Notification, sqlx::Error> {
    let notification = sqlx::query_as(
        r#"
            INSERT INTO notifications (id, user_id, message, details, timestamp, read)
            VALUES ($1, $2, $3, $4, $5, 0)
            RETURNING *;
        "#,
    )
    .bind(NotificationId::random())
    .bind(notification.user_id)
    .bind(notification.message)
    .bind(Json(notification.details))
    .bind(Utc::now())
    .fetch_all(conn)
    .await?;
    first_row(notification)
}

pub async fn fetch_notifications_for_user(
    user_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications =
        sqlx::query_as("SELECT * FROM notifications WHERE user_id = $1 ORDER BY timestamp DESC, rowid DESC")
            .bind(user_id)
            .fetch_all(conn)
            .await?;
    Ok(notifications)
}

pub async fn fetch_recent_notifications(limit: i64, conn: &mut SqliteConnection) -> Result<Vec<Notification>, sqlx::Error> {
    let notifications = sqlx::query_as("SELECT * FROM notifications ORDER BY timestamp DESC, rowid DESC LIMIT $1")
        .bind(limit)
        .fetch_all(conn)
        .await?;
    Ok(notifications)
}
