//! Sqlite database operations for marketplace user accounts
//!
//! Generally clients should never call these methods directly, and prefer to use the [`UserManagement`] trait methods
//! that are implemented on the [`SqliteDatabase`] struct instead.
//!
//! [`UserManagement`]: crate::traits::UserManagement
//! [`SqliteDatabase`]: crate::SqliteDatabase
use chrono::Utc;
use sqlx::SqliteConnection;

use super::{first_row, optional_row};
use crate::db_types::{NewUserAccount, UserAccount};

pub async fn insert_user(user: NewUserAccount, conn: &mut SqliteConnection) -> Result<UserAccount, sqlx::Error> {
    let user = sqlx::query_as(
        r#"
            INSERT INTO users (
                username,
                password_hash,
                email,
                first_name,
                last_name,
                phone,
                address,
                tax_id,
                ie,
                role,
                is_active,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 1, $11)
            RETURNING *;
        "#,
    )
    .bind(user.username)
    .bind(user.password_hash)
    .bind(user.email)
    .bind(user.first_name)
    .bind(user.last_name)
    .bind(user.phone)
    .bind(user.address)
    .bind(user.tax_id)
    .bind(user.ie)
    .bind(user.role)
    .bind(Utc::now())
    .fetch_all(conn)
    .await?;
    first_row(user)
}

pub async fn fetch_user(username: &str, conn: &mut SqliteConnection) -> Result<Option<UserAccount>, sqlx::Error> {
    let user = sqlx::query_as("SELECT * FROM users WHERE username = $1").bind(username).fetch_all(conn).await?;
    Ok(optional_row(user))
}

pub async fn fetch_all_users(conn: &mut SqliteConnection) -> Result<Vec<UserAccount>, sqlx::Error> {
    let users = sqlx::query_as("SELECT * FROM users ORDER BY created_at ASC").fetch_all(conn).await?;
    Ok(users)
}

/// Flips the active flag. Returns the new value, or `None` if the user does not exist.
pub async fn toggle_active(username: &str, conn: &mut SqliteConnection) -> Result<Option<bool>, sqlx::Error> {
    let active = sqlx::query_scalar("UPDATE users SET is_active = NOT is_active WHERE username = $1 RETURNING is_active")
        .bind(username)
        .fetch_all(conn)
        .await?;
    Ok(optional_row(active))
}

pub async fn delete_user(username: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE username = $1").bind(username).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
