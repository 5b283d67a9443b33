use sqlx::SqliteConnection;

use crate::db_types::CustomCity;

pub async fn fetch_breeds(conn: &mut SqliteConnection) -> Result<Vec<String>, sqlx::Error> {
    let breeds = sqlx::query_scalar("SELECT name FROM breeds ORDER BY name ASC").fetch_all(conn).await?;
    Ok(breeds)
}

/// Adds a breed. Adding an existing breed is a no-op.
pub async fn insert_breed(name: &str, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO breeds (name) VALUES ($1)").bind(name).execute(conn).await?;
    Ok(())
}

pub async fn delete_breed(name: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM breeds WHERE name = $1").bind(name).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn fetch_custom_cities(conn: &mut SqliteConnection) -> Result<Vec<CustomCity>, sqlx::Error> {
    let cities = sqlx::query_as("SELECT state, name FROM custom_cities ORDER BY rowid ASC").fetch_all(conn).await?;
    Ok(cities)
}

pub async fn insert_custom_city(city: &CustomCity, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO custom_cities (state, name) VALUES ($1, $2)")
        .bind(&city.state)
        .bind(&city.name)
        .execute(conn)
        .await?;
    Ok(())
}

pub async fn delete_custom_city(state: &str, name: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM custom_cities WHERE state = $1 AND name = $2")
        .bind(state)
        .bind(name)
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}
