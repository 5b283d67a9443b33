use chrono::Utc;
use sqlx::SqliteConnection;

use super::first_row;
use crate::db_types::{Demand, DemandId, ListingStatus, NewDemand};

pub async fn insert_demand(owner: &str, demand: NewDemand, conn: &mut SqliteConnection) -> Result<Demand, sqlx::Error> {
    let demand = sqlx::query_as(
        r#"
            INSERT INTO demands (id, owner, breed, quantity, city, state, max_price, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *;
        "#,
    )
    .bind(DemandId::random())
    .bind(owner)
    .bind(demand.breed)
    .bind(demand.quantity)
    .bind(demand.city)
    .bind(demand.state)
    .bind(demand.max_price)
    .bind(ListingStatus::Open)
    .bind(Utc::now())
    .fetch_all(conn)
    .await?;
    first_row(demand)
}

pub async fn fetch_open_demands(conn: &mut SqliteConnection) -> Result<Vec<Demand>, sqlx::Error> {
    let demands = sqlx::query_as("SELECT * FROM demands WHERE status = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(ListingStatus::Open)
        .fetch_all(conn)
        .await?;
    Ok(demands)
}

pub async fn fetch_demands_for_owner(owner: &str, conn: &mut SqliteConnection) -> Result<Vec<Demand>, sqlx::Error> {
    let demands = sqlx::query_as("SELECT * FROM demands WHERE owner = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(owner)
        .fetch_all(conn)
        .await?;
    Ok(demands)
}

pub async fn fetch_all_demands(conn: &mut SqliteConnection) -> Result<Vec<Demand>, sqlx::Error> {
    let demands = sqlx::query_as("SELECT * FROM demands ORDER BY created_at DESC, rowid DESC").fetch_all(conn).await?;
    Ok(demands)
}

pub async fn delete_demand(id: &DemandId, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM demands WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}
