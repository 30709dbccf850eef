//! Host sensor states stored in Postgres.
//!
//! ```sql
//! CREATE TABLE sensor_states (
//!     entity_id TEXT PRIMARY KEY,
//!     state     TEXT NOT NULL,
//!     unit      TEXT
//! );
//! ```

use std::collections::HashMap;

use anyhow::{Context as _, Result};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::wow::SensorState;

const MAX_CONNECTIONS: u32 = 2;

pub async fn new_pool(database_url: &str) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .context("failed to connect to database")
}

/// Current state of each of `entity_ids` that the store knows about.
pub async fn get_sensor_states(
    pool: &PgPool,
    entity_ids: &[String],
) -> Result<HashMap<String, SensorState>> {
    if entity_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, String, Option<String>)> = sqlx::query_as(
        r#"
        SELECT entity_id, state, unit
        FROM sensor_states
        WHERE entity_id = ANY($1)
        "#,
    )
    .bind(entity_ids)
    .fetch_all(pool)
    .await
    .context("failed to fetch sensor states")?;

    Ok(into_states(rows))
}

fn into_states(rows: Vec<(String, String, Option<String>)>) -> HashMap<String, SensorState> {
    rows.into_iter()
        .map(|(entity_id, value, unit)| (entity_id, SensorState { value, unit }))
        .collect()
}
