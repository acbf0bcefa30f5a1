//! Tour database operations
//!
//! A tour is one sellable travel package: where it starts, where it goes,
//! what it costs, and how long it runs.

use bigdecimal::BigDecimal;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use crate::{Error, Result};

/// Maximum character length for country fields
pub const COUNTRY_MAX_LEN: usize = 100;

/// Maximum significant digits in a price at two decimal places
pub const PRICE_MAX_DIGITS: u64 = 10;

/// Decimal places stored for a price
pub const PRICE_SCALE: i64 = 2;

/// Tour record
#[derive(Debug, Clone)]
pub struct Tour {
    pub guid: Uuid,
    pub origin_country: String,
    pub destination_country: String,
    pub price: BigDecimal,
    pub duration: i64,
    pub description: String,
    /// Assigned by the database; None until the row is stored
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl Tour {
    /// Validate a payload and build a new tour with a fresh guid
    pub fn new(payload: TourPayload) -> Result<Self> {
        payload.into_tour(Uuid::new_v4())
    }
}

/// User-supplied tour fields, as accepted by the HTTP API.
///
/// The guid and timestamps are server-owned and never part of a payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TourPayload {
    pub origin_country: String,
    pub destination_country: String,
    /// Decimal string, e.g. "1499.99"
    pub price: String,
    /// Length of the package in days
    pub duration: i64,
    #[serde(default)]
    pub description: String,
}

impl TourPayload {
    /// Validate all fields and build a [`Tour`] carrying the given guid
    pub fn into_tour(self, guid: Uuid) -> Result<Tour> {
        let origin_country = validate_country("origin_country", &self.origin_country)?;
        let destination_country =
            validate_country("destination_country", &self.destination_country)?;
        let price = parse_price(&self.price)?;

        if self.duration <= 0 {
            return Err(Error::InvalidInput(
                "duration must be a positive number of days".to_string(),
            ));
        }

        Ok(Tour {
            guid,
            origin_country,
            destination_country,
            price,
            duration: self.duration,
            description: self.description,
            created_at: None,
            updated_at: None,
        })
    }
}

fn validate_country(field: &str, value: &str) -> Result<String> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(Error::InvalidInput(format!("{} must not be empty", field)));
    }

    if trimmed.chars().count() > COUNTRY_MAX_LEN {
        return Err(Error::InvalidInput(format!(
            "{} exceeds {} characters",
            field, COUNTRY_MAX_LEN
        )));
    }

    Ok(trimmed.to_string())
}

/// Parse and validate a price string into a two-decimal-place amount.
///
/// Rejects negative amounts, more than two decimal places, and amounts
/// wider than [`PRICE_MAX_DIGITS`] significant digits at scale 2.
pub fn parse_price(raw: &str) -> Result<BigDecimal> {
    let value = BigDecimal::from_str(raw.trim())
        .map_err(|_| Error::InvalidInput(format!("price is not a decimal number: {:?}", raw)))?;

    if value < BigDecimal::from(0) {
        return Err(Error::InvalidInput("price must not be negative".to_string()));
    }

    if value.fractional_digit_count() > PRICE_SCALE {
        return Err(Error::InvalidInput(format!(
            "price has more than {} decimal places",
            PRICE_SCALE
        )));
    }

    // Pad to the canonical scale; validation above guarantees no digits drop
    let scaled = value.with_scale(PRICE_SCALE);

    if scaled.digits() > PRICE_MAX_DIGITS {
        return Err(Error::InvalidInput(format!(
            "price exceeds {} digits",
            PRICE_MAX_DIGITS
        )));
    }

    Ok(scaled)
}

/// Canonical column rendering of a price
fn price_to_db(price: &BigDecimal) -> String {
    price.with_scale(PRICE_SCALE).to_string()
}

/// Optional constraints applied to tour listing and counting.
///
/// Set fields compose with AND.
#[derive(Debug, Clone, Default)]
pub struct TourFilter {
    pub origin_country: Option<String>,
    pub destination_country: Option<String>,
    pub max_price: Option<f64>,
    pub max_duration: Option<i64>,
}

impl TourFilter {
    fn where_clause(&self) -> String {
        let mut conditions: Vec<&str> = Vec::new();

        if self.origin_country.is_some() {
            conditions.push("origin_country = ?");
        }
        if self.destination_country.is_some() {
            conditions.push("destination_country = ?");
        }
        if self.max_price.is_some() {
            // price is stored as TEXT; compare numerically
            conditions.push("CAST(price AS REAL) <= ?");
        }
        if self.max_duration.is_some() {
            conditions.push("duration <= ?");
        }

        if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        }
    }
}

/// Insert a new tour row
pub async fn insert_tour(pool: &SqlitePool, tour: &Tour) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO tours (
            guid, origin_country, destination_country, price, duration, description,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
        "#,
    )
    .bind(tour.guid.to_string())
    .bind(&tour.origin_country)
    .bind(&tour.destination_country)
    .bind(price_to_db(&tour.price))
    .bind(tour.duration)
    .bind(&tour.description)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load tour by guid
pub async fn load_tour(pool: &SqlitePool, guid: Uuid) -> Result<Option<Tour>> {
    let row = sqlx::query(
        r#"
        SELECT guid, origin_country, destination_country, price, duration, description,
               created_at, updated_at
        FROM tours
        WHERE guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(tour_from_row(&row)?)),
        None => Ok(None),
    }
}

/// List tours newest first, with optional filters
pub async fn list_tours(
    pool: &SqlitePool,
    filter: &TourFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Tour>> {
    // guid breaks ties between rows created in the same second
    let sql = format!(
        "SELECT guid, origin_country, destination_country, price, duration, description, \
         created_at, updated_at \
         FROM tours{} \
         ORDER BY created_at DESC, guid DESC \
         LIMIT ? OFFSET ?",
        filter.where_clause()
    );

    let mut query = sqlx::query(&sql);
    if let Some(origin) = &filter.origin_country {
        query = query.bind(origin.as_str());
    }
    if let Some(destination) = &filter.destination_country {
        query = query.bind(destination.as_str());
    }
    if let Some(max_price) = filter.max_price {
        query = query.bind(max_price);
    }
    if let Some(max_duration) = filter.max_duration {
        query = query.bind(max_duration);
    }

    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

    rows.iter().map(tour_from_row).collect()
}

/// Count tours matching the filter
pub async fn count_tours(pool: &SqlitePool, filter: &TourFilter) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM tours{}", filter.where_clause());

    let mut query = sqlx::query_scalar(&sql);
    if let Some(origin) = &filter.origin_country {
        query = query.bind(origin.as_str());
    }
    if let Some(destination) = &filter.destination_country {
        query = query.bind(destination.as_str());
    }
    if let Some(max_price) = filter.max_price {
        query = query.bind(max_price);
    }
    if let Some(max_duration) = filter.max_duration {
        query = query.bind(max_duration);
    }

    let count: i64 = query.fetch_one(pool).await?;
    Ok(count)
}

/// Update all user fields of an existing tour.
///
/// Returns false when no row matched the guid.
pub async fn update_tour(pool: &SqlitePool, tour: &Tour) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE tours SET
            origin_country = ?,
            destination_country = ?,
            price = ?,
            duration = ?,
            description = ?,
            updated_at = CURRENT_TIMESTAMP
        WHERE guid = ?
        "#,
    )
    .bind(&tour.origin_country)
    .bind(&tour.destination_country)
    .bind(price_to_db(&tour.price))
    .bind(tour.duration)
    .bind(&tour.description)
    .bind(tour.guid.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete tour by guid.
///
/// Returns false when no row matched.
pub async fn delete_tour(pool: &SqlitePool, guid: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tours WHERE guid = ?")
        .bind(guid.to_string())
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

fn tour_from_row(row: &SqliteRow) -> Result<Tour> {
    let guid_str: String = row.get("guid");
    let price_str: String = row.get("price");

    Ok(Tour {
        guid: Uuid::parse_str(&guid_str)
            .map_err(|e| Error::Internal(format!("stored guid {:?}: {}", guid_str, e)))?,
        origin_country: row.get("origin_country"),
        destination_country: row.get("destination_country"),
        price: BigDecimal::from_str(&price_str)
            .map_err(|e| Error::Internal(format!("stored price {:?}: {}", price_str, e)))?,
        duration: row.get("duration"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}
