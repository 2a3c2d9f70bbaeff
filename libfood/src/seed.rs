//! Populating a fresh database with a starting set of locations
use crate::{
    Database,
    error::Result,
    location::{Location, NewLocation},
};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, error, info, warn};

/// The fixture that is compiled into the library and used when no fixture
/// file is configured
pub const BUNDLED_FIXTURE: &str = include_str!("../../db/seed/locations.json");

/// What [seed_if_empty()] ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The database already contained this many locations
    Skipped(i64),
    /// All fixture locations were inserted
    Seeded(usize),
    /// The fixture couldn't be loaded or inserted, so only the landmark
    /// location was inserted
    Fallback,
    /// Nothing could be inserted at all
    Failed,
}

/// The single location inserted when the fixture can't be used
pub fn landmark() -> NewLocation {
    NewLocation::new("內湖科技園區服務大樓", 25.0771545, 121.5733916)
        .with_category("landmark")
        .with_description("地圖中心點範例")
}

/// Parse a JSON array of locations in the same format accepted when
/// creating a location over the API
pub fn parse_fixture(contents: &str) -> Result<Vec<NewLocation>> {
    let values: Vec<Value> = serde_json::from_str(contents)?;
    values.iter().map(NewLocation::from_json).collect()
}

/// Read a fixture from the given file, or use [BUNDLED_FIXTURE] if `None`
pub async fn load_fixture(path: Option<&Path>) -> Result<Vec<NewLocation>> {
    match path {
        Some(path) => {
            debug!(?path, "reading seed fixture");
            let contents = tokio::fs::read_to_string(path).await?;
            parse_fixture(&contents)
        }
        None => parse_fixture(BUNDLED_FIXTURE),
    }
}

/// Insert all of the given locations, or none of them
pub async fn insert_all(locations: &[NewLocation], db: &Database) -> Result<Vec<Location>> {
    let mut tx = db.pool().begin().await?;
    let mut inserted = Vec::with_capacity(locations.len());
    for location in locations {
        inserted.push(location.insert_with(&mut *tx).await?);
    }
    tx.commit().await?;
    Ok(inserted)
}

/// Seed the database with the locations from the fixture file at `path` (or
/// the bundled fixture) if it doesn't contain any locations yet. Errors are
/// logged rather than returned so that a failure here never prevents the
/// application from starting.
pub async fn seed_if_empty(db: &Database, path: Option<&Path>) -> SeedOutcome {
    match Location::count(db).await {
        Ok(0) => (),
        Ok(n) => {
            debug!(n, "database already contains locations, not seeding");
            return SeedOutcome::Skipped(n);
        }
        Err(e) => {
            error!("Seeding failed: unable to count existing locations: {e}");
            return SeedOutcome::Failed;
        }
    }

    let seeded = match load_fixture(path).await {
        Ok(locations) => insert_all(&locations, db).await,
        Err(e) => Err(e),
    };
    match seeded {
        Ok(locations) => {
            info!("Seeded database with {} locations", locations.len());
            SeedOutcome::Seeded(locations.len())
        }
        Err(e) => {
            error!("Seeding failed: {e}");
            warn!("Inserting a single landmark location instead");
            match landmark().insert(db).await {
                Ok(_) => SeedOutcome::Fallback,
                Err(e) => {
                    error!("Unable to insert the landmark location: {e}");
                    SeedOutcome::Failed
                }
            }
        }
    }
}
