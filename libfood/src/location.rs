//! Objects to manage the food spots shown on the map
use crate::{
    Database,
    error::{Error, Result},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::{QueryBuilder, Row, Sqlite, SqliteExecutor, types::Json};
use std::ops::RangeInclusive;

/// The category that is assigned to a location when none is given
pub const DEFAULT_CATEGORY: &str = "general";

/// The valid range for a latitude, in degrees
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// The valid range for a longitude, in degrees
pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// A type for specifying fields that can be used for filtering a database query
/// for locations
#[derive(Clone, Debug)]
pub enum Filter {
    /// Match the ID of the location to the given value
    Id(i64),

    /// Match locations whose category is any of the given values
    Categories(Vec<String>),
}

impl Filter {
    fn add_to_query(&self, builder: &mut QueryBuilder<'static, Sqlite>) {
        match self {
            Self::Id(id) => _ = builder.push(" L.id = ").push_bind(*id),
            Self::Categories(categories) if categories.is_empty() => _ = builder.push(" 0"),
            Self::Categories(categories) => {
                builder.push(" L.category IN (");
                let mut list = builder.separated(", ");
                for category in categories {
                    list.push_bind(category.clone());
                }
                list.push_unseparated(")");
            }
        }
    }
}

/// A point on the map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// A food spot that is stored in the database
#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Deserialize, Serialize)]
pub struct Location {
    /// A unique ID that identifies this location in the database
    pub id: i64,

    /// The display name of the location
    pub name: String,

    /// An optional longer description for this location
    #[serde(default)]
    pub description: Option<String>,

    pub latitude: f64,

    pub longitude: f64,

    /// The category of the location. Used both for display and for grouping
    /// in [crate::search::CategoryGroup]
    #[serde(default = "default_category")]
    pub category: String,

    /// An emoji or other glyph that represents the location on the map
    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub address: Option<String>,

    #[sqlx(json)]
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Location {
    fn build_query(filter: Option<Filter>) -> QueryBuilder<'static, Sqlite> {
        let mut qb = QueryBuilder::new(
            r#"SELECT L.id, L.name, L.description, L.latitude, L.longitude, L.category,
            L.icon, L.brand, L.address, L.tags FROM fm_locations L"#,
        );
        if let Some(f) = filter {
            qb.push(" WHERE ");
            f.add_to_query(&mut qb);
        }
        // insertion order
        qb.push(" ORDER BY L.id ASC");
        qb
    }

    /// Loads the location with the given id, returning [Error::NotFound] if
    /// there is no such location
    pub async fn load(id: i64, db: &Database) -> Result<Self> {
        Self::build_query(Some(Filter::Id(id)))
            .build_query_as::<Location>()
            .fetch_optional(db.pool())
            .await?
            .ok_or(Error::NotFound(id))
    }

    /// Loads all matching locations from the database in the order they were
    /// inserted
    pub async fn load_all(filter: Option<Filter>, db: &Database) -> Result<Vec<Location>> {
        Self::build_query(filter)
            .build_query_as()
            .fetch_all(db.pool())
            .await
            .map_err(|e| e.into())
    }

    pub async fn count(db: &Database) -> Result<i64> {
        sqlx::query("SELECT COUNT(*) as nlocations FROM fm_locations")
            .fetch_one(db.pool())
            .await?
            .try_get("nlocations")
            .map_err(|e| e.into())
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// A link to this location on the OpenStreetMap website
    pub fn map_viewer_uri(&self, zoom: f64) -> String {
        let (lat, lon) = (self.latitude, self.longitude);
        format!("https://www.openstreetmap.org/?mlat={lat}&mlon={lon}#map={zoom}/{lat}/{lon}")
    }
}

/// The data needed to create a new [Location]. The id is assigned by the
/// database on insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewLocation {
    pub name: String,
    pub description: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub category: String,
    pub icon: Option<String>,
    pub brand: Option<String>,
    pub address: Option<String>,
    pub tags: Vec<String>,
}

impl NewLocation {
    /// Creates a new location with the given name and coordinates. All other
    /// fields are empty and the category is [DEFAULT_CATEGORY].
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            name: name.into(),
            description: None,
            latitude,
            longitude,
            category: default_category(),
            icon: None,
            brand: None,
            address: None,
            tags: Vec::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        if self.category.is_empty() {
            self.category = default_category();
        }
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parses and validates a new location from a JSON object. Fields are
    /// checked in a fixed order and the first failure is reported as an
    /// [Error::Validation] naming that field. Unknown fields (including `id`)
    /// are ignored.
    pub fn from_json(value: &Value) -> Result<Self> {
        let obj = value
            .as_object()
            .ok_or_else(|| Error::validation("", "Expected a JSON object"))?;
        let name = text_field(obj, "name")?
            .ok_or_else(|| Error::validation("name", "name is required"))?;
        check_name(&name)?;
        let description = text_field(obj, "description")?;
        let latitude = coordinate_field(obj, "latitude", LATITUDE_RANGE)?;
        let longitude = coordinate_field(obj, "longitude", LONGITUDE_RANGE)?;
        let category = text_field(obj, "category")?
            .filter(|c| !c.is_empty())
            .unwrap_or_else(default_category);
        let icon = text_field(obj, "icon")?;
        let brand = text_field(obj, "brand")?;
        let address = text_field(obj, "address")?;
        let tags = tags_field(obj)?;
        Ok(Self {
            name,
            description,
            latitude,
            longitude,
            category,
            icon,
            brand,
            address,
            tags,
        })
    }

    /// Check the invariants of a location that was built in code rather than
    /// parsed with [NewLocation::from_json()]
    pub fn validate(&self) -> Result<()> {
        check_name(&self.name)?;
        check_coordinate("latitude", self.latitude, LATITUDE_RANGE)?;
        check_coordinate("longitude", self.longitude, LONGITUDE_RANGE)?;
        Ok(())
    }

    /// Add this location to the database and return the stored row
    pub async fn insert(&self, db: &Database) -> Result<Location> {
        self.insert_with(db.pool()).await
    }

    /// Same as [NewLocation::insert()], but lets the caller choose the
    /// executor, e.g. to insert within a transaction
    pub async fn insert_with<'e, E: SqliteExecutor<'e>>(&self, executor: E) -> Result<Location> {
        self.validate()?;
        sqlx::query_as::<_, Location>(
            r#"INSERT INTO fm_locations
            (name, description, latitude, longitude, category, icon, brand, address, tags)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, name, description, latitude, longitude, category, icon, brand, address, tags"#,
        )
        .bind(&self.name)
        .bind(&self.description)
        .bind(self.latitude)
        .bind(self.longitude)
        .bind(&self.category)
        .bind(&self.icon)
        .bind(&self.brand)
        .bind(&self.address)
        .bind(Json(&self.tags))
        .fetch_one(executor)
        .await
        .map_err(|e| e.into())
    }
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::validation("name", "name must not be empty"));
    }
    Ok(())
}

fn check_coordinate(field: &str, value: f64, range: RangeInclusive<f64>) -> Result<()> {
    if !value.is_finite() {
        return Err(Error::validation(field, format!("{field} must be a number")));
    }
    if !range.contains(&value) {
        return Err(Error::validation(
            field,
            format!(
                "{field} must be between {} and {}",
                range.start(),
                range.end()
            ),
        ));
    }
    Ok(())
}

/// A missing or null field is `None`. Anything other than a string is an error.
fn text_field(obj: &Map<String, Value>, field: &str) -> Result<Option<String>> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(Error::validation(field, format!("{field} must be a string"))),
    }
}

/// Coordinates are required and may be given either as a JSON number or as a
/// string containing a number
fn coordinate_field(
    obj: &Map<String, Value>,
    field: &str,
    range: RangeInclusive<f64>,
) -> Result<f64> {
    let value = match obj.get(field) {
        None | Some(Value::Null) => {
            return Err(Error::validation(field, format!("{field} is required")));
        }
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    }
    .ok_or_else(|| Error::validation(field, format!("{field} must be a number")))?;
    check_coordinate(field, value, range)?;
    Ok(value)
}

fn tags_field(obj: &Map<String, Value>) -> Result<Vec<String>> {
    match obj.get("tags") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(ToString::to_string)
                    .ok_or_else(|| Error::validation("tags", "tags must be an array of strings"))
            })
            .collect(),
        Some(_) => Err(Error::validation("tags", "tags must be an array of strings")),
    }
}
