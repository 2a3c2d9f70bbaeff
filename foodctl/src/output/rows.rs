use libfood::{location::Location, search::CategoryGroup};
use serde::Serialize;
use tabled::Tabled;

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct LocationRow {
    id: i64,
    name: String,
    category: String,
}

impl LocationRow {
    pub(crate) fn new(location: &Location) -> Self {
        Self {
            id: location.id,
            name: display_name(location),
            category: location.category.clone(),
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct LocationRowFull {
    id: i64,
    name: String,
    category: String,
    latitude: f64,
    longitude: f64,
    #[tabled(display("tabled::derive::display::option", ""))]
    description: Option<String>,
    #[tabled(display("tabled::derive::display::option", ""))]
    brand: Option<String>,
    #[tabled(display("tabled::derive::display::option", ""))]
    address: Option<String>,
    #[tabled(display("format_tags"))]
    #[serde(serialize_with = "serialize_tags")]
    tags: Vec<String>,
    #[tabled(rename = "Map")]
    map: String,
}

impl LocationRowFull {
    pub(crate) fn new(location: &Location) -> Self {
        Self {
            id: location.id,
            name: display_name(location),
            category: location.category.clone(),
            latitude: location.latitude,
            longitude: location.longitude,
            description: location.description.clone(),
            brand: location.brand.clone(),
            address: location.address.clone(),
            tags: location.tags.clone(),
            map: location.map_viewer_uri(libfood::viewstate::TARGET_ZOOM),
        }
    }
}

#[derive(Tabled, Serialize)]
#[tabled(rename_all = "PascalCase")]
pub(crate) struct GroupRow {
    group: CategoryGroup,
    #[tabled(display("format_tags"))]
    #[serde(serialize_with = "serialize_tags")]
    categories: Vec<String>,
}

impl GroupRow {
    pub(crate) fn new(group: CategoryGroup) -> Self {
        Self {
            group,
            categories: group
                .categories()
                .map(|c| c.iter().map(ToString::to_string).collect())
                .unwrap_or_else(|| vec!["*".to_string()]),
        }
    }
}

fn display_name(location: &Location) -> String {
    match &location.icon {
        Some(icon) => format!("{icon} {}", location.name),
        None => location.name.clone(),
    }
}

fn format_tags(tags: &[String]) -> String {
    tags.join(", ")
}

// csv can't serialize nested sequences, so tags are flattened to one field
fn serialize_tags<S: serde::Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_tags(tags))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_row() {
        let loc: Location = serde_json::from_value(serde_json::json!({
            "id": 2,
            "name": "McDonald's",
            "latitude": 25.0,
            "longitude": 121.5,
            "category": "burger",
            "icon": "🍔",
            "tags": ["24h", "drive-thru"],
        }))
        .expect("Invalid test location");
        let row = LocationRowFull::new(&loc);
        assert_eq!(row.name, "🍔 McDonald's");
        assert_eq!(format_tags(&row.tags), "24h, drive-thru");
        assert!(row.map.contains("25"));
        let json = serde_json::to_value(&row).expect("Failed to serialize");
        assert_eq!(json["tags"], "24h, drive-thru");
    }

    #[test]
    fn test_group_row() {
        let row = GroupRow::new(CategoryGroup::BubbleTea);
        assert_eq!(row.categories, vec!["bubble_tea"]);
        assert_eq!(GroupRow::new(CategoryGroup::All).categories, vec!["*"]);
    }
}
