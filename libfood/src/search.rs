//! Narrowing down the list of locations shown in the sidebar and on the map
use crate::location::{Filter, Location};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A coarse bucket of location categories that the user can filter by
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    /// Don't filter by category at all
    #[default]
    All,
    FastFood,
    Cafe,
    BubbleTea,
}

const FAST_FOOD: &[&str] = &[
    "burger",
    "chicken",
    "sandwich",
    "dumplings",
    "beef_bowl",
    "breakfast",
];
const CAFE: &[&str] = &["coffee", "independent", "tea", "bakery"];
const BUBBLE_TEA: &[&str] = &["bubble_tea"];

impl CategoryGroup {
    /// The location categories that belong to this group, or `None` for
    /// [CategoryGroup::All]
    pub fn categories(self) -> Option<&'static [&'static str]> {
        match self {
            Self::All => None,
            Self::FastFood => Some(FAST_FOOD),
            Self::Cafe => Some(CAFE),
            Self::BubbleTea => Some(BUBBLE_TEA),
        }
    }

    pub fn contains(self, category: &str) -> bool {
        self.categories()
            .is_none_or(|categories| categories.contains(&category))
    }

    /// A database filter that selects the same locations as this group, or
    /// `None` if every location matches
    pub fn to_filter(self) -> Option<Filter> {
        self.categories().map(|categories| {
            Filter::Categories(categories.iter().map(ToString::to_string).collect())
        })
    }
}

/// Returns true if `query` is a case-insensitive substring of the location's
/// name or category. An empty query matches everything. The query is not
/// trimmed, so whitespace has to match literally.
pub fn matches_query(location: &Location, query: &str) -> bool {
    matches_lowercase(location, &query.to_lowercase())
}

fn matches_lowercase(location: &Location, query: &str) -> bool {
    query.is_empty()
        || location.name.to_lowercase().contains(query)
        || location.category.to_lowercase().contains(query)
}

/// Select the locations that belong to `group` and match `query`. The result
/// keeps the relative order of the input.
pub fn filter<'a, I>(locations: I, query: &str, group: CategoryGroup) -> Vec<&'a Location>
where
    I: IntoIterator<Item = &'a Location>,
{
    let query = query.to_lowercase();
    locations
        .into_iter()
        .filter(|loc| group.contains(&loc.category))
        .filter(|loc| matches_lowercase(loc, &query))
        .collect()
}

/// The current search settings in the sidebar
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub group: CategoryGroup,
}

impl LocationFilter {
    pub fn new(query: impl Into<String>, group: CategoryGroup) -> Self {
        Self {
            query: query.into(),
            group,
        }
    }

    pub fn apply<'a, I>(&self, locations: I) -> Vec<&'a Location>
    where
        I: IntoIterator<Item = &'a Location>,
    {
        filter(locations, &self.query, self.group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    fn loc(id: i64, name: &str, category: &str) -> Location {
        Location {
            id,
            name: name.to_string(),
            description: Some("burger joint".to_string()),
            latitude: 25.0,
            longitude: 121.5,
            category: category.to_string(),
            icon: None,
            brand: Some("Cafe Brand".to_string()),
            address: Some("Coffee Street".to_string()),
            tags: vec!["coffee".to_string()],
        }
    }

    fn sample() -> Vec<Location> {
        vec![
            loc(1, "McDonald's", "burger"),
            loc(2, "Starbucks", "coffee"),
            loc(3, "50嵐", "bubble_tea"),
            loc(4, "Office", "landmark"),
            loc(5, "Burger King", "burger"),
            loc(6, "Morning Bakery", "bakery"),
            loc(7, "Tea House", "tea"),
            loc(8, "Dumpling Bros", "dumplings"),
        ]
    }

    fn ids(locs: &[&Location]) -> Vec<i64> {
        locs.iter().map(|l| l.id).collect()
    }

    #[test]
    fn test_identity() {
        let locs = sample();
        let res = filter(&locs, "", CategoryGroup::All);
        assert_eq!(res, locs.iter().collect::<Vec<_>>());
        let empty: Vec<Location> = Vec::new();
        assert!(filter(&empty, "burger", CategoryGroup::Cafe).is_empty());
    }

    #[test]
    fn test_group_filter() {
        let locs = sample();
        assert_eq!(ids(&filter(&locs, "", CategoryGroup::FastFood)), vec![1, 5, 8]);
        assert_eq!(ids(&filter(&locs, "", CategoryGroup::Cafe)), vec![2, 6, 7]);
        assert_eq!(ids(&filter(&locs, "", CategoryGroup::BubbleTea)), vec![3]);
        for group in CategoryGroup::iter() {
            for l in filter(&locs, "", group) {
                assert!(group.contains(&l.category), "{group} contains {}", l.category);
            }
        }
    }

    #[test]
    fn test_text_filter() {
        let locs = sample();
        // matches name or category, case-insensitively
        assert_eq!(ids(&filter(&locs, "BURGER", CategoryGroup::All)), vec![1, 5]);
        assert_eq!(ids(&filter(&locs, "tea", CategoryGroup::All)), vec![3, 7]);
        assert_eq!(ids(&filter(&locs, "嵐", CategoryGroup::All)), vec![3]);
        // description, brand, address and tags are never searched
        assert!(filter(&locs, "joint", CategoryGroup::All).is_empty());
        assert!(filter(&locs, "cafe brand", CategoryGroup::All).is_empty());
        assert_eq!(ids(&filter(&locs, "coffee", CategoryGroup::All)), vec![2]);
        // whitespace is not trimmed
        assert_eq!(ids(&filter(&locs, " ", CategoryGroup::All)), vec![5, 6, 7, 8]);
        assert!(filter(&locs, " starbucks", CategoryGroup::All).is_empty());
        // both filters combined
        assert_eq!(ids(&filter(&locs, "e", CategoryGroup::Cafe)), vec![2, 6, 7]);
        assert_eq!(ids(&filter(&locs, "king", CategoryGroup::FastFood)), vec![5]);
        assert!(filter(&locs, "king", CategoryGroup::Cafe).is_empty());

        for l in filter(&locs, "Ur", CategoryGroup::All) {
            assert!(
                l.name.to_lowercase().contains("ur") || l.category.to_lowercase().contains("ur")
            );
        }
    }

    #[test]
    fn test_idempotent() {
        let locs = sample();
        for group in CategoryGroup::iter() {
            for query in ["", "b", "tea", " ", "xyz"] {
                let once = filter(&locs, query, group);
                let twice = filter(once.iter().copied(), query, group);
                assert_eq!(once, twice, "query={query:?} group={group}");
            }
        }
    }

    #[test]
    fn test_matches_query_agrees_with_filter() {
        let locs = sample();
        for query in ["", "bur", "TEA", " "] {
            let expected = filter(&locs, query, CategoryGroup::All);
            let actual: Vec<_> = locs.iter().filter(|l| matches_query(l, query)).collect();
            assert_eq!(expected, actual);
        }
    }

    #[test]
    fn test_group_names() {
        assert_eq!(CategoryGroup::from_str("fast_food"), Ok(CategoryGroup::FastFood));
        assert_eq!(CategoryGroup::from_str("bubble_tea"), Ok(CategoryGroup::BubbleTea));
        assert_eq!(CategoryGroup::Cafe.to_string(), "cafe");
        assert_eq!(CategoryGroup::All.to_string(), "all");
        assert!(CategoryGroup::from_str("pizza").is_err());
        assert!(CategoryGroup::All.to_filter().is_none());
        assert!(matches!(
            CategoryGroup::BubbleTea.to_filter(),
            Some(Filter::Categories(c)) if c == vec!["bubble_tea".to_string()]
        ));
    }

    #[test]
    fn test_location_filter() {
        let locs = sample();
        let f = LocationFilter::new("o", CategoryGroup::FastFood);
        assert_eq!(ids(&f.apply(&locs)), vec![1, 8]);
        assert_eq!(LocationFilter::default().apply(&locs).len(), locs.len());
    }
}
