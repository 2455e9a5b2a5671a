//! Request-scoped domain types shared by the search, routing and storage crates.

use chrono::{DateTime, Utc};
use nearbuy_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// Page size applied when a caller does not specify one.
pub const DEFAULT_PAGE_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seller {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub location: Coordinate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub image_url: String,
    /// Unit price in the smallest currency unit.
    pub price: i64,
    pub created_at: DateTime<Utc>,
}

/// A seller paired with its current item listings.
///
/// `seller.id` is unique across the catalog, but a seller may be returned by
/// more than one cell query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerBundle {
    pub seller: Seller,
    pub items: Vec<Item>,
}

impl SellerBundle {
    #[must_use]
    pub fn item(&self, item_id: i64) -> Option<&Item> {
        self.items.iter().find(|item| item.id == item_id)
    }
}

/// Input to one nearby search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    /// When set, spatial search is skipped and this seller is returned directly.
    pub seller_id: Option<i64>,
    /// Case-insensitive substring of the seller name or any item name.
    pub name: Option<String>,
    /// Exact seller category, compared case-insensitively.
    pub category: Option<String>,
    pub limit: usize,
    pub offset: usize,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            seller_id: None,
            name: None,
            category: None,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl SearchFilter {
    /// Number of distinct sellers needed to fill the requested page.
    #[must_use]
    pub fn required(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    /// The non-spatial, non-pagination part of the filter passed to the store.
    #[must_use]
    pub fn catalog_filter(&self) -> CatalogFilter {
        CatalogFilter {
            name: self.name.clone(),
            category: self.category.clone(),
        }
    }
}

/// Predicates a catalog store applies to every query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogFilter {
    pub name: Option<String>,
    pub category: Option<String>,
}

impl CatalogFilter {
    /// Reference semantics for the filter, for stores that evaluate it in memory.
    #[must_use]
    pub fn matches(&self, bundle: &SellerBundle) -> bool {
        if let Some(category) = &self.category {
            if !bundle.seller.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }

        if let Some(name) = &self.name {
            let needle = name.to_lowercase();
            let seller_hit = bundle.seller.name.to_lowercase().contains(&needle);
            let item_hit = bundle
                .items
                .iter()
                .any(|item| item.name.to_lowercase().contains(&needle));
            if !seller_hit && !item_hit {
                return false;
            }
        }

        true
    }
}

/// A point visited by a route. `label` is for display only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub label: String,
    pub location: Coordinate,
}

impl Stop {
    #[must_use]
    pub fn new(label: impl Into<String>, location: Coordinate) -> Self {
        Self {
            label: label.into(),
            location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteResult {
    /// Origin, the intermediate stops in visiting order, then destination.
    pub ordered_labels: Vec<String>,
    pub total_distance_km: f64,
    pub estimated_minutes: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(name: &str, category: &str, items: &[&str]) -> SellerBundle {
        let now = Utc::now();
        SellerBundle {
            seller: Seller {
                id: 1,
                name: name.to_string(),
                category: category.to_string(),
                image_url: String::new(),
                location: Coordinate::new(0.0, 0.0),
                created_at: now,
            },
            items: items
                .iter()
                .enumerate()
                .map(|(i, item)| Item {
                    id: i64::try_from(i).unwrap() + 1,
                    name: (*item).to_string(),
                    category: "Food".to_string(),
                    image_url: String::new(),
                    price: 1_000,
                    created_at: now,
                })
                .collect(),
        }
    }

    #[test]
    fn required_is_offset_plus_limit() {
        let filter = SearchFilter {
            limit: 10,
            offset: 20,
            ..SearchFilter::default()
        };
        assert_eq!(filter.required(), 30);
    }

    #[test]
    fn required_saturates() {
        let filter = SearchFilter {
            limit: usize::MAX,
            offset: 1,
            ..SearchFilter::default()
        };
        assert_eq!(filter.required(), usize::MAX);
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(CatalogFilter::default().matches(&bundle("Warung", "SmallRestaurant", &[])));
    }

    #[test]
    fn category_match_ignores_case() {
        let filter = CatalogFilter {
            category: Some("smallrestaurant".to_string()),
            ..CatalogFilter::default()
        };
        assert!(filter.matches(&bundle("Warung", "SmallRestaurant", &[])));
        assert!(!filter.matches(&bundle("Warung", "BoothKiosk", &[])));
    }

    #[test]
    fn name_matches_seller_or_item_substring() {
        let filter = CatalogFilter {
            name: Some("SATE".to_string()),
            ..CatalogFilter::default()
        };
        assert!(filter.matches(&bundle("Sate Padang", "SmallRestaurant", &[])));
        assert!(filter.matches(&bundle("Warung Ibu", "SmallRestaurant", &["Sate Ayam"])));
        assert!(!filter.matches(&bundle("Warung Ibu", "SmallRestaurant", &["Nasi Goreng"])));
    }

    #[test]
    fn bundle_item_lookup() {
        let b = bundle("Warung", "SmallRestaurant", &["Teh", "Kopi"]);
        assert_eq!(b.item(2).map(|i| i.name.as_str()), Some("Kopi"));
        assert!(b.item(9).is_none());
    }
}
