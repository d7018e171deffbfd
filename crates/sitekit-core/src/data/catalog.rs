//! Category catalog
//!
//! Shapes and placed objects carry a category tag ("residential", "road", ...)
//! that keys into this catalog. Every lookup succeeds: missing or unknown
//! tags resolve to the `unassigned` entry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tag used when a shape has no category or an unknown one
pub const UNASSIGNED_CATEGORY: &str = "unassigned";

/// Catalog entry describing a land-use category
///
/// Economic figures are per square meter of occupied area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    /// Catalog key
    pub key: String,
    /// Display name
    pub name: String,
    /// Fill color as `#RRGGBB`
    pub display_color: String,
    /// Construction cost per m²
    #[serde(default)]
    pub cost: f64,
    /// Yearly income per m²
    #[serde(default)]
    pub income: f64,
    /// Occupants per m²
    #[serde(default)]
    pub people: f64,
    /// Livability score, 0-10
    #[serde(default)]
    pub livability_score: f64,
}

impl Category {
    /// Create a category with no economic figures
    pub fn new(key: impl Into<String>, name: impl Into<String>, display_color: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            display_color: display_color.into(),
            cost: 0.0,
            income: 0.0,
            people: 0.0,
            livability_score: 0.0,
        }
    }

    /// Set cost, income and occupancy rates
    pub fn with_rates(mut self, cost: f64, income: f64, people: f64) -> Self {
        self.cost = cost;
        self.income = income;
        self.people = people;
        self
    }

    pub fn with_livability(mut self, score: f64) -> Self {
        self.livability_score = score;
        self
    }

    fn unassigned() -> Self {
        Self::new(UNASSIGNED_CATEGORY, "Unassigned", "#9E9E9E")
    }
}

/// Category catalog with a guaranteed fallback entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryCatalog {
    categories: HashMap<String, Category>,
    fallback: Category,
}

impl CategoryCatalog {
    /// Create a catalog holding only the fallback entry
    pub fn new() -> Self {
        Self {
            categories: HashMap::new(),
            fallback: Category::unassigned(),
        }
    }

    /// Catalog with the standard site-planning categories
    pub fn standard() -> Self {
        let mut catalog = Self::new();
        catalog.insert(
            Category::new("residential", "Residential", "#E57373")
                .with_rates(1800.0, 95.0, 0.03)
                .with_livability(7.0),
        );
        catalog.insert(
            Category::new("commercial", "Commercial", "#64B5F6")
                .with_rates(2100.0, 180.0, 0.01)
                .with_livability(5.0),
        );
        catalog.insert(
            Category::new("office", "Office", "#7986CB")
                .with_rates(2300.0, 160.0, 0.02)
                .with_livability(4.5),
        );
        catalog.insert(
            Category::new("industrial", "Industrial", "#A1887F")
                .with_rates(1200.0, 70.0, 0.005)
                .with_livability(2.0),
        );
        catalog.insert(
            Category::new("road", "Road", "#616161")
                .with_rates(150.0, 0.0, 0.0)
                .with_livability(3.0),
        );
        catalog.insert(
            Category::new("green_space", "Green space", "#81C784")
                .with_rates(60.0, 0.0, 0.0)
                .with_livability(9.5),
        );
        catalog.insert(
            Category::new("parking", "Parking", "#BDBDBD")
                .with_rates(300.0, 25.0, 0.0)
                .with_livability(2.5),
        );
        catalog
    }

    /// Add or replace an entry
    ///
    /// The fallback entry can be overridden but never removed.
    pub fn insert(&mut self, category: Category) {
        if category.key == UNASSIGNED_CATEGORY {
            self.fallback = category;
        } else {
            self.categories.insert(category.key.clone(), category);
        }
    }

    /// Resolve a tag, falling back to `unassigned`
    pub fn resolve(&self, tag: Option<&str>) -> &Category {
        tag.and_then(|t| self.categories.get(t))
            .unwrap_or(&self.fallback)
    }

    /// Canonical tag for storage: known tags pass through, anything else
    /// becomes `unassigned`
    pub fn canonical_tag(&self, tag: Option<&str>) -> String {
        self.resolve(tag).key.clone()
    }

    /// Check whether a tag is a known, non-fallback category
    pub fn contains(&self, tag: &str) -> bool {
        self.categories.contains_key(tag)
    }

    /// All entries including the fallback, sorted by key
    pub fn entries(&self) -> Vec<&Category> {
        let mut all: Vec<&Category> = self.categories.values().collect();
        all.push(&self.fallback);
        all.sort_by(|a, b| a.key.cmp(&b.key));
        all
    }

    pub fn len(&self) -> usize {
        self.categories.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Default for CategoryCatalog {
    fn default() -> Self {
        Self::standard()
    }
}
