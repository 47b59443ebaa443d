use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use tracing::warn;

/// The closed set of expense categories.
///
/// The serialized form is the lowercase key (`food`, `transport`, `bills`, `other`).
#[derive(
    Debug, Default, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    Food,
    Transport,
    Bills,
    Other,
}

/// Presentation color group of a category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorGroup {
    Emerald,
    Sky,
    Rose,
    Amber,
}

serde_plain::derive_display_from_serialize!(ColorGroup);

/// Static display metadata for a category.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct CategoryInfo {
    pub label: &'static str,
    pub color: ColorGroup,
}

const FOOD: CategoryInfo = CategoryInfo {
    label: "Food",
    color: ColorGroup::Emerald,
};
const TRANSPORT: CategoryInfo = CategoryInfo {
    label: "Transport",
    color: ColorGroup::Sky,
};
const BILLS: CategoryInfo = CategoryInfo {
    label: "Bills",
    color: ColorGroup::Rose,
};
const OTHER: CategoryInfo = CategoryInfo {
    label: "Other",
    color: ColorGroup::Amber,
};

impl Category {
    /// Every category in catalog order. Pickers and the breakdown chart use this order.
    pub const ALL: [Category; 4] = [
        Category::Food,
        Category::Transport,
        Category::Bills,
        Category::Other,
    ];

    pub fn info(&self) -> &'static CategoryInfo {
        match self {
            Category::Food => &FOOD,
            Category::Transport => &TRANSPORT,
            Category::Bills => &BILLS,
            Category::Other => &OTHER,
        }
    }

    pub fn label(&self) -> &'static str {
        self.info().label
    }

    pub fn color(&self) -> ColorGroup {
        self.info().color
    }

    pub fn key(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Transport => "transport",
            Category::Bills => "bills",
            Category::Other => "other",
        }
    }

    /// Parses a category key, falling back to `Other` for anything unrecognized. Used when
    /// loading records that may carry legacy category values, which are never rejected.
    pub fn from_str_lossy(s: &str) -> Category {
        match Category::from_str(s) {
            Ok(category) => category,
            Err(_) => {
                warn!("Unknown category '{s}', treating it as '{}'", Category::Other);
                Category::Other
            }
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    /// Strict parse of a category key or label, case-insensitive.
    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim();
        let found = Category::ALL.into_iter().find(|c| {
            c.key().eq_ignore_ascii_case(needle) || c.label().eq_ignore_ascii_case(needle)
        });
        match found {
            Some(category) => Ok(category),
            None => bail!(
                "Invalid category '{s}', expected one of: {}",
                Category::ALL.map(|c| c.key()).join(", ")
            ),
        }
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Category::from_str_lossy(&s))
    }
}

/// The category filter of the view: everything, or exactly one category.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => *c == category,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, CategoryFilter::All)
    }
}

impl From<Category> for CategoryFilter {
    fn from(value: Category) -> Self {
        CategoryFilter::Only(value)
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("all"),
            CategoryFilter::Only(c) => Display::fmt(c, f),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            Ok(CategoryFilter::Only(Category::from_str(s)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_metadata() {
        assert_eq!(Category::Food.label(), "Food");
        assert_eq!(Category::Food.color(), ColorGroup::Emerald);
        assert_eq!(Category::Transport.color(), ColorGroup::Sky);
        assert_eq!(Category::Bills.color(), ColorGroup::Rose);
        assert_eq!(Category::Other.color(), ColorGroup::Amber);
        assert_eq!(ColorGroup::Amber.to_string(), "amber");
    }

    #[test]
    fn test_parse_key_and_label() {
        assert_eq!(Category::from_str("bills").unwrap(), Category::Bills);
        assert_eq!(Category::from_str("Transport").unwrap(), Category::Transport);
        assert_eq!(Category::from_str(" FOOD ").unwrap(), Category::Food);
    }

    #[test]
    fn test_parse_unknown_is_error() {
        let err = Category::from_str("groceries").unwrap_err().to_string();
        assert!(err.contains("food, transport, bills, other"), "{err}");
    }

    #[test]
    fn test_lossy_parse_falls_back_to_other() {
        assert_eq!(Category::from_str_lossy("entertainment"), Category::Other);
        assert_eq!(Category::from_str_lossy("food"), Category::Food);
    }

    #[test]
    fn test_deserialize_legacy_value() {
        let c: Category = serde_json::from_str("\"utilities\"").unwrap();
        assert_eq!(c, Category::Other);
        assert_eq!(serde_json::to_string(&Category::Bills).unwrap(), "\"bills\"");
    }

    #[test]
    fn test_filter() {
        assert!(CategoryFilter::All.matches(Category::Bills));
        let food = CategoryFilter::from_str("food").unwrap();
        assert!(food.matches(Category::Food));
        assert!(!food.matches(Category::Bills));
        assert_eq!(CategoryFilter::from_str("ALL").unwrap(), CategoryFilter::All);
        assert!(CategoryFilter::from_str("nope").is_err());
    }
}
