use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Air-quality category derived from PM2.5
// ---------------------------------------------------------------------------

/// Air-quality bucket for a PM2.5 concentration, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    Low,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Inclusive upper bounds in ascending order. Anything above the last bound is
/// [`Category::Hazardous`].
pub const THRESHOLDS: [(f64, Category); 5] = [
    (12.0, Category::Low),
    (35.0, Category::Moderate),
    (55.0, Category::UnhealthyForSensitiveGroups),
    (150.0, Category::Unhealthy),
    (250.0, Category::VeryUnhealthy),
];

/// Map a PM2.5 reading (µg/m³) to its category.
///
/// Boundary values belong to the lower category: `categorize(12.0)` is `Low`.
/// Input is expected to be finite and non-negative; see [`try_categorize`].
pub fn categorize(value: f64) -> Category {
    THRESHOLDS
        .iter()
        .find(|(upper, _)| value <= *upper)
        .map(|(_, category)| *category)
        .unwrap_or(Category::Hazardous)
}

/// Like [`categorize`] but refuses NaN and negative readings.
pub fn try_categorize(value: f64) -> Option<Category> {
    if value.is_nan() || value < 0.0 {
        None
    } else {
        Some(categorize(value))
    }
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Low,
        Category::Moderate,
        Category::UnhealthyForSensitiveGroups,
        Category::Unhealthy,
        Category::VeryUnhealthy,
        Category::Hazardous,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::Low => "Low",
            Category::Moderate => "Moderate",
            Category::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Category::Unhealthy => "Unhealthy",
            Category::VeryUnhealthy => "Very Unhealthy",
            Category::Hazardous => "Hazardous",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
