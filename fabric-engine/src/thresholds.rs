//! Centralized decision thresholds and reserved strings.
//!
//! The demand ratios are shared by price-prediction demand status and the
//! inventory summary's high-demand list; changing one changes both.

/// Current demand strictly above `historical * HIGH_DEMAND_RATIO` is high.
pub const HIGH_DEMAND_RATIO: f64 = 1.25;

/// Current demand strictly below `historical * LOW_DEMAND_RATIO` is low.
pub const LOW_DEMAND_RATIO: f64 = 0.75;

/// Stock below this many units is reported as low stock.
pub const LOW_STOCK_THRESHOLD: i64 = 100;

/// Season value used as the recommendation fallback key.
pub const ALL_SEASON: &str = "all-season";

/// Returned in place of an empty recommendation list. Never a fabric name.
pub const NO_RECOMMENDATIONS: &str = "No fabric recommendations available.";

/// Decimal digits kept on predicted prices.
pub const PRICE_DIGITS: i32 = 2;
