use std::sync::Arc;

use crate::dataset::DemandTable;
use crate::thresholds::{ALL_SEASON, NO_RECOMMENDATIONS};
use crate::types::DemandRecord;

/// Season/occasion/budget lookup over the demand table.
///
/// Matching is case-insensitive and exact on all three keys. When nothing
/// matches, the season is widened to `all-season`; when that also misses,
/// the single-element sentinel list is returned.
pub struct RecommendationFilter {
    demand: Arc<DemandTable>,
}

impl RecommendationFilter {
    pub fn new(demand: Arc<DemandTable>) -> Self {
        Self { demand }
    }

    pub fn recommend(&self, season: &str, occasion: &str, budget: &str) -> Vec<String> {
        let season = season.trim().to_lowercase();
        let occasion = occasion.trim().to_lowercase();
        let budget = budget.trim().to_lowercase();

        let exact = self.matching(&season, &occasion, &budget);
        if !exact.is_empty() {
            return exact;
        }

        let widened = self.matching(ALL_SEASON, &occasion, &budget);
        if !widened.is_empty() {
            log::debug!(
                "no exact match for season={} occasion={} budget={}, using {}",
                season,
                occasion,
                budget,
                ALL_SEASON
            );
            return widened;
        }

        vec![NO_RECOMMENDATIONS.to_string()]
    }

    fn matching(&self, season: &str, occasion: &str, budget: &str) -> Vec<String> {
        self.demand
            .records()
            .iter()
            .filter(|r| Self::matches(r, season, occasion, budget))
            .map(|r| r.fabric_type.clone())
            .collect()
    }

    fn matches(record: &DemandRecord, season: &str, occasion: &str, budget: &str) -> bool {
        record.season.to_lowercase() == season
            && record.occasion.to_lowercase() == occasion
            && record.budget_category.to_lowercase() == budget
    }
}

/// True when a recommendation list is the no-results sentinel.
pub fn is_no_results(recommendations: &[String]) -> bool {
    recommendations.len() == 1 && recommendations[0] == NO_RECOMMENDATIONS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::load_demand;

    const DEMAND_CSV: &str = "\
Fabric Type,Season,Occasion,Budget Category,Historical Demand,Current Demand,Price per Unit
Linen,Summer,Casual,Low,100,120,80
Cotton,Summer,Casual,Low,300,310,60
Wool,All-Season,Formal,High,50,40,400
Silk,All-Season,Formal,High,70,90,520
Denim,Winter,Casual,Medium,200,260,150
";

    fn filter() -> RecommendationFilter {
        let table = DemandTable::new(load_demand(DEMAND_CSV.as_bytes()).unwrap()).unwrap();
        RecommendationFilter::new(Arc::new(table))
    }

    #[test]
    fn exact_match_in_file_order() {
        let recs = filter().recommend("summer", "casual", "low");
        assert_eq!(recs, vec!["linen", "cotton"]);
    }

    #[test]
    fn matching_ignores_case_and_whitespace() {
        let recs = filter().recommend(" SUMMER", "Casual ", "LOW");
        assert_eq!(recs, vec!["linen", "cotton"]);
    }

    #[test]
    fn falls_back_to_all_season() {
        let recs = filter().recommend("winter", "formal", "high");
        assert_eq!(recs, vec!["wool", "silk"]);
        assert!(!is_no_results(&recs));
    }

    #[test]
    fn exact_match_wins_over_fallback() {
        let recs = filter().recommend("winter", "casual", "medium");
        assert_eq!(recs, vec!["denim"]);
    }

    #[test]
    fn no_match_returns_sentinel() {
        let recs = filter().recommend("rainy", "sportswear", "low");
        assert_eq!(recs, vec![NO_RECOMMENDATIONS.to_string()]);
        assert!(is_no_results(&recs));
    }

    #[test]
    fn fallback_keeps_occasion_and_budget() {
        // all-season/formal exists, but only with a high budget.
        let recs = filter().recommend("winter", "formal", "low");
        assert!(is_no_results(&recs));
    }
}
