use crate::models::{BuyerCriteria, Property, ScoringWeights};

/// Calculate a match percentage (0-100) for a property against a buyer's criteria
///
/// Only criteria the buyer actually set count, in both numerator and denominator:
///
/// ```text
/// size      30  full if size >= minSize
/// price     40  full if price <= maxPrice, tapering to 0 at +10%
/// type      15  exact match
/// bedrooms  10  full if >=, only when both sides know the count
/// bathrooms  5  same as bedrooms
/// ```
///
/// A buyer with no criteria scores 0. The search area is not part of the
/// score; the matcher applies it as a gate.
pub fn calculate_match_percentage(
    property: &Property,
    criteria: &BuyerCriteria,
    weights: &ScoringWeights,
) -> u8 {
    let mut match_points = 0.0;
    let mut total_points = 0.0;

    if let Some(min_size) = criteria.min_size {
        total_points += weights.size;
        if property.size >= min_size {
            match_points += weights.size;
        }
    }

    if let Some(max_price) = criteria.max_price {
        total_points += weights.price;
        match_points += price_points(property.price, max_price, weights);
    }

    if let Some(wanted) = &criteria.property_type {
        total_points += weights.property_type;
        if property.property_type.as_deref() == Some(wanted.as_str()) {
            match_points += weights.property_type;
        }
    }

    if let (Some(wanted), Some(actual)) = (criteria.bedrooms, property.bedrooms) {
        total_points += weights.bedrooms;
        if actual >= wanted {
            match_points += weights.bedrooms;
        }
    }

    if let (Some(wanted), Some(actual)) = (criteria.bathrooms, property.bathrooms) {
        total_points += weights.bathrooms;
        if actual >= wanted {
            match_points += weights.bathrooms;
        }
    }

    if total_points <= 0.0 {
        return 0;
    }

    (100.0 * match_points / total_points).round().clamp(0.0, 100.0) as u8
}

/// Price credit: full at or under budget, linear partial credit (floored)
/// within the tolerance band, nothing beyond it
#[inline]
fn price_points(price: f64, max_price: f64, weights: &ScoringWeights) -> f64 {
    if price <= max_price {
        return weights.price;
    }
    if max_price <= 0.0 || weights.price_tolerance <= 0.0 {
        return 0.0;
    }

    let overage = (price - max_price) / max_price;
    if overage > weights.price_tolerance {
        return 0.0;
    }

    // Scale by the reciprocal: 0.08 / 0.1 and 0.08 * 10.0 floor differently
    let scale = 1.0 / weights.price_tolerance;
    (weights.price * (1.0 - overage * scale)).floor().max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_property(price: f64, size: f64) -> Property {
        Property {
            id: "p1".to_string(),
            address: "Via Roma 45".to_string(),
            city: "Milano".to_string(),
            price,
            size,
            bedrooms: Some(2),
            bathrooms: Some(1),
            location: None,
            property_type: Some("apartment".to_string()),
        }
    }

    fn price_only(max_price: f64) -> BuyerCriteria {
        BuyerCriteria {
            max_price: Some(max_price),
            ..Default::default()
        }
    }

    #[test]
    fn test_price_points() {
        let weights = ScoringWeights::default();

        assert_eq!(price_points(100_000.0, 100_000.0, &weights), 40.0);
        assert_eq!(price_points(105_000.0, 100_000.0, &weights), 20.0);
        assert_eq!(price_points(115_000.0, 100_000.0, &weights), 0.0);
        assert_eq!(price_points(1.0, 0.0, &weights), 0.0);
    }

    #[test]
    fn test_price_points_floor_at_band_edges() {
        let weights = ScoringWeights::default();

        assert_eq!(price_points(108_000.0, 100_000.0, &weights), 7.0);
        assert_eq!(price_points(105_750.0, 100_000.0, &weights), 16.0);

        let eight_over = calculate_match_percentage(&create_test_property(108_000.0, 80.0), &price_only(100_000.0), &weights);
        assert_eq!(eight_over, 18);
    }

    #[test]
    fn test_price_only_percentages() {
        let weights = ScoringWeights::default();

        let at_budget = calculate_match_percentage(&create_test_property(100_000.0, 80.0), &price_only(100_000.0), &weights);
        assert_eq!(at_budget, 100);

        let five_over = calculate_match_percentage(&create_test_property(105_000.0, 80.0), &price_only(100_000.0), &weights);
        assert_eq!(five_over, 50);

        let fifteen_over = calculate_match_percentage(&create_test_property(115_000.0, 80.0), &price_only(100_000.0), &weights);
        assert_eq!(fifteen_over, 0);
    }

    #[test]
    fn test_no_criteria_scores_zero() {
        let score = calculate_match_percentage(
            &create_test_property(100_000.0, 80.0),
            &BuyerCriteria::default(),
            &ScoringWeights::default(),
        );
        assert_eq!(score, 0);
    }

    #[test]
    fn test_full_criteria() {
        let criteria = BuyerCriteria {
            min_size: Some(100.0),
            max_price: Some(200_000.0),
            property_type: Some("apartment".to_string()),
            bedrooms: Some(3),
            bathrooms: Some(1),
            search_area: None,
        };

        // size fails (30), bedrooms fail (10): 60 of 100
        let score = calculate_match_percentage(&create_test_property(150_000.0, 80.0), &criteria, &ScoringWeights::default());
        assert_eq!(score, 60);
    }

    #[test]
    fn test_rooms_skipped_when_property_unknown() {
        let mut property = create_test_property(100_000.0, 80.0);
        property.bedrooms = None;

        let criteria = BuyerCriteria {
            max_price: Some(100_000.0),
            bedrooms: Some(4),
            ..Default::default()
        };

        assert_eq!(calculate_match_percentage(&property, &criteria, &ScoringWeights::default()), 100);
    }

    #[test]
    fn test_type_mismatch_and_missing_type() {
        let mut property = create_test_property(100_000.0, 80.0);
        let criteria = BuyerCriteria {
            property_type: Some("villa".to_string()),
            ..Default::default()
        };

        assert_eq!(calculate_match_percentage(&property, &criteria, &ScoringWeights::default()), 0);

        property.property_type = None;
        assert_eq!(calculate_match_percentage(&property, &criteria, &ScoringWeights::default()), 0);
    }
}
