// Unit tests for Casa Match

use casa_match::core::{
    agency::{normalize_agency_name, AgencyClassifier},
    address::{extract_listing_id, AddressNormalizer},
    geojson::parse_search_area,
    geometry::{haversine_distance, point_in_polygon},
    scoring::calculate_match_percentage,
};
use casa_match::models::{BuyerCriteria, Classification, GeoPoint, Property, ScoringWeights};
use serde_json::json;

fn square() -> Vec<GeoPoint> {
    vec![
        GeoPoint::new(0.0, 0.0),
        GeoPoint::new(0.0, 2.0),
        GeoPoint::new(2.0, 2.0),
        GeoPoint::new(2.0, 0.0),
    ]
}

fn create_property(price: f64, size: f64) -> Property {
    Property {
        id: "prop-1".to_string(),
        address: "Corso Vercelli 10".to_string(),
        city: "Milano".to_string(),
        price,
        size,
        bedrooms: Some(3),
        bathrooms: Some(2),
        location: Some(GeoPoint::new(9.16, 45.46)),
        property_type: Some("apartment".to_string()),
    }
}

#[test]
fn test_point_in_polygon_inside_and_outside() {
    assert!(point_in_polygon(&GeoPoint::new(1.0, 1.0), &square()));
    assert!(!point_in_polygon(&GeoPoint::new(3.0, 3.0), &square()));
}

#[test]
fn test_short_rings_never_contain() {
    let ring = square();
    for len in 0..=2 {
        for point in [GeoPoint::new(0.0, 0.0), GeoPoint::new(1.0, 1.0), GeoPoint::new(-5.0, 7.0)] {
            assert!(!point_in_polygon(&point, &ring[..len]));
        }
    }
}

#[test]
fn test_haversine_distance_zero_and_symmetric() {
    let a = GeoPoint::new(9.19, 45.4642);
    let b = GeoPoint::new(12.4964, 41.9028);

    assert_eq!(haversine_distance(&a, &a), 0.0);
    assert_eq!(haversine_distance(&a, &b), haversine_distance(&b, &a));
}

#[test]
fn test_haversine_distance_milan_block() {
    let distance = haversine_distance(&GeoPoint::new(9.19, 45.4642), &GeoPoint::new(9.20, 45.4642));
    assert!(distance > 785.0 * 0.95 && distance < 785.0 * 1.05, "Expected ~785m, got {}", distance);
}

#[test]
fn test_price_at_budget_gets_full_points() {
    let criteria = BuyerCriteria {
        max_price: Some(250_000.0),
        ..Default::default()
    };

    let score = calculate_match_percentage(&create_property(250_000.0, 70.0), &criteria, &ScoringWeights::default());
    assert_eq!(score, 100);
}

#[test]
fn test_price_tolerance_band() {
    let criteria = BuyerCriteria {
        max_price: Some(200_000.0),
        ..Default::default()
    };
    let weights = ScoringWeights::default();

    // 5% over: half of the price points
    assert_eq!(calculate_match_percentage(&create_property(210_000.0, 70.0), &criteria, &weights), 50);
    // 15% over: nothing
    assert_eq!(calculate_match_percentage(&create_property(230_000.0, 70.0), &criteria, &weights), 0);
}

#[test]
fn test_empty_criteria_score_zero() {
    let score = calculate_match_percentage(&create_property(1.0, 1.0), &BuyerCriteria::default(), &ScoringWeights::default());
    assert_eq!(score, 0);
}

#[test]
fn test_score_stays_in_range() {
    let criteria = BuyerCriteria {
        min_size: Some(60.0),
        max_price: Some(300_000.0),
        property_type: Some("apartment".to_string()),
        bedrooms: Some(2),
        bathrooms: Some(1),
        search_area: None,
    };

    for price in [0.0, 150_000.0, 305_000.0, 329_000.0, 1_000_000.0] {
        for size in [0.0, 59.9, 60.0, 500.0] {
            let score = calculate_match_percentage(&create_property(price, size), &criteria, &ScoringWeights::default());
            assert!(score <= 100, "Score {} is out of range", score);
        }
    }
}

#[test]
fn test_classification_table() {
    let classifier = AgencyClassifier::default();
    let empty: Vec<String> = vec![];

    assert_eq!(classifier.compute_classification(&empty), Classification::Private);
    assert_eq!(classifier.compute_classification(&["RE/MAX Milano"]), Classification::SingleAgency);
    assert_eq!(classifier.compute_classification(&["RE/MAX Milano", "Casa&Co"]), Classification::Multiagency);
    assert_eq!(classifier.compute_classification(&["Privato", "RE/MAX Milano"]), Classification::Private);
}

#[test]
fn test_agency_name_variants_collapse() {
    assert_eq!(normalize_agency_name("RE/MAX"), normalize_agency_name("re max"));
    assert_eq!(normalize_agency_name("re max"), normalize_agency_name(" Re-Max "));
    assert_eq!(normalize_agency_name("Privato"), normalize_agency_name("PRIVATO"));
}

#[test]
fn test_extract_listing_id_from_url() {
    assert_eq!(
        extract_listing_id("see immobiliare.it/annunci/124788755/"),
        Some("124788755".to_string())
    );
    assert_eq!(extract_listing_id("Bellissimo trilocale in centro"), None);
}

#[test]
fn test_extract_components_with_and_without_commas() {
    let normalizer = AddressNormalizer::default();

    let with_commas = normalizer.extract_components("Via Roma, 45, Milano");
    let without = normalizer.extract_components("Via Roma 45, Milano");

    assert_eq!(with_commas, without);
    assert_eq!(with_commas.street.as_deref(), Some("Via Roma"));
}

#[test]
fn test_search_area_from_geojson() {
    let area = parse_search_area(&json!({
        "type": "Polygon",
        "coordinates": [[[0, 0], [0, 2], [2, 2], [2, 0], [0, 0]]]
    }))
    .expect("valid polygon");

    assert!(point_in_polygon(&GeoPoint::new(1.0, 1.0), &area.ring));
    assert!(parse_search_area(&json!({ "type": "Polygon", "coordinates": [[[0, "x"]]] })).is_none());
}
