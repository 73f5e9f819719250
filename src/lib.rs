//! Casa Match - property-client matching and multi-agency deduplication
//!
//! Pure, synchronous building blocks used by the back-office import jobs:
//! search-area containment and distances, buyer/property fit scores,
//! address and listing-id extraction, agency classification and the
//! linker that folds raw listings into canonical shared properties.

pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    calculate_match_percentage, extract_listing_id, haversine_distance, normalize_agency_name,
    parse_geometry, point_in_polygon, AddressNormalizer, AgencyClassifier, Deduper, Matcher,
    PropertyLinker,
};
pub use crate::engine::Engine;
pub use error::EngineError;
pub use models::{
    Agency, BatchRequest, BatchResponse, Buyer, BuyerCriteria, Classification, GeoPoint,
    GeoPolygon, Listing, MatchResult, Property, ScoringWeights, SharedProperty,
};
