// Core algorithm exports
pub mod address;
pub mod agency;
pub mod dedup;
pub mod geojson;
pub mod geometry;
pub mod matcher;
pub mod scoring;

pub use address::{extract_listing_id, AddressComponents, AddressNormalizer};
pub use agency::{normalize_agency_name, AgencyClassifier};
pub use dedup::{merge_agencies, Deduper, PropertyLinker};
pub use geojson::{parse_geometry, parse_search_area};
pub use geometry::{contains, haversine_distance, point_in_polygon};
pub use matcher::Matcher;
pub use scoring::calculate_match_percentage;
