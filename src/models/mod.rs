// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Agency, Buyer, BuyerCriteria, Classification, GeoPoint, GeoPolygon, Geometry, LinkState,
    Listing, MatchResult, Property, ScoringWeights, SharedProperty,
};
pub use requests::BatchRequest;
pub use responses::{BatchResponse, BatchStats};
