use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::{Buyer, Listing};

/// Batch handed over by the import layer
///
/// ```json
/// {
///   "listings": [{ "address": "Via Roma, 45", "city": "Milano", "agency": "Privato", ... }],
///   "buyers": [{ "clientId": "c1", "criteria": { "maxPrice": 300000 } }]
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BatchRequest {
    #[validate(nested)]
    #[serde(default)]
    pub listings: Vec<Listing>,
    #[validate(nested)]
    #[serde(default)]
    pub buyers: Vec<Buyer>,
    /// Per-buyer cap on returned matches, falls back to configuration
    #[serde(default)]
    pub limit: Option<usize>,
}
