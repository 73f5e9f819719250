use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A (longitude, latitude) pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct GeoPoint {
    #[serde(rename = "lon")]
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(rename = "lat")]
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }
}

/// Outer ring of a region. Holes are never represented.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPolygon {
    pub ring: Vec<GeoPoint>,
}

impl GeoPolygon {
    pub fn new(ring: Vec<GeoPoint>) -> Self {
        Self { ring }
    }

    /// A ring needs at least three points to enclose anything
    pub fn is_valid(&self) -> bool {
        self.ring.len() >= 3
    }
}

/// Geometry extracted from a GeoJSON object
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(GeoPoint),
    Polygon(GeoPolygon),
}

/// Property as seen by the scorer
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Property {
    #[validate(length(min = 1))]
    pub id: String,
    pub address: String,
    pub city: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub size: f64,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub bathrooms: Option<u8>,
    #[serde(default)]
    #[validate(nested)]
    pub location: Option<GeoPoint>,
    #[serde(rename = "propertyType", default)]
    pub property_type: Option<String>,
}

/// Buyer search criteria. Every field is optional; `None` is "not a constraint".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuyerCriteria {
    #[serde(rename = "minSize", default)]
    pub min_size: Option<f64>,
    #[serde(rename = "maxPrice", default)]
    pub max_price: Option<f64>,
    #[serde(rename = "propertyType", default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub bathrooms: Option<u8>,
    #[serde(
        rename = "searchArea",
        default,
        deserialize_with = "crate::core::geojson::deserialize_search_area",
        skip_serializing
    )]
    pub search_area: Option<GeoPolygon>,
}

/// A client looking to buy
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Buyer {
    #[validate(length(min = 1))]
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(default)]
    pub criteria: BuyerCriteria,
}

/// Agency (or private seller) advertising a property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agency {
    pub name: String,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(rename = "listingId", default)]
    pub listing_id: Option<String>,
}

impl Agency {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            link: None,
            listing_id: None,
        }
    }
}

/// One raw sighting of a property on a portal, agency site or email
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Listing {
    #[serde(rename = "listingId", default)]
    pub listing_id: Option<String>,
    #[validate(length(min = 1))]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0.0))]
    pub size: f64,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub bathrooms: Option<u8>,
    #[serde(rename = "propertyType", default)]
    pub property_type: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub location: Option<GeoPoint>,
    #[validate(length(min = 1))]
    pub agency: String,
    #[serde(default)]
    pub link: Option<String>,
    /// Free text that came with the listing (email body, description)
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "observedAt", default = "Utc::now")]
    pub observed_at: DateTime<Utc>,
}

impl Listing {
    /// The agency entry this listing contributes
    ///
    /// Without an explicit listing id, one quoted in the link or text is used.
    pub fn agency_entry(&self) -> Agency {
        Agency {
            name: self.agency.clone(),
            link: self.link.clone(),
            listing_id: self
                .listing_id
                .clone()
                .or_else(|| crate::core::extract_listing_id(&self.linking_text())),
        }
    }

    /// Everything the address normalizer may look at when linking
    pub fn linking_text(&self) -> String {
        let mut text = format!("{}, {}", self.address, self.city);
        if let Some(link) = &self.link {
            text.push(' ');
            text.push_str(link);
        }
        if let Some(extra) = &self.text {
            text.push(' ');
            text.push_str(extra);
        }
        text
    }
}

/// How a deduplicated property is represented on the market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Classification {
    Private,
    SingleAgency,
    Multiagency,
}

/// Link lifecycle of a canonical record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkState {
    Unlinked,
    Linked,
    Relinked,
}

/// Canonical deduplicated property aggregating every agency that lists it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedProperty {
    pub id: Uuid,
    #[serde(rename = "addressKey")]
    pub address_key: String,
    pub address: String,
    pub city: String,
    pub price: f64,
    pub size: f64,
    #[serde(default)]
    pub bedrooms: Option<u8>,
    #[serde(default)]
    pub bathrooms: Option<u8>,
    #[serde(rename = "propertyType", default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    pub agencies: Vec<Agency>,
    pub classification: Classification,
    #[serde(rename = "linkState")]
    pub link_state: LinkState,
    #[serde(rename = "firstSeenAt")]
    pub first_seen_at: DateTime<Utc>,
    #[serde(rename = "lastUpdatedAt")]
    pub last_updated_at: DateTime<Utc>,
}

impl SharedProperty {
    pub fn agency_names(&self) -> Vec<&str> {
        self.agencies.iter().map(|a| a.name.as_str()).collect()
    }

    /// Source listing ids known for this record
    pub fn source_ids(&self) -> impl Iterator<Item = &str> {
        self.agencies.iter().filter_map(|a| a.listing_id.as_deref())
    }

    /// View used by the scorer
    pub fn to_property(&self) -> Property {
        Property {
            id: self.id.to_string(),
            address: self.address.clone(),
            city: self.city.clone(),
            price: self.price,
            size: self.size,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            location: self.location,
            property_type: self.property_type.clone(),
        }
    }
}

/// Scored match between one property and one buyer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "propertyId")]
    pub property_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub score: u8,
    /// Distance from the centre of the buyer's search area
    #[serde(rename = "distanceM", skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f64>,
}

/// Points awarded per criterion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub size: f64,
    pub price: f64,
    pub property_type: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    /// Overage over max price that still earns partial credit
    pub price_tolerance: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            size: 30.0,
            price: 40.0,
            property_type: 15.0,
            bedrooms: 10.0,
            bathrooms: 5.0,
            price_tolerance: 0.10,
        }
    }
}
