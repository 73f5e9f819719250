//! Extraction of plain coordinates from a practical subset of GeoJSON.
//!
//! Only `Point`, `Polygon` and `MultiPolygon` are understood and only outer
//! rings are kept. Anything malformed yields `None`, which callers treat as
//! "no spatial constraint".

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use crate::models::{GeoPoint, GeoPolygon, Geometry};

/// Parse a GeoJSON geometry object
pub fn parse_geometry(value: &Value) -> Option<Geometry> {
    let coordinates = value.get("coordinates")?;

    match value.get("type")?.as_str()? {
        "Point" => parse_position(coordinates).map(Geometry::Point),
        // Outer ring only, holes ignored
        "Polygon" => parse_ring(coordinates.get(0)?).map(Geometry::Polygon),
        // First polygon only
        "MultiPolygon" => parse_ring(coordinates.get(0)?.get(0)?).map(Geometry::Polygon),
        other => {
            tracing::trace!("Unsupported geometry type: {}", other);
            None
        }
    }
}

/// Parse a buyer's search area; a bare point is not an area
pub fn parse_search_area(value: &Value) -> Option<GeoPolygon> {
    match parse_geometry(value)? {
        Geometry::Polygon(polygon) => Some(polygon),
        Geometry::Point(_) => None,
    }
}

/// Serde hook for `BuyerCriteria::search_area`; malformed input becomes `None`
pub fn deserialize_search_area<'de, D>(deserializer: D) -> Result<Option<GeoPolygon>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_search_area))
}

/// `[lon, lat, ...]`; extra dimensions are ignored, non-numbers rejected
fn parse_position(value: &Value) -> Option<GeoPoint> {
    let pair = value.as_array()?;
    if pair.len() < 2 {
        return None;
    }

    let longitude = pair[0].as_f64()?;
    let latitude = pair[1].as_f64()?;
    if !longitude.is_finite() || !latitude.is_finite() {
        return None;
    }

    Some(GeoPoint::new(longitude, latitude))
}

fn parse_ring(value: &Value) -> Option<GeoPolygon> {
    value
        .as_array()?
        .iter()
        .map(parse_position)
        .collect::<Option<Vec<_>>>()
        .map(GeoPolygon::new)
}
