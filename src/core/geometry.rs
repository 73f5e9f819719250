use geo::{BoundingRect, Centroid, Coord, LineString, Polygon};
use crate::models::{GeoPoint, GeoPolygon};

/// Earth's radius in meters
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Ray-casting point-in-polygon test
///
/// A horizontal ray is cast from `point`; every ring edge it crosses toggles
/// the result. Rings with fewer than three points contain nothing.
/// Points lying exactly on an edge may land on either side.
pub fn point_in_polygon(point: &GeoPoint, ring: &[GeoPoint]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let (x, y) = (point.longitude, point.latitude);
    let mut inside = false;
    let mut j = ring.len() - 1;

    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].longitude, ring[i].latitude);
        let (xj, yj) = (ring[j].longitude, ring[j].latitude);

        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Calculate the Haversine distance between two points in meters
///
/// Spherical Earth; good enough at city scale.
#[inline]
pub fn haversine_distance(p1: &GeoPoint, p2: &GeoPoint) -> f64 {
    let lat1_rad = p1.latitude.to_radians();
    let lat2_rad = p2.latitude.to_radians();
    let delta_lat = (p2.latitude - p1.latitude).to_radians();
    let delta_lon = (p2.longitude - p1.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Containment gate for a search area
///
/// Bounding rectangle first, which rejects most candidates cheaply,
/// then the exact ray-casting test.
pub fn contains(area: &GeoPolygon, point: &GeoPoint) -> bool {
    if !area.is_valid() {
        return false;
    }

    if let Some(rect) = to_line_string(area).bounding_rect() {
        let (min, max) = (rect.min(), rect.max());
        if point.longitude < min.x
            || point.longitude > max.x
            || point.latitude < min.y
            || point.latitude > max.y
        {
            return false;
        }
    }

    point_in_polygon(point, &area.ring)
}

/// Centre of mass of a search area, `None` for invalid or degenerate rings
pub fn centroid(area: &GeoPolygon) -> Option<GeoPoint> {
    if !area.is_valid() {
        return None;
    }

    Polygon::new(to_line_string(area), vec![])
        .centroid()
        .map(|p| GeoPoint::new(p.x(), p.y()))
}

fn to_line_string(area: &GeoPolygon) -> LineString<f64> {
    area.ring
        .iter()
        .map(|p| Coord { x: p.longitude, y: p.latitude })
        .collect::<Vec<_>>()
        .into()
}
