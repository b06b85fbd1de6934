use geo::Point;

use crate::site::SiteId;

/// Values that mark an administrative field as not yet filled in.
const UNSET_SENTINELS: [&str; 4] = ["", "0", "nan", "not found"];

/// Check whether a ward/constituency style field still needs a value.
///
/// Absent values and the sentinels `""`, `"0"`, `"nan"` and `"not found"`
/// (any case, surrounding whitespace ignored) are all unset.
pub fn is_unset(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => {
            let v = v.trim();
            UNSET_SENTINELS.iter().any(|s| v.eq_ignore_ascii_case(s))
        }
    }
}

/// Parse a `"lat,lng"` string into `(lat, lng)`.
///
/// Exactly two comma separated numeric fields are accepted.
pub fn parse_coordinates(value: &str) -> Option<(f64, f64)> {
    let (lat, lng) = value.split_once(',')?;
    if lng.contains(',') { return None }
    let lat = lat.trim().parse::<f64>().ok()?;
    let lng = lng.trim().parse::<f64>().ok()?;
    (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
}

/// Render `(lat, lng)` in the stored `"lat,lng"` order.
#[inline]
pub(crate) fn format_coordinates(lat: f64, lng: f64) -> String {
    format!("{lat},{lng}")
}

/// Null-island placeholder written by data-entry tools.
const NULL_ISLAND: &str = "0,0";

/// Coordinates count as present if they contain a comma, do not contain the
/// `"0,0"` placeholder anywhere in the text, and do not parse to (0, 0).
///
/// The substring test also rejects real values such as `"10.0,0.5"`; those
/// rows are geocoded again.
pub(crate) fn has_valid_coordinates(value: Option<&str>) -> bool {
    let Some(value) = value else { return false };
    if !value.contains(',') || value.contains(NULL_ISLAND) { return false }
    !matches!(parse_coordinates(value), Some((lat, lng)) if lat == 0.0 && lng == 0.0)
}

/// One row of the site register.
///
/// Only the columns the pipeline reads or writes are held here; every other
/// column stays in the backing frame untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SiteRecord {
    pub id: SiteId,
    pub region: Option<String>,
    pub county: Option<String>,
    pub site_name: Option<String>,
    pub coordinates: Option<String>,
    pub ward: Option<String>,
    pub constituency: Option<String>,
    pub status: Option<String>,
}

impl SiteRecord {
    /// Create an empty record with the given id.
    pub fn new(id: SiteId) -> Self {
        Self { id, ..Default::default() }
    }

    /// Whether the stored coordinates can be used as-is.
    #[inline]
    pub fn has_valid_coordinates(&self) -> bool {
        has_valid_coordinates(self.coordinates.as_deref())
    }

    /// Parsed `(lat, lng)`, if the coordinate string is well formed.
    #[inline]
    pub fn lat_lng(&self) -> Option<(f64, f64)> {
        self.coordinates.as_deref().and_then(parse_coordinates)
    }

    /// Point for spatial lookup, with x = longitude and y = latitude.
    pub fn point(&self) -> Option<Point<f64>> {
        self.lat_lng().map(|(lat, lng)| Point::new(lng, lat))
    }
}
