use tracing::{debug, info, warn};

use crate::{
    geocode::{ApiError, CallBudget, GeocodeRequest, GeocodingApi, status},
    site::{ChangeSet, SiteRecord, format_coordinates},
};

/// Outcome of a forward lookup: a location on success, plus the status tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Geocoded {
    pub location: Option<(f64, f64)>,
    pub status: String,
}

impl Geocoded {
    fn failed(status: impl Into<String>) -> Self {
        Self { location: None, status: status.into() }
    }
}

/// Resolve `"<site_name>, <county>, <region>"` to `(lat, lng)`.
///
/// No request is made once `budget` is exhausted. Only `OK` replies that
/// carry a location consume budget.
pub fn resolve_coordinates(
    api: &dyn GeocodingApi,
    budget: &mut CallBudget,
    region: Option<&str>,
    county: Option<&str>,
    site_name: Option<&str>,
) -> Geocoded {
    if budget.is_exhausted() {
        return Geocoded::failed(status::LIMIT_REACHED);
    }

    let address = format!(
        "{}, {}, {}",
        site_name.unwrap_or_default(),
        county.unwrap_or_default(),
        region.unwrap_or_default(),
    );

    let response = match api.geocode(&GeocodeRequest::Address(address.clone())) {
        Ok(response) => response,
        Err(ApiError::Request(msg)) => {
            warn!(%address, error = %msg, "forward geocode request failed");
            return Geocoded::failed(status::REQUEST_ERROR);
        }
        Err(ApiError::Unexpected(msg)) => {
            warn!(%address, error = %msg, "forward geocode returned an unreadable response");
            return Geocoded::failed(status::UNEXPECTED_ERROR);
        }
    };

    if !response.is_ok() {
        let code = response.status.unwrap_or_else(|| status::API_ERROR.to_string());
        debug!(%address, status = %code, message = ?response.error_message, "forward geocode not OK");
        return Geocoded::failed(code);
    }

    let Some(location) = response.results.first().and_then(|r| r.geometry.as_ref()).map(|g| g.location) else {
        warn!(%address, "forward geocode OK without a location");
        return Geocoded::failed(status::UNEXPECTED_ERROR);
    };

    budget.consume();
    Geocoded { location: Some((location.lat, location.lng)), status: status::OK.to_string() }
}

/// Fill missing coordinates for every record, in row order.
///
/// Records with valid coordinates are tagged `AlreadyFilled` without a call.
/// Coordinates are only overwritten on success; the status is always set.
pub(crate) fn fill_coordinates(
    records: &mut [SiteRecord],
    api: &dyn GeocodingApi,
    budget: &mut CallBudget,
) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for record in records.iter_mut() {
        if record.has_valid_coordinates() {
            record.status = Some(status::ALREADY_FILLED.to_string());
            continue;
        }

        let before = record.coordinates.clone();
        let geocoded = resolve_coordinates(
            api, budget,
            record.region.as_deref(),
            record.county.as_deref(),
            record.site_name.as_deref(),
        );

        if let Some((lat, lng)) = geocoded.location {
            record.coordinates = Some(format_coordinates(lat, lng));
        }
        record.status = Some(geocoded.status);

        if record.coordinates != before {
            changes.insert(record.id);
        }
    }

    info!(changed = changes.len(), used = budget.used(), limit = budget.limit(), "forward geocoding done");
    changes
}
