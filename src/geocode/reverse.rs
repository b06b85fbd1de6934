use tracing::{debug, info, warn};

use crate::{
    geocode::{ApiError, CallBudget, GeocodeRequest, GeocodingApi, status},
    lookup::AdminLookup,
    site::{ChangeSet, SiteRecord, is_unset},
};

const COUNTY_LEVEL: &str = "administrative_area_level_2";
const WARD_LEVEL: &str = "administrative_area_level_3";

/// Resolve `(lat, lng)` to the `(county, ward)` names the endpoint reports.
///
/// Missing levels are `"Not Found"`, as are both on a non-OK status.
/// Transport and decode failures give `"Error"` for both.
pub fn resolve_admin(
    api: &dyn GeocodingApi,
    budget: &mut CallBudget,
    lat: f64,
    lng: f64,
) -> (String, String) {
    let pair = |v: &str| (v.to_string(), v.to_string());

    if budget.is_exhausted() {
        return pair(status::LIMIT_REACHED);
    }

    let response = match api.geocode(&GeocodeRequest::LatLng { lat, lng }) {
        Ok(response) => response,
        Err(ApiError::Request(msg)) | Err(ApiError::Unexpected(msg)) => {
            warn!(lat, lng, error = %msg, "reverse geocode failed");
            return pair(status::ERROR);
        }
    };

    if !response.is_ok() {
        debug!(lat, lng, status = ?response.status, "reverse geocode not OK");
        return pair(status::NOT_FOUND);
    }

    let Some(first) = response.results.first() else {
        warn!(lat, lng, "reverse geocode OK without results");
        return pair(status::ERROR);
    };
    budget.consume();

    let mut county = None;
    let mut ward = None;
    for component in &first.address_components {
        if component.types.iter().any(|t| t == COUNTY_LEVEL) {
            county = Some(component.long_name.clone());
        }
        if component.types.iter().any(|t| t == WARD_LEVEL) {
            ward = Some(component.long_name.clone());
        }
    }

    (
        county.unwrap_or_else(|| status::NOT_FOUND.to_string()),
        ward.unwrap_or_else(|| status::NOT_FOUND.to_string()),
    )
}

/// Fill constituency and ward for records whose constituency is unset,
/// by reverse geocoding their coordinates and refining through `lookup`.
///
/// Skipped records are tagged `Already Filled`; the rest `Updated`.
pub(crate) fn fill_admin_labels(
    records: &mut [SiteRecord],
    api: &dyn GeocodingApi,
    budget: &mut CallBudget,
    lookup: &AdminLookup,
) -> ChangeSet {
    let mut changes = ChangeSet::new();

    for record in records.iter_mut() {
        if !is_unset(record.constituency.as_deref()) {
            record.status = Some(status::ADMIN_ALREADY_FILLED.to_string());
            continue;
        }

        let before = (record.constituency.clone(), record.ward.clone(), record.coordinates.clone());

        let (subcounty, ward) = match record.lat_lng() {
            Some((lat, lng)) => {
                let (county, ward) = resolve_admin(api, budget, lat, lng);
                lookup.lookup_subcounty_ward(&county, &ward)
            }
            None => (status::NOT_FOUND.to_string(), status::NOT_FOUND.to_string()),
        };

        record.constituency = Some(subcounty);
        record.ward = Some(ward);
        record.status = Some(status::UPDATED.to_string());

        if (record.constituency.clone(), record.ward.clone(), record.coordinates.clone()) != before {
            changes.insert(record.id);
        }
    }

    info!(changed = changes.len(), used = budget.used(), limit = budget.limit(), "reverse geocoding done");
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geocode::testing::{ScriptedApi, admin_areas, with_status},
        site::SiteId,
    };

    fn lookup() -> AdminLookup {
        AdminLookup::from_json(r#"{"Mombasa": {"Changamwe": ["Port Reitz", "Kipevu"]}}"#).unwrap()
    }

    fn site(row: usize, coordinates: Option<&str>, constituency: Option<&str>) -> SiteRecord {
        SiteRecord {
            coordinates: coordinates.map(str::to_string),
            constituency: constituency.map(str::to_string),
            ..SiteRecord::new(SiteId::new(row))
        }
    }

    #[test]
    fn reads_county_and_ward_levels() {
        let api = ScriptedApi::new([admin_areas("Mombasa", "Port Reitz")]);
        let mut budget = CallBudget::new(5);

        let resolved = resolve_admin(&api, &mut budget, -4.03, 39.63);

        assert_eq!(resolved, ("Mombasa".to_string(), "Port Reitz".to_string()));
        assert_eq!(api.requests.borrow()[0], GeocodeRequest::LatLng { lat: -4.03, lng: 39.63 });
        assert_eq!(budget.used(), 1);
    }

    #[test]
    fn missing_levels_and_failures() {
        let partial = crate::geocode::GeocodeResponse::from_json(r#"{
            "status": "OK",
            "results": [{ "address_components": [
                { "long_name": "Mombasa", "types": ["administrative_area_level_2"] }
            ]}]
        }"#);
        let api = ScriptedApi::new([
            partial,
            with_status("ZERO_RESULTS"),
            Err(ApiError::Request("connection reset".into())),
            Err(ApiError::Unexpected("bad json".into())),
        ]);
        let mut budget = CallBudget::new(5);
        let mut next = || resolve_admin(&api, &mut budget, 0.5, 35.0);

        assert_eq!(next(), ("Mombasa".to_string(), "Not Found".to_string()));
        assert_eq!(next(), ("Not Found".to_string(), "Not Found".to_string()));
        assert_eq!(next(), ("Error".to_string(), "Error".to_string()));
        assert_eq!(next(), ("Error".to_string(), "Error".to_string()));
    }

    #[test]
    fn fills_only_unset_constituencies() {
        let api = ScriptedApi::new([admin_areas("Mombasa", "Kipevu")]);
        let mut budget = CallBudget::new(5);
        let mut records = vec![
            site(0, Some("-4.03,39.63"), None),
            site(1, Some("-4.05,39.66"), Some("Likoni")),
            site(2, Some("bogus"), Some("not found")),
        ];

        let changes = fill_admin_labels(&mut records, &api, &mut budget, &lookup());

        assert_eq!(api.calls(), 1);
        assert_eq!(records[0].constituency.as_deref(), Some("Changamwe"));
        assert_eq!(records[0].ward.as_deref(), Some("Kipevu"));
        assert_eq!(records[0].status.as_deref(), Some("Updated"));

        assert_eq!(records[1].constituency.as_deref(), Some("Likoni"));
        assert_eq!(records[1].status.as_deref(), Some("Already Filled"));

        assert_eq!(records[2].constituency.as_deref(), Some("Not Found"));
        assert_eq!(records[2].ward.as_deref(), Some("Not Found"));
        assert_eq!(records[2].status.as_deref(), Some("Updated"));

        assert_eq!(changes.iter().map(|id| id.row()).collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn exhausted_budget_makes_no_calls() {
        let api = ScriptedApi::default();
        let mut budget = CallBudget::new(0);
        let mut records = vec![site(0, Some("-4.03,39.63"), None)];

        fill_admin_labels(&mut records, &api, &mut budget, &lookup());

        assert_eq!(api.calls(), 0);
        assert_eq!(records[0].constituency.as_deref(), Some("Not Found"));
    }
}
