//! Forward and reverse geocoding against a Google-style JSON endpoint.

mod budget;
mod forward;
#[cfg(feature = "http")]
mod http;
mod reverse;

use std::fmt;

use serde::Deserialize;

pub use budget::CallBudget;
pub(crate) use forward::fill_coordinates;
pub use forward::{Geocoded, resolve_coordinates};
#[cfg(feature = "http")]
pub use http::HttpGeocoder;
pub(crate) use reverse::fill_admin_labels;
pub use reverse::resolve_admin;

/// Row status strings written by the geocoding stages.
pub(crate) mod status {
    pub const OK: &str = "OK";
    pub const ALREADY_FILLED: &str = "AlreadyFilled";
    pub const LIMIT_REACHED: &str = "Limit Reached";
    pub const API_ERROR: &str = "API Error";
    pub const REQUEST_ERROR: &str = "Request Error";
    pub const UNEXPECTED_ERROR: &str = "Unexpected Error";
    pub const UPDATED: &str = "Updated";
    pub const ADMIN_ALREADY_FILLED: &str = "Already Filled";
    pub const NOT_FOUND: &str = "Not Found";
    pub const ERROR: &str = "Error";
}

/// One geocoding query.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeRequest {
    /// Free-text address to coordinates.
    Address(String),
    /// Coordinates to address components.
    LatLng { lat: f64, lng: f64 },
}

/// Failure to obtain a decoded response at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Transport failure: DNS, TLS, timeout, connection reset.
    Request(String),
    /// Anything else, e.g. a body that is not the expected JSON.
    Unexpected(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Request(msg) => write!(f, "request failed: {msg}"),
            ApiError::Unexpected(msg) => write!(f, "unexpected response: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

/// Decoded endpoint response. Only the parts the pipeline reads are modelled.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub geometry: Option<ResultGeometry>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultGeometry {
    pub location: LatLng,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub short_name: Option<String>,
    #[serde(default)]
    pub types: Vec<String>,
}

impl GeocodeResponse {
    /// Decode a response body.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body).map_err(|e| ApiError::Unexpected(e.to_string()))
    }

    /// Whether the endpoint reported success.
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some(status::OK)
    }
}

/// A geocoding backend. One blocking call per request.
pub trait GeocodingApi {
    fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse, ApiError>;
}

impl<T: GeocodingApi + ?Sized> GeocodingApi for &T {
    fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse, ApiError> {
        (**self).geocode(request)
    }
}
