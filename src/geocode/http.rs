use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{blocking::Client, redirect::Policy};

use crate::geocode::{ApiError, GeocodeRequest, GeocodeResponse, GeocodingApi};

/// Blocking client for a Google-compatible geocoding endpoint.
pub struct HttpGeocoder {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl HttpGeocoder {
    /// Build a client with a fixed per-call timeout.
    pub fn new(endpoint: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("sitefill/", env!("CARGO_PKG_VERSION")))
            .redirect(Policy::limited(10))
            .timeout(timeout)
            .build()
            .context("[geocode::http] Failed to build HTTP client")?;

        Ok(Self { client, endpoint: endpoint.to_string(), api_key: api_key.to_string() })
    }
}

impl GeocodingApi for HttpGeocoder {
    fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse, ApiError> {
        let query = match request {
            GeocodeRequest::Address(address) => ("address", address.clone()),
            GeocodeRequest::LatLng { lat, lng } => ("latlng", format!("{lat},{lng}")),
        };

        // Non-2xx bodies still carry a JSON status, so they are decoded rather than rejected.
        let body = self.client
            .get(&self.endpoint)
            .query(&[query, ("key", self.api_key.clone())])
            .send()
            .and_then(|resp| resp.text())
            .map_err(|e| ApiError::Request(e.to_string()))?;

        GeocodeResponse::from_json(&body)
    }
}
