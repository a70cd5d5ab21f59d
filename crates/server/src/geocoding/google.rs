//! Google Geocoding API client.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use rolla_core::ValidatedAddress;

use super::{AddressUnresolvable, AddressValidator, GeocodingError};
use crate::config::GeocodingConfig;

/// Path of the JSON geocoding endpoint relative to the API origin.
const GEOCODE_PATH: &str = "/maps/api/geocode/json";

/// Google Geocoding API client.
#[derive(Clone)]
pub struct GoogleGeocoder {
    client: reqwest::Client,
    endpoint: Url,
    api_key: SecretString,
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl GoogleGeocoder {
    /// Create a new geocoding client.
    ///
    /// No timeout is set beyond the transport defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client fails to build.
    pub fn new(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let endpoint = Url::parse(&config.base_url)?.join(GEOCODE_PATH)?;
        let client = reqwest::Client::builder().build()?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Look up an address, keeping the failure detail.
    ///
    /// # Errors
    ///
    /// Returns `GeocodingError` for transport failures, non-2xx responses,
    /// undecodable bodies, non-`OK` statuses and empty result sets.
    pub async fn geocode(&self, address: &str) -> Result<ValidatedAddress, GeocodingError> {
        let url = Url::parse_with_params(
            self.endpoint.as_str(),
            &[("address", address), ("key", self.api_key.expose_secret())],
        )?;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::HttpStatus(status.as_u16()));
        }

        let body: GeocodeResponse = response.json().await?;
        tracing::debug!(
            status = %body.status,
            results = body.results.len(),
            "Geocoding response received"
        );

        if body.status != "OK" {
            return Err(GeocodingError::Api {
                status: body.status,
                message: body.error_message.unwrap_or_default(),
            });
        }

        let first = body
            .results
            .into_iter()
            .next()
            .ok_or(GeocodingError::NoResults)?;

        Ok(ValidatedAddress::new(
            first.formatted_address,
            first.geometry.location.lat,
            first.geometry.location.lng,
        ))
    }
}

#[async_trait]
impl AddressValidator for GoogleGeocoder {
    #[instrument(skip(self))]
    async fn validate(&self, address: &str) -> Result<ValidatedAddress, AddressUnresolvable> {
        tracing::info!("Checking address with geocoder");

        match self.geocode(address).await {
            Ok(validated) => {
                tracing::info!(
                    formatted_address = %validated.formatted_address,
                    "Address validated"
                );
                Ok(validated)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Address validation failed");
                Err(AddressUnresolvable)
            }
        }
    }
}

/// Top-level geocoding response.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}
