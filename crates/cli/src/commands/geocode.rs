//! Geocoder probe.
//!
//! Runs one lookup with the server's geocoding configuration and prints the
//! outcome, to check an API key or see how an address normalizes.
//!
//! ```bash
//! rolla-cli geocode "1 Main St, Toronto, M1M1M1, Canada"
//! ```
//!
//! # Environment Variables
//!
//! - `GEOCODING_API_KEY` - Google Maps API key
//! - `GEOCODING_BASE_URL` - Optional API origin override

use rolla_server::config::{ConfigError, GeocodingConfig};
use rolla_server::geocoding::{GeocodingError, GoogleGeocoder};
use thiserror::Error;

/// Errors from the geocode probe.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Geocoding failed: {0}")]
    Geocoding(#[from] GeocodingError),

    #[error("Failed to render result: {0}")]
    Render(#[from] serde_json::Error),
}

/// Geocode `address` and print the validated address as JSON.
///
/// # Errors
///
/// Returns an error if configuration is missing or the lookup fails. Unlike
/// the server, the failure detail is kept.
pub async fn run(address: &str) -> Result<(), GeocodeError> {
    let config = GeocodingConfig::from_env()?;
    let geocoder = GoogleGeocoder::new(&config)?;

    tracing::info!(address, "Geocoding address...");
    let validated = geocoder.geocode(address).await?;

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&validated)?);
    }

    Ok(())
}
