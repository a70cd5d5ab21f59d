//! Address validation against the Google Geocoding API.
//!
//! Every way a lookup can go wrong (transport error, non-2xx response,
//! undecodable body, non-`OK` status, empty result set) collapses into the
//! single [`AddressUnresolvable`] marker. The detailed [`GeocodingError`] is
//! only logged.

mod google;

use async_trait::async_trait;
use thiserror::Error;

use rolla_core::ValidatedAddress;

pub use google::GoogleGeocoder;

/// The address could not be validated. Carries no further detail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("address could not be validated")]
pub struct AddressUnresolvable;

/// Resolves free-text addresses to a normalized address and coordinates.
#[async_trait]
pub trait AddressValidator: Send + Sync {
    /// Validate a single-line address such as `"1 Main St, Toronto, M1M1M1, Canada"`.
    async fn validate(&self, address: &str) -> Result<ValidatedAddress, AddressUnresolvable>;
}

/// Errors from the geocoding client. Never surfaced to API callers.
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Geocoding endpoint could not be built from the configured base URL.
    #[error("invalid geocoding URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Non-success HTTP status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// API answered with a status other than `OK`.
    #[error("API status {status}: {message}")]
    Api { status: String, message: String },

    /// `OK` status but no results.
    #[error("no results")]
    NoResults,
}
