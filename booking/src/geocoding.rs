//! Address → coordinates lookup.
//!
//! [`NominatimGeocoder`] calls the OpenStreetMap Nominatim search API:
//!
//! ```text
//! GET {base}/search?format=json&q=<urlencoded address>
//! [{"lat": "48.8556", "lon": "2.3601", ...}, ...]
//! ```
//!
//! The first match wins. No retry, no disambiguation.

use crate::metrics;
use crate::types::Coordinates;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Geocoding notices, in the language of the admin UI.
pub mod notices {
    /// Address found.
    pub const FOUND: &str = "Adresse localisée avec succès";
    /// No match.
    pub const NOT_FOUND: &str = "Adresse non trouvée";
    /// Lookup failed.
    pub const FAILED: &str = "Erreur lors de la localisation de l'adresse";
}

/// Geocoding errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeocodeError {
    /// Blank address, nothing was sent.
    #[error("Address is empty")]
    EmptyAddress,

    /// The service returned no match.
    #[error("Address not found: {0}")]
    NotFound(String),

    /// Network failure or non-success HTTP status.
    #[error("Geocoding request failed: {0}")]
    Transport(String),

    /// The response body is not the expected shape.
    #[error("Invalid geocoding response: {0}")]
    Decode(String),
}

impl GeocodeError {
    /// Notice shown to the admin.
    #[must_use]
    pub const fn notice(&self) -> &'static str {
        match self {
            Self::NotFound(_) => notices::NOT_FOUND,
            Self::EmptyAddress | Self::Transport(_) | Self::Decode(_) => notices::FAILED,
        }
    }
}

/// Resolves a postal address to coordinates.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Look up `address`.
    ///
    /// # Errors
    ///
    /// See [`GeocodeError`].
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

/// Nominatim HTTP client.
#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    /// HTTP client (carries the User-Agent Nominatim requires)
    http_client: reqwest::Client,
    /// API base, e.g. `https://nominatim.openstreetmap.org`
    base_url: String,
}

impl NominatimGeocoder {
    /// Default public endpoint.
    pub const DEFAULT_BASE_URL: &'static str = "https://nominatim.openstreetmap.org";

    /// Create a client for `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Search URL for `address`.
    #[must_use]
    pub fn search_url(&self, address: &str) -> String {
        format!(
            "{}/search?format=json&q={}",
            self.base_url,
            urlencoding::encode(address)
        )
    }

    async fn lookup(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let address = address.trim();
        if address.is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }

        let response = self
            .http_client
            .get(self.search_url(address))
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GeocodeError::Transport(format!(
                "Nominatim returned {}",
                response.status()
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        let first = places
            .into_iter()
            .next()
            .ok_or_else(|| GeocodeError::NotFound(address.to_string()))?;

        let parse = |field: &str, value: &str| {
            value
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| GeocodeError::Decode(format!("{field} is not a number: {value}")))
        };

        Ok(Coordinates {
            latitude: parse("lat", &first.lat)?,
            longitude: parse("lon", &first.lon)?,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        let result = self.lookup(address).await;
        match &result {
            Ok(coordinates) => {
                tracing::info!(address, ?coordinates, "Address geocoded");
                metrics::record_geocoding("found");
            },
            Err(GeocodeError::NotFound(_)) => {
                tracing::info!(address, "Address not found");
                metrics::record_geocoding("not_found");
            },
            Err(error) => {
                tracing::warn!(address, error = %error, "Geocoding failed");
                metrics::record_geocoding("failed");
            },
        }
        result
    }

    fn name(&self) -> &'static str {
        "nominatim"
    }
}

/// Fixed address book. For tests and offline runs.
#[derive(Clone, Debug, Default)]
pub struct StaticGeocoder {
    places: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    /// Empty address book: every lookup is `NotFound`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `address` at `coordinates`.
    #[must_use]
    pub fn with_place(mut self, address: &str, coordinates: Coordinates) -> Self {
        self.places.insert(Self::key(address), coordinates);
        self
    }

    fn key(address: &str) -> String {
        address.trim().to_lowercase()
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }
        self.places
            .get(&Self::key(address))
            .copied()
            .ok_or_else(|| GeocodeError::NotFound(address.trim().to_string()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}
