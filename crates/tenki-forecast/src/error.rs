//! Forecast-specific error types.

use tenki_core::{AppError, NetworkError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("Area document is missing the `{0}` collection")]
    MalformedCatalog(&'static str),

    #[error("Unknown area code: {0:?}")]
    UnknownArea(String),

    #[error("Forecast has no weather series")]
    NoWeatherSeries,

    #[error("Forecast has no temperature series")]
    NoTemperatureSeries,

    #[error("Weather entry for area {area} has no `{field}`")]
    MissingField { area: String, field: &'static str },

    #[error("`{field}` has {actual} entries but {expected} weather codes")]
    MisalignedSeries {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("Forecast document for office {0} is empty")]
    EmptyForecast(String),

    #[error("Fetch failed: {0}")]
    FetchFailed(#[from] NetworkError),
}

impl ForecastError {
    /// User-friendly error message for UI display.
    pub fn user_message(&self) -> String {
        match self {
            Self::MalformedCatalog(_) => "Area list could not be read. Please restart.".to_string(),
            Self::UnknownArea(code) => format!("Area {} is not in the area list", code),
            Self::NoWeatherSeries => "No weather forecast is available for this area".to_string(),
            Self::NoTemperatureSeries => "Temperatures are not available".to_string(),
            Self::MissingField { .. } | Self::MisalignedSeries { .. } | Self::InvalidTimestamp(_) => {
                "Forecast data could not be read".to_string()
            }
            Self::EmptyForecast(_) => "No forecast is published for this area".to_string(),
            Self::FetchFailed(e) => e.user_message().to_string(),
        }
    }

    /// Whether the caller can keep going with reduced data.
    pub fn is_degradable(&self) -> bool {
        matches!(self, Self::NoTemperatureSeries)
    }
}

impl From<ForecastError> for AppError {
    fn from(e: ForecastError) -> Self {
        match e {
            ForecastError::FetchFailed(network) => AppError::Network(network),
            other => AppError::Forecast(other.to_string()),
        }
    }
}
