//! Forecast data for Tenki
//!
//! Reads JMA area definitions and forecast documents, normalizes a selected
//! area's short-range forecast into per-day rows, and maps each row to
//! display data.

pub mod catalog;
pub mod display;
pub mod error;
pub mod normalize;
pub mod provider;
pub mod retry;
pub mod session;
pub mod types;

pub use catalog::{AreaCatalog, AreaOption, CenterGroup, OfficeEntry, UNKNOWN_AREA_NAME};
pub use display::{category_of, WeatherCard, WeatherCategory};
pub use error::ForecastError;
pub use normalize::{normalize, Fallback, NormalizedForecast};
pub use provider::{ForecastSource, JmaClient};
pub use retry::RetryConfig;
pub use session::{ForecastGrid, ForecastSession, GridState, OfficeSelection};
pub use types::*;
