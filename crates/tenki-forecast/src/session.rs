//! Selection handling: office → area picker → forecast grid.
//!
//! This is the boundary where forecast failures become display state. The
//! selection methods take `&mut self`, so selections are processed one at a
//! time and an older response can never replace a newer grid.

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{AreaCatalog, AreaOption, CenterGroup};
use crate::display::WeatherCard;
use crate::error::ForecastError;
use crate::normalize::{normalize, Fallback};
use crate::provider::ForecastSource;

/// The picker state after an office was chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfficeSelection {
    pub office_code: String,
    pub office_name: String,
    pub options: Vec<AreaOption>,
}

/// Everything the grid shows for one successful selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastGrid {
    pub office_code: String,
    pub area_code: String,
    pub area_name: String,
    pub publishing_office: Option<String>,
    pub reported_at: Option<String>,
    /// Area the weather rows actually describe (differs from `area_code` after a fallback)
    pub weather_area: String,
    pub temperature_area: Option<String>,
    pub cards: Vec<WeatherCard>,
    pub fallbacks: Vec<Fallback>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum GridState {
    #[default]
    Empty,
    Ready(ForecastGrid),
    /// Shown in place of the grid; no partial rows survive a failure.
    Failed { message: String, detail: String },
}

pub struct ForecastSession<S> {
    source: S,
    catalog: Arc<AreaCatalog>,
    office: Option<OfficeSelection>,
    selected_area: Option<String>,
    grid: GridState,
}

impl<S: ForecastSource> ForecastSession<S> {
    /// Fetch the area document and build the catalog.
    ///
    /// # Errors
    /// Fails if the document cannot be fetched or is missing a collection.
    pub async fn start(source: S) -> Result<Self, ForecastError> {
        let document = source.fetch_area_document().await?;
        let catalog = AreaCatalog::build(document)?;
        Ok(Self::with_catalog(source, Arc::new(catalog)))
    }

    pub fn with_catalog(source: S, catalog: Arc<AreaCatalog>) -> Self {
        Self {
            source,
            catalog,
            office: None,
            selected_area: None,
            grid: GridState::Empty,
        }
    }

    pub fn catalog(&self) -> &AreaCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog for other readers
    pub fn catalog_handle(&self) -> Arc<AreaCatalog> {
        Arc::clone(&self.catalog)
    }

    pub fn sidebar(&self) -> Vec<CenterGroup> {
        self.catalog.sidebar()
    }

    pub fn office(&self) -> Option<&OfficeSelection> {
        self.office.as_ref()
    }

    pub fn selected_area(&self) -> Option<&str> {
        self.selected_area.as_deref()
    }

    pub fn grid(&self) -> &GridState {
        &self.grid
    }

    /// Fill the area picker for `office_code`, select its first area and load it.
    ///
    /// # Errors
    /// `UnknownArea` if the office is not in the catalog; picker and grid are
    /// left as they were.
    pub async fn select_office(&mut self, office_code: &str) -> Result<&GridState, ForecastError> {
        let options = self.catalog.area_options(office_code)?;
        let first = options
            .first()
            .map(|o| o.code.clone())
            .ok_or_else(|| ForecastError::UnknownArea(office_code.to_string()))?;

        tracing::info!(
            "Selected office {} ({} areas)",
            office_code,
            options.len()
        );
        self.office = Some(OfficeSelection {
            office_code: office_code.to_string(),
            office_name: self.catalog.display_name_of(office_code).to_string(),
            options,
        });

        self.select_area(&first).await
    }

    /// Load the forecast for `area_code` and replace the grid.
    ///
    /// Fetch and normalization failures do not return an error: they become
    /// [`GridState::Failed`].
    ///
    /// # Errors
    /// `UnknownArea` for an empty code or one no office owns. Nothing changes
    /// in that case.
    pub async fn select_area(&mut self, area_code: &str) -> Result<&GridState, ForecastError> {
        if area_code.is_empty() {
            return Err(ForecastError::UnknownArea(String::new()));
        }

        let office_code = match self.catalog.resolve_office_for(area_code) {
            Ok(code) => code.to_string(),
            Err(e) => {
                tracing::warn!("Ignoring selection: {}", e);
                return Err(e);
            }
        };

        self.selected_area = Some(area_code.to_string());
        self.grid = match self.load_grid(&office_code, area_code).await {
            Ok(grid) => GridState::Ready(grid),
            Err(e) => {
                tracing::error!("Forecast for area {} failed: {}", area_code, e);
                GridState::Failed {
                    message: e.user_message(),
                    detail: e.to_string(),
                }
            }
        };

        Ok(&self.grid)
    }

    async fn load_grid(&self, office_code: &str, area_code: &str) -> Result<ForecastGrid, ForecastError> {
        let report = self.source.fetch_short_range(office_code).await?;
        let normalized = normalize(&report, area_code)?;

        Ok(ForecastGrid {
            office_code: office_code.to_string(),
            area_code: area_code.to_string(),
            area_name: self.catalog.display_name_of(area_code).to_string(),
            publishing_office: report.publishing_office,
            reported_at: report.report_datetime,
            weather_area: normalized.weather_area,
            temperature_area: normalized.temperature_area,
            cards: normalized.rows.iter().map(WeatherCard::from_row).collect(),
            fallbacks: normalized.fallbacks,
        })
    }
}
