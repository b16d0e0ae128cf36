use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Placeholder shown wherever the upstream document omits a temperature
pub const TEMP_SENTINEL: &str = "--";

// Upstream area definitions (common/const/area.json)

/// The area-definition document.
///
/// Each collection is optional here so that a missing one can be reported as
/// `MalformedCatalog` instead of a decode failure. Extra collections
/// (`class15s`, `class20s`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaDocument {
    pub centers: Option<BTreeMap<String, AreaEntry>>,
    pub offices: Option<BTreeMap<String, AreaEntry>>,
    pub class10s: Option<BTreeMap<String, AreaEntry>>,
}

/// One center, office or class10 entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AreaEntry {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<String>,
}

// Upstream forecast document (forecast/data/forecast/{office}.json)

/// One report object of the forecast array. Element 0 is the short-range report.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastReport {
    pub publishing_office: Option<String>,
    pub report_datetime: Option<String>,
    #[serde(default)]
    pub time_series: Vec<TimeSeries>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    #[serde(default)]
    pub time_defines: Vec<String>,
    #[serde(default)]
    pub areas: Vec<SeriesArea>,
}

impl TimeSeries {
    /// Series kind is decided by its first area, the same way the upstream
    /// publishes homogeneous series.
    pub fn carries_weather(&self) -> bool {
        self.areas.first().is_some_and(|a| a.weathers.is_some())
    }

    pub fn carries_temperatures(&self) -> bool {
        self.areas.first().is_some_and(|a| a.temps.is_some())
    }
}

/// Per-area payload inside a series. Only the fields the normalizer reads are
/// modelled; winds, waves and pops are skipped.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesArea {
    #[serde(default)]
    pub area: AreaRef,
    pub weather_codes: Option<Vec<String>>,
    pub weathers: Option<Vec<String>>,
    pub temps: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AreaRef {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub code: String,
}

// Normalized output

/// A temperature slot. Absent or blank upstream values become `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Temperature {
    Reported(String),
    Unknown,
}

impl Temperature {
    pub fn from_slot(slot: Option<&String>) -> Self {
        match slot.map(|s| s.trim()) {
            Some(value) if !value.is_empty() => Self::Reported(value.to_string()),
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Reported(value) => value,
            Self::Unknown => TEMP_SENTINEL,
        }
    }

    pub fn is_reported(&self) -> bool {
        matches!(self, Self::Reported(_))
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One forecast day for one area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRow {
    pub date: NaiveDate,
    pub weather_code: String,
    pub weather_text: String,
    pub temp_low: Temperature,
    pub temp_high: Temperature,
}
