use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{ForecastRow, Temperature};

/// Coarse weather categories keyed by the first digit of a JMA weather code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCategory {
    Sunny,
    Cloudy,
    Rainy,
    Snowy,
    #[default]
    Unknown,
}

impl WeatherCategory {
    /// Map a JMA weather code ("100", "201", "313", ...) to its category.
    /// Unrecognised or empty codes map to `Unknown`.
    pub fn from_code(code: &str) -> Self {
        match code.chars().next() {
            Some('1') => Self::Sunny,
            Some('2') => Self::Cloudy,
            Some('3') => Self::Rainy,
            Some('4') => Self::Snowy,
            _ => Self::Unknown,
        }
    }

    /// Colour name used to tint the icon
    pub fn color(&self) -> &'static str {
        match self {
            Self::Sunny => "orange",
            Self::Cloudy => "grey",
            Self::Rainy => "blue",
            Self::Snowy => "light-blue",
            Self::Unknown => "black",
        }
    }

    /// Get icon name (the renderer picks the glyph)
    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Sunny => "sunny",
            Self::Cloudy => "cloud",
            Self::Rainy => "umbrella",
            Self::Snowy => "snowflake",
            Self::Unknown => "question_mark",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Sunny => "Sunny",
            Self::Cloudy => "Cloudy",
            Self::Rainy => "Rainy",
            Self::Snowy => "Snowy",
            Self::Unknown => "Unknown",
        }
    }
}

/// (category, colour) for a weather code. Total: never fails.
pub fn category_of(code: &str) -> (WeatherCategory, &'static str) {
    let category = WeatherCategory::from_code(code);
    (category, category.color())
}

/// A forecast row annotated for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeatherCard {
    pub date: NaiveDate,
    pub weather_code: String,
    pub category: WeatherCategory,
    pub icon: &'static str,
    pub color: &'static str,
    pub text: String,
    pub low: Temperature,
    pub high: Temperature,
}

impl WeatherCard {
    pub fn from_row(row: &ForecastRow) -> Self {
        let (category, color) = category_of(&row.weather_code);
        Self {
            date: row.date,
            weather_code: row.weather_code.clone(),
            category,
            icon: category.icon_name(),
            color,
            text: row.weather_text.clone(),
            low: row.temp_low.clone(),
            high: row.temp_high.clone(),
        }
    }

    pub fn date_label(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    /// "5°", or "--°" when unknown
    pub fn low_label(&self) -> String {
        format!("{}°", self.low)
    }

    pub fn high_label(&self) -> String {
        format!("{}°", self.high)
    }
}
