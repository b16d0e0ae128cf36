//! Turns a short-range forecast report into aligned per-day rows for one area.
//!
//! Weather and temperature data live in different series and are matched by
//! area code, never by position. When the requested area is missing from a
//! series the series' first area stands in for it; every such substitution is
//! recorded in [`NormalizedForecast::fallbacks`].

use chrono::{DateTime, NaiveDate};
use serde::Serialize;

use crate::error::ForecastError;
use crate::types::{ForecastReport, ForecastRow, SeriesArea, Temperature, TimeSeries};

const NO_TEMPS: &[String] = &[];

/// A substitution made while extracting rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Fallback {
    /// Weather text and codes were taken from another area of the series.
    WeatherArea { requested: String, used: String },
    /// Temperatures were taken from another area (usually the prefecture capital).
    TemperatureArea { requested: String, used: String },
    /// The report had no temperature series; every slot is the sentinel.
    NoTemperatureSeries,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedForecast {
    pub requested_area: String,
    /// Area whose weather entry produced the rows
    pub weather_area: String,
    /// Area whose temperatures were used, if a temperature series existed
    pub temperature_area: Option<String>,
    pub rows: Vec<ForecastRow>,
    pub fallbacks: Vec<Fallback>,
}

/// Entry for `area_code`, or the series' first entry when it is absent.
/// The flag is true when the requested area was found.
pub fn area_or_first<'a>(series: &'a TimeSeries, area_code: &str) -> Option<(&'a SeriesArea, bool)> {
    series
        .areas
        .iter()
        .find(|a| a.area.code == area_code)
        .map(|a| (a, true))
        .or_else(|| series.areas.first().map(|a| (a, false)))
}

pub fn weather_series(report: &ForecastReport) -> Result<&TimeSeries, ForecastError> {
    report
        .time_series
        .iter()
        .find(|s| s.carries_weather())
        .ok_or(ForecastError::NoWeatherSeries)
}

pub fn temperature_series(report: &ForecastReport) -> Result<&TimeSeries, ForecastError> {
    report
        .time_series
        .iter()
        .find(|s| s.carries_temperatures())
        .ok_or(ForecastError::NoTemperatureSeries)
}

/// Extract rows for `area_code` from a short-range report.
///
/// Row `i` pairs `temps[2i]` as the low and `temps[2i + 1]` as the high.
/// Upstream does not guarantee that order for every day; the positional
/// pairing is kept as-is.
///
/// Any extraction failure discards the whole result: either every row is
/// produced or an error is returned.
pub fn normalize(report: &ForecastReport, area_code: &str) -> Result<NormalizedForecast, ForecastError> {
    let mut fallbacks = Vec::new();

    let series = weather_series(report)?;
    let (weather, matched) = area_or_first(series, area_code).ok_or(ForecastError::NoWeatherSeries)?;
    if !matched {
        tracing::warn!(
            "Area {} has no weather entry, using {}",
            area_code,
            weather.area.code
        );
        fallbacks.push(Fallback::WeatherArea {
            requested: area_code.to_string(),
            used: weather.area.code.clone(),
        });
    }

    let (temps, temperature_area): (&[String], Option<String>) = match temperature_series(report) {
        Ok(temp_series) => match area_or_first(temp_series, area_code) {
            Some((entry, matched)) => {
                if !matched {
                    tracing::debug!(
                        "Area {} has no temperatures, using {}",
                        area_code,
                        entry.area.code
                    );
                    fallbacks.push(Fallback::TemperatureArea {
                        requested: area_code.to_string(),
                        used: entry.area.code.clone(),
                    });
                }
                (entry.temps.as_deref().unwrap_or(NO_TEMPS), Some(entry.area.code.clone()))
            }
            None => (NO_TEMPS, None),
        },
        Err(e) if e.is_degradable() => {
            tracing::warn!("{}; temperatures will be blank", e);
            fallbacks.push(Fallback::NoTemperatureSeries);
            (NO_TEMPS, None)
        }
        Err(e) => return Err(e),
    };

    let rows = build_rows(series, weather, temps)?;
    tracing::debug!("Normalized {} rows for area {}", rows.len(), area_code);

    Ok(NormalizedForecast {
        requested_area: area_code.to_string(),
        weather_area: weather.area.code.clone(),
        temperature_area,
        rows,
        fallbacks,
    })
}

fn build_rows(
    series: &TimeSeries,
    weather: &SeriesArea,
    temps: &[String],
) -> Result<Vec<ForecastRow>, ForecastError> {
    let missing = |field| ForecastError::MissingField {
        area: weather.area.code.clone(),
        field,
    };
    let codes = weather.weather_codes.as_ref().ok_or_else(|| missing("weatherCodes"))?;
    let texts = weather.weathers.as_ref().ok_or_else(|| missing("weathers"))?;

    for (field, actual) in [("weathers", texts.len()), ("timeDefines", series.time_defines.len())] {
        if actual < codes.len() {
            return Err(ForecastError::MisalignedSeries {
                field,
                expected: codes.len(),
                actual,
            });
        }
    }

    codes
        .iter()
        .zip(texts)
        .zip(&series.time_defines)
        .enumerate()
        .map(|(i, ((code, text), stamp))| {
            Ok(ForecastRow {
                date: truncate_to_date(stamp)?,
                weather_code: code.clone(),
                weather_text: normalize_spaces(text),
                temp_low: Temperature::from_slot(temps.get(2 * i)),
                temp_high: Temperature::from_slot(temps.get(2 * i + 1)),
            })
        })
        .collect()
}

/// Calendar date of an ISO-8601 timestamp, in the timestamp's own offset.
fn truncate_to_date(stamp: &str) -> Result<NaiveDate, ForecastError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(stamp) {
        return Ok(dt.date_naive());
    }

    stamp
        .get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .ok_or_else(|| ForecastError::InvalidTimestamp(stamp.to_string()))
}

/// Full-width (ideographic) spaces become ASCII spaces.
fn normalize_spaces(text: &str) -> String {
    text.replace('\u{3000}', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(value: serde_json::Value) -> ForecastReport {
        serde_json::from_value(value).unwrap()
    }

    fn tokyo_report() -> ForecastReport {
        report(json!({
            "publishingOffice": "気象庁",
            "reportDatetime": "2024-01-01T05:00:00+09:00",
            "timeSeries": [
                {
                    "timeDefines": ["2024-01-01T05:00:00+09:00", "2024-01-02T00:00:00+09:00", "2024-01-03T00:00:00+09:00"],
                    "areas": [
                        {
                            "area": {"name": "東京地方", "code": "130010"},
                            "weatherCodes": ["100", "201", "313"],
                            "weathers": ["晴れ", "くもり　時々　晴れ", "雨　後　くもり"],
                            "winds": ["北の風"]
                        },
                        {
                            "area": {"name": "伊豆諸島北部", "code": "130020"},
                            "weatherCodes": ["200", "300", "400"],
                            "weathers": ["くもり", "雨", "雪"]
                        }
                    ]
                },
                {
                    "timeDefines": ["2024-01-01T06:00:00+09:00"],
                    "areas": [{"area": {"name": "東京地方", "code": "130010"}, "pops": ["0", "10"]}]
                },
                {
                    "timeDefines": ["2024-01-01T09:00:00+09:00", "2024-01-01T00:00:00+09:00"],
                    "areas": [
                        {"area": {"name": "東京", "code": "44132"}, "temps": ["5", "15", "6", "16"]},
                        {"area": {"name": "大島", "code": "44172"}, "temps": ["8", "13"]}
                    ]
                }
            ]
        }))
    }

    #[test]
    fn test_rows_follow_weather_codes() {
        let out = normalize(&tokyo_report(), "130010").unwrap();
        assert_eq!(out.rows.len(), 3);
        assert_eq!(out.weather_area, "130010");
        assert_eq!(out.rows[1].weather_code, "201");
        assert_eq!(out.rows[2].date, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
    }

    #[test]
    fn test_full_width_spaces_are_normalized() {
        let out = normalize(&tokyo_report(), "130010").unwrap();
        assert_eq!(out.rows[1].weather_text, "くもり 時々 晴れ");
        assert_eq!(out.rows[2].weather_text, "雨 後 くもり");
    }

    #[test]
    fn test_temperature_pairs_and_sentinels() {
        let out = normalize(&tokyo_report(), "130010").unwrap();
        let temps: Vec<_> = out
            .rows
            .iter()
            .map(|r| (r.temp_low.to_string(), r.temp_high.to_string()))
            .collect();
        assert_eq!(
            temps,
            vec![
                ("5".into(), "15".into()),
                ("6".into(), "16".into()),
                ("--".into(), "--".into())
            ]
        );
    }

    #[test]
    fn test_odd_temperature_count_leaves_high_unknown() {
        let mut r = tokyo_report();
        r.time_series[2].areas[0].temps = Some(vec!["5".into(), "15".into(), "6".into()]);

        let out = normalize(&r, "130010").unwrap();
        assert_eq!(out.rows[1].temp_low, Temperature::Reported("6".into()));
        assert_eq!(out.rows[1].temp_high, Temperature::Unknown);
        assert_eq!(out.rows[2].temp_low, Temperature::Unknown);
    }

    #[test]
    fn test_temperature_falls_back_to_first_area() {
        let out = normalize(&tokyo_report(), "130010").unwrap();
        assert_eq!(out.temperature_area.as_deref(), Some("44132"));
        assert!(out.fallbacks.contains(&Fallback::TemperatureArea {
            requested: "130010".into(),
            used: "44132".into()
        }));
    }

    #[test]
    fn test_temperature_matched_by_code_not_position() {
        let mut r = tokyo_report();
        // 130020 is the second weather entry but the first temperature entry
        r.time_series[2].areas[0].area.code = "130020".into();
        r.time_series[2].areas[1].area.code = "130010".into();

        let out = normalize(&r, "130020").unwrap();
        assert_eq!(out.temperature_area.as_deref(), Some("130020"));
        assert_eq!(out.rows[0].temp_low, Temperature::Reported("5".into()));
        assert_eq!(out.rows[1].temp_high, Temperature::Reported("16".into()));
        assert!(out.fallbacks.is_empty());

        let out = normalize(&r, "130010").unwrap();
        assert_eq!(out.rows[0].temp_low, Temperature::Reported("8".into()));
        assert_eq!(out.rows[0].temp_high, Temperature::Reported("13".into()));
        assert_eq!(out.rows[1].temp_low, Temperature::Unknown);
    }

    #[test]
    fn test_weather_falls_back_to_first_area() {
        let out = normalize(&tokyo_report(), "999999").unwrap();
        assert_eq!(out.weather_area, "130010");
        assert_eq!(out.rows.len(), 3);
        assert_eq!(
            out.fallbacks[0],
            Fallback::WeatherArea {
                requested: "999999".into(),
                used: "130010".into()
            }
        );
    }

    #[test]
    fn test_second_weather_area_selected_by_code() {
        let out = normalize(&tokyo_report(), "130020").unwrap();
        let codes: Vec<_> = out.rows.iter().map(|r| r.weather_code.as_str()).collect();
        assert_eq!(codes, vec!["200", "300", "400"]);
    }

    #[test]
    fn test_missing_temperature_series_degrades() {
        let mut r = tokyo_report();
        r.time_series.truncate(2);

        let out = normalize(&r, "130010").unwrap();
        assert_eq!(out.rows.len(), 3);
        assert!(out.rows.iter().all(|row| !row.temp_low.is_reported() && !row.temp_high.is_reported()));
        assert_eq!(out.fallbacks, vec![Fallback::NoTemperatureSeries]);
        assert_eq!(out.temperature_area, None);
    }

    #[test]
    fn test_missing_weather_series_fails() {
        let mut r = tokyo_report();
        r.time_series.remove(0);

        let err = normalize(&r, "130010").unwrap_err();
        assert!(matches!(err, ForecastError::NoWeatherSeries));
    }

    #[test]
    fn test_short_weathers_discards_all_rows() {
        let mut r = tokyo_report();
        r.time_series[0].areas[0].weathers = Some(vec!["晴れ".into()]);

        let err = normalize(&r, "130010").unwrap_err();
        assert!(matches!(
            err,
            ForecastError::MisalignedSeries { field: "weathers", expected: 3, actual: 1 }
        ));
    }

    #[test]
    fn test_short_time_defines_discards_all_rows() {
        let mut r = tokyo_report();
        r.time_series[0].time_defines.pop();

        let err = normalize(&r, "130010").unwrap_err();
        assert!(matches!(err, ForecastError::MisalignedSeries { field: "timeDefines", .. }));
    }

    #[test]
    fn test_missing_weather_codes_is_reported() {
        let mut r = tokyo_report();
        r.time_series[0].areas[1].weather_codes = None;

        let err = normalize(&r, "130020").unwrap_err();
        assert!(matches!(err, ForecastError::MissingField { field: "weatherCodes", .. }));
    }

    #[test]
    fn test_bad_timestamp_discards_all_rows() {
        let mut r = tokyo_report();
        r.time_series[0].time_defines[2] = "tomorrow".into();

        let err = normalize(&r, "130010").unwrap_err();
        assert!(matches!(err, ForecastError::InvalidTimestamp(s) if s == "tomorrow"));
    }

    #[test]
    fn test_truncate_to_date_keeps_local_date() {
        assert_eq!(
            truncate_to_date("2024-01-01T23:30:00+09:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
        );
        assert_eq!(
            truncate_to_date("2024-02-29T00:00:00").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_area_or_first_on_empty_series() {
        assert!(area_or_first(&TimeSeries::default(), "130010").is_none());
    }
}
