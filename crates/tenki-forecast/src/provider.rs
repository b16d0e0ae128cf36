//! JMA "bosai" HTTP source for area definitions and forecast documents.

use std::future::Future;
use std::sync::Arc;

use reqwest::Client;
use serde::de::DeserializeOwned;
use tenki_core::{ApiConfig, Config, NetworkError, ReqwestErrorExt};
use tracing::instrument;

use crate::error::ForecastError;
use crate::retry::{with_retry, RetryConfig};
use crate::types::{AreaDocument, ForecastReport};

/// Where the session gets its documents from.
pub trait ForecastSource {
    /// The area-definition document (fetched once at startup).
    fn fetch_area_document(&self) -> impl Future<Output = Result<AreaDocument, ForecastError>> + Send;

    /// The short-range report (element 0) of an office's forecast document.
    fn fetch_short_range(
        &self,
        office_code: &str,
    ) -> impl Future<Output = Result<ForecastReport, ForecastError>> + Send;
}

#[derive(Debug, Clone)]
pub struct JmaClient {
    client: Arc<Client>,
    base_url: String,
    retry: RetryConfig,
}

impl JmaClient {
    pub fn new(api: &ApiConfig, retry: RetryConfig) -> Result<Self, ForecastError> {
        let client = Client::builder()
            .timeout(api.timeout())
            .user_agent(api.user_agent.as_str())
            .build()
            .map_err(|e| e.into_network_error())?;

        Ok(Self {
            client: Arc::new(client),
            base_url: api.base_url.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ForecastError> {
        Self::new(&config.api, RetryConfig::from(&config.retry))
    }

    /// Client against an arbitrary base URL with default timeouts (mock servers, mirrors).
    pub fn with_base_url(base_url: &str, retry: RetryConfig) -> Result<Self, ForecastError> {
        let api = ApiConfig {
            base_url: base_url.to_string(),
            ..ApiConfig::default()
        };
        Self::new(&api, retry)
    }

    fn area_url(&self) -> String {
        format!("{}/common/const/area.json", self.base_url)
    }

    fn forecast_url(&self, office_code: &str) -> String {
        format!("{}/forecast/data/forecast/{}.json", self.base_url, office_code)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ForecastError> {
        let response = with_retry(&self.retry, || self.client.get(url).send())
            .await
            .map_err(|e| e.into_network_error())?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NetworkError::ServerError {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        response
            .json::<T>()
            .await
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()).into())
    }

    /// The whole forecast document as raw JSON, one value per report.
    #[instrument(skip(self), level = "info")]
    pub async fn fetch_forecast_reports(
        &self,
        office_code: &str,
    ) -> Result<Vec<serde_json::Value>, ForecastError> {
        self.get_json(&self.forecast_url(office_code)).await
    }
}

impl ForecastSource for JmaClient {
    #[instrument(skip(self), level = "info")]
    async fn fetch_area_document(&self) -> Result<AreaDocument, ForecastError> {
        self.get_json(&self.area_url()).await
    }

    /// Only element 0 is decoded, so a longer-range report with an
    /// unexpected shape cannot break the short-range view.
    #[instrument(skip(self), level = "info")]
    async fn fetch_short_range(&self, office_code: &str) -> Result<ForecastReport, ForecastError> {
        let short_range = self
            .fetch_forecast_reports(office_code)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ForecastError::EmptyForecast(office_code.to_string()))?;

        let report: ForecastReport = serde_json::from_value(short_range)
            .map_err(|e| NetworkError::InvalidResponse(e.to_string()))?;

        tracing::info!(
            "Fetched forecast for office {} ({} series)",
            office_code,
            report.time_series.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_from_base() {
        let client = JmaClient::with_base_url("https://www.jma.go.jp/bosai/", RetryConfig::none()).unwrap();
        assert_eq!(
            client.area_url(),
            "https://www.jma.go.jp/bosai/common/const/area.json"
        );
        assert_eq!(
            client.forecast_url("130000"),
            "https://www.jma.go.jp/bosai/forecast/data/forecast/130000.json"
        );
    }

    #[test]
    fn test_from_default_config() {
        let client = JmaClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.base_url, "https://www.jma.go.jp/bosai");
        assert_eq!(client.retry.max_retries, 3);
    }
}
