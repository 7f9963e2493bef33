use super::util::with_retry;
use crate::core::config::ExchangeRateProviderConfig;
use crate::core::currency::{Currency, CurrencyRateProvider, RateTable};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, error, instrument};

const USER_AGENT: &str = concat!("diiflip/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct LatestRatesResponse {
    base: String,
    #[serde(default)]
    date: Option<String>,
    rates: HashMap<String, f64>,
}

/// Rate provider backed by the exchangerate-api.com `v4/latest` endpoint.
pub struct ExchangeRateApiProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl ExchangeRateApiProvider {
    pub fn new(config: &ExchangeRateProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }
}

#[async_trait]
impl CurrencyRateProvider for ExchangeRateApiProvider {
    #[instrument(skip(self))]
    async fn fetch_rates(&self, base: Currency) -> Result<RateTable> {
        let url = format!("{}/v4/latest/{}", self.base_url, base);
        debug!("Requesting exchange rates from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).send().await?.error_for_status() },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|e| anyhow!("Failed to fetch exchange rates for {}: {}", base, e))?;

        let text = response
            .text()
            .await
            .context("Failed to get response text")?;

        let data: LatestRatesResponse = match serde_json::from_str(&text) {
            Ok(data) => data,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %text,
                    "Failed to parse exchange rate response"
                );
                return Err(anyhow!(
                    "Failed to parse exchange rate response for {}: {}",
                    base,
                    e
                ));
            }
        };

        if !data.base.eq_ignore_ascii_case(base.code()) {
            return Err(anyhow!(
                "Unexpected base currency {} in response, expected {}",
                data.base,
                base
            ));
        }
        debug!(
            "Received {} rates dated {}",
            data.rates.len(),
            data.date.as_deref().unwrap_or("unknown")
        );

        Ok(RateTable::from_raw(data.rates, Utc::now()))
    }
}
