//! Currency codes, rate tables and the rate provider abstraction

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

use super::convert::ConversionError;

/// The currencies the converter knows about. Rates are always expressed
/// against [`Currency::BASE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Rwf,
    Rub,
    Usd,
    Eur,
}

impl Currency {
    pub const BASE: Currency = Currency::Rwf;
    pub const ALL: [Currency; 4] = [Currency::Rwf, Currency::Rub, Currency::Usd, Currency::Eur];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Rwf => "RWF",
            Currency::Rub => "RUB",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
        }
    }

    pub fn is_base(&self) -> bool {
        *self == Self::BASE
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "RWF" => Ok(Currency::Rwf),
            "RUB" => Ok(Currency::Rub),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            _ => Err(ConversionError::UnsupportedCurrency(s.trim().to_string())),
        }
    }
}

/// Snapshot of rates fetched at one point in time. Each rate is the number
/// of units of the currency per one unit of the base currency.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: HashMap<Currency, f64>,
    fetched_at: DateTime<Utc>,
}

impl RateTable {
    /// Builds a table from a raw code -> rate mapping as returned by a rate
    /// service. Unknown codes and rates that are not finite and positive are
    /// dropped. The base currency is always present with rate 1.
    pub fn from_raw<I, K>(raw: I, fetched_at: DateTime<Utc>) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let mut rates = HashMap::new();
        for (code, rate) in raw {
            let Ok(currency) = code.as_ref().parse::<Currency>() else {
                continue;
            };
            if !rate.is_finite() || rate <= 0.0 {
                debug!("Dropping unusable rate {} for {}", rate, currency);
                continue;
            }
            rates.insert(currency, rate);
        }
        rates.insert(Currency::BASE, 1.0);

        Self { rates, fetched_at }
    }

    pub fn rate(&self, currency: Currency) -> Option<f64> {
        self.rates.get(&currency).copied()
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    /// Rates for every supported currency, in [`Currency::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Currency, Option<f64>)> + '_ {
        Currency::ALL.into_iter().map(|c| (c, self.rate(c)))
    }
}

#[async_trait]
pub trait CurrencyRateProvider: Send + Sync {
    async fn fetch_rates(&self, base: Currency) -> Result<RateTable>;
}
