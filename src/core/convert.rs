//! Conversion arithmetic between supported currencies.
//!
//! All rates in a [`RateTable`] are quoted against the base currency, so a
//! conversion between two non-base currencies goes through the base.

use super::currency::{Currency, RateTable};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    #[error("Please enter a valid amount")]
    InvalidAmount,
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("Exchange rates are unavailable. Please try again later.")]
    RatesUnavailable,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionRequest {
    pub amount: f64,
    pub from: Currency,
    pub to: Currency,
}

impl ConversionRequest {
    pub fn new(amount: f64, from: Currency, to: Currency) -> Self {
        Self { amount, from, to }
    }

    /// Validates raw user input into a request.
    pub fn parse(amount: &str, from: &str, to: &str) -> Result<Self, ConversionError> {
        Ok(Self {
            amount: parse_amount(amount)?,
            from: from.parse()?,
            to: to.parse()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConversionResult {
    /// Rounded to 2 decimal places.
    pub converted_amount: f64,
    /// Units of the target currency per unit of the source, rounded to 4
    /// decimal places.
    pub display_rate: f64,
}

/// Parses an amount typed by the user. Only finite, strictly positive
/// numbers are accepted.
pub fn parse_amount(input: &str) -> Result<f64, ConversionError> {
    let amount: f64 = input
        .trim()
        .parse()
        .map_err(|_| ConversionError::InvalidAmount)?;
    validate_amount(amount)?;
    Ok(amount)
}

fn validate_amount(amount: f64) -> Result<(), ConversionError> {
    if amount.is_finite() && amount > 0.0 {
        Ok(())
    } else {
        Err(ConversionError::InvalidAmount)
    }
}

/// Rounds half away from zero. Values too large to carry a fractional part
/// are returned unchanged.
pub fn round_to(value: f64, places: i32) -> f64 {
    const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0; // 2^52

    let factor = 10f64.powi(places);
    let scaled = value * factor;
    if !scaled.is_finite() || value.abs() >= EXACT_INTEGER_LIMIT / factor {
        return value;
    }
    scaled.round() / factor
}

/// Effective rate between two currencies, unrounded.
pub fn effective_rate(
    from: Currency,
    to: Currency,
    rates: &RateTable,
) -> Result<f64, ConversionError> {
    if from == to {
        return Ok(1.0);
    }

    if from.is_base() {
        rate_for(to, rates)
    } else if to.is_base() {
        Ok(1.0 / rate_for(from, rates)?)
    } else {
        Ok(rate_for(to, rates)? / rate_for(from, rates)?)
    }
}

/// Converts `request.amount` using `rates`. `None` means no table has been
/// loaded yet.
pub fn convert(
    request: &ConversionRequest,
    rates: Option<&RateTable>,
) -> Result<ConversionResult, ConversionError> {
    validate_amount(request.amount)?;
    let rates = rates.ok_or(ConversionError::RatesUnavailable)?;

    let ConversionRequest { amount, from, to } = *request;
    let converted = if from == to {
        amount
    } else if from.is_base() {
        amount * rate_for(to, rates)?
    } else if to.is_base() {
        amount / rate_for(from, rates)?
    } else {
        amount / rate_for(from, rates)? * rate_for(to, rates)?
    };
    if !converted.is_finite() {
        return Err(ConversionError::InvalidAmount);
    }

    Ok(ConversionResult {
        converted_amount: round_to(converted, 2),
        display_rate: round_to(effective_rate(from, to, rates)?, 4),
    })
}

fn rate_for(currency: Currency, rates: &RateTable) -> Result<f64, ConversionError> {
    rates
        .rate(currency)
        .ok_or(ConversionError::RatesUnavailable)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_rates() -> RateTable {
        RateTable::from_raw(
            [("RUB", 0.013), ("USD", 0.00077), ("EUR", 0.00071)],
            Utc::now(),
        )
    }

    #[test]
    fn test_convert_from_base() {
        let rates = sample_rates();
        let request = ConversionRequest::new(1000.0, Currency::Rwf, Currency::Usd);

        let result = convert(&request, Some(&rates)).unwrap();
        assert_eq!(result.converted_amount, 0.77);
        assert_eq!(result.display_rate, 0.0008);
    }

    #[test]
    fn test_convert_to_base() {
        let rates = sample_rates();
        let request = ConversionRequest::new(100.0, Currency::Usd, Currency::Rwf);

        let result = convert(&request, Some(&rates)).unwrap();
        assert_eq!(result.converted_amount, 129870.13);
        assert_eq!(result.display_rate, 1298.7013);
    }

    #[test]
    fn test_convert_between_non_base_currencies() {
        let rates = sample_rates();
        let request = ConversionRequest::new(50.0, Currency::Eur, Currency::Rub);

        let result = convert(&request, Some(&rates)).unwrap();
        assert_eq!(result.converted_amount, 915.49);
        assert_eq!(result.display_rate, 18.3099);
    }

    #[test]
    fn test_same_currency_is_identity() {
        let rates = sample_rates();
        for currency in Currency::ALL {
            for amount in [0.01, 1.0, 42.5, 123456.78] {
                let request = ConversionRequest::new(amount, currency, currency);
                let result = convert(&request, Some(&rates)).unwrap();
                assert_eq!(result.converted_amount, round_to(amount, 2));
                assert_eq!(result.display_rate, 1.0);
            }
        }
    }

    #[test]
    fn test_huge_amounts_do_not_overflow() {
        let rates = sample_rates();
        for amount in [1e307, f64::MAX, 9.007_199_254_740_993e15] {
            let request = ConversionRequest::new(amount, Currency::Usd, Currency::Usd);
            let result = convert(&request, Some(&rates)).unwrap();
            assert_eq!(result.converted_amount, amount);
            assert!(result.converted_amount.is_finite());
        }

        let overflowing = ConversionRequest::new(1e306, Currency::Usd, Currency::Rwf);
        assert_eq!(
            convert(&overflowing, Some(&rates)),
            Err(ConversionError::InvalidAmount)
        );

        let shrinking = ConversionRequest::new(1e306, Currency::Rwf, Currency::Usd);
        let result = convert(&shrinking, Some(&rates)).unwrap();
        assert_eq!(result.converted_amount, 1e306 * 0.00077);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(129870.12987, 2), 129870.13);
        assert_eq!(round_to(0.00077, 4), 0.0008);
        assert_eq!(round_to(f64::MAX, 2), f64::MAX);
        assert_eq!(round_to(-1e300, 4), -1e300);
    }

    #[test]
    fn test_round_trip_within_tolerance() {
        let rates = sample_rates();
        let pairs = [
            (Currency::Usd, Currency::Rwf, 100.0),
            (Currency::Eur, Currency::Rub, 50.0),
            (Currency::Rub, Currency::Rwf, 2500.0),
            (Currency::Eur, Currency::Usd, 999.99),
        ];

        for (from, to, amount) in pairs {
            let there = convert(&ConversionRequest::new(amount, from, to), Some(&rates)).unwrap();
            let back = convert(
                &ConversionRequest::new(there.converted_amount, to, from),
                Some(&rates),
            )
            .unwrap();
            assert!(
                (back.converted_amount - amount).abs() <= 0.01,
                "{from}->{to}->{from}: {amount} became {}",
                back.converted_amount
            );
        }
    }

    #[test]
    fn test_rates_unavailable() {
        for from in Currency::ALL {
            for to in Currency::ALL {
                let request = ConversionRequest::new(10.0, from, to);
                assert_eq!(
                    convert(&request, None),
                    Err(ConversionError::RatesUnavailable)
                );
            }
        }
    }

    #[test]
    fn test_missing_rate_is_unavailable() {
        let rates = RateTable::from_raw([("USD", 0.00077)], Utc::now());

        let to_missing = ConversionRequest::new(10.0, Currency::Rwf, Currency::Eur);
        assert_eq!(
            convert(&to_missing, Some(&rates)),
            Err(ConversionError::RatesUnavailable)
        );

        let from_missing = ConversionRequest::new(10.0, Currency::Rub, Currency::Rwf);
        assert_eq!(
            convert(&from_missing, Some(&rates)),
            Err(ConversionError::RatesUnavailable)
        );
    }

    #[test]
    fn test_invalid_amounts() {
        let rates = sample_rates();
        for amount in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            let request = ConversionRequest::new(amount, Currency::Rwf, Currency::Usd);
            assert_eq!(
                convert(&request, Some(&rates)),
                Err(ConversionError::InvalidAmount)
            );
        }
    }

    #[test]
    fn test_parse_request() {
        let request = ConversionRequest::parse("12.5", "usd", "RWF").unwrap();
        assert_eq!(request, ConversionRequest::new(12.5, Currency::Usd, Currency::Rwf));

        assert_eq!(
            ConversionRequest::parse("abc", "USD", "RWF"),
            Err(ConversionError::InvalidAmount)
        );
        assert_eq!(
            ConversionRequest::parse("", "USD", "RWF"),
            Err(ConversionError::InvalidAmount)
        );
        assert_eq!(
            ConversionRequest::parse("inf", "USD", "RWF"),
            Err(ConversionError::InvalidAmount)
        );
        assert_eq!(
            ConversionRequest::parse("10", "USD", "JPY"),
            Err(ConversionError::UnsupportedCurrency("JPY".to_string()))
        );
    }
}
