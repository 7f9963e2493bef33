use std::fs;
use tracing::info;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub const RATES_JSON: &str = r#"{
        "provider": "https://www.exchangerate-api.com",
        "base": "RWF",
        "date": "2025-06-30",
        "rates": {
            "RWF": 1,
            "EUR": 0.00071,
            "RUB": 0.013,
            "USD": 0.00077
        }
    }"#;

    pub async fn create_rates_mock_server(status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/latest/RWF"))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    pub fn write_config(base_url: &str) -> tempfile::NamedTempFile {
        let config_file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
        let config_content = format!(
            r#"
providers:
  exchange_rate:
    base_url: {base_url}
    retries: 1
    retry_delay_ms: 1
defaults:
  from: USD
  to: RWF
"#
        );
        std::fs::write(config_file.path(), config_content).expect("Failed to write config file");
        config_file
    }
}

#[test_log::test(tokio::test)]
async fn test_convert_flow_with_mock() {
    let mock_server = test_utils::create_rates_mock_server(200, test_utils::RATES_JSON).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = diiflip::run_command(
        diiflip::AppCommand::Convert {
            amount: "100".to_string(),
            from: "USD".to_string(),
            to: "RWF".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Convert command failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_session_converts_with_fetched_rates() {
    use diiflip::core::config::ExchangeRateProviderConfig;
    use diiflip::core::{Currency, Session};
    use diiflip::providers::ExchangeRateApiProvider;

    let mock_server = test_utils::create_rates_mock_server(200, test_utils::RATES_JSON).await;
    let provider = ExchangeRateApiProvider::new(&ExchangeRateProviderConfig {
        base_url: mock_server.uri(),
        timeout_secs: 5,
        retries: 0,
        retry_delay_ms: 1,
    })
    .expect("Failed to build provider");

    let mut session = Session::default();
    session
        .refresh_rates(&provider)
        .await
        .expect("Failed to fetch rates");

    let to_base = session
        .convert_between("100", "USD", "RWF")
        .expect("Conversion failed");
    info!(?to_base, "Converted USD to RWF");
    assert_eq!(to_base.result.converted_amount, 129870.13);
    assert_eq!(to_base.result.display_rate, 1298.7013);

    let from_base = session
        .convert_between("1000", "RWF", "USD")
        .expect("Conversion failed");
    assert_eq!(from_base.result.converted_amount, 0.77);
    assert_eq!(from_base.result.display_rate, 0.0008);

    let latest = session.history().latest().expect("History is empty");
    assert_eq!(latest.id, from_base.id);
    assert_eq!(latest.to, Currency::Usd);
    assert_eq!(session.history().len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_rates_flow_with_mock() {
    let mock_server = test_utils::create_rates_mock_server(200, test_utils::RATES_JSON).await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = diiflip::run_command(
        diiflip::AppCommand::Rates,
        Some(config_file.path().to_str().unwrap()),
    )
    .await;
    assert!(result.is_ok(), "Rates command failed with: {:?}", result.err());
}

#[test_log::test(tokio::test)]
async fn test_convert_fails_when_rates_unavailable() {
    let mock_server = test_utils::create_rates_mock_server(503, "").await;
    let config_file = test_utils::write_config(&mock_server.uri());

    let result = diiflip::run_command(
        diiflip::AppCommand::Convert {
            amount: "100".to_string(),
            from: "USD".to_string(),
            to: "RWF".to_string(),
        },
        Some(config_file.path().to_str().unwrap()),
    )
    .await;

    let err = result.expect_err("Conversion should fail without rates");
    info!(error = %err, "Conversion failed as expected");
    assert!(err.to_string().contains("Unable to fetch exchange rates"));
}

#[test_log::test(tokio::test)]
async fn test_invalid_input_is_rejected_before_fetching() {
    let mock_server = wiremock::MockServer::start().await;
    wiremock::Mock::given(wiremock::matchers::method("GET"))
        .respond_with(wiremock::ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;
    let config_file = test_utils::write_config(&mock_server.uri());

    for (amount, from, to, expected) in [
        ("abc", "USD", "RWF", "Please enter a valid amount"),
        ("0", "USD", "RWF", "Please enter a valid amount"),
        ("10", "USD", "GBP", "Unsupported currency: GBP"),
    ] {
        let result = diiflip::run_command(
            diiflip::AppCommand::Convert {
                amount: amount.to_string(),
                from: from.to_string(),
                to: to.to_string(),
            },
            Some(config_file.path().to_str().unwrap()),
        )
        .await;
        assert_eq!(result.unwrap_err().to_string(), expected);
    }
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope.yaml");
    assert!(!missing.exists());

    let result = diiflip::core::config::AppConfig::load_from_path(&missing);
    assert!(result.is_err());
    assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
}
