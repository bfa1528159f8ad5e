use rust_decimal_macros::dec;
use std::fs;
use stratfolio::core::config::AppConfig;
use stratfolio::core::AllocationError;

mod test_utils {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub fn yahoo_chart(price: f64, closes: &[f64]) -> String {
        let start = 1_709_510_400; // 2024-03-04
        let timestamps: Vec<String> = (0..closes.len())
            .map(|i| (start + i as i64 * 86_400).to_string())
            .collect();
        let closes: Vec<String> = closes.iter().map(|c| c.to_string()).collect();
        format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "regularMarketPrice": {price}, "currency": "USD" }},
                        "timestamp": [{}],
                        "indicators": {{ "quote": [{{ "close": [{}] }}] }}
                    }}]
                }}
            }}"#,
            timestamps.join(","),
            closes.join(",")
        )
    }

    pub async fn mount_yahoo(server: &MockServer, symbol: &str, status: u16, body: String) {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{symbol}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    pub async fn mount_tiingo(server: &MockServer, ticker: &str, body: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/tiingo/daily/{ticker}/prices")))
            .respond_with(ResponseTemplate::new(200).set_body_string(body.to_string()))
            .mount(server)
            .await;
    }

    pub fn write_config(dir: &std::path::Path, body: &str) -> std::path::PathBuf {
        let config_path = dir.join("config.yaml");
        std::fs::write(&config_path, body).expect("Failed to write config file");
        config_path
    }
}

fn yahoo_config(base_url: &str) -> String {
    format!(
        r#"
        provider: yahoo
        providers:
          yahoo:
            base_url: {base_url}
        retry:
          max_attempts: 2
          backoff_base_ms: 0
          max_jitter_ms: 0
        cache:
          persist: false
        request_pacing_ms: 0
    "#
    )
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_yahoo_mock() {
    let server = wiremock::MockServer::start().await;
    for (symbol, price) in [("MSFT", 400.0), ("JNJ", 150.0), ("PG", 160.0)] {
        let body = test_utils::yahoo_chart(price, &[price - 2.0, price - 1.0]);
        test_utils::mount_yahoo(&server, symbol, 200, body).await;
    }

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path =
        test_utils::write_config(temp_dir.path(), &yahoo_config(&server.uri()));

    let result = stratfolio::run_command(
        stratfolio::AppCommand::Allocate {
            amount: "$9,000".to_string(),
            strategy: "quality".to_string(),
            json: false,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(
        result.is_ok(),
        "Allocation failed with: {:?}",
        result.err()
    );
}

#[test_log::test(tokio::test)]
async fn test_engine_report_from_yahoo_mock() {
    let server = wiremock::MockServer::start().await;
    for (symbol, price) in [("MSFT", 400.0), ("JNJ", 150.0), ("PG", 160.0)] {
        let body = test_utils::yahoo_chart(price, &[price - 2.0, price - 1.0]);
        test_utils::mount_yahoo(&server, symbol, 200, body).await;
    }

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path =
        test_utils::write_config(temp_dir.path(), &yahoo_config(&server.uri()));
    let config = AppConfig::load_from_path(&config_path).expect("Failed to load config");

    let engine = stratfolio::build_engine(&config).expect("Failed to build engine");
    let report = engine.allocate(dec!(9000), "quality").await.unwrap();

    let shares: Vec<u64> = report.allocations.iter().map(|a| a.shares).collect();
    assert_eq!(shares, vec![7, 20, 18]);
    assert_eq!(report.current_value, dec!(8680));
    assert_eq!(report.uninvested, dec!(320));
    assert_eq!(report.total_value_change, dec!(90));
    assert_eq!(report.trend.len(), 2);
    assert_eq!(report.trend[0].value, dec!(8590));
    assert_eq!(report.trend[1].value, dec!(8635));
}

#[test_log::test(tokio::test)]
async fn test_failing_symbol_aborts_allocation() {
    let server = wiremock::MockServer::start().await;
    test_utils::mount_yahoo(
        &server,
        "MSFT",
        200,
        test_utils::yahoo_chart(400.0, &[399.0]),
    )
    .await;
    test_utils::mount_yahoo(&server, "JNJ", 503, String::new()).await;

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path =
        test_utils::write_config(temp_dir.path(), &yahoo_config(&server.uri()));
    let config = AppConfig::load_from_path(&config_path).expect("Failed to load config");
    let engine = stratfolio::build_engine(&config).expect("Failed to build engine");

    let err = engine.allocate(dec!(9000), "quality").await.unwrap_err();
    assert!(matches!(err, AllocationError::Fetch { ref symbol, .. } if symbol == "JNJ"));
    assert!(
        err.to_string()
            .contains("Unable to fetch data for 'JNJ' after 2 attempts"),
        "unexpected error: {err}"
    );

    let requests = server.received_requests().await.unwrap();
    let jnj_calls = requests
        .iter()
        .filter(|r| r.url.path() == "/v8/finance/chart/JNJ")
        .count();
    assert_eq!(jnj_calls, 2);
    assert!(
        requests
            .iter()
            .all(|r| r.url.path() != "/v8/finance/chart/PG")
    );

    let result = stratfolio::run_command(
        stratfolio::AppCommand::Allocate {
            amount: "9000".to_string(),
            strategy: "quality".to_string(),
            json: true,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;
    assert!(result.is_err());
}

#[test_log::test(tokio::test)]
async fn test_full_app_flow_with_tiingo_mock() {
    let server = wiremock::MockServer::start().await;
    let bars = r#"[
        {"date": "2024-03-07T00:00:00.000Z", "close": 250.0},
        {"date": "2024-03-08T00:00:00.000Z", "close": 245.0}
    ]"#;
    for ticker in ["NVDA", "TSLA", "AMZN"] {
        test_utils::mount_tiingo(&server, ticker, bars).await;
    }

    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path = test_utils::write_config(
        temp_dir.path(),
        &format!(
            r#"
            provider: tiingo
            providers:
              tiingo:
                base_url: {}
                api_key: "test-token"
            cache:
              persist: false
            request_pacing_ms: 0
            minimum_amount: 1000
        "#,
            server.uri()
        ),
    );
    let config = AppConfig::load_from_path(&config_path).expect("Failed to load config");
    assert_eq!(config.minimum_amount, dec!(1000));

    let engine = stratfolio::build_engine(&config).expect("Failed to build engine");
    let report = engine.allocate(dec!(1500), "growth").await.unwrap();

    assert!(report.allocations.iter().all(|a| a.shares == 2));
    assert!(report.allocations.iter().all(|a| a.current_price == dec!(250)));
    assert_eq!(report.uninvested, dec!(0));
}

#[test_log::test(tokio::test)]
async fn test_amount_below_minimum_makes_no_requests() {
    let server = wiremock::MockServer::start().await;
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let config_path =
        test_utils::write_config(temp_dir.path(), &yahoo_config(&server.uri()));

    let result = stratfolio::run_command(
        stratfolio::AppCommand::Allocate {
            amount: "4999".to_string(),
            strategy: "index".to_string(),
            json: false,
        },
        Some(config_path.to_str().unwrap()),
    )
    .await;

    let err = result.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Investment amount must be at least $5000 USD."
    );
    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(fs::read_dir(temp_dir.path()).unwrap().count() == 1);
}

#[test_log::test(tokio::test)]
async fn test_strategies_command() {
    let result = stratfolio::run_command(stratfolio::AppCommand::Strategies, None).await;
    assert!(result.is_ok());
}
