//! Pre-flight configuration checker.
//!
//! Loads the YAML config and reports each fishing instance's validity,
//! including the offset-versus-fees profitability check, without touching
//! any exchange.

use std::env;
use std::process::ExitCode;

use rust_decimal::Decimal;
use tracing::{Level, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use fishing_bot::config::Config;

const DEFAULT_CONFIG_PATH: &str = "configs/config.yaml";

fn parse_config_path() -> String {
    for arg in env::args().skip(1) {
        if let Some(path) = arg.strip_prefix("--config=") {
            return path.to_string();
        }
    }
    DEFAULT_CONFIG_PATH.to_string()
}

fn init_tracing(log_level: Option<&str>) {
    let level = match log_level {
        Some("debug") => Level::DEBUG,
        Some("info") => Level::INFO,
        Some("warn") | Some("warning") => Level::WARN,
        Some("error") => Level::ERROR,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn main() -> ExitCode {
    let config_path = parse_config_path();

    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config {}: {}", config_path, e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.app.log_level.as_deref());
    info!(config = %config_path, instances = config.fishing.len(), "config loaded");

    let fee_of = |name: &str| {
        config
            .exchanges
            .get(name)
            .and_then(|e| e.fee)
            .unwrap_or(Decimal::ZERO)
    };

    let mut invalid = 0;
    for instance in &config.fishing {
        let reference_fee = fee_of(&instance.reference_exchange);
        let target_fee = fee_of(&instance.target_exchange);

        match instance.validity_with_fees(reference_fee, target_fee) {
            None => {
                info!(
                    pair = %instance.pair,
                    reference = %instance.reference_exchange,
                    target = %instance.target_exchange,
                    offset = %instance.price_offset,
                    "instance valid"
                );
            }
            Some(reason) => {
                invalid += 1;
                warn!(
                    pair = %instance.pair,
                    reference = %instance.reference_exchange,
                    target = %instance.target_exchange,
                    reason,
                    "instance invalid"
                );
            }
        }
    }

    if invalid > 0 {
        error!(invalid, "configuration check failed");
        return ExitCode::FAILURE;
    }
    info!("configuration check passed");
    ExitCode::SUCCESS
}
