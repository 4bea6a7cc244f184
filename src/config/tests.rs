//! Tests for config module.

use super::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;

// ==================== Duration parsing tests ====================

#[test]
fn test_parse_duration_seconds() {
    let d = duration::parse_duration("30s").unwrap();
    assert_eq!(d, Duration::from_secs(30));
}

#[test]
fn test_parse_duration_milliseconds() {
    let d = duration::parse_duration("500ms").unwrap();
    assert_eq!(d, Duration::from_millis(500));
}

#[test]
fn test_parse_duration_empty() {
    let d = duration::parse_duration("").unwrap();
    assert_eq!(d, Duration::ZERO);
}

#[test]
fn test_parse_duration_invalid_unit() {
    let result = duration::parse_duration("10x");
    assert!(result.is_err());
    assert!(result.unwrap_err().contains("unknown duration unit"));
}

// ==================== YAML field loading tests ====================

/// Parse config from YAML string (for testing).
fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

fn minimal_valid_yaml() -> String {
    r#"
app:
  name: testbot
  env: development

exchanges:
  refex:
    enabled: true
    fee: "0.001"
  targetex:
    enabled: true
    fee: "0.002"

fishing:
  - pair: BTC/USDT
    reference_exchange: refex
    target_exchange: targetex
    price_offset: "0.01"
    base_to_quote: true
"#
    .to_string()
}

#[test]
fn test_load_minimal_config() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();
    cfg.validate().unwrap();

    assert_eq!(cfg.app.name, "testbot");
    assert_eq!(cfg.fishing.len(), 1);

    let instance = &cfg.fishing[0];
    assert_eq!(instance.pair, "BTC/USDT");
    assert_eq!(instance.reference_exchange, "refex");
    assert_eq!(instance.target_exchange, "targetex");
    assert_eq!(instance.price_offset, dec!(0.01));
    assert!(instance.base_to_quote);
    assert!(!instance.quote_to_base);
    assert_eq!(instance.fund, "default");
}

#[test]
fn test_load_exchange_fields() {
    let yaml = r#"
app:
  name: test
  env: development

exchanges:
  refex:
    enabled: true
    fee: "0.0010"
    auto_trading_limits:
      BTC: "0.5"
      USDT: "10000"

fishing:
  - pair: BTC/USDT
    reference_exchange: refex
    target_exchange: refex
    price_offset: "0.01"
"#;
    let cfg = from_yaml(yaml).unwrap();

    let refex = cfg.exchanges.get("refex").unwrap();
    assert!(refex.enabled);
    assert_eq!(refex.fee, Some(dec!(0.0010)));
    assert_eq!(refex.auto_trading_limits.get("BTC"), Some(&dec!(0.5)));
    assert_eq!(refex.auto_trading_limits.get("USDT"), Some(&dec!(10000)));
}

#[test]
fn test_tick_interval_default_applied() {
    let cfg = from_yaml(&minimal_valid_yaml()).unwrap();
    assert_eq!(cfg.fishing[0].tick_interval(), Duration::from_millis(500));
}

#[test]
fn test_tick_interval_parsed() {
    let yaml = minimal_valid_yaml().replace(
        "base_to_quote: true",
        "base_to_quote: true\n    tick_interval: 2s",
    );
    let cfg = from_yaml(&yaml).unwrap();
    assert_eq!(cfg.fishing[0].tick_interval(), Duration::from_secs(2));
}

#[test]
fn test_load_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", minimal_valid_yaml()).unwrap();

    let cfg = Config::load(file.path().to_str().unwrap()).unwrap();
    assert_eq!(cfg.app.name, "testbot");
}

// ==================== Validation tests ====================

#[test]
fn test_validate_requires_fishing_instances() {
    let yaml = r#"
app:
  name: test
  env: development

exchanges:
  refex:
    enabled: true
    fee: "0.001"

fishing: []
"#;
    let cfg = from_yaml(yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("at least one fishing instance"));
}

#[test]
fn test_validate_rejects_unknown_exchange() {
    let yaml = minimal_valid_yaml().replace("target_exchange: targetex", "target_exchange: ghost");
    let cfg = from_yaml(&yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("unknown exchange ghost"));
}

#[test]
fn test_validate_rejects_disabled_exchange() {
    let yaml = minimal_valid_yaml().replace(
        "targetex:\n    enabled: true",
        "targetex:\n    enabled: false",
    );
    let cfg = from_yaml(&yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("is disabled"));
}

#[test]
fn test_validate_requires_fee_for_enabled_exchange() {
    let yaml = minimal_valid_yaml().replace("    fee: \"0.002\"\n", "");
    let cfg = from_yaml(&yaml).unwrap();
    let err = cfg.validate().unwrap_err();
    assert!(err.to_string().contains("fee is required"));
}

// ==================== FishingConfig validity tests ====================

fn valid_instance() -> FishingConfig {
    FishingConfig {
        pair: "BTC/USDT".to_string(),
        reference_exchange: "refex".to_string(),
        target_exchange: "targetex".to_string(),
        fund: "default".to_string(),
        price_offset: dec!(0.01),
        base_to_quote: true,
        quote_to_base: false,
        tick_interval: Duration::ZERO,
    }
}

#[test]
fn test_instance_valid() {
    assert!(valid_instance().valid());
}

#[test]
fn test_instance_invalid_pair() {
    let mut instance = valid_instance();
    instance.pair = "BTCUSDT".to_string();
    assert!(!instance.valid());
    assert!(instance.invalid_reason().unwrap().contains("BASE/QUOTE"));
}

#[test]
fn test_instance_same_exchange() {
    let mut instance = valid_instance();
    instance.target_exchange = "refex".to_string();
    assert!(instance.invalid_reason().unwrap().contains("must differ"));
}

#[test]
fn test_instance_zero_offset() {
    let mut instance = valid_instance();
    instance.price_offset = Decimal::ZERO;
    assert!(instance.invalid_reason().unwrap().contains("positive"));
}

#[test]
fn test_instance_no_direction() {
    let mut instance = valid_instance();
    instance.base_to_quote = false;
    assert!(instance.invalid_reason().unwrap().contains("direction"));
}

#[test]
fn test_validity_with_fees_flags_thin_offset() {
    let instance = valid_instance();
    // Offset 0.01 does not exceed 0.006 + 0.004.
    let reason = instance.validity_with_fees(dec!(0.006), dec!(0.004)).unwrap();
    assert!(reason.contains("combined fees"));

    assert!(instance.validity_with_fees(dec!(0.003), dec!(0.004)).is_none());
}
