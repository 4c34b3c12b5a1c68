//! Tests for configuration validation, presets, environment parsing and
//! JSON round-tripping.

use super::*;
use crate::error::ErrorKind;
use std::env;

#[test]
fn test_default_matches_documented_policy() {
    let config = BucketMapConfig::default();
    assert_eq!(config.initial_buckets, 16);
    assert_eq!(config.max_load_factor, 0.75);
    assert_eq!(config.growth_factor, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn test_all_presets_valid() {
    assert!(BucketMapConfig::performance_preset().validate().is_ok());
    assert!(BucketMapConfig::memory_preset().validate().is_ok());
    assert_eq!(BucketMapConfig::balanced_preset(), BucketMapConfig::default());
}

#[test]
fn test_validation_rejects_bad_values() {
    let zero_buckets = BucketMapConfig::with_buckets(0);
    assert_eq!(zero_buckets.validate().unwrap_err().kind(), ErrorKind::Configuration);

    for load in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let config = BucketMapConfig {
            max_load_factor: load,
            ..BucketMapConfig::default()
        };
        assert!(config.validate().is_err(), "load factor {} accepted", load);
    }

    let no_growth = BucketMapConfig {
        growth_factor: 1,
        ..BucketMapConfig::default()
    };
    let err = no_growth.validate().unwrap_err();
    assert!(err.to_string().contains("growth_factor"));
}

#[test]
fn test_json_round_trip() {
    let config = BucketMapConfig::memory_preset();
    let json = config.to_json().unwrap();
    assert!(json.contains("initial_buckets"));
    assert_eq!(BucketMapConfig::from_json(&json).unwrap(), config);
}

#[test]
fn test_from_json_validates() {
    let json = r#"{"initial_buckets": 0, "max_load_factor": 0.75, "growth_factor": 2}"#;
    assert_eq!(
        BucketMapConfig::from_json(json).unwrap_err().kind(),
        ErrorKind::Configuration
    );

    let garbage = BucketMapConfig::from_json("not json").unwrap_err();
    assert!(garbage.to_string().contains("Failed to parse config"));
}

#[test]
fn test_from_env_with_prefix() {
    let prefix = "RAWCOLL_CFG_TEST_A_";
    env::set_var(format!("{}MAP_INITIAL_BUCKETS", prefix), "32");
    env::set_var(format!("{}MAP_MAX_LOAD_FACTOR", prefix), "0.9");
    env::set_var(format!("{}MAP_GROWTH_FACTOR", prefix), "not-a-number");

    let config = BucketMapConfig::from_env_with_prefix(prefix).unwrap();
    assert_eq!(config.initial_buckets, 32);
    assert_eq!(config.max_load_factor, 0.9);
    assert_eq!(config.growth_factor, 2);

    env::remove_var(format!("{}MAP_INITIAL_BUCKETS", prefix));
    env::remove_var(format!("{}MAP_MAX_LOAD_FACTOR", prefix));
    env::remove_var(format!("{}MAP_GROWTH_FACTOR", prefix));
}

#[test]
fn test_from_env_rejects_invalid_result() {
    let prefix = "RAWCOLL_CFG_TEST_B_";
    env::set_var(format!("{}MAP_INITIAL_BUCKETS", prefix), "0");
    assert!(BucketMapConfig::from_env_with_prefix(prefix).is_err());
    env::remove_var(format!("{}MAP_INITIAL_BUCKETS", prefix));
}

#[test]
fn test_parse_env_var_fallback() {
    assert_eq!(parse_env_var("RAWCOLL_CFG_TEST_UNSET_VAR", 7usize), 7);
}
