//! Settings layering: file, then env, then flags.
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use batedor::cli::ParsedArgs;
use batedor::config::Settings;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn defaults_match_the_dashboard() {
    let s = Settings::default();
    assert_eq!(s.web_port, 9090);
    assert!(!s.web);
    assert_eq!(s.web_root, PathBuf::from("frontend"));
    let c = s.cadence();
    assert_eq!(c.fast, Duration::from_secs(1));
    assert_eq!(c.slow, Duration::from_secs(60));
    assert_eq!(c.probe, Duration::from_secs(30));
    let t = s.probe_targets();
    assert_eq!(t.latency_addr, "8.8.8.8:53");
    assert_eq!(t.ip_host, "api.ipify.org");
    assert_eq!(t.ip_port, 80);
}

#[test]
fn missing_file_is_not_an_error() {
    let td = tempfile::tempdir().unwrap();
    assert!(Settings::load_file(&td.path().join("nope.json"))
        .unwrap()
        .is_none());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("config.json");
    fs::write(&path, r#"{ "web_port": 8088, "tick_ms": 500 }"#).unwrap();
    let s = Settings::load_file(&path).unwrap().unwrap();
    assert_eq!(s.web_port, 8088);
    assert_eq!(s.tick_ms, 500);
    assert_eq!(s.persist_secs, 60);
}

#[test]
fn malformed_file_is_reported() {
    let td = tempfile::tempdir().unwrap();
    let path = td.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(Settings::load_file(&path).is_err());
}

#[test]
fn env_overrides_file_and_flags_override_env() {
    let mut s = Settings {
        web_port: 8088,
        ..Settings::default()
    };
    s.apply_env(env(&[
        ("BATEDOR_PORT", "7000"),
        ("BATEDOR_WEB", "true"),
        ("BATEDOR_DB", "/var/lib/batedor/h.db"),
        ("BATEDOR_SERIES_CAPACITY", "240"),
    ]))
    .unwrap();
    assert_eq!(s.web_port, 7000);
    assert!(s.web);
    assert_eq!(s.series_capacity, 240);

    s.apply_args(&ParsedArgs {
        port: Some(6000),
        db: Some(PathBuf::from("/tmp/other.db")),
        ..ParsedArgs::default()
    });
    assert_eq!(s.web_port, 6000);
    assert_eq!(s.db_path, PathBuf::from("/tmp/other.db"));
    // flags that are absent leave earlier layers alone
    assert!(s.web);
}

#[test]
fn bad_env_values_are_errors() {
    let mut s = Settings::default();
    assert!(s.apply_env(env(&[("BATEDOR_PORT", "99999")])).is_err());
    assert!(s.apply_env(env(&[("BATEDOR_WEB", "maybe")])).is_err());
}

#[test]
fn zero_periods_fail_validation() {
    let s = Settings {
        tick_ms: 0,
        ..Settings::default()
    };
    assert!(s.validate().is_err());
    assert!(Settings::default().validate().is_ok());
}

#[test]
fn explicit_config_path_must_exist() {
    let td = tempfile::tempdir().unwrap();
    let args = ParsedArgs {
        config: Some(td.path().join("absent.json")),
        ..ParsedArgs::default()
    };
    assert!(Settings::resolve(&args).is_err());
}
