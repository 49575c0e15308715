// tests/config.rs
use std::env;
use std::fs;

use job_monitor::config::{MonitorConfig, ENV_CONFIG_PATH};
use serial_test::serial;

const ENV_KEYS: &[&str] = &[ENV_CONFIG_PATH, "CHECK_INTERVAL", "SMTP_USER", "SMTP_PASS", "ALERT_EMAIL"];

fn clear_env() {
    for k in ENV_KEYS {
        env::remove_var(k);
    }
}

#[test]
#[serial]
fn env_config_path_then_env_overrides() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("custom.toml");
    fs::write(
        &p,
        r#"
[scan]
interval_mins = 10
freshness_hours = 48

[email]
alert_email = "alerts@example.com"
"#,
    )
    .unwrap();

    env::set_var(ENV_CONFIG_PATH, &p);
    env::set_var("CHECK_INTERVAL", "7");
    let cfg = MonitorConfig::load(None).unwrap();
    clear_env();

    // env beats file, file beats defaults
    assert_eq!(cfg.scan.interval_mins, 7);
    assert_eq!(cfg.scan.freshness_hours, 48);
    assert_eq!(cfg.email.recipient(), Some("alerts@example.com"));
    assert!(!cfg.email.is_configured());
}

#[test]
#[serial]
fn explicit_path_wins_over_env_path() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let explicit = dir.path().join("explicit.toml");
    fs::write(&explicit, "[scan]\npool_size = 8\n").unwrap();

    env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");
    let cfg = MonitorConfig::load(Some(&explicit)).unwrap();
    clear_env();
    assert_eq!(cfg.scan.pool_size, 8);
}

#[test]
#[serial]
fn malformed_toml_is_an_error() {
    clear_env();
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.toml");
    fs::write(&p, "[scan\ninterval_mins = ").unwrap();
    assert!(MonitorConfig::load(Some(&p)).is_err());
}
