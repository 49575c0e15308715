// src/config/mod.rs
//! Process configuration. Built once at startup (defaults, then an optional
//! TOML file, then environment overrides) and passed down explicitly.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_CONFIG_PATH: &str = "JOB_MONITOR_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/job_monitor.toml";

/// Upper bounds applied after loading; larger values are clamped with a warning.
pub const MAX_INTERVAL_MINS: u64 = 7 * 24 * 60;
pub const MAX_POOL_SIZE: usize = 256;
pub const MAX_HTTP_TIMEOUT_SECS: u64 = 600;
pub const MAX_FRESHNESS_HOURS: i64 = 365 * 24;

pub const DEFAULT_KEYWORDS: &[&str] = &[
    "data engineer",
    "data engineering",
    "analytics engineer",
    "dataops engineer",
    "etl engineer",
    "pipeline engineer",
    "data platform engineer",
    "data infrastructure engineer",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub scan: ScanConfig,
    pub filters: FilterConfig,
    pub email: EmailConfig,
    pub webhooks: WebhookConfig,
    pub desktop: DesktopConfig,
    pub keys: ApiKeys,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Minutes between scans in forever mode.
    pub interval_mins: u64,
    /// Adapters fetched in parallel.
    pub pool_size: usize,
    /// Company boards fetched in parallel inside one ATS platform adapter.
    pub group_pool_size: usize,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    /// Postings older than this are not notified.
    pub freshness_hours: i64,
    pub seen_file: PathBuf,
    /// Record stale/blocked postings as seen, so they are never reconsidered.
    pub mark_filtered_seen: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_mins: 2,
            pool_size: 30,
            group_pool_size: 20,
            http_timeout_secs: 12,
            user_agent: "Mozilla/5.0 JobMonitor/3.0".to_string(),
            freshness_hours: 24,
            seen_file: PathBuf::from("seen_jobs.json"),
            mark_filtered_seen: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub keywords: Vec<String>,
    /// Case-insensitive substrings matched against title and company.
    pub blocklist: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            blocklist: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    /// Defaults to `smtp_user` when unset.
    pub alert_email: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            smtp_user: None,
            smtp_pass: None,
            alert_email: None,
        }
    }
}

impl EmailConfig {
    pub fn recipient(&self) -> Option<&str> {
        self.alert_email.as_deref().or(self.smtp_user.as_deref())
    }

    pub fn is_configured(&self) -> bool {
        self.smtp_user.is_some() && self.smtp_pass.is_some() && self.recipient().is_some()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WebhookConfig {
    pub slack_url: Option<String>,
    pub discord_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    pub enabled: bool,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    pub adzuna_app_id: Option<String>,
    pub adzuna_app_key: Option<String>,
}

impl MonitorConfig {
    /// Load a TOML config file; unspecified keys keep their defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg: MonitorConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Resolve the config file and apply environment overrides:
    /// 1) explicit `path` argument
    /// 2) $JOB_MONITOR_CONFIG
    /// 3) config/job_monitor.toml
    /// 4) built-in defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = if let Some(p) = path {
            Self::load_from(p)?
        } else if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from(Path::new(DEFAULT_CONFIG_PATH))?
        } else {
            Self::default()
        };
        Ok(base.with_env(|k| std::env::var(k).ok()))
    }

    /// Overlay environment variables read through `var`.
    pub fn with_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |k: &str| var(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("CHECK_INTERVAL") {
            match v.parse() {
                Ok(mins) => self.scan.interval_mins = mins,
                Err(_) => tracing::warn!(value = %v, "CHECK_INTERVAL is not a number, ignoring"),
            }
        }
        if let Some(v) = get("SEEN_FILE") {
            self.scan.seen_file = PathBuf::from(v);
        }
        if let Some(v) = get("SMTP_HOST") {
            self.email.smtp_host = v;
        }
        if let Some(v) = get("SMTP_PORT") {
            match v.parse() {
                Ok(port) => self.email.smtp_port = port,
                Err(_) => tracing::warn!(value = %v, "SMTP_PORT is not a port, ignoring"),
            }
        }
        if let Some(v) = get("SMTP_USER") {
            self.email.smtp_user = Some(v);
        }
        if let Some(v) = get("SMTP_PASS") {
            self.email.smtp_pass = Some(v);
        }
        if let Some(v) = get("ALERT_EMAIL") {
            self.email.alert_email = Some(v);
        }
        if let Some(v) = get("SLACK_WEBHOOK_URL") {
            self.webhooks.slack_url = Some(v);
        }
        if let Some(v) = get("DISCORD_WEBHOOK_URL") {
            self.webhooks.discord_url = Some(v);
        }
        if let Some(v) = get("DESKTOP_NOTIFY") {
            self.desktop.enabled = !matches!(v.as_str(), "0" | "false" | "off");
        }
        if let Some(v) = get("ADZUNA_APP_ID") {
            self.keys.adzuna_app_id = Some(v);
        }
        if let Some(v) = get("ADZUNA_APP_KEY") {
            self.keys.adzuna_app_key = Some(v);
        }
        self.sanitized()
    }

    fn sanitized(mut self) -> Self {
        let scan = &mut self.scan;
        scan.interval_mins = bounded("interval_mins", scan.interval_mins, 1, MAX_INTERVAL_MINS);
        scan.pool_size = bounded("pool_size", scan.pool_size, 1, MAX_POOL_SIZE);
        scan.group_pool_size = bounded("group_pool_size", scan.group_pool_size, 1, MAX_POOL_SIZE);
        scan.http_timeout_secs =
            bounded("http_timeout_secs", scan.http_timeout_secs, 1, MAX_HTTP_TIMEOUT_SECS);
        scan.freshness_hours =
            bounded("freshness_hours", scan.freshness_hours, 1, MAX_FRESHNESS_HOURS);
        self.filters.keywords = clean_list(std::mem::take(&mut self.filters.keywords));
        self.filters.blocklist = clean_list(std::mem::take(&mut self.filters.blocklist));
        for opt in [
            &mut self.email.smtp_user,
            &mut self.email.smtp_pass,
            &mut self.email.alert_email,
            &mut self.webhooks.slack_url,
            &mut self.webhooks.discord_url,
            &mut self.keys.adzuna_app_id,
            &mut self.keys.adzuna_app_key,
        ] {
            if opt.as_deref().is_some_and(|s| s.trim().is_empty()) {
                *opt = None;
            }
        }
        self
    }
}

/// Clamp into `[lo, hi]`; only the upper clamp is worth a warning.
fn bounded<T>(key: &str, v: T, lo: T, hi: T) -> T
where
    T: Ord + Copy + std::fmt::Display,
{
    if v > hi {
        tracing::warn!(key, value = %v, max = %hi, "config value too large, clamping");
    }
    v.clamp(lo, hi)
}

/// Lowercase, trim, drop empties and duplicates.
fn clean_list(items: Vec<String>) -> Vec<String> {
    let mut set = BTreeSet::new();
    for it in items {
        let t = it.trim().to_lowercase();
        if !t.is_empty() {
            set.insert(t);
        }
    }
    set.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::env;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_match_documented_values() {
        let cfg = MonitorConfig::default();
        assert_eq!(cfg.scan.interval_mins, 2);
        assert_eq!(cfg.scan.http_timeout_secs, 12);
        assert_eq!(cfg.scan.freshness_hours, 24);
        assert!(cfg.scan.mark_filtered_seen);
        assert_eq!(cfg.email.smtp_port, 587);
        assert_eq!(cfg.filters.keywords.len(), DEFAULT_KEYWORDS.len());
        assert!(!cfg.email.is_configured());
    }

    #[test]
    fn env_overrides_and_recipient_fallback() {
        let cfg = MonitorConfig::default().with_env(env_of(&[
            ("CHECK_INTERVAL", "5"),
            ("SMTP_USER", "me@example.com"),
            ("SMTP_PASS", "secret"),
            ("ADZUNA_APP_ID", "  "),
            ("DESKTOP_NOTIFY", "0"),
        ]));
        assert_eq!(cfg.scan.interval_mins, 5);
        assert_eq!(cfg.email.recipient(), Some("me@example.com"));
        assert!(cfg.email.is_configured());
        assert!(cfg.keys.adzuna_app_id.is_none());
        assert!(!cfg.desktop.enabled);
    }

    #[test]
    fn bad_numbers_are_ignored() {
        let cfg = MonitorConfig::default().with_env(env_of(&[
            ("CHECK_INTERVAL", "soon"),
            ("SMTP_PORT", "99999"),
        ]));
        assert_eq!(cfg.scan.interval_mins, 2);
        assert_eq!(cfg.email.smtp_port, 587);
    }

    #[test]
    fn toml_file_is_partial_and_cleaned() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("job_monitor.toml");
        fs::write(
            &p,
            r#"
[scan]
pool_size = 0
mark_filtered_seen = false

[filters]
keywords = [" Data Engineer ", "", "data engineer", "ML Engineer"]
blocklist = ["Staffing"]
"#,
        )
        .unwrap();
        let cfg = MonitorConfig::load_from(&p).unwrap();
        assert_eq!(cfg.scan.pool_size, 1);
        assert!(!cfg.scan.mark_filtered_seen);
        assert_eq!(cfg.scan.interval_mins, 2);
        assert_eq!(cfg.filters.keywords, vec!["data engineer", "ml engineer"]);
        assert_eq!(cfg.filters.blocklist, vec!["staffing"]);
    }

    #[test]
    fn oversized_values_are_clamped() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("job_monitor.toml");
        fs::write(
            &p,
            "[scan]\nfreshness_hours = 9000000000000000\npool_size = 100000\nhttp_timeout_secs = 0\n",
        )
        .unwrap();
        let cfg = MonitorConfig::load_from(&p).unwrap();
        assert_eq!(cfg.scan.freshness_hours, MAX_FRESHNESS_HOURS);
        assert_eq!(cfg.scan.pool_size, MAX_POOL_SIZE);
        assert_eq!(cfg.scan.http_timeout_secs, 1);

        let cfg = MonitorConfig::default().with_env(env_of(&[("CHECK_INTERVAL", "18446744073709551615")]));
        assert_eq!(cfg.scan.interval_mins, MAX_INTERVAL_MINS);
        assert_eq!(MonitorConfig::default().with_env(env_of(&[("CHECK_INTERVAL", "0")])).scan.interval_mins, 1);
    }

    #[serial_test::serial]
    #[test]
    fn missing_env_config_path_is_an_error() {
        env::set_var(ENV_CONFIG_PATH, "/definitely/not/here.toml");
        let res = MonitorConfig::load(None);
        env::remove_var(ENV_CONFIG_PATH);
        assert!(res.is_err());
    }
}
