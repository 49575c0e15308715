// src/notify/mod.rs
//! Notification transports and the dispatcher that fans postings out to them.
//!
//! Two kinds of transport:
//! - per-item ([`ItemNotifier`]): one call per newly accepted posting,
//! - digest ([`DigestNotifier`]): one call per scan with every new posting.
//!
//! Every transport is best-effort. Errors are logged and counted, never
//! returned to the scan, and never retried.

pub mod desktop;
pub mod discord;
pub mod email;
pub mod slack;

use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;

use crate::config::MonitorConfig;
use crate::ingest::types::Posting;

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "notify_errors_total",
            "Notification transport failures, by transport."
        );
        describe_counter!("notify_sent_total", "Notifications delivered, by transport.");
    });
}

#[async_trait::async_trait]
pub trait ItemNotifier: Send + Sync {
    fn name(&self) -> &'static str;
    async fn notify(&self, posting: &Posting) -> Result<()>;
}

#[async_trait::async_trait]
pub trait DigestNotifier: Send + Sync {
    fn name(&self) -> &'static str;
    /// `postings` is never empty.
    async fn send_digest(&self, postings: &[Posting]) -> Result<()>;
}

/// What happened to the scan's digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestStatus {
    /// Nothing new; the transport was not invoked.
    #[default]
    Empty,
    /// No digest transport configured.
    Skipped,
    Sent,
    Failed,
}

#[derive(Default)]
pub struct Dispatcher {
    items: Vec<Box<dyn ItemNotifier>>,
    digest: Option<Box<dyn DigestNotifier>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, n: impl ItemNotifier + 'static) -> Self {
        self.items.push(Box::new(n));
        self
    }

    pub fn with_digest(mut self, n: impl DigestNotifier + 'static) -> Self {
        self.digest = Some(Box::new(n));
        self
    }

    /// Wire every transport the configuration enables.
    pub fn from_config(cfg: &MonitorConfig) -> Self {
        let mut d = Self::new();
        if cfg.desktop.enabled {
            d = d.with_item(desktop::DesktopNotifier::new());
        }
        if let Some(url) = &cfg.webhooks.slack_url {
            d = d.with_item(
                slack::SlackNotifier::new(url.clone()).with_timeout(cfg.scan.http_timeout_secs),
            );
        }
        if let Some(url) = &cfg.webhooks.discord_url {
            d = d.with_item(
                discord::DiscordNotifier::new(url.clone()).with_timeout(cfg.scan.http_timeout_secs),
            );
        }
        match email::EmailDigest::from_config(&cfg.email) {
            Ok(Some(mailer)) => d = d.with_digest(mailer),
            Ok(None) => {}
            Err(e) => tracing::warn!(error = ?e, "email transport misconfigured, digest disabled"),
        }
        d
    }

    pub fn item_transports(&self) -> Vec<&'static str> {
        self.items.iter().map(|n| n.name()).collect()
    }

    pub fn has_digest(&self) -> bool {
        self.digest.is_some()
    }

    /// Fire every per-item transport for one posting.
    pub async fn notify_item(&self, posting: &Posting) {
        ensure_metrics_described();
        for n in &self.items {
            match n.notify(posting).await {
                Ok(()) => counter!("notify_sent_total", "transport" => n.name()).increment(1),
                Err(e) => {
                    counter!("notify_errors_total", "transport" => n.name()).increment(1);
                    tracing::warn!(transport = n.name(), url = %posting.url, error = ?e, "item notification failed");
                }
            }
        }
    }

    /// Send the digest once, only when `postings` is non-empty.
    pub async fn notify_batch(&self, postings: &[Posting]) -> DigestStatus {
        ensure_metrics_described();
        if postings.is_empty() {
            return DigestStatus::Empty;
        }
        let Some(digest) = &self.digest else {
            tracing::warn!(
                new = postings.len(),
                "email not configured (set SMTP_USER and SMTP_PASS), skipping digest"
            );
            return DigestStatus::Skipped;
        };
        match digest.send_digest(postings).await {
            Ok(()) => {
                counter!("notify_sent_total", "transport" => digest.name()).increment(1);
                tracing::info!(transport = digest.name(), new = postings.len(), "digest sent");
                DigestStatus::Sent
            }
            Err(e) => {
                counter!("notify_errors_total", "transport" => digest.name()).increment(1);
                tracing::error!(transport = digest.name(), error = ?e, "digest failed");
                DigestStatus::Failed
            }
        }
    }
}

/// "N New Data Engineer Job(s)"
pub(crate) fn headline(n: usize) -> String {
    format!("{n} New Data Engineer Job{}", if n == 1 { "" } else { "s" })
}

/// Location as shown to humans.
pub(crate) fn display_location(p: &Posting) -> &str {
    if p.location.is_empty() {
        "See posting"
    } else {
        &p.location
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl ItemNotifier for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
        async fn notify(&self, _p: &Posting) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(anyhow!("boom"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl DigestNotifier for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }
        async fn send_digest(&self, _p: &[Posting]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(anyhow!("smtp down"))
            } else {
                Ok(())
            }
        }
    }

    fn posting() -> Posting {
        Posting::new("Data Engineer", "Acme", "", "https://x/1", "X", "")
    }

    #[tokio::test]
    async fn failing_item_transport_does_not_stop_the_others() {
        let a = Arc::new(AtomicUsize::new(0));
        let b = Arc::new(AtomicUsize::new(0));
        let d = Dispatcher::new()
            .with_item(Counting { calls: a.clone(), fail: true })
            .with_item(Counting { calls: b.clone(), fail: false });
        d.notify_item(&posting()).await;
        assert_eq!(a.load(Ordering::SeqCst), 1);
        assert_eq!(b.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn digest_statuses() {
        let calls = Arc::new(AtomicUsize::new(0));
        let d = Dispatcher::new().with_digest(Counting { calls: calls.clone(), fail: false });
        assert_eq!(d.notify_batch(&[]).await, DigestStatus::Empty);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(d.notify_batch(&[posting()]).await, DigestStatus::Sent);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let failing = Dispatcher::new().with_digest(Counting { calls, fail: true });
        assert_eq!(failing.notify_batch(&[posting()]).await, DigestStatus::Failed);

        assert_eq!(Dispatcher::new().notify_batch(&[posting()]).await, DigestStatus::Skipped);
    }

    #[test]
    fn headline_pluralises() {
        assert_eq!(headline(1), "1 New Data Engineer Job");
        assert_eq!(headline(3), "3 New Data Engineer Jobs");
    }

    #[test]
    fn from_config_respects_toggles() {
        let mut cfg = MonitorConfig::default();
        cfg.desktop.enabled = false;
        cfg.webhooks.slack_url = Some("https://hooks.slack.test/x".into());
        let d = Dispatcher::from_config(&cfg);
        assert_eq!(d.item_transports(), vec!["slack"]);
        assert!(!d.has_digest());
    }
}
