// src/notify/slack.rs
use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{display_location, ItemNotifier};
use crate::ingest::types::Posting;

pub struct SlackNotifier {
    webhook_url: String,
    client: Client,
    timeout: Duration,
}

impl SlackNotifier {
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: url,
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }
}

pub(crate) fn message(p: &Posting) -> String {
    format!(
        "*New job:* <{}|{}>\n{} | {}\n_{}_",
        p.url,
        p.title,
        p.company,
        display_location(p),
        p.source
    )
}

#[async_trait::async_trait]
impl ItemNotifier for SlackNotifier {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn notify(&self, p: &Posting) -> Result<()> {
        let body = serde_json::json!({ "text": message(p) });

        self.client
            .post(&self.webhook_url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_links_title_and_falls_back_on_location() {
        let p = Posting::new("Data Engineer", "Acme", "", "https://x/1", "Remotive", "");
        let m = message(&p);
        assert!(m.contains("<https://x/1|Data Engineer>"));
        assert!(m.contains("Acme | See posting"));
        assert!(m.ends_with("_Remotive_"));
    }
}
