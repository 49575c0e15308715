// src/ingest/providers/rss.rs
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use metrics::histogram;
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use time::{format_description::well_known::Rfc2822, format_description::well_known::Rfc3339};
use time::{OffsetDateTime, UtcOffset};

use crate::ingest::http::get_text;
use crate::ingest::types::{Posting, SourceAdapter};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}
#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}
#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
    author: Option<String>,
    location: Option<String>,
}

/// RFC 2822 `pubDate` to RFC 3339; anything unparseable is passed through untouched.
fn normalize_pub_date(ts: &str) -> String {
    OffsetDateTime::parse(ts.trim(), &Rfc2822)
        .ok()
        .map(|dt| dt.to_offset(UtcOffset::UTC))
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.trim().to_string())
}

/// How a feed packs the company into its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleStyle {
    /// Company comes from `<author>` (or a fixed name).
    Plain,
    /// Title reads "Company: Job Title".
    CompanyPrefixed,
}

pub struct RssFeed {
    source: String,
    style: TitleStyle,
    company: Option<String>,
    location: Option<String>,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { urls: Vec<String>, client: Client },
}

impl RssFeed {
    pub fn from_urls(source: impl Into<String>, urls: Vec<String>, client: Client) -> Self {
        Self {
            source: source.into(),
            style: TitleStyle::Plain,
            company: None,
            location: None,
            mode: Mode::Http { urls, client },
        }
    }

    /// Parses an in-memory feed instead of fetching one.
    pub fn from_fixture_str(source: impl Into<String>, xml: &str) -> Self {
        Self {
            source: source.into(),
            style: TitleStyle::Plain,
            company: None,
            location: None,
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    pub fn with_style(mut self, style: TitleStyle) -> Self {
        self.style = style;
        self
    }

    /// Fixed company name for single-employer feeds.
    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company = Some(company.into());
        self
    }

    /// Fixed location for feeds whose entries carry none.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<Posting>> {
        let t0 = std::time::Instant::now();
        let xml_clean = scrub_html_entities_for_xml(s);
        let rss: Rss = from_str(&xml_clean)
            .with_context(|| format!("parsing {} rss xml", self.source))?;

        let mut out = Vec::with_capacity(rss.channel.item.len());
        for it in rss.channel.item {
            let raw_title = it.title.unwrap_or_default();
            let (company, title) = match self.style {
                TitleStyle::CompanyPrefixed => match raw_title.split_once(':') {
                    Some((c, t)) => (c.to_string(), t.to_string()),
                    None => ("Unknown".to_string(), raw_title),
                },
                TitleStyle::Plain => (
                    self.company
                        .clone()
                        .or(it.author)
                        .unwrap_or_else(|| "Unknown".to_string()),
                    raw_title,
                ),
            };
            let location = self
                .location
                .clone()
                .or(it.location)
                .unwrap_or_default();

            out.push(Posting::new(
                title,
                company,
                location,
                it.link.unwrap_or_default(),
                self.source.clone(),
                it.pub_date.as_deref().map(normalize_pub_date).unwrap_or_default(),
            ));
        }

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("source_parse_ms").record(ms);
        Ok(out)
    }
}

#[async_trait]
impl SourceAdapter for RssFeed {
    async fn fetch_latest(&self) -> Result<Vec<Posting>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { urls, client } => {
                let mut out = Vec::new();
                let mut last_err = None;
                let mut any_ok = false;
                for url in urls {
                    let parsed = match get_text(client, url).await {
                        Ok(body) => self.parse_items_from_str(&body),
                        Err(e) => Err(e),
                    };
                    match parsed {
                        Ok(mut v) => {
                            any_ok = true;
                            out.append(&mut v);
                        }
                        Err(e) => {
                            tracing::debug!(error = ?e, source = %self.source, %url, "feed query failed");
                            last_err = Some(e);
                        }
                    }
                }
                match (any_ok, last_err) {
                    (false, Some(e)) => Err(e),
                    (false, None) => Err(anyhow!("{}: no feed urls configured", self.source)),
                    _ => Ok(out),
                }
            }
        }
    }

    fn name(&self) -> &str {
        &self.source
    }
}

fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

/// Every public job feed the monitor polls, keyed by registry name.
pub fn catalog(client: &Client) -> Vec<(&'static str, RssFeed)> {
    fn urls(v: &[&str]) -> Vec<String> {
        v.iter().map(|u| u.to_string()).collect()
    }
    vec![
        (
            "Indeed RSS",
            RssFeed::from_urls(
                "Indeed",
                ["data+engineer", "analytics+engineer", "etl+engineer"]
                    .iter()
                    .map(|q| format!("https://www.indeed.com/rss?q={q}&sort=date&limit=50"))
                    .collect(),
                client.clone(),
            ),
        ),
        (
            "ZipRecruiter RSS",
            RssFeed::from_urls(
                "ZipRecruiter",
                urls(&["https://www.ziprecruiter.com/candidate/suggested-jobs/feed/rss?search=data+engineer&sort=date"]),
                client.clone(),
            ),
        ),
        (
            "Dice RSS",
            RssFeed::from_urls(
                "Dice",
                urls(&["https://www.dice.com/jobs/q-data_engineer-jobs-rss"]),
                client.clone(),
            ),
        ),
        (
            "SimplyHired RSS",
            RssFeed::from_urls(
                "SimplyHired",
                urls(&["https://www.simplyhired.com/search?q=data+engineer&l=&sort=date&rss=1"]),
                client.clone(),
            ),
        ),
        (
            "WeWorkRemotely RSS",
            RssFeed::from_urls(
                "WeWorkRemotely",
                ["remote-devops-sysadmin-jobs", "remote-back-end-programming-jobs"]
                    .iter()
                    .map(|c| format!("https://weworkremotely.com/categories/{c}.rss"))
                    .collect(),
                client.clone(),
            )
            .with_style(TitleStyle::CompanyPrefixed)
            .with_location("Remote"),
        ),
        (
            "CareerBuilder RSS",
            RssFeed::from_urls(
                "CareerBuilder",
                urls(&["https://www.careerbuilder.com/jobs?keywords=data+engineer&posted=1&rss=1"]),
                client.clone(),
            ),
        ),
        (
            "Amazon Jobs",
            RssFeed::from_urls(
                "Amazon Jobs",
                ["data+engineer", "data+engineering", "analytics+engineer"]
                    .iter()
                    .map(|q| format!("https://www.amazon.jobs/en/search.rss?base_query={q}&sort=recent"))
                    .collect(),
                client.clone(),
            )
            .with_company("Amazon"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel><title>Jobs</title>
<item><title>Acme Corp: Senior Data Engineer</title><link>https://wwr.example/1</link>
<pubDate>Sat, 06 Sep 2025 09:00:00 +0000</pubDate></item>
<item><title>No colon here</title><link>https://wwr.example/2</link></item>
</channel></rss>"#;

    #[test]
    fn pub_date_is_normalized_to_rfc3339() {
        assert_eq!(
            normalize_pub_date("Sat, 06 Sep 2025 09:00:00 +0000"),
            "2025-09-06T09:00:00Z"
        );
        assert_eq!(normalize_pub_date("yesterday"), "yesterday");
    }

    #[tokio::test]
    async fn company_prefixed_titles_are_split() {
        let feed = RssFeed::from_fixture_str("WeWorkRemotely", FEED)
            .with_style(TitleStyle::CompanyPrefixed)
            .with_location("Remote");
        let items = feed.fetch_latest().await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].company, "Acme Corp");
        assert_eq!(items[0].title, "Senior Data Engineer");
        assert_eq!(items[0].location, "Remote");
        assert_eq!(items[1].company, "Unknown");
        assert_eq!(items[1].posted_at, "");
    }

    #[tokio::test]
    async fn empty_channel_yields_nothing() {
        let feed = RssFeed::from_fixture_str("Dice", "<rss><channel><title>x</title></channel></rss>");
        assert!(feed.fetch_latest().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_xml_is_an_error() {
        let feed = RssFeed::from_fixture_str("Dice", "<rss><channel>");
        assert!(feed.fetch_latest().await.is_err());
    }
}
