// src/ingest/providers/careers.rs
//! Sources without a stable JSON list: Meta's careers GraphQL endpoint (with a
//! page scrape when it answers empty) and LinkedIn's guest search fragment.

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use reqwest::Client;
use serde_json::{json, Value};

use crate::ingest::http::{get_text, post_json, str_at};
use crate::ingest::types::{GeoPolicy, Posting, SourceAdapter};

const META_GRAPHQL_URL: &str = "https://www.metacareers.com/graphql";
const META_PAGE_URL: &str = "https://www.metacareers.com/jobs?q=data%20engineer&sort_by_new=true";
const LINKEDIN_URL: &str = "https://www.linkedin.com/jobs-guest/jobs/api/seeMoreJobPostings/search\
     ?keywords=data+engineer&location=United+States&f_TPR=r86400&start=0";

enum Mode {
    Http(Client),
    /// Canned responses; `None` behaves like a failed request.
    Fixture {
        primary: Option<String>,
        fallback: Option<String>,
    },
}

pub struct MetaCareers {
    mode: Mode,
}

impl MetaCareers {
    pub fn new(client: &Client) -> Self {
        Self {
            mode: Mode::Http(client.clone()),
        }
    }

    /// `graphql` is the JSON body, `page` the HTML search page.
    pub fn from_fixtures(graphql: Option<&str>, page: Option<&str>) -> Self {
        Self {
            mode: Mode::Fixture {
                primary: graphql.map(str::to_string),
                fallback: page.map(str::to_string),
            },
        }
    }

    fn query() -> Value {
        json!({
            "operationName": "SearchJobsQuery",
            "variables": {"search_input": {
                "q": "data engineer", "sort_by": "NEWEST_FIRST", "page": 1
            }},
            "query": "query SearchJobsQuery($search_input: SearchInput!) { \
                      job_search(search_input: $search_input) { \
                      jobs { id title locations { name } url } } }"
        })
    }

    async fn graphql(&self) -> Result<Value> {
        match &self.mode {
            Mode::Http(client) => post_json(client, META_GRAPHQL_URL, &Self::query()).await,
            Mode::Fixture { primary, .. } => match primary {
                Some(body) => Ok(serde_json::from_str(body)?),
                None => anyhow::bail!("meta graphql unavailable"),
            },
        }
    }

    async fn page(&self) -> Result<String> {
        match &self.mode {
            Mode::Http(client) => get_text(client, META_PAGE_URL).await,
            Mode::Fixture { fallback, .. } => fallback
                .clone()
                .ok_or_else(|| anyhow::anyhow!("meta jobs page unavailable")),
        }
    }
}

fn parse_meta_graphql(v: &Value) -> Vec<Posting> {
    v.pointer("/data/job_search/jobs")
        .and_then(|x| x.as_array())
        .map(|jobs| {
            jobs.iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        "Meta",
                        str_at(j, "/locations/0/name"),
                        str_at(j, "/url"),
                        "Meta Careers",
                        "",
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

fn parse_meta_page(html: &str) -> Vec<Posting> {
    static RE_JOB: Lazy<Regex> =
        Lazy::new(|| Regex::new(r#""title":"([^"]+)","id":"(\d+)""#).unwrap());
    RE_JOB
        .captures_iter(html)
        .map(|c| {
            Posting::new(
                &c[1],
                "Meta",
                "",
                format!("https://www.metacareers.com/jobs/{}/", &c[2]),
                "Meta Careers",
                "",
            )
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for MetaCareers {
    /// The page scrape runs only when GraphQL fails or comes back empty; the
    /// adapter fails only when neither produced a response.
    async fn fetch_latest(&self) -> Result<Vec<Posting>> {
        let primary = match self.graphql().await {
            Ok(v) => {
                let out = parse_meta_graphql(&v);
                if !out.is_empty() {
                    return Ok(out);
                }
                None
            }
            Err(e) => {
                tracing::debug!(error = ?e, "meta graphql failed, trying the jobs page");
                Some(e)
            }
        };
        match (self.page().await, primary) {
            (Ok(html), _) => Ok(parse_meta_page(&html)),
            (Err(_), None) => Ok(Vec::new()),
            (Err(e), Some(first)) => Err(e.context(format!("graphql also failed: {first:#}"))),
        }
    }

    fn name(&self) -> &str {
        "Meta Careers"
    }
}

/// LinkedIn guest search, pinned to the United States by the query itself.
pub struct LinkedInSearch {
    mode: Mode,
}

impl LinkedInSearch {
    pub fn new(client: &Client) -> Self {
        Self {
            mode: Mode::Http(client.clone()),
        }
    }

    pub fn from_fixture(html: &str) -> Self {
        Self {
            mode: Mode::Fixture {
                primary: Some(html.to_string()),
                fallback: None,
            },
        }
    }
}

fn first_group(c: Captures<'_>) -> &str {
    c.get(1).map_or("", |m| m.as_str())
}

/// Ids, titles and companies are scraped independently and zipped by position,
/// the way the cards list them.
fn parse_linkedin(html: &str) -> Vec<Posting> {
    static RE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r#"data-job-id="(\d+)""#).unwrap());
    static RE_TITLE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"aria-label="([^"]+)""#).unwrap());
    static RE_COMPANY: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r#"class="base-search-card__subtitle[^"]*"[^>]*>\s*([^<]+?)\s*<"#).unwrap()
    });

    let titles: Vec<&str> = RE_TITLE.captures_iter(html).map(first_group).collect();
    let companies: Vec<&str> = RE_COMPANY.captures_iter(html).map(first_group).collect();

    RE_ID
        .captures_iter(html)
        .enumerate()
        .map(|(i, c)| {
            Posting::new(
                titles.get(i).copied().unwrap_or_default(),
                companies.get(i).copied().unwrap_or("Unknown"),
                "USA",
                format!("https://www.linkedin.com/jobs/view/{}/", &c[1]),
                "LinkedIn",
                "",
            )
        })
        .collect()
}

#[async_trait]
impl SourceAdapter for LinkedInSearch {
    async fn fetch_latest(&self) -> Result<Vec<Posting>> {
        let html = match &self.mode {
            Mode::Http(client) => get_text(client, LINKEDIN_URL).await?,
            Mode::Fixture { primary, .. } => primary.clone().unwrap_or_default(),
        };
        Ok(parse_linkedin(&html))
    }

    fn name(&self) -> &str {
        "LinkedIn"
    }

    fn geo_policy(&self) -> GeoPolicy {
        GeoPolicy::AllowBlank
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINKEDIN_CARDS: &str = r##"
<li><div class="base-card" data-job-id="3901">
  <a class="base-card__full-link" aria-label="Senior Data Engineer" href="#"></a>
  <h4 class="base-search-card__subtitle">
    Globex
  </h4>
</div></li>
<li><div class="base-card" data-job-id="3902">
  <a class="base-card__full-link" aria-label="Analytics Engineer &amp; BI" href="#"></a>
  <h4 class="base-search-card__subtitle extra">Initech</h4>
</div></li>
"##;

    #[tokio::test]
    async fn linkedin_cards_zip_by_position() {
        let out = LinkedInSearch::from_fixture(LINKEDIN_CARDS).fetch_latest().await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].title, "Senior Data Engineer");
        assert_eq!(out[0].url, "https://www.linkedin.com/jobs/view/3901/");
        assert_eq!(out[0].company, "Globex");
        assert_eq!(out[0].location, "USA");
        assert_eq!(out[1].title, "Analytics Engineer & BI");
        assert_eq!(out[1].company, "Initech");
        assert_eq!(LinkedInSearch::from_fixture("").geo_policy(), GeoPolicy::AllowBlank);
    }

    #[tokio::test]
    async fn meta_prefers_graphql() {
        let gql = r#"{"data": {"job_search": {"jobs": [
            {"id": "1", "title": "Data Engineer, Infra", "locations": [{"name": "Menlo Park, CA"}],
             "url": "https://www.metacareers.com/jobs/1/"}
        ]}}}"#;
        let page = r#""title":"Should Not Appear","id":"2""#;
        let out = MetaCareers::from_fixtures(Some(gql), Some(page)).fetch_latest().await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company, "Meta");
        assert_eq!(out[0].location, "Menlo Park, CA");
    }

    #[tokio::test]
    async fn meta_falls_back_to_the_jobs_page() {
        let page = r#"..{"title":"Data Engineer, Ads","id":"778899"}.."#;
        let empty = r#"{"data": {"job_search": {"jobs": []}}}"#;

        let out = MetaCareers::from_fixtures(Some(empty), Some(page)).fetch_latest().await.unwrap();
        assert_eq!(out[0].url, "https://www.metacareers.com/jobs/778899/");

        let out = MetaCareers::from_fixtures(None, Some(page)).fetch_latest().await.unwrap();
        assert_eq!(out[0].title, "Data Engineer, Ads");
    }

    #[tokio::test]
    async fn meta_fails_only_when_both_requests_fail() {
        assert!(MetaCareers::from_fixtures(None, None).fetch_latest().await.is_err());
        let empty = r#"{"data": {"job_search": {"jobs": []}}}"#;
        let out = MetaCareers::from_fixtures(Some(empty), None).fetch_latest().await.unwrap();
        assert!(out.is_empty());
    }
}
