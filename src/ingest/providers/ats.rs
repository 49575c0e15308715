// src/ingest/providers/ats.rs
//! Applicant-tracking-system platforms. One adapter per platform walks a whole
//! list of company boards with its own bounded concurrency.

use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde_json::{json, Value};

use crate::ingest::http::{array_at, epoch_to_rfc3339, get_json, post_json, str_at};
use crate::ingest::providers::companies;
use crate::ingest::types::{Posting, SourceAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Greenhouse,
    Lever,
    Ashby,
    SmartRecruiters,
    Workday,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Greenhouse => "Greenhouse",
            Platform::Lever => "Lever",
            Platform::Ashby => "Ashby",
            Platform::SmartRecruiters => "SmartRecruiters",
            Platform::Workday => "Workday",
        };
        f.write_str(s)
    }
}

/// One company's board on a platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanyBoard {
    pub slug: String,
    pub company: String,
    /// Workday only: career site name and `wdN` data-centre number.
    pub site: Option<(String, u8)>,
}

impl CompanyBoard {
    pub fn new(slug: &str, company: &str) -> Self {
        Self {
            slug: slug.to_string(),
            company: company.to_string(),
            site: None,
        }
    }

    pub fn workday(tenant: &str, site: &str, wd: u8, company: &str) -> Self {
        Self {
            slug: tenant.to_string(),
            company: company.to_string(),
            site: Some((site.to_string(), wd)),
        }
    }
}

enum Request {
    Get(String),
    Post(String, Value),
}

impl Platform {
    /// Built-in company list for the platform.
    pub fn boards(self) -> Vec<CompanyBoard> {
        match self {
            Platform::Greenhouse => companies::GREENHOUSE
                .iter()
                .map(|(s, c)| CompanyBoard::new(s, c))
                .collect(),
            Platform::Lever => companies::LEVER
                .iter()
                .map(|(s, c)| CompanyBoard::new(s, c))
                .collect(),
            Platform::Ashby => companies::ASHBY
                .iter()
                .map(|(s, c)| CompanyBoard::new(s, c))
                .collect(),
            Platform::SmartRecruiters => companies::SMARTRECRUITERS
                .iter()
                .map(|(s, c)| CompanyBoard::new(s, c))
                .collect(),
            Platform::Workday => companies::WORKDAY
                .iter()
                .map(|(t, site, wd, c)| CompanyBoard::workday(t, site, *wd, c))
                .collect(),
        }
    }

    fn request(self, b: &CompanyBoard) -> Result<Request> {
        let slug = &b.slug;
        let req = match self {
            Platform::Greenhouse => {
                Request::Get(format!("https://boards-api.greenhouse.io/v1/boards/{slug}/jobs"))
            }
            Platform::Lever => Request::Get(format!("https://api.lever.co/v0/postings/{slug}?mode=json")),
            Platform::Ashby => Request::Post(
                "https://api.ashbyhq.com/posting-api/job-board".to_string(),
                json!({ "organizationHostedJobsPageName": slug }),
            ),
            Platform::SmartRecruiters => Request::Get(format!(
                "https://api.smartrecruiters.com/v1/companies/{slug}/postings\
                 ?q=data+engineer&status=PUBLISHED&limit=20"
            )),
            Platform::Workday => {
                let (site, wd) = b
                    .site
                    .as_ref()
                    .ok_or_else(|| anyhow!("workday board {slug} has no site"))?;
                Request::Post(
                    format!("https://{slug}.wd{wd}.myworkdayjobs.com/wday/cxs/{slug}/{site}/jobs"),
                    json!({
                        "appliedFacets": {}, "limit": 20, "offset": 0,
                        "searchText": "data engineer"
                    }),
                )
            }
        };
        Ok(req)
    }

    /// Map one board's payload to postings. A payload without the job list
    /// counts as a failed board.
    pub fn parse(self, b: &CompanyBoard, v: &Value) -> Result<Vec<Posting>> {
        let source = format!("{self}/{}", b.company);
        let company = b.company.as_str();

        let out = match self {
            Platform::Greenhouse => array_at(v, "/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        company,
                        str_at(j, "/location/name"),
                        str_at(j, "/absolute_url"),
                        source.clone(),
                        str_at(j, "/updated_at"),
                    )
                })
                .collect(),
            Platform::Lever => array_at(v, "")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/text"),
                        company,
                        str_at(j, "/categories/location"),
                        str_at(j, "/hostedUrl"),
                        source.clone(),
                        epoch_to_rfc3339(j.get("createdAt")),
                    )
                })
                .collect(),
            Platform::Ashby => array_at(v, "/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        company,
                        str_at(j, "/location"),
                        str_at(j, "/jobUrl"),
                        source.clone(),
                        str_at(j, "/publishedDate"),
                    )
                })
                .collect(),
            Platform::SmartRecruiters => array_at(v, "/content")?
                .iter()
                .map(|j| {
                    let loc = [str_at(j, "/location/city"), str_at(j, "/location/region")]
                        .into_iter()
                        .filter(|s| !s.is_empty())
                        .collect::<Vec<_>>()
                        .join(", ");
                    Posting::new(
                        str_at(j, "/name"),
                        company,
                        loc,
                        format!("https://careers.smartrecruiters.com/{}/{}", b.slug, str_at(j, "/id")),
                        source.clone(),
                        str_at(j, "/releasedDate"),
                    )
                })
                .collect(),
            Platform::Workday => array_at(v, "/jobPostings")?
                .iter()
                .map(|j| {
                    let wd = b.site.as_ref().map(|(_, wd)| *wd).unwrap_or(5);
                    Posting::new(
                        str_at(j, "/title"),
                        company,
                        str_at(j, "/locationsText"),
                        format!(
                            "https://{}.wd{wd}.myworkdayjobs.com{}",
                            b.slug,
                            str_at(j, "/externalPath")
                        ),
                        source.clone(),
                        str_at(j, "/postedOn"),
                    )
                })
                .collect(),
        };
        Ok(out)
    }
}

pub struct AtsGroup {
    platform: Platform,
    name: String,
    boards: Vec<CompanyBoard>,
    concurrency: usize,
    mode: Mode,
}

enum Mode {
    Http(Client),
    /// Payloads keyed by board slug; a missing slug behaves like a failed request.
    Fixture(HashMap<String, Value>),
}

impl AtsGroup {
    pub fn new(platform: Platform, boards: Vec<CompanyBoard>, concurrency: usize, client: &Client) -> Self {
        Self {
            platform,
            name: format!("{platform} ({} companies)", boards.len()),
            boards,
            concurrency: concurrency.max(1),
            mode: Mode::Http(client.clone()),
        }
    }

    pub fn from_fixtures(
        platform: Platform,
        boards: Vec<CompanyBoard>,
        payloads: HashMap<String, Value>,
    ) -> Self {
        Self {
            platform,
            name: format!("{platform} ({} companies)", boards.len()),
            boards,
            concurrency: 4,
            mode: Mode::Fixture(payloads),
        }
    }

    async fn fetch_board(&self, b: &CompanyBoard) -> Result<Vec<Posting>> {
        let v = match &self.mode {
            Mode::Fixture(map) => map
                .get(&b.slug)
                .cloned()
                .ok_or_else(|| anyhow!("no payload for {}", b.slug))?,
            Mode::Http(client) => match self.platform.request(b)? {
                Request::Get(url) => get_json(client, &url).await?,
                Request::Post(url, body) => post_json(client, &url, &body).await?,
            },
        };
        self.platform.parse(b, &v)
    }
}

#[async_trait]
impl SourceAdapter for AtsGroup {
    /// Boards fail independently; the group only fails when every board did.
    async fn fetch_latest(&self) -> Result<Vec<Posting>> {
        // indices keep the per-board future free of a borrowed closure argument
        let mut results = stream::iter(0..self.boards.len())
            .map(|i| async move { (i, self.fetch_board(&self.boards[i]).await) })
            .buffer_unordered(self.concurrency);

        let mut out = Vec::new();
        let mut failures = 0usize;
        while let Some((i, res)) = results.next().await {
            match res {
                Ok(mut v) => out.append(&mut v),
                Err(e) => {
                    failures += 1;
                    let company = &self.boards[i].company;
                    tracing::debug!(error = ?e, platform = %self.platform, %company, "board failed");
                }
            }
        }

        if failures > 0 && failures == self.boards.len() {
            return Err(anyhow!("{}: all {failures} boards failed", self.platform));
        }
        Ok(out)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workday_url_uses_tenant_and_data_centre() {
        let b = CompanyBoard::workday("nvidia", "NVIDIAExternalCareerSite", 5, "Nvidia");
        let v = json!({"jobPostings": [
            {"title": "Data Engineer", "externalPath": "/job/Santa-Clara/Data-Engineer_JR1",
             "locationsText": "US, CA, Santa Clara", "postedOn": "Posted Today"}
        ]});
        let out = Platform::Workday.parse(&b, &v).unwrap();
        assert_eq!(
            out[0].url,
            "https://nvidia.wd5.myworkdayjobs.com/job/Santa-Clara/Data-Engineer_JR1"
        );
        assert_eq!(out[0].source, "Workday/Nvidia");
    }

    #[test]
    fn lever_converts_epoch_millis() {
        let b = CompanyBoard::new("netflix", "Netflix");
        let v = json!([{"text": "Data Engineer", "hostedUrl": "https://jobs.lever.co/netflix/1",
                        "categories": {"location": "Los Gatos, CA"}, "createdAt": 1_700_000_000_000i64}]);
        let out = Platform::Lever.parse(&b, &v).unwrap();
        assert!(out[0].posted_at.starts_with("2023-11-14"));
        assert_eq!(out[0].location, "Los Gatos, CA");
    }

    #[test]
    fn every_platform_ships_boards() {
        for p in [
            Platform::Greenhouse,
            Platform::Lever,
            Platform::Ashby,
            Platform::SmartRecruiters,
            Platform::Workday,
        ] {
            assert!(!p.boards().is_empty(), "{p} has no boards");
        }
    }

    #[tokio::test]
    async fn one_failing_board_does_not_fail_the_group() {
        let boards = vec![CompanyBoard::new("ok", "Ok Inc"), CompanyBoard::new("gone", "Gone Inc")];
        let payloads = HashMap::from([(
            "ok".to_string(),
            json!({"jobs": [{"title": "Data Engineer", "absolute_url": "https://gh/ok/1"}]}),
        )]);
        let group = AtsGroup::from_fixtures(Platform::Greenhouse, boards, payloads);
        let out = group.fetch_latest().await.unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].company, "Ok Inc");
    }

    #[tokio::test]
    async fn board_with_unexpected_payload_counts_as_failed() {
        let boards = vec![CompanyBoard::new("drift", "Drift Inc")];
        let payloads = HashMap::from([("drift".to_string(), json!({"postings": []}))]);
        let group = AtsGroup::from_fixtures(Platform::Greenhouse, boards, payloads);
        assert!(group.fetch_latest().await.is_err());
    }

    #[tokio::test]
    async fn all_boards_failing_fails_the_group() {
        let boards = vec![CompanyBoard::new("gone", "Gone Inc")];
        let group = AtsGroup::from_fixtures(Platform::Ashby, boards, HashMap::new());
        assert!(group.fetch_latest().await.is_err());
    }
}
