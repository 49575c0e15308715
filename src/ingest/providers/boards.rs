// src/ingest/providers/boards.rs
//! Public JSON job APIs: aggregator boards and single-employer career sites.
//! Each source is one variant; they share fetching and differ only in URL,
//! headers and payload shape.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::config::ApiKeys;
use crate::ingest::http::{array_at, epoch_to_rfc3339, get_json_with, str_at};
use crate::ingest::types::{GeoPolicy, Posting, SourceAdapter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Board {
    Remotive,
    Arbeitnow,
    TheMuse,
    RemoteOk,
    Himalayas,
    UsaJobs,
    Adzuna,
    Wellfound,
    YcStartup,
    Google,
    Microsoft,
    Ibm,
    Oracle,
}

impl Board {
    pub const ALL: [Board; 13] = [
        Board::Remotive,
        Board::Arbeitnow,
        Board::TheMuse,
        Board::RemoteOk,
        Board::Himalayas,
        Board::UsaJobs,
        Board::Adzuna,
        Board::Wellfound,
        Board::YcStartup,
        Board::Google,
        Board::Microsoft,
        Board::Ibm,
        Board::Oracle,
    ];

    /// Value written into `Posting::source`.
    pub fn source_name(self) -> &'static str {
        match self {
            Board::Remotive => "Remotive",
            Board::Arbeitnow => "Arbeitnow",
            Board::TheMuse => "The Muse",
            Board::RemoteOk => "RemoteOK",
            Board::Himalayas => "Himalayas",
            Board::UsaJobs => "USAJobs",
            Board::Adzuna => "Adzuna",
            Board::Wellfound => "Wellfound",
            Board::YcStartup => "YC Work at a Startup",
            Board::Google => "Google Careers",
            Board::Microsoft => "Microsoft Careers",
            Board::Ibm => "IBM Careers",
            Board::Oracle => "Oracle Careers",
        }
    }

    /// Boards whose query is already pinned to the target country.
    pub fn geo_policy(self) -> GeoPolicy {
        match self {
            Board::UsaJobs | Board::Adzuna => GeoPolicy::AllowBlank,
            _ => GeoPolicy::Strict,
        }
    }

    fn headers(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Board::Oracle => &[("REST-Framework-Version", "3")],
            _ => &[],
        }
    }

    /// Request URL, or `None` when the board needs a key that is not configured.
    pub fn url(self, keys: &ApiKeys) -> Option<String> {
        let url = match self {
            Board::Remotive => {
                "https://remotive.com/api/remote-jobs?search=data+engineer&limit=100".to_string()
            }
            Board::Arbeitnow => {
                "https://www.arbeitnow.com/api/job-board-api?search=data+engineer".to_string()
            }
            Board::TheMuse => "https://www.themuse.com/api/public/jobs?category=Data+Science\
                 &level=Mid+Level&level=Senior+Level&page=1"
                .to_string(),
            Board::RemoteOk => "https://remoteok.com/api?tag=data-engineer".to_string(),
            Board::Himalayas => "https://himalayas.app/jobs/api?q=data+engineer&limit=50".to_string(),
            Board::UsaJobs => "https://data.usajobs.gov/api/search?Keyword=data+engineer\
                 &ResultsPerPage=50&SortField=DatePosted&SortDirection=Desc"
                .to_string(),
            Board::Adzuna => {
                let (id, key) = (keys.adzuna_app_id.as_deref()?, keys.adzuna_app_key.as_deref()?);
                format!(
                    "https://api.adzuna.com/v1/api/jobs/us/search/1?app_id={id}&app_key={key}\
                     &what=data+engineer&sort_by=date&results_per_page=50"
                )
            }
            Board::Wellfound => "https://wellfound.com/company_filters/search_startup_jobs_export\
                 ?job_types[]=full-time&roles[]=data-engineer&format=json"
                .to_string(),
            Board::YcStartup => {
                "https://www.workatastartup.com/jobs?q=data+engineer&jobType=fulltime&format=json"
                    .to_string()
            }
            Board::Google => {
                "https://careers.google.com/api/v3/search/?query=data+engineer&sort_by=date&num=20"
                    .to_string()
            }
            Board::Microsoft => "https://gcsservices.careers.microsoft.com/search/api/v1/search\
                 ?q=data+engineer&l=en_us&pg=1&pgSz=20&o=Recent&flt=true"
                .to_string(),
            Board::Ibm => "https://careers.ibm.com/api/apply/v2/jobs\
                 ?domain=ibm.com&search_keyword=data+engineer&limit=20&start=0"
                .to_string(),
            Board::Oracle => "https://eeho.fa.us2.oraclecloud.com/hcmRestApi/resources/latest/\
                 recruitingCEJobRequisitions?finder=findReqs;Name=data%20engineer,\
                 sortBy=POSTING_DATES_DESC&limit=20"
                .to_string(),
        };
        Some(url)
    }

    /// Map a board payload to postings. A payload without the expected list is
    /// an error, so schema drift shows up as a failed source.
    pub fn parse(self, v: &Value) -> Result<Vec<Posting>> {
        let src = self.source_name();
        let or = |s: &str, fallback: &str| {
            if s.trim().is_empty() {
                fallback.to_string()
            } else {
                s.to_string()
            }
        };

        let out = match self {
            Board::Remotive => array_at(v, "/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        str_at(j, "/company_name"),
                        or(str_at(j, "/candidate_required_location"), "Remote"),
                        str_at(j, "/url"),
                        src,
                        str_at(j, "/publication_date"),
                    )
                })
                .collect(),
            Board::Arbeitnow => array_at(v, "/data")?
                .iter()
                .map(|j| {
                    let posted = match j.get("created_at") {
                        Some(Value::String(s)) => s.clone(),
                        other => epoch_to_rfc3339(other),
                    };
                    Posting::new(
                        str_at(j, "/title"),
                        str_at(j, "/company_name"),
                        str_at(j, "/location"),
                        str_at(j, "/url"),
                        src,
                        posted,
                    )
                })
                .collect(),
            Board::TheMuse => array_at(v, "/results")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/name"),
                        str_at(j, "/company/name"),
                        str_at(j, "/locations/0/name"),
                        str_at(j, "/refs/landing_page"),
                        src,
                        str_at(j, "/publication_date"),
                    )
                })
                .collect(),
            // First element of the RemoteOK array is a legal notice, not a job.
            Board::RemoteOk => array_at(v, "")?
                .iter()
                .filter(|j| j.get("position").is_some())
                .map(|j| {
                    let url = match str_at(j, "/url") {
                        "" => format!("https://remoteok.com/jobs/{}", id_of(j)),
                        u => u.to_string(),
                    };
                    Posting::new(
                        str_at(j, "/position"),
                        str_at(j, "/company"),
                        or(str_at(j, "/location"), "Remote"),
                        url,
                        src,
                        epoch_to_rfc3339(j.get("epoch")),
                    )
                })
                .collect(),
            Board::Himalayas => array_at(v, "/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        str_at(j, "/company/name"),
                        or(str_at(j, "/locationRestrictions/0"), "Remote"),
                        format!("https://himalayas.app/jobs/{}", str_at(j, "/slug")),
                        src,
                        str_at(j, "/createdAt"),
                    )
                })
                .collect(),
            Board::UsaJobs => array_at(v, "/SearchResult/SearchResultItems")?
                .iter()
                .map(|item| {
                    let d = item.get("MatchedObjectDescriptor").unwrap_or(&Value::Null);
                    Posting::new(
                        str_at(d, "/PositionTitle"),
                        or(str_at(d, "/OrganizationName"), "US Gov"),
                        str_at(d, "/PositionLocationDisplay"),
                        str_at(d, "/PositionURI"),
                        src,
                        str_at(d, "/PublicationStartDate"),
                    )
                })
                .collect(),
            Board::Adzuna => array_at(v, "/results")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        str_at(j, "/company/display_name"),
                        str_at(j, "/location/display_name"),
                        str_at(j, "/redirect_url"),
                        src,
                        str_at(j, "/created"),
                    )
                })
                .collect(),
            Board::Wellfound => array_at(v, "/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        str_at(j, "/startup/name"),
                        str_at(j, "/location"),
                        str_at(j, "/url"),
                        src,
                        str_at(j, "/created_at"),
                    )
                })
                .collect(),
            Board::YcStartup => array_at(v, "/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        str_at(j, "/company_name"),
                        str_at(j, "/locations/0"),
                        format!("https://www.workatastartup.com/jobs/{}", id_of(j)),
                        src,
                        str_at(j, "/created_at"),
                    )
                })
                .collect(),
            Board::Google => array_at(v, "/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        "Google",
                        str_at(j, "/locations/0/city"),
                        format!("https://careers.google.com/jobs/results/{}", id_of(j)),
                        src,
                        str_at(j, "/publish_date"),
                    )
                })
                .collect(),
            Board::Microsoft => array_at(v, "/operationResult/result/jobs")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        "Microsoft",
                        str_at(j, "/properties/primaryWorkLocation"),
                        format!(
                            "https://careers.microsoft.com/v2/global/en/job/{}",
                            str_at(j, "/jobId")
                        ),
                        src,
                        str_at(j, "/postingDate"),
                    )
                })
                .collect(),
            Board::Ibm => array_at(v, "/positions")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/title"),
                        "IBM",
                        str_at(j, "/primary_display_location"),
                        format!("https://careers.ibm.com/job/{}", id_of(j)),
                        src,
                        str_at(j, "/t_create"),
                    )
                })
                .collect(),
            Board::Oracle => array_at(v, "/items")?
                .iter()
                .map(|j| {
                    Posting::new(
                        str_at(j, "/Title"),
                        "Oracle",
                        str_at(j, "/PrimaryLocation"),
                        format!(
                            "https://careers.oracle.com/jobs/#en/sites/jobsearch/job/{}",
                            str_at(j, "/Id")
                        ),
                        src,
                        str_at(j, "/PostingStartDate"),
                    )
                })
                .collect(),
        };
        Ok(out)
    }
}

fn id_of(j: &Value) -> String {
    match j.get("id") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

pub struct JsonBoard {
    board: Board,
    mode: Mode,
}

enum Mode {
    Fixture(Value),
    Http { url: String, client: Client },
    /// Required API key missing: the board contributes nothing.
    Disabled,
}

impl JsonBoard {
    pub fn new(board: Board, client: &Client, keys: &ApiKeys) -> Self {
        let mode = match board.url(keys) {
            Some(url) => Mode::Http {
                url,
                client: client.clone(),
            },
            None => Mode::Disabled,
        };
        Self { board, mode }
    }

    pub fn from_fixture(board: Board, payload: Value) -> Self {
        Self {
            board,
            mode: Mode::Fixture(payload),
        }
    }

    pub fn is_disabled(&self) -> bool {
        matches!(self.mode, Mode::Disabled)
    }
}

#[async_trait]
impl SourceAdapter for JsonBoard {
    async fn fetch_latest(&self) -> Result<Vec<Posting>> {
        match &self.mode {
            Mode::Fixture(v) => self.board.parse(v),
            Mode::Http { url, client } => {
                let v = get_json_with(client, url, self.board.headers()).await?;
                self.board.parse(&v)
            }
            Mode::Disabled => {
                tracing::debug!(source = self.board.source_name(), "no api key, skipping");
                Ok(Vec::new())
            }
        }
    }

    fn name(&self) -> &str {
        self.board.source_name()
    }

    fn geo_policy(&self) -> GeoPolicy {
        self.board.geo_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn remoteok_skips_legal_notice_and_builds_url() {
        let v = json!([
            {"legal": "terms"},
            {"id": 42, "position": "Data Engineer", "company": "Acme", "epoch": 1_700_000_000},
        ]);
        let out = Board::RemoteOk.parse(&v).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].url, "https://remoteok.com/jobs/42");
        assert_eq!(out[0].location, "Remote");
        assert!(out[0].posted_at.starts_with("2023-11-14"));
    }

    #[test]
    fn usajobs_reads_descriptor() {
        let v = json!({"SearchResult": {"SearchResultItems": [
            {"MatchedObjectDescriptor": {
                "PositionTitle": "IT Specialist (Data Engineer)",
                "PositionLocationDisplay": "Washington, DC",
                "PositionURI": "https://www.usajobs.gov/job/1",
                "PublicationStartDate": "2025-09-01"
            }}
        ]}});
        let out = Board::UsaJobs.parse(&v).unwrap();
        assert_eq!(out[0].company, "US Gov");
        assert_eq!(out[0].source, "USAJobs");
        assert_eq!(Board::UsaJobs.geo_policy(), GeoPolicy::AllowBlank);
    }

    #[test]
    fn unexpected_shape_is_an_error() {
        assert!(Board::Remotive.parse(&json!({"oops": true})).is_err());
        assert!(Board::RemoteOk.parse(&json!({"jobs": []})).is_err());
        assert!(Board::Microsoft.parse(&json!({"operationResult": {}})).is_err());
        // an empty list is a valid, quiet answer
        assert!(Board::Remotive.parse(&json!({"jobs": []})).unwrap().is_empty());
    }

    #[tokio::test]
    async fn schema_drift_fails_the_adapter() {
        let board = JsonBoard::from_fixture(Board::Himalayas, json!({"data": []}));
        assert!(board.fetch_latest().await.is_err());
    }

    #[test]
    fn career_sites_use_fixed_company_names() {
        let google = json!({"jobs": [
            {"id": "123", "title": "Data Engineer, Cloud", "publish_date": "2025-09-01T00:00:00Z",
             "locations": [{"city": "Sunnyvale"}]}
        ]});
        let out = Board::Google.parse(&google).unwrap();
        assert_eq!(out[0].company, "Google");
        assert_eq!(out[0].location, "Sunnyvale");
        assert_eq!(out[0].url, "https://careers.google.com/jobs/results/123");

        let msft = json!({"operationResult": {"result": {"jobs": [
            {"jobId": "170001", "title": "Data Engineer II", "postingDate": "2025-09-02T00:00:00+00:00",
             "properties": {"primaryWorkLocation": "Redmond, Washington, United States"}}
        ]}}});
        let out = Board::Microsoft.parse(&msft).unwrap();
        assert_eq!(out[0].company, "Microsoft");
        assert_eq!(out[0].url, "https://careers.microsoft.com/v2/global/en/job/170001");
        assert_eq!(out[0].source, "Microsoft Careers");

        let ibm = json!({"positions": [
            {"id": 77, "title": "Data Engineer", "primary_display_location": "Austin, TX"}
        ]});
        assert_eq!(Board::Ibm.parse(&ibm).unwrap()[0].url, "https://careers.ibm.com/job/77");

        let oracle = json!({"items": [
            {"Id": "900", "Title": "Senior Data Engineer", "PrimaryLocation": "Austin, TX, United States",
             "PostingStartDate": "2025-09-03"}
        ]});
        let out = Board::Oracle.parse(&oracle).unwrap();
        assert_eq!(out[0].title, "Senior Data Engineer");
        assert!(out[0].url.ends_with("/job/900"));
        assert_eq!(Board::Oracle.headers(), &[("REST-Framework-Version", "3")]);
    }

    #[test]
    fn startup_boards_read_company_and_location() {
        let wf = json!({"jobs": [
            {"title": "Data Engineer", "startup": {"name": "Tiny Co"}, "location": "New York, NY",
             "url": "https://wellfound.com/jobs/1", "created_at": "2025-09-01"}
        ]});
        let out = Board::Wellfound.parse(&wf).unwrap();
        assert_eq!(out[0].company, "Tiny Co");
        assert_eq!(out[0].url, "https://wellfound.com/jobs/1");

        let yc = json!({"jobs": [
            {"id": 555, "title": "Founding Data Engineer", "company_name": "Seed Inc",
             "locations": ["San Francisco, CA", "Remote (US)"]}
        ]});
        let out = Board::YcStartup.parse(&yc).unwrap();
        assert_eq!(out[0].location, "San Francisco, CA");
        assert_eq!(out[0].url, "https://www.workatastartup.com/jobs/555");
    }

    #[tokio::test]
    async fn adzuna_without_keys_self_disables() {
        let client = Client::new();
        let board = JsonBoard::new(Board::Adzuna, &client, &ApiKeys::default());
        assert!(board.is_disabled());
        assert!(board.fetch_latest().await.unwrap().is_empty());

        let keys = ApiKeys {
            adzuna_app_id: Some("id".into()),
            adzuna_app_key: Some("key".into()),
        };
        assert!(!JsonBoard::new(Board::Adzuna, &client, &keys).is_disabled());
    }
}
