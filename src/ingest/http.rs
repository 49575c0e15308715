// src/ingest/http.rs
//! Shared HTTP plumbing for source adapters.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Serialize;

use crate::config::ScanConfig;

/// Build the one client every adapter shares. The timeout bounds each request,
/// so a hung endpoint cannot hold a worker past it.
pub fn create_client(cfg: &ScanConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&cfg.user_agent)
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()
        .context("building http client")?;
    Ok(client)
}

/// GET `url` and return the body. Any status other than 200 is an error.
pub async fn get_text(client: &Client, url: &str) -> Result<String> {
    get_text_with(client, url, &[]).await
}

/// `get_text` with extra request headers.
pub async fn get_text_with(client: &Client, url: &str, headers: &[(&str, &str)]) -> Result<String> {
    let mut req = client.get(url);
    for (k, v) in headers {
        req = req.header(*k, *v);
    }
    let resp = req
        .send()
        .await
        .with_context(|| format!("GET {url}"))?;
    let status = resp.status();
    if status != reqwest::StatusCode::OK {
        bail!("GET {url} returned {status}");
    }
    resp.text().await.with_context(|| format!("reading body of {url}"))
}

pub async fn get_json(client: &Client, url: &str) -> Result<serde_json::Value> {
    get_json_with(client, url, &[]).await
}

pub async fn get_json_with(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
) -> Result<serde_json::Value> {
    let body = get_text_with(client, url, headers).await?;
    serde_json::from_str(&body).with_context(|| format!("parsing json from {url}"))
}

pub async fn post_json<B: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    payload: &B,
) -> Result<serde_json::Value> {
    let resp = client
        .post(url)
        .json(payload)
        .send()
        .await
        .with_context(|| format!("POST {url}"))?;
    let status = resp.status();
    if status != reqwest::StatusCode::OK {
        bail!("POST {url} returned {status}");
    }
    resp.json()
        .await
        .with_context(|| format!("parsing json from {url}"))
}

/// Look up a string at a `/`-separated JSON pointer, empty when missing.
pub fn str_at<'a>(v: &'a serde_json::Value, pointer: &str) -> &'a str {
    v.pointer(pointer).and_then(|x| x.as_str()).unwrap_or_default()
}

/// The array at `pointer`. A missing or non-array value means the payload
/// changed shape, which is an adapter failure rather than an empty result.
pub fn array_at<'a>(v: &'a serde_json::Value, pointer: &str) -> Result<&'a Vec<serde_json::Value>> {
    v.pointer(pointer)
        .and_then(|x| x.as_array())
        .with_context(|| format!("unexpected payload: no array at {pointer:?}"))
}

/// Epoch timestamp (seconds or milliseconds) to RFC 3339; empty when absent.
pub fn epoch_to_rfc3339(v: Option<&serde_json::Value>) -> String {
    let Some(raw) = v.and_then(|x| x.as_i64()).filter(|x| *x > 0) else {
        return String::new();
    };
    // Anything past year 2286 in seconds is really milliseconds.
    let secs = if raw > 9_999_999_999 { raw / 1_000 } else { raw };
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn epoch_handles_seconds_and_millis() {
        let s = epoch_to_rfc3339(Some(&json!(1_700_000_000)));
        let ms = epoch_to_rfc3339(Some(&json!(1_700_000_000_000i64)));
        assert_eq!(s, ms);
        assert!(s.starts_with("2023-11-14T22:13:20"));
    }

    #[test]
    fn epoch_missing_or_zero_is_empty() {
        assert_eq!(epoch_to_rfc3339(None), "");
        assert_eq!(epoch_to_rfc3339(Some(&json!(0))), "");
        assert_eq!(epoch_to_rfc3339(Some(&json!("soon"))), "");
    }

    #[test]
    fn array_at_rejects_missing_or_scalar() {
        let v = json!({"jobs": [1, 2], "count": 2});
        assert_eq!(array_at(&v, "/jobs").unwrap().len(), 2);
        assert!(array_at(&v, "/count").is_err());
        assert!(array_at(&v, "/results").is_err());
        assert!(array_at(&json!([]), "").unwrap().is_empty());
    }

    #[test]
    fn str_at_reads_nested_fields() {
        let v = json!({"company": {"name": "Acme"}});
        assert_eq!(str_at(&v, "/company/name"), "Acme");
        assert_eq!(str_at(&v, "/company/missing"), "");
    }
}
