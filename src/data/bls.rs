//! BLS Public Data API (v2) integration.
//!
//! One batched POST fetches every requested series for the year range, with
//! catalog metadata and server-side calculations. The JSON wire types stay
//! private; callers get a decoded [`RawSeriesBatch`].

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    DashboardConfig, FetchPolicy, RawSeries, RawSeriesBatch, SeriesCatalog, SeriesPoint, SeriesRequest,
};
use crate::error::{AppError, FetchError};

const STATUS_SUCCEEDED: &str = "REQUEST_SUCCEEDED";

/// Anything that can answer a [`SeriesRequest`].
///
/// The pipeline only depends on this seam, so it can run against a canned batch.
pub trait SeriesSource {
    fn fetch(&self, request: &SeriesRequest) -> Result<RawSeriesBatch, FetchError>;
}

pub struct BlsClient {
    client: Client,
    base_url: String,
    policy: FetchPolicy,
}

impl BlsClient {
    pub fn new(base_url: impl Into<String>, policy: FetchPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(policy.timeout)
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            policy,
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self, AppError> {
        Ok(Self::new(config.base_url.clone(), config.fetch)?)
    }

    fn fetch_once(&self, request: &SeriesRequest) -> Result<RawSeriesBatch, FetchError> {
        let body = RequestBody::from(request);

        let resp = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(FetchError::Transport(format!("status {}", resp.status())));
        }

        let text = resp
            .text()
            .map_err(|e| FetchError::Transport(format!("failed to read response body: {e}")))?;

        parse_response(&text)
    }
}

impl SeriesSource for BlsClient {
    fn fetch(&self, request: &SeriesRequest) -> Result<RawSeriesBatch, FetchError> {
        tracing::info!(
            series = request.series_ids().len(),
            start_year = request.start_year(),
            end_year = request.end_year(),
            url = %self.base_url,
            "requesting BLS series"
        );
        let batch = fetch_with_retry(&self.policy, |_| self.fetch_once(request))?;
        for msg in &batch.messages {
            tracing::warn!(message = %msg, "BLS API message");
        }
        tracing::info!(series = batch.series.len(), status = %batch.status, "BLS response decoded");
        Ok(batch)
    }
}

/// Run `attempt` until it succeeds, fails permanently, or the policy's
/// attempts are used up.
///
/// Back-off before retry `n` is `policy.backoff * n`, saturating.
pub fn fetch_with_retry<T, F>(policy: &FetchPolicy, mut attempt: F) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut n = 0;
    loop {
        n += 1;
        match attempt(n) {
            Ok(v) => return Ok(v),
            Err(err) if err.is_transient() && n < max_attempts => {
                let sleep = retry_delay(policy, n);
                tracing::warn!(attempt = n, error = %err, sleep_ms = (sleep.as_millis() as u64), "fetch attempt failed; retrying");
                thread::sleep(sleep);
            }
            Err(err) => return Err(err),
        }
    }
}

fn retry_delay(policy: &FetchPolicy, n: u32) -> Duration {
    policy.backoff.saturating_mul(n)
}

/// Decode a response body into a [`RawSeriesBatch`].
///
/// Fails with `UnexpectedShape` when the body is not JSON or lacks `Results.series`.
/// Point fields are kept as text; a bad year or value only costs that point
/// later, in the table builder.
pub fn parse_response(text: &str) -> Result<RawSeriesBatch, FetchError> {
    let body: ResponseBody = serde_json::from_str(text)
        .map_err(|e| FetchError::UnexpectedShape(format!("invalid JSON: {e}")))?;

    let status = body.status.unwrap_or_default();
    let Some(series) = body.results.and_then(|r| r.series) else {
        let mut detail = String::from("missing Results.series");
        if !status.is_empty() && status != STATUS_SUCCEEDED {
            detail.push_str(&format!(" (status {status}"));
            if !body.message.is_empty() {
                detail.push_str(&format!(": {}", body.message.join("; ")));
            }
            detail.push(')');
        }
        return Err(FetchError::UnexpectedShape(detail));
    };

    let mut out = Vec::with_capacity(series.len());
    for s in series {
        let points = s
            .data
            .into_iter()
            .map(|p| SeriesPoint {
                year: raw_text(p.year),
                period: raw_text(p.period),
                value: raw_text(p.value),
            })
            .collect();
        out.push(RawSeries {
            series_id: s.series_id,
            catalog: s.catalog.map(|c| SeriesCatalog { title: c.series_title }),
            points,
        });
    }

    Ok(RawSeriesBatch {
        status,
        messages: body.message,
        series: out,
    })
}

/// Strings pass through, null or absent becomes empty, numbers keep their JSON text.
fn raw_text(v: Option<Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}

#[derive(Debug, Serialize)]
struct RequestBody<'a> {
    seriesid: &'a [String],
    startyear: String,
    endyear: String,
    registrationkey: &'a str,
    catalog: bool,
    calculations: bool,
}

impl<'a> From<&'a SeriesRequest> for RequestBody<'a> {
    fn from(req: &'a SeriesRequest) -> Self {
        Self {
            seriesid: req.series_ids(),
            startyear: req.start_year().to_string(),
            endyear: req.end_year().to_string(),
            registrationkey: req.api_key(),
            catalog: true,
            calculations: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResponseBody {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Vec<String>,
    #[serde(rename = "Results", default)]
    results: Option<ResultsBody>,
}

#[derive(Debug, Deserialize)]
struct ResultsBody {
    #[serde(default)]
    series: Option<Vec<SeriesBody>>,
}

#[derive(Debug, Deserialize)]
struct SeriesBody {
    #[serde(rename = "seriesID")]
    series_id: String,
    #[serde(default)]
    catalog: Option<CatalogBody>,
    #[serde(default)]
    data: Vec<PointBody>,
}

#[derive(Debug, Deserialize)]
struct CatalogBody {
    #[serde(default)]
    series_title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointBody {
    #[serde(default)]
    year: Option<Value>,
    #[serde(default)]
    period: Option<Value>,
    #[serde(default)]
    value: Option<Value>,
}
