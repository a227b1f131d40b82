//! InfluxDB v2 sink over the HTTP write API.
//!
//! One `POST /api/v2/write?org=..&bucket=..&precision=ns` per batch, body in line
//! protocol. No retries: a failed batch is reported once and dropped.

use crate::config::Config;
use crate::domain::errors::SinkError;
use crate::domain::line_protocol::encode_batch;
use crate::domain::point::Point;
use crate::domain::ports::{MetricSink, WriteTarget};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::debug;
use url::Url;

const MAX_ERROR_BODY: usize = 512;

pub struct InfluxSink {
    client: Client,
    base_url: Url,
    token: String,
    timeout: Duration,
    closed: AtomicBool,
}

impl InfluxSink {
    pub fn new(config: &Config) -> Result<Self, SinkError> {
        let client = Client::builder()
            .pool_max_idle_per_host(1)
            .timeout(config.write_timeout)
            .connect_timeout(config.write_timeout)
            .build()
            .map_err(|e| SinkError::Transport {
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            base_url: config.url.clone(),
            token: config.token.clone(),
            timeout: config.write_timeout,
            closed: AtomicBool::new(false),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/api/v2/write?org=..&bucket=..&precision=ns`, keeping any base path prefix.
    pub fn write_url(&self, target: &WriteTarget) -> Result<Url, SinkError> {
        let mut url = self.endpoint(&["api", "v2", "write"])?;
        url.query_pairs_mut()
            .clear()
            .append_pair("org", &target.org)
            .append_pair("bucket", &target.bucket)
            .append_pair("precision", "ns");
        Ok(url)
    }

    /// Probe `/ping`. Used once at startup for an early warning only.
    pub async fn ping(&self) -> Result<(), SinkError> {
        let url = self.endpoint(&["ping"])?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(SinkError::Rejected {
                status: status.as_u16(),
                body: String::new(),
            })
        }
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SinkError> {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|_| SinkError::Transport {
                reason: format!("{} cannot be used as a base URL", self.base_url),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn classify(&self, error: reqwest::Error) -> SinkError {
        if error.is_timeout() {
            SinkError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if error.is_connect() {
            SinkError::Unreachable {
                reason: error.to_string(),
            }
        } else {
            SinkError::Transport {
                reason: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl MetricSink for InfluxSink {
    async fn write(&self, target: &WriteTarget, points: &[Point]) -> Result<(), SinkError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(SinkError::Closed);
        }

        let body = encode_batch(points)?;
        let url = self.write_url(target)?;

        let response = self
            .client
            .post(url)
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status.is_success() {
            debug!("InfluxSink: wrote {} points ({})", points.len(), status);
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }

        Err(SinkError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn close(&self) -> Result<(), SinkError> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Err(SinkError::Closed);
        }
        debug!("InfluxSink: client released");
        Ok(())
    }
}
