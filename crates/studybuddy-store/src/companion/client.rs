use futures::stream::{BoxStream, StreamExt};
use reqwest::{Client, Response};
use serde::Serialize;
use std::time::Duration;
use studybuddy_config::CompanionConfig;
use studybuddy_models::{VideoSummary, WebSummary};
use tracing::{debug, info};
use crate::companion::error::CompanionError;
use crate::companion::sse;

/// Push feeds published by the vision service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Distraction score; attentiveness is `100 - score`
    Distracted,
    /// Concentration score, 40 or below counts as distracted
    Score,
}

impl Feed {
    pub fn path(&self) -> &'static str {
        match self {
            Feed::Distracted => "distracted_feed",
            Feed::Score => "score_feed",
        }
    }
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    link: &'a str,
    time_stamp: f64,
}

#[derive(Serialize)]
struct WebSummarizeRequest<'a> {
    link: &'a str,
}

/// HTTP client for the companion backend
#[derive(Clone)]
pub struct CompanionClient {
    http: Client,
    base_url: String,
    timeout: Duration,
}

impl CompanionClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, CompanionError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CompanionError::InvalidConfig(format!(
                "base URL must start with http:// or https://, got {:?}",
                base_url
            )));
        }

        // Feeds stay open indefinitely, so only connecting is bounded client-wide;
        // request/response calls apply `timeout` per request.
        let http = Client::builder()
            .user_agent(concat!("studybuddy/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn from_config(config: &CompanionConfig) -> Result<Self, CompanionError> {
        Self::new(config.base_url.clone(), Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn check(response: Response) -> Result<Response, CompanionError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(CompanionError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Summary and quiz for a video, taken up to `time_stamp` seconds in
    pub async fn summarize(&self, link: &str, time_stamp: f64) -> Result<VideoSummary, CompanionError> {
        info!(operation = "summarize", link = %link, time_stamp, "Requesting video summary");
        let response = self
            .http
            .post(self.url("summarize"))
            .timeout(self.timeout)
            .json(&SummarizeRequest { link, time_stamp })
            .send()
            .await?;

        let summary: VideoSummary = Self::check(response).await?.json().await?;
        debug!("Received summary with {} quiz items", summary.quiz.len());
        Ok(summary)
    }

    pub async fn web_summarize(&self, link: &str) -> Result<WebSummary, CompanionError> {
        info!(operation = "web_summarize", link = %link, "Requesting web page summary");
        let response = self
            .http
            .post(self.url("web_summarize"))
            .timeout(self.timeout)
            .json(&WebSummarizeRequest { link })
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Subscribe to a score feed. The stream ends when the server closes it
    /// or after the first transport error.
    pub async fn feed(&self, feed: Feed) -> Result<BoxStream<'static, Result<f64, CompanionError>>, CompanionError> {
        info!(operation = "feed_subscribe", feed = feed.path(), "Subscribing to feed");
        let response = self
            .http
            .get(self.url(feed.path()))
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await?;
        let response = Self::check(response).await?;

        let scores = sse::events(response.bytes_stream()).map(|event| match event {
            Ok(data) => {
                let trimmed = data.trim();
                trimmed
                    .parse::<f64>()
                    .ok()
                    .filter(|score| score.is_finite())
                    .ok_or_else(|| CompanionError::InvalidScore(trimmed.to_string()))
            }
            Err(e) => Err(CompanionError::Http(e)),
        });
        Ok(scores.boxed())
    }

    /// MJPEG camera stream; only its address is exposed
    pub fn video_feed_url(&self) -> String {
        self.url("video_feed")
    }
}
