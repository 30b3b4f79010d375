//! Client for the external image-scoring service.
//!
//! The scorer is a black box: image bytes in, labeled detection scores out.
//! Everything downstream works from the detection list alone.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::classify::Detection;

/// Response shape of the external detection endpoint.
#[derive(Debug, Deserialize)]
pub struct ScorerResponse {
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub results: Vec<Detection>,
    #[serde(default)]
    pub status: String,
}

/// Seam for the external scoring service.
#[async_trait::async_trait]
pub trait DetectionScorer: Send + Sync {
    /// Score an image, returning the ordered detection list.
    async fn score(&self, filename: &str, image: Vec<u8>) -> Result<Vec<Detection>>;
}

/// HTTP scorer that forwards the image as a multipart upload.
pub struct HttpScorer {
    client: reqwest::Client,
    url: String,
}

impl HttpScorer {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build scorer HTTP client")?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl DetectionScorer for HttpScorer {
    async fn score(&self, filename: &str, image: Vec<u8>) -> Result<Vec<Detection>> {
        let part = reqwest::multipart::Part::bytes(image).file_name(filename.to_string());
        let form = reqwest::multipart::Form::new().part("image", part);

        let resp = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("scorer request to {} failed", self.url))?
            .error_for_status()
            .context("scorer returned an error status")?;

        let body: ScorerResponse = resp
            .json()
            .await
            .context("failed to parse scorer response")?;
        Ok(body.results)
    }
}
