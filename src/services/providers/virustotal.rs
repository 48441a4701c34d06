use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ProviderError, ProviderResult};
use crate::config::VirusTotalConfig;

/// Aggregated engine verdicts for one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReputationReport {
    pub malicious: u32,
    pub suspicious: u32,
    pub harmless: u32,
    pub undetected: u32,
    pub last_analysis_date: Option<i64>,
}

impl ReputationReport {
    pub fn is_safe(&self) -> bool {
        self.malicious == 0 && self.suspicious == 0
    }

    pub fn total_engines(&self) -> u32 {
        self.malicious + self.suspicious + self.harmless + self.undetected
    }
}

#[async_trait]
pub trait UrlReputationProvider: Send + Sync {
    /// `Ok(None)` when the provider has no analysis for the URL yet
    async fn lookup(&self, url: &str) -> ProviderResult<Option<ReputationReport>>;

    fn name(&self) -> &str;
}

pub struct VirusTotalClient {
    client: HttpClient,
    api_key: String,
    base_url: String,
}

impl VirusTotalClient {
    pub fn new(api_key: &str, config: &VirusTotalConfig) -> ProviderResult<Self> {
        let client = HttpClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// VirusTotal identifies URLs by their unpadded URL-safe base64
    pub fn url_id(url: &str) -> String {
        URL_SAFE_NO_PAD.encode(url)
    }

    /// Queue an unknown URL for scanning so later lookups have data
    async fn submit(&self, url: &str) -> ProviderResult<()> {
        let response = self
            .client
            .post(format!("{}/urls", self.base_url))
            .header("x-apikey", &self.api_key)
            .form(&[("url", url)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ProviderError::Status(response.status().as_u16()));
        }
        Ok(())
    }
}

#[derive(Deserialize)]
struct UrlObjectResponse {
    data: UrlObject,
}

#[derive(Deserialize)]
struct UrlObject {
    attributes: UrlAttributes,
}

#[derive(Deserialize)]
struct UrlAttributes {
    last_analysis_stats: AnalysisStats,
    last_analysis_date: Option<i64>,
}

#[derive(Deserialize)]
struct AnalysisStats {
    #[serde(default)]
    malicious: u32,
    #[serde(default)]
    suspicious: u32,
    #[serde(default)]
    harmless: u32,
    #[serde(default)]
    undetected: u32,
}

fn parse_url_object(body: &str) -> ProviderResult<ReputationReport> {
    let parsed: UrlObjectResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
    let attributes = parsed.data.attributes;
    let stats = attributes.last_analysis_stats;

    Ok(ReputationReport {
        malicious: stats.malicious,
        suspicious: stats.suspicious,
        harmless: stats.harmless,
        undetected: stats.undetected,
        last_analysis_date: attributes.last_analysis_date,
    })
}

#[async_trait]
impl UrlReputationProvider for VirusTotalClient {
    async fn lookup(&self, url: &str) -> ProviderResult<Option<ReputationReport>> {
        let response = self
            .client
            .get(format!("{}/urls/{}", self.base_url, Self::url_id(url)))
            .header("x-apikey", &self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                if let Err(e) = self.submit(url).await {
                    tracing::warn!(error = %e, "VirusTotal URL submission failed");
                }
                Ok(None)
            }
            status if status.is_success() => {
                let body = response.text().await?;
                parse_url_object(&body).map(Some)
            }
            status => Err(ProviderError::Status(status.as_u16())),
        }
    }

    fn name(&self) -> &str {
        "virustotal"
    }
}
