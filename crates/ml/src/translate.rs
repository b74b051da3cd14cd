use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use studio_core::{guess_language, TranslationError, TranslationService};
use tracing::debug;

/// Detection only. Translation is unavailable unless the text is already in
/// the target language.
#[derive(Debug, Clone, Default)]
pub struct OfflineTranslator;

#[async_trait]
impl TranslationService for OfflineTranslator {
    async fn detect_language(&self, text: &str) -> Result<String, TranslationError> {
        guess_language(text)
            .map(str::to_string)
            .ok_or_else(|| TranslationError::Detection("no recognizable script".to_string()))
    }

    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        let source = self.detect_language(text).await?;
        if source.eq_ignore_ascii_case(target) {
            return Ok(text.to_string());
        }
        Err(TranslationError::Unavailable {
            source_lang: source,
            target_lang: target.to_string(),
        })
    }
}

#[derive(Debug, Serialize)]
struct DetectRequest<'a> {
    q: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct DetectCandidate {
    language: String,
    #[serde(default)]
    confidence: f32,
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// HTTP client for a LibreTranslate-compatible server.
#[derive(Debug, Clone)]
pub struct LibreTranslateClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl LibreTranslateClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(6))
            .timeout(Duration::from_secs(20))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, String>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|err| format!("request to {url} failed: {err}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("{url} returned {}: {body}", status.as_u16()));
        }

        response
            .json::<R>()
            .await
            .map_err(|err| format!("{url} returned an unreadable body: {err}"))
    }
}

#[async_trait]
impl TranslationService for LibreTranslateClient {
    async fn detect_language(&self, text: &str) -> Result<String, TranslationError> {
        let request = DetectRequest {
            q: text,
            api_key: self.api_key.as_deref(),
        };
        let candidates: Vec<DetectCandidate> = self
            .post("/detect", &request)
            .await
            .map_err(TranslationError::Detection)?;

        let best = candidates
            .into_iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
            .ok_or_else(|| TranslationError::Detection("no language candidates".to_string()))?;
        debug!(language = %best.language, confidence = best.confidence, "language detected");
        Ok(best.language)
    }

    async fn translate(&self, text: &str, target: &str) -> Result<String, TranslationError> {
        let request = TranslateRequest {
            q: text,
            source: "auto",
            target,
            format: "text",
            api_key: self.api_key.as_deref(),
        };
        let response: TranslateResponse = self
            .post("/translate", &request)
            .await
            .map_err(TranslationError::Translation)?;
        Ok(response.translated_text)
    }
}
