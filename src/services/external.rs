use std::{sync::Arc, time::Duration};

use anyhow::{Context, Result};
use async_trait::async_trait;
use moka::future::Cache;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AppError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait ChatbotClient: Send + Sync {
    async fn reply(&self, message: &str) -> Result<String>;
}

#[async_trait]
pub trait MeetingSummarizer: Send + Sync {
    async fn summarize(&self, content_type: &str, recording: Vec<u8>) -> Result<String>;
}

#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn top_headlines(&self, country: &str) -> Result<Vec<NewsArticle>>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub source: Option<NewsSource>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
struct SummaryResponse {
    summary: Option<String>,
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<NewsArticle>,
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|e| {
            log::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        })
}

pub struct HttpChatbotClient {
    url: String,
    client: reqwest::Client,
}

impl HttpChatbotClient {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: http_client(),
        }
    }
}

#[async_trait]
impl ChatbotClient for HttpChatbotClient {
    async fn reply(&self, message: &str) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .json(&ChatRequest { message })
            .send()
            .await
            .context("Failed to reach chat-bot")?
            .error_for_status()
            .context("Chat-bot returned an error status")?;

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat-bot response")?;

        Ok(body.response)
    }
}

pub struct HttpMeetingSummarizer {
    url: String,
    client: reqwest::Client,
}

impl HttpMeetingSummarizer {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: http_client(),
        }
    }
}

#[async_trait]
impl MeetingSummarizer for HttpMeetingSummarizer {
    async fn summarize(&self, content_type: &str, recording: Vec<u8>) -> Result<String> {
        let part = reqwest::multipart::Part::bytes(recording)
            .file_name("sound.mp4")
            .mime_str(content_type)
            .context("Invalid recording content type")?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .context("Failed to reach summary service")?
            .error_for_status()
            .context("Summary service returned an error status")?;

        let body: SummaryResponse = response
            .json()
            .await
            .context("Failed to parse summary response")?;

        body.summary
            .filter(|summary| !summary.trim().is_empty())
            .context("Summary service returned no summary")
    }
}

pub struct HttpNewsProvider {
    url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpNewsProvider {
    pub fn new(url: String, api_key: Option<String>) -> Self {
        Self {
            url,
            api_key,
            client: http_client(),
        }
    }
}

#[async_trait]
impl NewsProvider for HttpNewsProvider {
    async fn top_headlines(&self, country: &str) -> Result<Vec<NewsArticle>> {
        let api_key = self
            .api_key
            .as_deref()
            .context("NEWS_API_KEY is not configured")?;

        let response = self
            .client
            .get(&self.url)
            .query(&[("country", country), ("apiKey", api_key)])
            .send()
            .await
            .context("Failed to reach news API")?
            .error_for_status()
            .context("News API returned an error status")?;

        let body: HeadlinesResponse = response
            .json()
            .await
            .context("Failed to parse news API response")?;

        Ok(body.articles)
    }
}

/// Headlines per country, cached for `NEWS_CACHE_SECONDS`.
#[derive(Clone)]
pub struct NewsService {
    provider: Arc<dyn NewsProvider>,
    cache: Cache<String, Arc<Vec<NewsArticle>>>,
}

impl NewsService {
    pub fn new(provider: Arc<dyn NewsProvider>, ttl_seconds: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(256)
            .time_to_live(Duration::from_secs(ttl_seconds))
            .build();

        Self { provider, cache }
    }

    pub async fn top_headlines(&self, country: &str) -> Result<Arc<Vec<NewsArticle>>, AppError> {
        let country = country.trim().to_lowercase();
        if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(AppError::BadRequest(format!(
                "Invalid country code: {}",
                country
            )));
        }

        if let Some(cached) = self.cache.get(&country).await {
            return Ok(cached);
        }

        let articles = self.provider.top_headlines(&country).await.map_err(|e| {
            log::error!("News lookup for {} failed: {:#}", country, e);
            AppError::ExternalService("Failed to fetch news".into())
        })?;

        let articles = Arc::new(articles);
        self.cache.insert(country, articles.clone()).await;
        Ok(articles)
    }
}

/// The three outbound HTTP collaborators, swappable as a unit in tests.
#[derive(Clone)]
pub struct ExternalClients {
    pub chatbot: Arc<dyn ChatbotClient>,
    pub summarizer: Arc<dyn MeetingSummarizer>,
    pub news: Arc<dyn NewsProvider>,
}

impl ExternalClients {
    pub fn from_config(config: &Config) -> Self {
        Self {
            chatbot: Arc::new(HttpChatbotClient::new(config.chatbot_url.clone())),
            summarizer: Arc::new(HttpMeetingSummarizer::new(config.summary_url.clone())),
            news: Arc::new(HttpNewsProvider::new(
                config.news_api_url.clone(),
                config.news_api_key.clone(),
            )),
        }
    }
}
