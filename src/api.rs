/// Content delivery API client

use crate::config::Config;
use crate::story::{Space, Story, Version};
use gloo_net::http::Request;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("invalid request url: {0}")]
    Url(#[from] url::ParseError),
    #[error("network error: {0}")]
    Network(String),
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True when the server answered with a non-2xx status
    pub fn is_status(&self) -> bool {
        matches!(self, ApiError::Status { .. })
    }
}

/// Parameters of a story list request
#[derive(Debug, Clone, PartialEq)]
pub struct StoryQuery {
    pub per_page: u32,
    pub sort_by: Option<String>,
}

impl StoryQuery {
    /// Smallest possible query, used to check credentials
    pub fn validation(config: &Config) -> Self {
        StoryQuery {
            per_page: config.validation_page_size,
            sort_by: None,
        }
    }

    /// Most recently updated stories first
    pub fn recent(config: &Config) -> Self {
        StoryQuery {
            per_page: config.story_page_size,
            sort_by: Some(config.story_sort.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoriesResponse {
    #[serde(default)]
    pub stories: Vec<Story>,
}

#[derive(Debug, Deserialize)]
pub struct StoryResponse {
    pub story: Story,
}

#[derive(Debug, Deserialize)]
pub struct SpaceResponse {
    #[serde(default)]
    pub space: Option<Space>,
}

/// Read access to the CMS
#[allow(async_fn_in_trait)]
pub trait CmsApi {
    async fn list_stories(&self, token: &str, query: &StoryQuery) -> Result<Vec<Story>, ApiError>;

    async fn fetch_story(&self, token: &str, slug: &str, version: Version) -> Result<Story, ApiError>;

    async fn fetch_space(&self, token: &str) -> Result<Space, ApiError>;
}

pub fn stories_url(config: &Config, token: &str, query: &StoryQuery) -> Result<Url, ApiError> {
    let mut url = Url::parse(&format!("{}/stories", config.api_base))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("token", token);
        pairs.append_pair("per_page", &query.per_page.to_string());
        if let Some(sort_by) = &query.sort_by {
            pairs.append_pair("sort_by", sort_by);
        }
    }
    Ok(url)
}

pub fn story_url(config: &Config, token: &str, slug: &str, version: Version) -> Result<Url, ApiError> {
    let mut url = Url::parse(&format!(
        "{}/stories/{}",
        config.api_base,
        slug.trim_matches('/')
    ))?;
    url.query_pairs_mut()
        .append_pair("token", token)
        .append_pair("version", version.as_str());
    Ok(url)
}

pub fn space_url(config: &Config, token: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(&format!("{}/spaces/me", config.api_base))?;
    url.query_pairs_mut().append_pair("token", token);
    Ok(url)
}

/// Decode a response body, keeping decode failures apart from transport failures
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
    if !(200..=299).contains(&status) {
        return Err(ApiError::Status {
            status,
            body: body.to_string(),
        });
    }

    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// `CmsApi` over `fetch`
#[derive(Debug, Clone)]
pub struct HttpApi {
    config: Config,
}

impl HttpApi {
    pub fn new(config: Config) -> Self {
        HttpApi { config }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = Request::get(url.as_str())
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let result = decode_body(status, &body);
        if let Err(ApiError::Status { status, body }) = &result {
            log::warn!("CMS request to {} failed ({}): {}", url.path(), status, body);
        }
        result
    }
}

impl CmsApi for HttpApi {
    async fn list_stories(&self, token: &str, query: &StoryQuery) -> Result<Vec<Story>, ApiError> {
        let url = stories_url(&self.config, token, query)?;
        let response: StoriesResponse = self.get_json(url).await?;
        Ok(response.stories)
    }

    async fn fetch_story(&self, token: &str, slug: &str, version: Version) -> Result<Story, ApiError> {
        let url = story_url(&self.config, token, slug, version)?;
        let response: StoryResponse = self.get_json(url).await?;
        Ok(response.story)
    }

    async fn fetch_space(&self, token: &str) -> Result<Space, ApiError> {
        let url = space_url(&self.config, token)?;
        let response: SpaceResponse = self.get_json(url).await?;
        response
            .space
            .ok_or_else(|| ApiError::Decode("response has no space".to_string()))
    }
}
