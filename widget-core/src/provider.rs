use crate::{Config, LocationQuery, WeatherDocument, provider::openweather::OpenWeatherClient};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Default OpenWeather "current weather" endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Where weather requests are sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Call OpenWeather directly, sending the key as `appid`.
    Direct { base_url: String, api_key: String },
    /// Call a server-side proxy that adds the key itself. No `appid` is sent.
    Proxy { url: String },
}

impl Endpoint {
    pub fn url(&self) -> &str {
        match self {
            Endpoint::Direct { base_url, .. } => base_url,
            Endpoint::Proxy { url } => url,
        }
    }

    pub fn api_key(&self) -> Option<&str> {
        match self {
            Endpoint::Direct { api_key, .. } => Some(api_key),
            Endpoint::Proxy { .. } => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("weather request failed with status {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },

    #[error("failed to reach the weather endpoint: {0}")]
    Network(#[from] reqwest::Error),

    #[error("weather response was not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    /// Issues exactly one request for `query` and returns the parsed body.
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherDocument, FetchError>;
}

/// Construct the OpenWeather fetcher described by `config`.
pub fn fetcher_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherFetcher>> {
    let endpoint = config.endpoint()?;
    let client = OpenWeatherClient::new(endpoint, config.request_timeout())?;
    Ok(Box::new(client))
}
