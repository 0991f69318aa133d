use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::{LocationQuery, WeatherDocument};

use super::{Endpoint, FetchError, WeatherFetcher};

/// Response units are always metric.
const UNITS: &str = "metric";
/// Descriptions come back in Japanese.
const LANG: &str = "ja";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    endpoint: Endpoint,
    http: Client,
}

impl OpenWeatherClient {
    /// `timeout` of `None` keeps reqwest's default behaviour.
    pub fn new(endpoint: Endpoint, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { endpoint, http: builder.build()? })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    fn query_params(&self, query: &LocationQuery) -> Vec<(&'static str, String)> {
        let mut params = match query {
            LocationQuery::City(city) => vec![("q", city.clone())],
            LocationQuery::Coordinates(c) => {
                vec![("lat", c.latitude.to_string()), ("lon", c.longitude.to_string())]
            }
        };
        if let Some(key) = self.endpoint.api_key() {
            params.push(("appid", key.to_string()));
        }
        params.push(("units", UNITS.to_string()));
        params.push(("lang", LANG.to_string()));
        params
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch(&self, query: &LocationQuery) -> Result<WeatherDocument, FetchError> {
        let res = self
            .http
            .get(self.endpoint.url())
            .query(&self.query_params(query))
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%status, bytes = body.len(), "weather response received");

        if !status.is_success() {
            return Err(FetchError::Status { status, body: truncate_body(&body) });
        }

        Ok(WeatherDocument(serde_json::from_str(&body)?))
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
