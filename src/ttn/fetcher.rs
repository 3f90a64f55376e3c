use std::{future::Future, time::Duration};

use reqwest::{
    Client, Request, StatusCode,
    header::{ACCEPT, AUTHORIZATION},
};
use thiserror::Error;

use crate::ttn::{Measurement, decode_measurements};

const BASE_HOST: &str = "data.thethingsnetwork.org";

const QUERY_PATH: &str = "/api/v2/query";

// Ref: https://www.thethingsnetwork.org/docs/applications/storage/api.html
const QUERY_WINDOW: &str = "5m";

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build query request: {0}")]
    Request(reqwest::Error),

    #[error("failed to query measurements: {0}")]
    Transport(reqwest::Error),

    #[error("failed to decode measurements: {0}")]
    Decode(serde_json::Error),
}

/// One attempt at retrieving the recent measurements of a project.
pub trait FetchMeasurements {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Measurement>, FetchError>> + Send;
}

#[derive(Debug, Clone)]
pub struct MeasurementFetcher {
    client: Client,
    url: String,
    token: String,
}

pub fn query_url(project: &str) -> String {
    format!("https://{project}.{BASE_HOST}{QUERY_PATH}")
}

impl MeasurementFetcher {
    /// `timeout` of `None` leaves outbound requests without a deadline.
    pub fn new(project: &str, token: &str, timeout: Option<Duration>) -> reqwest::Result<Self> {
        Self::with_url(query_url(project), token, timeout)
    }

    pub fn with_url(
        url: impl Into<String>,
        token: &str,
        timeout: Option<Duration>,
    ) -> reqwest::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url: url.into(),
            token: token.to_owned(),
        })
    }

    pub fn request(&self) -> Result<Request, FetchError> {
        self.client
            .get(&self.url)
            .query(&[("last", QUERY_WINDOW)])
            .header(AUTHORIZATION, format!("key {}", self.token))
            .header(ACCEPT, "application/json")
            .build()
            .map_err(FetchError::Request)
    }

    pub async fn fetch_measurements(&self) -> Result<Vec<Measurement>, FetchError> {
        let request = self.request()?;

        let response = self
            .client
            .execute(request)
            .await
            .map_err(FetchError::Transport)?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(Vec::new());
        }

        let body = response.bytes().await.map_err(FetchError::Transport)?;

        decode_measurements(&body).map_err(FetchError::Decode)
    }
}

impl FetchMeasurements for MeasurementFetcher {
    fn fetch(&self) -> impl Future<Output = Result<Vec<Measurement>, FetchError>> + Send {
        self.fetch_measurements()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_targets_project_query_endpoint() {
        let fetcher = MeasurementFetcher::new("acme", "secret", None).unwrap();

        let request = fetcher.request().unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "https://acme.data.thethingsnetwork.org/api/v2/query?last=5m"
        );
        assert_eq!(request.headers()[AUTHORIZATION], "key secret");
        assert_eq!(request.headers()[ACCEPT], "application/json");
    }

    #[test]
    fn unparsable_url_is_a_request_error() {
        let fetcher = MeasurementFetcher::with_url("not a url", "secret", None).unwrap();

        assert!(matches!(fetcher.request(), Err(FetchError::Request(_))));
    }
}
