//! HTTP client for the challenge, autocomplete and guess statistics endpoints.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::{
    dto::{
        challenge::ChallengePayload,
        search::{AutocompleteRequest, AutocompleteResponse, RecordGuessRequest},
    },
    error::ServiceError,
    services::{challenge::ChallengeSource, search::SearchSource, telemetry::GuessTelemetry},
    state::{CandidateMovie, Challenge, MovieId},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Underlying failure.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to send request to `{path}`")]
    RequestSend {
        /// Endpoint path.
        path: String,
        /// Underlying failure.
        #[source]
        source: reqwest::Error,
    },
    /// The server answered with an unexpected status.
    #[error("unexpected response status {status} for `{path}`")]
    RequestStatus {
        /// Endpoint path.
        path: String,
        /// Status received.
        status: StatusCode,
    },
    /// The response body was not the expected JSON.
    #[error("failed to decode response for `{path}`")]
    DecodeResponse {
        /// Endpoint path.
        path: String,
        /// Underlying failure.
        #[source]
        source: reqwest::Error,
    },
}

impl From<ApiError> for ServiceError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RequestStatus { path, status } if status == StatusCode::NOT_FOUND => {
                ServiceError::NotFound(path)
            }
            ApiError::RequestStatus { path, status } if status == StatusCode::BAD_REQUEST => {
                ServiceError::InvalidInput(format!("request to `{path}` was rejected"))
            }
            ApiError::RequestSend { ref source, .. } if source.is_timeout() => {
                ServiceError::Timeout
            }
            other => ServiceError::Unavailable(other.to_string()),
        }
    }
}

/// Shared client for the game API; cheap to clone.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
}

impl ApiClient {
    /// Client rooted at `base_url`, e.g. `https://movierush.vercel.app`.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|source| ApiError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').into(),
        })
    }

    /// Challenge for `date`, `None` on 404.
    pub async fn challenge(&self, date: &str) -> Result<Option<Challenge>, ApiError> {
        let path = "/api/challenge";
        let response = self
            .client
            .get(self.url(path))
            .query(&[("date", date)])
            .send()
            .await
            .map_err(|source| send_error(path, source))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(date, "no challenge published");
            return Ok(None);
        }
        let payload: ChallengePayload = decode(path, response).await?;
        Ok(Some(payload.into()))
    }

    /// Unfiltered search for `query`.
    pub async fn autocomplete(&self, query: &str) -> Result<Vec<CandidateMovie>, ApiError> {
        let path = "/api/autocomplete";
        let response = self
            .client
            .post(self.url(path))
            .json(&AutocompleteRequest { query })
            .send()
            .await
            .map_err(|source| send_error(path, source))?;

        let payload: AutocompleteResponse = decode(path, response).await?;
        Ok(payload.results.into_iter().map(Into::into).collect())
    }

    /// Increment the guess counter of `movie_id` on `challenge_id`.
    pub async fn record_guess(&self, challenge_id: i64, movie_id: MovieId) -> Result<(), ApiError> {
        let path = "/api/stats/record-guess";
        let response = self
            .client
            .post(self.url(path))
            .json(&RecordGuessRequest {
                challenge_id,
                tmdb_id: movie_id,
            })
            .send()
            .await
            .map_err(|source| send_error(path, source))?;

        ensure_success(path, response.status())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl ChallengeSource for ApiClient {
    fn fetch_challenge(
        &self,
        date: &str,
    ) -> BoxFuture<'static, Result<Option<Challenge>, ServiceError>> {
        let client = self.clone();
        let date = date.to_owned();
        Box::pin(async move { client.challenge(&date).await.map_err(Into::into) })
    }
}

impl SearchSource for ApiClient {
    fn search(&self, query: &str) -> BoxFuture<'static, Result<Vec<CandidateMovie>, ServiceError>> {
        let client = self.clone();
        let query = query.to_owned();
        Box::pin(async move { client.autocomplete(&query).await.map_err(Into::into) })
    }
}

impl GuessTelemetry for ApiClient {
    fn record_guess(
        &self,
        challenge_id: i64,
        movie_id: MovieId,
    ) -> BoxFuture<'static, Result<(), ServiceError>> {
        let client = self.clone();
        Box::pin(async move {
            ApiClient::record_guess(&client, challenge_id, movie_id)
                .await
                .map_err(Into::into)
        })
    }
}

fn send_error(path: &str, source: reqwest::Error) -> ApiError {
    ApiError::RequestSend {
        path: path.into(),
        source,
    }
}

fn ensure_success(path: &str, status: StatusCode) -> Result<(), ApiError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ApiError::RequestStatus {
            path: path.into(),
            status,
        })
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: reqwest::Response) -> Result<T, ApiError> {
    ensure_success(path, response.status())?;
    response
        .json::<T>()
        .await
        .map_err(|source| ApiError::DecodeResponse {
            path: path.into(),
            source,
        })
}
