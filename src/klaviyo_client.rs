use std::fmt::Debug;
use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde_json::json;
use serde_json::Value;

use crate::domain::SubscriberEmail;
use crate::domain::SubscriptionPayload;
use crate::utils::error_chain_fmt;

/// Content type for both directions; the provider speaks JSON:API only.
pub const JSON_API: &str = "application/vnd.api+json";

/// API revision the payload shape was written against.
pub const REVISION: &str = "2025-01-15";

/// Returned in place of an empty upstream success body.
pub const EMPTY_SUCCESS_MESSAGE: &str = "Subscription successful, but response was empty.";

/// What the provider answered with when it accepted the subscription.
#[derive(Debug, PartialEq)]
pub struct SubscriptionOutcome {
    /// Either 200 or 202
    pub status: u16,
    pub body: Value,
}

#[derive(thiserror::Error)]
pub enum RelayError {
    /// The provider answered, but not with 200/202. `detail` is its JSON error
    /// document, or its raw text if that does not parse.
    #[error("Upstream provider responded with status {status}")]
    Upstream { status: u16, detail: Value },
    #[error("Upstream provider timed out.")]
    Timeout(#[source] reqwest::Error),
    /// Connection or DNS failure; nothing was answered.
    #[error("Upstream provider is unreachable.")]
    Unreachable(#[source] reqwest::Error),
    /// The provider was reached, but its response could not be read (broken
    /// body, redirect loop).
    #[error("Upstream provider sent an unreadable response.")]
    BadResponse(#[source] reqwest::Error),
}

impl Debug for RelayError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl RelayError {
    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout(e)
        } else if e.is_connect() {
            Self::Unreachable(e)
        } else {
            tracing::warn!(error = %e, "upstream response could not be read");
            Self::BadResponse(e)
        }
    }
}

/// Client for the provider's client-side subscription endpoint.
///
/// Establishing a HTTP connection is expensive, so a single `KlaviyoClient` is
/// built at startup and shared (via `web::Data`) by every worker; the inner
/// `reqwest::Client` keeps a connection pool.
pub struct KlaviyoClient {
    http_client: Client,
    base_url: String,
    /// Public company id, not a private key, but still kept out of logs
    api_key: Secret<String>,
    list_id: String,
}

impl KlaviyoClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        list_id: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url,
            api_key,
            list_id,
        })
    }

    /// Subscribe `email` to the configured list with marketing consent. Exactly
    /// one request is sent; nothing is retried.
    #[tracing::instrument(
        name = "Creating upstream subscription",
        skip(self, email),
        fields(list_id = %self.list_id)
    )]
    pub async fn subscribe(
        &self,
        email: &SubscriberEmail,
    ) -> Result<SubscriptionOutcome, RelayError> {
        let payload = SubscriptionPayload::new(email, &self.list_id);

        let resp = self
            .http_client
            .post(&self.base_url)
            .query(&[("company_id", self.api_key.expose_secret())])
            .header(ACCEPT, JSON_API)
            // set before `json`, which only fills in a content type if none is present
            .header(CONTENT_TYPE, JSON_API)
            .header("revision", REVISION)
            .json(&payload)
            .send()
            .await
            .map_err(RelayError::from_transport)?;

        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(RelayError::from_transport)?;

        interpret_response(status, &body)
    }
}

/// Only 200 and 202 count as success; every other status, 2xx included, is
/// passed back to the caller as-is.
fn interpret_response(
    status: u16,
    body: &str,
) -> Result<SubscriptionOutcome, RelayError> {
    match status {
        200 | 202 => {
            let body = match body.trim().is_empty() {
                true => json!({ "message": EMPTY_SUCCESS_MESSAGE }),
                false => json_or_text(body),
            };
            Ok(SubscriptionOutcome { status, body })
        }
        _ => {
            tracing::warn!(status, "upstream rejected subscription");
            Err(RelayError::Upstream {
                status,
                detail: json_or_text(body),
            })
        }
    }
}

fn json_or_text(body: &str) -> Value {
    serde_json::from_str(body).unwrap_or_else(|_| Value::String(body.to_string()))
}
