use std::fmt::Debug;

use actix_web::error::JsonPayloadError;
use actix_web::http::StatusCode;
use actix_web::web;
use actix_web::HttpResponse;
use actix_web::ResponseError;
use serde_json::json;
use serde_json::Value;

use crate::domain::SubscribeRequest;
use crate::domain::SubscriberEmail;
use crate::klaviyo_client::KlaviyoClient;
use crate::klaviyo_client::RelayError;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum SubscribeError {
    /// Body missing, not JSON, or the email is not email-shaped. The message is
    /// returned to the caller.
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error(transparent)]
    RelayError(#[from] RelayError),
}

impl Debug for SubscribeError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// Every failure is rendered as `{"detail": ...}`. Upstream rejections keep the
/// upstream status and detail untouched; transport failures map to 502/504.
impl ResponseError for SubscribeError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::RelayError(RelayError::Upstream { status, .. }) => StatusCode::from_u16(*status)
                .ok()
                // a 1xx cannot be a final response
                .filter(|s| !s.is_informational())
                .unwrap_or(StatusCode::BAD_GATEWAY),
            Self::RelayError(RelayError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            Self::RelayError(RelayError::Unreachable(_) | RelayError::BadResponse(_)) => {
                StatusCode::BAD_GATEWAY
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            Self::RelayError(RelayError::Upstream { detail, .. }) => detail.clone(),
            e => Value::String(e.to_string()),
        };
        HttpResponse::build(self.status_code()).json(json!({ "detail": detail }))
    }
}

/// Bodies that fail to deserialise into `SubscribeRequest` get the same
/// `{"detail": ...}` shape as every other failure. The content type is not
/// enforced, as some front ends post JSON as `text/plain` to skip preflight.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| json_error(err).into())
}

/// Oversized bodies stay 413; everything else the extractor rejects is a 400.
fn json_error(err: JsonPayloadError) -> SubscribeError {
    match err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            SubscribeError::PayloadTooLarge(err.to_string())
        }
        err => SubscribeError::ValidationError(err.to_string()),
    }
}

/// `POST /subscribe`
///
/// Relays a single opt-in subscription to the upstream provider. Success
/// mirrors the upstream status (200 or 202) and body; an empty upstream body
/// is replaced with a fixed message.
///
/// # Request example
///
/// ```sh
///     curl -i -H 'Content-Type: application/json' \
///         --data '{"email": "john@foo.com"}' http://127.0.0.1:8000/subscribe
/// ```
#[tracing::instrument(
    name = "Relaying new subscription",
    skip(body, klaviyo_client),
    fields(subscriber_email = %body.email)
)]
pub async fn subscribe(
    body: web::Json<SubscribeRequest>,
    klaviyo_client: web::Data<KlaviyoClient>,
) -> Result<HttpResponse, SubscribeError> {
    let email: SubscriberEmail = body
        .into_inner()
        .try_into()
        .map_err(SubscribeError::ValidationError)?;

    let outcome = klaviyo_client.subscribe(&email).await?;

    let status = StatusCode::from_u16(outcome.status).unwrap_or(StatusCode::OK);
    Ok(HttpResponse::build(status).json(outcome.body))
}

/// `OPTIONS /subscribe`
///
/// Always 200 with `{}`. The CORS headers, if any, are added by
/// `cors::apply_cors` using the same allow-list as every other route.
pub async fn subscribe_preflight() -> HttpResponse { HttpResponse::Ok().json(json!({})) }
