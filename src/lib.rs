//! Relay between a web front end and the upstream marketing-email provider.
//!
//! API endpoints:
//! - `POST /subscribe` -- `{"email": "..."}`, subscribes the address to the
//!   configured list (single opt-in)
//! - `OPTIONS /subscribe` -- CORS preflight
//! - `GET /health_check`
//!
//! Nothing is stored: one inbound request maps to exactly one outbound call,
//! and the upstream status and body are passed back.

pub mod configuration;
pub mod cors;
pub mod domain;
pub mod klaviyo_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
pub mod utils;
