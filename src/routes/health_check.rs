use actix_web::HttpResponse;

/// `GET /health_check`
///
/// Liveness probe for the deployment platform. Does not touch the upstream
/// provider, so it stays green while the provider is down.
///
/// Note: viewing http response requires `curl -v`
pub async fn health_check() -> HttpResponse { HttpResponse::Ok().finish() }
