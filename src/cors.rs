use actix_web::body::MessageBody;
use actix_web::dev::ServiceRequest;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;
use actix_web::http::header::HeaderValue;
use actix_web::http::Method;
use actix_web::web;
use actix_web_lab::middleware::Next;

use crate::configuration::CorsSettings;

/// Methods advertised in preflight responses; every route the app exposes.
pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Advertised when a preflight does not list the headers it wants to send.
const DEFAULT_ALLOWED_HEADERS: &str = "content-type";

/// Preflight answers also depend on what the browser asked for.
const PREFLIGHT_VARY: &str = "Origin, Access-Control-Request-Method, Access-Control-Request-Headers";

/// Cross-origin policy for every route, including `OPTIONS /subscribe`.
///
/// Origins are compared without a trailing `/` and case-insensitively, since
/// browsers send `Origin` as `scheme://host[:port]` only.
#[derive(Clone, Debug)]
pub struct CorsPolicy {
    allowed_origins: Vec<String>,
}

fn normalise(origin: &str) -> String { origin.trim().trim_end_matches('/').to_lowercase() }

impl CorsPolicy {
    pub fn new<I, S>(allowed_origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_origins: allowed_origins
                .into_iter()
                .map(|o| normalise(o.as_ref()))
                .filter(|o| !o.is_empty())
                .collect(),
        }
    }

    pub fn allows(
        &self,
        origin: &str,
    ) -> bool {
        let origin = normalise(origin);
        self.allowed_origins.iter().any(|o| *o == origin)
    }
}

impl From<&CorsSettings> for CorsPolicy {
    fn from(value: &CorsSettings) -> Self { Self::new(&value.allowed_origins) }
}

/// Decorate responses to allowed origins with CORS headers. Requests are never
/// rejected here; a browser simply refuses to expose the response to a page
/// from an origin that got no `Access-Control-Allow-Origin`.
///
/// Runs after the handler, so error responses (e.g. a mirrored upstream 400)
/// are readable by the front end too.
///
/// For more details, refer to the documentation for
/// `actix_web_lab::middleware::from_fn`
pub async fn apply_cors(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let policy = req.app_data::<web::Data<CorsPolicy>>().cloned();
    let origin = req.headers().get(header::ORIGIN).cloned();
    let is_preflight = req.method() == Method::OPTIONS;
    let requested_headers = req
        .headers()
        .get(header::ACCESS_CONTROL_REQUEST_HEADERS)
        .cloned();

    let mut resp = next.call(req).await?;

    // every response depends on `Origin`, whether or not headers get added
    let vary = match is_preflight {
        true => PREFLIGHT_VARY,
        false => "Origin",
    };
    resp.headers_mut().append(header::VARY, HeaderValue::from_static(vary));

    let (Some(policy), Some(origin)) = (policy, origin) else {
        return Ok(resp);
    };
    match origin.to_str() {
        Ok(o) if policy.allows(o) => {}
        _ => {
            tracing::debug!(?origin, "origin not allowed, no CORS headers added");
            return Ok(resp);
        }
    }

    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );

    if is_preflight {
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        // with credentials allowed, a literal `*` is not honoured by browsers,
        // so the requested headers are echoed back instead
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            requested_headers.unwrap_or(HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS)),
        );
    }

    Ok(resp)
}
