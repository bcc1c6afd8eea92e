use serde_json::json;
use serde_json::Value;
use wiremock::matchers::any;
use wiremock::Mock;
use wiremock::ResponseTemplate;

use crate::helpers::spawn_app;
use crate::helpers::spawn_app_with;
use crate::helpers::ALLOWED_ORIGIN;

fn header<'a>(
    resp: &'a reqwest::Response,
    name: &str,
) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Every `Vary` entry, lowercased, across repeated headers
fn vary(resp: &reqwest::Response) -> Vec<String> {
    resp.headers()
        .get_all("vary")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|v| v.trim().to_lowercase())
        .collect()
}

#[tokio::test]
async fn preflight_always_ok_with_empty_json() {
    let app = spawn_app().await;

    for origin in [None, Some(ALLOWED_ORIGIN), Some("https://evil.example")] {
        let resp = app.preflight_subscribe(origin).await;
        assert_eq!(resp.status().as_u16(), 200, "{origin:?}");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({}), "{origin:?}");
    }

    // a preflight never reaches the upstream
    let reqs = app.klaviyo_server.received_requests().await.unwrap();
    assert!(reqs.is_empty());
}

#[tokio::test]
async fn preflight_ok_even_with_no_origins_configured() {
    let app = spawn_app_with(|cfg| cfg.cors.allowed_origins.clear()).await;

    let resp = app.preflight_subscribe(Some(ALLOWED_ORIGIN)).await;
    assert_eq!(resp.status().as_u16(), 200);
    assert_eq!(header(&resp, "access-control-allow-origin"), None);
}

#[tokio::test]
async fn preflight_from_allowed_origin() {
    let app = spawn_app().await;

    let resp = app.preflight_subscribe(Some(ALLOWED_ORIGIN)).await;

    assert_eq!(
        header(&resp, "access-control-allow-origin"),
        Some(ALLOWED_ORIGIN)
    );
    assert_eq!(
        header(&resp, "access-control-allow-credentials"),
        Some("true")
    );
    assert!(header(&resp, "access-control-allow-methods")
        .unwrap()
        .contains("POST"));
    assert_eq!(
        header(&resp, "access-control-allow-headers"),
        Some("content-type")
    );
}

/// Configured with a trailing slash, sent by browsers without one
#[tokio::test]
async fn preflight_from_allowed_origin_with_trailing_slash_in_config() {
    let app = spawn_app().await;

    let resp = app
        .preflight_subscribe(Some("https://solesmes.webflow.io"))
        .await;

    assert_eq!(
        header(&resp, "access-control-allow-origin"),
        Some("https://solesmes.webflow.io")
    );
}

#[tokio::test]
async fn preflight_from_other_origin_gets_no_cors_headers() {
    let app = spawn_app().await;

    let resp = app.preflight_subscribe(Some("https://evil.example")).await;

    assert_eq!(resp.status().as_u16(), 200);
    for name in [
        "access-control-allow-origin",
        "access-control-allow-credentials",
        "access-control-allow-methods",
    ] {
        assert_eq!(header(&resp, name), None, "{name}");
    }
}

/// The front end must be able to read the upstream's error detail
#[tokio::test]
async fn error_responses_carry_cors_headers() {
    let app = spawn_app().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"errors": []})))
        .expect(1)
        .mount(&app.klaviyo_server)
        .await;

    let resp = app
        .api_client
        .post(format!("{}/subscribe", app.addr))
        .header("Origin", ALLOWED_ORIGIN)
        .json(&json!({"email": "john@foo.com"}))
        .send()
        .await
        .expect("execute request");

    assert_eq!(resp.status().as_u16(), 400);
    assert_eq!(
        header(&resp, "access-control-allow-origin"),
        Some(ALLOWED_ORIGIN)
    );
    // only preflights advertise methods
    assert_eq!(header(&resp, "access-control-allow-methods"), None);
}

/// Caches must not hand a response built for one origin to another, so the
/// answer varies on `Origin` even when no CORS headers were added
#[tokio::test]
async fn preflight_varies_on_origin_and_requested_method_and_headers() {
    let app = spawn_app().await;

    for origin in [None, Some(ALLOWED_ORIGIN), Some("https://evil.example")] {
        let resp = app.preflight_subscribe(origin).await;
        let entries = vary(&resp);
        for name in [
            "origin",
            "access-control-request-method",
            "access-control-request-headers",
        ] {
            assert!(entries.iter().any(|v| v == name), "{origin:?}: {entries:?}");
        }
    }
}

#[tokio::test]
async fn other_responses_vary_on_origin() {
    let app = spawn_app().await;

    for origin in [None, Some(ALLOWED_ORIGIN), Some("https://evil.example")] {
        let mut req = app.api_client.get(format!("{}/health_check", app.addr));
        if let Some(origin) = origin {
            req = req.header("Origin", origin);
        }
        let resp = req.send().await.expect("execute request");

        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(vary(&resp), vec!["origin".to_string()], "{origin:?}");
    }
}
