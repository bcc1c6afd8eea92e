use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::Method;
use actix_web::web;
use actix_web::App;
use actix_web::HttpServer;
use actix_web_lab::middleware::from_fn;
use anyhow::Context;
use tracing_actix_web::TracingLogger;

use crate::configuration::Settings;
use crate::cors::apply_cors;
use crate::cors::CorsPolicy;
use crate::klaviyo_client::KlaviyoClient;
use crate::routes::health_check;
use crate::routes::json_config;
use crate::routes::subscribe;
use crate::routes::subscribe_preflight;

/// Wrapper for actix's `Server` with access to the bound port. Not to be
/// confused with actix's `App`!
pub struct Application {
    /// Left private; use `get_port` to access
    port: u16,
    server: Server,
}

impl Application {
    /// Bind the configured address and build the `Server`. Nothing is served
    /// until `run_until_stopped` is awaited.
    pub fn build(cfg: Settings) -> Result<Self, anyhow::Error> {
        let addr = format!("{}:{}", cfg.application.host, cfg.application.port);
        let listener = TcpListener::bind(&addr).with_context(|| format!("could not bind {addr}"))?;

        // with port 0 the OS picks one; this is what gets reported
        let port = listener.local_addr()?.port();

        let timeout = cfg.klaviyo.timeout();
        let klaviyo_client = KlaviyoClient::new(
            cfg.klaviyo.base_url,
            cfg.klaviyo.api_key,
            cfg.klaviyo.list_id,
            timeout,
        )
        .context("could not build upstream http client")?;

        let cors_policy = CorsPolicy::from(&cfg.cors);

        let server = run(listener, klaviyo_client, cors_policy)?;

        Ok(Self { port, server })
    }

    pub fn get_port(&self) -> u16 { self.port }

    /// Because this consumes `self`, this should be the final function call (or
    /// passed to `tokio::spawn`)
    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> { self.server.await }
}

/// The server is not responsible for binding to an address, it only listens to
/// an already bound address.
///
/// Declares all API endpoints.
pub fn run(
    listener: TcpListener,
    klaviyo_client: KlaviyoClient,
    cors_policy: CorsPolicy,
) -> Result<Server, std::io::Error> {
    // `Data` is an `Arc` underneath, so every worker shares the same client
    // (and connection pool)
    let klaviyo_client = web::Data::new(klaviyo_client);
    let cors_policy = web::Data::new(cors_policy);

    // one `App` per worker, each built by calling this closure
    let server = HttpServer::new(move || {
        App::new()
            // the last `wrap` is the outermost: requests enter the tracing span
            // first, so CORS decisions are logged under the request id
            .wrap(from_fn(apply_cors))
            .wrap(TracingLogger::default())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::resource("/subscribe")
                    .route(web::post().to(subscribe))
                    .route(web::method(Method::OPTIONS).to(subscribe_preflight)),
            )
            .app_data(json_config())
            .app_data(klaviyo_client.clone())
            .app_data(cors_policy.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
