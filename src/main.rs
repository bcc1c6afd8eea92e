use subscription_relay::configuration::get_configuration;
use subscription_relay::startup::Application;
use subscription_relay::telemetry::get_subscriber;
use subscription_relay::telemetry::init_subscriber;

/// Initialise telemetry, load config, and start the server
#[tokio::main] // requires tokio features: macros, rt-multi-thread
async fn main() -> Result<(), anyhow::Error> {
    // `.env` is for local development only; deployments set the vars directly
    let _ = dotenvy::dotenv();

    let subscriber = get_subscriber("subscription-relay", "info", std::io::stdout);
    init_subscriber(subscriber)?;

    let cfg = get_configuration()?;

    let app = Application::build(cfg)?;
    tracing::info!(port = app.get_port(), "subscription relay listening");

    if let Err(e) = app.run_until_stopped().await {
        tracing::error!(
            error.cause_chain=?e,
            error.message=%e,
            "server exited with an error"
        );
        return Err(e.into());
    }

    tracing::info!("server exited gracefully");
    Ok(())
}
