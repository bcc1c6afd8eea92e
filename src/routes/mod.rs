mod health_check;
mod subscriptions;
// allow external `use` statements to skip `subscriptions` etc
pub use health_check::health_check;
pub use subscriptions::json_config;
pub use subscriptions::subscribe;
pub use subscriptions::subscribe_preflight;
