mod subscribe_request;
mod subscriber_email;
mod subscription_payload;
// allow external `use` statements to skip `subscriber_email` etc
pub use subscribe_request::SubscribeRequest;
pub use subscriber_email::SubscriberEmail;
pub use subscription_payload::SubscriptionPayload;
