use serde::Deserialize;

use super::SubscriberEmail;

/// Body of `POST /subscribe`, as sent by the front end: `{"email": "..."}`.
/// Unknown fields are ignored.
#[derive(Deserialize, Debug)]
pub struct SubscribeRequest {
    pub email: String,
}

impl TryFrom<SubscribeRequest> for SubscriberEmail {
    type Error = String;
    fn try_from(value: SubscribeRequest) -> Result<Self, Self::Error> {
        SubscriberEmail::parse(value.email)
    }
}
