use serde::Serialize;

use super::SubscriberEmail;

/// Single opt-in: the profile is marked as consented straight away, no
/// confirmation email is sent by the provider.
pub const CONSENT_SUBSCRIBED: &str = "SUBSCRIBED";

/// JSON:API document accepted by the provider's client subscription endpoint.
/// Serialises to:
///
/// ```json
/// {"data": {"type": "subscription",
///   "attributes": {"profile": {"data": {"type": "profile",
///     "attributes": {"email": "john@foo.com",
///       "subscriptions": {"email": {"marketing": {"consent": "SUBSCRIBED"}}}}}}},
///   "relationships": {"list": {"data": {"type": "list", "id": "AbC123"}}}}}
/// ```
#[derive(Serialize, Debug)]
pub struct SubscriptionPayload<'a> {
    data: SubscriptionData<'a>,
}

#[derive(Serialize, Debug)]
struct SubscriptionData<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: SubscriptionAttributes<'a>,
    relationships: Relationships<'a>,
}

#[derive(Serialize, Debug)]
struct SubscriptionAttributes<'a> {
    profile: Profile<'a>,
}

#[derive(Serialize, Debug)]
struct Profile<'a> {
    data: ProfileData<'a>,
}

#[derive(Serialize, Debug)]
struct ProfileData<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    attributes: ProfileAttributes<'a>,
}

#[derive(Serialize, Debug)]
struct ProfileAttributes<'a> {
    email: &'a str,
    subscriptions: Subscriptions,
}

#[derive(Serialize, Debug)]
struct Subscriptions {
    email: EmailChannel,
}

#[derive(Serialize, Debug)]
struct EmailChannel {
    marketing: Marketing,
}

#[derive(Serialize, Debug)]
struct Marketing {
    consent: &'static str,
}

#[derive(Serialize, Debug)]
struct Relationships<'a> {
    list: ListRelationship<'a>,
}

#[derive(Serialize, Debug)]
struct ListRelationship<'a> {
    data: ListData<'a>,
}

#[derive(Serialize, Debug)]
struct ListData<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    id: &'a str,
}

impl<'a> SubscriptionPayload<'a> {
    pub fn new(
        email: &'a SubscriberEmail,
        list_id: &'a str,
    ) -> Self {
        Self {
            data: SubscriptionData {
                kind: "subscription",
                attributes: SubscriptionAttributes {
                    profile: Profile {
                        data: ProfileData {
                            kind: "profile",
                            attributes: ProfileAttributes {
                                email: email.as_ref(),
                                subscriptions: Subscriptions {
                                    email: EmailChannel {
                                        marketing: Marketing {
                                            consent: CONSENT_SUBSCRIBED,
                                        },
                                    },
                                },
                            },
                        },
                    },
                },
                relationships: Relationships {
                    list: ListRelationship {
                        data: ListData {
                            kind: "list",
                            id: list_id,
                        },
                    },
                },
            },
        }
    }
}
