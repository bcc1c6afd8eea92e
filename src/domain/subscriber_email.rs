use std::fmt::Display;

use validator::ValidateEmail;

/// An email address that has at least the basic shape of one. Whether the
/// address actually exists is for the upstream provider to decide.
///
/// Must be instantiated with `SubscriberEmail::parse`; the field is left
/// private so that `parse` cannot be bypassed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberEmail(String);

impl SubscriberEmail {
    /// Surrounding whitespace (e.g. from a pasted address) is dropped before
    /// validation.
    pub fn parse(email: String) -> Result<Self, String> {
        let email = email.trim().to_string();
        if email.is_empty() {
            return Err("Email must not be empty.".to_string());
        }
        ValidateEmail::validate_email(&email)
            .then_some(Self(email.clone()))
            .ok_or(format!("{email:?} is not a valid email address."))
    }
}

impl AsRef<str> for SubscriberEmail {
    fn as_ref(&self) -> &str { &self.0 }
}

impl Display for SubscriberEmail {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
