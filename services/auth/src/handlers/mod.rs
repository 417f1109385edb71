pub mod auth;
pub mod code;
pub mod user;

use serde::Deserialize;

use crate::domain::types::Identifier;
use crate::error::AuthServiceError;

/// `email` / `phone` pair shared by request bodies. Exactly one must be set;
/// blank strings count as absent.
#[derive(Debug, Default, Deserialize)]
pub struct IdentifierFields {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl IdentifierFields {
    pub fn into_identifier(self) -> Result<Identifier, AuthServiceError> {
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());
        match (present(self.email), present(self.phone)) {
            (Some(email), None) => Identifier::email(&email),
            (None, Some(phone)) => Identifier::phone(&phone),
            _ => Err(AuthServiceError::InvalidIdentifier),
        }
    }
}
