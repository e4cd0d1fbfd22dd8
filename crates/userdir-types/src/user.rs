//! User types

use serde::{Deserialize, Serialize};

/// A stored user record.
///
/// The identifier is serialized as `ID`; existing clients and cached values
/// depend on that spelling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "ID")]
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// A user that has not been assigned an identifier yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
}

impl NewUser {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Attach the identifier the store assigned
    pub fn with_id(self, id: i64) -> User {
        User {
            id,
            name: self.name,
            email: self.email,
        }
    }
}

/// Create-user request body as sent by clients.
///
/// Fields are optional here so that a missing field surfaces as a rejected
/// request instead of a deserializer error with a different status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserRegistration {
    #[serde(default, rename = "ID", alias = "id")]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl UserRegistration {
    /// Turn the request into a [`NewUser`].
    ///
    /// Returns `None` when `name` or `email` is missing or blank, or when the
    /// caller tried to pick the identifier.
    pub fn into_new_user(self) -> Option<NewUser> {
        if self.id.is_some() {
            return None;
        }
        let name = self.name.filter(|s| !s.trim().is_empty())?;
        let email = self.email.filter(|s| !s.trim().is_empty())?;
        Some(NewUser { name, email })
    }
}
