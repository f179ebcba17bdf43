//! User accounts and roles.
//!
//! `User` is the persisted shape (including the password hash). Inbound
//! adapters serialise [`PublicUser`] instead, which carries the `uid`
//! field name the API contract uses and never exposes the hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Closed set of account roles.
///
/// Serialised as the lowercase strings `admin`, `merchant` and `company`;
/// any other string fails deserialisation, which the register endpoint
/// reports as `Invalid role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Platform operator with override access to all surveys.
    Admin,
    /// Survey respondent.
    Merchant,
    /// Survey owner.
    Company,
}

impl Role {
    /// Wire-format name of the role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Merchant => "merchant",
            Self::Company => "company",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole;

impl std::fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("unknown role")
    }
}

impl std::error::Error for UnknownRole {}

impl std::str::FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "merchant" => Ok(Self::Merchant),
            "company" => Ok(Self::Company),
            _ => Err(UnknownRole),
        }
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Store-assigned identifier, unique within the store's lifetime.
    pub id: String,
    /// Unique email, compared case-sensitively as stored.
    pub email: String,
    /// Bcrypt hash of the account password.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Account role.
    pub role: Role,
    /// Creation timestamp assigned by the store.
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating a user; the store assigns id and
/// timestamp.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
}

/// Outward-facing user payload: `{uid, email, name, phone, role}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// User identifier; the contract names this field `uid`.
    pub uid: String,
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            uid: user.id.clone(),
            email: user.email.clone(),
            name: user.name.clone(),
            phone: user.phone.clone(),
            role: user.role,
        }
    }
}
