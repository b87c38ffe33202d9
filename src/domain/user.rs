use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{PhoneNumber, TypeConstraintError, UserEmail, UserId, UserName};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserRole {
    Admin,
    #[default]
    User,
}

impl UserRole {
    pub const ALL: [UserRole; 2] = [UserRole::Admin, UserRole::User];

    pub fn as_str(self) -> &'static str {
        match self {
            UserRole::Admin => "ADMIN",
            UserRole::User => "USER",
        }
    }
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(UserRole::Admin),
            "USER" => Ok(UserRole::User),
            _ => Err(TypeConstraintError::InvalidValue(format!(
                "unknown role `{s}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: UserId,
    pub email: UserEmail,
    pub name: Option<UserName>,
    pub phone: Option<PhoneNumber>,
    pub role: UserRole,
    pub created_at: NaiveDateTime,
    pub version: i32,
}

impl User {
    /// Name shown in the UI, falling back to the email address.
    pub fn display_name(&self) -> &str {
        self.name
            .as_ref()
            .map(|name| name.as_str())
            .unwrap_or_else(|| self.email.as_str())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewUser {
    pub id: UserId,
    pub email: UserEmail,
    pub name: Option<UserName>,
    pub phone: Option<PhoneNumber>,
    pub role: UserRole,
    pub password_hash: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateUser {
    pub email: UserEmail,
    pub name: Option<UserName>,
    pub phone: Option<PhoneNumber>,
    pub role: UserRole,
    pub version: i32,
}

/// A user together with the secrets stored next to it.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: Option<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<NaiveDateTime>,
}
