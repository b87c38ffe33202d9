//! Diesel models for user accounts.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::types::{PhoneNumber, TypeConstraintError, UserEmail, UserId, UserName};
use crate::domain::user::{
    NewUser as DomainNewUser, UpdateUser as DomainUpdateUser, User as DomainUser,
    UserCredentials,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::users)]
/// Diesel model for [`crate::domain::user::User`], secrets included.
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub password_hash: Option<String>,
    pub reset_token_hash: Option<String>,
    pub reset_token_expires_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub version: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::users)]
pub struct NewUser<'a> {
    pub id: String,
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub role: &'a str,
    pub password_hash: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::users)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateUser<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub role: &'a str,
}

impl TryFrom<User> for DomainUser {
    type Error = TypeConstraintError;

    fn try_from(user: User) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::try_from(user.id)?,
            email: UserEmail::new(user.email)?,
            name: user.name.map(UserName::new).transpose()?,
            phone: user.phone.map(PhoneNumber::new).transpose()?,
            role: user.role.parse()?,
            created_at: user.created_at,
            version: user.version,
        })
    }
}

impl TryFrom<User> for UserCredentials {
    type Error = TypeConstraintError;

    fn try_from(mut user: User) -> Result<Self, Self::Error> {
        let password_hash = user.password_hash.take();
        let reset_token_hash = user.reset_token_hash.take();
        let reset_token_expires_at = user.reset_token_expires_at.take();
        Ok(Self {
            user: DomainUser::try_from(user)?,
            password_hash,
            reset_token_hash,
            reset_token_expires_at,
        })
    }
}

impl<'a> From<&'a DomainNewUser> for NewUser<'a> {
    fn from(user: &'a DomainNewUser) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.as_str(),
            name: user.name.as_ref().map(UserName::as_str),
            phone: user.phone.as_ref().map(PhoneNumber::as_str),
            role: user.role.as_str(),
            password_hash: user.password_hash.as_deref(),
        }
    }
}

impl<'a> From<&'a DomainUpdateUser> for UpdateUser<'a> {
    fn from(user: &'a DomainUpdateUser) -> Self {
        Self {
            email: user.email.as_str(),
            name: user.name.as_ref().map(UserName::as_str),
            phone: user.phone.as_ref().map(PhoneNumber::as_str),
            role: user.role.as_str(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;

    fn db_user() -> User {
        User {
            id: UserId::generate().to_string(),
            email: "Ann@Example.com".to_string(),
            name: Some("Ann".to_string()),
            phone: None,
            role: "ADMIN".to_string(),
            password_hash: Some("hash".to_string()),
            reset_token_hash: None,
            reset_token_expires_at: None,
            created_at: NaiveDateTime::default(),
            version: 1,
        }
    }

    #[test]
    fn user_into_domain_normalizes_email() {
        let user = DomainUser::try_from(db_user()).unwrap();
        assert_eq!(user.email.as_str(), "ann@example.com");
        assert_eq!(user.role, UserRole::Admin);
    }

    #[test]
    fn credentials_keep_secrets() {
        let credentials = UserCredentials::try_from(db_user()).unwrap();
        assert_eq!(credentials.password_hash.as_deref(), Some("hash"));
        assert!(credentials.reset_token_hash.is_none());
    }

    #[test]
    fn invalid_id_is_rejected() {
        let mut user = db_user();
        user.id = "42".to_string();
        assert!(DomainUser::try_from(user).is_err());
    }
}
