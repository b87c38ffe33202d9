//! Sign-in, registration and password reset forms.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::{UserEmail, UserName, optional};
use crate::forms::{FormError, empty_string_as_none, field_error, validate_password};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginPayload {
    pub email: UserEmail,
    pub password: String,
}

impl TryFrom<LoginForm> for LoginPayload {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        form.validate()?;
        Ok(Self {
            email: UserEmail::new(form.email).map_err(field_error("email"))?,
            password: form.password,
        })
    }
}

/// Account registration, used by the admin page and the signup endpoint.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email)]
    pub email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    /// Absent on API requests, which carry a single password field.
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RegisterPayload {
    pub email: UserEmail,
    pub name: Option<UserName>,
    pub password: String,
}

impl TryFrom<RegisterForm> for RegisterPayload {
    type Error = FormError;

    fn try_from(form: RegisterForm) -> Result<Self, Self::Error> {
        form.validate()?;
        if form
            .confirm_password
            .as_ref()
            .is_some_and(|confirm| *confirm != form.password)
        {
            return Err(FormError::PasswordMismatch);
        }
        Ok(Self {
            email: UserEmail::new(form.email).map_err(field_error("email"))?,
            name: optional(form.name, UserName::new).map_err(field_error("name"))?,
            password: form.password,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordForm {
    #[validate(email)]
    pub email: String,
}

impl TryFrom<ForgotPasswordForm> for UserEmail {
    type Error = FormError;

    fn try_from(form: ForgotPasswordForm) -> Result<Self, Self::Error> {
        form.validate()?;
        UserEmail::new(form.email).map_err(field_error("email"))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordForm {
    #[validate(email)]
    pub email: String,
    #[serde(alias = "resetCode")]
    #[validate(length(min = 1))]
    pub token: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
    #[serde(default, alias = "confirmPassword")]
    pub confirm_password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ResetPasswordPayload {
    pub email: UserEmail,
    pub token: String,
    pub password: String,
}

impl TryFrom<ResetPasswordForm> for ResetPasswordPayload {
    type Error = FormError;

    fn try_from(form: ResetPasswordForm) -> Result<Self, Self::Error> {
        form.validate()?;
        if form
            .confirm_password
            .as_ref()
            .is_some_and(|confirm| *confirm != form.password)
        {
            return Err(FormError::PasswordMismatch);
        }
        Ok(Self {
            email: UserEmail::new(form.email).map_err(field_error("email"))?,
            token: form.token.trim().to_string(),
            password: form.password,
        })
    }
}
