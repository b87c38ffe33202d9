use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::sort::UserSort;
use crate::domain::types::{PhoneNumber, UserEmail, UserId, UserName, optional};
use crate::domain::user::{NewUser, UpdateUser, UserRole};
use crate::forms::{
    FormError, empty_string_as_none, encode_query, field_error, parse_page, parse_sort,
    validate_password,
};
use crate::repository::UserListQuery;

/// Query string accepted by the user list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilterForm {
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub search_string: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_role: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub sort_order: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_size: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub page_number: Option<String>,
}

impl UserFilterForm {
    pub fn filter_query(&self) -> String {
        encode_query(&Self {
            sort_order: None,
            page_number: None,
            ..self.clone()
        })
    }

    pub fn current_sort(&self) -> Option<UserSort> {
        self.sort_order.as_deref().and_then(|s| s.parse().ok())
    }
}

impl TryFrom<&UserFilterForm> for UserListQuery {
    type Error = FormError;

    fn try_from(form: &UserFilterForm) -> Result<Self, Self::Error> {
        let mut query = UserListQuery::default().sort(parse_sort(form.sort_order.as_deref())?);
        query.page = parse_page(form.page_number.as_deref(), form.page_size.as_deref())?;

        if let Some(search) = &form.search_string {
            query = query.search(search.trim());
        }
        if let Some(role) = &form.user_role {
            query = query.role(role.parse::<UserRole>().map_err(field_error("userRole"))?);
        }
        Ok(query)
    }
}

/// Admin create/edit form for a user account.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct UserForm {
    #[validate(email)]
    pub email: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
    pub role: String,
    /// Only read on create; blank leaves the account without a password.
    #[serde(default, deserialize_with = "empty_string_as_none", skip_serializing)]
    #[validate(custom(function = "validate_password"))]
    pub password: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPayload {
    pub email: UserEmail,
    pub name: Option<UserName>,
    pub phone: Option<PhoneNumber>,
    pub role: UserRole,
    pub password: Option<String>,
    pub version: Option<i32>,
}

impl TryFrom<UserForm> for UserPayload {
    type Error = FormError;

    fn try_from(form: UserForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            email: UserEmail::new(form.email).map_err(field_error("email"))?,
            name: optional(form.name, UserName::new).map_err(field_error("name"))?,
            phone: optional(form.phone, PhoneNumber::new).map_err(field_error("phone"))?,
            role: form.role.parse().map_err(field_error("role"))?,
            password: form.password,
            version: form.version,
        })
    }
}

impl UserPayload {
    pub fn into_new(self, id: UserId, password_hash: Option<String>) -> NewUser {
        NewUser {
            id,
            email: self.email,
            name: self.name,
            phone: self.phone,
            role: self.role,
            password_hash,
        }
    }

    pub fn into_update(self) -> Result<UpdateUser, FormError> {
        let version = self.version.ok_or(FormError::MissingVersion)?;
        Ok(UpdateUser {
            email: self.email,
            name: self.name,
            phone: self.phone,
            role: self.role,
            version,
        })
    }
}
