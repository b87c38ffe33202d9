use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::client::{NewClient, UpdateClient};
use crate::domain::sort::ClientSort;
use crate::domain::types::{
    Address, ClientName, Description, PhoneNumber, TypeConstraintError, UserId, optional,
};
use crate::forms::{
    FormError, empty_string_as_none, encode_query, field_error, parse_page, parse_sort,
};
use crate::repository::ClientListQuery;

/// Query string accepted by the client list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientFilterForm {
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub search_string: Option<String>,
    /// `true` keeps clients linked to a user, `false` the unlinked ones.
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub has_user: Option<String>,
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

impl ClientFilterForm {
    pub fn filter_query(&self) -> String {
        encode_query(&Self {
            sort_order: None,
            page_number: None,
            ..self.clone()
        })
    }

    pub fn current_sort(&self) -> Option<ClientSort> {
        self.sort_order.as_deref().and_then(|s| s.parse().ok())
    }
}

impl TryFrom<&ClientFilterForm> for ClientListQuery {
    type Error = FormError;

    fn try_from(form: &ClientFilterForm) -> Result<Self, Self::Error> {
        let mut query = ClientListQuery::default().sort(parse_sort(form.sort_order.as_deref())?);
        query.page = parse_page(form.page_number.as_deref(), form.page_size.as_deref())?;

        if let Some(search) = &form.search_string {
            query = query.search(search.trim());
        }
        if let Some(has_user) = &form.has_user {
            let has_user = has_user
                .trim()
                .parse::<bool>()
                .map_err(|_| FormError::Field {
                    field: "hasUser",
                    source: TypeConstraintError::InvalidValue(has_user.clone()),
                })?;
            query = query.has_user(has_user);
        }
        Ok(query)
    }
}

/// Create/edit form for a client.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct ClientForm {
    #[validate(length(min = 3, max = 100))]
    pub name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientPayload {
    pub user_id: Option<UserId>,
    pub name: ClientName,
    pub address: Option<Address>,
    pub phone: Option<PhoneNumber>,
    pub description: Option<Description>,
    pub version: Option<i32>,
}

impl TryFrom<ClientForm> for ClientPayload {
    type Error = FormError;

    fn try_from(form: ClientForm) -> Result<Self, Self::Error> {
        form.validate()?;

        Ok(Self {
            user_id: optional(form.user_id, |id| id.parse::<UserId>())
                .map_err(field_error("user"))?,
            name: ClientName::new(form.name).map_err(field_error("name"))?,
            address: optional(form.address, Address::new).map_err(field_error("address"))?,
            phone: optional(form.phone, PhoneNumber::new).map_err(field_error("phone"))?,
            description: optional(form.description, Description::new)
                .map_err(field_error("description"))?,
            version: form.version,
        })
    }
}

impl ClientPayload {
    pub fn into_new(self) -> NewClient {
        NewClient {
            user_id: self.user_id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            description: self.description,
        }
    }

    pub fn into_update(self) -> Result<UpdateClient, FormError> {
        let version = self.version.ok_or(FormError::MissingVersion)?;
        Ok(UpdateClient {
            user_id: self.user_id,
            name: self.name,
            address: self.address,
            phone: self.phone,
            description: self.description,
            version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_fails_validation() {
        let form = ClientForm {
            name: "Al".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            ClientPayload::try_from(form),
            Err(FormError::Validation(_))
        ));
    }

    #[test]
    fn optional_fields_are_normalized() {
        let user_id = UserId::generate();
        let form = ClientForm {
            name: "Alice Smith".to_string(),
            user_id: Some(user_id.to_string()),
            phone: Some("+1 415 555 2671".to_string()),
            address: Some("  1 Main St ".to_string()),
            version: Some(2),
            ..Default::default()
        };
        let update = ClientPayload::try_from(form).unwrap().into_update().unwrap();
        assert_eq!(update.user_id, Some(user_id));
        assert_eq!(update.phone.unwrap().as_str(), "+14155552671");
        assert_eq!(update.address.unwrap().as_str(), "1 Main St");
        assert_eq!(update.description, None);
        assert_eq!(update.version, 2);
    }

    #[test]
    fn bad_user_id_is_reported() {
        let form = ClientForm {
            name: "Alice Smith".to_string(),
            user_id: Some("not-a-uuid".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            ClientPayload::try_from(form),
            Err(FormError::Field { field: "user", .. })
        ));
    }

    #[test]
    fn has_user_filter() {
        let filter = ClientFilterForm {
            has_user: Some("false".to_string()),
            sort_order: Some("user_desc".to_string()),
            ..Default::default()
        };
        let query = ClientListQuery::try_from(&filter).unwrap();
        assert_eq!(query.has_user, Some(false));
        assert!(query.sort.is_desc());

        let filter = ClientFilterForm {
            has_user: Some("maybe".to_string()),
            ..Default::default()
        };
        assert!(ClientListQuery::try_from(&filter).is_err());
    }
}
