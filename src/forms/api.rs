//! JSON request bodies of the `/api` endpoints.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::domain::types::{FosterDescription, PetId, PhoneNumber, UserEmail, UserName, optional};
use crate::forms::{FormError, field_error};

/// Paging of the caller's own fosters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page_number: Option<usize>,
    pub page_size: Option<usize>,
}

/// Body of `POST /api/foster`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFosterRequest {
    pub pet_id: i32,
    #[serde(default)]
    pub description: Option<String>,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFosterPayload {
    pub pet_id: PetId,
    pub description: Option<FosterDescription>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl TryFrom<CreateFosterRequest> for CreateFosterPayload {
    type Error = FormError;

    fn try_from(request: CreateFosterRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            pet_id: PetId::new(request.pet_id).map_err(field_error("petId"))?,
            description: optional(request.description, FosterDescription::new)
                .map_err(field_error("description"))?,
            start_date: request.start_date,
            end_date: request.end_date,
        })
    }
}

/// Body of `PATCH /api/users/me`; absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateMeRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Changes to apply; `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateMePayload {
    pub email: Option<UserEmail>,
    pub name: Option<Option<UserName>>,
    pub phone: Option<Option<PhoneNumber>>,
}

impl TryFrom<UpdateMeRequest> for UpdateMePayload {
    type Error = FormError;

    fn try_from(request: UpdateMeRequest) -> Result<Self, Self::Error> {
        let email = request
            .email
            .map(UserEmail::new)
            .transpose()
            .map_err(field_error("email"))?;
        let name = request
            .name
            .map(|name| optional(Some(name), UserName::new))
            .transpose()
            .map_err(field_error("name"))?;
        let phone = request
            .phone
            .map(|phone| optional(Some(phone), PhoneNumber::new))
            .transpose()
            .map_err(field_error("phone"))?;
        Ok(Self { email, name, phone })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_foster_from_json() {
        let request: CreateFosterRequest = serde_json::from_str(
            r#"{"petId": 4, "startDate": "2024-01-01", "endDate": "2024-01-20"}"#,
        )
        .unwrap();
        let payload = CreateFosterPayload::try_from(request).unwrap();
        assert_eq!(payload.pet_id, PetId::new(4).unwrap());
        assert_eq!(payload.end_date, NaiveDate::from_ymd_opt(2024, 1, 20));
        assert_eq!(payload.description, None);
    }

    #[test]
    fn patch_distinguishes_absent_and_blank() {
        let request: UpdateMeRequest =
            serde_json::from_str(r#"{"name": "  ", "email": "me@example.com"}"#).unwrap();
        let payload = UpdateMePayload::try_from(request).unwrap();
        assert_eq!(payload.email.unwrap().as_str(), "me@example.com");
        assert_eq!(payload.name, Some(None));
        assert_eq!(payload.phone, None);
    }

    #[test]
    fn patch_rejects_bad_email() {
        let request = UpdateMeRequest {
            email: Some("nope".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            UpdateMePayload::try_from(request),
            Err(FormError::Field { field: "email", .. })
        ));
    }
}
