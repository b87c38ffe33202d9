use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foster::{NewFoster, UpdateFoster};
use crate::domain::sort::FosterSort;
use crate::domain::types::{ClientId, FosterDescription, PetId, optional};
use crate::forms::{
    FormError, empty_string_as_none, encode_query, field_error, parse_date, parse_optional_date,
    parse_optional_number, parse_page, parse_sort,
};
use crate::repository::FosterListQuery;

/// Query string accepted by the foster list.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FosterFilterForm {
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub search_string: Option<String>,
    #[serde(
        rename = "startDate_gte",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date_gte: Option<String>,
    #[serde(
        rename = "startDate_lt",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date_lt: Option<String>,
    #[serde(
        rename = "endDate_gte",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date_gte: Option<String>,
    #[serde(
        rename = "endDate_lt",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date_lt: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub client_id: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub pet_id: Option<String>,
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

impl FosterFilterForm {
    pub fn filter_query(&self) -> String {
        encode_query(&Self {
            sort_order: None,
            page_number: None,
            ..self.clone()
        })
    }

    pub fn current_sort(&self) -> Option<FosterSort> {
        self.sort_order.as_deref().and_then(|s| s.parse().ok())
    }
}

impl TryFrom<&FosterFilterForm> for FosterListQuery {
    type Error = FormError;

    fn try_from(form: &FosterFilterForm) -> Result<Self, Self::Error> {
        let mut query = FosterListQuery::default().sort(parse_sort(form.sort_order.as_deref())?);
        query.page = parse_page(form.page_number.as_deref(), form.page_size.as_deref())?;
        query.start_date_gte =
            parse_optional_date("startDate_gte", form.start_date_gte.as_deref())?;
        query.start_date_lt = parse_optional_date("startDate_lt", form.start_date_lt.as_deref())?;
        query.end_date_gte = parse_optional_date("endDate_gte", form.end_date_gte.as_deref())?;
        query.end_date_lt = parse_optional_date("endDate_lt", form.end_date_lt.as_deref())?;

        if let Some(search) = &form.search_string {
            query = query.search(search.trim());
        }
        if let Some(client_id) =
            parse_optional_number::<i32>("clientId", form.client_id.as_deref())?
        {
            query = query.client(ClientId::new(client_id).map_err(field_error("clientId"))?);
        }
        if let Some(pet_id) = parse_optional_number::<i32>("petId", form.pet_id.as_deref())? {
            query = query.pet(PetId::new(pet_id).map_err(field_error("petId"))?);
        }
        Ok(query)
    }
}

/// Create/edit form for a foster assignment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FosterForm {
    pub client_id: i32,
    pub pet_id: i32,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    pub start_date: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FosterPayload {
    pub client_id: ClientId,
    pub pet_id: PetId,
    pub description: Option<FosterDescription>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub version: Option<i32>,
}

impl TryFrom<FosterForm> for FosterPayload {
    type Error = FormError;

    fn try_from(form: FosterForm) -> Result<Self, Self::Error> {
        Ok(Self {
            client_id: ClientId::new(form.client_id).map_err(field_error("client"))?,
            pet_id: PetId::new(form.pet_id).map_err(field_error("pet"))?,
            description: optional(form.description, FosterDescription::new)
                .map_err(field_error("description"))?,
            start_date: parse_date("start date", &form.start_date)?,
            end_date: parse_optional_date("end date", form.end_date.as_deref())?,
            version: form.version,
        })
    }
}

impl FosterPayload {
    pub fn into_new(self) -> NewFoster {
        NewFoster {
            client_id: self.client_id,
            pet_id: self.pet_id,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }

    pub fn into_update(self) -> Result<UpdateFoster, FormError> {
        let version = self.version.ok_or(FormError::MissingVersion)?;
        Ok(UpdateFoster {
            client_id: self.client_id,
            pet_id: self.pet_id,
            description: self.description,
            start_date: self.start_date,
            end_date: self.end_date,
            version,
        })
    }
}
