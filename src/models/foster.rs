//! Diesel models for foster assignments.

use chrono::NaiveDate;
use diesel::prelude::*;

use crate::domain::foster::{
    Foster as DomainFoster, NewFoster as DomainNewFoster, UpdateFoster as DomainUpdateFoster,
};
use crate::domain::types::{ClientId, FosterDescription, FosterId, PetId, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::fosters)]
pub struct Foster {
    pub id: i32,
    pub client_id: Option<i32>,
    pub pet_id: Option<i32>,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub version: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::fosters)]
pub struct NewFoster<'a> {
    pub client_id: Option<i32>,
    pub pet_id: Option<i32>,
    pub description: Option<&'a str>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::fosters)]
#[diesel(treat_none_as_null = true)]
pub struct UpdateFoster<'a> {
    pub client_id: Option<i32>,
    pub pet_id: Option<i32>,
    pub description: Option<&'a str>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl TryFrom<Foster> for DomainFoster {
    type Error = TypeConstraintError;

    fn try_from(foster: Foster) -> Result<Self, Self::Error> {
        Ok(Self {
            id: FosterId::try_from(foster.id)?,
            client_id: foster.client_id.map(ClientId::try_from).transpose()?,
            pet_id: foster.pet_id.map(PetId::try_from).transpose()?,
            description: foster
                .description
                .map(FosterDescription::new)
                .transpose()?,
            start_date: foster.start_date,
            end_date: foster.end_date,
            version: foster.version,
        })
    }
}

impl<'a> From<&'a DomainNewFoster> for NewFoster<'a> {
    fn from(foster: &'a DomainNewFoster) -> Self {
        Self {
            client_id: Some(foster.client_id.get()),
            pet_id: Some(foster.pet_id.get()),
            description: foster.description.as_ref().map(FosterDescription::as_str),
            start_date: foster.start_date,
            end_date: foster.end_date,
        }
    }
}

impl<'a> From<&'a DomainUpdateFoster> for UpdateFoster<'a> {
    fn from(foster: &'a DomainUpdateFoster) -> Self {
        Self {
            client_id: Some(foster.client_id.get()),
            pet_id: Some(foster.pet_id.get()),
            description: foster.description.as_ref().map(FosterDescription::as_str),
            start_date: foster.start_date,
            end_date: foster.end_date,
        }
    }
}
