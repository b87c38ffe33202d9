//! Forms for listing and editing pets.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::pet::{Gender, NewPet, Species, UpdatePet};
use crate::domain::sort::PetSort;
use crate::domain::types::{Description, PetAge, PetName, optional};
use crate::forms::{
    FormError, empty_string_as_none, encode_query, field_error, parse_optional_number,
    parse_page, parse_sort,
};
use crate::repository::PetListQuery;

/// Query string accepted by the pet lists.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PetFilterForm {
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
    pub animal_species: Option<String>,
    #[serde(
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub animal_gender: Option<String>,
    #[serde(
        rename = "age_gte",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub age_gte: Option<String>,
    #[serde(
        rename = "age_lte",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub age_lte: Option<String>,
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

impl PetFilterForm {
    /// Filters only, without sort order or paging, for building links.
    pub fn filter_query(&self) -> String {
        encode_query(&Self {
            sort_order: None,
            page_number: None,
            ..self.clone()
        })
    }

    /// Sort key in effect, ignoring an unparsable one.
    pub fn current_sort(&self) -> Option<PetSort> {
        self.sort_order.as_deref().and_then(|s| s.parse().ok())
    }
}

impl TryFrom<&PetFilterForm> for PetListQuery {
    type Error = FormError;

    fn try_from(form: &PetFilterForm) -> Result<Self, Self::Error> {
        let mut query = PetListQuery::default()
            .sort(parse_sort(form.sort_order.as_deref())?)
            .age_between(
                parse_optional_number("age_gte", form.age_gte.as_deref())?,
                parse_optional_number("age_lte", form.age_lte.as_deref())?,
            );
        query.page = parse_page(form.page_number.as_deref(), form.page_size.as_deref())?;

        if let Some(search) = &form.search_string {
            query = query.search(search.trim());
        }
        if let Some(species) = &form.animal_species {
            query = query.species(
                species
                    .parse::<Species>()
                    .map_err(field_error("animalSpecies"))?,
            );
        }
        if let Some(gender) = &form.animal_gender {
            query = query.gender(gender.parse::<Gender>().map_err(field_error("animalGender"))?);
        }
        Ok(query)
    }
}

/// Create/edit form for a pet.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct PetForm {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub species: String,
    pub gender: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub age: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
}

/// Validated pet fields shared by create and update.
#[derive(Debug, Clone, PartialEq)]
pub struct PetPayload {
    pub name: PetName,
    pub species: Species,
    pub gender: Gender,
    pub age: Option<PetAge>,
    pub description: Option<Description>,
    pub version: Option<i32>,
}

impl TryFrom<PetForm> for PetPayload {
    type Error = FormError;

    fn try_from(form: PetForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let age = parse_optional_number::<i32>("age", form.age.as_deref())?
            .map(PetAge::new)
            .transpose()
            .map_err(field_error("age"))?;

        Ok(Self {
            name: PetName::new(form.name).map_err(field_error("name"))?,
            species: form.species.parse().map_err(field_error("species"))?,
            gender: form.gender.parse().map_err(field_error("gender"))?,
            age,
            description: optional(form.description, Description::new)
                .map_err(field_error("description"))?,
            version: form.version,
        })
    }
}

impl PetPayload {
    pub fn into_new(self) -> NewPet {
        NewPet {
            name: self.name,
            species: self.species,
            gender: self.gender,
            age: self.age,
            description: self.description,
        }
    }

    pub fn into_update(self) -> Result<UpdatePet, FormError> {
        let version = self.version.ok_or(FormError::MissingVersion)?;
        Ok(UpdatePet {
            name: self.name,
            species: self.species,
            gender: self.gender,
            age: self.age,
            description: self.description,
            version,
        })
    }
}
