//! Diesel models for pets.

use diesel::prelude::*;

use crate::domain::pet::{
    NewPet as DomainNewPet, Pet as DomainPet, UpdatePet as DomainUpdatePet,
};
use crate::domain::types::{Description, PetAge, PetId, PetName, TypeConstraintError};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::pets)]
/// Diesel model for [`crate::domain::pet::Pet`].
pub struct Pet {
    pub id: i32,
    pub name: String,
    pub species: String,
    pub gender: String,
    pub age: Option<i32>,
    pub description: Option<String>,
    pub version: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::pets)]
/// Insertable form of [`Pet`].
pub struct NewPet<'a> {
    pub name: &'a str,
    pub species: &'a str,
    pub gender: &'a str,
    pub age: Option<i32>,
    pub description: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::pets)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Pet`] record.
pub struct UpdatePet<'a> {
    pub name: &'a str,
    pub species: &'a str,
    pub gender: &'a str,
    pub age: Option<i32>,
    pub description: Option<&'a str>,
}

impl TryFrom<Pet> for DomainPet {
    type Error = TypeConstraintError;

    fn try_from(pet: Pet) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PetId::try_from(pet.id)?,
            name: PetName::new(pet.name)?,
            species: pet.species.parse()?,
            gender: pet.gender.parse()?,
            age: pet.age.map(PetAge::new).transpose()?,
            description: pet.description.map(Description::new).transpose()?,
            version: pet.version,
        })
    }
}

impl<'a> From<&'a DomainNewPet> for NewPet<'a> {
    fn from(pet: &'a DomainNewPet) -> Self {
        Self {
            name: pet.name.as_str(),
            species: pet.species.as_str(),
            gender: pet.gender.as_str(),
            age: pet.age.map(PetAge::get),
            description: pet.description.as_ref().map(Description::as_str),
        }
    }
}

impl<'a> From<&'a DomainUpdatePet> for UpdatePet<'a> {
    fn from(pet: &'a DomainUpdatePet) -> Self {
        Self {
            name: pet.name.as_str(),
            species: pet.species.as_str(),
            gender: pet.gender.as_str(),
            age: pet.age.map(PetAge::get),
            description: pet.description.as_ref().map(Description::as_str),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pet::{Gender, Species};

    #[test]
    fn pet_into_domain() {
        let db_pet = Pet {
            id: 3,
            name: "Rex".to_string(),
            species: "Dog".to_string(),
            gender: "M".to_string(),
            age: Some(4),
            description: None,
            version: 2,
        };
        let pet = DomainPet::try_from(db_pet).unwrap();
        assert_eq!(pet.id.get(), 3);
        assert_eq!(pet.species, Species::Dog);
        assert_eq!(pet.gender, Gender::M);
        assert_eq!(pet.age.map(PetAge::get), Some(4));
        assert_eq!(pet.version, 2);
    }

    #[test]
    fn invalid_species_is_rejected() {
        let db_pet = Pet {
            id: 3,
            name: "Rex".to_string(),
            species: "Dragon".to_string(),
            gender: "M".to_string(),
            age: None,
            description: None,
            version: 1,
        };
        assert!(DomainPet::try_from(db_pet).is_err());
    }

    #[test]
    fn from_domain_new_borrows_fields() {
        let domain = DomainNewPet {
            name: PetName::new("Tom").unwrap(),
            species: Species::Cat,
            gender: Gender::F,
            age: None,
            description: Some(Description::new("shy").unwrap()),
        };
        let new: NewPet = (&domain).into();
        assert_eq!(new.name, "Tom");
        assert_eq!(new.species, "Cat");
        assert_eq!(new.gender, "F");
        assert_eq!(new.age, None);
        assert_eq!(new.description, Some("shy"));
    }
}
