use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::types::{Description, PetAge, PetId, PetName, TypeConstraintError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Cat,
    Dog,
    Rodent,
    Bird,
    Snake,
    Lizard,
    Other,
}

impl Species {
    pub const ALL: [Species; 7] = [
        Species::Cat,
        Species::Dog,
        Species::Rodent,
        Species::Bird,
        Species::Snake,
        Species::Lizard,
        Species::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Species::Cat => "Cat",
            Species::Dog => "Dog",
            Species::Rodent => "Rodent",
            Species::Bird => "Bird",
            Species::Snake => "Snake",
            Species::Lizard => "Lizard",
            Species::Other => "Other",
        }
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Species::ALL
            .into_iter()
            .find(|species| species.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TypeConstraintError::InvalidValue(format!("unknown species `{s}`")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::M, Gender::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }
}

impl Display for Gender {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" => Ok(Gender::M),
            "F" | "f" => Ok(Gender::F),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown gender `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Pet {
    pub id: PetId,
    pub name: PetName,
    pub species: Species,
    pub gender: Gender,
    pub age: Option<PetAge>,
    pub description: Option<Description>,
    /// Row version used for optimistic concurrency.
    pub version: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewPet {
    pub name: PetName,
    pub species: Species,
    pub gender: Gender,
    pub age: Option<PetAge>,
    pub description: Option<Description>,
}

/// Replacement values for a pet, valid only against `version`.
#[derive(Clone, Debug, PartialEq)]
pub struct UpdatePet {
    pub name: PetName,
    pub species: Species,
    pub gender: Gender,
    pub age: Option<PetAge>,
    pub description: Option<Description>,
    pub version: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn species_parse_is_case_insensitive() {
        assert_eq!("dog".parse::<Species>().unwrap(), Species::Dog);
        assert_eq!(" Lizard ".parse::<Species>().unwrap(), Species::Lizard);
        assert!("Horse".parse::<Species>().is_err());
    }

    #[test]
    fn gender_parse() {
        assert_eq!("F".parse::<Gender>().unwrap(), Gender::F);
        assert!("X".parse::<Gender>().is_err());
    }
}
