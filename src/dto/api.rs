//! DTOs exposed by the JSON API endpoints.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::foster::{FosterDetails, FosterStats};
use crate::domain::pet::{Gender, Pet, Species};
use crate::domain::user::{User, UserRole};
use crate::pagination::Paginated;

/// Page envelope returned by list endpoints.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedList<T> {
    pub page_number: usize,
    pub total_pages: usize,
    pub item_count: usize,
    pub items: Vec<T>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

impl<T, U: Into<T>> From<Paginated<U>> for PaginatedList<T> {
    fn from(page: Paginated<U>) -> Self {
        Self {
            page_number: page.page,
            total_pages: page.total_pages,
            item_count: page.total_count,
            items: page.items.into_iter().map(Into::into).collect(),
            has_previous_page: page.has_previous_page,
            has_next_page: page.has_next_page,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PetOutput {
    pub id: i32,
    pub name: String,
    pub species: Species,
    pub gender: Gender,
    pub age: Option<i32>,
    pub description: Option<String>,
}

impl From<Pet> for PetOutput {
    fn from(pet: Pet) -> Self {
        Self {
            id: pet.id.get(),
            name: pet.name.into_inner(),
            species: pet.species,
            gender: pet.gender,
            age: pet.age.map(|age| age.get()),
            description: pet.description.map(|d| d.into_inner()),
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FosterOutput {
    pub id: i32,
    pub client_id: Option<i32>,
    pub pet_id: Option<i32>,
    pub pet: Option<PetOutput>,
    pub description: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl From<FosterDetails> for FosterOutput {
    fn from(details: FosterDetails) -> Self {
        let foster = details.foster;
        Self {
            id: foster.id.get(),
            client_id: foster.client_id.map(|id| id.get()),
            pet_id: foster.pet_id.map(|id| id.get()),
            pet: details.pet.map(PetOutput::from),
            description: foster.description.map(|d| d.into_inner()),
            start_date: foster.start_date,
            end_date: foster.end_date,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserOutput {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl From<User> for UserOutput {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.into_inner(),
            name: user.name.map(|n| n.into_inner()),
            phone: user.phone.map(|p| p.into_inner()),
            role: user.role,
        }
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatsOutput {
    pub nr_of_pets: i64,
    pub nr_of_foster: i64,
    pub nr_of_fostered_pets: i64,
    pub avg_foster_duration: f64,
}

impl From<FosterStats> for StatsOutput {
    fn from(stats: FosterStats) -> Self {
        Self {
            nr_of_pets: stats.nr_of_pets,
            nr_of_foster: stats.nr_of_fosters,
            nr_of_fostered_pets: stats.nr_of_fostered_pets,
            avg_foster_duration: stats.avg_foster_duration,
        }
    }
}
