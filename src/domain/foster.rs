use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::client::Client;
use crate::domain::pet::Pet;
use crate::domain::types::{ClientId, FosterDescription, FosterId, PetId};

/// Assignment of a pet to a caretaker over `[start_date, end_date)`.
///
/// `client_id` and `pet_id` become `None` once the referenced row is deleted;
/// the assignment itself is kept as history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Foster {
    pub id: FosterId,
    pub client_id: Option<ClientId>,
    pub pet_id: Option<PetId>,
    pub description: Option<FosterDescription>,
    pub start_date: NaiveDate,
    /// `None` for an ongoing assignment.
    pub end_date: Option<NaiveDate>,
    pub version: i32,
}

impl Foster {
    pub fn is_open_ended(&self) -> bool {
        self.end_date.is_none()
    }

    /// Length in days of a bounded assignment.
    pub fn duration_days(&self) -> Option<i64> {
        self.end_date
            .map(|end| end.signed_duration_since(self.start_date).num_days())
    }

    /// Whether the assignment covers `today` (both ends inclusive).
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        self.start_date <= today && self.end_date.is_none_or(|end| end >= today)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewFoster {
    pub client_id: ClientId,
    pub pet_id: PetId,
    pub description: Option<FosterDescription>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateFoster {
    pub client_id: ClientId,
    pub pet_id: PetId,
    pub description: Option<FosterDescription>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub version: i32,
}

/// Foster with the pet and client rows it still references.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct FosterDetails {
    pub foster: Foster,
    pub pet: Option<Pet>,
    pub client: Option<Client>,
}

/// Dashboard counters over all foster assignments.
#[derive(Clone, Debug, Default, Serialize, PartialEq)]
pub struct FosterStats {
    pub nr_of_pets: i64,
    pub nr_of_fosters: i64,
    /// Distinct pets that appear in at least one assignment.
    pub nr_of_fostered_pets: i64,
    /// Mean length in days of bounded assignments, `0.0` when there are none.
    pub avg_foster_duration: f64,
}
