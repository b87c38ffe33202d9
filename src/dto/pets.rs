//! DTOs shaped for the pet detail template.

use serde::Serialize;

use crate::domain::foster::Foster;
use crate::domain::pet::Pet;

/// Aggregated data required to render the pet details page.
#[derive(Debug, Serialize)]
pub struct PetPageData {
    pub pet: Pet,
    /// Assignment covering today, if any.
    pub active_foster: Option<Foster>,
    /// Every assignment of the pet, earliest first.
    pub fosters: Vec<Foster>,
}
