use serde::Serialize;

use crate::domain::client::Client;
use crate::domain::foster::FosterDetails;
use crate::domain::pet::Pet;

/// Select-box options for the foster create/edit form and list filters.
#[derive(Debug, Serialize)]
pub struct FosterFormData {
    pub foster: Option<FosterDetails>,
    pub pets: Vec<Pet>,
    pub clients: Vec<Client>,
}
