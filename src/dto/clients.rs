//! DTOs shaped for client detail and edit templates.

use serde::Serialize;

use crate::domain::client::ClientWithUser;
use crate::domain::foster::FosterDetails;
use crate::domain::user::User;

/// Aggregated data required to render the client details page.
#[derive(Debug, Serialize)]
pub struct ClientPageData {
    pub client: ClientWithUser,
    pub fosters: Vec<FosterDetails>,
}

/// Options for the client create/edit form.
#[derive(Debug, Serialize)]
pub struct ClientFormData {
    pub client: Option<ClientWithUser>,
    pub users: Vec<User>,
}
