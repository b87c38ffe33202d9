use serde::{Deserialize, Serialize};

use crate::domain::types::{Address, ClientId, ClientName, Description, PhoneNumber, UserId};
use crate::domain::user::User;

/// Foster caretaker, optionally backed by a user account.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub user_id: Option<UserId>,
    pub name: ClientName,
    pub address: Option<Address>,
    pub phone: Option<PhoneNumber>,
    pub description: Option<Description>,
    pub version: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NewClient {
    pub user_id: Option<UserId>,
    pub name: ClientName,
    pub address: Option<Address>,
    pub phone: Option<PhoneNumber>,
    pub description: Option<Description>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct UpdateClient {
    pub user_id: Option<UserId>,
    pub name: ClientName,
    pub address: Option<Address>,
    pub phone: Option<PhoneNumber>,
    pub description: Option<Description>,
    pub version: i32,
}

/// Client row joined with its linked user, if any.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ClientWithUser {
    pub client: Client,
    pub user: Option<User>,
}
