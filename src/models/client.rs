use diesel::prelude::*;

use crate::domain::client::{
    Client as DomainClient, NewClient as DomainNewClient, UpdateClient as DomainUpdateClient,
};
use crate::domain::types::{
    Address, ClientId, ClientName, Description, PhoneNumber, TypeConstraintError, UserId,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::clients)]
/// Diesel model for [`crate::domain::client::Client`].
pub struct Client {
    pub id: i32,
    pub user_id: Option<String>,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub description: Option<String>,
    pub version: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::clients)]
/// Insertable form of [`Client`].
pub struct NewClient<'a> {
    pub user_id: Option<String>,
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub description: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::clients)]
#[diesel(treat_none_as_null = true)]
/// Data used when updating a [`Client`] record.
pub struct UpdateClient<'a> {
    pub user_id: Option<String>,
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub description: Option<&'a str>,
}

impl TryFrom<Client> for DomainClient {
    type Error = TypeConstraintError;

    fn try_from(client: Client) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ClientId::try_from(client.id)?,
            user_id: client.user_id.map(UserId::try_from).transpose()?,
            name: ClientName::new(client.name)?,
            address: client.address.map(Address::new).transpose()?,
            phone: client.phone.map(PhoneNumber::new).transpose()?,
            description: client.description.map(Description::new).transpose()?,
            version: client.version,
        })
    }
}

impl<'a> From<&'a DomainNewClient> for NewClient<'a> {
    fn from(client: &'a DomainNewClient) -> Self {
        Self {
            user_id: client.user_id.map(|id| id.to_string()),
            name: client.name.as_str(),
            address: client.address.as_ref().map(Address::as_str),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            description: client.description.as_ref().map(Description::as_str),
        }
    }
}

impl<'a> From<&'a DomainUpdateClient> for UpdateClient<'a> {
    fn from(client: &'a DomainUpdateClient) -> Self {
        Self {
            user_id: client.user_id.map(|id| id.to_string()),
            name: client.name.as_str(),
            address: client.address.as_ref().map(Address::as_str),
            phone: client.phone.as_ref().map(PhoneNumber::as_str),
            description: client.description.as_ref().map(Description::as_str),
        }
    }
}
