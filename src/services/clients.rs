//! Services handling foster caretakers.

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::client::{Client, ClientWithUser};
use crate::domain::types::ClientId;
use crate::domain::user::UserRole;
use crate::dto::ListPageData;
use crate::dto::clients::{ClientFormData, ClientPageData};
use crate::forms::clients::{ClientFilterForm, ClientForm, ClientPayload};
use crate::pagination::PageRequest;
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, FosterListQuery, FosterReader, UserReader,
};
use crate::services::{ServiceError, ServiceResult};

/// Most assignments shown on a client page.
const CLIENT_FOSTERS_SHOWN: usize = 100;

pub fn list_clients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: ClientFilterForm,
) -> ServiceResult<ListPageData<ClientWithUser, ClientFilterForm>>
where
    R: ClientReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let query = ClientListQuery::try_from(&filter)?;
    let clients = repo.list_clients(query)?;
    let filter_query = filter.filter_query();
    let sort = filter.current_sort();

    Ok(ListPageData::new(clients, filter, filter_query, sort))
}

fn get_client<R>(repo: &R, client_id: i32) -> ServiceResult<ClientWithUser>
where
    R: ClientReader + ?Sized,
{
    let client_id = ClientId::new(client_id)?;
    repo.get_client_by_id(client_id)?
        .ok_or(ServiceError::NotFound)
}

/// Loads a client with its linked user and foster history.
pub fn load_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
) -> ServiceResult<ClientPageData>
where
    R: ClientReader + FosterReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let client = get_client(repo, client_id)?;
    let mut query = FosterListQuery::default().client(client.client.id);
    query.page = PageRequest::new(1, CLIENT_FOSTERS_SHOWN);
    let fosters = repo.list_fosters(query)?.items;

    Ok(ClientPageData { client, fosters })
}

/// Loads the options of the client form, with the client itself when editing.
pub fn load_client_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: Option<i32>,
) -> ServiceResult<ClientFormData>
where
    R: ClientReader + UserReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let client = client_id.map(|id| get_client(repo, id)).transpose()?;
    let users = repo.list_all_users()?;

    Ok(ClientFormData { client, users })
}

pub fn create_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let payload = ClientPayload::try_from(form)?;

    let client = repo.create_client(&payload.into_new()).map_err(|err| {
        log::error!("Failed to create client: {err}");
        err
    })?;

    log::info!("Client {} created by {}", client.id, user.email);
    Ok(client)
}

pub fn update_client<R>(
    repo: &R,
    user: &AuthenticatedUser,
    client_id: i32,
    form: ClientForm,
) -> ServiceResult<Client>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let client_id = ClientId::new(client_id)?;
    let updates = ClientPayload::try_from(form)?.into_update()?;

    Ok(repo.update_client(client_id, &updates)?)
}

/// Deletes the client; its fosters are kept with the client reference cleared.
pub fn delete_client<R>(repo: &R, user: &AuthenticatedUser, client_id: i32) -> ServiceResult<()>
where
    R: ClientWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let client_id = ClientId::new(client_id)?;
    repo.delete_client(client_id)?;

    log::info!("Client {client_id} deleted by {}", user.email);
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::types::ClientName;
    use crate::pagination::Paginated;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;
    use crate::services::test_user;

    fn client(id: i32) -> Client {
        Client {
            id: ClientId::new(id).unwrap(),
            user_id: None,
            name: ClientName::new("Alice Smith").unwrap(),
            address: None,
            phone: None,
            description: None,
            version: 1,
        }
    }

    #[test]
    fn regular_users_cannot_manage_clients() {
        let mut repo = MockRepository::new();
        repo.expect_delete_client().times(0);

        let result = delete_client(&repo, &test_user(UserRole::User), 1);

        assert!(matches!(result, Err(ServiceError::Unauthorized)));
    }

    #[test]
    fn details_include_client_fosters() {
        let mut repo = MockRepository::new();
        repo.expect_get_client_by_id().returning(|id| {
            Ok(Some(ClientWithUser {
                client: client(id.get()),
                user: None,
            }))
        });
        repo.expect_list_fosters()
            .withf(|query| query.client_id == ClientId::new(8).ok())
            .times(1)
            .returning(|query| Ok(Paginated::new(Vec::new(), query.page, 0)));

        let data = load_client(&repo, &test_user(UserRole::Admin), 8).unwrap();

        assert_eq!(data.client.client.id.get(), 8);
        assert!(data.fosters.is_empty());
    }

    #[test]
    fn create_validates_before_writing() {
        let mut repo = MockRepository::new();
        repo.expect_create_client().times(0);
        let form = ClientForm {
            name: "Al".to_string(),
            ..Default::default()
        };

        let result = create_client(&repo, &test_user(UserRole::Admin), form);

        assert!(matches!(result, Err(ServiceError::Form(_))));
    }

    #[test]
    fn create_persists_client() {
        let mut repo = MockRepository::new();
        repo.expect_create_client()
            .withf(|new_client| new_client.name.as_str() == "Alice Smith")
            .times(1)
            .returning(|_| Ok(client(1)));
        let form = ClientForm {
            name: "Alice Smith".to_string(),
            ..Default::default()
        };

        let created = create_client(&repo, &test_user(UserRole::Admin), form).unwrap();

        assert_eq!(created.id.get(), 1);
    }

    #[test]
    fn update_of_missing_client_is_not_found() {
        let mut repo = MockRepository::new();
        repo.expect_update_client()
            .returning(|_, _| Err(RepositoryError::NotFound));
        let form = ClientForm {
            name: "Alice Smith".to_string(),
            version: Some(1),
            ..Default::default()
        };

        let result = update_client(&repo, &test_user(UserRole::Admin), 3, form);

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }
}
