//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;

use crate::domain::client::{Client, ClientWithUser, NewClient, UpdateClient};
use crate::domain::foster::{Foster, FosterDetails, FosterStats, NewFoster, UpdateFoster};
use crate::domain::pet::{NewPet, Pet, UpdatePet};
use crate::domain::types::{ClientId, FosterId, PetId, UserEmail, UserId};
use crate::domain::user::{NewUser, UpdateUser, User, UserCredentials};
use crate::pagination::Paginated;
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ClientListQuery, ClientReader, ClientWriter, FosterListQuery, FosterReader, FosterWriter,
    PetListQuery, PetReader, PetWriter, UserListQuery, UserReader, UserWriter,
};

mock! {
    pub Repository {}

    impl PetReader for Repository {
        fn get_pet_by_id(&self, id: PetId) -> RepositoryResult<Option<Pet>>;
        fn list_pets(&self, query: PetListQuery) -> RepositoryResult<Paginated<Pet>>;
        fn list_all_pets(&self) -> RepositoryResult<Vec<Pet>>;
    }

    impl PetWriter for Repository {
        fn create_pet(&self, new_pet: &NewPet) -> RepositoryResult<Pet>;
        fn update_pet(&self, id: PetId, updates: &UpdatePet) -> RepositoryResult<Pet>;
        fn delete_pet(&self, id: PetId) -> RepositoryResult<()>;
    }

    impl ClientReader for Repository {
        fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<ClientWithUser>>;
        fn get_client_by_user_id(&self, user_id: UserId) -> RepositoryResult<Option<Client>>;
        fn list_clients(
            &self,
            query: ClientListQuery,
        ) -> RepositoryResult<Paginated<ClientWithUser>>;
        fn list_all_clients(&self) -> RepositoryResult<Vec<Client>>;
    }

    impl ClientWriter for Repository {
        fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
        fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
        fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
    }

    impl FosterReader for Repository {
        fn get_foster_by_id(&self, id: FosterId) -> RepositoryResult<Option<FosterDetails>>;
        fn list_fosters(
            &self,
            query: FosterListQuery,
        ) -> RepositoryResult<Paginated<FosterDetails>>;
        fn list_fosters_for_pet(&self, pet_id: PetId) -> RepositoryResult<Vec<Foster>>;
        fn foster_stats(&self) -> RepositoryResult<FosterStats>;
    }

    impl FosterWriter for Repository {
        fn create_foster(&self, new_foster: &NewFoster) -> RepositoryResult<Foster>;
        fn update_foster(&self, id: FosterId, updates: &UpdateFoster) -> RepositoryResult<Foster>;
        fn delete_foster(&self, id: FosterId) -> RepositoryResult<()>;
    }

    impl UserReader for Repository {
        fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
        fn get_user_credentials_by_email(
            &self,
            email: &UserEmail,
        ) -> RepositoryResult<Option<UserCredentials>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<Paginated<User>>;
        fn list_all_users(&self) -> RepositoryResult<Vec<User>>;
    }

    impl UserWriter for Repository {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
        fn create_user_with_client(
            &self,
            new_user: &NewUser,
            new_client: &NewClient,
        ) -> RepositoryResult<(User, Client)>;
        fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
        fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
        fn set_password_hash<'a>(
            &self,
            id: UserId,
            password_hash: Option<&'a str>,
        ) -> RepositoryResult<()>;
        fn set_reset_token(
            &self,
            id: UserId,
            token_hash: &str,
            expires_at: NaiveDateTime,
        ) -> RepositoryResult<()>;
    }
}
