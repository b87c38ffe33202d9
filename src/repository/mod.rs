//! Persistence traits and their Diesel implementation.
//!
//! Reader/Writer trait pairs keep services independent of Diesel so they can
//! be exercised against [`mock::MockRepository`] in unit tests.

use chrono::{NaiveDate, NaiveDateTime};

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::client::{Client, ClientWithUser, NewClient, UpdateClient};
use crate::domain::foster::{Foster, FosterDetails, FosterStats, NewFoster, UpdateFoster};
use crate::domain::pet::{Gender, NewPet, Pet, Species, UpdatePet};
use crate::domain::sort::{ClientSort, FosterSort, PetSort, UserSort};
use crate::domain::types::{ClientId, FosterId, PetId, UserEmail, UserId};
use crate::domain::user::{NewUser, UpdateUser, User, UserCredentials, UserRole};
use crate::pagination::{PageRequest, Paginated};
use crate::repository::errors::{RepositoryError, RepositoryResult};

/// Orders a boxed query by `column`, breaking ties on `id` in the same
/// direction so that descending order is the exact reverse of ascending.
macro_rules! sorted {
    ($query:expr, $column:expr, $id:expr, $desc:expr) => {
        if $desc {
            $query.order($column.desc()).then_order_by($id.desc())
        } else {
            $query.order($column.asc()).then_order_by($id.asc())
        }
    };
}

pub mod client;
pub mod errors;
pub mod foster;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod pet;
pub mod user;

/// Diesel-backed repository shared by every handler.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

/// Escape character used by every `LIKE` in the repositories.
const LIKE_ESCAPE: char = '\\';

/// `LIKE` pattern matching `search` literally anywhere in a column; `%` and
/// `_` in the input are escaped with [`LIKE_ESCAPE`].
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.trim().chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `(OFFSET, LIMIT)` for SQLite, saturating values that do not fit in `i64`.
fn sql_window(offset: usize, limit: usize) -> (i64, i64) {
    (
        i64::try_from(offset).unwrap_or(i64::MAX),
        i64::try_from(limit).unwrap_or(i64::MAX),
    )
}

/// Maps a failed version-guarded write to the reason it matched no row.
fn stale_write(exists: bool) -> RepositoryError {
    if exists {
        RepositoryError::Conflict
    } else {
        RepositoryError::NotFound
    }
}

#[derive(Debug, Clone, Default)]
pub struct PetListQuery {
    /// Substring matched against name, species and description.
    pub search: Option<String>,
    pub species: Option<Species>,
    pub gender: Option<Gender>,
    pub age_gte: Option<i32>,
    pub age_lte: Option<i32>,
    pub sort: PetSort,
    pub page: PageRequest,
}

impl PetListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn species(mut self, species: Species) -> Self {
        self.species = Some(species);
        self
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    pub fn age_between(mut self, gte: Option<i32>, lte: Option<i32>) -> Self {
        self.age_gte = gte;
        self.age_lte = lte;
        self
    }

    pub fn sort(mut self, sort: PetSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.page = PageRequest::new(page, per_page);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientListQuery {
    /// Substring matched against name, address, phone, description and the
    /// linked user's email.
    pub search: Option<String>,
    /// `Some(true)` keeps clients with a linked user, `Some(false)` the rest.
    pub has_user: Option<bool>,
    pub user_id: Option<UserId>,
    pub sort: ClientSort,
    pub page: PageRequest,
}

impl ClientListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn has_user(mut self, has_user: bool) -> Self {
        self.has_user = Some(has_user);
        self
    }

    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn sort(mut self, sort: ClientSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.page = PageRequest::new(page, per_page);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct FosterListQuery {
    /// Substring matched against the description, client name and pet name.
    pub search: Option<String>,
    pub start_date_gte: Option<NaiveDate>,
    pub start_date_lt: Option<NaiveDate>,
    pub end_date_gte: Option<NaiveDate>,
    pub end_date_lt: Option<NaiveDate>,
    pub client_id: Option<ClientId>,
    pub pet_id: Option<PetId>,
    pub sort: FosterSort,
    pub page: PageRequest,
}

impl FosterListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn pet(mut self, pet_id: PetId) -> Self {
        self.pet_id = Some(pet_id);
        self
    }

    pub fn sort(mut self, sort: FosterSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.page = PageRequest::new(page, per_page);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Substring matched against email and name.
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub sort: UserSort,
    pub page: PageRequest,
}

impl UserListQuery {
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn role(mut self, role: UserRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn sort(mut self, sort: UserSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.page = PageRequest::new(page, per_page);
        self
    }
}

pub trait PetReader {
    fn get_pet_by_id(&self, id: PetId) -> RepositoryResult<Option<Pet>>;
    fn list_pets(&self, query: PetListQuery) -> RepositoryResult<Paginated<Pet>>;
    /// Every pet ordered by name, for select boxes.
    fn list_all_pets(&self) -> RepositoryResult<Vec<Pet>>;
}

pub trait PetWriter {
    fn create_pet(&self, new_pet: &NewPet) -> RepositoryResult<Pet>;
    fn update_pet(&self, id: PetId, updates: &UpdatePet) -> RepositoryResult<Pet>;
    /// Deletes the pet and detaches its fosters in one transaction.
    fn delete_pet(&self, id: PetId) -> RepositoryResult<()>;
}

pub trait ClientReader {
    fn get_client_by_id(&self, id: ClientId) -> RepositoryResult<Option<ClientWithUser>>;
    fn get_client_by_user_id(&self, user_id: UserId) -> RepositoryResult<Option<Client>>;
    fn list_clients(&self, query: ClientListQuery) -> RepositoryResult<Paginated<ClientWithUser>>;
    /// Every client ordered by name, for select boxes.
    fn list_all_clients(&self) -> RepositoryResult<Vec<Client>>;
}

pub trait ClientWriter {
    fn create_client(&self, new_client: &NewClient) -> RepositoryResult<Client>;
    fn update_client(&self, id: ClientId, updates: &UpdateClient) -> RepositoryResult<Client>;
    /// Deletes the client and detaches its fosters in one transaction.
    fn delete_client(&self, id: ClientId) -> RepositoryResult<()>;
}

pub trait FosterReader {
    fn get_foster_by_id(&self, id: FosterId) -> RepositoryResult<Option<FosterDetails>>;
    fn list_fosters(&self, query: FosterListQuery) -> RepositoryResult<Paginated<FosterDetails>>;
    fn list_fosters_for_pet(&self, pet_id: PetId) -> RepositoryResult<Vec<Foster>>;
    fn foster_stats(&self) -> RepositoryResult<FosterStats>;
}

pub trait FosterWriter {
    fn create_foster(&self, new_foster: &NewFoster) -> RepositoryResult<Foster>;
    fn update_foster(&self, id: FosterId, updates: &UpdateFoster) -> RepositoryResult<Foster>;
    fn delete_foster(&self, id: FosterId) -> RepositoryResult<()>;
}

pub trait UserReader {
    fn get_user_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &UserEmail) -> RepositoryResult<Option<User>>;
    fn get_user_credentials_by_email(
        &self,
        email: &UserEmail,
    ) -> RepositoryResult<Option<UserCredentials>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<Paginated<User>>;
    /// Every user ordered by email, for select boxes.
    fn list_all_users(&self) -> RepositoryResult<Vec<User>>;
}

pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    /// Inserts the user and a client linked to it in one transaction.
    fn create_user_with_client(
        &self,
        new_user: &NewUser,
        new_client: &NewClient,
    ) -> RepositoryResult<(User, Client)>;
    fn update_user(&self, id: UserId, updates: &UpdateUser) -> RepositoryResult<User>;
    /// Deletes the user and unlinks its clients in one transaction.
    fn delete_user(&self, id: UserId) -> RepositoryResult<()>;
    /// Replaces the password hash and clears any pending reset token.
    fn set_password_hash(&self, id: UserId, password_hash: Option<&str>) -> RepositoryResult<()>;
    fn set_reset_token(
        &self,
        id: UserId,
        token_hash: &str,
        expires_at: NaiveDateTime,
    ) -> RepositoryResult<()>;
}
