//! Services handling pet administration and the public pet catalogue.

use chrono::Local;

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::pet::Pet;
use crate::domain::types::PetId;
use crate::domain::user::UserRole;
use crate::dto::ListPageData;
use crate::dto::pets::PetPageData;
use crate::forms::pets::{PetFilterForm, PetForm, PetPayload};
use crate::pagination::Paginated;
use crate::repository::{FosterReader, PetListQuery, PetReader, PetWriter};
use crate::services::{ServiceError, ServiceResult};

/// Runs the filtered pet query shared by the admin list and the API.
pub fn search_pets<R>(repo: &R, filter: &PetFilterForm) -> ServiceResult<Paginated<Pet>>
where
    R: PetReader + ?Sized,
{
    let query = PetListQuery::try_from(filter)?;
    Ok(repo.list_pets(query)?)
}

/// Loads the pet list page for administrators.
pub fn list_pets<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: PetFilterForm,
) -> ServiceResult<ListPageData<Pet, PetFilterForm>>
where
    R: PetReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let pets = search_pets(repo, &filter)?;
    let filter_query = filter.filter_query();
    let sort = filter.current_sort();

    Ok(ListPageData::new(pets, filter, filter_query, sort))
}

/// Fetches a single pet by id.
pub fn get_pet<R>(repo: &R, pet_id: i32) -> ServiceResult<Pet>
where
    R: PetReader + ?Sized,
{
    let pet_id = PetId::new(pet_id)?;
    repo.get_pet_by_id(pet_id)?.ok_or(ServiceError::NotFound)
}

/// Loads a pet with its assignments and the one active today.
pub fn load_pet<R>(repo: &R, user: &AuthenticatedUser, pet_id: i32) -> ServiceResult<PetPageData>
where
    R: PetReader + FosterReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let pet = get_pet(repo, pet_id)?;
    let mut fosters = repo.list_fosters_for_pet(pet.id)?;
    fosters.sort_by_key(|foster| (foster.start_date, foster.id));

    let today = Local::now().date_naive();
    let active_foster = fosters
        .iter()
        .find(|foster| foster.is_active_on(today))
        .cloned();

    Ok(PetPageData {
        pet,
        active_foster,
        fosters,
    })
}

/// Loads a pet for the edit form.
pub fn load_pet_for_edit<R>(repo: &R, user: &AuthenticatedUser, pet_id: i32) -> ServiceResult<Pet>
where
    R: PetReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;
    get_pet(repo, pet_id)
}

/// Validates the form and persists a new pet.
pub fn create_pet<R>(repo: &R, user: &AuthenticatedUser, form: PetForm) -> ServiceResult<Pet>
where
    R: PetWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let payload = PetPayload::try_from(form)?;

    let pet = repo.create_pet(&payload.into_new()).map_err(|err| {
        log::error!("Failed to create pet: {err}");
        err
    })?;

    log::info!("Pet {} created by {}", pet.id, user.email);
    Ok(pet)
}

/// Validates the form and applies it to the pet at the posted version.
pub fn update_pet<R>(
    repo: &R,
    user: &AuthenticatedUser,
    pet_id: i32,
    form: PetForm,
) -> ServiceResult<Pet>
where
    R: PetWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let pet_id = PetId::new(pet_id)?;
    let updates = PetPayload::try_from(form)?.into_update()?;

    Ok(repo.update_pet(pet_id, &updates)?)
}

/// Deletes the pet; its fosters are kept with the pet reference cleared.
pub fn delete_pet<R>(repo: &R, user: &AuthenticatedUser, pet_id: i32) -> ServiceResult<()>
where
    R: PetWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let pet_id = PetId::new(pet_id)?;
    repo.delete_pet(pet_id)?;

    log::info!("Pet {pet_id} deleted by {}", user.email);
    Ok(())
}
