//! Services handling foster assignments.
//!
//! Every insert and update first checks the candidate's date range against
//! the assignments already stored for the same pet; a rejection prevents the
//! write and carries the reason back to the caller.

use chrono::NaiveDate;

use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::client::Client;
use crate::domain::foster::{Foster, FosterDetails, NewFoster};
use crate::domain::foster_interval::{FosterCandidate, validate_foster_interval};
use crate::domain::types::{FosterId, PetId};
use crate::domain::user::UserRole;
use crate::dto::ListPageData;
use crate::dto::fosters::FosterFormData;
use crate::forms::api::{CreateFosterPayload, CreateFosterRequest, PageQuery};
use crate::forms::fosters::{FosterFilterForm, FosterForm, FosterPayload};
use crate::pagination::{DEFAULT_ITEMS_PER_PAGE, Paginated};
use crate::repository::{ClientReader, FosterListQuery, FosterReader, FosterWriter, PetReader};
use crate::services::{ServiceError, ServiceResult};

/// Rejects a date range that is invalid or collides with another assignment
/// of the same pet.
fn check_interval<R>(
    repo: &R,
    pet_id: PetId,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    exclude_id: Option<FosterId>,
) -> ServiceResult<()>
where
    R: FosterReader + ?Sized,
{
    let existing = repo.list_fosters_for_pet(pet_id)?;
    let candidate = FosterCandidate {
        pet_id,
        start_date,
        end_date,
        exclude_id,
    };
    validate_foster_interval(&candidate, &existing).map_err(|err| {
        log::info!("Rejected foster interval for pet {pet_id}: {err}");
        ServiceError::from(err)
    })
}

pub fn list_fosters<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: FosterFilterForm,
) -> ServiceResult<ListPageData<FosterDetails, FosterFilterForm>>
where
    R: FosterReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let query = FosterListQuery::try_from(&filter)?;
    let fosters = repo.list_fosters(query)?;
    let filter_query = filter.filter_query();
    let sort = filter.current_sort();

    Ok(ListPageData::new(fosters, filter, filter_query, sort))
}

fn get_foster<R>(repo: &R, foster_id: i32) -> ServiceResult<FosterDetails>
where
    R: FosterReader + ?Sized,
{
    let foster_id = FosterId::new(foster_id)?;
    repo.get_foster_by_id(foster_id)?.ok_or(ServiceError::NotFound)
}

pub fn load_foster<R>(
    repo: &R,
    user: &AuthenticatedUser,
    foster_id: i32,
) -> ServiceResult<FosterDetails>
where
    R: FosterReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;
    get_foster(repo, foster_id)
}

/// Loads the select-box options, with the assignment itself when editing.
pub fn load_foster_form<R>(
    repo: &R,
    user: &AuthenticatedUser,
    foster_id: Option<i32>,
) -> ServiceResult<FosterFormData>
where
    R: FosterReader + PetReader + ClientReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let foster = foster_id.map(|id| get_foster(repo, id)).transpose()?;

    Ok(FosterFormData {
        foster,
        pets: repo.list_all_pets()?,
        clients: repo.list_all_clients()?,
    })
}

pub fn create_foster<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: FosterForm,
) -> ServiceResult<Foster>
where
    R: FosterReader + FosterWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let new_foster = FosterPayload::try_from(form)?.into_new();
    check_interval(
        repo,
        new_foster.pet_id,
        new_foster.start_date,
        new_foster.end_date,
        None,
    )?;

    let foster = repo.create_foster(&new_foster).map_err(|err| {
        log::error!("Failed to create foster: {err}");
        err
    })?;

    log::info!("Foster {} created by {}", foster.id, user.email);
    Ok(foster)
}

pub fn update_foster<R>(
    repo: &R,
    user: &AuthenticatedUser,
    foster_id: i32,
    form: FosterForm,
) -> ServiceResult<Foster>
where
    R: FosterReader + FosterWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let foster_id = FosterId::new(foster_id)?;
    let updates = FosterPayload::try_from(form)?.into_update()?;
    check_interval(
        repo,
        updates.pet_id,
        updates.start_date,
        updates.end_date,
        Some(foster_id),
    )?;

    Ok(repo.update_foster(foster_id, &updates)?)
}

pub fn delete_foster<R>(repo: &R, user: &AuthenticatedUser, foster_id: i32) -> ServiceResult<()>
where
    R: FosterWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let foster_id = FosterId::new(foster_id)?;
    repo.delete_foster(foster_id)?;

    log::info!("Foster {foster_id} deleted by {}", user.email);
    Ok(())
}

/// Client profile linked to the signed-in account.
pub fn current_client<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<Option<Client>>
where
    R: ClientReader + ?Sized,
{
    Ok(repo.get_client_by_user_id(user.user_id()?)?)
}

/// Lists the caller's own assignments.
pub fn list_my_fosters<R>(
    repo: &R,
    user: &AuthenticatedUser,
    paging: PageQuery,
) -> ServiceResult<Paginated<FosterDetails>>
where
    R: ClientReader + FosterReader + ?Sized,
{
    let page = paging.page_number.unwrap_or(1);
    let per_page = paging.page_size.unwrap_or(DEFAULT_ITEMS_PER_PAGE);
    let query = FosterListQuery::default().paginate(page, per_page);

    match current_client(repo, user)? {
        Some(client) => Ok(repo.list_fosters(query.client(client.id))?),
        None => Ok(Paginated::new(Vec::new(), query.page, 0)),
    }
}

/// Fetches one of the caller's assignments; others are reported as missing.
pub fn get_my_foster<R>(
    repo: &R,
    user: &AuthenticatedUser,
    foster_id: i32,
) -> ServiceResult<FosterDetails>
where
    R: ClientReader + FosterReader + ?Sized,
{
    let client = current_client(repo, user)?.ok_or(ServiceError::NotFound)?;
    let details = get_foster(repo, foster_id)?;

    if details.foster.client_id != Some(client.id) {
        return Err(ServiceError::NotFound);
    }
    Ok(details)
}

/// Books a pet for the caller's client profile.
pub fn create_my_foster<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request: CreateFosterRequest,
) -> ServiceResult<FosterDetails>
where
    R: ClientReader + PetReader + FosterReader + FosterWriter + ?Sized,
{
    let payload = CreateFosterPayload::try_from(request)?;

    let client = current_client(repo, user)?
        .ok_or_else(|| ServiceError::Form("No client profile is linked to this account.".into()))?;
    let pet = repo
        .get_pet_by_id(payload.pet_id)?
        .ok_or_else(|| ServiceError::Form(format!("Pet {} does not exist.", payload.pet_id)))?;

    check_interval(
        repo,
        pet.id,
        payload.start_date,
        payload.end_date,
        None,
    )?;

    let new_foster = NewFoster {
        client_id: client.id,
        pet_id: pet.id,
        description: payload.description,
        start_date: payload.start_date,
        end_date: payload.end_date,
    };
    let foster = repo.create_foster(&new_foster)?;

    log::info!("Foster {} booked by {}", foster.id, user.email);
    Ok(FosterDetails {
        foster,
        pet: Some(pet),
        client: Some(client),
    })
}
