//! Services handling user accounts, for administrators and for the account
//! owner.

use crate::auth::password::hash_secret;
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::types::UserId;
use crate::domain::user::{UpdateUser, User, UserRole};
use crate::dto::ListPageData;
use crate::forms::api::{UpdateMePayload, UpdateMeRequest};
use crate::forms::users::{UserFilterForm, UserForm, UserPayload};
use crate::repository::{UserListQuery, UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

pub fn list_users<R>(
    repo: &R,
    user: &AuthenticatedUser,
    filter: UserFilterForm,
) -> ServiceResult<ListPageData<User, UserFilterForm>>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let query = UserListQuery::try_from(&filter)?;
    let users = repo.list_users(query)?;
    let filter_query = filter.filter_query();
    let sort = filter.current_sort();

    Ok(ListPageData::new(users, filter, filter_query, sort))
}

fn get_user<R>(repo: &R, user_id: UserId) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    repo.get_user_by_id(user_id)?.ok_or(ServiceError::NotFound)
}

pub fn load_user<R>(repo: &R, user: &AuthenticatedUser, user_id: &str) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;
    get_user(repo, UserId::try_from(user_id)?)
}

/// Creates an account; the password is optional for admin-created users.
pub fn create_user<R>(repo: &R, user: &AuthenticatedUser, form: UserForm) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let payload = UserPayload::try_from(form)?;
    let password_hash = payload.password.as_deref().map(hash_secret).transpose()?;

    let created = repo
        .create_user(&payload.into_new(UserId::generate(), password_hash))
        .map_err(|err| {
            log::error!("Failed to create user: {err}");
            err
        })?;

    log::info!("User {} created by {}", created.email, user.email);
    Ok(created)
}

pub fn update_user<R>(
    repo: &R,
    user: &AuthenticatedUser,
    user_id: &str,
    form: UserForm,
) -> ServiceResult<User>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let user_id = UserId::try_from(user_id)?;
    let updates = UserPayload::try_from(form)?.into_update()?;

    Ok(repo.update_user(user_id, &updates)?)
}

/// Deletes the account; linked clients are kept and unlinked.
pub fn delete_user<R>(repo: &R, user: &AuthenticatedUser, user_id: &str) -> ServiceResult<()>
where
    R: UserWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let user_id = UserId::try_from(user_id)?;
    repo.delete_user(user_id)?;

    log::info!("User {user_id} deleted by {}", user.email);
    Ok(())
}

/// Account of the caller.
pub fn get_me<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + ?Sized,
{
    get_user(repo, user.user_id()?)
}

/// Applies a partial update to the caller's account.
pub fn update_me<R>(
    repo: &R,
    user: &AuthenticatedUser,
    request: UpdateMeRequest,
) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let changes = UpdateMePayload::try_from(request)?;
    let current = get_me(repo, user)?;

    let updates = UpdateUser {
        email: changes.email.unwrap_or(current.email),
        name: changes.name.unwrap_or(current.name),
        phone: changes.phone.unwrap_or(current.phone),
        role: current.role,
        version: current.version,
    };

    Ok(repo.update_user(current.id, &updates)?)
}

pub fn delete_me<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<()>
where
    R: UserWriter + ?Sized,
{
    let user_id = user.user_id()?;
    repo.delete_user(user_id)?;

    log::info!("User {} deleted their account", user.email);
    Ok(())
}
