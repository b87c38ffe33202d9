use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::user::UserRole;
use crate::forms::users::{UserFilterForm, UserForm};
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{NOT_ALLOWED, NOT_FOUND, base_context, redirect, render_template};
use crate::services::{ServiceError, auth as auth_service, users as users_service};

const USERS_URL: &str = "/admin/users";

#[get("/users")]
pub async fn show_users(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(filter): web::Query<UserFilterForm>,
) -> impl Responder {
    match users_service::list_users(repo.get_ref(), &user, filter) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), "users");
            context.insert("list", &data);
            context.insert("roles", &UserRole::ALL);
            render_template(&tera, "users/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(USERS_URL)
        }
        Err(err) => {
            log::error!("Failed to list users: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/users/create")]
pub async fn create_user_form(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if !user.is_admin() {
        FlashMessage::error(NOT_ALLOWED).send();
        return redirect("/");
    }

    let mut context = base_context(&flash_messages, Some(&user), "users");
    context.insert("roles", &UserRole::ALL);
    render_template(&tera, "users/form.html", &context)
}

#[post("/users/create")]
pub async fn create_user(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<UserForm>,
) -> impl Responder {
    match users_service::create_user(repo.get_ref(), &user, form) {
        Ok(created) => {
            FlashMessage::success(format!("User {} added.", created.email)).send();
            redirect(&format!("{USERS_URL}/{}", created.id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/users/create")
        }
        Err(err) => {
            log::error!("Failed to create user: {err}");
            FlashMessage::error("Failed to add the user.").send();
            redirect(USERS_URL)
        }
    }
}

fn user_page(
    template: &str,
    user_id: &str,
    user: &AuthenticatedUser,
    repo: &DieselRepository,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match users_service::load_user(repo, user, user_id) {
        Ok(found) => {
            let mut context = base_context(flash_messages, Some(user), "users");
            context.insert("user", &found);
            context.insert("roles", &UserRole::ALL);
            render_template(tera, template, &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(USERS_URL)
        }
        Err(err) => {
            log::error!("Failed to load user: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/users/{user_id}")]
pub async fn show_user(
    user_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    user_page(
        "users/details.html",
        &user_id,
        &user,
        repo.get_ref(),
        &flash_messages,
        &tera,
    )
}

#[get("/users/edit/{user_id}")]
pub async fn edit_user_form(
    user_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    user_page(
        "users/form.html",
        &user_id,
        &user,
        repo.get_ref(),
        &flash_messages,
        &tera,
    )
}

#[post("/users/edit/{user_id}")]
pub async fn update_user(
    user_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<UserForm>,
) -> impl Responder {
    let user_id = user_id.into_inner();
    let edit_url = format!("{USERS_URL}/edit/{user_id}");

    match users_service::update_user(repo.get_ref(), &user, &user_id, form) {
        Ok(updated) => {
            FlashMessage::success(format!("User {} saved.", updated.email)).send();
            redirect(&format!("{USERS_URL}/{user_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(USERS_URL)
        }
        Err(err @ ServiceError::Conflict) => {
            FlashMessage::warning(err.to_string()).send();
            redirect(&edit_url)
        }
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&edit_url)
        }
        Err(err) => {
            log::error!("Failed to update user {user_id}: {err}");
            FlashMessage::error("Failed to save the user.").send();
            redirect(&edit_url)
        }
    }
}

/// Clears the user's password and logs a reset link for them.
#[post("/users/edit/{user_id}/forgot_password")]
pub async fn reset_user_password(
    user_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
) -> impl Responder {
    let user_id = user_id.into_inner();
    let user_url = format!("{USERS_URL}/{user_id}");

    match auth_service::reset_user_password(repo.get_ref(), &user, &server_config, &user_id) {
        Ok(_) => {
            FlashMessage::success("Password removed, a reset link was issued.").send();
            redirect(&user_url)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(USERS_URL)
        }
        Err(err) => {
            log::error!("Failed to reset password of user {user_id}: {err}");
            FlashMessage::error("Failed to reset the password.").send();
            redirect(&user_url)
        }
    }
}

#[post("/users/delete/{user_id}")]
pub async fn delete_user(
    user_id: web::Path<String>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match users_service::delete_user(repo.get_ref(), &user, &user_id) {
        Ok(()) => {
            FlashMessage::success("User deleted.").send();
            redirect(USERS_URL)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(USERS_URL)
        }
        Err(err) => {
            log::error!("Failed to delete user: {err}");
            FlashMessage::error("Failed to delete the user.").send();
            redirect(USERS_URL)
        }
    }
}
