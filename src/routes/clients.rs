use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::forms::clients::{ClientFilterForm, ClientForm};
use crate::repository::DieselRepository;
use crate::routes::{NOT_ALLOWED, NOT_FOUND, base_context, redirect, render_template};
use crate::services::{ServiceError, clients as clients_service};

const CLIENTS_URL: &str = "/admin/clients";

#[get("/clients")]
pub async fn show_clients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(filter): web::Query<ClientFilterForm>,
) -> impl Responder {
    match clients_service::list_clients(repo.get_ref(), &user, filter) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), "clients");
            context.insert("list", &data);
            render_template(&tera, "clients/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(CLIENTS_URL)
        }
        Err(err) => {
            log::error!("Failed to list clients: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// Create and edit share one template; `client_id` is `None` when creating.
fn client_form(
    client_id: Option<i32>,
    user: &AuthenticatedUser,
    repo: &DieselRepository,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match clients_service::load_client_form(repo, user, client_id) {
        Ok(data) => {
            let mut context = base_context(flash_messages, Some(user), "clients");
            context.insert("client", &data.client);
            context.insert("users", &data.users);
            render_template(tera, "clients/form.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(CLIENTS_URL)
        }
        Err(err) => {
            log::error!("Failed to load client form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/clients/create")]
pub async fn create_client_form(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    client_form(None, &user, repo.get_ref(), &flash_messages, &tera)
}

#[post("/clients/create")]
pub async fn create_client(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ClientForm>,
) -> impl Responder {
    match clients_service::create_client(repo.get_ref(), &user, form) {
        Ok(client) => {
            FlashMessage::success(format!("Client {} added.", client.name)).send();
            redirect(&format!("{CLIENTS_URL}/{}", client.id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/clients/create")
        }
        Err(err) => {
            log::error!("Failed to create client: {err}");
            FlashMessage::error("Failed to add the client.").send();
            redirect(CLIENTS_URL)
        }
    }
}

#[get("/clients/{client_id}")]
pub async fn show_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match clients_service::load_client(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), "clients");
            context.insert("client", &data.client);
            context.insert("fosters", &data.fosters);
            render_template(&tera, "clients/details.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(CLIENTS_URL)
        }
        Err(err) => {
            log::error!("Failed to load client: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/clients/edit/{client_id}")]
pub async fn edit_client_form(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    client_form(
        Some(client_id.into_inner()),
        &user,
        repo.get_ref(),
        &flash_messages,
        &tera,
    )
}

#[post("/clients/edit/{client_id}")]
pub async fn update_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ClientForm>,
) -> impl Responder {
    let client_id = client_id.into_inner();
    let edit_url = format!("{CLIENTS_URL}/edit/{client_id}");

    match clients_service::update_client(repo.get_ref(), &user, client_id, form) {
        Ok(client) => {
            FlashMessage::success(format!("Client {} saved.", client.name)).send();
            redirect(&format!("{CLIENTS_URL}/{client_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(CLIENTS_URL)
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
            log::error!("Failed to update client {client_id}: {err}");
            FlashMessage::error("Failed to save the client.").send();
            redirect(&edit_url)
        }
    }
}

#[post("/clients/delete/{client_id}")]
pub async fn delete_client(
    client_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match clients_service::delete_client(repo.get_ref(), &user, client_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Client deleted.").send();
            redirect(CLIENTS_URL)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(CLIENTS_URL)
        }
        Err(err) => {
            log::error!("Failed to delete client: {err}");
            FlashMessage::error("Failed to delete the client.").send();
            redirect(CLIENTS_URL)
        }
    }
}
