use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::forms::fosters::{FosterFilterForm, FosterForm};
use crate::repository::DieselRepository;
use crate::routes::{NOT_ALLOWED, NOT_FOUND, base_context, redirect, render_template};
use crate::services::{ServiceError, fosters as fosters_service};

const FOSTERS_URL: &str = "/admin/foster";

#[get("/foster")]
pub async fn show_fosters(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(filter): web::Query<FosterFilterForm>,
) -> impl Responder {
    let data = fosters_service::list_fosters(repo.get_ref(), &user, filter).and_then(|list| {
        let options = fosters_service::load_foster_form(repo.get_ref(), &user, None)?;
        Ok((list, options))
    });

    match data {
        Ok((list, options)) => {
            let mut context = base_context(&flash_messages, Some(&user), "foster");
            context.insert("list", &list);
            context.insert("pets", &options.pets);
            context.insert("clients", &options.clients);
            render_template(&tera, "fosters/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(FOSTERS_URL)
        }
        Err(err) => {
            log::error!("Failed to list fosters: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

fn foster_form(
    foster_id: Option<i32>,
    user: &AuthenticatedUser,
    repo: &DieselRepository,
    flash_messages: &IncomingFlashMessages,
    tera: &Tera,
) -> HttpResponse {
    match fosters_service::load_foster_form(repo, user, foster_id) {
        Ok(data) => {
            let mut context = base_context(flash_messages, Some(user), "foster");
            context.insert("foster", &data.foster);
            context.insert("pets", &data.pets);
            context.insert("clients", &data.clients);
            render_template(tera, "fosters/form.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(FOSTERS_URL)
        }
        Err(err) => {
            log::error!("Failed to load foster form: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/foster/create")]
pub async fn create_foster_form(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    foster_form(None, &user, repo.get_ref(), &flash_messages, &tera)
}

#[post("/foster/create")]
pub async fn create_foster(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FosterForm>,
) -> impl Responder {
    let create_url = "/admin/foster/create";

    match fosters_service::create_foster(repo.get_ref(), &user, form) {
        Ok(foster) => {
            FlashMessage::success("Foster added.").send();
            redirect(&format!("{FOSTERS_URL}/{}", foster.id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(err @ ServiceError::FosterInterval(_)) => {
            FlashMessage::error(err.to_string()).send();
            redirect(create_url)
        }
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(create_url)
        }
        Err(err) => {
            log::error!("Failed to create foster: {err}");
            FlashMessage::error("Failed to add the foster.").send();
            redirect(FOSTERS_URL)
        }
    }
}

#[get("/foster/{foster_id}")]
pub async fn show_foster(
    foster_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match fosters_service::load_foster(repo.get_ref(), &user, foster_id.into_inner()) {
        Ok(details) => {
            let mut context = base_context(&flash_messages, Some(&user), "foster");
            context.insert("foster", &details);
            render_template(&tera, "fosters/details.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(FOSTERS_URL)
        }
        Err(err) => {
            log::error!("Failed to load foster: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/foster/edit/{foster_id}")]
pub async fn edit_foster_form(
    foster_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    foster_form(
        Some(foster_id.into_inner()),
        &user,
        repo.get_ref(),
        &flash_messages,
        &tera,
    )
}

#[post("/foster/edit/{foster_id}")]
pub async fn update_foster(
    foster_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<FosterForm>,
) -> impl Responder {
    let foster_id = foster_id.into_inner();
    let edit_url = format!("{FOSTERS_URL}/edit/{foster_id}");

    match fosters_service::update_foster(repo.get_ref(), &user, foster_id, form) {
        Ok(_) => {
            FlashMessage::success("Foster saved.").send();
            redirect(&format!("{FOSTERS_URL}/{foster_id}"))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(FOSTERS_URL)
        }
        Err(err @ ServiceError::Conflict) => {
            FlashMessage::warning(err.to_string()).send();
            redirect(&edit_url)
        }
        Err(err @ ServiceError::FosterInterval(_)) => {
            FlashMessage::error(err.to_string()).send();
            redirect(&edit_url)
        }
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect(&edit_url)
        }
        Err(err) => {
            log::error!("Failed to update foster {foster_id}: {err}");
            FlashMessage::error("Failed to save the foster.").send();
            redirect(&edit_url)
        }
    }
}

#[post("/foster/delete/{foster_id}")]
pub async fn delete_foster(
    foster_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match fosters_service::delete_foster(repo.get_ref(), &user, foster_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Foster deleted.").send();
            redirect(FOSTERS_URL)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(FOSTERS_URL)
        }
        Err(err) => {
            log::error!("Failed to delete foster: {err}");
            FlashMessage::error("Failed to delete the foster.").send();
            redirect(FOSTERS_URL)
        }
    }
}
