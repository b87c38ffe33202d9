use actix_web::{HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::pet::{Gender, Species};
use crate::forms::pets::{PetFilterForm, PetForm};
use crate::repository::DieselRepository;
use crate::routes::{NOT_ALLOWED, NOT_FOUND, base_context, redirect, render_template};
use crate::services::{ServiceError, pets as pets_service};

const PETS_URL: &str = "/admin/pets";

fn pet_url(pet_id: i32) -> String {
    format!("{PETS_URL}/{pet_id}")
}

#[get("/pets")]
pub async fn show_pets(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
    web::Query(filter): web::Query<PetFilterForm>,
) -> impl Responder {
    match pets_service::list_pets(repo.get_ref(), &user, filter) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), "pets");
            context.insert("list", &data);
            context.insert("species", &Species::ALL);
            context.insert("genders", &Gender::ALL);
            render_template(&tera, "pets/index.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(PETS_URL)
        }
        Err(err) => {
            log::error!("Failed to list pets: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/pets/create")]
pub async fn create_pet_form(
    user: AuthenticatedUser,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if !user.is_admin() {
        FlashMessage::error(NOT_ALLOWED).send();
        return redirect("/");
    }

    let mut context = base_context(&flash_messages, Some(&user), "pets");
    context.insert("species", &Species::ALL);
    context.insert("genders", &Gender::ALL);
    render_template(&tera, "pets/form.html", &context)
}

#[post("/pets/create")]
pub async fn create_pet(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PetForm>,
) -> impl Responder {
    match pets_service::create_pet(repo.get_ref(), &user, form) {
        Ok(pet) => {
            FlashMessage::success(format!("Pet {} added.", pet.name)).send();
            redirect(&pet_url(pet.id.get()))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/pets/create")
        }
        Err(err) => {
            log::error!("Failed to create pet: {err}");
            FlashMessage::error("Failed to add the pet.").send();
            redirect(PETS_URL)
        }
    }
}

#[get("/pets/{pet_id}")]
pub async fn show_pet(
    pet_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match pets_service::load_pet(repo.get_ref(), &user, pet_id.into_inner()) {
        Ok(data) => {
            let mut context = base_context(&flash_messages, Some(&user), "pets");
            context.insert("pet", &data.pet);
            context.insert("active_foster", &data.active_foster);
            context.insert("fosters", &data.fosters);
            render_template(&tera, "pets/details.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(PETS_URL)
        }
        Err(err) => {
            log::error!("Failed to load pet: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/pets/edit/{pet_id}")]
pub async fn edit_pet_form(
    pet_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match pets_service::load_pet_for_edit(repo.get_ref(), &user, pet_id.into_inner()) {
        Ok(pet) => {
            let mut context = base_context(&flash_messages, Some(&user), "pets");
            context.insert("pet", &pet);
            context.insert("species", &Species::ALL);
            context.insert("genders", &Gender::ALL);
            render_template(&tera, "pets/form.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(PETS_URL)
        }
        Err(err) => {
            log::error!("Failed to load pet: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/pets/edit/{pet_id}")]
pub async fn update_pet(
    pet_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<PetForm>,
) -> impl Responder {
    let pet_id = pet_id.into_inner();
    let edit_url = format!("{PETS_URL}/edit/{pet_id}");

    match pets_service::update_pet(repo.get_ref(), &user, pet_id, form) {
        Ok(pet) => {
            FlashMessage::success(format!("Pet {} saved.", pet.name)).send();
            redirect(&pet_url(pet_id))
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(PETS_URL)
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
            log::error!("Failed to update pet {pet_id}: {err}");
            FlashMessage::error("Failed to save the pet.").send();
            redirect(&edit_url)
        }
    }
}

#[post("/pets/delete/{pet_id}")]
pub async fn delete_pet(
    pet_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match pets_service::delete_pet(repo.get_ref(), &user, pet_id.into_inner()) {
        Ok(()) => {
            FlashMessage::success("Pet deleted.").send();
            redirect(PETS_URL)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(ServiceError::NotFound) | Err(ServiceError::TypeConstraint(_)) => {
            FlashMessage::error(NOT_FOUND).send();
            redirect(PETS_URL)
        }
        Err(err) => {
            log::error!("Failed to delete pet: {err}");
            FlashMessage::error("Failed to delete the pet.").send();
            redirect(PETS_URL)
        }
    }
}
