use actix_web::{HttpResponse, Responder, get, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::repository::DieselRepository;
use crate::routes::{NOT_ALLOWED, base_context, redirect, render_template};
use crate::services::{ServiceError, stats as stats_service};

#[get("/")]
pub async fn show_index(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, user.as_ref(), "index");
    render_template(&tera, "main/index.html", &context)
}

#[get("")]
pub async fn show_dashboard(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    match stats_service::load_dashboard(repo.get_ref(), &user) {
        Ok(stats) => {
            let mut context = base_context(&flash_messages, Some(&user), "dashboard");
            context.insert("stats", &stats);
            render_template(&tera, "main/dashboard.html", &context)
        }
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect("/")
        }
        Err(err) => {
            log::error!("Failed to load dashboard: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
