//! JSON endpoints under `/api`.
//!
//! Authenticated endpoints read a `Bearer` JWT through the
//! [`AuthenticatedUser`] extractor; failures are reported as
//! `{"error": ...}` with the status chosen by [`api_error`].

use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};
use serde_json::json;

use crate::auth::AuthenticatedUser;
use crate::dto::api::{FosterOutput, PaginatedList, PetOutput, StatsOutput, UserOutput};
use crate::forms::api::{CreateFosterRequest, PageQuery, UpdateMeRequest};
use crate::forms::auth::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
use crate::forms::pets::PetFilterForm;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::api_error;
use crate::services::{
    ServiceError, auth as auth_service, fosters as fosters_service, pets as pets_service,
    stats as stats_service, users as users_service,
};

#[post("/auth/login")]
pub async fn api_login(
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<LoginForm>,
) -> impl Responder {
    match auth_service::login(repo.get_ref(), &server_config, form) {
        Ok(signed_in) => HttpResponse::Ok().json(signed_in.token),
        Err(ServiceError::Form(_)) => api_error(ServiceError::Unauthorized),
        Err(err) => api_error(err),
    }
}

#[post("/auth/signup")]
pub async fn api_signup(
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<RegisterForm>,
) -> impl Responder {
    match auth_service::signup(repo.get_ref(), &server_config, form) {
        Ok((signed_in, _client)) => HttpResponse::Ok().json(signed_in.token),
        Err(err) => api_error(err),
    }
}

/// Always answers 200 so callers cannot probe which emails exist.
#[post("/auth/forgot_password")]
pub async fn api_forgot_password(
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Json(form): web::Json<ForgotPasswordForm>,
) -> impl Responder {
    match auth_service::forgot_password(repo.get_ref(), &server_config, form) {
        Ok(()) | Err(ServiceError::Form(_)) => HttpResponse::Ok().json(json!({})),
        Err(err) => api_error(err),
    }
}

#[post("/auth/reset_password")]
pub async fn api_reset_password(
    repo: web::Data<DieselRepository>,
    web::Json(form): web::Json<ResetPasswordForm>,
) -> impl Responder {
    match auth_service::reset_password(repo.get_ref(), form) {
        Ok(()) => HttpResponse::Ok().json(json!({})),
        Err(err) => api_error(err),
    }
}

#[get("/pets")]
pub async fn api_pets(
    repo: web::Data<DieselRepository>,
    web::Query(filter): web::Query<PetFilterForm>,
) -> impl Responder {
    match pets_service::search_pets(repo.get_ref(), &filter) {
        Ok(pets) => HttpResponse::Ok().json(PaginatedList::<PetOutput>::from(pets)),
        Err(err) => api_error(err),
    }
}

#[get("/pets/{pet_id}")]
pub async fn api_pet(
    pet_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match pets_service::get_pet(repo.get_ref(), pet_id.into_inner()) {
        Ok(pet) => HttpResponse::Ok().json(PetOutput::from(pet)),
        Err(ServiceError::TypeConstraint(_)) => api_error(ServiceError::NotFound),
        Err(err) => api_error(err),
    }
}

#[get("/foster")]
pub async fn api_fosters(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Query(paging): web::Query<PageQuery>,
) -> impl Responder {
    match fosters_service::list_my_fosters(repo.get_ref(), &user, paging) {
        Ok(fosters) => HttpResponse::Ok().json(PaginatedList::<FosterOutput>::from(fosters)),
        Err(err) => api_error(err),
    }
}

#[get("/foster/{foster_id}")]
pub async fn api_foster(
    foster_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match fosters_service::get_my_foster(repo.get_ref(), &user, foster_id.into_inner()) {
        Ok(details) => HttpResponse::Ok().json(FosterOutput::from(details)),
        Err(ServiceError::TypeConstraint(_)) => api_error(ServiceError::NotFound),
        Err(err) => api_error(err),
    }
}

#[post("/foster")]
pub async fn api_create_foster(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(request): web::Json<CreateFosterRequest>,
) -> impl Responder {
    match fosters_service::create_my_foster(repo.get_ref(), &user, request) {
        Ok(details) => HttpResponse::Created().json(FosterOutput::from(details)),
        Err(err) => api_error(err),
    }
}

#[get("/users/me")]
pub async fn api_me(user: AuthenticatedUser, repo: web::Data<DieselRepository>) -> impl Responder {
    match users_service::get_me(repo.get_ref(), &user) {
        Ok(me) => HttpResponse::Ok().json(UserOutput::from(me)),
        Err(err) => api_error(err),
    }
}

#[patch("/users/me")]
pub async fn api_update_me(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    web::Json(request): web::Json<UpdateMeRequest>,
) -> impl Responder {
    match users_service::update_me(repo.get_ref(), &user, request) {
        Ok(me) => HttpResponse::Ok().json(UserOutput::from(me)),
        Err(err) => api_error(err),
    }
}

#[delete("/users/me")]
pub async fn api_delete_me(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match users_service::delete_me(repo.get_ref(), &user) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => api_error(err),
    }
}

#[get("/stats")]
pub async fn api_stats(repo: web::Data<DieselRepository>) -> impl Responder {
    match stats_service::load_stats(repo.get_ref()) {
        Ok(stats) => HttpResponse::Ok().json(StatsOutput::from(stats)),
        Err(err) => api_error(err),
    }
}
