//! Sign-in, registration and password reset pages of the admin area.

use actix_identity::Identity;
use actix_web::{HttpMessage, HttpRequest, HttpResponse, Responder, get, post, web};
use actix_web_flash_messages::{FlashMessage, IncomingFlashMessages};
use serde::Deserialize;
use tera::Tera;

use crate::auth::AuthenticatedUser;
use crate::domain::user::UserRole;
use crate::forms::auth::{ForgotPasswordForm, LoginForm, RegisterForm, ResetPasswordForm};
use crate::forms::encode_query;
use crate::middleware::LOGIN_PATH;
use crate::models::config::ServerConfig;
use crate::repository::DieselRepository;
use crate::routes::{NOT_ALLOWED, base_context, redirect, render_template};
use crate::services::{ServiceError, auth as auth_service};

const DASHBOARD_URL: &str = "/admin";

/// Attaches a session token for `user` to the request's identity.
fn sign_in(
    req: &HttpRequest,
    server_config: &ServerConfig,
    signed_in: &auth_service::SignedIn,
) -> HttpResponse {
    let token = match auth_service::session_token(server_config, &signed_in.user) {
        Ok(token) => token,
        Err(err) => {
            log::error!("Failed to issue session token: {err}");
            return HttpResponse::InternalServerError().finish();
        }
    };

    match Identity::login(&req.extensions(), token) {
        Ok(_) => redirect(DASHBOARD_URL),
        Err(err) => {
            log::error!("Failed to attach identity: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[get("/login")]
pub async fn login_page(
    user: Option<AuthenticatedUser>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    if user.as_ref().is_some_and(AuthenticatedUser::is_admin) {
        return redirect(DASHBOARD_URL);
    }
    let context = base_context(&flash_messages, user.as_ref(), "login");
    render_template(&tera, "auth/login.html", &context)
}

#[post("/login")]
pub async fn login(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<LoginForm>,
) -> impl Responder {
    match auth_service::login(repo.get_ref(), &server_config, form) {
        Ok(signed_in) if signed_in.user.role != UserRole::Admin => {
            FlashMessage::error(NOT_ALLOWED).send();
            redirect(LOGIN_PATH)
        }
        Ok(signed_in) => sign_in(&req, &server_config, &signed_in),
        Err(ServiceError::Unauthorized) => {
            FlashMessage::error("Wrong email or password.").send();
            redirect(LOGIN_PATH)
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(LOGIN_PATH)
        }
        Err(err) => {
            log::error!("Failed to sign in: {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

#[post("/logout")]
pub async fn logout(user: Option<Identity>) -> impl Responder {
    if let Some(user) = user {
        user.logout();
    }
    redirect(LOGIN_PATH)
}

#[get("/register")]
pub async fn register_page(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, None, "register");
    render_template(&tera, "auth/register.html", &context)
}

#[post("/register")]
pub async fn register(
    req: HttpRequest,
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<RegisterForm>,
) -> impl Responder {
    match auth_service::register_admin(repo.get_ref(), &server_config, form) {
        Ok(signed_in) => {
            FlashMessage::success("Account created.").send();
            sign_in(&req, &server_config, &signed_in)
        }
        Err(ServiceError::Form(message)) | Err(ServiceError::TypeConstraint(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/register")
        }
        Err(err) => {
            log::error!("Failed to register: {err}");
            FlashMessage::error("Failed to create the account.").send();
            redirect("/admin/register")
        }
    }
}

#[get("/forgot_password")]
pub async fn forgot_password_page(
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let context = base_context(&flash_messages, None, "forgot_password");
    render_template(&tera, "auth/forgot_password.html", &context)
}

#[post("/forgot_password")]
pub async fn forgot_password(
    repo: web::Data<DieselRepository>,
    server_config: web::Data<ServerConfig>,
    web::Form(form): web::Form<ForgotPasswordForm>,
) -> impl Responder {
    match auth_service::forgot_password(repo.get_ref(), &server_config, form) {
        Ok(()) => {
            FlashMessage::info("If the account exists, a reset link has been issued.").send();
            redirect(LOGIN_PATH)
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect("/admin/forgot_password")
        }
        Err(err) => {
            log::error!("Failed to start password reset: {err}");
            FlashMessage::error("Failed to start the password reset.").send();
            redirect("/admin/forgot_password")
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ResetLinkParams {
    #[serde(default)]
    email: String,
    #[serde(default)]
    token: String,
}

#[get("/reset_password")]
pub async fn reset_password_page(
    web::Query(params): web::Query<ResetLinkParams>,
    flash_messages: IncomingFlashMessages,
    tera: web::Data<Tera>,
) -> impl Responder {
    let mut context = base_context(&flash_messages, None, "reset_password");
    context.insert("email", &params.email);
    context.insert("token", &params.token);
    render_template(&tera, "auth/reset_password.html", &context)
}

#[post("/reset_password")]
pub async fn reset_password(
    repo: web::Data<DieselRepository>,
    web::Form(form): web::Form<ResetPasswordForm>,
) -> impl Responder {
    let retry_url = format!(
        "/admin/reset_password?{}",
        encode_query(&[("email", &form.email), ("token", &form.token)])
    );

    match auth_service::reset_password(repo.get_ref(), form) {
        Ok(()) => {
            FlashMessage::success("Password updated, you can sign in now.").send();
            redirect(LOGIN_PATH)
        }
        Err(ServiceError::Form(message)) => {
            FlashMessage::error(message).send();
            redirect(&retry_url)
        }
        Err(err) => {
            log::error!("Failed to reset password: {err}");
            FlashMessage::error("Failed to reset the password.").send();
            redirect(&retry_url)
        }
    }
}
