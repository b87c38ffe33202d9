//! HTTP handlers for the admin pages and the JSON API.

use actix_web::http::StatusCode;
use actix_web::http::header;
use actix_web::HttpResponse;
use actix_web_flash_messages::{IncomingFlashMessages, Level};
use serde_json::json;
use tera::{Context, Tera};

use crate::auth::AuthenticatedUser;
use crate::services::ServiceError;

pub mod api;
pub mod auth;
pub mod clients;
pub mod fosters;
pub mod main;
pub mod pets;
pub mod users;

pub(crate) const NOT_ALLOWED: &str = "Administrator role required.";
pub(crate) const NOT_FOUND: &str = "Record not found.";

/// Maps a flash message level onto a Bootstrap alert class.
pub fn alert_level_to_str(level: &Level) -> &'static str {
    match level {
        Level::Error => "danger",
        Level::Warning => "warning",
        Level::Success => "success",
        _ => "info",
    }
}

/// Context shared by every page: alerts, the signed-in user and the active
/// navigation entry.
pub fn base_context(
    flash_messages: &IncomingFlashMessages,
    user: Option<&AuthenticatedUser>,
    current_page: &str,
) -> Context {
    let alerts = flash_messages
        .iter()
        .map(|f| (f.content(), alert_level_to_str(&f.level())))
        .collect::<Vec<_>>();

    let mut context = Context::new();
    context.insert("alerts", &alerts);
    context.insert("current_user", &user);
    context.insert("current_page", current_page);
    context
}

pub fn render_template(tera: &Tera, template: &str, context: &Context) -> HttpResponse {
    match tera.render(template, context) {
        Ok(body) => HttpResponse::Ok().content_type("text/html").body(body),
        Err(err) => {
            log::error!("Failed to render template '{template}': {err}");
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Status code an API caller receives for a failed service call.
pub fn api_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::Form(_)
        | ServiceError::FosterInterval(_)
        | ServiceError::TypeConstraint(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unauthorized => StatusCode::UNAUTHORIZED,
        ServiceError::NotFound => StatusCode::NOT_FOUND,
        ServiceError::Conflict => StatusCode::CONFLICT,
        ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Renders a failed service call as `{"error": ...}`; internal details are
/// logged, not returned.
pub fn api_error(err: ServiceError) -> HttpResponse {
    let status = api_status(&err);
    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("API request failed: {err}");
        "internal server error".to_string()
    } else {
        err.to_string()
    };
    HttpResponse::build(status).json(json!({ "error": message }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foster_interval::FosterIntervalError;

    #[test]
    fn api_statuses_follow_error_kind() {
        assert_eq!(
            api_status(&ServiceError::Form("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            api_status(&ServiceError::FosterInterval(FosterIntervalError::Overlap)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(api_status(&ServiceError::Conflict), StatusCode::CONFLICT);
        assert_eq!(api_status(&ServiceError::NotFound), StatusCode::NOT_FOUND);
    }

    #[test]
    fn redirect_sets_location() {
        let response = redirect("/admin/pets");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/admin/pets"
        );
    }
}
