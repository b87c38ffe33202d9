//! Shelter management: pets, foster caretakers, foster assignments and user
//! accounts, served as admin pages and a JSON API.

#[cfg(feature = "server")]
use actix_cors::Cors;
#[cfg(feature = "server")]
use actix_files::Files;
#[cfg(feature = "server")]
use actix_identity::IdentityMiddleware;
#[cfg(feature = "server")]
use actix_session::{SessionMiddleware, config::PersistentSession, storage::CookieSessionStore};
#[cfg(feature = "server")]
use actix_web::cookie::{Key, time::Duration};
#[cfg(feature = "server")]
use actix_web::middleware::{Compress, Logger};
#[cfg(feature = "server")]
use actix_web::{App, HttpServer, web};
#[cfg(feature = "server")]
use actix_web_flash_messages::{FlashMessagesFramework, storage::CookieMessageStore};
#[cfg(feature = "server")]
use tera::Tera;

#[cfg(feature = "server")]
use crate::db::establish_connection_pool;
#[cfg(feature = "server")]
use crate::middleware::RedirectUnauthorized;
#[cfg(feature = "server")]
use crate::models::config::ServerConfig;
#[cfg(feature = "server")]
use crate::repository::DieselRepository;

#[cfg(feature = "server")]
pub mod auth;
pub mod db;
pub mod domain;
#[cfg(feature = "server")]
pub mod dto;
mod error_conversions;
#[cfg(feature = "server")]
pub mod forms;
#[cfg(feature = "server")]
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod repository;
#[cfg(feature = "server")]
pub mod routes;
pub mod schema;
#[cfg(feature = "server")]
pub mod services;

/// Shortest secret accepted for signing cookies and tokens.
#[cfg(feature = "server")]
pub const MIN_SECRET_BYTES: usize = 64;

/// Builds and runs the Actix-Web HTTP server using the provided configuration.
#[cfg(feature = "server")]
pub async fn run(server_config: ServerConfig) -> std::io::Result<()> {
    if server_config.secret.len() < MIN_SECRET_BYTES {
        return Err(std::io::Error::other(format!(
            "secret must be at least {MIN_SECRET_BYTES} bytes long"
        )));
    }

    // Establish Diesel connection pool for the SQLite database.
    let pool = establish_connection_pool(&server_config.database_url).map_err(|e| {
        std::io::Error::other(format!("Failed to establish database connection: {e}"))
    })?;

    let repo = DieselRepository::new(pool);

    // Keys and stores for identity, sessions, and flash messages.
    let secret_key = Key::from(server_config.secret.as_bytes());

    let message_store = CookieMessageStore::builder(secret_key.clone()).build();
    let message_framework = FlashMessagesFramework::builder(message_store).build();

    let tera = Tera::new(&server_config.templates_dir)
        .map_err(|e| std::io::Error::other(format!("Template parsing error(s): {e}")))?;

    let bind_address = (server_config.address.clone(), server_config.port);
    log::info!("Listening on {}:{}", bind_address.0, bind_address.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(message_framework.clone())
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(server_config.cookie_secure)
                    .cookie_domain(Some(server_config.domain.clone()))
                    .session_lifecycle(
                        PersistentSession::default()
                            .session_ttl(Duration::days(server_config.session_ttl_days)),
                    )
                    .build(),
            )
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(Files::new("/assets", "./assets"))
            .service(
                web::scope("/api")
                    .service(routes::api::api_login)
                    .service(routes::api::api_signup)
                    .service(routes::api::api_forgot_password)
                    .service(routes::api::api_reset_password)
                    .service(routes::api::api_pets)
                    .service(routes::api::api_pet)
                    .service(routes::api::api_fosters)
                    .service(routes::api::api_create_foster)
                    .service(routes::api::api_foster)
                    .service(routes::api::api_me)
                    .service(routes::api::api_update_me)
                    .service(routes::api::api_delete_me)
                    .service(routes::api::api_stats),
            )
            .service(
                web::scope("/admin")
                    .wrap(RedirectUnauthorized)
                    .service(routes::main::show_dashboard)
                    .service(routes::auth::login_page)
                    .service(routes::auth::login)
                    .service(routes::auth::logout)
                    .service(routes::auth::register_page)
                    .service(routes::auth::register)
                    .service(routes::auth::forgot_password_page)
                    .service(routes::auth::forgot_password)
                    .service(routes::auth::reset_password_page)
                    .service(routes::auth::reset_password)
                    .service(routes::pets::show_pets)
                    .service(routes::pets::create_pet_form)
                    .service(routes::pets::create_pet)
                    .service(routes::pets::show_pet)
                    .service(routes::pets::edit_pet_form)
                    .service(routes::pets::update_pet)
                    .service(routes::pets::delete_pet)
                    .service(routes::clients::show_clients)
                    .service(routes::clients::create_client_form)
                    .service(routes::clients::create_client)
                    .service(routes::clients::show_client)
                    .service(routes::clients::edit_client_form)
                    .service(routes::clients::update_client)
                    .service(routes::clients::delete_client)
                    .service(routes::fosters::show_fosters)
                    .service(routes::fosters::create_foster_form)
                    .service(routes::fosters::create_foster)
                    .service(routes::fosters::show_foster)
                    .service(routes::fosters::edit_foster_form)
                    .service(routes::fosters::update_foster)
                    .service(routes::fosters::delete_foster)
                    .service(routes::users::show_users)
                    .service(routes::users::create_user_form)
                    .service(routes::users::create_user)
                    .service(routes::users::show_user)
                    .service(routes::users::edit_user_form)
                    .service(routes::users::update_user)
                    .service(routes::users::reset_user_password)
                    .service(routes::users::delete_user),
            )
            .service(routes::main::show_index)
            .app_data(web::Data::new(tera.clone()))
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(server_config.clone()))
    })
    .bind(bind_address)?
    .run()
    .await
}
