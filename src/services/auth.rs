//! Sign-in, registration and password reset workflows.

use chrono::{Duration, Utc};

use crate::auth::password::{generate_reset_token, hash_secret, verify_secret};
use crate::auth::{AuthenticatedUser, ensure_role};
use crate::domain::client::{Client, NewClient};
use crate::domain::types::{ClientName, UserEmail, UserId};
use crate::domain::user::{NewUser, User, UserRole};
use crate::forms::auth::{
    ForgotPasswordForm, LoginForm, LoginPayload, RegisterForm, RegisterPayload,
    ResetPasswordForm, ResetPasswordPayload,
};
use crate::models::config::ServerConfig;
use crate::repository::{UserReader, UserWriter};
use crate::services::{ServiceError, ServiceResult};

/// Signed-in account and the JWT identifying it.
#[derive(Debug)]
pub struct SignedIn {
    pub user: User,
    pub token: String,
}

fn sign(user: &User, ttl: Duration, secret: &str) -> ServiceResult<String> {
    AuthenticatedUser::new(user, ttl)
        .to_jwt(secret)
        .map_err(|e| ServiceError::Internal(format!("sign token: {e}")))
}

fn issue_token(config: &ServerConfig, user: User) -> ServiceResult<SignedIn> {
    let token = sign(&user, Duration::minutes(config.token_ttl_minutes), &config.secret)?;
    Ok(SignedIn { user, token })
}

/// Token stored in the admin session cookie; lives as long as the session.
pub fn session_token(config: &ServerConfig, user: &User) -> ServiceResult<String> {
    sign(user, Duration::days(config.session_ttl_days), &config.secret)
}

/// Checks the credentials and issues a token.
///
/// Unknown emails, accounts without a password and wrong passwords all fail
/// the same way.
pub fn login<R>(repo: &R, config: &ServerConfig, form: LoginForm) -> ServiceResult<SignedIn>
where
    R: UserReader + ?Sized,
{
    let payload = LoginPayload::try_from(form)?;

    let credentials = repo
        .get_user_credentials_by_email(&payload.email)?
        .ok_or(ServiceError::Unauthorized)?;
    let valid = credentials
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_secret(&payload.password, hash));
    if !valid {
        log::info!("Failed sign-in for {}", payload.email);
        return Err(ServiceError::Unauthorized);
    }

    issue_token(config, credentials.user)
}

fn new_user(payload: &RegisterPayload, role: UserRole) -> ServiceResult<NewUser> {
    Ok(NewUser {
        id: UserId::generate(),
        email: payload.email.clone(),
        name: payload.name.clone(),
        phone: None,
        role,
        password_hash: Some(hash_secret(&payload.password)?),
    })
}

fn ensure_email_free<R>(repo: &R, email: &UserEmail) -> ServiceResult<()>
where
    R: UserReader + ?Sized,
{
    if repo.get_user_by_email(email)?.is_some() {
        return Err(ServiceError::Form(format!(
            "An account for {email} already exists."
        )));
    }
    Ok(())
}

/// Registers a staff account from the admin sign-up page.
pub fn register_admin<R>(
    repo: &R,
    config: &ServerConfig,
    form: RegisterForm,
) -> ServiceResult<SignedIn>
where
    R: UserReader + UserWriter + ?Sized,
{
    let payload = RegisterPayload::try_from(form)?;
    ensure_email_free(repo, &payload.email)?;

    let user = repo.create_user(&new_user(&payload, UserRole::Admin)?)?;

    log::info!("Administrator {} registered", user.email);
    issue_token(config, user)
}

/// Registers an API user together with the client profile used for
/// booking fosters.
pub fn signup<R>(
    repo: &R,
    config: &ServerConfig,
    form: RegisterForm,
) -> ServiceResult<(SignedIn, Client)>
where
    R: UserReader + UserWriter + ?Sized,
{
    let payload = RegisterPayload::try_from(form)?;
    ensure_email_free(repo, &payload.email)?;

    let client_name = payload
        .name
        .as_ref()
        .map(|name| name.as_str())
        .unwrap_or(payload.email.as_str());
    let new_client = NewClient {
        user_id: None,
        name: ClientName::new(client_name)?,
        address: None,
        phone: None,
        description: None,
    };

    let (user, client) =
        repo.create_user_with_client(&new_user(&payload, UserRole::User)?, &new_client)?;

    log::info!("User {} signed up with client {}", user.email, client.id);
    Ok((issue_token(config, user)?, client))
}

/// Link that completes a password reset.
fn reset_url(config: &ServerConfig, email: &UserEmail, token: &str) -> String {
    let query = serde_html_form::to_string([("email", email.as_str()), ("token", token)])
        .unwrap_or_default();
    let scheme = if config.cookie_secure { "https" } else { "http" };
    format!("{scheme}://{}/admin/reset_password?{query}", config.domain)
}

/// Stores a fresh reset token for `user` and logs the reset link.
fn issue_reset_token<R>(repo: &R, config: &ServerConfig, user: &User) -> ServiceResult<String>
where
    R: UserWriter + ?Sized,
{
    let token = generate_reset_token();
    let expires_at =
        (Utc::now() + Duration::minutes(config.reset_token_ttl_minutes)).naive_utc();
    repo.set_reset_token(user.id, &hash_secret(&token)?, expires_at)?;

    log::info!(
        "Password reset for {}: {}",
        user.email,
        reset_url(config, &user.email, &token)
    );
    Ok(token)
}

/// Starts a password reset. Unknown emails succeed silently.
pub fn forgot_password<R>(
    repo: &R,
    config: &ServerConfig,
    form: ForgotPasswordForm,
) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    let email = UserEmail::try_from(form)?;

    match repo.get_user_by_email(&email)? {
        Some(user) => {
            issue_reset_token(repo, config, &user)?;
        }
        None => log::info!("Password reset requested for unknown email {email}"),
    }
    Ok(())
}

/// Sets a new password when the reset token matches and has not expired.
pub fn reset_password<R>(repo: &R, form: ResetPasswordForm) -> ServiceResult<()>
where
    R: UserReader + UserWriter + ?Sized,
{
    let payload = ResetPasswordPayload::try_from(form)?;
    let invalid = || ServiceError::Form("Invalid or expired reset token.".to_string());

    let credentials = repo
        .get_user_credentials_by_email(&payload.email)?
        .ok_or_else(invalid)?;
    let token_hash = credentials.reset_token_hash.as_deref().ok_or_else(invalid)?;
    let expired = credentials
        .reset_token_expires_at
        .is_none_or(|expires_at| expires_at < Utc::now().naive_utc());
    if expired || !verify_secret(&payload.token, token_hash) {
        return Err(invalid());
    }

    repo.set_password_hash(
        credentials.user.id,
        Some(&hash_secret(&payload.password)?),
    )?;

    log::info!("Password reset completed for {}", credentials.user.email);
    Ok(())
}

/// Removes the user's password and issues a reset token for them.
pub fn reset_user_password<R>(
    repo: &R,
    user: &AuthenticatedUser,
    config: &ServerConfig,
    user_id: &str,
) -> ServiceResult<String>
where
    R: UserReader + UserWriter + ?Sized,
{
    ensure_role(user, UserRole::Admin)?;

    let target = repo
        .get_user_by_id(UserId::try_from(user_id)?)?
        .ok_or(ServiceError::NotFound)?;
    repo.set_password_hash(target.id, None)?;

    issue_reset_token(repo, config, &target)
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::NaiveDateTime;

    use super::*;
    use crate::domain::types::ClientId;
    use crate::domain::user::UserCredentials;
    use crate::repository::mock::MockRepository;
    use crate::services::test_user;

    fn config() -> ServerConfig {
        ServerConfig {
            domain: "localhost:8080".to_string(),
            address: "127.0.0.1".to_string(),
            port: 8080,
            database_url: ":memory:".to_string(),
            templates_dir: "templates/**/*".to_string(),
            secret: "s".repeat(64),
            token_ttl_minutes: 30,
            session_ttl_days: 1,
            reset_token_ttl_minutes: 60,
            cookie_secure: false,
        }
    }

    fn user(email: &str, role: UserRole) -> User {
        User {
            id: UserId::generate(),
            email: UserEmail::new(email).unwrap(),
            name: None,
            phone: None,
            role,
            created_at: NaiveDateTime::default(),
            version: 1,
        }
    }

    fn credentials(password_hash: Option<String>) -> UserCredentials {
        UserCredentials {
            user: user("staff@example.com", UserRole::Admin),
            password_hash,
            reset_token_hash: None,
            reset_token_expires_at: None,
        }
    }

    fn login_form(password: &str) -> LoginForm {
        LoginForm {
            email: "staff@example.com".to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn login_issues_a_verifiable_token() {
        let hash = hash_secret("Secret123").unwrap();
        let mut repo = MockRepository::new();
        repo.expect_get_user_credentials_by_email()
            .returning(move |_| Ok(Some(credentials(Some(hash.clone())))));

        let session = login(&repo, &config(), login_form("Secret123")).unwrap();
        let claims = AuthenticatedUser::from_jwt(&session.token, &config().secret).unwrap();

        assert_eq!(claims.email, "staff@example.com");
        assert_eq!(claims.role, UserRole::Admin);
    }

    #[test]
    fn wrong_or_missing_password_is_unauthorized() {
        let hash = hash_secret("Secret123").unwrap();
        let mut repo = MockRepository::new();
        repo.expect_get_user_credentials_by_email()
            .returning(move |_| Ok(Some(credentials(Some(hash.clone())))));
        assert!(matches!(
            login(&repo, &config(), login_form("Secret124")),
            Err(ServiceError::Unauthorized)
        ));

        let mut repo = MockRepository::new();
        repo.expect_get_user_credentials_by_email()
            .returning(|_| Ok(Some(credentials(None))));
        assert!(matches!(
            login(&repo, &config(), login_form("Secret123")),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn signup_names_the_client_after_the_email() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_create_user_with_client()
            .withf(|new_user, new_client| {
                new_user.role == UserRole::User
                    && new_client.name.as_str() == "new@example.com"
            })
            .times(1)
            .returning(|new_user, new_client| {
                let created = User {
                    id: new_user.id,
                    email: new_user.email.clone(),
                    name: None,
                    phone: None,
                    role: new_user.role,
                    created_at: NaiveDateTime::default(),
                    version: 1,
                };
                let client = Client {
                    id: ClientId::new(1).unwrap(),
                    user_id: Some(new_user.id),
                    name: new_client.name.clone(),
                    address: None,
                    phone: None,
                    description: None,
                    version: 1,
                };
                Ok((created, client))
            });
        let form = RegisterForm {
            email: "new@example.com".to_string(),
            name: None,
            password: "Secret123".to_string(),
            confirm_password: None,
        };

        let (session, client) = signup(&repo, &config(), form).unwrap();

        assert_eq!(client.user_id, Some(session.user.id));
    }

    #[test]
    fn duplicate_email_is_a_form_error() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email()
            .returning(|email| Ok(Some(user(email.as_str(), UserRole::User))));
        repo.expect_create_user().times(0);
        let form = RegisterForm {
            email: "taken@example.com".to_string(),
            name: None,
            password: "Secret123".to_string(),
            confirm_password: Some("Secret123".to_string()),
        };

        assert!(matches!(
            register_admin(&repo, &config(), form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn issued_reset_token_resets_the_password() {
        let stored: Arc<Mutex<Option<(String, NaiveDateTime)>>> = Arc::new(Mutex::new(None));
        let target = user("staff@example.com", UserRole::User);
        let target_id = target.id;

        let mut repo = MockRepository::new();
        let lookup = target.clone();
        repo.expect_get_user_by_id()
            .returning(move |_| Ok(Some(lookup.clone())));
        repo.expect_set_password_hash()
            .withf(|_, hash| hash.is_none())
            .times(1)
            .returning(|_, _| Ok(()));
        let sink = Arc::clone(&stored);
        repo.expect_set_reset_token()
            .times(1)
            .returning(move |_, hash, expires_at| {
                *sink.lock().unwrap() = Some((hash.to_string(), expires_at));
                Ok(())
            });

        let token = reset_user_password(
            &repo,
            &test_user(UserRole::Admin),
            &config(),
            &target_id.to_string(),
        )
        .unwrap();

        let (token_hash, expires_at) = stored.lock().unwrap().clone().unwrap();
        let mut repo = MockRepository::new();
        let owner = target.clone();
        repo.expect_get_user_credentials_by_email().returning(move |_| {
            Ok(Some(UserCredentials {
                user: owner.clone(),
                password_hash: None,
                reset_token_hash: Some(token_hash.clone()),
                reset_token_expires_at: Some(expires_at),
            }))
        });
        repo.expect_set_password_hash()
            .withf(move |id, hash| *id == target_id && hash.is_some())
            .times(1)
            .returning(|_, _| Ok(()));
        let form = ResetPasswordForm {
            email: "staff@example.com".to_string(),
            token,
            password: "Secret123".to_string(),
            confirm_password: Some("Secret123".to_string()),
        };

        reset_password(&repo, form).unwrap();
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_reset_token();
        let token_hash = hash_secret(&token).unwrap();
        let mut repo = MockRepository::new();
        repo.expect_get_user_credentials_by_email().returning(move |_| {
            Ok(Some(UserCredentials {
                reset_token_hash: Some(token_hash.clone()),
                reset_token_expires_at: Some(
                    (Utc::now() - Duration::minutes(1)).naive_utc(),
                ),
                ..credentials(None)
            }))
        });
        repo.expect_set_password_hash().times(0);
        let form = ResetPasswordForm {
            email: "staff@example.com".to_string(),
            token,
            password: "Secret123".to_string(),
            confirm_password: None,
        };

        assert!(matches!(
            reset_password(&repo, form),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn unknown_email_reset_request_succeeds() {
        let mut repo = MockRepository::new();
        repo.expect_get_user_by_email().returning(|_| Ok(None));
        repo.expect_set_reset_token().times(0);

        forgot_password(
            &repo,
            &config(),
            ForgotPasswordForm {
                email: "ghost@example.com".to_string(),
            },
        )
        .unwrap();
    }
}
