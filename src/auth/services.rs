//! Registration, sign-in, password reset, logout and the request gate.
//!
//! Tokens are stateless. Nothing here keeps a session table, so neither
//! logout nor a password reset revokes a token that was already issued;
//! it stays valid until its own expiry.

use std::sync::Arc;

use axum::extract::FromRef;
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use super::{
    jwt::{TokenCodec, TokenError},
    password::{hash_secret, secret_matches, HashError},
    repo::UserRepo,
    repo_types::{NewUser, User, UserStatus},
};
use crate::{error::AppError, state::AppState, store::StoreError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email")]
    InvalidEmail,
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("User already exists")]
    Conflict,
    /// Unknown email or wrong password; callers cannot tell which.
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("No token found")]
    MissingToken,
    #[error("Invalid Token!")]
    InvalidToken(#[source] TokenError),
    #[error("User not found")]
    UserNotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => AuthError::Conflict,
            StoreError::Backend(e) => AuthError::Internal(e),
        }
    }
}

impl From<HashError> for AuthError {
    fn from(e: HashError) -> Self {
        AuthError::Internal(anyhow::Error::new(e).context("password hashing"))
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        let msg = e.to_string();
        match e {
            AuthError::InvalidEmail | AuthError::MissingField(_) => AppError::BadRequest(msg),
            AuthError::Conflict => AppError::Conflict(msg),
            AuthError::InvalidCredentials => AppError::Unauthorized(msg),
            AuthError::MissingToken => AppError::Unauthenticated(msg),
            AuthError::InvalidToken(_) => AppError::Forbidden(msg),
            AuthError::UserNotFound => AppError::NotFound(msg),
            AuthError::Internal(e) => AppError::Internal(e),
        }
    }
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub photo: Option<String>,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepo>,
    tokens: TokenCodec,
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.tokens.clone())
    }
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepo>, tokens: TokenCodec) -> Self {
        Self { users, tokens }
    }

    /// Creates an inactive user. No token is issued here.
    pub async fn register(&self, reg: Registration) -> Result<User, AuthError> {
        let email = normalize_email(&reg.email);
        let username = reg.username.trim().to_string();
        if username.is_empty() {
            return Err(AuthError::MissingField("username"));
        }
        if !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AuthError::InvalidEmail);
        }
        if reg.password.is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            warn!(email = %email, "email already registered");
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_secret(&reg.password)?;
        // The unique index still catches a concurrent registration.
        let user = self
            .users
            .insert(NewUser {
                username,
                email,
                password_hash,
                photo: reg.photo.filter(|p| !p.trim().is_empty()),
            })
            .await?;

        info!(user_id = %user.id, email = %user.email, "user registered");
        Ok(user)
    }

    /// Checks credentials, issues a token and marks the user active.
    pub async fn signin(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!(email = %email, "signin unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        if !secret_matches(password, &user.password_hash)? {
            warn!(user_id = %user.id, "signin invalid password");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.encode(user.id).map_err(anyhow::Error::new)?;
        if !self.users.set_status(&email, UserStatus::Active).await? {
            return Err(AuthError::InvalidCredentials);
        }

        info!(user_id = %user.id, "user signed in");
        Ok(token)
    }

    /// Gate for protected routes. Only the token is checked; the user's
    /// status is never consulted.
    pub fn authenticate(&self, header: Option<&str>) -> Result<Uuid, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer ").or_else(|| h.strip_prefix("bearer ")))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;

        let claims = self.tokens.decode(token).map_err(|e| {
            warn!(error = %e, "rejected bearer token");
            AuthError::InvalidToken(e)
        })?;
        Ok(claims.user_id)
    }

    /// Replaces the password hash for `email`.
    ///
    /// Knowing the email is enough to reset the password, and tokens issued
    /// before the reset stay valid.
    pub async fn forgot_password(&self, email: &str, new_password: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        if self.users.find_by_email(&email).await?.is_none() {
            warn!(email = %email, "password reset for unknown email");
            return Err(AuthError::InvalidCredentials);
        }
        if new_password.is_empty() {
            return Err(AuthError::MissingField("newPassword"));
        }

        let password_hash = hash_secret(new_password)?;
        if !self.users.set_password_hash(&email, &password_hash).await? {
            return Err(AuthError::InvalidCredentials);
        }
        info!(email = %email, "password updated");
        Ok(())
    }

    /// Marks the user inactive. The caller's token keeps working until it expires.
    pub async fn logout(&self, email: &str) -> Result<(), AuthError> {
        let email = normalize_email(email);
        if !self.users.set_status(&email, UserStatus::Inactive).await? {
            warn!(email = %email, "logout for unknown email");
            return Err(AuthError::UserNotFound);
        }
        info!(email = %email, "user logged out");
        Ok(())
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::memory::MemoryStore;

    fn service() -> (AuthService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let tokens = TokenCodec::new("test-secret", Duration::from_secs(3600));
        (AuthService::new(store.clone(), tokens), store)
    }

    fn alice() -> Registration {
        Registration {
            username: "alice".into(),
            email: "alice@x.com".into(),
            password: "pw123".into(),
            photo: None,
        }
    }

    #[tokio::test]
    async fn register_then_signin_embeds_user_id() {
        let (svc, _) = service();
        let user = svc.register(alice()).await.unwrap();
        assert_eq!(user.status, UserStatus::Inactive);
        assert_ne!(user.password_hash, "pw123");

        let token = svc.signin("alice@x.com", "pw123").await.unwrap();
        let header = format!("Bearer {token}");
        assert_eq!(svc.authenticate(Some(&header)).unwrap(), user.id);
    }

    #[tokio::test]
    async fn signin_activates_and_logout_deactivates() {
        let (svc, store) = service();
        svc.register(alice()).await.unwrap();
        svc.signin("alice@x.com", "pw123").await.unwrap();
        let u = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(u.status, UserStatus::Active);

        svc.logout("alice@x.com").await.unwrap();
        let u = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(u.status, UserStatus::Inactive);
    }

    #[tokio::test]
    async fn token_survives_logout() {
        let (svc, _) = service();
        svc.register(alice()).await.unwrap();
        let token = svc.signin("alice@x.com", "pw123").await.unwrap();
        svc.logout("alice@x.com").await.unwrap();
        assert!(svc.authenticate(Some(&format!("Bearer {token}"))).is_ok());
    }

    #[tokio::test]
    async fn duplicate_registration_conflicts() {
        let (svc, store) = service();
        let first = svc.register(alice()).await.unwrap();
        let mut again = alice();
        again.username = "impostor".into();
        again.email = "  ALICE@x.com ".into();
        assert!(matches!(svc.register(again).await, Err(AuthError::Conflict)));

        let kept = store.find_by_email("alice@x.com").await.unwrap().unwrap();
        assert_eq!(kept.id, first.id);
        assert_eq!(kept.username, "alice");
    }

    #[tokio::test]
    async fn register_validates_input() {
        let (svc, _) = service();
        let mut bad = alice();
        bad.email = "not-an-email".into();
        assert!(matches!(svc.register(bad).await, Err(AuthError::InvalidEmail)));

        let mut bad = alice();
        bad.username = "  ".into();
        assert!(matches!(
            svc.register(bad).await,
            Err(AuthError::MissingField("username"))
        ));
    }

    #[tokio::test]
    async fn signin_failures_share_one_message() {
        let (svc, _) = service();
        svc.register(alice()).await.unwrap();
        let unknown = svc.signin("bob@x.com", "pw123").await.unwrap_err();
        let wrong = svc.signin("alice@x.com", "nope").await.unwrap_err();
        assert!(matches!(unknown, AuthError::InvalidCredentials));
        assert!(matches!(wrong, AuthError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn forgot_password_swaps_credentials() {
        let (svc, _) = service();
        svc.register(alice()).await.unwrap();
        svc.forgot_password("alice@x.com", "new-pw").await.unwrap();
        assert!(svc.signin("alice@x.com", "pw123").await.is_err());
        assert!(svc.signin("alice@x.com", "new-pw").await.is_ok());

        assert!(matches!(
            svc.forgot_password("ghost@x.com", "x").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn logout_unknown_email_is_not_found() {
        let (svc, _) = service();
        assert!(matches!(
            svc.logout("ghost@x.com").await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn gate_distinguishes_missing_from_invalid() {
        let (svc, _) = service();
        assert!(matches!(svc.authenticate(None), Err(AuthError::MissingToken)));
        assert!(matches!(svc.authenticate(Some("Bearer")), Err(AuthError::MissingToken)));
        assert!(matches!(svc.authenticate(Some("Token abc")), Err(AuthError::MissingToken)));
        assert!(matches!(
            svc.authenticate(Some("Bearer abc.def.ghi")),
            Err(AuthError::InvalidToken(TokenError::InvalidSignature))
        ));
    }

    #[test]
    fn gate_rejects_expired_token() {
        let (svc, _) = service();
        let issued = time::OffsetDateTime::now_utc() - time::Duration::hours(2);
        let token = svc.tokens.encode_at(Uuid::new_v4(), issued).unwrap();
        assert!(matches!(
            svc.authenticate(Some(&format!("Bearer {token}"))),
            Err(AuthError::InvalidToken(TokenError::Expired))
        ));
    }

    #[tokio::test]
    async fn corrupt_stored_hash_is_internal_not_bad_credentials() {
        let (svc, store) = service();
        store
            .insert(NewUser {
                username: "alice".into(),
                email: "alice@x.com".into(),
                password_hash: "garbage".into(),
                photo: None,
            })
            .await
            .unwrap();
        let err = svc.signin("alice@x.com", "pw123").await.unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(
            AppError::from(err).status(),
            axum::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@x.com"));
        assert!(!is_valid_email("alice@x"));
        assert!(!is_valid_email("al ice@x.com"));
        assert_eq!(normalize_email("  Bob@Example.COM "), "bob@example.com");
    }
}
