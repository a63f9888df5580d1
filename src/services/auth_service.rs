use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::auth::{
    generate_session_token, hash_password, hash_session_token, validate_password_strength,
    verify_password,
};
use crate::config::{AppConfig, BootstrapAdmin};
use crate::database::models::{NewUser, User, UserRole};
use crate::database::{AuthRepository, DatabaseError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid or expired session")]
    InvalidSession,

    #[error("Administrator role required")]
    NotAdmin,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Username must not be empty")]
    EmptyUsername,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        AuthError::Hashing(err.to_string())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub role: String,
}

impl From<&User> for UserInfo {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: UserInfo,
}

/// Logins, session validation and user provisioning.
#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn AuthRepository>,
    session_ttl: Duration,
    min_password_length: usize,
}

impl AuthService {
    pub fn new(repo: Arc<dyn AuthRepository>, config: &AppConfig) -> Self {
        Self {
            repo,
            session_ttl: config.session_ttl(),
            min_password_length: config.security.min_password_length,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let user = match self.repo.find_user_by_username(username).await? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown user '{}'", username);
                return Err(AuthError::InvalidCredentials);
            }
        };
        if !verify_password(password, &user.password_hash)? {
            warn!("Wrong password for user '{}'", username);
            return Err(AuthError::InvalidCredentials);
        }

        let token = generate_session_token();
        let expires_at = Utc::now() + self.session_ttl;
        self.repo
            .create_session(user.id, &hash_session_token(&token), expires_at)
            .await?;
        info!("User '{}' logged in", user.username);

        Ok(LoginResponse {
            token,
            expires_at,
            user: UserInfo::from(&user),
        })
    }

    /// Resolve a bearer token to its user
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let session = self
            .repo
            .find_active_session(&hash_session_token(token), Utc::now())
            .await?
            .ok_or(AuthError::InvalidSession)?;
        self.repo
            .find_user(session.user_id)
            .await?
            .ok_or(AuthError::InvalidSession)
    }

    pub async fn require_admin(&self, token: &str) -> Result<User, AuthError> {
        let user = self.authenticate(token).await?;
        if !user.is_admin() {
            return Err(AuthError::NotAdmin);
        }
        Ok(user)
    }

    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.repo.delete_session(&hash_session_token(token)).await?;
        Ok(())
    }

    pub async fn create_user(&self, username: &str, password: &str, role: UserRole) -> Result<User, AuthError> {
        let username = username.trim();
        if username.is_empty() {
            return Err(AuthError::EmptyUsername);
        }
        validate_password_strength(password, self.min_password_length).map_err(AuthError::WeakPassword)?;

        let user = self
            .repo
            .create_user(&NewUser {
                username: username.to_string(),
                password_hash: hash_password(password)?,
                role,
            })
            .await?;
        info!("Created {} user '{}'", role.as_str(), user.username);
        Ok(user)
    }

    /// Create the configured admin unless a user with that name exists.
    /// Returns whether a user was created.
    pub async fn ensure_admin(&self, admin: &BootstrapAdmin) -> Result<bool, AuthError> {
        if self.repo.find_user_by_username(&admin.username).await?.is_some() {
            info!("Admin user '{}' already exists", admin.username);
            return Ok(false);
        }
        // not subject to the strength policy
        let user = self
            .repo
            .create_user(&NewUser {
                username: admin.username.clone(),
                password_hash: hash_password(&admin.password)?,
                role: UserRole::Admin,
            })
            .await?;
        info!("Bootstrap admin '{}' created", user.username);
        Ok(true)
    }

    pub async fn purge_expired_sessions(&self) -> Result<u64, AuthError> {
        Ok(self.repo.purge_expired_sessions(Utc::now()).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn service(repo: Arc<MemoryStore>) -> AuthService {
        AuthService::new(repo, &AppConfig::for_tests())
    }

    fn admin() -> BootstrapAdmin {
        BootstrapAdmin {
            username: "admin".to_string(),
            password: "admin123".to_string(),
        }
    }

    #[tokio::test]
    async fn login_issues_a_usable_token() {
        let auth = service(Arc::new(MemoryStore::new()));
        assert!(auth.ensure_admin(&admin()).await.unwrap());
        assert!(!auth.ensure_admin(&admin()).await.unwrap());

        let login = auth.login("admin", "admin123").await.unwrap();
        assert_eq!(login.user.role, "admin");
        assert!(login.expires_at > Utc::now());

        let user = auth.require_admin(&login.token).await.unwrap();
        assert_eq!(user.username, "admin");

        auth.logout(&login.token).await.unwrap();
        assert!(matches!(auth.authenticate(&login.token).await, Err(AuthError::InvalidSession)));
    }

    #[tokio::test]
    async fn bad_credentials_are_rejected() {
        let auth = service(Arc::new(MemoryStore::new()));
        auth.ensure_admin(&admin()).await.unwrap();

        assert!(matches!(auth.login("admin", "nope").await, Err(AuthError::InvalidCredentials)));
        assert!(matches!(auth.login("ghost", "admin123").await, Err(AuthError::InvalidCredentials)));
        assert!(matches!(auth.authenticate("not-a-token").await, Err(AuthError::InvalidSession)));
    }

    #[tokio::test]
    async fn plain_users_are_not_admins() {
        let auth = service(Arc::new(MemoryStore::new()));
        auth.create_user("clerk", "clerk-password", UserRole::User).await.unwrap();
        let login = auth.login("clerk", "clerk-password").await.unwrap();

        assert!(auth.authenticate(&login.token).await.is_ok());
        assert!(matches!(auth.require_admin(&login.token).await, Err(AuthError::NotAdmin)));
    }

    #[tokio::test]
    async fn create_user_enforces_policy() {
        let auth = service(Arc::new(MemoryStore::new()));
        assert!(matches!(
            auth.create_user("clerk", "123", UserRole::User).await,
            Err(AuthError::WeakPassword(_))
        ));
        assert!(matches!(
            auth.create_user("  ", "long-password", UserRole::User).await,
            Err(AuthError::EmptyUsername)
        ));
        auth.create_user("clerk", "long-password", UserRole::User).await.unwrap();
        assert!(matches!(
            auth.create_user("clerk", "long-password", UserRole::User).await,
            Err(AuthError::Database(DatabaseError::Conflict(_)))
        ));
    }

    #[tokio::test]
    async fn expired_sessions_do_not_authenticate() {
        let repo = Arc::new(MemoryStore::new());
        let mut config = AppConfig::for_tests();
        config.security.session_ttl_hours = 0;
        let auth = AuthService::new(repo, &config);
        auth.ensure_admin(&admin()).await.unwrap();

        let login = auth.login("admin", "admin123").await.unwrap();
        assert!(matches!(auth.authenticate(&login.token).await, Err(AuthError::InvalidSession)));
        assert_eq!(auth.purge_expired_sessions().await.unwrap(), 1);
    }
}
