//! User service: accounts, passwords and session tokens.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use biznetworq_common::{AppError, AppResult, IdGenerator, TokenSigner};
use biznetworq_db::{entities::user, repositories::UserRepository};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

#[allow(clippy::expect_used)]
static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,32}$").expect("valid username pattern"));

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    tokens: TokenSigner,
    id_gen: IdGenerator,
}

/// Input for signing up.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SignupInput {
    #[validate(regex(
        path = *USERNAME_RE,
        message = "Username must be 3-32 letters, digits or underscores"
    ))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(length(max = 128))]
    pub name: Option<String>,
}

/// Input for signing in with a username or an email address.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SigninInput {
    #[validate(length(min = 1, max = 256))]
    pub login: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Input for updating the caller's profile.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(max = 128))]
    pub name: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    /// Blank clears the avatar; anything else must be a URL.
    #[validate(custom(function = "blank_or_url"))]
    pub avatar_url: Option<String>,
}

fn blank_or_url(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() || value.trim().validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

/// User as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub is_admin: bool,
    pub created_at: String,
}

impl UserResponse {
    /// Public view of a user, without the email address.
    #[must_use]
    pub fn public(user: user::Model) -> Self {
        Self {
            email: None,
            ..Self::from(user)
        }
    }
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: Some(user.email),
            name: user.name,
            avatar_url: user.avatar_url,
            bio: user.bio,
            is_admin: user.is_admin,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// A signed-in session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user: UserResponse,
    pub token: String,
    pub expires_at: String,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, tokens: TokenSigner) -> Self {
        Self {
            user_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account and open a session for it.
    pub async fn signup(&self, input: SignupInput) -> AppResult<AuthSession> {
        input.validate()?;

        let email = input.email.trim().to_lowercase();

        if self.user_repo.username_taken(&input.username).await? {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }
        if self.user_repo.email_taken(&email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(input.username.to_lowercase()),
            username: Set(input.username),
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(input.name.filter(|n| !n.trim().is_empty())),
            avatar_url: Set(None),
            bio: Set(None),
            is_admin: Set(false),
            created_at: Set(Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

        self.open_session(user)
    }

    /// Sign in by username or email.
    ///
    /// Unknown accounts and wrong passwords fail the same way.
    pub async fn signin(&self, input: SigninInput) -> AppResult<AuthSession> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_login(input.login.trim())
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password_hash)? {
            tracing::debug!(user_id = %user.id, "Rejected sign-in");
            return Err(AppError::Unauthorized);
        }

        self.open_session(user)
    }

    /// Resolve a session token to its user.
    pub async fn authenticate_token(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(token)?;
        self.user_repo
            .find_by_id(&claims.sub)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Update the caller's profile. Empty strings clear a field.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(non_empty(name));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(non_empty(bio));
        }
        if let Some(avatar_url) = input.avatar_url {
            active.avatar_url = Set(non_empty(avatar_url));
        }

        active.updated_at = Set(Some(Utc::now().into()));

        self.user_repo.update(active).await
    }

    fn open_session(&self, user: user::Model) -> AppResult<AuthSession> {
        let token = self.tokens.issue(&user.id, &user.username, user.is_admin)?;
        let expires_at = (Utc::now() + self.tokens.ttl()).to_rfc3339();

        Ok(AuthSession {
            user: user.into(),
            token,
            expires_at,
        })
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::test_support::{self, count_rows, mock_db};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn service(db: MockDatabase) -> UserService {
        UserService::new(UserRepository::new(mock_db(db)), test_support::signer())
    }

    fn signup_input(username: &str) -> SignupInput {
        SignupInput {
            username: username.to_string(),
            email: "Alice@Example.com".to_string(),
            password: "correct horse battery".to_string(),
            name: None,
        }
    }

    #[test]
    fn test_hash_and_verify_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        assert!(verify_password("test", "invalid_hash").is_err());
    }

    #[test]
    fn test_signup_validation() {
        assert!(signup_input("alice_01").validate().is_ok());
        assert!(signup_input("al").validate().is_err());
        assert!(signup_input("alice!").validate().is_err());
        assert!(signup_input(&"a".repeat(33)).validate().is_err());

        let mut input = signup_input("alice");
        input.password = "short".to_string();
        assert!(input.validate().is_err());

        let mut input = signup_input("alice");
        input.email = "not-an-email".to_string();
        assert!(input.validate().is_err());
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_username() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([count_rows(1)]);

        let result = service(db).signup(signup_input("Alice")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count_rows(0)])
            .append_query_results([count_rows(1)]);

        let result = service(db).signup(signup_input("alice")).await;
        match result {
            Err(AppError::Conflict(message)) => assert!(message.contains("Email")),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_signup_issues_token() {
        let created = test_support::user("u1", "alice");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([count_rows(0)])
            .append_query_results([count_rows(0)])
            .append_query_results([[created]]);

        let session = service(db).signup(signup_input("alice")).await.unwrap();
        assert_eq!(session.user.username, "alice");

        let claims = test_support::signer().verify(&session.token).unwrap();
        assert_eq!(claims.sub, "u1");
    }

    #[tokio::test]
    async fn test_signin_unknown_user_is_unauthorized() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(db)
            .signin(SigninInput {
                login: "ghost".to_string(),
                password: "whatever123".to_string(),
            })
            .await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_signin_checks_password() {
        let mut alice = test_support::user("u1", "alice");
        alice.password_hash = hash_password("correct horse battery").unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[alice.clone()]])
            .append_query_results([[alice]]);
        let service = service(db);

        let wrong = service
            .signin(SigninInput {
                login: "alice".to_string(),
                password: "wrong password".to_string(),
            })
            .await;
        assert!(matches!(wrong, Err(AppError::Unauthorized)));

        let session = service
            .signin(SigninInput {
                login: "alice".to_string(),
                password: "correct horse battery".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(session.user.id, "u1");
    }

    #[tokio::test]
    async fn test_authenticate_token() {
        let alice = test_support::user("u1", "alice");
        let token = test_support::signer().issue("u1", "alice", false).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[alice]]);

        let user = service(db).authenticate_token(&token).await.unwrap();
        assert_eq!(user.username, "alice");
    }

    #[tokio::test]
    async fn test_authenticate_token_for_deleted_user() {
        let token = test_support::signer().issue("gone", "gone", false).unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()]);

        let result = service(db).authenticate_token(&token).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_update_profile_blank_avatar_clears_it() {
        let mut current = test_support::user("u1", "alice");
        current.avatar_url = Some("https://cdn.example.com/a.png".to_string());
        let cleared = test_support::user("u1", "alice");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[current]])
            .append_query_results([[cleared]]);

        let updated = service(db)
            .update_profile(
                "u1",
                UpdateProfileInput {
                    avatar_url: Some("  ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.avatar_url.is_none());
    }

    #[tokio::test]
    async fn test_update_profile_rejects_bad_avatar_url() {
        let result = service(MockDatabase::new(DatabaseBackend::Postgres))
            .update_profile(
                "u1",
                UpdateProfileInput {
                    avatar_url: Some("not a url".to_string()),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_public_response_hides_email() {
        let response = UserResponse::public(test_support::user("u1", "alice"));
        assert!(response.email.is_none());

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("passwordHash").is_none());
    }
}
