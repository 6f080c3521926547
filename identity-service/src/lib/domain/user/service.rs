use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::ClassMismatch;
use auth::TokenError;
use chrono::Utc;
use tokio_util::sync::CancellationToken;

use crate::domain::user::models::AuthResult;
use crate::domain::user::models::LoginInput;
use crate::domain::user::models::RegisterInput;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::validation::ValidationConfig;
use crate::domain::validation::ValidationPipeline;
use crate::user::errors::AuthError;
use crate::user::errors::RepositoryError;
use crate::user::ports::AuthServicePort;
use crate::user::ports::UserRepository;

/// Domain service implementation for authentication.
///
/// Composes the validation pipelines, the authenticator (password hashing
/// and tokens) and a user repository.
pub struct AuthService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    registration_rules: ValidationPipeline,
    login_rules: ValidationPipeline,
    /// Verified against when the email is unknown, so both login failures
    /// cost one hash verification.
    decoy_hash: String,
}

const DECOY_PASSWORD: &str = "decoy-password-never-matches";

/// Hash a login attempt is checked against.
enum StoredHash {
    Account(String),
    Decoy,
}

impl<UR> AuthService<UR>
where
    UR: UserRepository,
{
    /// Create a service with the standard registration and login pipelines.
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        validation: Arc<ValidationConfig>,
    ) -> Self {
        Self::with_pipelines(
            repository,
            authenticator,
            ValidationPipeline::registration(validation),
            ValidationPipeline::login(),
        )
    }

    pub fn with_pipelines(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        registration_rules: ValidationPipeline,
        login_rules: ValidationPipeline,
    ) -> Self {
        let decoy_hash = authenticator
            .hash_password(DECOY_PASSWORD)
            .unwrap_or_else(|e| {
                tracing::error!(error = %e, "Failed to prepare decoy password hash");
                String::new()
            });

        Self {
            repository,
            authenticator,
            registration_rules,
            login_rules,
            decoy_hash,
        }
    }

    async fn hash_password(
        &self,
        password: String,
        cancel: &CancellationToken,
    ) -> Result<String, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let hashed = cancellable(cancel, "hash_password", async move {
            blocking("hash_password", move || authenticator.hash_password(&password)).await
        })
        .await?;

        hashed.map_err(|source| AuthError::PasswordHashing {
            operation: "register",
            source,
        })
    }

    async fn verify_password(
        &self,
        password: &str,
        stored: StoredHash,
        cancel: &CancellationToken,
    ) -> Result<bool, AuthError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let (hash, is_decoy) = match stored {
            StoredHash::Account(hash) => (hash, false),
            StoredHash::Decoy => (self.decoy_hash.clone(), true),
        };

        cancellable(cancel, "verify_password", async move {
            blocking("verify_password", move || {
                authenticator.verify_password(&password, &hash) && !is_decoy
            })
            .await
        })
        .await
    }

    fn issue(&self, user: User, operation: &'static str) -> Result<AuthResult, AuthError> {
        let tokens = self
            .authenticator
            .issue_tokens(&user.id.to_string())
            .map_err(|source| AuthError::TokenIssuance { operation, source })?;

        Ok(AuthResult { user, tokens })
    }
}

#[async_trait]
impl<UR> AuthServicePort for AuthService<UR>
where
    UR: UserRepository,
{
    async fn register(
        &self,
        input: RegisterInput,
        cancel: &CancellationToken,
    ) -> Result<AuthResult, AuthError> {
        let input = input.normalized();

        if let Err(errors) = self.registration_rules.validate(input.payload()) {
            tracing::debug!(violations = errors.len(), "Registration rejected by validation");
            return Err(AuthError::Validation(errors));
        }
        let account = input.into_account()?;

        let by_email = cancellable(cancel, "find_by_email", async {
            self.repository
                .find_by_email(&account.email)
                .await
                .map_err(storage("register"))
        })
        .await?;
        if by_email.is_some() {
            return Err(AuthError::EmailAlreadyExists(account.email.to_string()));
        }

        let by_username = cancellable(cancel, "find_by_username", async {
            self.repository
                .find_by_username(&account.username)
                .await
                .map_err(storage("register"))
        })
        .await?;
        if by_username.is_some() {
            return Err(AuthError::UsernameAlreadyExists(account.username.to_string()));
        }

        let password_hash = self.hash_password(account.password, cancel).await?;

        let user = User {
            id: UserId::new(),
            username: account.username,
            email: account.email,
            name: account.name,
            password_hash,
            created_at: Utc::now(),
        };

        let created_user = cancellable(cancel, "create_user", async {
            self.repository.create(user).await.map_err(storage("register"))
        })
        .await?;

        tracing::info!(user_id = %created_user.id, "User registered");

        self.issue(created_user, "register")
    }

    async fn login(
        &self,
        input: LoginInput,
        cancel: &CancellationToken,
    ) -> Result<AuthResult, AuthError> {
        let input = input.normalized();
        self.login_rules.validate(input.payload())?;
        let (email, password) = input.into_credentials()?;
        let user = cancellable(cancel, "find_by_email", async {
            self.repository
                .find_by_email(&email)
                .await
                .map_err(storage("login"))
        })
        .await?;

        let Some(user) = user else {
            self.verify_password(&password, StoredHash::Decoy, cancel).await?;
            tracing::warn!(reason = "unknown_email", "Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        let stored = StoredHash::Account(user.password_hash.clone());
        if !self.verify_password(&password, stored, cancel).await? {
            tracing::warn!(reason = "wrong_password", user_id = %user.id, "Login failed");
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        self.issue(user, "login")
    }

    async fn identity_from_token(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<User, AuthError> {
        let claims = self
            .authenticator
            .validate_access_token(token)
            .map_err(|e| match e {
                ClassMismatch::Token(e) => AuthError::InvalidToken(e),
                ClassMismatch::WrongClass(class) => AuthError::WrongTokenClass(class),
            })?;

        let user_id = UserId::from_string(claims.subject())
            .map_err(|e| AuthError::InvalidToken(TokenError::Malformed(e.to_string())))?;

        cancellable(cancel, "find_by_id", async {
            self.repository
                .find_by_id(&user_id)
                .await
                .map_err(storage("identity_from_token"))
        })
        .await?
        .ok_or_else(|| AuthError::IdentityNotFound(user_id.to_string()))
    }
}

/// Race `future` against `cancel`.
async fn cancellable<T, F>(
    cancel: &CancellationToken,
    operation: &'static str,
    future: F,
) -> Result<T, AuthError>
where
    F: Future<Output = Result<T, AuthError>>,
{
    if cancel.is_cancelled() {
        return Err(AuthError::Cancelled(operation));
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(operation, "Operation cancelled");
            Err(AuthError::Cancelled(operation))
        }
        result = future => result,
    }
}

/// Run CPU-bound work off the async executor.
async fn blocking<T, F>(operation: &'static str, work: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::Internal(format!("{operation}: worker failed: {e}")))
}

/// Map repository failures, turning unique violations into conflicts.
fn storage(operation: &'static str) -> impl FnOnce(RepositoryError) -> AuthError {
    move |source| match source {
        RepositoryError::EmailTaken(email) => AuthError::EmailAlreadyExists(email),
        RepositoryError::UsernameTaken(username) => AuthError::UsernameAlreadyExists(username),
        source => AuthError::Repository { operation, source },
    }
}
