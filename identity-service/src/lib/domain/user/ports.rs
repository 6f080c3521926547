use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::user::models::AuthResult;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::LoginInput;
use crate::domain::user::models::RegisterInput;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::user::errors::AuthError;
use crate::user::errors::RepositoryError;

/// Port for authentication use cases.
///
/// Every operation observes `cancel` at its blocking points (password
/// hashing and storage) and returns `Cancelled` promptly once it fires.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new account and issue its first tokens.
    ///
    /// # Errors
    /// * `Validation` - Every policy violation in the input, storage untouched
    /// * `EmailAlreadyExists` / `UsernameAlreadyExists` - Unique field collision
    /// * `Cancelled` - `cancel` fired
    /// * `PasswordHashing` / `Repository` / `TokenIssuance` - Internal failure
    async fn register(
        &self,
        input: RegisterInput,
        cancel: &CancellationToken,
    ) -> Result<AuthResult, AuthError>;

    /// Authenticate by email and password.
    ///
    /// # Errors
    /// * `Validation` - Email or password missing, mistyped or malformed
    /// * `InvalidCredentials` - Unknown email or wrong password, indistinguishably
    /// * `Cancelled` - `cancel` fired
    async fn login(
        &self,
        input: LoginInput,
        cancel: &CancellationToken,
    ) -> Result<AuthResult, AuthError>;

    /// Resolve the user an access token was issued to.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed, forged, expired or premature token
    /// * `WrongTokenClass` - A refresh token was presented
    /// * `IdentityNotFound` - Token is valid but the user no longer exists
    /// * `Cancelled` - `cancel` fired
    async fn identity_from_token(
        &self,
        token: &str,
        cancel: &CancellationToken,
    ) -> Result<User, AuthError>;
}

/// Persistence operations for user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailTaken` / `UsernameTaken` - Unique constraint violated
    /// * `Database` - Storage failure
    async fn create(&self, user: User) -> Result<User, RepositoryError>;

    /// Retrieve user by identifier; `None` if absent.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, RepositoryError>;

    /// Retrieve user by username; `None` if absent.
    async fn find_by_username(&self, username: &Username)
        -> Result<Option<User>, RepositoryError>;

    /// Retrieve user by normalized email; `None` if absent.
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, RepositoryError>;
}
