use std::fmt;

use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use serde_json::Map;
use serde_json::Value;
use uuid::Uuid;

use crate::domain::validation::rules::collapse_whitespace;
use crate::domain::validation::ValidationCode;
use crate::domain::validation::ValidationError;
use crate::domain::validation::ValidationErrorSet;
use crate::user::errors::UserIdError;

/// User aggregate entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: Username,
    pub email: EmailAddress,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Generate a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a user ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        Uuid::parse_str(s)
            .map(UserId)
            .map_err(|e| UserIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type, normalized to trimmed lowercase like
/// [`EmailAddress`].
///
/// Policy checks happen in the validation pipeline before one is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    pub fn new(username: impl AsRef<str>) -> Self {
        Self(username.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type, normalized to trimmed lowercase so uniqueness is
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn new(email: &str) -> Self {
        Self(email.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Untrusted registration payload.
///
/// Kept as raw JSON until it has passed the validation pipeline, so fields
/// of the wrong type are reported as violations instead of failing
/// deserialization.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisterInput(Value);

impl RegisterInput {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn from_fields(email: &str, username: &str, password: &str, name: &str) -> Self {
        Self(serde_json::json!({
            "email": email,
            "username": username,
            "password": password,
            "name": name,
        }))
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// Trim email, trim and lowercase username, collapse whitespace runs in
    /// the name. Passwords are left untouched.
    pub fn normalized(mut self) -> Self {
        if let Value::Object(fields) = &mut self.0 {
            normalize_field(fields, "email", |s| s.trim().to_string());
            normalize_field(fields, "username", |s| s.trim().to_lowercase());
            normalize_field(fields, "name", collapse_whitespace);
        }
        self
    }

    /// Extract the validated fields.
    ///
    /// # Errors
    /// A `Required` violation for every field that is absent or not text,
    /// which only happens when the pipeline in use does not require it.
    pub fn into_account(self) -> Result<NewAccount, ValidationErrorSet> {
        let mut errors = ValidationErrorSet::new();
        let account = NewAccount {
            email: EmailAddress::new(&required_text(&self.0, "email", &mut errors)),
            username: Username::new(required_text(&self.0, "username", &mut errors)),
            password: required_text(&self.0, "password", &mut errors),
            name: required_text(&self.0, "name", &mut errors),
        };

        errors.into_result().map(|_| account)
    }
}

/// Untrusted login payload, kept as raw JSON for the same reason as
/// [`RegisterInput`].
#[derive(Debug, Clone, PartialEq)]
pub struct LoginInput(Value);

impl LoginInput {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn from_fields(email: &str, password: &str) -> Self {
        Self(serde_json::json!({
            "email": email,
            "password": password,
        }))
    }

    pub fn payload(&self) -> &Value {
        &self.0
    }

    /// Trim the email; the password is left untouched.
    pub fn normalized(mut self) -> Self {
        if let Value::Object(fields) = &mut self.0 {
            normalize_field(fields, "email", |s| s.trim().to_string());
        }
        self
    }

    /// Extract email and password once the login pipeline has passed.
    pub fn into_credentials(self) -> Result<(EmailAddress, String), ValidationErrorSet> {
        let mut errors = ValidationErrorSet::new();
        let email = required_text(&self.0, "email", &mut errors);
        let password = required_text(&self.0, "password", &mut errors);

        errors
            .into_result()
            .map(|_| (EmailAddress::new(&email), password))
    }
}

fn required_text(payload: &Value, field: &str, errors: &mut ValidationErrorSet) -> String {
    match payload.get(field).and_then(Value::as_str) {
        Some(value) => value.to_string(),
        None => {
            errors.push(ValidationError::new(
                field,
                ValidationCode::Required,
                format!("{field} is required"),
            ));
            String::new()
        }
    }
}

fn normalize_field(fields: &mut Map<String, Value>, field: &str, f: impl Fn(&str) -> String) {
    if let Some(Value::String(value)) = fields.get_mut(field) {
        *value = f(value);
    }
}

/// Registration fields after validation.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: EmailAddress,
    pub username: Username,
    pub password: String,
    pub name: String,
}

/// Outcome of a successful registration or login.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub user: User,
    pub tokens: TokenPair,
}
