use std::fmt;

use http::StatusCode;
use serde::Serialize;

/// Machine-readable validation failure codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationCode {
    /// Value is missing, null or blank
    Required,
    /// Value has the wrong JSON type (e.g. a number where text is expected)
    InvalidType,
    InvalidEmail,
    /// Password misses one or more policy requirements
    WeakPassword,
    /// Password is on the disallowed list
    DisallowedPassword,
    TooShort,
    TooLong,
    InvalidCharacters,
    ReservedValue,
    ProfaneValue,
    ConsecutiveSpecialCharacters,
    LeadingOrTrailingSpecialCharacter,
}

impl ValidationCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::InvalidType => "invalid_type",
            Self::InvalidEmail => "invalid_email",
            Self::WeakPassword => "weak_password",
            Self::DisallowedPassword => "disallowed_password",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::InvalidCharacters => "invalid_characters",
            Self::ReservedValue => "reserved_value",
            Self::ProfaneValue => "profane_value",
            Self::ConsecutiveSpecialCharacters => "consecutive_special_characters",
            Self::LeadingOrTrailingSpecialCharacter => "leading_or_trailing_special_character",
        }
    }

    /// Status suggested for a response carrying only this failure.
    ///
    /// Structural problems are a bad request; policy violations on
    /// well-formed input are unprocessable.
    pub fn suggested_status(&self) -> StatusCode {
        match self {
            Self::Required | Self::InvalidType => StatusCode::BAD_REQUEST,
            _ => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl fmt::Display for ValidationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field-level policy violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub code: ValidationCode,
    pub field: String,
    pub message: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl ValidationError {
    /// Create an error whose status is the code's suggested status.
    pub fn new(field: impl Into<String>, code: ValidationCode, message: impl Into<String>) -> Self {
        Self {
            code,
            field: field.into(),
            message: message.into(),
            status: code.suggested_status(),
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Every violation found in one input, in rule registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrorSet {
    errors: Vec<ValidationError>,
}

impl ValidationErrorSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Violations reported for `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// The most severe member status; 200 for an empty set.
    pub fn status(&self) -> StatusCode {
        self.errors
            .iter()
            .map(|e| e.status)
            .max_by_key(|status| status.as_u16())
            .unwrap_or(StatusCode::OK)
    }

    /// `Ok(())` for an empty set, otherwise the set itself as the error.
    pub fn into_result(self) -> Result<(), Self> {
        if self.has_errors() {
            Err(self)
        } else {
            Ok(())
        }
    }
}

impl Extend<ValidationError> for ValidationErrorSet {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        self.errors.extend(iter);
    }
}

impl IntoIterator for ValidationErrorSet {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{}", messages.join("; "))
    }
}

impl std::error::Error for ValidationErrorSet {}
