use std::str::FromStr;
use std::sync::Arc;

use serde_json::Value;

use super::config::ValidationConfig;
use super::errors::ValidationCode;
use super::errors::ValidationError;

/// Maximum length of an email address (RFC 5321 path limit).
const EMAIL_MAX_LENGTH: usize = 254;

/// A named, pure check of one field value.
///
/// Rules never panic on unexpected input: a value of the wrong shape is
/// reported as a violation like any other.
pub trait ValidationRule: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, field: &str, value: &Value) -> Vec<ValidationError>;
}

/// Text of a present value.
///
/// `Ok(None)` for null or blank values, which policy rules leave to
/// [`Required`]; `Err` for any non-string value.
fn text<'a>(field: &str, value: &'a Value) -> Result<Option<&'a str>, ValidationError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.as_str())),
        other => Err(ValidationError::new(
            field,
            ValidationCode::InvalidType,
            format!("{field} must be a string, got {}", json_type(other)),
        )),
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Runs `check` on the text of `value`, reporting at most one violation.
fn check_text(
    field: &str,
    value: &Value,
    check: impl FnOnce(&str) -> Option<ValidationError>,
) -> Vec<ValidationError> {
    match text(field, value) {
        Ok(Some(s)) => check(s).into_iter().collect(),
        Ok(None) => Vec::new(),
        Err(e) => vec![e],
    }
}

fn length_error(field: &str, length: usize, min: usize, max: usize) -> Option<ValidationError> {
    if length < min {
        Some(ValidationError::new(
            field,
            ValidationCode::TooShort,
            format!("{field} must be at least {min} characters"),
        ))
    } else if length > max {
        Some(ValidationError::new(
            field,
            ValidationCode::TooLong,
            format!("{field} must be at most {max} characters"),
        ))
    } else {
        None
    }
}

/// Value must be present and non-blank.
pub struct Required;

impl ValidationRule for Required {
    fn name(&self) -> &'static str {
        "required"
    }

    fn check(&self, field: &str, value: &Value) -> Vec<ValidationError> {
        let missing = match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        };

        if missing {
            vec![ValidationError::new(
                field,
                ValidationCode::Required,
                format!("{field} is required"),
            )]
        } else {
            Vec::new()
        }
    }
}

/// Value, when present, must be a string.
pub struct Text;

impl ValidationRule for Text {
    fn name(&self) -> &'static str {
        "text"
    }

    fn check(&self, field: &str, value: &Value) -> Vec<ValidationError> {
        check_text(field, value, |_| None)
    }
}

/// Value must be a syntactically valid email address.
pub struct Email;

impl ValidationRule for Email {
    fn name(&self) -> &'static str {
        "email"
    }

    fn check(&self, field: &str, value: &Value) -> Vec<ValidationError> {
        check_text(field, value, |email| {
            let valid = email.len() <= EMAIL_MAX_LENGTH
                && email_address::EmailAddress::from_str(email).is_ok();

            (!valid).then(|| {
                ValidationError::new(
                    field,
                    ValidationCode::InvalidEmail,
                    format!("{field} must be a valid email address"),
                )
            })
        })
    }
}

/// Password length, required character classes and the disallowed list.
///
/// All unmet requirements are folded into one violation so the client sees
/// the complete policy in a single message.
pub struct PasswordPolicy {
    config: Arc<ValidationConfig>,
}

impl PasswordPolicy {
    pub fn new(config: Arc<ValidationConfig>) -> Self {
        Self { config }
    }

    fn unmet_requirements(&self, password: &str) -> Vec<String> {
        let length = password.chars().count();
        let mut unmet = Vec::new();

        if length < self.config.password_min_length {
            unmet.push(format!(
                "at least {} characters",
                self.config.password_min_length
            ));
        }
        if length > self.config.password_max_length {
            unmet.push(format!(
                "at most {} characters",
                self.config.password_max_length
            ));
        }
        for class in &self.config.password_required_classes {
            if !password.chars().any(|c| class.matches(c)) {
                unmet.push(class.describe().to_string());
            }
        }

        unmet
    }
}

impl ValidationRule for PasswordPolicy {
    fn name(&self) -> &'static str {
        "password_policy"
    }

    fn check(&self, field: &str, value: &Value) -> Vec<ValidationError> {
        check_text(field, value, |password| {
            let lowered = password.to_lowercase();
            if self
                .config
                .disallowed_passwords
                .iter()
                .any(|p| p.to_lowercase() == lowered)
            {
                return Some(ValidationError::new(
                    field,
                    ValidationCode::DisallowedPassword,
                    format!("{field} is too common, choose another"),
                ));
            }

            let unmet = self.unmet_requirements(password);
            (!unmet.is_empty()).then(|| {
                ValidationError::new(
                    field,
                    ValidationCode::WeakPassword,
                    format!("{field} must contain {}", unmet.join(", ")),
                )
            })
        })
    }
}

/// Username length, character set, reserved names and profanity.
pub struct UsernamePolicy {
    config: Arc<ValidationConfig>,
}

impl UsernamePolicy {
    pub fn new(config: Arc<ValidationConfig>) -> Self {
        Self { config }
    }
}

impl ValidationRule for UsernamePolicy {
    fn name(&self) -> &'static str {
        "username_policy"
    }

    fn check(&self, field: &str, value: &Value) -> Vec<ValidationError> {
        check_text(field, value, |username| {
            let config = &self.config;

            if let Some(e) = length_error(
                field,
                username.chars().count(),
                config.username_min_length,
                config.username_max_length,
            ) {
                return Some(e);
            }

            if !username
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            {
                return Some(ValidationError::new(
                    field,
                    ValidationCode::InvalidCharacters,
                    format!("{field} may only contain letters, digits, underscores and hyphens"),
                ));
            }

            let lowered = username.to_lowercase();
            if config
                .reserved_usernames
                .iter()
                .any(|r| r.to_lowercase() == lowered)
            {
                return Some(ValidationError::new(
                    field,
                    ValidationCode::ReservedValue,
                    format!("{field} '{username}' is reserved"),
                ));
            }

            if config
                .profane_words
                .iter()
                .any(|w| !w.is_empty() && lowered.contains(&w.to_lowercase()))
            {
                return Some(ValidationError::new(
                    field,
                    ValidationCode::ProfaneValue,
                    format!("{field} contains disallowed language"),
                ));
            }

            None
        })
    }
}

/// Display name length and character rules.
///
/// Letters plus the configured special characters; specials may not repeat
/// back to back, nor open or close the name.
pub struct NamePolicy {
    config: Arc<ValidationConfig>,
}

impl NamePolicy {
    pub fn new(config: Arc<ValidationConfig>) -> Self {
        Self { config }
    }
}

impl ValidationRule for NamePolicy {
    fn name(&self) -> &'static str {
        "name_policy"
    }

    fn check(&self, field: &str, value: &Value) -> Vec<ValidationError> {
        check_text(field, value, |name| {
            let config = &self.config;

            if let Some(e) = length_error(
                field,
                name.chars().count(),
                config.name_min_length,
                config.name_max_length,
            ) {
                return Some(e);
            }

            if !name
                .chars()
                .all(|c| c.is_alphabetic() || config.is_name_special(c))
            {
                return Some(ValidationError::new(
                    field,
                    ValidationCode::InvalidCharacters,
                    format!(
                        "{field} may only contain letters and the characters {:?}",
                        config.name_special_characters
                    ),
                ));
            }

            let first = name.chars().next();
            let last = name.chars().last();
            if first.is_some_and(|c| config.is_name_special(c))
                || last.is_some_and(|c| config.is_name_special(c))
            {
                return Some(ValidationError::new(
                    field,
                    ValidationCode::LeadingOrTrailingSpecialCharacter,
                    format!("{field} must start and end with a letter"),
                ));
            }

            // Whitespace runs are collapsed during normalization, so only
            // punctuation pairs like "--" or ".'" count here
            let punctuation = |c: char| !c.is_whitespace() && config.is_name_special(c);
            let chars: Vec<char> = name.chars().collect();
            if chars
                .windows(2)
                .any(|pair| punctuation(pair[0]) && punctuation(pair[1]))
            {
                return Some(ValidationError::new(
                    field,
                    ValidationCode::ConsecutiveSpecialCharacters,
                    format!("{field} must not contain consecutive special characters"),
                ));
            }

            None
        })
    }
}

/// Collapse runs of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn config() -> Arc<ValidationConfig> {
        Arc::new(ValidationConfig::default())
    }

    fn codes(errors: &[ValidationError]) -> Vec<ValidationCode> {
        errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn test_required() {
        assert_eq!(codes(&Required.check("email", &Value::Null)), vec![ValidationCode::Required]);
        assert_eq!(codes(&Required.check("email", &json!("   "))), vec![ValidationCode::Required]);
        assert!(Required.check("email", &json!("a@b.com")).is_empty());
    }

    #[test]
    fn test_text() {
        assert!(Text.check("password", &json!("anything")).is_empty());
        assert!(Text.check("password", &Value::Null).is_empty());
        assert_eq!(
            codes(&Text.check("password", &json!(["x"]))),
            vec![ValidationCode::InvalidType]
        );
    }

    #[test]
    fn test_email() {
        assert!(Email.check("email", &json!("user@example.com")).is_empty());
        assert!(Email.check("email", &Value::Null).is_empty());

        let errors = Email.check("email", &json!("not-an-email"));
        assert_eq!(codes(&errors), vec![ValidationCode::InvalidEmail]);
        assert_eq!(errors[0].field, "email");
    }

    #[test]
    fn test_non_string_is_a_violation_not_a_fault() {
        let config = config();
        let rules: Vec<Box<dyn ValidationRule>> = vec![
            Box::new(Email),
            Box::new(PasswordPolicy::new(config.clone())),
            Box::new(UsernamePolicy::new(config.clone())),
            Box::new(NamePolicy::new(config)),
        ];

        for value in [json!(42), json!(true), json!(["a"]), json!({"nested": "x"})] {
            for rule in &rules {
                let errors = rule.check("field", &value);
                assert_eq!(codes(&errors), vec![ValidationCode::InvalidType], "{}", rule.name());
            }
        }
    }

    #[test]
    fn test_short_password_is_a_single_policy_violation() {
        let errors = PasswordPolicy::new(config()).check("password", &json!("abc"));

        assert_eq!(codes(&errors), vec![ValidationCode::WeakPassword]);
        assert!(errors[0].message.contains("at least 8 characters"));
        assert!(errors[0].message.contains("an uppercase letter"));
        assert!(errors[0].message.contains("a digit"));
        assert!(errors[0].message.contains("a special character"));
        assert!(!errors[0].message.contains("a lowercase letter"));
    }

    #[test]
    fn test_strong_password_passes() {
        let errors = PasswordPolicy::new(config()).check("password", &json!("Tr0ub4dor&3x"));
        assert!(errors.is_empty());
    }

    #[test]
    fn test_disallowed_password_case_insensitive() {
        let errors = PasswordPolicy::new(config()).check("password", &json!("P@ssw0rd"));
        assert_eq!(codes(&errors), vec![ValidationCode::DisallowedPassword]);
    }

    #[test]
    fn test_password_policy_respects_config() {
        let relaxed = Arc::new(ValidationConfig {
            password_min_length: 4,
            password_required_classes: vec![],
            ..ValidationConfig::default()
        });

        assert!(PasswordPolicy::new(relaxed).check("password", &json!("abcd")).is_empty());
    }

    #[test]
    fn test_reserved_username() {
        let errors = UsernamePolicy::new(config()).check("username", &json!("admin"));
        assert_eq!(codes(&errors), vec![ValidationCode::ReservedValue]);
        assert_eq!(errors[0].field, "username");

        let errors = UsernamePolicy::new(config()).check("username", &json!("Admin"));
        assert_eq!(codes(&errors), vec![ValidationCode::ReservedValue]);
    }

    #[test]
    fn test_username_rules() {
        let rule = UsernamePolicy::new(config());

        assert!(rule.check("username", &json!("alice_01")).is_empty());
        assert_eq!(codes(&rule.check("username", &json!("ab"))), vec![ValidationCode::TooShort]);
        assert_eq!(
            codes(&rule.check("username", &json!("a".repeat(33)))),
            vec![ValidationCode::TooLong]
        );
        assert_eq!(
            codes(&rule.check("username", &json!("alice smith"))),
            vec![ValidationCode::InvalidCharacters]
        );
        assert_eq!(
            codes(&rule.check("username", &json!("xxShitxx"))),
            vec![ValidationCode::ProfaneValue]
        );
    }

    #[test]
    fn test_name_rules() {
        let rule = NamePolicy::new(config());

        assert!(rule.check("name", &json!("Mary-Jane O'Neil")).is_empty());
        assert!(rule.check("name", &json!("José")).is_empty());
        for name in ["St. John", "John Q. Public", "Martin Luther King Jr. Smith"] {
            assert!(rule.check("name", &json!(name)).is_empty(), "{name:?}");
        }
        assert_eq!(
            codes(&rule.check("name", &json!("R2D2"))),
            vec![ValidationCode::InvalidCharacters]
        );
        assert_eq!(
            codes(&rule.check("name", &json!("-Mary"))),
            vec![ValidationCode::LeadingOrTrailingSpecialCharacter]
        );
        assert_eq!(
            codes(&rule.check("name", &json!("Mary."))),
            vec![ValidationCode::LeadingOrTrailingSpecialCharacter]
        );
        assert_eq!(
            codes(&rule.check("name", &json!("Mary--Jane"))),
            vec![ValidationCode::ConsecutiveSpecialCharacters]
        );
        assert_eq!(
            codes(&rule.check("name", &json!("D.'Arcy"))),
            vec![ValidationCode::ConsecutiveSpecialCharacters]
        );
        assert_eq!(
            codes(&rule.check("name", &json!("A".repeat(65)))),
            vec![ValidationCode::TooLong]
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Mary \t  Jane  "), "Mary Jane");
    }
}
