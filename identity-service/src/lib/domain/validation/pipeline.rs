use std::fmt;
use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;

use serde_json::Value;

use super::config::ValidationConfig;
use super::errors::ValidationErrorSet;
use super::rules::Email;
use super::rules::NamePolicy;
use super::rules::PasswordPolicy;
use super::rules::Required;
use super::rules::Text;
use super::rules::UsernamePolicy;
use super::rules::ValidationRule;

struct FieldRule {
    field: String,
    rule: Arc<dyn ValidationRule>,
}

/// Ordered chain of rules evaluated against one JSON input.
///
/// Every rule runs; violations are accumulated in registration order rather
/// than stopping at the first one. Rules are normally registered during
/// setup; the list sits behind a read/write lock so late registration stays
/// safe while requests are being validated.
#[derive(Default)]
pub struct ValidationPipeline {
    rules: RwLock<Vec<FieldRule>>,
}

impl ValidationPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `rule` for `field`.
    pub fn add_rule(&self, field: impl Into<String>, rule: impl ValidationRule + 'static) {
        self.rules
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(FieldRule {
                field: field.into(),
                rule: Arc::new(rule),
            });
    }

    /// Builder form of [`add_rule`](Self::add_rule).
    pub fn with_rule(self, field: impl Into<String>, rule: impl ValidationRule + 'static) -> Self {
        self.add_rule(field, rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run every rule against the matching member of `input`.
    ///
    /// Missing members (and any non-object `input`) are seen by rules as
    /// `null`.
    pub fn validate(&self, input: &Value) -> Result<(), ValidationErrorSet> {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        let mut errors = ValidationErrorSet::new();

        for entry in rules.iter() {
            let value = input.get(&entry.field).unwrap_or(&Value::Null);
            errors.extend(entry.rule.check(&entry.field, value));
        }

        errors.into_result()
    }

    /// Rules for account registration: `email`, `username`, `password`, `name`.
    pub fn registration(config: Arc<ValidationConfig>) -> Self {
        Self::new()
            .with_rule("email", Required)
            .with_rule("email", Email)
            .with_rule("username", Required)
            .with_rule("username", UsernamePolicy::new(config.clone()))
            .with_rule("password", Required)
            .with_rule("password", PasswordPolicy::new(config.clone()))
            .with_rule("name", Required)
            .with_rule("name", NamePolicy::new(config))
    }

    /// Rules for login. Only presence and shape are checked; the password
    /// policy is deliberately not applied to existing credentials.
    pub fn login() -> Self {
        Self::new()
            .with_rule("email", Required)
            .with_rule("email", Email)
            .with_rule("password", Required)
            .with_rule("password", Text)
    }
}

impl fmt::Debug for ValidationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rules = self.rules.read().unwrap_or_else(PoisonError::into_inner);
        f.debug_list()
            .entries(
                rules
                    .iter()
                    .map(|entry| format!("{}:{}", entry.field, entry.rule.name())),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::validation::errors::ValidationCode;
    use crate::domain::validation::errors::ValidationError;

    fn registration() -> ValidationPipeline {
        ValidationPipeline::registration(Arc::new(ValidationConfig::default()))
    }

    #[test]
    fn test_valid_registration_passes() {
        let input = json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "Sup3r-Secret",
            "name": "Alice Liddell",
        });

        assert!(registration().validate(&input).is_ok());
    }

    #[test]
    fn test_all_violations_are_reported() {
        let input = json!({
            "email": "not-an-email",
            "username": "admin",
            "password": "abc",
            "name": "--",
        });

        let errors = registration().validate(&input).unwrap_err();
        let reported: Vec<(&str, ValidationCode)> =
            errors.iter().map(|e| (e.field.as_str(), e.code)).collect();

        assert_eq!(
            reported,
            vec![
                ("email", ValidationCode::InvalidEmail),
                ("username", ValidationCode::ReservedValue),
                ("password", ValidationCode::WeakPassword),
                ("name", ValidationCode::LeadingOrTrailingSpecialCharacter),
            ]
        );
    }

    #[test]
    fn test_weak_password_only() {
        let input = json!({
            "email": "alice@example.com",
            "username": "alice",
            "password": "abc",
            "name": "Alice",
        });

        let errors = registration().validate(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "password");
        assert_eq!(errors.errors()[0].code, ValidationCode::WeakPassword);
    }

    #[test]
    fn test_reserved_username_only() {
        let input = json!({
            "email": "alice@example.com",
            "username": "admin",
            "password": "Sup3r-Secret",
            "name": "Alice",
        });

        let errors = registration().validate(&input).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.for_field("username").count(), 1);
        assert_eq!(errors.errors()[0].code, ValidationCode::ReservedValue);
    }

    #[test]
    fn test_missing_fields_and_wrong_types() {
        let input = json!({ "email": 5, "password": null });

        let errors = registration().validate(&input).unwrap_err();
        let codes: Vec<ValidationCode> = errors.iter().map(|e| e.code).collect();

        assert_eq!(
            codes,
            vec![
                ValidationCode::InvalidType,
                ValidationCode::Required,
                ValidationCode::Required,
                ValidationCode::Required,
            ]
        );
    }

    #[test]
    fn test_non_object_input() {
        let errors = ValidationPipeline::login().validate(&json!("hello")).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| e.code == ValidationCode::Required));
    }

    #[test]
    fn test_rules_run_in_registration_order() {
        struct Always(&'static str);

        impl ValidationRule for Always {
            fn name(&self) -> &'static str {
                self.0
            }

            fn check(&self, field: &str, _value: &Value) -> Vec<ValidationError> {
                vec![ValidationError::new(field, ValidationCode::InvalidCharacters, self.0)]
            }
        }

        let pipeline = ValidationPipeline::new();
        pipeline.add_rule("b", Always("first"));
        pipeline.add_rule("a", Always("second"));
        pipeline.add_rule("b", Always("third"));

        let errors = pipeline.validate(&json!({})).unwrap_err();
        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(pipeline.len(), 3);
    }

    #[test]
    fn test_concurrent_validation() {
        let pipeline = Arc::new(registration());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let pipeline = Arc::clone(&pipeline);
                std::thread::spawn(move || {
                    let input = json!({
                        "email": format!("user{i}@example.com"),
                        "username": format!("user{i}"),
                        "password": "Sup3r-Secret",
                        "name": "Some One",
                    });
                    pipeline.validate(&input).is_ok()
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
