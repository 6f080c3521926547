use serde::Deserialize;

/// Character classes a password policy can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharacterClass {
    Uppercase,
    Lowercase,
    Digit,
    Special,
}

impl CharacterClass {
    pub fn matches(&self, c: char) -> bool {
        match self {
            CharacterClass::Uppercase => c.is_uppercase(),
            CharacterClass::Lowercase => c.is_lowercase(),
            CharacterClass::Digit => c.is_ascii_digit(),
            CharacterClass::Special => !c.is_alphanumeric() && !c.is_whitespace(),
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            CharacterClass::Uppercase => "an uppercase letter",
            CharacterClass::Lowercase => "a lowercase letter",
            CharacterClass::Digit => "a digit",
            CharacterClass::Special => "a special character",
        }
    }
}

/// Validation policy snapshot.
///
/// Built once at startup (defaults, then file and environment overrides) and
/// shared read-only behind an `Arc` afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    pub password_min_length: usize,
    pub password_max_length: usize,
    pub password_required_classes: Vec<CharacterClass>,
    /// Compared case-insensitively
    pub disallowed_passwords: Vec<String>,

    pub username_min_length: usize,
    pub username_max_length: usize,
    /// Compared case-insensitively against the whole username
    pub reserved_usernames: Vec<String>,
    /// Matched case-insensitively as substrings of the username
    pub profane_words: Vec<String>,

    pub name_min_length: usize,
    pub name_max_length: usize,
    /// Non-letter characters allowed inside a name
    pub name_special_characters: String,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            password_min_length: 8,
            password_max_length: 128,
            password_required_classes: vec![
                CharacterClass::Uppercase,
                CharacterClass::Lowercase,
                CharacterClass::Digit,
                CharacterClass::Special,
            ],
            disallowed_passwords: to_strings(&[
                "password",
                "password1",
                "password123",
                "password1!",
                "p@ssw0rd",
                "passw0rd!",
                "12345678",
                "123456789",
                "qwerty123",
                "qwerty123!",
                "letmein1!",
                "welcome1!",
                "admin123!",
                "iloveyou1!",
                "changeme1!",
            ]),
            username_min_length: 3,
            username_max_length: 32,
            reserved_usernames: to_strings(&[
                "admin",
                "administrator",
                "root",
                "system",
                "support",
                "help",
                "api",
                "www",
                "mail",
                "moderator",
                "superuser",
                "null",
                "undefined",
                "anonymous",
                "me",
            ]),
            profane_words: to_strings(&["fuck", "shit", "bitch", "cunt", "asshole", "bastard"]),
            name_min_length: 1,
            name_max_length: 64,
            name_special_characters: " '-.".to_string(),
        }
    }
}

impl ValidationConfig {
    pub fn is_name_special(&self, c: char) -> bool {
        self.name_special_characters.contains(c)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
