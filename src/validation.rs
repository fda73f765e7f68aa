//! Input validation for auth forms and profile edits.

use thiserror::Error;

pub const MIN_DISPLAY_NAME_LEN: usize = 2;
pub const MAX_BIO_LEN: usize = 500;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Passwords do not match")]
    PasswordMismatch,
    #[error("Display name must be at least 2 characters")]
    DisplayNameTooShort,
    #[error("Bio cannot exceed 500 characters")]
    BioTooLong,
    #[error("Username must be 3-20 characters, letters, numbers and underscores only")]
    InvalidUsername,
}

/// 3 to 20 characters from `[a-zA-Z0-9_]`.
pub fn is_valid_username(username: &str) -> bool {
    (3..=20).contains(&username.len())
        && username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Fields of a profile edit. Absent or empty fields are not checked.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileFields<'a> {
    pub username: Option<&'a str>,
    pub display_name: Option<&'a str>,
    pub bio: Option<&'a str>,
}

/// Every rule the fields break, in a stable order.
pub fn validate_profile(fields: ProfileFields<'_>) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if let Some(name) = fields.display_name.filter(|n| !n.is_empty()) {
        if name.chars().count() < MIN_DISPLAY_NAME_LEN {
            errors.push(ValidationError::DisplayNameTooShort);
        }
    }

    if let Some(bio) = fields.bio.filter(|b| !b.is_empty()) {
        if bio.chars().count() > MAX_BIO_LEN {
            errors.push(ValidationError::BioTooLong);
        }
    }

    if let Some(username) = fields.username.filter(|u| !u.is_empty()) {
        if !is_valid_username(username) {
            errors.push(ValidationError::InvalidUsername);
        }
    }

    errors
}

/// Login needs both fields.
pub fn validate_login(email: &str, password: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::Required("Email"));
    }
    if password.is_empty() {
        return Err(ValidationError::Required("Password"));
    }
    Ok(())
}

/// Registration needs a name, email, password and a matching confirmation.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::Required("Name"));
    }
    validate_login(email, password)?;
    if password != confirm {
        return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(is_valid_username("ana_123"));
        assert!(!is_valid_username("an"));
        assert!(!is_valid_username("a".repeat(21).as_str()));
        assert!(!is_valid_username("ana-maria"));
        assert!(!is_valid_username("añá"));
    }

    #[test]
    fn test_validate_profile_collects_all() {
        let bio = "x".repeat(501);
        let errors = validate_profile(ProfileFields {
            username: Some("no spaces"),
            display_name: Some("A"),
            bio: Some(&bio),
        });
        assert_eq!(
            errors,
            vec![
                ValidationError::DisplayNameTooShort,
                ValidationError::BioTooLong,
                ValidationError::InvalidUsername
            ]
        );
    }

    #[test]
    fn test_validate_profile_empty_fields_pass() {
        assert!(validate_profile(ProfileFields::default()).is_empty());
        assert!(validate_profile(ProfileFields {
            display_name: Some(""),
            ..Default::default()
        })
        .is_empty());
    }

    #[test]
    fn test_bio_limit_counts_chars() {
        let bio = "é".repeat(500);
        assert!(validate_profile(ProfileFields {
            bio: Some(&bio),
            ..Default::default()
        })
        .is_empty());
    }

    #[test]
    fn test_login_requires_both() {
        assert_eq!(
            validate_login("", "pw"),
            Err(ValidationError::Required("Email"))
        );
        assert_eq!(
            validate_login("a@b.c", ""),
            Err(ValidationError::Required("Password"))
        );
        assert!(validate_login("a@b.c", "pw").is_ok());
    }

    #[test]
    fn test_registration_checks_confirmation() {
        assert_eq!(
            validate_registration("Ana", "a@b.c", "pw1", "pw2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            validate_registration(" ", "a@b.c", "pw", "pw"),
            Err(ValidationError::Required("Name"))
        );
        assert!(validate_registration("Ana", "a@b.c", "pw", "pw").is_ok());
    }
}
