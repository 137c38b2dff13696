use validator::ValidateEmail;

use crate::error::{IdentityError, Result};

/// Lowercases the domain part of an email address and keeps the local part
/// as typed. Input without an `@` is returned unchanged.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

/// Normalizes and validates an email address.
pub fn clean_email(email: &str) -> Result<String> {
    if email.trim().is_empty() {
        return Err(IdentityError::validation("email", "Users must have an email address"));
    }

    let normalized = normalize_email(email);
    if normalized.len() > 255 || !normalized.validate_email() {
        return Err(IdentityError::validation(
            "email",
            format!("'{}' is not a valid email address", normalized),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_is_lowercased() {
        let samples = [
            ("test1@EXAMPLE.com", "test1@example.com"),
            ("Test2@Example.COM", "Test2@example.com"),
            ("TEST3@EXAMPLE.COM", "TEST3@example.com"),
            ("test4@example.COM", "test4@example.com"),
        ];

        for (raw, expected) in samples {
            assert_eq!(normalize_email(raw), expected);
        }
    }

    #[test]
    fn test_only_last_at_splits() {
        assert_eq!(normalize_email("\"a@b\"@Example.ORG"), "\"a@b\"@example.org");
    }

    #[test]
    fn test_without_at_is_unchanged() {
        assert_eq!(normalize_email("Not-An-Email"), "Not-An-Email");
    }

    #[test]
    fn test_clean_email_rejects_garbage() {
        assert!(matches!(
            clean_email(""),
            Err(IdentityError::Validation { field: "email", .. })
        ));
        assert!(clean_email("nobody").is_err());
        assert_eq!(clean_email(" Jo@Mail.COM ").unwrap(), "Jo@mail.com");
    }
}
