//! Input validation for sign-up, sign-in and file actions.

use thiserror::Error;

/// Minimum full name length.
pub const MIN_FULL_NAME_LENGTH: usize = 2;

/// Maximum full name length.
pub const MAX_FULL_NAME_LENGTH: usize = 50;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Number of digits in an emailed passcode.
pub const OTP_LENGTH: usize = 6;

/// Maximum file name length (in characters).
pub const MAX_FILE_NAME_LENGTH: usize = 255;

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Full name is too short.
    #[error("full name must be at least {MIN_FULL_NAME_LENGTH} characters")]
    FullNameTooShort,

    /// Full name is too long.
    #[error("full name must be at most {MAX_FULL_NAME_LENGTH} characters")]
    FullNameTooLong,

    /// Full name contains control characters.
    #[error("full name contains invalid characters")]
    FullNameInvalidChars,

    /// Email is empty.
    #[error("email is required")]
    EmailEmpty,

    /// Email is too long.
    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    /// Email format is invalid.
    #[error("invalid email format: {0}")]
    EmailInvalidFormat(String),

    /// Passcode is not six digits.
    #[error("passcode must be {OTP_LENGTH} digits")]
    OtpInvalid,

    /// File name is empty.
    #[error("file name cannot be empty")]
    FileNameEmpty,

    /// File name is too long.
    #[error("file name must be at most {MAX_FILE_NAME_LENGTH} characters")]
    FileNameTooLong,

    /// File name contains a path separator or control character.
    #[error("file name contains invalid characters")]
    FileNameInvalidChars,
}

impl From<ValidationError> for crate::VaultError {
    fn from(e: ValidationError) -> Self {
        crate::VaultError::Validation(e.to_string())
    }
}

/// Trim and lower-case an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate a full name for sign-up.
pub fn validate_full_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if len < MIN_FULL_NAME_LENGTH {
        return Err(ValidationError::FullNameTooShort);
    }
    if len > MAX_FULL_NAME_LENGTH {
        return Err(ValidationError::FullNameTooLong);
    }
    if name.chars().any(|c| c.is_control()) {
        return Err(ValidationError::FullNameInvalidChars);
    }
    Ok(())
}

/// Validate a (normalized) email address.
///
/// # Examples
///
/// ```
/// use cloudstash::user::validation::validate_email;
///
/// assert!(validate_email("user@example.com").is_ok());
/// assert!(validate_email("invalid").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }

    let invalid = || ValidationError::EmailInvalidFormat(email.to_string());

    if email.chars().any(|c| c.is_whitespace()) {
        return Err(invalid());
    }

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.split('.').any(|p| p.is_empty()) {
        return Err(invalid());
    }

    Ok(())
}

/// Normalize, validate and deduplicate a list of emails, keeping first-seen order.
pub fn normalize_emails<I, S>(emails: I) -> Result<Vec<String>, ValidationError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut result: Vec<String> = Vec::new();
    for email in emails {
        let email = normalize_email(email.as_ref());
        if email.is_empty() {
            continue;
        }
        validate_email(&email)?;
        if !result.contains(&email) {
            result.push(email);
        }
    }
    Ok(result)
}

/// Validate an emailed passcode.
pub fn validate_otp(otp: &str) -> Result<(), ValidationError> {
    if otp.len() != OTP_LENGTH || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::OtpInvalid);
    }
    Ok(())
}

/// Validate a file base name (without extension) or a full file name.
pub fn validate_file_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::FileNameEmpty);
    }
    if name.chars().count() > MAX_FILE_NAME_LENGTH {
        return Err(ValidationError::FileNameTooLong);
    }
    if name.chars().any(|c| c.is_control() || c == '/' || c == '\\') {
        return Err(ValidationError::FileNameInvalidChars);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_full_name() {
        assert!(validate_full_name("Jo").is_ok());
        assert!(validate_full_name("Ada Lovelace").is_ok());
        assert_eq!(
            validate_full_name("J"),
            Err(ValidationError::FullNameTooShort)
        );
        assert_eq!(
            validate_full_name("  J  "),
            Err(ValidationError::FullNameTooShort)
        );
        assert_eq!(
            validate_full_name(&"x".repeat(51)),
            Err(ValidationError::FullNameTooLong)
        );
        assert_eq!(
            validate_full_name("Bad\x07Name"),
            Err(ValidationError::FullNameInvalidChars)
        );
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user.name@example.co.jp").is_ok());
        assert!(validate_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailEmpty));
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@localhost").is_err());
        assert!(validate_email("user@example..com").is_err());
        assert!(validate_email("user@a@b.com").is_err());
        assert!(validate_email("us er@example.com").is_err());
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(validate_email(&long), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_normalize_emails_dedupes_in_order() {
        let emails = normalize_emails([
            " B@example.com",
            "a@example.com",
            "b@EXAMPLE.com",
            "",
        ])
        .unwrap();
        assert_eq!(emails, vec!["b@example.com", "a@example.com"]);
    }

    #[test]
    fn test_normalize_emails_rejects_invalid() {
        let result = normalize_emails(["ok@example.com", "nope"]);
        assert!(matches!(result, Err(ValidationError::EmailInvalidFormat(_))));
    }

    #[test]
    fn test_validate_otp() {
        assert!(validate_otp("123456").is_ok());
        assert!(validate_otp("12345").is_err());
        assert!(validate_otp("12a456").is_err());
    }

    #[test]
    fn test_validate_file_name() {
        assert!(validate_file_name("report").is_ok());
        assert_eq!(validate_file_name("  "), Err(ValidationError::FileNameEmpty));
        assert_eq!(
            validate_file_name("../etc/passwd"),
            Err(ValidationError::FileNameInvalidChars)
        );
        assert_eq!(
            validate_file_name(&"n".repeat(256)),
            Err(ValidationError::FileNameTooLong)
        );
    }
}
