//! Authentication primitives such as account credentials.
//!
//! Inbound adapters validate raw strings through these constructors before
//! talking to the identity provider port.

use std::fmt;

use zeroize::Zeroizing;

use super::user::normalise_email;

/// Minimum password length accepted when creating accounts.
pub const PASSWORD_MIN_LEN: usize = 6;

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Email was missing or malformed.
    InvalidEmail,
    /// Password was blank.
    EmptyPassword,
    /// Password is shorter than [`PASSWORD_MIN_LEN`].
    PasswordTooShort { min: usize },
    /// Password and confirmation differ.
    PasswordMismatch,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "email must look like local@domain"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::PasswordMismatch => write!(f, "passwords do not match"),
        }
    }
}

impl std::error::Error for CredentialsValidationError {}

/// Validated email/password pair.
///
/// ## Invariants
/// - `email` is trimmed, lower-cased and shaped like `local@domain.tld`.
/// - `password` is non-empty and keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use orbsurvey::domain::Credentials;
///
/// let creds = Credentials::try_from_parts("Admin@Orb.io", "password").expect("valid");
/// assert_eq!(creds.email(), "admin@orb.io");
/// assert_eq!(creds.password(), "password");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    email: String,
    password: Zeroizing<String>,
}

impl Credentials {
    /// Construct login credentials from raw inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = normalise_email(email).map_err(|_| CredentialsValidationError::InvalidEmail)?;
        if password.is_empty() {
            return Err(CredentialsValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Construct credentials for a new account, enforcing password rules.
    pub fn try_for_signup(
        email: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let credentials = Self::try_from_parts(email, password)?;
        if password.chars().count() < PASSWORD_MIN_LEN {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: PASSWORD_MIN_LEN,
            });
        }
        if password != confirmation {
            return Err(CredentialsValidationError::PasswordMismatch);
        }
        Ok(credentials)
    }

    /// Normalised email used as the login name.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", CredentialsValidationError::InvalidEmail)]
    #[case("not-an-email", "pw", CredentialsValidationError::InvalidEmail)]
    #[case("ana@example.com", "", CredentialsValidationError::EmptyPassword)]
    fn invalid_login_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = Credentials::try_from_parts(email, password).expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("abc", "abc", CredentialsValidationError::PasswordTooShort { min: PASSWORD_MIN_LEN })]
    #[case("secret1", "secret2", CredentialsValidationError::PasswordMismatch)]
    fn signup_enforces_password_rules(
        #[case] password: &str,
        #[case] confirmation: &str,
        #[case] expected: CredentialsValidationError,
    ) {
        let err = Credentials::try_for_signup("ana@example.com", password, confirmation)
            .expect_err("must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn signup_accepts_matching_passwords() {
        let creds = Credentials::try_for_signup(" Ana@Example.com", "secret1", "secret1")
            .expect("valid signup");
        assert_eq!(creds.email(), "ana@example.com");
        assert_eq!(creds.password(), "secret1");
    }
}
