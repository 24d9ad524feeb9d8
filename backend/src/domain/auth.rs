//! Authentication primitives: login credentials, registration payloads, and
//! password hashing.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! Hashing uses Argon2id (one-way, salted, deliberately expensive) and both
//! login failure modes pay the same verification cost.

use std::fmt;
use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use zeroize::Zeroizing;

use crate::domain::error::DomainError;
use crate::domain::member::{
    CouncilOffice, FullName, MemberValidationError, MowcubPosition, StateshipYear,
};
use crate::domain::user::{Email, UserValidationError};

/// Minimum accepted password length.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when auth payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthValidationError {
    /// Email was missing or malformed.
    Email(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`] characters.
    PasswordTooShort { min: usize },
    /// A member profile field failed validation.
    Member(MemberValidationError),
}

impl fmt::Display for AuthValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Email(err) => err.fmt(f),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
            Self::Member(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for AuthValidationError {}

/// Validated login credentials used by the identity service.
///
/// ## Invariants
/// - `email` is normalised by [`Email`];
/// - `password` is non-empty and retains caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: Email,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, AuthValidationError> {
        let email = Email::new(email).map_err(AuthValidationError::Email)?;
        if password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        Ok(Self {
            email,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email suitable for user lookups.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated registration payload: credentials plus the member profile draft.
#[derive(Debug, Clone)]
pub struct RegistrationRequest {
    pub email: Email,
    password: Zeroizing<String>,
    pub full_name: FullName,
    pub nickname: Option<String>,
    pub stateship_year: StateshipYear,
    pub last_mowcub_position: MowcubPosition,
    pub current_council_office: CouncilOffice,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
}

/// Raw registration fields as a handler receives them.
#[derive(Debug, Clone)]
pub struct RegistrationParts<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub full_name: &'a str,
    pub nickname: Option<String>,
    pub stateship_year: &'a str,
    pub last_mowcub_position: MowcubPosition,
    pub current_council_office: CouncilOffice,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub photo_url: Option<String>,
    pub dues_proof_url: Option<String>,
}

impl RegistrationRequest {
    /// Validate raw inputs into a registration request.
    pub fn try_from_parts(parts: RegistrationParts<'_>) -> Result<Self, AuthValidationError> {
        let email = Email::new(parts.email).map_err(AuthValidationError::Email)?;
        if parts.password.is_empty() {
            return Err(AuthValidationError::EmptyPassword);
        }
        if parts.password.chars().count() < PASSWORD_MIN {
            return Err(AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        let full_name = FullName::new(parts.full_name).map_err(AuthValidationError::Member)?;
        let stateship_year =
            StateshipYear::new(parts.stateship_year).map_err(AuthValidationError::Member)?;
        Ok(Self {
            email,
            password: Zeroizing::new(parts.password.to_owned()),
            full_name,
            nickname: parts.nickname,
            stateship_year,
            last_mowcub_position: parts.last_mowcub_position,
            current_council_office: parts.current_council_office,
            latitude: parts.latitude,
            longitude: parts.longitude,
            photo_url: parts.photo_url,
            dues_proof_url: parts.dues_proof_url,
        })
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Hash a plaintext password into a PHC-format Argon2id string.
pub fn hash_password(password: &str) -> Result<String, DomainError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| DomainError::internal(format!("password hashing failed: {err}")))
}

/// Verify a plaintext password against a stored PHC hash string.
///
/// A malformed stored hash verifies as `false` rather than erroring; the
/// caller cannot distinguish it from a wrong password, which is the point.
pub fn verify_password(stored_hash: &str, password: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Burn a verification against a throwaway hash.
///
/// Called when login hits an unknown email so both failure modes cost the
/// same work factor and timing does not leak which part was wrong.
pub fn burn_verification(password: &str) {
    let dummy = DUMMY_HASH.get_or_init(|| {
        hash_password("decoy-password-for-unknown-emails")
            .unwrap_or_else(|_| String::from("$argon2id$invalid"))
    });
    let _ = verify_password(dummy, password);
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn parts<'a>(email: &'a str, password: &'a str, full_name: &'a str) -> RegistrationParts<'a> {
        RegistrationParts {
            email,
            password,
            full_name,
            nickname: None,
            stateship_year: "2019/2020",
            last_mowcub_position: MowcubPosition::Colonel,
            current_council_office: CouncilOffice::None,
            latitude: None,
            longitude: None,
            photo_url: None,
            dues_proof_url: None,
        }
    }

    #[rstest]
    #[case("", "password123", AuthValidationError::Email(UserValidationError::EmptyEmail))]
    #[case("ada@example.org", "", AuthValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: AuthValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn registration_rejects_short_passwords() {
        let err = RegistrationRequest::try_from_parts(parts("ada@example.org", "short", "Ada"))
            .expect_err("short password must fail");
        assert_eq!(err, AuthValidationError::PasswordTooShort { min: PASSWORD_MIN });
    }

    #[rstest]
    fn registration_accepts_valid_input() {
        let request =
            RegistrationRequest::try_from_parts(parts("Ada@Example.org", "long-enough", "Ada"))
                .expect("valid registration");
        assert_eq!(request.email.as_ref(), "ada@example.org");
        assert_eq!(request.password(), "long-enough");
    }

    #[rstest]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").expect("hashing succeeds");
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password(&hash, "correct horse battery staple"));
        assert!(!verify_password(&hash, "wrong password"));
    }

    #[rstest]
    fn malformed_stored_hash_verifies_false() {
        assert!(!verify_password("not-a-phc-string", "anything"));
    }
}
