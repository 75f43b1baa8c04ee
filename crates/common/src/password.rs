//! Password hashing for interactive logins.
//!
//! Organisors pick their own password during signup, while agent accounts
//! are provisioned with a random initial password that is hashed and
//! discarded, locking the account until the password is replaced
//! out-of-band.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub use argon2::password_hash::Error;
use rand::{
    distributions::{Alphanumeric, DistString},
    thread_rng,
};

pub const INITIAL_PASSWORD_LENGTH: usize = 32;

/// Hash a plain-text password with Argon2id, producing a PHC string
/// suitable for storage.
pub fn hash(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    Ok(Argon2::default()
        .hash_password(password.as_bytes(), &salt)?
        .to_string())
}

/// Verify a plain-text password against a stored PHC string.
///
/// A mismatch is an expected outcome and is reported as `Ok(false)`;
/// only a malformed stored hash surfaces as an error.
pub fn verify(password: &str, password_hash: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(password_hash)?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(Error::Password) => Ok(false),
        Err(err) => Err(err),
    }
}

/// Generate a random password for a freshly provisioned agent account.
pub fn generate_initial() -> String {
    Alphanumeric.sample_string(&mut thread_rng(), INITIAL_PASSWORD_LENGTH)
}
