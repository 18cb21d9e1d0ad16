//! Salted password hashing (argon2, PHC string format).

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use rand_core::OsRng;

use crate::{Error, Result};

/// Passwords shorter than this are rejected on create and change.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Hash `password` with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::Internal(format!("argon2 error: {e}")))
}

/// `false` for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

pub(crate) fn check_new_password(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::validation(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hash_then_verify() {
    let hash = hash_password("s3cret").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password("s3cret", &hash));
    assert!(!verify_password("wrong", &hash));
  }

  #[test]
  fn garbage_hash_never_verifies() {
    assert!(!verify_password("1234", "1234"));
    assert!(!verify_password("", ""));
  }

  #[test]
  fn short_passwords_rejected() {
    assert!(matches!(check_new_password("abc"), Err(Error::Validation(_))));
    assert!(check_new_password("abcd").is_ok());
  }
}
