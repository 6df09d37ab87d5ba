use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;

pub use argon2::password_hash::Error;

pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);

    // Argon2 with default params (Argon2id v19)
    let argon2 = Argon2::default();

    // Hash password to PHC string ($argon2id$v=19$...)
    let password_hash = argon2.hash_password(password.as_bytes(), &salt)?.to_string();

    Ok(password_hash)
}

/// Check a plaintext password against a stored PHC string.
/// A stored value that isn't a valid PHC string never matches.
pub fn check_passwords(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_salted_phc_string() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, "hunter2");
        assert_ne!(first, second);
    }

    #[test]
    fn check_passwords_matches_only_the_original() {
        let hash = hash_password("hunter2").unwrap();

        assert!(check_passwords("hunter2", &hash));
        assert!(!check_passwords("hunter3", &hash));
        assert!(!check_passwords("hunter2", "plaintext"));
    }
}
