use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Upper bound on plaintext credential length, in bytes.
///
/// Argon2 itself accepts far longer input; the cap exists so a client cannot
/// feed multi-megabyte "passwords" into a deliberately slow hash function.
pub const MAX_PASSWORD_LEN: usize = 512;

/// PasswordError
///
/// The credential sub-taxonomy. A wrong password (`Mismatch`) is deliberately
/// distinguishable from a corrupt stored encoding (`MalformedHash`): the first
/// is a routine client failure, the second means the user record itself is
/// damaged and must never be reported as "wrong password".
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// The plaintext is empty or exceeds `MAX_PASSWORD_LEN`.
    #[error("password must be non-empty and at most {MAX_PASSWORD_LEN} bytes")]
    Credential,
    /// The plaintext does not match the stored hash.
    #[error("invalid credentials")]
    Mismatch,
    /// The stored encoding could not be parsed as a PHC hash string.
    #[error("stored credential hash is malformed")]
    MalformedHash,
    /// The hashing backend rejected an operation for an internal reason.
    #[error("credential hashing failed")]
    Hashing,
}

/// hash_password
///
/// One-way, salted, adaptive hashing of a plaintext credential with Argon2id
/// (default cost parameters). The output is a self-describing PHC string:
/// algorithm identifier, cost parameters, the per-invocation random salt and
/// the digest are all embedded, so verification needs no external state.
///
/// The plaintext only ever lives on the stack of this call; it is never
/// logged or persisted.
pub fn hash_password(plaintext: &str) -> Result<String, PasswordError> {
    if plaintext.is_empty() || plaintext.len() > MAX_PASSWORD_LEN {
        return Err(PasswordError::Credential);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|_| PasswordError::Hashing)?;

    Ok(hash.to_string())
}

/// verify_password
///
/// Recomputes the digest using the parameters embedded in `hash_encoding` and
/// compares in constant time. Pure function over its inputs.
///
/// Returns `Mismatch` when the credential is wrong and `MalformedHash` when
/// the stored encoding is corrupt, so callers can map the former to a 401 and
/// the latter to an internal error.
pub fn verify_password(hash_encoding: &str, plaintext: &str) -> Result<(), PasswordError> {
    let parsed = PasswordHash::new(hash_encoding).map_err(|_| PasswordError::MalformedHash)?;

    match Argon2::default().verify_password(plaintext.as_bytes(), &parsed) {
        Ok(()) => Ok(()),
        Err(argon2::password_hash::Error::Password) => Err(PasswordError::Mismatch),
        Err(_) => Err(PasswordError::MalformedHash),
    }
}
