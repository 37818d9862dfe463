use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::error::AuthError;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const HASH_LEN: usize = 32;
const ROUNDS: u32 = 10_000;

/// Longest password, in bytes, that is ever run through the KDF.
pub const MAX_PASSWORD_LEN: usize = 128;

/// hash_password
///
/// PBKDF2-HMAC-SHA256 with a random salt. Stored as `pbkdf2-sha256$rounds$salt_hex$hash_hex`
/// so the round count can be raised later without invalidating existing hashes.
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, ROUNDS, &mut hash);
    format!("{}${}${}${}", SCHEME, ROUNDS, hex::encode(salt), hex::encode(hash))
}

/// verify_password
///
/// Returns false for malformed stored hashes and for passwords longer than
/// `MAX_PASSWORD_LEN`, without running the KDF.
pub fn verify_password(password: &str, stored: &str) -> bool {
    if password.len() > MAX_PASSWORD_LEN {
        return false;
    }

    let mut parts = stored.splitn(4, '$');
    let (Some(SCHEME), Some(rounds), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (hex::decode(salt), hex::decode(expected)) else {
        return false;
    };
    if rounds == 0 || expected.len() != HASH_LEN {
        return false;
    }

    let mut actual = [0u8; HASH_LEN];
    pbkdf2::pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, rounds, &mut actual);
    actual.as_slice().ct_eq(expected.as_slice()).into()
}

/// hash_password_off_thread
///
/// `hash_password` on the blocking pool, so the KDF never stalls an async worker.
pub async fn hash_password_off_thread(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AuthError::Internal(format!("password hashing task failed: {}", e)))
}

/// verify_password_off_thread
///
/// `verify_password` on the blocking pool.
pub async fn verify_password_off_thread(password: String, stored: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &stored))
        .await
        .map_err(|e| AuthError::Internal(format!("password verification task failed: {}", e)))
}
