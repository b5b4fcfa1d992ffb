//! Request signatures for the monitoring portal
//!
//! Every portal call carries a SHA-1 signature over a per-request salt, the
//! session secret and token, and the literal action fragment of the query
//! string. The action bytes that are signed must be the exact bytes sent on
//! the wire, parameter order included. The initial authentication call signs
//! with the SHA-1 of the account password instead of a session.

use chrono::Utc;
use sha1::{Digest, Sha1};

/// Lowercase hex SHA-1 of a UTF-8 string
fn sha1_hex(input: &str) -> String {
    format!("{:x}", Sha1::digest(input.as_bytes()))
}

/// Hash the account password the way the portal expects it on the wire.
///
/// The portal never sees the cleartext password; authentication signs over
/// this digest. SHA-1 here is a wire-compatibility requirement, not a choice.
#[must_use]
pub fn hash_password(password: &str) -> String {
    sha1_hex(password)
}

/// Fresh per-request salt: the current epoch time in milliseconds rendered
/// as a decimal string. Doubles as nonce and coarse timestamp; must not be
/// reused across calls.
#[must_use]
pub fn make_salt() -> String {
    Utc::now().timestamp_millis().to_string()
}

/// Signature for a data/query call: `SHA1(salt + secret + token + action)`
#[must_use]
pub fn sign_query(secret: &str, token: &str, salt: &str, action: &str) -> String {
    let mut material = String::with_capacity(salt.len() + secret.len() + token.len() + action.len());
    material.push_str(salt);
    material.push_str(secret);
    material.push_str(token);
    material.push_str(action);
    sha1_hex(&material)
}

/// Signature for the authentication call: `SHA1(salt + SHA1(password) + action)`
#[must_use]
pub fn sign_auth(password_hash: &str, salt: &str, action: &str) -> String {
    let mut material = String::with_capacity(salt.len() + password_hash.len() + action.len());
    material.push_str(salt);
    material.push_str(password_hash);
    material.push_str(action);
    sha1_hex(&material)
}
