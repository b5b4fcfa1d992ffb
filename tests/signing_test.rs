use heliotrope::signing::{hash_password, make_salt, sign_auth, sign_query};

#[test]
fn password_hash_known_vectors() {
    // SHA1("abc") and SHA1("") reference digests
    assert_eq!(
        hash_password("abc"),
        "a9993e364706816aba3e25717850c26c9cd0d89d"
    );
    assert_eq!(
        hash_password(""),
        "da39a3ee5e6b4b0d3255bfef95601890afd80709"
    );
}

#[test]
fn query_signature_covers_every_input() {
    let base = sign_query("secret", "token", "1700000000000", "&action=queryPlants");

    // Deterministic
    assert_eq!(
        base,
        sign_query("secret", "token", "1700000000000", "&action=queryPlants")
    );

    // Any single changed input changes the signature
    assert_ne!(
        base,
        sign_query("Secret", "token", "1700000000000", "&action=queryPlants")
    );
    assert_ne!(
        base,
        sign_query("secret", "Token", "1700000000000", "&action=queryPlants")
    );
    assert_ne!(
        base,
        sign_query("secret", "token", "1700000000001", "&action=queryPlants")
    );
    assert_ne!(
        base,
        sign_query("secret", "token", "1700000000000", "&action=queryplants")
    );
}

#[test]
fn parameter_order_is_part_of_the_signed_material() {
    // The same parameters in a different order must not verify
    let a = sign_query("s", "t", "1", "&action=queryPlantEnergyDay&plantid=7");
    let b = sign_query("s", "t", "1", "&plantid=7&action=queryPlantEnergyDay");
    assert_ne!(a, b);
}

#[test]
fn auth_signature_uses_hashed_password_without_token() {
    let hash = hash_password("hunter2");
    let action = "&action=auth&usr=user&company-key=key";
    let signed = sign_auth(&hash, "1700000000000", action);

    // Auth material is salt + password hash + action, nothing else
    assert_eq!(signed, sign_query("", &hash, "1700000000000", action));
    assert_ne!(signed, sign_auth(&hash, "1700000000001", action));
    assert_ne!(signed, sign_auth(&hash_password("hunter3"), "1700000000000", action));
}

#[test]
fn salt_is_fresh_decimal_millis() {
    let salt = make_salt();
    assert!(salt.chars().all(|c| c.is_ascii_digit()));
    assert!(salt.len() >= 13);

    // Epoch millis are monotonically non-decreasing between calls
    let next = make_salt();
    assert!(next.parse::<u64>().unwrap() >= salt.parse::<u64>().unwrap());
}
