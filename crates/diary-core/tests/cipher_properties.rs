//! Property-based tests for the diary cipher and key derivation.
//!
//! - Sealed content opens with the same key
//! - Every call uses a fresh nonce
//! - Any flipped byte is rejected
//! - Keys are deterministic per (hash, salt)

use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use diary_core::crypto::{decrypt, derive_key, encrypt, generate_salt, DerivedKey, KdfParams};
use diary_core::DiaryError;
use proptest::prelude::*;

fn key_strategy() -> impl Strategy<Value = DerivedKey> {
    prop::array::uniform32(any::<u8>()).prop_map(DerivedKey::from_bytes)
}

fn text_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("(?s).{0,400}").unwrap()
}

/// Low iteration count so the suite stays fast.
fn fast_kdf_params() -> KdfParams {
    KdfParams::new(100)
}

proptest! {
    #[test]
    fn roundtrip_preserves_text(key in key_strategy(), text in text_strategy()) {
        let blob = encrypt(&text, &key).unwrap();
        prop_assert_eq!(decrypt(&blob, &key).unwrap(), text);
    }

    #[test]
    fn same_plaintext_gives_distinct_blobs(key in key_strategy(), text in text_strategy()) {
        let a = encrypt(&text, &key).unwrap();
        let b = encrypt(&text, &key).unwrap();
        prop_assert_ne!(a, b);
    }

    #[test]
    fn flipped_byte_is_rejected(
        key in key_strategy(),
        text in text_strategy(),
        index in any::<prop::sample::Index>(),
        mask in 1u8..=255,
    ) {
        let blob = encrypt(&text, &key).unwrap();
        let mut raw = URL_SAFE.decode(&blob).unwrap();
        let at = index.index(raw.len());
        raw[at] ^= mask;
        let tampered = URL_SAFE.encode(&raw);

        let result = decrypt(&tampered, &key);
        prop_assert!(matches!(result, Err(DiaryError::Decryption(_))));
    }

    #[test]
    fn wrong_key_is_rejected(a in key_strategy(), b in key_strategy(), text in text_strategy()) {
        prop_assume!(a.as_bytes() != b.as_bytes());
        let blob = encrypt(&text, &a).unwrap();
        prop_assert!(decrypt(&blob, &b).is_err());
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn key_derivation_is_deterministic(hash in "[a-zA-Z0-9$=]{1,64}") {
        let salt = generate_salt(16);
        let a = derive_key(&hash, &salt, &fast_kdf_params()).unwrap();
        let b = derive_key(&hash, &salt, &fast_kdf_params()).unwrap();
        prop_assert_eq!(a.as_bytes(), b.as_bytes());
    }

    #[test]
    fn different_salts_give_different_keys(hash in "[a-zA-Z0-9$=]{1,64}") {
        let a = derive_key(&hash, &generate_salt(16), &fast_kdf_params()).unwrap();
        let b = derive_key(&hash, &generate_salt(16), &fast_kdf_params()).unwrap();
        prop_assert_ne!(a.as_bytes(), b.as_bytes());
    }
}

#[test]
fn test_default_iterations_match_stored_data() {
    assert_eq!(KdfParams::default().iterations, 480_000);
}

// Produced by an independent PBKDF2 + AES-GCM implementation with a fixed nonce.
const FIXTURE_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$fixture";
const FIXTURE_SALT: &str = "MoaikWRdutv-iyQc_CYPnw==";
const FIXTURE_KEY_HEX: &str = "3e136bcd563b3b8f6a3f3107397121df38a8465a648c1b9ef775b586c4d66752";
const FIXTURE_BLOB: &str = "AAECAwQFBgcICQoLT11ANhgXnTMfO_8heo4EqcqAOerX5TLyPxm0Oc_e0GJTVg==";

#[test]
fn test_default_params_reproduce_external_key() {
    let key = derive_key(FIXTURE_HASH, FIXTURE_SALT, &KdfParams::default()).unwrap();
    assert_eq!(hex::encode(key.as_bytes()), FIXTURE_KEY_HEX);
}

#[test]
fn test_external_blob_opens_and_layout_matches() {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&hex::decode(FIXTURE_KEY_HEX).unwrap());
    let key = DerivedKey::from_bytes(bytes);

    assert_eq!(decrypt(FIXTURE_BLOB, &key).unwrap(), "hello 世界 diary");

    let raw = URL_SAFE.decode(FIXTURE_BLOB).unwrap();
    assert_eq!(&raw[..12], &(0u8..12).collect::<Vec<_>>()[..]);
    assert_eq!(raw.len(), 12 + "hello 世界 diary".len() + 16);
}
