// sign.rs — HMAC-SHA256 signing and timing-safe verification over the
// bundle's canonical form.

use ring::hmac;

pub fn sign_hex(secret: &[u8], canonical: &str) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    let tag = hmac::sign(&key, canonical.as_bytes());
    tag.as_ref().iter().map(|b| format!("{b:02x}")).collect()
}

/// Timing-safe comparison of a hex-encoded signature against the
/// recomputed HMAC, via `ring::hmac::verify`.
pub fn verify_hex(secret: &[u8], canonical: &str, signature_hex: &str) -> bool {
    let Ok(expected) = decode_hex(signature_hex) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret);
    hmac::verify(&key, canonical.as_bytes(), &expected).is_ok()
}

fn decode_hex(value: &str) -> Result<Vec<u8>, ()> {
    if value.len() % 2 != 0 {
        return Err(());
    }
    (0..value.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&value[i..i + 2], 16).map_err(|_| ()))
        .collect()
}
