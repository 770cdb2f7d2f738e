use sha2::{Digest, Sha256};

pub const BASE66CHARS: &str =
    "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789=-_~";

// ? base66 keeps tokens cookie safe without any escaping

/// Big-endian base66. No bytes encode to an empty string, any run of zero
/// bytes to a single `A`.
pub fn encode_b66(bytes: &[u8]) -> String {
    let alphabet = BASE66CHARS.as_bytes();

    if bytes.is_empty() {
        return String::new();
    }

    if bytes.iter().all(|&b| b == 0) {
        return (alphabet[0] as char).to_string();
    }

    let mut digits = Vec::new();

    let mut current_bytes = bytes.to_vec();

    while !current_bytes.is_empty() {
        let mut remainder = 0u32;

        let mut quotient_bytes: Vec<u8> = Vec::with_capacity(current_bytes.len());

        for byte in current_bytes.iter() {
            let intermediate = (remainder * 256) + (*byte as u32);

            let quotient = intermediate / 66;

            remainder = intermediate % 66;

            if quotient != 0 || !quotient_bytes.is_empty() {
                quotient_bytes.push(quotient as u8);
            }
        }

        digits.push(alphabet[remainder as usize]);

        current_bytes = quotient_bytes;
    }

    digits.iter().rev().map(|&d| d as char).collect()
}

/// 32 random bytes rendered in base66.
pub fn new_session_token() -> String {
    let mut bytes = Vec::with_capacity(32);

    bytes.extend_from_slice(&bson::Uuid::new().bytes());
    bytes.extend_from_slice(&bson::Uuid::new().bytes());

    encode_b66(&bytes)
}

/// Only this digest is ever persisted, never the token itself.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();

    hasher.update(token.as_bytes());

    format!("{:x}", hasher.finalize())
}
