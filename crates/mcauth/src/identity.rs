//! UUID formatting and the session server hash.

use sha1::{Digest, Sha1};
use uuid::Uuid;

use crate::errors::{AuthError, Result, ResultExt};

/// Parse the undashed 32-character UUID form returned by Mojang
pub fn parse_mojang_uuid(id: &str) -> Result<Uuid> {
    if id.len() != 32 {
        return Err(AuthError::new(format!(
            "Unexpected UUID length: {} (should be 32)",
            id.len()
        )));
    }

    Uuid::try_parse(id).context("Invalid Mojang UUID")
}

/// Canonical UUID without dashes, as Mojang's APIs expect it
pub fn minify_uuid(uuid: &Uuid) -> String {
    uuid.simple().to_string()
}

/// Server hash sent with a session join
///
/// SHA-1 over the server ID (ISO-8859-1), the shared secret and the encoded
/// public key, rendered as a signed two's-complement integer in lowercase hex.
/// Negative digests carry a leading `-`.
pub fn calculate_server_hash(server_id: &str, public_key: &[u8], secret_key: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(latin1(server_id));
    hasher.update(secret_key);
    hasher.update(public_key);

    let mut digest = [0u8; 20];
    digest.copy_from_slice(&hasher.finalize());
    signed_hex(digest)
}

/// Characters outside ISO-8859-1 become '?'
fn latin1(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

fn signed_hex(mut digest: [u8; 20]) -> String {
    let negative = digest[0] & 0x80 != 0;
    if negative {
        // magnitude of a two's-complement value: invert, then add one
        let mut carry = true;
        for byte in digest.iter_mut().rev() {
            *byte = !*byte;
            if carry {
                let (sum, overflow) = byte.overflowing_add(1);
                *byte = sum;
                carry = overflow;
            }
        }
    }

    let hex = hex::encode(digest);
    let trimmed = match hex.trim_start_matches('0') {
        "" => "0",
        digits => digits,
    };

    if negative {
        format!("-{trimmed}")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mojang_uuid() {
        let uuid = parse_mojang_uuid("069a79f444e94726a5befca90e38aaf5").unwrap();
        assert_eq!(uuid.to_string(), "069a79f4-44e9-4726-a5be-fca90e38aaf5");
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        for id in ["", "069a79f444e94726a5befca90e38aaf", "069a79f444e94726a5befca90e38aaf55"] {
            let err = parse_mojang_uuid(id).unwrap_err();
            assert!(err.message().contains("Unexpected UUID length"), "{id}");
        }
        // dashed form is 36 characters
        assert!(parse_mojang_uuid("069a79f4-44e9-4726-a5be-fca90e38aaf5").is_err());
    }

    #[test]
    fn test_parse_rejects_non_hex() {
        assert!(parse_mojang_uuid("zzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").is_err());
    }

    #[test]
    fn test_minify_roundtrip() {
        for id in [
            "069a79f444e94726a5befca90e38aaf5",
            "853c80ef3c3749fdaa49938b674adae6",
            "00000000000000000000000000000000",
            "ffffffffffffffffffffffffffffffff",
        ] {
            assert_eq!(minify_uuid(&parse_mojang_uuid(id).unwrap()), id);
        }
    }

    #[test]
    fn test_server_hash_known_values() {
        assert_eq!(
            calculate_server_hash("Notch", &[], &[]),
            "4ed1f46bbe04bc756bcb17c0c7ce3e4632f06a48"
        );
        assert_eq!(
            calculate_server_hash("jeb_", &[], &[]),
            "-7c9d5b0044c130109a5d7b5fb5c317c02b4e28c1"
        );
        // leading zero nibble is dropped
        assert_eq!(
            calculate_server_hash("simon", &[], &[]),
            "88e16a1019277b15d58faf0541e11910eb756f6"
        );
    }

    #[test]
    fn test_server_hash_input_order() {
        // server id, then secret key, then public key
        assert_eq!(
            calculate_server_hash("server", &[4, 5, 6], &[1, 2, 3]),
            "4cecf49ac0439804c3ce912046cff2cde125a7b4"
        );
        assert_ne!(
            calculate_server_hash("server", &[1, 2, 3], &[4, 5, 6]),
            calculate_server_hash("server", &[4, 5, 6], &[1, 2, 3])
        );
    }

    #[test]
    fn test_server_hash_single_byte_change() {
        let base = calculate_server_hash("server", &[4, 5, 6], &[1, 2, 3]);
        assert_eq!(base, calculate_server_hash("server", &[4, 5, 6], &[1, 2, 3]));
        assert_ne!(base, calculate_server_hash("servex", &[4, 5, 6], &[1, 2, 3]));
        assert_ne!(base, calculate_server_hash("server", &[4, 5, 7], &[1, 2, 3]));
        assert_ne!(base, calculate_server_hash("server", &[4, 5, 6], &[1, 2, 4]));
    }

    #[test]
    fn test_server_id_is_latin1() {
        assert_eq!(
            calculate_server_hash("été", &[], &[]),
            "-5fbe5954d7db67bba310cdf51536ce08a338a9ae"
        );
        assert_eq!(
            calculate_server_hash("\u{2603}", &[], &[]),
            calculate_server_hash("?", &[], &[])
        );
    }

    #[test]
    fn test_signed_hex_edges() {
        assert_eq!(signed_hex([0; 20]), "0");
        assert_eq!(signed_hex([0xff; 20]), "-1");

        let mut min = [0u8; 20];
        min[0] = 0x80;
        assert_eq!(signed_hex(min), format!("-8{}", "0".repeat(39)));
    }
}
