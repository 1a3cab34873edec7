//! Secret material — multi-encoding decode/encode and CSPRNG generation.

use rand::RngCore;

use crate::otp::types::{
    Encoding, GenerateSecretOptions, GeneratedSecret, OtpError, OtpErrorKind,
};
use crate::otp::uri;

/// Default secret length in bytes when the caller gives none (128 bits).
pub(crate) const DEFAULT_SECRET_BYTES: usize = 16;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Decode / encode
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Decode an encoded secret into raw key bytes.
///
/// Base-32 input may be lower-case and contain spaces or dashes; padding
/// is optional. Empty secrets are rejected for every encoding.
pub fn decode_secret(text: &str, encoding: Encoding) -> Result<Vec<u8>, OtpError> {
    if text.is_empty() {
        return Err(OtpError::new(
            OtpErrorKind::InvalidSecretEncoding,
            "secret must not be empty",
        ));
    }
    match encoding {
        Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
        Encoding::Hex => hex::decode(text).map_err(|e| {
            OtpError::new(OtpErrorKind::InvalidSecretEncoding, "secret is not valid hex")
                .with_detail(e.to_string())
        }),
        Encoding::Base32 => decode_base32(text),
        Encoding::Base64 => {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(text.trim())
                .map_err(|e| {
                    OtpError::new(
                        OtpErrorKind::InvalidSecretEncoding,
                        "secret is not valid base-64",
                    )
                    .with_detail(e.to_string())
                })
        }
    }
}

/// Encode raw key bytes into the given textual representation.
///
/// The output is canonical: upper-case unpadded base-32, lower-case hex,
/// standard-alphabet base-64. UTF-8 is only lossless for byte sequences
/// that are valid UTF-8 (passphrase-style secrets).
pub fn encode_secret(bytes: &[u8], encoding: Encoding) -> String {
    match encoding {
        Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
        Encoding::Hex => hex::encode(bytes),
        Encoding::Base32 => base32::encode(base32::Alphabet::Rfc4648 { padding: false }, bytes),
        Encoding::Base64 => {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD.encode(bytes)
        }
    }
}

/// Decode base-32 with or without spaces/dashes, case-insensitive.
fn decode_base32(text: &str) -> Result<Vec<u8>, OtpError> {
    let cleaned = text.replace(' ', "").replace('-', "").to_uppercase();
    let padded = pad_base32(&cleaned);
    base32::decode(base32::Alphabet::Rfc4648 { padding: true }, &padded)
        .or_else(|| base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &cleaned))
        .ok_or_else(|| {
            OtpError::new(
                OtpErrorKind::InvalidSecretEncoding,
                "secret is not valid base-32",
            )
        })
}

/// Pad a base-32 string to a multiple of 8 with '='.
fn pad_base32(s: &str) -> String {
    let remainder = s.len() % 8;
    if remainder == 0 {
        s.to_string()
    } else {
        let pad_count = 8 - remainder;
        format!("{}{}", s, "=".repeat(pad_count))
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Draw `length` bytes from the operating-system CSPRNG.
pub fn generate_secret_bytes(length: usize) -> Vec<u8> {
    let mut buf = vec![0u8; length];
    rand::rngs::OsRng.fill_bytes(&mut buf);
    buf
}

/// Generate a fresh random secret per the given options.
///
/// Without URL metadata the encoded secret is returned alone; with URL
/// metadata a setup URL is built, and the secret rides along only when
/// `include_secret_for_validation` is set.
pub fn generate_secret(options: &GenerateSecretOptions) -> GeneratedSecret {
    let length = options.length.unwrap_or(DEFAULT_SECRET_BYTES);
    let encoding = options.encoding.unwrap_or_default();

    let bytes = generate_secret_bytes(length);
    let encoded = encode_secret(&bytes, encoding);

    match &options.url {
        None => GeneratedSecret::Secret(encoded),
        Some(spec) => {
            let url = uri::build_setup_url(&encoded, spec);
            if options.include_secret_for_validation {
                GeneratedSecret::Both {
                    url,
                    secret: encoded,
                }
            } else {
                GeneratedSecret::Url(url)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::types::{OtpType, SetupUrlSpec};
    use std::collections::HashSet;

    // ── Decode / encode round-trips ──────────────────────────────

    #[test]
    fn roundtrip_utf8() {
        let original = "correct horse battery staple";
        let decoded = decode_secret(original, Encoding::Utf8).unwrap();
        assert_eq!(encode_secret(&decoded, Encoding::Utf8), original);
    }

    #[test]
    fn roundtrip_hex() {
        let original = "3132333435363738393031323334353637383930";
        let decoded = decode_secret(original, Encoding::Hex).unwrap();
        assert_eq!(decoded, b"12345678901234567890");
        assert_eq!(encode_secret(&decoded, Encoding::Hex), original);
    }

    #[test]
    fn roundtrip_base32() {
        let original = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";
        let decoded = decode_secret(original, Encoding::Base32).unwrap();
        assert_eq!(decoded, b"12345678901234567890");
        assert_eq!(encode_secret(&decoded, Encoding::Base32), original);
    }

    #[test]
    fn roundtrip_base64() {
        let original = "MTIzNDU2Nzg5MDEyMzQ1Njc4OTA=";
        let decoded = decode_secret(original, Encoding::Base64).unwrap();
        assert_eq!(decoded, b"12345678901234567890");
        assert_eq!(encode_secret(&decoded, Encoding::Base64), original);
    }

    // ── Base-32 cleaning ─────────────────────────────────────────

    #[test]
    fn base32_with_spaces_dashes() {
        let clean = decode_secret("JBSWY3DPEHPK3PXP", Encoding::Base32).unwrap();
        let spaced = decode_secret("JBSW Y3DP EHPK 3PXP", Encoding::Base32).unwrap();
        let dashed = decode_secret("JBSW-Y3DP-EHPK-3PXP", Encoding::Base32).unwrap();
        assert_eq!(clean, spaced);
        assert_eq!(spaced, dashed);
    }

    #[test]
    fn base32_case_insensitive() {
        let upper = decode_secret("JBSWY3DPEHPK3PXP", Encoding::Base32).unwrap();
        let lower = decode_secret("jbswy3dpehpk3pxp", Encoding::Base32).unwrap();
        assert_eq!(upper, lower);
    }

    #[test]
    fn hex_mixed_case() {
        let a = decode_secret("DEADBEEF", Encoding::Hex).unwrap();
        let b = decode_secret("deadbeef", Encoding::Hex).unwrap();
        assert_eq!(a, b);
    }

    // ── Rejections ───────────────────────────────────────────────

    #[test]
    fn empty_secret_rejected_for_every_encoding() {
        for encoding in [Encoding::Utf8, Encoding::Hex, Encoding::Base32, Encoding::Base64] {
            let err = decode_secret("", encoding).unwrap_err();
            assert_eq!(err.kind, OtpErrorKind::InvalidSecretEncoding);
        }
    }

    #[test]
    fn malformed_inputs_rejected() {
        assert!(decode_secret("xyz", Encoding::Hex).is_err());
        assert!(decode_secret("!!!", Encoding::Base32).is_err());
        assert!(decode_secret("%%%not-base64%%%", Encoding::Base64).is_err());
    }

    // ── Generation ───────────────────────────────────────────────

    #[test]
    fn generated_secret_has_requested_length() {
        let opts = GenerateSecretOptions::new().with_length(20);
        let result = generate_secret(&opts);
        let bytes = decode_secret(result.secret().unwrap(), Encoding::Base32).unwrap();
        assert_eq!(bytes.len(), 20);
    }

    #[test]
    fn generated_secret_default_length_is_16() {
        let result = generate_secret(&GenerateSecretOptions::new());
        let bytes = decode_secret(result.secret().unwrap(), Encoding::Base32).unwrap();
        assert_eq!(bytes.len(), DEFAULT_SECRET_BYTES);
    }

    #[test]
    fn generated_secret_honours_encoding() {
        let opts = GenerateSecretOptions::new().with_encoding(Encoding::Hex);
        let result = generate_secret(&opts);
        let secret = result.secret().unwrap();
        assert_eq!(secret.len(), DEFAULT_SECRET_BYTES * 2);
        assert!(secret.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn generated_secrets_never_repeat() {
        let mut seen = HashSet::new();
        for _ in 0..10_000 {
            let bytes = generate_secret_bytes(16);
            assert!(seen.insert(bytes), "CSPRNG produced a duplicate secret");
        }
    }

    // ── URL assembly ─────────────────────────────────────────────

    #[test]
    fn url_metadata_returns_both_by_default() {
        let opts = GenerateSecretOptions::new()
            .with_url(SetupUrlSpec::new(OtpType::Totp).with_issuer("Acme"));
        let result = generate_secret(&opts);
        let url = result.url().unwrap();
        let secret = result.secret().unwrap();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains(&format!("secret={}", secret)));
    }

    #[test]
    fn url_only_when_secret_excluded() {
        let opts = GenerateSecretOptions::new()
            .with_url(SetupUrlSpec::new(OtpType::Totp).with_issuer("Acme"))
            .include_secret(false);
        let result = generate_secret(&opts);
        assert!(result.url().is_some());
        assert!(result.secret().is_none());
    }
}
