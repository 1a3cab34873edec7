//! Core types for HOTP/TOTP generation and validation.

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Algorithm
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hash algorithm used for HMAC-based OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Algorithm {
    Sha1,
    Sha256,
    Sha512,
}

impl Default for Algorithm {
    fn default() -> Self {
        Self::Sha1
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sha1 => write!(f, "SHA1"),
            Self::Sha256 => write!(f, "SHA256"),
            Self::Sha512 => write!(f, "SHA512"),
        }
    }
}

impl Algorithm {
    /// Parse from a case-insensitive string.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "SHA1" | "SHA-1" | "HMACSHA1" | "HMAC-SHA1" => Some(Self::Sha1),
            "SHA256" | "SHA-256" | "HMACSHA256" | "HMAC-SHA256" => Some(Self::Sha256),
            "SHA512" | "SHA-512" | "HMACSHA512" | "HMAC-SHA512" => Some(Self::Sha512),
            _ => None,
        }
    }

    /// Parse, failing with `InvalidAlgorithm` for anything unsupported.
    pub fn parse(s: &str) -> Result<Self, OtpError> {
        Self::from_str_loose(s).ok_or_else(|| {
            OtpError::new(
                OtpErrorKind::InvalidAlgorithm,
                format!("Unsupported HMAC algorithm: {}", s),
            )
        })
    }

    /// URI-safe name for `otpauth://` parameters.
    pub fn uri_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Sha512 => "SHA512",
        }
    }

    /// HMAC digest length in bytes (20 / 32 / 64).
    pub fn digest_len(&self) -> usize {
        match self {
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Secret encoding
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Textual representation of raw secret bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    Utf8,
    Hex,
    Base32,
    Base64,
}

impl Default for Encoding {
    fn default() -> Self {
        Self::Base32
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "utf8"),
            Self::Hex => write!(f, "hex"),
            Self::Base32 => write!(f, "base32"),
            Self::Base64 => write!(f, "base64"),
        }
    }
}

impl Encoding {
    /// Parse from a case-insensitive string.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "utf8" | "utf-8" | "ascii" => Some(Self::Utf8),
            "hex" => Some(Self::Hex),
            "base32" => Some(Self::Base32),
            "base64" => Some(Self::Base64),
            _ => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  OTP type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Whether a setup URL targets time-based or counter-based OTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpType {
    Totp,
    Hotp,
}

impl Default for OtpType {
    fn default() -> Self {
        Self::Totp
    }
}

impl fmt::Display for OtpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Totp => write!(f, "totp"),
            Self::Hotp => write!(f, "hotp"),
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Shared configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default values shared by every operation of an [`OtpService`].
///
/// Option fields left unset on a per-call options struct are resolved
/// against this configuration once at the start of the call.
///
/// [`OtpService`]: crate::otp::service::OtpService
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpConfig {
    /// OTP length in decimal digits (1–9).
    pub digits: u8,
    /// HMAC hash algorithm.
    pub algorithm: Algorithm,
    /// Secret text encoding for HOTP and secret generation.
    pub encoding: Encoding,
    /// Generated secret length in bytes.
    pub secret_length: usize,
    /// TOTP time step in seconds.
    pub time_step: u32,
    /// Validation drift window in steps (sign selects direction).
    pub window: i32,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            digits: 6,
            algorithm: Algorithm::Sha1,
            encoding: Encoding::Base32,
            secret_length: 32,
            time_step: 30,
            window: 0,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Per-call options
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Options for a counter-based (HOTP) operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotpOptions {
    /// Encoded secret key.
    pub secret: String,
    /// Moving-factor counter. Incrementing it after each accepted code is
    /// the caller's contract; this crate never mutates caller state.
    pub counter: u64,
    /// OTP length override (1–9).
    pub digits: Option<u8>,
    /// HMAC algorithm override.
    pub algorithm: Option<Algorithm>,
    /// Secret encoding override.
    pub encoding: Option<Encoding>,
}

impl HotpOptions {
    /// Create options for a secret and counter, everything else defaulted.
    pub fn new(secret: impl Into<String>, counter: u64) -> Self {
        Self {
            secret: secret.into(),
            counter,
            digits: None,
            algorithm: None,
            encoding: None,
        }
    }

    /// Builder: set digit count.
    pub fn with_digits(mut self, digits: u8) -> Self {
        self.digits = Some(digits);
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Builder: set secret encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

/// Options for a time-based (TOTP) operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpOptions {
    /// Encoded secret key.
    pub secret: String,
    /// OTP length override (1–9).
    pub digits: Option<u8>,
    /// HMAC algorithm override.
    pub algorithm: Option<Algorithm>,
    /// Secret encoding override. When unset, TOTP secrets are decoded as
    /// hex, the conventional wire format for this operation (HOTP defaults
    /// to base-32 instead).
    pub encoding: Option<Encoding>,
    /// Time step in seconds, must be positive.
    pub time_step: Option<u32>,
    /// Validation drift window in steps (sign selects direction).
    pub window: Option<i32>,
    /// Unix-timestamp override of "now".
    pub timestamp: Option<u64>,
}

impl TotpOptions {
    /// Create options for a secret, everything else defaulted.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            digits: None,
            algorithm: None,
            encoding: None,
            time_step: None,
            window: None,
            timestamp: None,
        }
    }

    /// Builder: set digit count.
    pub fn with_digits(mut self, digits: u8) -> Self {
        self.digits = Some(digits);
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Builder: set secret encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Builder: set time step in seconds.
    pub fn with_time_step(mut self, time_step: u32) -> Self {
        self.time_step = Some(time_step);
        self
    }

    /// Builder: set validation window.
    pub fn with_window(mut self, window: i32) -> Self {
        self.window = Some(window);
        self
    }

    /// Builder: pin the timestamp instead of reading the clock.
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Secret generation options
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Metadata for building an `otpauth://` setup URL during enrollment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupUrlSpec {
    /// Time-based or counter-based.
    pub otp_type: OtpType,
    /// Issuing service name.
    pub issuer: Option<String>,
    /// Account / user name.
    pub account: Option<String>,
    /// Code validity period in seconds.
    pub period: Option<u32>,
    /// Generation time step in seconds.
    pub time_step: Option<u32>,
    /// HMAC algorithm advertised to the authenticator app.
    pub algorithm: Option<Algorithm>,
}

impl SetupUrlSpec {
    /// Create URL metadata for the given OTP type.
    pub fn new(otp_type: OtpType) -> Self {
        Self {
            otp_type,
            ..Default::default()
        }
    }

    /// Builder: set issuer.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    /// Builder: set account name.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Builder: set period.
    pub fn with_period(mut self, period: u32) -> Self {
        self.period = Some(period);
        self
    }

    /// Builder: set time step.
    pub fn with_time_step(mut self, time_step: u32) -> Self {
        self.time_step = Some(time_step);
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }
}

/// Options for [`generate_secret`].
///
/// [`generate_secret`]: crate::otp::secret::generate_secret
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateSecretOptions {
    /// Secret length in bytes.
    pub length: Option<usize>,
    /// Encoding for the returned secret string.
    pub encoding: Option<Encoding>,
    /// When set, a setup URL is built alongside (or instead of) the secret.
    pub url: Option<SetupUrlSpec>,
    /// Return the encoded secret together with the URL so the caller can
    /// persist it for later validation.
    pub include_secret_for_validation: bool,
}

impl Default for GenerateSecretOptions {
    fn default() -> Self {
        Self {
            length: None,
            encoding: None,
            url: None,
            include_secret_for_validation: true,
        }
    }
}

impl GenerateSecretOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set secret length in bytes.
    pub fn with_length(mut self, length: usize) -> Self {
        self.length = Some(length);
        self
    }

    /// Builder: set encoding.
    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = Some(encoding);
        self
    }

    /// Builder: request a setup URL.
    pub fn with_url(mut self, url: SetupUrlSpec) -> Self {
        self.url = Some(url);
        self
    }

    /// Builder: control whether the secret is returned alongside the URL.
    pub fn include_secret(mut self, include: bool) -> Self {
        self.include_secret_for_validation = include;
        self
    }
}

/// Result of secret generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeneratedSecret {
    /// Bare encoded secret, no URL metadata was supplied.
    Secret(String),
    /// Setup URL only, the secret is embedded in its query string.
    Url(String),
    /// Setup URL plus the encoded secret for the caller to persist.
    Both { url: String, secret: String },
}

impl GeneratedSecret {
    /// The encoded secret, when present.
    pub fn secret(&self) -> Option<&str> {
        match self {
            Self::Secret(s) => Some(s),
            Self::Both { secret, .. } => Some(secret),
            Self::Url(_) => None,
        }
    }

    /// The setup URL, when present.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(u) => Some(u),
            Self::Both { url, .. } => Some(url),
            Self::Secret(_) => None,
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Error type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Error kind for this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OtpErrorKind {
    /// Secret cannot be decoded under the declared encoding.
    InvalidSecretEncoding,
    /// Requested OTP length outside [1, 9].
    InvalidDigits,
    /// Non-positive TOTP time step.
    InvalidTimeStep,
    /// Unsupported HMAC hash requested.
    InvalidAlgorithm,
    /// Malformed `otpauth://` URI.
    InvalidUri,
    /// System clock unreadable.
    ClockUnavailable,
}

/// Crate-level error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpError {
    pub kind: OtpErrorKind,
    pub message: String,
    pub detail: Option<String>,
}

impl fmt::Display for OtpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.kind, self.message)?;
        if let Some(d) = &self.detail {
            write!(f, " ({})", d)?;
        }
        Ok(())
    }
}

impl std::error::Error for OtpError {}

impl OtpError {
    pub fn new(kind: OtpErrorKind, msg: impl Into<String>) -> Self {
        Self {
            kind,
            message: msg.into(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl From<OtpError> for String {
    fn from(e: OtpError) -> String {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Algorithm ────────────────────────────────────────────────

    #[test]
    fn algorithm_default_is_sha1() {
        assert_eq!(Algorithm::default(), Algorithm::Sha1);
    }

    #[test]
    fn algorithm_display() {
        assert_eq!(Algorithm::Sha1.to_string(), "SHA1");
        assert_eq!(Algorithm::Sha256.to_string(), "SHA256");
        assert_eq!(Algorithm::Sha512.to_string(), "SHA512");
    }

    #[test]
    fn algorithm_from_str_loose() {
        assert_eq!(Algorithm::from_str_loose("sha1"), Some(Algorithm::Sha1));
        assert_eq!(Algorithm::from_str_loose("SHA-256"), Some(Algorithm::Sha256));
        assert_eq!(Algorithm::from_str_loose("HMAC-SHA512"), Some(Algorithm::Sha512));
        assert_eq!(Algorithm::from_str_loose("MD5"), None);
    }

    #[test]
    fn algorithm_parse_rejects_unknown() {
        let err = Algorithm::parse("MD5").unwrap_err();
        assert_eq!(err.kind, OtpErrorKind::InvalidAlgorithm);
    }

    #[test]
    fn algorithm_digest_len() {
        assert_eq!(Algorithm::Sha1.digest_len(), 20);
        assert_eq!(Algorithm::Sha256.digest_len(), 32);
        assert_eq!(Algorithm::Sha512.digest_len(), 64);
    }

    #[test]
    fn algorithm_serde_roundtrip() {
        let algo = Algorithm::Sha256;
        let json = serde_json::to_string(&algo).unwrap();
        assert_eq!(json, "\"SHA256\"");
        let back: Algorithm = serde_json::from_str(&json).unwrap();
        assert_eq!(back, algo);
    }

    // ── Encoding ─────────────────────────────────────────────────

    #[test]
    fn encoding_default_is_base32() {
        assert_eq!(Encoding::default(), Encoding::Base32);
    }

    #[test]
    fn encoding_from_str_loose() {
        assert_eq!(Encoding::from_str_loose("UTF-8"), Some(Encoding::Utf8));
        assert_eq!(Encoding::from_str_loose("hex"), Some(Encoding::Hex));
        assert_eq!(Encoding::from_str_loose("Base32"), Some(Encoding::Base32));
        assert_eq!(Encoding::from_str_loose("base64"), Some(Encoding::Base64));
        assert_eq!(Encoding::from_str_loose("rot13"), None);
    }

    // ── OtpConfig ────────────────────────────────────────────────

    #[test]
    fn config_defaults() {
        let cfg = OtpConfig::default();
        assert_eq!(cfg.digits, 6);
        assert_eq!(cfg.algorithm, Algorithm::Sha1);
        assert_eq!(cfg.encoding, Encoding::Base32);
        assert_eq!(cfg.secret_length, 32);
        assert_eq!(cfg.time_step, 30);
        assert_eq!(cfg.window, 0);
    }

    // ── Options builders ─────────────────────────────────────────

    #[test]
    fn hotp_options_builder() {
        let opts = HotpOptions::new("JBSWY3DPEHPK3PXP", 7)
            .with_digits(8)
            .with_algorithm(Algorithm::Sha256)
            .with_encoding(Encoding::Base32);
        assert_eq!(opts.counter, 7);
        assert_eq!(opts.digits, Some(8));
        assert_eq!(opts.algorithm, Some(Algorithm::Sha256));
        assert_eq!(opts.encoding, Some(Encoding::Base32));
    }

    #[test]
    fn totp_options_defaults_unset() {
        let opts = TotpOptions::new("3132333435363738393031323334353637383930");
        assert!(opts.digits.is_none());
        assert!(opts.time_step.is_none());
        assert!(opts.window.is_none());
        assert!(opts.timestamp.is_none());
    }

    #[test]
    fn totp_options_builder() {
        let opts = TotpOptions::new("AA")
            .with_time_step(60)
            .with_window(-1)
            .with_timestamp(59);
        assert_eq!(opts.time_step, Some(60));
        assert_eq!(opts.window, Some(-1));
        assert_eq!(opts.timestamp, Some(59));
    }

    #[test]
    fn generate_secret_options_default_includes_secret() {
        let opts = GenerateSecretOptions::default();
        assert!(opts.include_secret_for_validation);
        assert!(opts.length.is_none());
        assert!(opts.url.is_none());
    }

    // ── GeneratedSecret ──────────────────────────────────────────

    #[test]
    fn generated_secret_accessors() {
        let bare = GeneratedSecret::Secret("ABC".into());
        assert_eq!(bare.secret(), Some("ABC"));
        assert_eq!(bare.url(), None);

        let url = GeneratedSecret::Url("otpauth://totp/x".into());
        assert_eq!(url.secret(), None);
        assert_eq!(url.url(), Some("otpauth://totp/x"));

        let both = GeneratedSecret::Both {
            url: "otpauth://totp/x".into(),
            secret: "ABC".into(),
        };
        assert_eq!(both.secret(), Some("ABC"));
        assert_eq!(both.url(), Some("otpauth://totp/x"));
    }

    #[test]
    fn generated_secret_serde_roundtrip() {
        let both = GeneratedSecret::Both {
            url: "otpauth://totp/x".into(),
            secret: "ABC".into(),
        };
        let json = serde_json::to_string(&both).unwrap();
        let back: GeneratedSecret = serde_json::from_str(&json).unwrap();
        assert_eq!(back, both);
    }

    // ── Error ────────────────────────────────────────────────────

    #[test]
    fn error_display() {
        let err = OtpError::new(OtpErrorKind::InvalidSecretEncoding, "bad base32")
            .with_detail("extra info");
        let s = err.to_string();
        assert!(s.contains("InvalidSecretEncoding"));
        assert!(s.contains("bad base32"));
        assert!(s.contains("extra info"));
    }

    #[test]
    fn error_into_string() {
        let err = OtpError::new(OtpErrorKind::InvalidDigits, "0 digits");
        let s: String = err.into();
        assert!(s.contains("InvalidDigits"));
    }
}
