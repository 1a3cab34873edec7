//! `otpauth://` setup-URL construction and URI parsing.
//!
//! The setup URL handed to authenticator apps during enrollment has the
//! shape
//! `otpauth://<type>/<issuer>:<account>?secret=…&issuer=…[&account=…][&period=…][&timeStep=…][&algorithm=…]`
//! with issuer and account percent-encoded and optional parameters omitted
//! when absent. Parsing also accepts the standard key-URI parameter set
//! (`digits`, `period`, `counter`) so built URLs and third-party URIs both
//! round-trip.

use serde::{Deserialize, Serialize};

use crate::otp::core::{check_digits, check_time_step};
use crate::otp::types::{Algorithm, OtpError, OtpErrorKind, OtpType, SetupUrlSpec};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Build
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Build a setup URL for the given encoded secret.
pub fn build_setup_url(secret: &str, spec: &SetupUrlSpec) -> String {
    let issuer = spec.issuer.as_deref().unwrap_or("");
    let account = spec.account.as_deref().unwrap_or("");

    let mut params = vec![
        format!("secret={}", secret),
        format!("issuer={}", url_encode(issuer)),
    ];

    if !account.is_empty() {
        params.push(format!("account={}", url_encode(account)));
    }
    if let Some(period) = spec.period {
        params.push(format!("period={}", period));
    }
    if let Some(time_step) = spec.time_step {
        params.push(format!("timeStep={}", time_step));
    }
    if let Some(algorithm) = spec.algorithm {
        params.push(format!("algorithm={}", algorithm.uri_name()));
    }

    format!(
        "otpauth://{}/{}:{}?{}",
        spec.otp_type,
        url_encode(issuer),
        url_encode(account),
        params.join("&")
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Parse
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Enrollment parameters extracted from an `otpauth://` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OtpAuthUri {
    /// Time-based or counter-based.
    pub otp_type: OtpType,
    /// Issuing service, from the query parameter or the path prefix.
    pub issuer: Option<String>,
    /// Account label.
    pub account: String,
    /// Encoded secret, exactly as carried by the URI.
    pub secret: String,
    /// HMAC algorithm (SHA-1 when the URI names none).
    pub algorithm: Algorithm,
    /// Code length (6 when the URI names none).
    pub digits: u8,
    /// Time step in seconds (30 when the URI names none).
    pub period: u32,
    /// Counter start value (HOTP only).
    pub counter: u64,
}

/// Parse an `otpauth://` URI into its enrollment parameters.
pub fn parse_otpauth_uri(text: &str) -> Result<OtpAuthUri, OtpError> {
    let url = url::Url::parse(text).map_err(|e| {
        OtpError::new(OtpErrorKind::InvalidUri, "not a valid URI").with_detail(e.to_string())
    })?;

    if url.scheme() != "otpauth" {
        return Err(OtpError::new(
            OtpErrorKind::InvalidUri,
            format!("expected scheme 'otpauth', got '{}'", url.scheme()),
        ));
    }

    let otp_type = match url.host_str() {
        Some("totp") => OtpType::Totp,
        Some("hotp") => OtpType::Hotp,
        other => {
            return Err(OtpError::new(
                OtpErrorKind::InvalidUri,
                format!("unknown OTP type: {:?}", other),
            ))
        }
    };

    // Path is "/LABEL" or "/ISSUER:LABEL"
    let path = url.path();
    let path = path.strip_prefix('/').unwrap_or(path);
    let path_decoded = url_decode(path);

    let (path_issuer, path_account) = match path_decoded.find(':') {
        Some(colon_pos) => (
            Some(path_decoded[..colon_pos].trim().to_string()),
            path_decoded[colon_pos + 1..].trim().to_string(),
        ),
        None => (None, path_decoded.trim().to_string()),
    };

    let mut secret = None;
    let mut param_issuer = None;
    let mut param_account = None;
    let mut algorithm = Algorithm::Sha1;
    let mut digits = 6u8;
    let mut period = 30u32;
    let mut counter = 0u64;

    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "secret" => secret = Some(value.to_string()),
            "issuer" => param_issuer = Some(value.to_string()),
            "account" => param_account = Some(value.to_string()),
            "algorithm" => algorithm = Algorithm::parse(&value)?,
            "digits" => {
                let d: u8 = value.parse().map_err(|_| {
                    OtpError::new(
                        OtpErrorKind::InvalidDigits,
                        format!("digits parameter is not a number: {}", value),
                    )
                })?;
                check_digits(d)?;
                digits = d;
            }
            "period" | "timeStep" => {
                let p: u32 = value.parse().map_err(|_| {
                    OtpError::new(
                        OtpErrorKind::InvalidTimeStep,
                        format!("{} parameter is not a number: {}", key, value),
                    )
                })?;
                check_time_step(p)?;
                period = p;
            }
            "counter" => {
                counter = value.parse().map_err(|_| {
                    OtpError::new(
                        OtpErrorKind::InvalidUri,
                        format!("counter parameter is not a number: {}", value),
                    )
                })?;
            }
            _ => {} // ignore unknown params
        }
    }

    let secret = secret.ok_or_else(|| {
        OtpError::new(OtpErrorKind::InvalidUri, "missing 'secret' parameter")
    })?;

    // Prefer query parameters, then the path; empty issuers count as absent.
    let issuer = param_issuer
        .or(path_issuer)
        .filter(|iss| !iss.is_empty());
    let account = param_account.unwrap_or(path_account);

    Ok(OtpAuthUri {
        otp_type,
        issuer,
        account,
        secret,
        algorithm,
        digits,
        period,
        counter,
    })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  URL encoding helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

fn url_encode(s: &str) -> String {
    let mut output = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                output.push(byte as char);
            }
            b' ' => output.push_str("%20"),
            b'@' => output.push_str("%40"),
            _ => output.push_str(&format!("%{:02X}", byte)),
        }
    }
    output
}

fn url_decode(s: &str) -> String {
    let mut result = String::new();
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '%' {
            let hex: String = chars.by_ref().take(2).collect();
            if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                result.push(byte as char);
            } else {
                result.push('%');
                result.push_str(&hex);
            }
        } else if c == '+' {
            result.push(' ');
        } else {
            result.push(c);
        }
    }
    result
}
