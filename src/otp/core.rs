//! Core OTP generation — RFC 4226 (HOTP) and RFC 6238 (TOTP).
//!
//! Implements HMAC-based One-Time Password with SHA-1, SHA-256, and SHA-512,
//! time-step calculation, and code verification with configurable drift
//! windows. Both engines share the digest and dynamic-truncation path; TOTP
//! only differs in deriving its counter from elapsed time steps.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::{Sha256, Sha512};

use crate::otp::secret::decode_secret;
use crate::otp::types::{Algorithm, Encoding, OtpError, OtpErrorKind};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Raw HMAC-OTP (RFC 4226 §5.3)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute an OTP code for the given raw key bytes and counter.
///
/// The counter is serialized as an 8-byte big-endian buffer before hashing.
/// `digits` must already be validated to [1, 9].
pub fn hotp_raw(key: &[u8], counter: u64, digits: u8, algo: Algorithm) -> String {
    let hmac_result = compute_hmac(key, &counter.to_be_bytes(), algo);
    truncate(&hmac_result, digits)
}

/// Compute HMAC(key, message) using the specified algorithm.
fn compute_hmac(key: &[u8], data: &[u8], algo: Algorithm) -> Vec<u8> {
    match algo {
        Algorithm::Sha1 => {
            let mut mac =
                Hmac::<Sha1>::new_from_slice(key).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Sha256 => {
            let mut mac =
                Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
        Algorithm::Sha512 => {
            let mut mac =
                Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key length");
            mac.update(data);
            mac.finalize().into_bytes().to_vec()
        }
    }
}

/// Dynamic truncation per RFC 4226 §5.3.
///
/// The low nibble of the last digest byte selects a 4-byte window; the top
/// bit of that window is masked so the value stays in the 31-bit range.
fn truncate(hmac_result: &[u8], digits: u8) -> String {
    let offset = (hmac_result[hmac_result.len() - 1] & 0x0f) as usize;
    let binary = ((hmac_result[offset] as u32 & 0x7f) << 24)
        | ((hmac_result[offset + 1] as u32) << 16)
        | ((hmac_result[offset + 2] as u32) << 8)
        | (hmac_result[offset + 3] as u32);
    let modulus = 10u32.pow(digits as u32);
    let code = binary % modulus;
    format!("{:0>width$}", code, width = digits as usize)
}

/// Reject digit counts outside [1, 9].
pub(crate) fn check_digits(digits: u8) -> Result<(), OtpError> {
    if (1..=9).contains(&digits) {
        Ok(())
    } else {
        Err(OtpError::new(
            OtpErrorKind::InvalidDigits,
            format!("OTP length must be 1-9 digits, got {}", digits),
        ))
    }
}

/// Reject a non-positive time step.
pub(crate) fn check_time_step(time_step: u32) -> Result<(), OtpError> {
    if time_step == 0 {
        Err(OtpError::new(
            OtpErrorKind::InvalidTimeStep,
            "time step must be a positive number of seconds",
        ))
    } else {
        Ok(())
    }
}

/// A candidate must be digits-only of exactly the requested length.
fn code_shape_ok(code: &str, digits: u8) -> bool {
    code.len() == digits as usize && code.chars().all(|c| c.is_ascii_digit())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  HOTP (counter-based, RFC 4226)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Generate an HOTP code from an encoded secret.
pub fn generate_hotp(
    secret: &str,
    encoding: Encoding,
    counter: u64,
    digits: u8,
    algo: Algorithm,
) -> Result<String, OtpError> {
    check_digits(digits)?;
    let key = decode_secret(secret, encoding)?;
    Ok(hotp_raw(&key, counter, digits, algo))
}

/// Verify an HOTP candidate against a counter.
///
/// `window` widens the accepted range to `[counter - w, counter + w]` with
/// `w = max(window, 0)`, tolerating counter drift between client and
/// server. Comparison is constant-time; the first match wins.
pub fn verify_hotp(
    secret: &str,
    encoding: Encoding,
    candidate: &str,
    counter: u64,
    digits: u8,
    algo: Algorithm,
    window: i32,
) -> Result<bool, OtpError> {
    check_digits(digits)?;
    let key = decode_secret(secret, encoding)?;

    if !code_shape_ok(candidate, digits) {
        return Ok(false);
    }

    let w = if window > 0 { window as u64 } else { 0 };
    let start = counter.saturating_sub(w);
    let end = counter.saturating_add(w);

    for c in start..=end {
        let generated = hotp_raw(&key, c, digits, algo);
        if constant_time_eq(generated.as_bytes(), candidate.as_bytes()) {
            return Ok(true);
        }
    }

    Ok(false)
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TOTP (time-based, RFC 6238)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Current unix timestamp in seconds.
pub fn current_unix_time() -> Result<u64, OtpError> {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| {
            OtpError::new(OtpErrorKind::ClockUnavailable, "system clock is unreadable")
                .with_detail(e.to_string())
        })
}

/// Compute the time-step counter for a given unix timestamp.
pub fn time_step_at(unix_seconds: u64, time_step: u32) -> u64 {
    unix_seconds / time_step as u64
}

/// Seconds remaining until the code for this timestamp expires.
pub fn seconds_remaining_at(unix_seconds: u64, time_step: u32) -> u32 {
    let step = time_step as u64;
    (step - (unix_seconds % step)) as u32
}

/// Generate a TOTP code at an explicit unix timestamp.
pub fn generate_totp_at(
    secret: &str,
    encoding: Encoding,
    digits: u8,
    time_step: u32,
    algo: Algorithm,
    unix_seconds: u64,
) -> Result<String, OtpError> {
    check_time_step(time_step)?;
    generate_hotp(
        secret,
        encoding,
        time_step_at(unix_seconds, time_step),
        digits,
        algo,
    )
}

/// Generate a TOTP code at the current time.
pub fn generate_totp(
    secret: &str,
    encoding: Encoding,
    digits: u8,
    time_step: u32,
    algo: Algorithm,
) -> Result<String, OtpError> {
    generate_totp_at(secret, encoding, digits, time_step, algo, current_unix_time()?)
}

/// Verify a TOTP candidate at an explicit unix timestamp.
///
/// The sign of `window` selects the drift direction: a positive window
/// accepts codes minted up to `window` steps *earlier* (the common
/// server-side case of a client lagging the validator), a negative window
/// accepts codes up to `|window|` steps *later*, and zero accepts only the
/// current step. Comparison is constant-time; the first match wins.
#[allow(clippy::too_many_arguments)]
pub fn verify_totp_at(
    secret: &str,
    encoding: Encoding,
    candidate: &str,
    digits: u8,
    time_step: u32,
    algo: Algorithm,
    window: i32,
    unix_seconds: u64,
) -> Result<bool, OtpError> {
    check_digits(digits)?;
    check_time_step(time_step)?;
    let key = decode_secret(secret, encoding)?;

    if !code_shape_ok(candidate, digits) {
        return Ok(false);
    }

    let base = time_step_at(unix_seconds, time_step) as i64;
    let (lo, hi) = if window >= 0 {
        (-(window as i64), 0)
    } else {
        (0, window.unsigned_abs() as i64)
    };

    for delta in lo..=hi {
        let stepped = base + delta;
        if stepped < 0 {
            continue;
        }
        let generated = hotp_raw(&key, stepped as u64, digits, algo);
        if constant_time_eq(generated.as_bytes(), candidate.as_bytes()) {
            return Ok(true);
        }
    }

    Ok(false)
}

/// Verify a TOTP candidate at the current time.
#[allow(clippy::too_many_arguments)]
pub fn verify_totp(
    secret: &str,
    encoding: Encoding,
    candidate: &str,
    digits: u8,
    time_step: u32,
    algo: Algorithm,
    window: i32,
) -> Result<bool, OtpError> {
    verify_totp_at(
        secret,
        encoding,
        candidate,
        digits,
        time_step,
        algo,
        window,
        current_unix_time()?,
    )
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Utility helpers
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Constant-time comparison (to prevent timing attacks on code verification).
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
