//! High-level facade — holds shared defaults, delegates to sub-modules.
//!
//! `OtpService` is stateless apart from its configuration: every call
//! resolves the per-call options against the configured defaults once,
//! then hands concrete values to the engines in [`core`]. Instances are
//! freely shareable across threads.
//!
//! [`core`]: crate::otp::core

use log::{debug, warn};

use crate::otp::core;
use crate::otp::secret;
use crate::otp::types::{
    Algorithm, Encoding, GenerateSecretOptions, GeneratedSecret, HotpOptions, OtpConfig,
    OtpError, TotpOptions,
};

/// Stateless OTP coordination surface.
#[derive(Debug, Clone, Default)]
pub struct OtpService {
    config: OtpConfig,
}

impl OtpService {
    /// Create a service with the standard defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with explicit defaults.
    pub fn with_config(config: OtpConfig) -> Self {
        Self { config }
    }

    /// The configured defaults.
    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  HOTP
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Generate a counter-based code.
    pub fn generate_hotp(&self, options: &HotpOptions) -> Result<String, OtpError> {
        let digits = options.digits.unwrap_or(self.config.digits);
        let algorithm = options.algorithm.unwrap_or(self.config.algorithm);
        let encoding = options.encoding.unwrap_or(self.config.encoding);
        core::generate_hotp(&options.secret, encoding, options.counter, digits, algorithm)
    }

    /// Validate a counter-based candidate.
    ///
    /// `window` falls back to the configured default when `None`. A
    /// mismatch is `Ok(false)`; only malformed inputs are errors.
    pub fn validate_hotp(
        &self,
        options: &HotpOptions,
        candidate: &str,
        window: Option<i32>,
    ) -> Result<bool, OtpError> {
        let digits = options.digits.unwrap_or(self.config.digits);
        let algorithm = options.algorithm.unwrap_or(self.config.algorithm);
        let encoding = options.encoding.unwrap_or(self.config.encoding);
        let window = window.unwrap_or(self.config.window);
        debug!(
            "validating hotp candidate at counter {} with window {}",
            options.counter, window
        );
        core::verify_hotp(
            &options.secret,
            encoding,
            candidate,
            options.counter,
            digits,
            algorithm,
            window,
        )
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  TOTP
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Generate a time-based code.
    ///
    /// The timestamp override is honoured when present, otherwise the
    /// system clock is read. Unset `encoding` means hex, the conventional
    /// TOTP secret wire format.
    pub fn generate_totp(&self, options: &TotpOptions) -> Result<String, OtpError> {
        let (digits, algorithm, encoding, time_step) = self.resolve_totp(options);
        match options.timestamp {
            Some(ts) => core::generate_totp_at(
                &options.secret,
                encoding,
                digits,
                time_step,
                algorithm,
                ts,
            ),
            None => core::generate_totp(&options.secret, encoding, digits, time_step, algorithm),
        }
    }

    /// Validate a time-based candidate.
    pub fn validate_totp(
        &self,
        options: &TotpOptions,
        candidate: &str,
    ) -> Result<bool, OtpError> {
        let (digits, algorithm, encoding, time_step) = self.resolve_totp(options);
        let window = options.window.unwrap_or(self.config.window);
        debug!("validating totp candidate with window {}", window);
        match options.timestamp {
            Some(ts) => core::verify_totp_at(
                &options.secret,
                encoding,
                candidate,
                digits,
                time_step,
                algorithm,
                window,
                ts,
            ),
            None => core::verify_totp(
                &options.secret,
                encoding,
                candidate,
                digits,
                time_step,
                algorithm,
                window,
            ),
        }
    }

    /// Seconds until the code for the given options expires.
    pub fn seconds_remaining(&self, options: &TotpOptions) -> Result<u32, OtpError> {
        let time_step = options.time_step.unwrap_or(self.config.time_step);
        core::check_time_step(time_step)?;
        let unix_seconds = match options.timestamp {
            Some(ts) => ts,
            None => core::current_unix_time()?,
        };
        Ok(core::seconds_remaining_at(unix_seconds, time_step))
    }

    fn resolve_totp(&self, options: &TotpOptions) -> (u8, Algorithm, Encoding, u32) {
        (
            options.digits.unwrap_or(self.config.digits),
            options.algorithm.unwrap_or(self.config.algorithm),
            options.encoding.unwrap_or(Encoding::Hex),
            options.time_step.unwrap_or(self.config.time_step),
        )
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Secrets
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Generate enrollment secret material.
    ///
    /// Unset length and encoding fall back to the configured defaults
    /// (32 bytes, base-32) rather than the bare generator's.
    pub fn generate_secret(&self, options: &GenerateSecretOptions) -> GeneratedSecret {
        let mut resolved = options.clone();
        let length = resolved.length.get_or_insert(self.config.secret_length);
        if *length < secret::DEFAULT_SECRET_BYTES {
            warn!(
                "generating a {}-byte secret, below the 16-byte shared-secret minimum",
                *length
            );
        }
        resolved.encoding.get_or_insert(self.config.encoding);
        secret::generate_secret(&resolved)
    }
}
