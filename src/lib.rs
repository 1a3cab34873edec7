//! # otpkit – One-Time Password toolkit
//!
//! Pure-computation HOTP/TOTP library:
//!
//! - **RFC 4226 / 6238** – HOTP & TOTP generation with SHA-1, SHA-256, SHA-512
//! - **Validation** – constant-time comparison with configurable drift windows
//! - **Secrets** – CSPRNG secret generation in UTF-8, hex, base-32 or base-64
//! - **otpauth:// URLs** – Setup-URL construction for authenticator apps,
//!   plus URI parsing for enrollment round-trips
//!
//! Every operation is synchronous and stateless; the only external resources
//! are the OS random number generator and the system clock.

pub mod otp;
