//! OTP crate: sub-modules.

pub mod types;
pub mod core;
pub mod secret;
pub mod uri;
pub mod service;

// Re-export top-level items for convenience.
pub use self::types::*;
pub use self::core::{
    generate_hotp, generate_totp, generate_totp_at, hotp_raw, verify_hotp, verify_totp,
    verify_totp_at,
};
pub use self::secret::{decode_secret, encode_secret, generate_secret};
pub use self::service::OtpService;
pub use self::uri::{build_setup_url, parse_otpauth_uri, OtpAuthUri};
