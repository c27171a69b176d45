//! # kaiza-errors
//!
//! The stable error envelope and code registry for the Kaiza policy-and-audit
//! kernel (C2). Every other kernel crate returns [`KaizaError`]; the tool
//! boundary in `kaiza-kernel` coerces it into an [`ErrorEnvelope`] before it
//! ever reaches the transport.
//!
//! ```
//! use kaiza_errors::{KaizaError, ErrorCode};
//!
//! let err = KaizaError::SessionNotInitialized;
//! assert_eq!(err.code(), ErrorCode::SessionNotInitialized);
//! let envelope = err.into_envelope();
//! assert_eq!(envelope.error_code.as_str(), "SESSION_NOT_INITIALIZED");
//! ```

mod code;
mod envelope;
mod error;

pub use code::ErrorCode;
pub use envelope::ErrorEnvelope;
pub use error::KaizaError;
