//! Secure session tokens.
//!
//! The codec turns a user identifier into an opaque, tamper-evident cookie
//! value and back. Nothing outside this module knows the byte layout.

pub mod codec;

pub use codec::{CodecError, SessionCodec};
