//! The crate-wide error type, covering every failure mode a dispatcher or command call can
//! surface.

use crate::codec::DecodeJdwpDataError;
use crate::id_sizes::IdSizes;
use jdwp_types::ErrorConstant;
use std::io;
use thiserror::Error;

/// Every way a JDWP operation can fail.
#[derive(Debug, Error)]
pub enum JdwpError {
    /// The transport is not open, a write failed, or the connection closed unexpectedly.
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    /// The opening handshake was a short read or the bytes did not match `JDWP-Handshake`.
    #[error("handshake failed: {0}")]
    Handshake(String),

    /// A packet failed to parse: header length < 11, a declared length that outran the
    /// payload, an unknown tag, or a truncated string.
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] DecodeJdwpDataError),

    /// No reply arrived within the per-command deadline.
    #[error("command timed out waiting for a reply")]
    Timeout,

    /// The VM replied with a non-zero error code.
    #[error("protocol error {code:?} (0x{raw:04x}) replying to packet {packet_id}")]
    ProtocolError {
        /// The typed error constant, when the raw code is a known one.
        code: Option<ErrorConstant>,
        /// The raw wire error code.
        raw: u16,
        /// The id of the command packet this reply answers.
        packet_id: u32,
    },

    /// `ClassesBySignature` returned no classes for the requested signature.
    #[error("no loaded class matches signature {0:?}")]
    ClassNotFound(String),

    /// No method on the given class matched the requested name (and signature, if given).
    #[error("no method named {name:?} (signature {signature:?}) on {class_signature:?}")]
    MethodNotFound {
        /// The owning class's JNI signature.
        class_signature: String,
        /// The method name searched for.
        name: String,
        /// The method signature searched for, if one was given.
        signature: Option<String>,
    },

    /// No field on the given class matched the requested name.
    #[error("no field named {name:?} on {class_signature:?}")]
    FieldNotFound {
        /// The owning class's JNI signature.
        class_signature: String,
        /// The field name searched for.
        name: String,
    },

    /// A tagged value carried a different tag than the caller expected.
    #[error("expected a value tagged {expected:?} but got {actual:?}")]
    InvalidTag {
        /// The tag the caller required.
        expected: &'static str,
        /// The tag actually present on the wire.
        actual: &'static str,
    },

    /// An operation that requires a suspended thread found none available.
    #[error("no suspended thread is available")]
    NoThreadAvailable,

    /// `attach` was called for a PID that already has an open session.
    #[error("a session is already attached to pid {0}")]
    DuplicateSession(u32),

    /// The transport died (EOF, VM_DEATH, or an explicit stop); the session is no longer usable.
    #[error("disconnected from the target VM")]
    Disconnected,

    /// `VirtualMachine.IDSizes` reported a profile other than the one the caller configured.
    #[error("target VM uses a different id-size profile than configured: {actual:?} (configured {configured:?})")]
    IdSizeMismatch {
        /// The id sizes the caller configured (the Android default, unless overridden).
        configured: IdSizes,
        /// The id sizes the target VM actually reported.
        actual: IdSizes,
    },
}

impl JdwpError {
    /// Builds a [`JdwpError::ProtocolError`] from a raw wire error code.
    pub fn from_error_code(raw: u16, packet_id: u32) -> Self {
        JdwpError::ProtocolError {
            code: ErrorConstant::try_from(raw).ok(),
            raw,
            packet_id,
        }
    }

    /// Whether this error, by JDWP semantics, implies the session itself is now dead.
    pub fn is_fatal(&self) -> bool {
        match self {
            JdwpError::Transport(_) | JdwpError::Handshake(_) | JdwpError::MalformedPacket(_) | JdwpError::Disconnected => true,
            JdwpError::ProtocolError { code: Some(ErrorConstant::VmDead), .. } => true,
            _ => false,
        }
    }
}

impl From<io::Error> for JdwpError {
    fn from(value: io::Error) -> Self {
        JdwpError::Transport(value)
    }
}
