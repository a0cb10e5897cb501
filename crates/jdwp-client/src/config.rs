//! Plain-struct configuration for the dispatcher, following the Android default ID profile.

use crate::id_sizes::IdSizes;
use std::time::Duration;

/// Configuration governing how a [`crate::JdwpClient`] talks to the target VM.
///
/// Every field has a sensible default; construct with [`ClientConfig::default`] and override only
/// what you need.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// How long to wait for a reply to any single command before failing with
    /// [`crate::error::JdwpError::Timeout`].
    pub command_timeout: Duration,
    /// How long to wait for the initial `JDWP-Handshake` exchange.
    pub handshake_timeout: Duration,
    /// The id sizes assumed before `VirtualMachine.IDSizes` completes. Overwritten as soon as the
    /// target VM replies; the default matches the 8-byte profile every Android ART build uses.
    pub id_sizes: IdSizes,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(5),
            handshake_timeout: Duration::from_secs(5),
            id_sizes: IdSizes::default(),
        }
    }
}
