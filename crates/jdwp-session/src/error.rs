//! Errors surfaced by the session facade: every protocol-level failure from [`jdwp_client`] plus
//! the handful of session-level conditions that have no wire-level counterpart.

use jdwp_client::JdwpError;
use jdwp_types::{FrameId, ThreadId};
use thiserror::Error;

/// Every way a session-level operation can fail.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A dispatcher or command-layer failure; see [`JdwpError`] for the full taxonomy.
    #[error(transparent)]
    Jdwp(#[from] JdwpError),

    /// `getLocalVariables`/a stack-frame lookup named a frame id that isn't on the thread's
    /// current call stack (it may have already returned).
    #[error("frame {frame:?} is not on thread {thread:?}'s current call stack")]
    FrameNotFound {
        /// The thread searched.
        thread: ThreadId,
        /// The frame id that wasn't found.
        frame: FrameId,
    },
}

impl SessionError {
    /// Whether this error implies the session itself is now dead.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SessionError::Jdwp(e) if e.is_fatal())
    }
}
