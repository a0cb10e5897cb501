//! # `jdwp-session`
//!
//! The debug-session facade over [jdwp-client](jdwp_client): attach/detach lifecycle, a
//! breakpoint registry, thread bookkeeping, and the higher-level operations (`exec`,
//! `loadLibrary`, local-variable inspection) built on method invocation.

mod error;
mod session;

pub use error::SessionError;
pub use session::{Breakpoint, LocalVariable, ObjectSummary, Session, SessionConfig};

pub use jdwp_client;
pub use jdwp_types;
