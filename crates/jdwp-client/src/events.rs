//! Events received from the JVM

pub use event::*;
pub use event_handler::*;
use std::future::Future;

mod event;
mod event_handler;
