//! Commands in the `ThreadReference` command set (command set 11).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

command! {
    command_set: 11;
    command: 1;
    /// Returns the thread's name.
    #[derive(Debug, Clone)]
    pub struct ThreadName {
        pub thread_id: ThreadId,
    } -> {
        pub thread_name: String,
    }
}

command! {
    command_set: 11;
    command: 2;
    /// Suspends the thread. Thread suspensions are counted; a thread suspended `n` times must be
    /// resumed `n` times before it executes again.
    #[derive(Debug, Clone)]
    pub struct ThreadSuspend {
        pub thread_id: ThreadId,
    }
}

command! {
    command_set: 11;
    command: 3;
    /// Resumes a thread suspended by [ThreadReference.Suspend] or by an event that suspended it.
    ///
    /// [ThreadReference.Suspend]: crate
    #[derive(Debug, Clone)]
    pub struct ThreadResume {
        pub thread_id: ThreadId,
    }
}

command! {
    command_set: 11;
    command: 4;
    /// Returns the current status of the given thread and whether it is currently suspended.
    #[derive(Debug, Clone)]
    pub struct ThreadStatus {
        pub thread_id: ThreadId,
    } -> {
        pub thread_status: Int,
        pub suspend_status: Int,
    }
}

command! {
    command_set: 11;
    command: 6;
    /// Returns the current call stack of a suspended thread, most-recent frame first.
    #[derive(Debug, Clone)]
    pub struct ThreadFrames {
        pub thread_id: ThreadId,
        pub start_frame: Int,
        pub length: Int,
    } -> {
        pub frames: Vec<FrameInfo>,
    }
}

/// A `{frameID, location}` pair, as returned by `ThreadReference.Frames`.
#[derive(Debug, Clone)]
pub struct FrameInfo {
    pub frame_id: FrameId,
    pub location: Location,
}

impl JdwpDecodable for FrameInfo {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        Ok(Self {
            frame_id: decoder.get()?,
            location: decoder.get()?,
        })
    }
}

command! {
    command_set: 11;
    command: 7;
    /// Returns the number of stack frames the given thread currently has.
    #[derive(Debug, Clone)]
    pub struct FrameCount {
        pub thread_id: ThreadId,
    } -> {
        pub frame_count: Int,
    }
}

command! {
    command_set: 11;
    command: 12;
    /// Returns the number of times this thread has been suspended by [ThreadReference.Suspend]
    /// and has not yet been resumed.
    ///
    /// [ThreadReference.Suspend]: crate
    #[derive(Debug, Clone)]
    pub struct SuspendCount {
        pub thread_id: ThreadId,
    } -> {
        pub suspend_count: Int,
    }
}
