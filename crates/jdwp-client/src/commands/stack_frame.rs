//! Commands in the `StackFrame` command set (command set 16).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

/// A `{slot, sigbyte}` request for a single local variable, as sent to `StackFrame.GetValues`.
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest {
    pub slot: Int,
    pub sig_byte: Byte,
}

impl JdwpEncodable for SlotRequest {
    fn encode(&self, encoder: &mut JdwpEncoder) {
        encoder.put(&self.slot);
        encoder.put(&self.sig_byte);
    }
}

command! {
    command_set: 16;
    command: 1;
    /// Returns the value of one or more local variables in a given frame. The frame must be
    /// currently suspended and the slots must be valid for that frame's method.
    #[derive(Debug, Clone)]
    pub struct StackFrameGetValues {
        pub thread_id: ThreadId,
        pub frame_id: FrameId,
        pub slots: Vec<SlotRequest>,
    } -> {
        pub values: Vec<Value>,
    }
}

command! {
    command_set: 16;
    command: 2;
    /// Sets the value of one or more local variables in a given frame.
    #[derive(Debug, Clone)]
    pub struct StackFrameSetValues {
        pub thread_id: ThreadId,
        pub frame_id: FrameId,
        pub slot_values: Vec<SlotValue>,
    }
}

/// A `{slot, value}` pair, as sent to `StackFrame.SetValues`.
#[derive(Debug, Clone)]
pub struct SlotValue {
    pub slot: Int,
    pub value: Value,
}

impl JdwpEncodable for SlotValue {
    fn encode(&self, encoder: &mut JdwpEncoder) {
        encoder.put(&self.slot);
        encoder.put(&self.value);
    }
}

command! {
    command_set: 16;
    command: 3;
    /// Returns the value of the `this` reference for the given frame, or a null object id if the
    /// frame's method is static.
    #[derive(Debug, Clone)]
    pub struct ThisObject {
        pub thread_id: ThreadId,
        pub frame_id: FrameId,
    } -> {
        pub object_this: TaggedObjectId,
    }
}
