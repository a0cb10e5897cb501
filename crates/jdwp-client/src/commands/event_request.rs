//! Commands in the `EventRequest` command set (command set 15).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use bytes::BufMut;
use jdwp_types::*;

/// A single constraint narrowing which occurrences of an event kind are reported, as attached to
/// an `EventRequest.Set` command.
#[derive(Debug, Clone)]
pub enum Modifier {
    /// Report the event only after it has occurred the given number of times.
    Count(Int),
    /// Report the event only if the given expression evaluates to true. Not implemented by most
    /// VMs.
    Conditional(Int),
    /// Restrict reported events to the given thread.
    ThreadOnly(ThreadId),
    /// Restrict reported events to a given class (and its subtypes).
    ClassOnly(ReferenceTypeId),
    /// Restrict reported events to classes whose name matches a restricted regular expression
    /// (only `*` and leading/trailing wildcards are supported by the protocol, not general regex).
    ClassMatch(String),
    /// Restrict reported events to classes whose name does *not* match the pattern.
    ClassExclude(String),
    /// Restrict reported events to those that occur at the given location.
    LocationOnly(Location),
    /// Restrict reported exceptions by their type and whether they are caught.
    ExceptionOnly {
        exception_or_null: ReferenceTypeId,
        caught: bool,
        uncaught: bool,
    },
    /// Restrict reported events to those for a given field.
    FieldOnly {
        declaring: ReferenceTypeId,
        field_id: FieldId,
    },
    /// Restrict reported step events to the given thread, size and depth.
    Step {
        thread_id: ThreadId,
        size: StepSize,
        depth: StepDepth,
    },
    /// Restrict reported events to those whose active `this` is the given object.
    InstanceOnly(ObjectId),
    /// Restrict reported class prepare events to those whose source file name matches the given
    /// pattern.
    SourceNameMatch(String),
}

impl Modifier {
    fn kind(&self) -> ModifierKind {
        match self {
            Modifier::Count(_) => ModifierKind::Count,
            Modifier::Conditional(_) => ModifierKind::Conditional,
            Modifier::ThreadOnly(_) => ModifierKind::ThreadOnly,
            Modifier::ClassOnly(_) => ModifierKind::ClassOnly,
            Modifier::ClassMatch(_) => ModifierKind::ClassMatch,
            Modifier::ClassExclude(_) => ModifierKind::ClassExclude,
            Modifier::LocationOnly(_) => ModifierKind::LocationOnly,
            Modifier::ExceptionOnly { .. } => ModifierKind::ExceptionOnly,
            Modifier::FieldOnly { .. } => ModifierKind::FieldOnly,
            Modifier::Step { .. } => ModifierKind::Step,
            Modifier::InstanceOnly(_) => ModifierKind::InstanceOnly,
            Modifier::SourceNameMatch(_) => ModifierKind::SourceNameMatch,
        }
    }
}

impl JdwpEncodable for Modifier {
    fn encode(&self, encoder: &mut JdwpEncoder) {
        encoder.put(&self.kind());
        match self {
            Modifier::Count(count) => encoder.put(count),
            Modifier::Conditional(expr_id) => encoder.put(expr_id),
            Modifier::ThreadOnly(thread) => encoder.put(thread),
            Modifier::ClassOnly(class) => encoder.put(class),
            Modifier::ClassMatch(pattern) => encoder.put(pattern),
            Modifier::ClassExclude(pattern) => encoder.put(pattern),
            Modifier::LocationOnly(location) => encoder.put(location),
            Modifier::ExceptionOnly {
                exception_or_null,
                caught,
                uncaught,
            } => {
                encoder.put(exception_or_null);
                encoder.data.put_u8(if *caught { 1 } else { 0 });
                encoder.data.put_u8(if *uncaught { 1 } else { 0 });
            }
            Modifier::FieldOnly {
                declaring,
                field_id,
            } => {
                encoder.put(declaring);
                encoder.put(field_id);
            }
            Modifier::Step {
                thread_id,
                size,
                depth,
            } => {
                encoder.put(thread_id);
                encoder.put(&Int::from(u8::from(*size)));
                encoder.put(&Int::from(u8::from(*depth)));
            }
            Modifier::InstanceOnly(object) => encoder.put(object),
            Modifier::SourceNameMatch(pattern) => encoder.put(pattern),
        }
    }
}

command! {
    command_set: 15;
    command: 1;
    /// Sets an event request, asking the target VM to notify the debugger when the given kind of
    /// event occurs, subject to the given modifiers. All modifiers must be satisfied for an event
    /// to be reported; an empty modifier list reports the event unconditionally.
    #[derive(Debug, Clone)]
    pub struct SetEventRequest {
        pub event_kind: EventKind,
        pub suspend_policy: SuspendPolicy,
        pub modifiers: Vec<Modifier>,
    } -> {
        pub request_id: RequestId,
    }
}

command! {
    command_set: 15;
    command: 2;
    /// Clears a previously set event request.
    #[derive(Debug, Clone)]
    pub struct ClearEventRequest {
        pub event_kind: EventKind,
        pub request_id: RequestId,
    }
}

command! {
    command_set: 15;
    command: 3;
    /// Removes all breakpoints currently set in the target VM.
    #[derive(Debug, Clone)]
    pub struct ClearAllBreakpoints;
}
