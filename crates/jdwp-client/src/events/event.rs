use crate::codec::{DecodeJdwpDataError, JdwpCodec, JdwpDecodable, JdwpDecoder};
use crate::raw::packet::RawCommandPacket;
use jdwp_types::{
    Boolean, Byte, ClassStatus, EventKind, FieldId, Location, Long, MethodId, RequestId,
    ReferenceTypeId, SuspendPolicy, TaggedObjectId, ThreadId, TypeTag, Value,
};
use std::io;
use std::io::ErrorKind;
use thiserror::Error;
use tracing::trace;

#[derive(Debug, Clone)]
pub struct Events {
    pub policy: SuspendPolicy,
    pub events: Vec<Event>,
}

/// Events, as received by the JVM
#[derive(Debug, Clone)]
pub enum Event {
    SingleStep {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
    },
    Breakpoint {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
    },
    FramePop {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
    },
    Exception {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
        exception: TaggedObjectId,
        catch_location: Location,
    },
    /// Carries no thread - it is reported outside the context of any single thread.
    UserDefined {
        request_id: RequestId,
    },
    ThreadStart {
        request_id: RequestId,
        thread: ThreadId,
    },
    ThreadDeath {
        request_id: RequestId,
        thread: ThreadId,
    },
    ClassPrepare {
        request_id: RequestId,
        thread: ThreadId,
        ref_type_tag: TypeTag,
        type_id: ReferenceTypeId,
        signature: String,
        status: ClassStatus,
    },
    ClassUnload {
        request_id: RequestId,
        signature: String,
    },
    ClassLoad {
        request_id: RequestId,
        thread: ThreadId,
        ref_type_tag: TypeTag,
        type_id: ReferenceTypeId,
        signature: String,
        status: ClassStatus,
    },
    FieldAccess {
        request_id: RequestId,
        thread: ThreadId,
        ref_type_tag: TypeTag,
        type_id: ReferenceTypeId,
        field_id: FieldId,
        object: TaggedObjectId,
        location: Location,
    },
    FieldModification {
        request_id: RequestId,
        thread: ThreadId,
        ref_type_tag: TypeTag,
        type_id: ReferenceTypeId,
        field_id: FieldId,
        object: TaggedObjectId,
        location: Location,
        value_to_be: Value,
    },
    ExceptionCatch {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
        ref_type_tag: TypeTag,
        type_id: ReferenceTypeId,
        method_id: MethodId,
        index: u64,
    },
    MethodEntry {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
    },
    MethodExit {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
    },
    MethodExitWithReturnValue {
        request_id: RequestId,
        thread: ThreadId,
        location: Location,
        value: Value,
    },
    MonitorContendedEnter {
        request_id: RequestId,
        thread: ThreadId,
        object: TaggedObjectId,
        location: Location,
    },
    MonitorContendedEntered {
        request_id: RequestId,
        thread: ThreadId,
        object: TaggedObjectId,
        location: Location,
    },
    MonitorWait {
        request_id: RequestId,
        thread: ThreadId,
        object: TaggedObjectId,
        location: Location,
        timeout: Long,
    },
    MonitorWaited {
        request_id: RequestId,
        thread: ThreadId,
        object: TaggedObjectId,
        location: Location,
        timed_out: Boolean,
    },
    VmStart {
        request_id: RequestId,
        thread: ThreadId,
    },
    VmDeath {
        request_id: RequestId,
    },
    /// Never sent across JDWP; synthesized locally when the transport closes.
    VmDisconnected,
}

impl Event {
    /// The request id this event was generated for, used to route it to the right subscriber.
    ///
    /// `VmDisconnected` is synthesized locally and carries no request id - callers should treat it
    /// as addressed to [`RequestId::WILDCARD`].
    pub fn request_id(&self) -> RequestId {
        match self {
            Event::SingleStep { request_id, .. }
            | Event::Breakpoint { request_id, .. }
            | Event::FramePop { request_id, .. }
            | Event::Exception { request_id, .. }
            | Event::UserDefined { request_id }
            | Event::ThreadStart { request_id, .. }
            | Event::ThreadDeath { request_id, .. }
            | Event::ClassPrepare { request_id, .. }
            | Event::ClassUnload { request_id, .. }
            | Event::ClassLoad { request_id, .. }
            | Event::FieldAccess { request_id, .. }
            | Event::FieldModification { request_id, .. }
            | Event::ExceptionCatch { request_id, .. }
            | Event::MethodEntry { request_id, .. }
            | Event::MethodExit { request_id, .. }
            | Event::MethodExitWithReturnValue { request_id, .. }
            | Event::MonitorContendedEnter { request_id, .. }
            | Event::MonitorContendedEntered { request_id, .. }
            | Event::MonitorWait { request_id, .. }
            | Event::MonitorWaited { request_id, .. }
            | Event::VmStart { request_id, .. }
            | Event::VmDeath { request_id } => *request_id,
            Event::VmDisconnected => RequestId::WILDCARD,
        }
    }
}

pub(crate) fn to_events(
    command: RawCommandPacket,
    events_codec: &JdwpCodec,
) -> Result<Events, io::Error> {
    if !(command.header().command().command_set() == 64
        && command.header().command().command() == 100)
    {
        return Err(io::Error::new(ErrorKind::InvalidData, NotAnEventError));
    }
    let mut decoder = JdwpDecoder::new(events_codec, command.data().clone());
    let policy_raw = decoder
        .get::<Byte>()
        .map_err(|_| io::Error::new(ErrorKind::InvalidData, NotAnEventError))?;
    let policy = SuspendPolicy::try_from(policy_raw)
        .map_err(|_| io::Error::new(ErrorKind::InvalidData, NotAnEventError))?;

    trace!("got events with policy: {policy:?}");

    let events = decoder
        .get::<Vec<Event>>()
        .map_err(|_| io::Error::new(ErrorKind::InvalidData, NotAnEventError))?;

    Ok(Events { policy, events })
}

impl JdwpDecodable for Event {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        let event_kind = decoder
            .get::<Byte>()
            .and_then(|i| EventKind::try_from(i).map_err(|e| e.into()))?;
        trace!("got event kind: {event_kind:?}");
        let event: Event = match event_kind {
            EventKind::SingleStep => Event::SingleStep {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::Breakpoint => Event::Breakpoint {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::FramePop => Event::FramePop {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::Exception => Event::Exception {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
                exception: decoder.get()?,
                catch_location: decoder.get()?,
            },
            EventKind::UserDefined => Event::UserDefined {
                request_id: decoder.get()?,
            },
            EventKind::ThreadStart => Event::ThreadStart {
                request_id: decoder.get()?,
                thread: decoder.get()?,
            },
            EventKind::ThreadDeath => Event::ThreadDeath {
                request_id: decoder.get()?,
                thread: decoder.get()?,
            },
            EventKind::ClassPrepare => Event::ClassPrepare {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                ref_type_tag: decoder.get()?,
                type_id: decoder.get()?,
                signature: decoder.get()?,
                status: decoder.get()?,
            },
            EventKind::ClassUnload => Event::ClassUnload {
                request_id: decoder.get()?,
                signature: decoder.get()?,
            },
            EventKind::ClassLoad => Event::ClassLoad {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                ref_type_tag: decoder.get()?,
                type_id: decoder.get()?,
                signature: decoder.get()?,
                status: decoder.get()?,
            },
            EventKind::FieldAccess => Event::FieldAccess {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                ref_type_tag: decoder.get()?,
                type_id: decoder.get()?,
                field_id: decoder.get()?,
                object: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::FieldModification => Event::FieldModification {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                ref_type_tag: decoder.get()?,
                type_id: decoder.get()?,
                field_id: decoder.get()?,
                object: decoder.get()?,
                location: decoder.get()?,
                value_to_be: decoder.get()?,
            },
            EventKind::ExceptionCatch => Event::ExceptionCatch {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
                ref_type_tag: decoder.get()?,
                type_id: decoder.get()?,
                method_id: decoder.get()?,
                index: decoder.get::<Long>().map(|i| i as u64)?,
            },
            EventKind::MethodEntry => Event::MethodEntry {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::MethodExit => Event::MethodExit {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::MethodExitWithReturnValue => Event::MethodExitWithReturnValue {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                location: decoder.get()?,
                value: decoder.get()?,
            },
            EventKind::MonitorContendedEnter => Event::MonitorContendedEnter {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                object: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::MonitorContendedEntered => Event::MonitorContendedEntered {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                object: decoder.get()?,
                location: decoder.get()?,
            },
            EventKind::MonitorWait => Event::MonitorWait {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                object: decoder.get()?,
                location: decoder.get()?,
                timeout: decoder.get()?,
            },
            EventKind::MonitorWaited => Event::MonitorWaited {
                request_id: decoder.get()?,
                thread: decoder.get()?,
                object: decoder.get()?,
                location: decoder.get()?,
                timed_out: decoder.get()?,
            },
            EventKind::VmStart => Event::VmStart {
                request_id: decoder.get()?,
                thread: decoder.get()?,
            },
            EventKind::VmDeath => Event::VmDeath {
                request_id: decoder.get()?,
            },
            EventKind::VmDisconnected => {
                unreachable!("the VM never sends VM_DISCONNECTED over the wire")
            }
        };
        Ok(event)
    }
}

#[derive(Debug, Error)]
#[error("The given raw command packet is not an event")]
pub struct NotAnEventError;
