//! Commands in the `VirtualMachine` command set (command set 1).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

command! {
    command_set: 1;
    command: 1;
    /// Returns the JDWP version implemented by the target VM, along with a free-form description
    /// of the VM itself.
    #[derive(Debug, Clone)]
    pub struct Version -> {
        pub description: String,
        pub jdwp_major: Int,
        pub jdwp_minor: Int,
        pub vm_version: String,
        pub vm_name: String,
    }
}

command! {
    command_set: 1;
    command: 2;
    /// Returns reference types for all classes currently loaded by the target VM whose JNI
    /// signature matches the one given.
    #[derive(Debug, Clone)]
    pub struct ClassesBySignature {
        pub signature: String,
    } -> {
        pub classes: Vec<ClassReference>,
    }
}

/// A `{refTypeTag, typeID, status}` tuple, as returned by `VirtualMachine.ClassesBySignature`.
#[derive(Debug, Clone)]
pub struct ClassReference {
    pub type_tag: TypeTag,
    pub type_id: ReferenceTypeId,
    pub status: ClassStatus,
}

impl JdwpDecodable for ClassReference {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        Ok(Self {
            type_tag: decoder.get::<Byte>().and_then(|b| Ok(b.try_into()?))?,
            type_id: decoder.get()?,
            status: decoder.get()?,
        })
    }
}

command! {
    command_set: 1;
    command: 3;
    /// Returns reference types for all classes currently loaded by the target VM.
    #[derive(Debug, Clone)]
    pub struct AllClasses -> {
        pub classes: Vec<ClassReferenceWithSignature>,
    }
}

/// A `{refTypeTag, typeID, signature, status}` tuple, as returned by `VirtualMachine.AllClasses`.
#[derive(Debug, Clone)]
pub struct ClassReferenceWithSignature {
    pub type_tag: TypeTag,
    pub type_id: ReferenceTypeId,
    pub signature: String,
    pub status: ClassStatus,
}

impl JdwpDecodable for ClassReferenceWithSignature {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        Ok(Self {
            type_tag: decoder.get::<Byte>().and_then(|b| Ok(b.try_into()?))?,
            type_id: decoder.get()?,
            signature: decoder.get()?,
            status: decoder.get()?,
        })
    }
}

command! {
    command_set: 1;
    command: 4;
    /// Returns all threads currently running in the target VM, excluding any debugger-internal
    /// agent threads.
    #[derive(Debug, Clone)]
    pub struct AllThreads -> {
        pub threads: Vec<ThreadId>,
    }
}

command! {
    command_set: 1;
    command: 5;
    /// Returns all thread groups that do not have a parent.
    #[derive(Debug, Clone)]
    pub struct TopLevelThreadGroups -> {
        pub groups: Vec<ThreadGroupId>,
    }
}

command! {
    command_set: 1;
    command: 6;
    /// Invalidates this virtual machine mirror and detaches it from the target VM, resuming all
    /// threads the debugger suspended and restoring any modified state.
    #[derive(Debug, Clone)]
    pub struct Dispose;
}

command! {
    command_set: 1;
    command: 7;
    /// Negotiates the size, in bytes, of the various id kinds the target VM uses on the wire.
    #[derive(Debug, Clone)]
    pub struct IdSizesCommand -> {
        pub field_id_size: Int,
        pub method_id_size: Int,
        pub object_id_size: Int,
        pub reference_type_id_size: Int,
        pub frame_id_size: Int,
    }
}

command! {
    command_set: 1;
    command: 9;
    /// Resumes execution of the application after the suspend command or an event has stopped it.
    /// Suspensions of the target VM are not nested; this command resumes the VM unconditionally,
    /// regardless of how many suspends have previously been issued.
    #[derive(Debug, Clone)]
    pub struct VmResume;
}

command! {
    command_set: 1;
    command: 11;
    /// Creates a new string object in the target VM and returns its id.
    #[derive(Debug, Clone)]
    pub struct CreateString {
        pub utf: String,
    } -> {
        pub string_id: StringId,
    }
}
