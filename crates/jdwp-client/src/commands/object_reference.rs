//! Commands in the `ObjectReference` command set (command set 9).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

command! {
    command_set: 9;
    command: 1;
    /// Returns the runtime type of an object.
    #[derive(Debug, Clone)]
    pub struct ObjectReferenceType {
        pub object_id: ObjectId,
    } -> {
        pub ref_type_tag: TypeTag,
        pub type_id: ReferenceTypeId,
    }
}

command! {
    command_set: 9;
    command: 6;
    /// Invokes an instance method. The method must be a member of the object's runtime type, not
    /// its static type, and must not be abstract.
    ///
    /// The argument order resolved for this client is: `object_id`, `thread_id`, `class_id`,
    /// `method_id`, `arguments`, `options` - in that exact order, matching the wire layout.
    #[derive(Debug, Clone)]
    pub struct ObjectInvokeMethod {
        pub object_id: ObjectId,
        pub thread_id: ThreadId,
        pub class_id: ClassId,
        pub method_id: MethodId,
        pub arguments: Vec<Value>,
        pub options: InvokeOptions,
    } -> {
        pub return_value: Value,
        pub exception: TaggedObjectId,
    }
}

command! {
    command_set: 9;
    command: 9;
    /// Prevents garbage collection of the given object until [ObjectReference.EnableCollection]
    /// is invoked.
    ///
    /// [ObjectReference.EnableCollection]: crate
    #[derive(Debug, Clone)]
    pub struct DisableCollection {
        pub object_id: ObjectId,
    }
}

command! {
    command_set: 9;
    command: 10;
    /// Permits garbage collection of the given object after a prior
    /// [ObjectReference.DisableCollection].
    ///
    /// [ObjectReference.DisableCollection]: crate
    #[derive(Debug, Clone)]
    pub struct EnableCollection {
        pub object_id: ObjectId,
    }
}
