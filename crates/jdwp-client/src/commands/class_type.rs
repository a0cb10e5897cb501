//! Commands in the `ClassType` command set (command set 3).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

command! {
    command_set: 3;
    command: 3;
    /// Invokes a static method. The method must be a member of the class type or one of its
    /// superclasses, superinterfaces, or implemented interfaces.
    ///
    /// The argument order resolved for this client is: `class_id`, `thread_id`, `method_id`,
    /// `arguments`, `options` - in that exact order, matching the wire layout.
    #[derive(Debug, Clone)]
    pub struct InvokeStaticMethod {
        pub class_id: ClassId,
        pub thread_id: ThreadId,
        pub method_id: MethodId,
        pub arguments: Vec<Value>,
        pub options: InvokeOptions,
    } -> {
        pub return_value: Value,
        pub exception: TaggedObjectId,
    }
}

impl JdwpEncodable for InvokeOptions {
    fn encode(&self, encoder: &mut JdwpEncoder) {
        encoder.put(&(self.0 as Int));
    }
}

impl JdwpDecodable for InvokeOptions {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        Ok(InvokeOptions(decoder.get::<Int>()? as u32))
    }
}

command! {
    command_set: 3;
    command: 4;
    /// Creates a new object of this type, invoking the specified constructor.
    #[derive(Debug, Clone)]
    pub struct NewInstance {
        pub class_id: ClassId,
        pub thread_id: ThreadId,
        pub method_id: MethodId,
        pub arguments: Vec<Value>,
        pub options: InvokeOptions,
    } -> {
        pub new_object: TaggedObjectId,
        pub exception: TaggedObjectId,
    }
}
