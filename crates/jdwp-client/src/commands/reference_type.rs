//! Commands in the `ReferenceType` command set (command set 2).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::commands::{FieldInfo, MethodInfo};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

command! {
    command_set: 2;
    command: 1;
    /// Returns the JNI signature of a reference type.
    #[derive(Debug, Clone)]
    pub struct Signature {
        pub ref_type: ReferenceTypeId,
    } -> {
        pub signature: String,
    }
}

command! {
    command_set: 2;
    command: 4;
    /// Returns information for each field in a reference type, in the order declared in the
    /// class file. Inherited fields are not included.
    #[derive(Debug, Clone)]
    pub struct Fields {
        pub ref_type: ReferenceTypeId,
    } -> {
        pub declared: Vec<FieldInfo>,
    }
}

command! {
    command_set: 2;
    command: 5;
    /// Returns information for each method in a reference type, in the order declared in the
    /// class file. Inherited methods are not included.
    #[derive(Debug, Clone)]
    pub struct Methods {
        pub ref_type: ReferenceTypeId,
    } -> {
        pub declared: Vec<MethodInfo>,
    }
}

command! {
    command_set: 2;
    command: 9;
    /// Returns the class object corresponding to this reference type.
    #[derive(Debug, Clone)]
    pub struct GetClassObject {
        pub ref_type: ReferenceTypeId,
    } -> {
        pub class_object: ClassObjectId,
    }
}
