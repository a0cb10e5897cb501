//! Commands in the `Method` command set (command set 6).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

command! {
    command_set: 6;
    command: 2;
    /// Returns line number information for the method, if present. The line table maps source
    /// line numbers to the initial code index of the line.
    #[derive(Debug, Clone)]
    pub struct VariableTable {
        pub ref_type: ReferenceTypeId,
        pub method_id: MethodId,
    } -> {
        pub arg_count: Int,
        pub slots: Vec<VariableSlot>,
    }
}

/// A single entry of a method's local variable table.
#[derive(Debug, Clone)]
pub struct VariableSlot {
    pub code_index: Long,
    pub name: String,
    pub signature: String,
    pub length: Int,
    pub slot: Int,
}

impl JdwpDecodable for VariableSlot {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        Ok(Self {
            code_index: decoder.get()?,
            name: decoder.get()?,
            signature: decoder.get()?,
            length: decoder.get()?,
            slot: decoder.get()?,
        })
    }
}
