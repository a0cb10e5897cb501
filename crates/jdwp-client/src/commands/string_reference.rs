//! Commands in the `StringReference` command set (command set 10).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

command! {
    command_set: 10;
    command: 1;
    /// Returns the characters contained in a given string object.
    #[derive(Debug, Clone)]
    pub struct StringValue {
        pub string_id: StringId,
    } -> {
        pub value: String,
    }
}
