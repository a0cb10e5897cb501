//! Typed encoders/decoders for every JDWP command set this client speaks.

use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use jdwp_types::*;

pub mod array_reference;
pub mod class_type;
pub mod event_request;
pub mod method;
pub mod object_reference;
pub mod reference_type;
pub mod stack_frame;
pub mod string_reference;
pub mod thread_reference;
pub mod virtual_machine;

pub use array_reference::*;
pub use class_type::*;
pub use event_request::*;
pub use method::*;
pub use object_reference::*;
pub use reference_type::*;
pub use stack_frame::*;
pub use string_reference::*;
pub use thread_reference::*;
pub use virtual_machine::*;

/// Declares a paired command/reply struct: the command struct implements [`JdwpEncodable`] and
/// [`JdwpCommand`]; the generated `<Name>Reply` struct implements [`JdwpDecodable`].
///
/// Three shapes are supported: a command with fields and a reply with fields, a unit command
/// (no fields) with a reply with fields, and a fully unit command/reply pair.
macro_rules! command {
    (
        command_set: $command_set:expr;
        command: $command:expr;
        $(#[$meta:meta])*
        $vis:vis struct $command_id:ident {
            $($field_vis:vis $field:ident: $field_ty:ty),*
            $(,)?
        } -> {
            $(
                $reply_field_vis:vis $reply_field:ident: $reply_field_ty:ty
            ),*
            $(,)?
        }
    ) => {
        paste::paste! {
            $(#[$meta])*
            $vis struct $command_id
                {
                    $(
                        $field_vis $field: $field_ty
                    ),*
                }


            impl JdwpEncodable for $command_id {
                fn encode(&self, encoder: &mut JdwpEncoder) {
                    $(
                        encoder.put(&self.$field);
                    )*
                }
            }

            impl JdwpCommand for $command_id {
                type Reply = [<$command_id Reply>];

                fn command_data() -> CommandData {
                    CommandData::new($command_set, $command)
                }
            }

            $(#[$meta])*
            $vis struct [<$command_id Reply>] {
            $(
                $reply_field_vis $reply_field: $reply_field_ty,
            )*
            }

            impl JdwpDecodable for [<$command_id Reply>] {
                type Err = DecodeJdwpDataError;

                fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
                    Ok(Self {
                        $(
                            $reply_field: decoder.get()?
                        ),*

                    })
                }
            }
        }
    };
    (
        command_set: $command_set:expr;
        command: $command:expr;
        $(#[$meta:meta])*
        $vis:vis struct $command_id:ident {
            $($field_vis:vis $field:ident: $field_ty:ty),*
            $(,)?
        }
    ) => {
        paste::paste! {
            $(#[$meta])*
            $vis struct $command_id
                {
                    $(
                        $field_vis $field: $field_ty
                    ),*
                }

            impl JdwpEncodable for $command_id {
                fn encode(&self, encoder: &mut JdwpEncoder) {
                    $(
                        encoder.put(&self.$field);
                    )*
                }
            }

            impl JdwpCommand for $command_id {
                type Reply = [<$command_id Reply>];

                fn command_data() -> CommandData {
                    CommandData::new($command_set, $command)
                }
            }

            $(#[$meta])*
            $vis struct [<$command_id Reply>];

            impl JdwpDecodable for [<$command_id Reply>] {
                type Err = DecodeJdwpDataError;

                fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
                    Ok(Self)
                }
            }
        }
    };
    (
        command_set: $command_set:expr;
        command: $command:expr;
        $(#[$meta:meta])*
        $vis:vis struct $command_id:ident -> {
            $(
                $reply_field_vis:vis $reply_field:ident: $reply_field_ty:ty
            ),*
            $(,)?
        }
    ) => {
        paste::paste! {
            $(#[$meta])*
            $vis struct $command_id;

            impl JdwpEncodable for $command_id {

            }

            impl JdwpCommand for $command_id {
                type Reply = [<$command_id Reply>];

                fn command_data() -> CommandData {
                    CommandData::new($command_set, $command)
                }
            }

            $(#[$meta])*
            $vis struct [<$command_id Reply>] {
            $(
                $reply_field_vis $reply_field: $reply_field_ty,
            )*
            }

            impl JdwpDecodable for [<$command_id Reply>] {
                type Err = DecodeJdwpDataError;

                fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
                    Ok(Self {
                        $(
                            $reply_field: decoder.get()?
                        ),*

                    })
                }
            }
        }
    };
    (
        command_set: $command_set:expr;
        command: $command:expr;
        $(#[$meta:meta])*
        $vis:vis struct $command_id:ident;
    ) => {
        paste::paste! {
            $(#[$meta])*
            $vis struct $command_id;

            impl JdwpEncodable for $command_id {

            }

            impl JdwpCommand for $command_id {
                type Reply = [<$command_id Reply>];

                fn command_data() -> CommandData {
                    CommandData::new($command_set, $command)
                }
            }

            $(#[$meta])*
            $vis struct [<$command_id Reply>];

            impl JdwpDecodable for [<$command_id Reply>] {
                type Err = DecodeJdwpDataError;

                fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
                    Ok(Self)
                }
            }
        }
    };
}

pub(crate) use command;

/// A `{methodId, name, signature, modifiers}` tuple as returned by `ReferenceType.Methods`.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub method_id: MethodId,
    pub name: String,
    pub signature: String,
    pub modifiers: Int,
}

impl JdwpDecodable for MethodInfo {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        Ok(Self {
            method_id: decoder.get()?,
            name: decoder.get()?,
            signature: decoder.get()?,
            modifiers: decoder.get()?,
        })
    }
}

/// A `{fieldId, name, signature, modifiers}` tuple as returned by `ReferenceType.Fields`.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub field_id: FieldId,
    pub name: String,
    pub signature: String,
    pub modifiers: Int,
}

impl JdwpDecodable for FieldInfo {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        Ok(Self {
            field_id: decoder.get()?,
            name: decoder.get()?,
            signature: decoder.get()?,
            modifiers: decoder.get()?,
        })
    }
}
