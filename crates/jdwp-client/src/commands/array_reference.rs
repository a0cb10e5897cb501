//! Commands in the `ArrayReference` command set (command set 13).

use super::command;
use crate::codec::{DecodeJdwpDataError, JdwpDecodable, JdwpDecoder, JdwpEncodable, JdwpEncoder};
use crate::packet::JdwpCommand;
use crate::raw::packet::CommandData;
use bytes::Buf;
use jdwp_types::*;

command! {
    command_set: 13;
    command: 1;
    /// Returns the number of components in a given array.
    #[derive(Debug, Clone)]
    pub struct ArrayLength {
        pub array_id: ArrayId,
    } -> {
        pub length: Int,
    }
}

command! {
    command_set: 13;
    command: 2;
    /// Returns a range of array components. The specified range must be within the bounds of the
    /// array.
    #[derive(Debug, Clone)]
    pub struct GetValues {
        pub array_id: ArrayId,
        pub first_index: Int,
        pub length: Int,
    } -> {
        pub values: ArrayRegion,
    }
}

/// A homogeneous slice of an array's components, as returned by `ArrayReference.GetValues`.
///
/// Primitive component types are packed on the wire without a per-element tag; object-like
/// component types (object, array, string, thread, thread group, class loader, class object) are
/// each preceded by their own tag, same as a [Value].
#[derive(Debug, Clone)]
pub enum ArrayRegion {
    Byte(Vec<i8>),
    Boolean(Vec<bool>),
    Char(Vec<u16>),
    Short(Vec<i16>),
    Int(Vec<Int>),
    Long(Vec<Long>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Object(Vec<Value>),
}

impl JdwpDecodable for ArrayRegion {
    type Err = DecodeJdwpDataError;

    fn decode(decoder: &mut JdwpDecoder) -> Result<Self, Self::Err> {
        let tag = decoder.get::<Byte>().and_then(|b| Ok(Tag::try_from(b)?))?;
        let len = decoder.get::<Int>()?;
        if len < 0 {
            return Err(DecodeJdwpDataError::UnexpectedNegativeInt(len));
        }
        let len = len as usize;

        Ok(match tag {
            Tag::Byte => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.data.get_i8());
                }
                ArrayRegion::Byte(out)
            }
            Tag::Boolean => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.data.get_u8() != 0);
                }
                ArrayRegion::Boolean(out)
            }
            Tag::Char => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.data.get_u16());
                }
                ArrayRegion::Char(out)
            }
            Tag::Short => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.data.get_i16());
                }
                ArrayRegion::Short(out)
            }
            Tag::Int => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.get::<Int>()?);
                }
                ArrayRegion::Int(out)
            }
            Tag::Long => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.get::<Long>()?);
                }
                ArrayRegion::Long(out)
            }
            Tag::Float => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.data.get_f32());
                }
                ArrayRegion::Float(out)
            }
            Tag::Double => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.data.get_f64());
                }
                ArrayRegion::Double(out)
            }
            Tag::Array
            | Tag::Object
            | Tag::String
            | Tag::Thread
            | Tag::ThreadGroup
            | Tag::ClassLoader
            | Tag::ClassObject => {
                let mut out = Vec::with_capacity(len);
                for _ in 0..len {
                    out.push(decoder.get::<Value>()?);
                }
                ArrayRegion::Object(out)
            }
            Tag::Void => return Err(DecodeJdwpDataError::UnsupportedArrayComponentTag(tag)),
        })
    }
}
