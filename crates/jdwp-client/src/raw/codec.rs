use std::io::ErrorKind;
use tokio_util::codec::{Decoder, Encoder};
use tokio_util::bytes::{Buf, BufMut, BytesMut};
use tracing::{instrument, trace};
use crate::raw::packet::{AnyRawPacket, CommandData, ErrorCode, Flags, HeaderVariableData, RawCommandPacket, RawPacket, RawReplyPacket, MAX_PACKET_LENGTH, MIN_PACKET_LENGTH};

/// Codec for encoding and decoding jdwp packets
#[derive(Debug, Default, Copy, Clone)]
pub struct RawCodec;

impl<T: HeaderVariableData> Encoder<RawPacket<T>> for RawCodec {
    type Error = std::io::Error;

    fn encode(&mut self, item: RawPacket<T>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let mut limited_buffer = dst.limit(item.header().length() as usize);
        limited_buffer.put_u32(item.header().length());
        limited_buffer.put_u32(item.header().id());
        limited_buffer.put_u8(item.header().flags().0);
        limited_buffer.put_u16(item.header().var().to_u16());
        limited_buffer.put(item.data());
        Ok(())
    }
}

impl Decoder for RawCodec {
    type Item = AnyRawPacket;
    type Error = std::io::Error;

    #[instrument(skip_all, fields(buffered=src.len()))]
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.len() < 4 {
            // Not enough data to read length marker.
            trace!("current length of {} is not enough to read length of packet", src.len());
            return Ok(None);
        }
        let length = u32::from_be_bytes(src[..4].try_into().unwrap()) as usize;
        trace!("got length for packet: {length}");
        if length < MIN_PACKET_LENGTH {
            return Err(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("{} is smaller than the minimum packet header size: {}", length, MIN_PACKET_LENGTH),
            ))
        }
        if length > MAX_PACKET_LENGTH {
            return Err(std::io::Error::new(
                ErrorKind::InvalidData,
                format!("{} is larger than max packet size: {}", length, MAX_PACKET_LENGTH),
            ))
        }
        if src.len() < length {
            trace!("current length of {} is not enough to read length of packet", src.len());
            src.reserve(length - src.len());
            return Ok(None);
        }
        src.advance(4);

        let id = src.get_u32();
        trace!("got packet id: {id}");
        let raw_flag = src.get_u8();
        let flag = Flags(raw_flag);
        trace!("got flag: {flag:?}");
        let raw_var = src.get_u16();
        let payload_len = length - MIN_PACKET_LENGTH;
        let data = src[..payload_len].to_vec();
        src.advance(payload_len);
        let packet = if flag.is_reply() {
            let error_code = ErrorCode::from_u16(raw_var);
            AnyRawPacket::Reply(RawReplyPacket::new_reply(id, error_code, data))
        } else {
            let command = CommandData::from_u16(raw_var);
            AnyRawPacket::Command(RawCommandPacket::new_command(id, command, data))
        };
        Ok(Some(packet))
    }
}

#[cfg(test)]
mod tests {
    use super::RawCodec;
    use crate::raw::packet::AnyRawPacket;
    use tokio_util::bytes::BytesMut;
    use tokio_util::codec::Decoder;

    fn reply_packet_bytes(id: u32, payload: &[u8]) -> Vec<u8> {
        let length = (11 + payload.len()) as u32;
        let mut bytes = Vec::with_capacity(length as usize);
        bytes.extend_from_slice(&length.to_be_bytes());
        bytes.extend_from_slice(&id.to_be_bytes());
        bytes.push(0x80);
        bytes.extend_from_slice(&0u16.to_be_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn decode_waits_for_full_packet_before_producing_one() {
        let packet = reply_packet_bytes(7, &[1, 2, 3, 4]);
        let mut codec = RawCodec;
        let mut src = BytesMut::new();

        // First 10 of 15 bytes: not enough even to know if the declared length has arrived.
        src.extend_from_slice(&packet[..10]);
        assert!(codec.decode(&mut src).unwrap().is_none());

        // Remaining 5 bytes complete the packet.
        src.extend_from_slice(&packet[10..]);
        let decoded = codec.decode(&mut src).unwrap().expect("packet should be complete");
        match decoded {
            AnyRawPacket::Reply(reply) => {
                assert_eq!(reply.header().id(), 7);
                assert_eq!(reply.data().as_ref(), &[1, 2, 3, 4]);
            }
            AnyRawPacket::Command(_) => panic!("expected a reply packet"),
        }
        assert!(src.is_empty(), "decoder must consume exactly the one packet");
    }

    fn reply_id(packet: &AnyRawPacket) -> u32 {
        match packet {
            AnyRawPacket::Reply(reply) => reply.header().id(),
            AnyRawPacket::Command(_) => panic!("expected a reply packet"),
        }
    }

    #[test]
    fn decode_handles_tail_of_one_packet_plus_head_of_the_next_in_one_read() {
        let first = reply_packet_bytes(1, &[0xAA]);
        let second = reply_packet_bytes(2, &[0xBB, 0xCC]);
        let mut codec = RawCodec;
        let mut src = BytesMut::new();

        // First read delivers only the head of packet one.
        src.extend_from_slice(&first[..first.len() - 3]);
        assert!(codec.decode(&mut src).unwrap().is_none());

        // Second read delivers the tail of packet one plus the head of packet two, as a single
        // transport read would.
        src.extend_from_slice(&first[first.len() - 3..]);
        src.extend_from_slice(&second[..4]);

        let decoded_first = codec.decode(&mut src).unwrap().expect("first packet ready");
        assert_eq!(reply_id(&decoded_first), 1);

        assert!(codec.decode(&mut src).unwrap().is_none());
        src.extend_from_slice(&second[4..]);
        let decoded_second = codec.decode(&mut src).unwrap().expect("second packet ready");
        assert_eq!(reply_id(&decoded_second), 2);
        assert!(src.is_empty());
    }
}