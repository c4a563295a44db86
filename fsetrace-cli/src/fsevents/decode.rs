// SPDX-FileCopyrightText: 2026 fsetrace contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Decoding of raw fsevents buffers into [`Event`] values.
//!
//! Every multi-byte field is bounds-checked against the remaining buffer
//! before it is touched; the producer's length fields are trusted only to
//! advance the cursor, never to read. Decoded events borrow their payloads
//! from the buffer and are only valid while it is.

use num_traits::FromPrimitive;

use crate::errors::DecodeError;
use crate::fsevents::protocol::{ArgTag, EventKind, FSE_ARG_DONE};

/// One event decoded off the wire: what happened, who caused it, and the
/// tagged arguments the kernel attached.
#[derive(Debug, PartialEq, Eq)]
pub struct Event<'a> {
    pub kind: EventKind,
    pub pid: i32,
    pub args: Vec<Argument<'a>>,
}

/// One decoded argument. `len` is the producer's declared payload length,
/// kept around because it is displayed even when the payload itself is not
/// interpretable.
#[derive(Debug, PartialEq, Eq)]
pub struct Argument<'a> {
    pub tag: ArgTag,
    pub len: u16,
    pub value: ArgumentValue<'a>,
}

/// Interpreted payload of an argument.
///
/// Fixed-width numeric variants hold `None` when the declared length did not
/// match the expected width; the argument still decodes so that newer
/// producers with wider fields degrade to a length-only display instead of
/// killing the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentValue<'a> {
    /// Path bytes, without the trailing null.
    Vnode(&'a [u8]),
    /// Producer-defined text, without the trailing null.
    String(&'a [u8]),
    /// Legacy alias of `Vnode`.
    Path(&'a [u8]),
    Int32(Option<i32>),
    Int64(Option<i64>),
    /// Opaque bytes; never interpreted.
    Raw(&'a [u8]),
    /// 32- or 64-bit on the wire; the width is inferred from the length.
    Inode(Option<u64>),
    UserId(Option<u32>),
    DeviceId(Option<i32>),
    Mode(Option<i32>),
    GroupId(Option<u32>),
}

/// Position into one buffer. Owned by a single decode pass; never survives
/// the buffer it reads from.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Consume the next `n` bytes, or fail without moving if fewer remain.
    fn take(&mut self, n: usize, field: &'static str) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::TruncatedArgument {
                field,
                needed: n,
                remaining: self.remaining(),
            });
        }
        let window = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(window)
    }

    fn take_array<const N: usize>(&mut self, field: &'static str) -> Result<[u8; N], DecodeError> {
        let mut bytes = [0_u8; N];
        bytes.copy_from_slice(self.take(N, field)?);
        Ok(bytes)
    }

    fn read_u16(&mut self, field: &'static str) -> Result<u16, DecodeError> {
        Ok(u16::from_ne_bytes(self.take_array(field)?))
    }

    fn read_i32(&mut self, field: &'static str) -> Result<i32, DecodeError> {
        Ok(i32::from_ne_bytes(self.take_array(field)?))
    }
}

/// Decode one argument, or `None` when the terminator tag is read instead.
/// The terminator is two bytes on its own; no length field follows it.
fn decode_argument<'a>(cursor: &mut Cursor<'a>) -> Result<Option<Argument<'a>>, DecodeError> {
    let tag = cursor.read_u16("argument tag")?;
    if tag == FSE_ARG_DONE {
        return Ok(None);
    }
    let tag = ArgTag::from_u16(tag).ok_or(DecodeError::UnknownArgumentTag(tag))?;
    let len = cursor.read_u16("argument length")?;
    let payload = cursor.take(usize::from(len), "argument payload")?;

    let value = match tag {
        ArgTag::Vnode => ArgumentValue::Vnode(text_payload(payload)),
        ArgTag::String => ArgumentValue::String(text_payload(payload)),
        ArgTag::Path => ArgumentValue::Path(text_payload(payload)),
        ArgTag::Int32 => ArgumentValue::Int32(fixed_i32(payload)),
        ArgTag::Int64 => ArgumentValue::Int64(fixed_i64(payload)),
        ArgTag::Raw => ArgumentValue::Raw(payload),
        ArgTag::Inode => ArgumentValue::Inode(inode_value(payload)),
        ArgTag::UserId => ArgumentValue::UserId(fixed_u32(payload)),
        ArgTag::DeviceId => ArgumentValue::DeviceId(fixed_i32(payload)),
        ArgTag::Mode => ArgumentValue::Mode(fixed_i32(payload)),
        ArgTag::GroupId => ArgumentValue::GroupId(fixed_u32(payload)),
    };
    Ok(Some(Argument { tag, len, value }))
}

/// Text payloads carry a null terminator inside their declared length. A
/// missing terminator is tolerated and the whole payload is the text.
fn text_payload(payload: &[u8]) -> &[u8] {
    match payload.iter().position(|&b| b == 0) {
        Some(nul) => &payload[..nul],
        None => payload,
    }
}

fn fixed_i32(payload: &[u8]) -> Option<i32> {
    <[u8; 4]>::try_from(payload).ok().map(i32::from_ne_bytes)
}

fn fixed_u32(payload: &[u8]) -> Option<u32> {
    <[u8; 4]>::try_from(payload).ok().map(u32::from_ne_bytes)
}

fn fixed_i64(payload: &[u8]) -> Option<i64> {
    <[u8; 8]>::try_from(payload).ok().map(i64::from_ne_bytes)
}

fn fixed_u64(payload: &[u8]) -> Option<u64> {
    <[u8; 8]>::try_from(payload).ok().map(u64::from_ne_bytes)
}

fn inode_value(payload: &[u8]) -> Option<u64> {
    match payload.len() {
        4 => fixed_u32(payload).map(u64::from),
        8 => fixed_u64(payload),
        _ => None,
    }
}

/// Decode one event: kind, pid, then arguments until the terminator.
///
/// An unrecognized kind code (the kernel's invalid marker included) fails
/// here, and a buffer that ends mid-event is reported as a truncation rather
/// than silently producing a short event.
fn decode_event<'a>(cursor: &mut Cursor<'a>) -> Result<Event<'a>, DecodeError> {
    let code = cursor.read_i32("event kind")?;
    let kind = EventKind::from_i32(code).ok_or(DecodeError::UnknownEventKind(code))?;
    let pid = cursor.read_i32("event pid")?;

    let mut args = Vec::new();
    while let Some(argument) = decode_argument(cursor)? {
        args.push(argument);
    }
    Ok(Event { kind, pid, args })
}

/// Lazy sequence of the events in one buffer.
///
/// The first decode failure is yielded as an `Err` and ends the sequence:
/// the rest of the buffer cannot be trusted once a field is off, so those
/// bytes are abandoned. The next buffer gets a fresh stream.
pub struct EventStream<'a> {
    cursor: Cursor<'a>,
    failed: bool,
}

impl<'a> Iterator for EventStream<'a> {
    type Item = Result<Event<'a>, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.remaining() == 0 {
            return None;
        }
        let result = decode_event(&mut self.cursor);
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

/// Iterate the events packed into `buf`.
#[must_use]
pub fn decode_events(buf: &[u8]) -> EventStream<'_> {
    EventStream {
        cursor: Cursor::new(buf),
        failed: false,
    }
}

#[cfg(test)]
mod tests {
    use crate::fsevents::protocol::FSE_INVALID;

    use super::*;

    /// Build one wire-format event: kind, pid, `(tag, payload)` pairs, then
    /// the terminator.
    fn encode_event(kind: i32, pid: i32, args: &[(u16, &[u8])]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&kind.to_ne_bytes());
        buf.extend_from_slice(&pid.to_ne_bytes());
        for (tag, payload) in args {
            buf.extend_from_slice(&tag.to_ne_bytes());
            buf.extend_from_slice(&u16::try_from(payload.len()).unwrap().to_ne_bytes());
            buf.extend_from_slice(payload);
        }
        buf.extend_from_slice(&FSE_ARG_DONE.to_ne_bytes());
        buf
    }

    #[test]
    fn test_rename_event_with_two_vnodes() {
        let buf = encode_event(
            3,
            4242,
            &[
                (0x0001, b"/tmp/from.txt\0"),
                (0x0001, b"/tmp/to.txt\0"),
                (0x0007, &77_u64.to_ne_bytes()),
            ],
        );

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(events.len(), 1);
        let event = &events[0];
        assert_eq!(event.kind, EventKind::Rename);
        assert_eq!(event.pid, 4242);
        assert_eq!(event.args.len(), 3);
        assert_eq!(
            event.args[0].value,
            ArgumentValue::Vnode(b"/tmp/from.txt")
        );
        assert_eq!(event.args[0].len, 14);
        assert_eq!(event.args[1].value, ArgumentValue::Vnode(b"/tmp/to.txt"));
        assert_eq!(event.args[2].value, ArgumentValue::Inode(Some(77)));
    }

    #[test]
    fn test_two_back_to_back_events_with_no_trailing_bytes() {
        let mut buf = encode_event(0, 1, &[(0x0001, b"/a\0")]);
        buf.extend_from_slice(&encode_event(1, 2, &[(0x0001, b"/b\0")]));

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::CreateFile);
        assert_eq!(events[0].pid, 1);
        assert_eq!(events[1].kind, EventKind::Delete);
        assert_eq!(events[1].pid, 2);
    }

    #[test]
    fn test_empty_buffer_yields_nothing() {
        assert_eq!(decode_events(&[]).count(), 0);
    }

    #[test]
    fn test_event_with_no_arguments() {
        let buf = encode_event(7, 99, &[]);

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, EventKind::CreateDir);
        assert!(events[0].args.is_empty());
    }

    #[test]
    fn test_payload_longer_than_buffer_is_truncation() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2_i32.to_ne_bytes());
        buf.extend_from_slice(&10_i32.to_ne_bytes());
        buf.extend_from_slice(&0x0002_u16.to_ne_bytes());
        buf.extend_from_slice(&100_u16.to_ne_bytes()); // declares 100 bytes
        buf.extend_from_slice(b"short\0");

        let mut stream = decode_events(&buf);
        assert_eq!(
            stream.next(),
            Some(Err(DecodeError::TruncatedArgument {
                field: "argument payload",
                needed: 100,
                remaining: 6,
            }))
        );
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_buffer_ending_mid_header_is_truncation() {
        let buf = [0_u8; 3]; // not even a whole kind field

        let mut stream = decode_events(&buf);
        assert_eq!(
            stream.next(),
            Some(Err(DecodeError::TruncatedArgument {
                field: "event kind",
                needed: 4,
                remaining: 3,
            }))
        );
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_missing_terminator_is_truncation() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&4_i32.to_ne_bytes());
        buf.extend_from_slice(&8_i32.to_ne_bytes());
        // argument list just stops; no terminator tag

        let mut stream = decode_events(&buf);
        assert_eq!(
            stream.next(),
            Some(Err(DecodeError::TruncatedArgument {
                field: "argument tag",
                needed: 2,
                remaining: 0,
            }))
        );
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_unknown_tag_drops_rest_of_buffer() {
        let mut buf = encode_event(0, 1, &[(0x00ff, b"??")]);
        // a perfectly good event after the bad one
        buf.extend_from_slice(&encode_event(1, 2, &[(0x0001, b"/b\0")]));

        let mut stream = decode_events(&buf);
        assert_eq!(
            stream.next(),
            Some(Err(DecodeError::UnknownArgumentTag(0x00ff)))
        );
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_unknown_event_kind_first_yields_zero_events() {
        let buf = encode_event(999, 1, &[]);

        let mut stream = decode_events(&buf);
        assert_eq!(stream.next(), Some(Err(DecodeError::UnknownEventKind(999))));
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_invalid_marker_kind_is_unknown() {
        let buf = encode_event(FSE_INVALID, 1, &[]);

        let mut stream = decode_events(&buf);
        assert_eq!(
            stream.next(),
            Some(Err(DecodeError::UnknownEventKind(FSE_INVALID)))
        );
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_unknown_kind_in_second_event_keeps_first() {
        let mut buf = encode_event(8, 10, &[(0x0008, &501_u32.to_ne_bytes())]);
        buf.extend_from_slice(&encode_event(55, 11, &[]));

        let mut stream = decode_events(&buf);
        let first = stream.next().unwrap().unwrap();
        assert_eq!(first.kind, EventKind::Chown);
        assert_eq!(stream.next(), Some(Err(DecodeError::UnknownEventKind(55))));
        assert_eq!(stream.next(), None);
    }

    #[test]
    fn test_mismatched_width_numerics_become_length_only() {
        let buf = encode_event(
            2,
            1,
            &[
                (0x0004, b"\x01\x02"),         // int32, 2 bytes
                (0x0005, b"\x01\x02\x03\x04"), // int64, 4 bytes
                (0x0007, b"\x01\x02\x03"),     // inode, 3 bytes
                (0x0008, b""),                 // uid, empty
                (0x0009, b"\x01"),             // dev, 1 byte
                (0x000a, b"\x01\x02"),         // mode, 2 bytes
                (0x000b, b"\x01\x02\x03\x04\x05"), // gid, 5 bytes
            ],
        );

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(events.len(), 1);
        let values: Vec<_> = events[0].args.iter().map(|a| a.value).collect();
        assert_eq!(
            values,
            vec![
                ArgumentValue::Int32(None),
                ArgumentValue::Int64(None),
                ArgumentValue::Inode(None),
                ArgumentValue::UserId(None),
                ArgumentValue::DeviceId(None),
                ArgumentValue::Mode(None),
                ArgumentValue::GroupId(None),
            ]
        );
        // the declared lengths are still there to display
        assert_eq!(events[0].args[0].len, 2);
        assert_eq!(events[0].args[3].len, 0);
    }

    #[test]
    fn test_inode_width_is_inferred_from_length() {
        let buf = encode_event(
            0,
            1,
            &[
                (0x0007, &0xdead_beef_u32.to_ne_bytes()),
                (0x0007, &0x1122_3344_5566_7788_u64.to_ne_bytes()),
            ],
        );

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            events[0].args[0].value,
            ArgumentValue::Inode(Some(0xdead_beef))
        );
        assert_eq!(
            events[0].args[1].value,
            ArgumentValue::Inode(Some(0x1122_3344_5566_7788))
        );
    }

    #[test]
    fn test_text_without_terminator_is_taken_whole() {
        let buf = encode_event(0, 1, &[(0x0002, b"no-nul-here")]);

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(
            events[0].args[0].value,
            ArgumentValue::String(b"no-nul-here")
        );
    }

    #[test]
    fn test_text_stops_at_first_nul() {
        let buf = encode_event(0, 1, &[(0x0002, b"ab\0cd")]);

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(events[0].args[0].value, ArgumentValue::String(b"ab"));
    }

    #[test]
    fn test_raw_payload_is_untouched() {
        let payload = [0_u8, 1, 2, 0, 255];
        let buf = encode_event(6, 1, &[(0x0006, &payload)]);

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(events[0].args[0].value, ArgumentValue::Raw(&payload[..]));
    }

    #[test]
    fn test_legacy_path_tag_is_accepted() {
        let buf = encode_event(1, 1, &[(0x0003, b"/legacy\0")]);

        let events: Vec<_> = decode_events(&buf).collect::<Result<_, _>>().unwrap();
        assert_eq!(events[0].args[0].value, ArgumentValue::Path(b"/legacy"));
    }
}
