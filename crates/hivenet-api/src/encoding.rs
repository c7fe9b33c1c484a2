//! Stable protobuf-wire encoding primitives.
//!
//! Standard protobuf marshaling does not promise byte-identical output for
//! equal field content: map iteration order, encoder version, and unknown
//! fields can all shift bytes. Everything here exists to make that promise.
//! Each message type writes its present fields in ascending field-number
//! order, using exactly two wire forms:
//!
//! - **varint scalar** (`wire_type = 0`): tag, then a little-endian
//!   base-128 varint of the value. Signed values are reinterpreted as
//!   two's-complement unsigned — no zig-zag.
//! - **length-delimited** (`wire_type = 2`): tag, varint payload length,
//!   then the raw payload. Embedded messages recurse through the same
//!   encoder.
//!
//! Zero-valued scalars and empty byte fields are omitted entirely,
//! matching protobuf's missing-equals-default semantics. Optional embedded
//! messages are emitted exactly when present, even if their payload is
//! empty.
//!
//! Encoding is two-pass: [`StableMessage::stable_size`] computes the exact
//! buffer length without allocating, then [`StableMessage::stable_marshal`]
//! fills a caller-supplied buffer. The marshal side never grows the buffer;
//! a short buffer yields [`EncodeError::BufferTooSmall`].

use thiserror::Error;

/// Errors produced by stable marshaling.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EncodeError {
    /// The destination buffer cannot hold the next field.
    ///
    /// Caller-correctable: allocate [`StableMessage::stable_size`] bytes
    /// and retry.
    #[error("destination buffer too small: need {required} more bytes, {available} available")]
    BufferTooSmall {
        /// Bytes required by the field being written.
        required: usize,
        /// Bytes remaining in the destination buffer.
        available: usize,
    },

    /// An embedded message failed to marshal.
    #[error("embedded message in field {field_number}: {source}")]
    Field {
        /// Field number of the offending embedded message.
        field_number: u32,
        /// The underlying failure.
        source: Box<EncodeError>,
    },
}

/// A message that can produce its canonical byte encoding.
///
/// Implementations write every present field in ascending field-number
/// order. The ordering is part of the type's fixed schema — it is never
/// derived from a runtime container, so two semantically equal values
/// always encode to identical bytes.
pub trait StableMessage {
    /// Exact length of the canonical encoding, computed without
    /// allocating.
    fn stable_size(&self) -> usize;

    /// Writes the canonical encoding into `buf`, returning the number of
    /// bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`EncodeError::BufferTooSmall`] if `buf` is shorter than
    /// [`stable_size`](Self::stable_size); callers are responsible for
    /// allocation.
    fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError>;

    /// Convenience wrapper allocating a buffer of exactly
    /// [`stable_size`](Self::stable_size) bytes and marshaling into it.
    ///
    /// # Errors
    ///
    /// Propagates any [`EncodeError`] from
    /// [`stable_marshal`](Self::stable_marshal).
    fn stable_bytes(&self) -> Result<Vec<u8>, EncodeError> {
        let mut buf = vec![0u8; self.stable_size()];
        let written = self.stable_marshal(&mut buf)?;
        buf.truncate(written);
        Ok(buf)
    }
}

/// Wire type for varint scalar fields.
const WIRE_VARINT: u64 = 0;
/// Wire type for length-delimited fields.
const WIRE_LEN: u64 = 2;

/// Length of `value` as an unsigned base-128 varint.
#[must_use]
pub const fn varint_len(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Length of the tag prefix for `field_number`.
///
/// One byte for fields 1..=15; more as the field number spills into
/// additional varint bytes.
#[must_use]
pub const fn tag_len(field_number: u32) -> usize {
    varint_len((field_number as u64) << 3)
}

fn ensure_capacity(buf: &[u8], offset: usize, required: usize) -> Result<(), EncodeError> {
    let available = buf.len().saturating_sub(offset);
    if available < required {
        return Err(EncodeError::BufferTooSmall {
            required,
            available,
        });
    }
    Ok(())
}

/// Writes a varint at `buf[*offset..]`. Capacity must already be checked.
fn put_varint(buf: &mut [u8], offset: &mut usize, mut value: u64) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf[*offset] = byte;
            *offset += 1;
            return;
        }
        buf[*offset] = byte | 0x80;
        *offset += 1;
    }
}

fn put_tag(buf: &mut [u8], offset: &mut usize, field_number: u32, wire_type: u64) {
    put_varint(buf, offset, ((field_number as u64) << 3) | wire_type);
}

/// Encoded size of a `uint64` field; zero values occupy no bytes.
#[must_use]
pub const fn uint64_size(field_number: u32, value: u64) -> usize {
    if value == 0 {
        return 0;
    }
    tag_len(field_number) + varint_len(value)
}

/// Writes a `uint64` field, omitting zero values.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if the field does not fit.
pub fn uint64_marshal(
    buf: &mut [u8],
    offset: &mut usize,
    field_number: u32,
    value: u64,
) -> Result<(), EncodeError> {
    if value == 0 {
        return Ok(());
    }
    ensure_capacity(buf, *offset, uint64_size(field_number, value))?;
    put_tag(buf, offset, field_number, WIRE_VARINT);
    put_varint(buf, offset, value);
    Ok(())
}

/// Encoded size of a `uint32` field; zero values occupy no bytes.
#[must_use]
pub const fn uint32_size(field_number: u32, value: u32) -> usize {
    uint64_size(field_number, value as u64)
}

/// Writes a `uint32` field, omitting zero values.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if the field does not fit.
pub fn uint32_marshal(
    buf: &mut [u8],
    offset: &mut usize,
    field_number: u32,
    value: u32,
) -> Result<(), EncodeError> {
    uint64_marshal(buf, offset, field_number, u64::from(value))
}

/// Encoded size of an `int64` field; zero values occupy no bytes.
///
/// Negative values are reinterpreted as two's-complement unsigned (no
/// zig-zag) and always occupy the full ten varint bytes.
#[must_use]
#[allow(clippy::cast_sign_loss)]
pub const fn int64_size(field_number: u32, value: i64) -> usize {
    uint64_size(field_number, value as u64)
}

/// Writes an `int64` field, omitting zero values.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if the field does not fit.
#[allow(clippy::cast_sign_loss)]
pub fn int64_marshal(
    buf: &mut [u8],
    offset: &mut usize,
    field_number: u32,
    value: i64,
) -> Result<(), EncodeError> {
    uint64_marshal(buf, offset, field_number, value as u64)
}

/// Encoded size of a `bool` field; `false` occupies no bytes.
#[must_use]
pub const fn bool_size(field_number: u32, value: bool) -> usize {
    uint64_size(field_number, value as u64)
}

/// Writes a `bool` field, omitting `false`.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if the field does not fit.
pub fn bool_marshal(
    buf: &mut [u8],
    offset: &mut usize,
    field_number: u32,
    value: bool,
) -> Result<(), EncodeError> {
    uint64_marshal(buf, offset, field_number, u64::from(value))
}

/// Encoded size of a `bytes`/`string` field; empty payloads occupy no
/// bytes.
#[must_use]
pub const fn bytes_size(field_number: u32, value: &[u8]) -> usize {
    if value.is_empty() {
        return 0;
    }
    tag_len(field_number) + varint_len(value.len() as u64) + value.len()
}

/// Writes a `bytes`/`string` field, omitting empty payloads.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if the field does not fit.
pub fn bytes_marshal(
    buf: &mut [u8],
    offset: &mut usize,
    field_number: u32,
    value: &[u8],
) -> Result<(), EncodeError> {
    if value.is_empty() {
        return Ok(());
    }
    ensure_capacity(buf, *offset, bytes_size(field_number, value))?;
    put_tag(buf, offset, field_number, WIRE_LEN);
    put_varint(buf, offset, value.len() as u64);
    buf[*offset..*offset + value.len()].copy_from_slice(value);
    *offset += value.len();
    Ok(())
}

/// Encoded size of an embedded-message field.
///
/// Unlike scalar fields, an embedded message is always emitted when the
/// caller asks for it — presence is the caller's `Option`, and an empty
/// payload still writes a tag and zero length.
pub fn message_size(field_number: u32, message: &impl StableMessage) -> usize {
    let payload = message.stable_size();
    tag_len(field_number) + varint_len(payload as u64) + payload
}

/// Writes an embedded-message field via the message's own stable encoder.
///
/// # Errors
///
/// Returns [`EncodeError::BufferTooSmall`] if the field does not fit, or
/// [`EncodeError::Field`] identifying `field_number` if the embedded
/// message fails to marshal.
pub fn message_marshal(
    buf: &mut [u8],
    offset: &mut usize,
    field_number: u32,
    message: &impl StableMessage,
) -> Result<(), EncodeError> {
    let payload = message.stable_size();
    ensure_capacity(
        buf,
        *offset,
        tag_len(field_number) + varint_len(payload as u64) + payload,
    )?;
    put_tag(buf, offset, field_number, WIRE_LEN);
    put_varint(buf, offset, payload as u64);
    let written = message
        .stable_marshal(&mut buf[*offset..*offset + payload])
        .map_err(|source| EncodeError::Field {
            field_number,
            source: Box::new(source),
        })?;
    debug_assert_eq!(written, payload, "stable_size / stable_marshal disagree");
    *offset += written;
    Ok(())
}

/// Encoded size of a repeated embedded-message field.
pub fn repeated_message_size<M: StableMessage>(field_number: u32, messages: &[M]) -> usize {
    messages
        .iter()
        .map(|message| message_size(field_number, message))
        .sum()
}

/// Writes a repeated embedded-message field, one element at a time, in
/// the order given.
///
/// # Errors
///
/// Propagates the first element failure, identified by `field_number`.
pub fn repeated_message_marshal<M: StableMessage>(
    buf: &mut [u8],
    offset: &mut usize,
    field_number: u32,
    messages: &[M],
) -> Result<(), EncodeError> {
    for message in messages {
        message_marshal(buf, offset, field_number, message)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two varint scalars and one bytes field, covering both wire types.
    struct Sample {
        id: u64,
        payload: Vec<u8>,
        flag: bool,
    }

    impl StableMessage for Sample {
        fn stable_size(&self) -> usize {
            uint64_size(1, self.id) + bytes_size(2, &self.payload) + bool_size(16, self.flag)
        }

        fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
            let mut offset = 0;
            uint64_marshal(buf, &mut offset, 1, self.id)?;
            bytes_marshal(buf, &mut offset, 2, &self.payload)?;
            bool_marshal(buf, &mut offset, 16, self.flag)?;
            Ok(offset)
        }
    }

    #[test]
    fn varint_len_table() {
        assert_eq!(varint_len(0), 1);
        assert_eq!(varint_len(1), 1);
        assert_eq!(varint_len(127), 1);
        assert_eq!(varint_len(128), 2);
        assert_eq!(varint_len(16_383), 2);
        assert_eq!(varint_len(16_384), 3);
        assert_eq!(varint_len(u64::MAX), 10);
    }

    #[test]
    fn high_field_numbers_spill_into_two_tag_bytes() {
        assert_eq!(tag_len(15), 1);
        assert_eq!(tag_len(16), 2);

        let sample = Sample {
            id: 0,
            payload: vec![],
            flag: true,
        };
        // field 16, wire type 0: (16 << 3) = 128 -> varint 80 01, value 01.
        assert_eq!(hex::encode(sample.stable_bytes().unwrap()), "800101");
    }

    #[test]
    fn zero_and_empty_fields_are_omitted() {
        let sample = Sample {
            id: 0,
            payload: vec![],
            flag: false,
        };
        assert_eq!(sample.stable_size(), 0);
        assert_eq!(sample.stable_bytes().unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn golden_encoding() {
        let sample = Sample {
            id: 300,
            payload: vec![0xAA, 0xBB],
            flag: false,
        };
        // field 1: tag 08, varint 300 = ac 02; field 2: tag 12, len 02, aa bb.
        assert_eq!(hex::encode(sample.stable_bytes().unwrap()), "08ac021202aabb");
        assert_eq!(sample.stable_size(), 7);
    }

    #[test]
    fn negative_int64_is_twos_complement_not_zigzag() {
        assert_eq!(int64_size(1, -1), 11);
        let mut buf = vec![0u8; 11];
        let mut offset = 0;
        int64_marshal(&mut buf, &mut offset, 1, -1).unwrap();
        assert_eq!(hex::encode(&buf), "08ffffffffffffffffff01");
    }

    #[test]
    fn short_buffer_yields_buffer_too_small() {
        let sample = Sample {
            id: 300,
            payload: vec![0xAA, 0xBB],
            flag: false,
        };
        let mut buf = vec![0u8; sample.stable_size() - 1];
        let err = sample.stable_marshal(&mut buf).unwrap_err();
        assert_eq!(
            err,
            EncodeError::BufferTooSmall {
                required: 4,
                available: 3,
            }
        );
    }

    #[test]
    fn embedded_failure_identifies_the_field() {
        struct Outer(Sample);
        impl StableMessage for Outer {
            fn stable_size(&self) -> usize {
                message_size(3, &self.0)
            }
            fn stable_marshal(&self, buf: &mut [u8]) -> Result<usize, EncodeError> {
                let mut offset = 0;
                // Deliberately lies about capacity so the nested marshal,
                // not the outer capacity check, is what fails.
                ensure_capacity(buf, offset, self.stable_size())?;
                put_tag(buf, &mut offset, 3, WIRE_LEN);
                put_varint(buf, &mut offset, self.0.stable_size() as u64);
                let end = (offset + self.0.stable_size() - 1).min(buf.len());
                self.0
                    .stable_marshal(&mut buf[offset..end])
                    .map_err(|source| EncodeError::Field {
                        field_number: 3,
                        source: Box::new(source),
                    })?;
                Ok(offset)
            }
        }

        let outer = Outer(Sample {
            id: 7,
            payload: vec![1, 2, 3],
            flag: false,
        });
        let mut buf = vec![0u8; outer.stable_size()];
        let err = outer.stable_marshal(&mut buf).unwrap_err();
        match err {
            EncodeError::Field { field_number, .. } => assert_eq!(field_number, 3),
            other => panic!("expected Field error, got {other:?}"),
        }
    }

    #[test]
    fn empty_embedded_message_still_emits_tag_and_length() {
        struct Empty;
        impl StableMessage for Empty {
            fn stable_size(&self) -> usize {
                0
            }
            fn stable_marshal(&self, _buf: &mut [u8]) -> Result<usize, EncodeError> {
                Ok(0)
            }
        }

        assert_eq!(message_size(1, &Empty), 2);
        let mut buf = vec![0u8; 2];
        let mut offset = 0;
        message_marshal(&mut buf, &mut offset, 1, &Empty).unwrap();
        assert_eq!(hex::encode(&buf), "0a00");
    }
}
