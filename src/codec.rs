//! Integer decoding for the MIDI wire format. Fixed width integers are stored big-endian and
//! delta times and lengths use a variable length quantity (VLQ) of 7 payload bits per byte.

use crate::{error::DecodeResult, reader::ByteCursor};

/// A fixed width integer stored most significant byte first
pub trait BigEndian: Sized {
    /// Reads the integer from the cursor, converting from big-endian
    fn read_be<ITER>(cursor: &mut ByteCursor<ITER>) -> DecodeResult<Self>
    where
        ITER: Iterator<Item = u8>;
}

/// Implements [`BigEndian`] for primitive integers through their `from_be_bytes`
macro_rules! big_endian {
    ($($ty:ty),*) => {
        $(
            impl BigEndian for $ty {
                fn read_be<ITER>(cursor: &mut ByteCursor<ITER>) -> DecodeResult<Self>
                where
                    ITER: Iterator<Item = u8>,
                {
                    let bytes = cursor.read_array::<{ core::mem::size_of::<$ty>() }>()?;
                    Ok(<$ty>::from_be_bytes(bytes))
                }
            }
        )*
    };
}

big_endian!(u16, u32, u64);

/// Low 7 bits of a VLQ byte carry data
const VLQ_PAYLOAD: u8 = 0x7F;

/// Returns true if the msb of a byte is 1
pub(crate) fn msb_is_one(byte: u8) -> bool {
    byte >> 7 == 1
}

/// Reads a variable length quantity, most significant group first. Bytes with their msb set are
/// followed by more bytes; the first byte with a clear msb ends the value.
///
/// Values wider than 32 bits silently lose their high bits.
pub fn read_vlq<ITER>(cursor: &mut ByteCursor<ITER>) -> DecodeResult<u32>
where
    ITER: Iterator<Item = u8>,
{
    let mut result: u32 = 0;

    loop {
        let byte = cursor.read_byte()?;
        result = (result << 7) | (byte & VLQ_PAYLOAD) as u32;

        if !msb_is_one(byte) {
            return Ok(result);
        }
    }
}
