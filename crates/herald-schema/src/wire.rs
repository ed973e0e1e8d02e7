// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Confluent wire framing: `[0x00][schema id: i32 BE][datum]`.

use bytes::{Buf, BufMut, Bytes, BytesMut};
use herald_core::HeraldError;

/// Leading byte of every framed message.
pub const MAGIC_BYTE: u8 = 0x00;

/// Magic byte plus the schema id.
pub const HEADER_LEN: usize = 5;

/// Frames `datum` with `schema_id`, starting from a buffer of `capacity` bytes.
pub fn frame(schema_id: i32, datum: &[u8], capacity: usize) -> Bytes {
    let mut buf = BytesMut::with_capacity(capacity.max(HEADER_LEN + datum.len()));
    buf.put_u8(MAGIC_BYTE);
    buf.put_i32(schema_id);
    buf.put_slice(datum);
    buf.freeze()
}

/// Splits a framed message into its schema id and datum.
pub fn unframe(data: &[u8]) -> Result<(i32, &[u8]), HeraldError> {
    if data.len() < HEADER_LEN {
        return Err(HeraldError::serialization(format!(
            "frame of {} bytes is too short to carry a schema id",
            data.len()
        )));
    }
    if data[0] != MAGIC_BYTE {
        return Err(HeraldError::serialization(format!(
            "unknown magic byte 0x{:02x}",
            data[0]
        )));
    }

    let mut id_bytes = &data[1..HEADER_LEN];
    Ok((id_bytes.get_i32(), &data[HEADER_LEN..]))
}
