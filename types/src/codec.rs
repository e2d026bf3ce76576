//! Length-prefixed helpers shared by the canonical host-message encoding.
//!
//! Every variable-length field is written as a `u32` big-endian length followed by
//! its bytes, so two validators always agree on the encoding of the same message.

use bytes::{Buf, BufMut};
use commonware_codec::{EncodeSize, Error, Read, ReadExt, Write};

/// Maximum length of any encoded string (addresses, denoms, labels, memos).
pub const MAX_STRING_LENGTH: usize = 64 * 1024;

/// Maximum length of any encoded opaque byte field (contract messages, packet values).
pub const MAX_BYTES_LENGTH: usize = 1024 * 1024;

/// Maximum number of items in an encoded list (coins, payloads, votes, nested messages).
pub const MAX_LIST_LENGTH: usize = 1024;

/// Helper to write a string as length-prefixed UTF-8 bytes.
pub fn write_string(s: &str, writer: &mut impl BufMut) {
    write_bytes(s.as_bytes(), writer);
}

/// Reads a length-prefixed UTF-8 string of at most `max_len` bytes.
pub fn read_string(reader: &mut impl Buf, max_len: usize) -> Result<String, Error> {
    let bytes = read_raw(reader, max_len, "String")?;
    String::from_utf8(bytes).map_err(|_| Error::Invalid("String", "invalid UTF-8"))
}

/// Helper to get encode size of a string.
pub fn string_encode_size(s: &str) -> usize {
    4 + s.len()
}

pub fn write_bytes(bytes: &[u8], writer: &mut impl BufMut) {
    (bytes.len() as u32).write(writer);
    writer.put_slice(bytes);
}

pub fn read_bytes(reader: &mut impl Buf, max_len: usize) -> Result<Vec<u8>, Error> {
    read_raw(reader, max_len, "Bytes")
}

pub fn bytes_encode_size(bytes: &[u8]) -> usize {
    4 + bytes.len()
}

/// Optional strings are a presence byte followed by the string.
pub fn write_optional_string(s: Option<&str>, writer: &mut impl BufMut) {
    match s {
        Some(s) => {
            true.write(writer);
            write_string(s, writer);
        }
        None => false.write(writer),
    }
}

pub fn read_optional_string(
    reader: &mut impl Buf,
    max_len: usize,
) -> Result<Option<String>, Error> {
    if bool::read(reader)? {
        Ok(Some(read_string(reader, max_len)?))
    } else {
        Ok(None)
    }
}

pub fn optional_string_encode_size(s: Option<&str>) -> usize {
    1 + s.map(string_encode_size).unwrap_or(0)
}

pub fn write_list<T: Write>(items: &[T], writer: &mut impl BufMut) {
    (items.len() as u32).write(writer);
    for item in items {
        item.write(writer);
    }
}

pub fn read_list<T: Read<Cfg = ()>>(
    reader: &mut impl Buf,
    max_len: usize,
) -> Result<Vec<T>, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid("List", "too long"));
    }
    let mut items = Vec::with_capacity(len);
    for _ in 0..len {
        items.push(T::read(reader)?);
    }
    Ok(items)
}

pub fn list_encode_size<T: EncodeSize>(items: &[T]) -> usize {
    4 + items.iter().map(EncodeSize::encode_size).sum::<usize>()
}

fn read_raw(reader: &mut impl Buf, max_len: usize, kind: &'static str) -> Result<Vec<u8>, Error> {
    let len = u32::read(reader)? as usize;
    if len > max_len {
        return Err(Error::Invalid(kind, "too long"));
    }
    if reader.remaining() < len {
        return Err(Error::EndOfBuffer);
    }
    let mut bytes = vec![0u8; len];
    reader.copy_to_slice(&mut bytes);
    Ok(bytes)
}
