//! On-disk framing.
//!
//! Every persisted file is one frame:
//!
//! ```text
//! ┌────────┬─────────┬─────────────┬─────────────┬────────┐
//! │ magic  │ version │ payload len │ payload ... │ crc32  │
//! │ u32 LE │ u32 LE  │ u64 LE      │             │ u32 LE │
//! └────────┴─────────┴─────────────┴─────────────┴────────┘
//! ```
//!
//! The checksum covers everything before it. Files are written to a
//! temporary name and renamed into place.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::Path;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use strata_common::constants::{FORMAT_VERSION, TMP_FILE_SUFFIX};
use strata_common::error::{StrataError, StrataResult};

/// Bytes before the payload.
const HEADER_SIZE: usize = 4 + 4 + 8;

/// Bytes after the payload.
const TRAILER_SIZE: usize = 4;

/// Wraps `payload` in a frame tagged with `magic`.
pub fn encode_frame(magic: u32, payload: &[u8]) -> Bytes {
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len() + TRAILER_SIZE);
    buf.put_u32_le(magic);
    buf.put_u32_le(FORMAT_VERSION);
    buf.put_u64_le(payload.len() as u64);
    buf.put_slice(payload);
    let checksum = crc32fast::hash(&buf);
    buf.put_u32_le(checksum);
    buf.freeze()
}

/// Verifies a frame and returns its payload.
pub fn decode_frame(magic: u32, data: &[u8]) -> StrataResult<&[u8]> {
    if data.len() < HEADER_SIZE + TRAILER_SIZE {
        return Err(StrataError::corruption(format!(
            "file of {} bytes is shorter than a frame header",
            data.len()
        )));
    }

    let mut header = &data[..HEADER_SIZE];
    let found_magic = header.get_u32_le();
    if found_magic != magic {
        return Err(StrataError::corruption(format!(
            "invalid magic: expected {magic:08x}, got {found_magic:08x}"
        )));
    }
    let version = header.get_u32_le();
    if version != FORMAT_VERSION {
        return Err(StrataError::corruption(format!(
            "unsupported format version {version}"
        )));
    }
    let payload_len = header.get_u64_le() as usize;
    let frame_len = payload_len
        .checked_add(HEADER_SIZE + TRAILER_SIZE)
        .ok_or_else(|| StrataError::corruption("frame length overflows"))?;
    if data.len() != frame_len {
        return Err(StrataError::corruption(format!(
            "frame declares {payload_len} payload bytes but file holds {}",
            data.len() - HEADER_SIZE - TRAILER_SIZE
        )));
    }

    let body_end = HEADER_SIZE + payload_len;
    let mut trailer = &data[body_end..];
    let expected = trailer.get_u32_le();
    let actual = crc32fast::hash(&data[..body_end]);
    if expected != actual {
        return Err(StrataError::ChecksumMismatch { expected, actual });
    }

    Ok(&data[HEADER_SIZE..body_end])
}

/// Writes `contents` to `dir/name` through a temporary file and a rename.
pub fn write_atomic(dir: &Path, name: &str, contents: &[u8], sync_writes: bool) -> StrataResult<()> {
    let tmp_path = dir.join(format!("{name}.{TMP_FILE_SUFFIX}"));
    let final_path = dir.join(name);

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&tmp_path)?;
    file.write_all(contents)?;
    if sync_writes {
        file.sync_all()?;
    }
    drop(file);

    fs::rename(&tmp_path, &final_path)?;

    if sync_writes {
        if let Ok(dir) = File::open(dir) {
            let _ = dir.sync_all();
        }
    }
    Ok(())
}

/// Appends a length-prefixed UTF-8 string.
pub fn put_str(buf: &mut BytesMut, s: &str) {
    buf.put_u32_le(s.len() as u32);
    buf.put_slice(s.as_bytes());
}

/// Bounds-checked reader over a frame payload.
pub struct PayloadReader<'a> {
    buf: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    /// Creates a reader.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn need(&self, n: usize, what: &str) -> StrataResult<()> {
        if self.buf.remaining() < n {
            return Err(StrataError::corruption(format!(
                "truncated payload reading {what}"
            )));
        }
        Ok(())
    }

    /// Reads a byte.
    pub fn u8(&mut self, what: &str) -> StrataResult<u8> {
        self.need(1, what)?;
        Ok(self.buf.get_u8())
    }

    /// Reads a little-endian `u32`.
    pub fn u32(&mut self, what: &str) -> StrataResult<u32> {
        self.need(4, what)?;
        Ok(self.buf.get_u32_le())
    }

    /// Reads a little-endian `i32`.
    pub fn i32(&mut self, what: &str) -> StrataResult<i32> {
        self.need(4, what)?;
        Ok(self.buf.get_i32_le())
    }

    /// Reads a little-endian `u64`.
    pub fn u64(&mut self, what: &str) -> StrataResult<u64> {
        self.need(8, what)?;
        Ok(self.buf.get_u64_le())
    }

    /// Reads a `u64` element count.
    ///
    /// Fails unless the rest of the payload holds that many elements of
    /// `width` bytes.
    pub fn count(&mut self, what: &str, width: usize) -> StrataResult<usize> {
        let count = self.u64(what)?;
        let fits = usize::try_from(count)
            .ok()
            .and_then(|c| c.checked_mul(width))
            .is_some_and(|bytes| bytes <= self.buf.remaining());
        if !fits {
            return Err(StrataError::corruption(format!(
                "{what} {count} exceeds the {} payload bytes left",
                self.buf.remaining()
            )));
        }
        Ok(count as usize)
    }

    /// Reads a length-prefixed string.
    pub fn string(&mut self, what: &str) -> StrataResult<String> {
        let len = self.u32(what)? as usize;
        self.need(len, what)?;
        let s = std::str::from_utf8(&self.buf[..len])
            .map_err(|_| StrataError::corruption(format!("{what} is not valid UTF-8")))?
            .to_string();
        self.buf.advance(len);
        Ok(s)
    }

    /// Fails unless the whole payload was consumed.
    pub fn finish(&self, what: &str) -> StrataResult<()> {
        if self.buf.has_remaining() {
            return Err(StrataError::corruption(format!(
                "{} trailing bytes after {what}",
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MAGIC: u32 = 0x7465_7374;

    #[test]
    fn test_frame_round_trip() {
        let frame = encode_frame(MAGIC, b"payload");
        assert_eq!(decode_frame(MAGIC, &frame).unwrap(), b"payload");
    }

    #[test]
    fn test_frame_rejects_wrong_magic() {
        let frame = encode_frame(MAGIC, b"x");
        let err = decode_frame(MAGIC + 1, &frame).unwrap_err();
        assert!(err.to_string().contains("invalid magic"));
    }

    #[test]
    fn test_frame_detects_bit_flip() {
        let mut frame = encode_frame(MAGIC, b"hello world").to_vec();
        frame[HEADER_SIZE + 3] ^= 0x40;
        let err = decode_frame(MAGIC, &frame).unwrap_err();
        assert!(matches!(err, StrataError::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_frame_detects_truncation() {
        let frame = encode_frame(MAGIC, b"hello world");
        assert!(decode_frame(MAGIC, &frame[..frame.len() - 2]).is_err());
        assert!(decode_frame(MAGIC, &frame[..4]).is_err());
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let tmp = TempDir::new().unwrap();
        write_atomic(tmp.path(), "f", b"one", false).unwrap();
        write_atomic(tmp.path(), "f", b"two", true).unwrap();

        assert_eq!(fs::read(tmp.path().join("f")).unwrap(), b"two");
        assert!(!tmp.path().join("f.tmp").exists());
    }

    #[test]
    fn test_payload_reader() {
        let mut buf = BytesMut::new();
        buf.put_u8(7);
        put_str(&mut buf, "grades");
        buf.put_i32_le(-5);

        let mut reader = PayloadReader::new(&buf);
        assert_eq!(reader.u8("tag").unwrap(), 7);
        assert_eq!(reader.string("name").unwrap(), "grades");
        assert_eq!(reader.i32("value").unwrap(), -5);
        reader.finish("test").unwrap();
        assert!(reader.u32("past end").is_err());
    }

    #[test]
    fn test_count_bounded_by_payload() {
        let mut buf = BytesMut::new();
        buf.put_u64_le(2);
        buf.put_i32_le(1);
        buf.put_i32_le(2);
        let mut reader = PayloadReader::new(&buf);
        assert_eq!(reader.count("value count", 4).unwrap(), 2);

        let mut buf = BytesMut::new();
        buf.put_u64_le(u64::MAX / 2);
        buf.put_i32_le(1);
        let mut reader = PayloadReader::new(&buf);
        let err = reader.count("value count", 4).unwrap_err();
        assert!(matches!(err, StrataError::Corruption { .. }));
    }
}
