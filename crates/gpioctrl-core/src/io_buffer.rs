//! Caller memory
//!
//! Operations never touch caller memory directly. They copy through an
//! [`IoBufferReader`] (caller to device) or an [`IoBufferWriter`] (device
//! to caller). A copy that cannot complete fails with [`Error::Fault`].

use crate::error::{Error, Result};

/// A buffer to be read from during IO
pub trait IoBufferReader {
    /// Number of bytes the caller claims to provide
    ///
    /// Reading fewer bytes than this may still fail.
    fn len(&self) -> usize;

    /// Returns `true` if the caller provides no data
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `data.len()` bytes out of the caller buffer
    ///
    /// Fails with `Fault` if the caller cannot provide that many bytes.
    fn read_slice(&mut self, data: &mut [u8]) -> Result<()>;

    /// Read a native-endian `i32`, the payload of the control codes
    fn read_i32(&mut self) -> Result<i32> {
        let mut raw = [0u8; core::mem::size_of::<i32>()];
        self.read_slice(&mut raw)?;
        Ok(i32::from_ne_bytes(raw))
    }
}

/// A buffer to be written to during IO
pub trait IoBufferWriter {
    /// Number of bytes the caller can receive
    fn len(&self) -> usize;

    /// Returns `true` if the caller cannot receive any data
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy `data` into the caller buffer
    ///
    /// Fails with `Fault` if the caller cannot hold all of it.
    fn write_slice(&mut self, data: &[u8]) -> Result<()>;
}

impl IoBufferReader for &[u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn read_slice(&mut self, data: &mut [u8]) -> Result<()> {
        if data.len() > <[u8]>::len(self) {
            return Err(Error::Fault);
        }
        let (head, tail) = self.split_at(data.len());
        data.copy_from_slice(head);
        *self = tail;
        Ok(())
    }
}

impl IoBufferWriter for &mut [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn write_slice(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > <[u8]>::len(self) {
            return Err(Error::Fault);
        }
        let (head, tail) = core::mem::take(self).split_at_mut(data.len());
        head.copy_from_slice(data);
        *self = tail;
        Ok(())
    }
}

/// Caller memory whose claimed length may exceed what is actually mapped
///
/// Models a `(pointer, length)` pair handed in by the caller: `len()`
/// reports the claimed length, but only `data` is readable. Copying past
/// the end of `data` faults.
#[derive(Debug, Clone, Copy)]
pub struct UserSlice<'a> {
    data: &'a [u8],
    claimed: usize,
}

impl<'a> UserSlice<'a> {
    /// Caller memory where the claimed length matches the mapping
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            claimed: data.len(),
        }
    }

    /// Caller memory claiming `claimed` bytes
    pub fn with_len(data: &'a [u8], claimed: usize) -> Self {
        Self { data, claimed }
    }
}

impl IoBufferReader for UserSlice<'_> {
    fn len(&self) -> usize {
        self.claimed
    }

    fn read_slice(&mut self, out: &mut [u8]) -> Result<()> {
        self.data.read_slice(out)?;
        self.claimed = self.claimed.saturating_sub(out.len());
        Ok(())
    }
}

/// Writable counterpart of [`UserSlice`]
#[derive(Debug)]
pub struct UserSliceMut<'a> {
    data: &'a mut [u8],
    claimed: usize,
}

impl<'a> UserSliceMut<'a> {
    /// Caller memory where the claimed length matches the mapping
    pub fn new(data: &'a mut [u8]) -> Self {
        let claimed = data.len();
        Self { data, claimed }
    }

    /// Caller memory claiming `claimed` bytes
    pub fn with_len(data: &'a mut [u8], claimed: usize) -> Self {
        Self { data, claimed }
    }
}

impl IoBufferWriter for UserSliceMut<'_> {
    fn len(&self) -> usize {
        self.claimed
    }

    fn write_slice(&mut self, src: &[u8]) -> Result<()> {
        self.data.write_slice(src)?;
        self.claimed = self.claimed.saturating_sub(src.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_reader_advances() {
        let data = [1u8, 2, 3, 4, 5];
        let mut reader: &[u8] = &data;
        let mut out = [0u8; 2];
        reader.read_slice(&mut out).unwrap();
        assert_eq!(out, [1, 2]);
        assert_eq!(IoBufferReader::len(&reader), 3);
    }

    #[test]
    fn test_slice_reader_faults_past_end() {
        let mut reader: &[u8] = &[1u8, 2];
        let mut out = [0u8; 3];
        assert_eq!(reader.read_slice(&mut out), Err(Error::Fault));
    }

    #[test]
    fn test_read_i32_native_endian() {
        let raw = 27i32.to_ne_bytes();
        let mut reader: &[u8] = &raw;
        assert_eq!(reader.read_i32().unwrap(), 27);
    }

    #[test]
    fn test_short_i32_faults() {
        let mut reader: &[u8] = &[0u8; 2];
        assert_eq!(reader.read_i32(), Err(Error::Fault));
    }

    #[test]
    fn test_slice_writer_faults_when_full() {
        let mut buf = [0u8; 2];
        let mut writer: &mut [u8] = &mut buf;
        assert_eq!(writer.write_slice(&[1, 2, 3]), Err(Error::Fault));
        writer.write_slice(&[7]).unwrap();
        assert_eq!(IoBufferWriter::len(&writer), 1);
        assert_eq!(buf, [7, 0]);
    }

    #[test]
    fn test_user_slice_overclaim() {
        let data = [0u8; 4];
        let mut reader = UserSlice::with_len(&data, 16);
        assert_eq!(reader.len(), 16);
        let mut out = [0u8; 16];
        assert_eq!(reader.read_slice(&mut out), Err(Error::Fault));
    }

    #[test]
    fn test_user_slice_mut_overclaim() {
        let mut data = [0u8; 1];
        let mut writer = UserSliceMut::with_len(&mut data, 8);
        assert_eq!(writer.len(), 8);
        assert_eq!(writer.write_slice(b"abc"), Err(Error::Fault));
    }
}
