//! Buffer store
//!
//! A fixed-capacity byte buffer with a tracked valid length. Writes always
//! start at offset 0 and replace whatever was there; reads and seeks work
//! against a cursor owned by the caller (the open instance).

use std::io::SeekFrom;

use crate::error::{Error, Result};
use crate::io_buffer::{IoBufferReader, IoBufferWriter};

/// Size of the internal buffer in bytes
pub const BUFFER_CAPACITY: usize = 256;

/// Raw whence values accepted by [`seek_from_whence`]
pub const SEEK_SET: i32 = 0;
/// See [`SEEK_SET`]
pub const SEEK_CUR: i32 = 1;
/// See [`SEEK_SET`]
pub const SEEK_END: i32 = 2;

/// Translate a raw `(offset, whence)` pair into a [`SeekFrom`]
///
/// A negative absolute offset can never be a valid position and is
/// rejected here as out of range.
pub fn seek_from_whence(offset: i64, whence: i32) -> Result<SeekFrom> {
    match whence {
        SEEK_SET => u64::try_from(offset)
            .map(SeekFrom::Start)
            .map_err(|_| Error::SeekOutOfRange),
        SEEK_CUR => Ok(SeekFrom::Current(offset)),
        SEEK_END => Ok(SeekFrom::End(offset)),
        other => Err(Error::InvalidWhence(other)),
    }
}

/// Fixed-capacity buffer with overwrite-on-write semantics
pub struct BufferStore {
    data: Box<[u8; BUFFER_CAPACITY]>,
    len: usize,
}

impl BufferStore {
    /// Allocate a zeroed, empty buffer
    pub fn new() -> Self {
        Self {
            data: Box::new([0u8; BUFFER_CAPACITY]),
            len: 0,
        }
    }

    /// Total capacity in bytes
    pub fn capacity(&self) -> usize {
        BUFFER_CAPACITY
    }

    /// Number of valid bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the buffer holds no valid data
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid portion of the buffer
    pub fn contents(&self) -> &[u8] {
        &self.data[..self.len]
    }

    /// Replace the buffer contents from caller memory
    ///
    /// Copies `min(src.len(), capacity)` bytes starting at offset 0 and
    /// returns the count. Requests longer than the capacity are truncated
    /// and logged at debug level. On a fault nothing is committed.
    pub fn write(&mut self, src: &mut impl IoBufferReader) -> Result<usize> {
        let requested = src.len();
        let to_copy = requested.min(BUFFER_CAPACITY);

        let mut staged = [0u8; BUFFER_CAPACITY];
        src.read_slice(&mut staged[..to_copy])?;

        if requested > to_copy {
            log::debug!(
                "buffer: truncating {} byte write to {} bytes",
                requested,
                to_copy
            );
        }

        self.data[..to_copy].copy_from_slice(&staged[..to_copy]);
        self.len = to_copy;
        Ok(to_copy)
    }

    /// Copy valid bytes starting at `pos` into caller memory
    ///
    /// Returns 0 once `pos` reaches the valid length. The caller advances
    /// its cursor by the returned count.
    pub fn read(&self, pos: u64, dst: &mut impl IoBufferWriter) -> Result<usize> {
        let pos = match usize::try_from(pos) {
            Ok(pos) if pos < self.len => pos,
            _ => return Ok(0),
        };

        let to_copy = (self.len - pos).min(dst.len());
        if to_copy == 0 {
            return Ok(0);
        }

        dst.write_slice(&self.data[pos..pos + to_copy])?;
        Ok(to_copy)
    }

    /// Compute a new cursor position
    ///
    /// `End` is relative to the valid length, not the capacity. Results
    /// below zero or beyond the capacity are rejected; the caller commits
    /// the returned position.
    pub fn seek(&self, pos: u64, target: SeekFrom) -> Result<u64> {
        let new_pos = match target {
            SeekFrom::Start(offset) => i128::from(offset),
            SeekFrom::Current(offset) => i128::from(pos) + i128::from(offset),
            SeekFrom::End(offset) => self.len as i128 + i128::from(offset),
        };

        if new_pos < 0 || new_pos > BUFFER_CAPACITY as i128 {
            return Err(Error::SeekOutOfRange);
        }
        Ok(new_pos as u64)
    }
}

impl Default for BufferStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_buffer::{UserSlice, UserSliceMut};
    use std::cell::RefCell;
    use std::sync::Once;

    thread_local! {
        static CAPTURED: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
    }

    /// Records messages logged on the current test thread
    struct CaptureLogger;

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            CAPTURED.with(|c| c.borrow_mut().push(record.args().to_string()));
        }

        fn flush(&self) {}
    }

    fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, Vec<String>) {
        static INIT: Once = Once::new();
        INIT.call_once(|| {
            let _ = log::set_logger(&CaptureLogger);
            log::set_max_level(log::LevelFilter::Trace);
        });
        CAPTURED.with(|c| c.borrow_mut().clear());
        let result = f();
        (result, CAPTURED.with(|c| c.borrow_mut().drain(..).collect()))
    }

    fn write(buf: &mut BufferStore, data: &[u8]) -> usize {
        buf.write(&mut UserSlice::new(data)).unwrap()
    }

    fn read(buf: &BufferStore, pos: u64, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        let n = buf.read(pos, &mut out.as_mut_slice()).unwrap();
        out.truncate(n);
        out
    }

    #[test]
    fn test_write_then_read() {
        let mut buf = BufferStore::new();
        assert_eq!(write(&mut buf, b"hello"), 5);
        assert_eq!(read(&buf, 0, 10), b"hello");
        assert!(read(&buf, 5, 10).is_empty());
    }

    #[test]
    fn test_overwrite_from_start() {
        let mut buf = BufferStore::new();
        write(&mut buf, b"hello");
        write(&mut buf, b"hi");
        assert_eq!(buf.len(), 2);
        assert_eq!(read(&buf, 0, 10), b"hi");
    }

    #[test]
    fn test_write_truncates_to_capacity() {
        let mut buf = BufferStore::new();
        let data = vec![0xA5u8; BUFFER_CAPACITY + 44];
        assert_eq!(write(&mut buf, &data), BUFFER_CAPACITY);
        assert_eq!(buf.len(), BUFFER_CAPACITY);
    }

    #[test]
    fn test_truncated_write_is_logged() {
        let mut buf = BufferStore::new();

        let (written, logs) = capture_logs(|| write(&mut buf, &[b'x'; 300]));
        assert_eq!(written, BUFFER_CAPACITY);
        let truncations: Vec<&String> = logs.iter().filter(|m| m.contains("truncating")).collect();
        assert_eq!(truncations.len(), 1);
        assert!(truncations[0].contains("300 byte write to 256 bytes"));

        let (_, logs) = capture_logs(|| write(&mut buf, &[b'y'; BUFFER_CAPACITY]));
        assert!(!logs.iter().any(|m| m.contains("truncating")));
    }

    #[test]
    fn test_partial_read() {
        let mut buf = BufferStore::new();
        write(&mut buf, b"abcdef");
        assert_eq!(read(&buf, 2, 3), b"cde");
        assert_eq!(read(&buf, 4, 10), b"ef");
    }

    #[test]
    fn test_write_fault_commits_nothing() {
        let mut buf = BufferStore::new();
        write(&mut buf, b"keep");
        let short = [1u8; 3];
        let err = buf.write(&mut UserSlice::with_len(&short, 10)).unwrap_err();
        assert_eq!(err, Error::Fault);
        assert_eq!(buf.contents(), b"keep");
    }

    #[test]
    fn test_read_fault() {
        let mut buf = BufferStore::new();
        write(&mut buf, b"hello");
        let mut small = [0u8; 2];
        let err = buf
            .read(0, &mut UserSliceMut::with_len(&mut small, 5))
            .unwrap_err();
        assert_eq!(err, Error::Fault);
    }

    #[test]
    fn test_seek_modes() {
        let mut buf = BufferStore::new();
        write(&mut buf, b"hello");
        assert_eq!(buf.seek(3, SeekFrom::End(0)).unwrap(), 5);
        assert_eq!(buf.seek(3, SeekFrom::Current(-2)).unwrap(), 1);
        assert_eq!(buf.seek(3, SeekFrom::Start(200)).unwrap(), 200);
        assert_eq!(
            buf.seek(0, SeekFrom::Start(BUFFER_CAPACITY as u64)).unwrap(),
            BUFFER_CAPACITY as u64
        );
    }

    #[test]
    fn test_seek_out_of_range() {
        let buf = BufferStore::new();
        assert_eq!(buf.seek(0, SeekFrom::Current(-1)), Err(Error::SeekOutOfRange));
        assert_eq!(
            buf.seek(0, SeekFrom::Start(BUFFER_CAPACITY as u64 + 1)),
            Err(Error::SeekOutOfRange)
        );
        assert_eq!(
            buf.seek(u64::MAX, SeekFrom::Current(i64::MAX)),
            Err(Error::SeekOutOfRange)
        );
    }

    #[test]
    fn test_seek_from_whence() {
        assert_eq!(seek_from_whence(4, SEEK_SET).unwrap(), SeekFrom::Start(4));
        assert_eq!(seek_from_whence(-4, SEEK_CUR).unwrap(), SeekFrom::Current(-4));
        assert_eq!(seek_from_whence(0, SEEK_END).unwrap(), SeekFrom::End(0));
        assert_eq!(seek_from_whence(-1, SEEK_SET), Err(Error::SeekOutOfRange));
        assert_eq!(seek_from_whence(0, 9), Err(Error::InvalidWhence(9)));
    }
}
