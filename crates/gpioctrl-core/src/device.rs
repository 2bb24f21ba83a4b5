//! Device context and open instances
//!
//! [`GpioCtrl`] owns everything the device needs: the buffer store, the
//! line table and the access gate around both. It is created by
//! [`GpioCtrl::load`] and torn down by [`GpioCtrl::unload`] (or drop).
//! All I/O happens through an [`OpenDevice`], which holds the gate for as
//! long as it lives.

use std::io::{self, SeekFrom};

use crate::buffer::{seek_from_whence, BufferStore};
use crate::control::{self, ControlCode, LineOutcome};
use crate::error::{Error, Result};
use crate::gate::{AccessGate, GateGuard, GateState};
use crate::io_buffer::{IoBufferReader, IoBufferWriter, UserSlice};
use crate::lines::{Binding, LineProvider, LineTable, OutputLine};

/// Symbolic device name
pub const DEVICE_NAME: &str = "gpioctrl";

/// Upper bound on the number of logical pins
pub const MAX_LINES: u32 = 64;

/// Highest logical pin index on the Raspberry Pi 40-pin header
pub const DEFAULT_MAX_INDEX: u32 = 27;

/// Device configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Hardware offset of logical pin 0
    pub base_offset: u32,
    /// Highest logical pin index
    pub max_index: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            base_offset: 0,
            max_index: DEFAULT_MAX_INDEX,
        }
    }
}

impl DeviceConfig {
    /// Set the hardware offset of logical pin 0
    pub fn with_base_offset(mut self, base_offset: u32) -> Self {
        self.base_offset = base_offset;
        self
    }

    /// Set the highest logical pin index
    pub fn with_max_index(mut self, max_index: u32) -> Self {
        self.max_index = max_index;
        self
    }

    /// Check the configuration before any resource is acquired
    pub fn validate(&self) -> Result<()> {
        if self.max_index >= MAX_LINES {
            return Err(Error::InvalidConfig(format!(
                "max index {} exceeds supported maximum {}",
                self.max_index,
                MAX_LINES - 1
            )));
        }
        if self.base_offset.checked_add(self.max_index).is_none() {
            return Err(Error::InvalidConfig(format!(
                "base offset {} + max index {} overflows",
                self.base_offset, self.max_index
            )));
        }
        Ok(())
    }
}

struct DeviceState<L: OutputLine> {
    buffer: BufferStore,
    lines: LineTable<L>,
}

/// The device context
pub struct GpioCtrl<L: OutputLine> {
    config: DeviceConfig,
    gate: AccessGate<DeviceState<L>>,
}

impl<L: OutputLine> GpioCtrl<L> {
    /// Bring the device up
    ///
    /// Allocates the buffer and probes every line in the configured range.
    /// Lines that cannot be acquired stay unbound; only configuration
    /// errors and fatal provider errors fail the load.
    pub fn load<P>(provider: &mut P, config: DeviceConfig) -> Result<Self>
    where
        P: LineProvider<Line = L>,
    {
        config.validate()?;

        let buffer = BufferStore::new();
        let lines = LineTable::probe(provider, config.base_offset, config.max_index)?;

        log::info!(
            "{}: device loaded on {} ({}/{} lines bound)",
            DEVICE_NAME,
            provider.name(),
            lines.bound_count(),
            lines.pin_count()
        );

        Ok(Self {
            config,
            gate: AccessGate::new(DeviceState { buffer, lines }),
        })
    }

    /// Configuration the device was loaded with
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Open the device
    ///
    /// Fails with `Busy` without waiting if another instance is open.
    pub fn open(&self) -> Result<OpenDevice<'_, L>> {
        let state = self.gate.try_acquire().inspect_err(|_| {
            log::info!("{}: multiple openings not possible", DEVICE_NAME);
        })?;
        log::debug!("{}: opened", DEVICE_NAME);
        Ok(OpenDevice { state, pos: 0 })
    }

    /// Whether an instance currently holds the device
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Binding table snapshot; needs the gate like every other access
    pub fn bindings(&self) -> Result<Vec<Binding>> {
        let state = self.gate.try_acquire()?;
        Ok(state.lines.bindings())
    }

    /// Tear the device down, forcing every bound line low first
    pub fn unload(self) {
        drop(self);
    }
}

impl<L: OutputLine> Drop for GpioCtrl<L> {
    fn drop(&mut self) {
        // Exclusive access: no OpenDevice can outlive the borrow of self.
        match self.gate.try_acquire() {
            Ok(mut state) => state.lines.teardown(),
            Err(e) => log::error!("{}: teardown could not take the gate: {}", DEVICE_NAME, e),
        }
        log::info!("{}: device unloaded", DEVICE_NAME);
    }
}

/// An open instance of the device
///
/// Holds the access gate until closed or dropped, and carries the
/// position cursor used by read and seek.
pub struct OpenDevice<'a, L: OutputLine> {
    state: GateGuard<'a, DeviceState<L>>,
    pos: u64,
}

impl<L: OutputLine> OpenDevice<'_, L> {
    /// Current cursor position
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Number of valid bytes in the buffer
    pub fn data_len(&self) -> usize {
        self.state.buffer.len()
    }

    /// Store caller data, replacing the buffer contents
    ///
    /// Returns the number of bytes stored, at most the buffer capacity.
    /// The cursor moves to the end of the stored data.
    pub fn write(&mut self, src: &mut impl IoBufferReader) -> Result<usize> {
        let written = self.state.buffer.write(src)?;
        self.pos = written as u64;
        log::debug!("{}: wrote {} bytes", DEVICE_NAME, written);
        Ok(written)
    }

    /// Copy buffered data from the cursor into caller memory
    ///
    /// Returns 0 at end of data.
    pub fn read(&mut self, dst: &mut impl IoBufferWriter) -> Result<usize> {
        let read = self.state.buffer.read(self.pos, dst)?;
        self.pos += read as u64;
        Ok(read)
    }

    /// Reposition the cursor
    pub fn seek(&mut self, target: SeekFrom) -> Result<u64> {
        self.pos = self.state.buffer.seek(self.pos, target)?;
        Ok(self.pos)
    }

    /// Reposition the cursor from a raw `(offset, whence)` pair
    pub fn llseek(&mut self, offset: i64, whence: i32) -> Result<u64> {
        self.seek(seek_from_whence(offset, whence)?)
    }

    /// Issue a raw control call
    pub fn ioctl(&mut self, cmd: u32, arg: &mut impl IoBufferReader) -> Result<LineOutcome> {
        control::dispatch(&mut self.state.lines, cmd, arg)
    }

    /// Drive logical pin `index` high
    pub fn set(&mut self, index: i32) -> Result<LineOutcome> {
        self.control(ControlCode::Set, index)
    }

    /// Drive logical pin `index` low
    pub fn clear(&mut self, index: i32) -> Result<LineOutcome> {
        self.control(ControlCode::Clear, index)
    }

    fn control(&mut self, code: ControlCode, index: i32) -> Result<LineOutcome> {
        let raw = index.to_ne_bytes();
        self.ioctl(code.raw(), &mut UserSlice::new(&raw))
    }

    /// Close the instance and release the gate
    pub fn close(self) {
        drop(self);
    }
}

impl<L: OutputLine> Drop for OpenDevice<'_, L> {
    fn drop(&mut self) {
        log::debug!("{}: released", DEVICE_NAME);
    }
}

impl<L: OutputLine> io::Read for OpenDevice<'_, L> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut dst = buf;
        Ok(OpenDevice::read(self, &mut dst)?)
    }
}

impl<L: OutputLine> io::Write for OpenDevice<'_, L> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut src = buf;
        Ok(OpenDevice::write(self, &mut src)?)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<L: OutputLine> io::Seek for OpenDevice<'_, L> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        Ok(OpenDevice::seek(self, pos)?)
    }
}
