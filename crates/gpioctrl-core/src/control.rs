//! Control codes and the control dispatcher
//!
//! Two codes drive a single output pin: [`ControlCode::Set`] and
//! [`ControlCode::Clear`]. Both carry a native `i32` pin index in caller
//! memory and are numbered like Linux `_IOW('g', nr, int)` ioctls.

use crate::error::{Error, Result};
use crate::io_buffer::IoBufferReader;
use crate::lines::{Level, LineTable, OutputLine};

const IOC_NRBITS: u32 = 8;
const IOC_TYPEBITS: u32 = 8;
const IOC_SIZEBITS: u32 = 14;

const IOC_NRSHIFT: u32 = 0;
const IOC_TYPESHIFT: u32 = IOC_NRSHIFT + IOC_NRBITS;
const IOC_SIZESHIFT: u32 = IOC_TYPESHIFT + IOC_TYPEBITS;
const IOC_DIRSHIFT: u32 = IOC_SIZESHIFT + IOC_SIZEBITS;

const IOC_WRITE: u32 = 1;

/// Encode an `_IOW(ty, nr, size)` request number
pub const fn iow(ty: u8, nr: u8, size: usize) -> u32 {
    (IOC_WRITE << IOC_DIRSHIFT)
        | ((size as u32) << IOC_SIZESHIFT)
        | ((ty as u32) << IOC_TYPESHIFT)
        | ((nr as u32) << IOC_NRSHIFT)
}

/// Magic type byte shared by all gpioctrl control codes
pub const GPIOCTRL_IOC_MAGIC: u8 = b'g';

/// Raw value of the SET control code
pub const GPIOCTRL_IOC_SET: u32 = iow(GPIOCTRL_IOC_MAGIC, 1, core::mem::size_of::<i32>());

/// Raw value of the CLEAR control code
pub const GPIOCTRL_IOC_CLR: u32 = iow(GPIOCTRL_IOC_MAGIC, 2, core::mem::size_of::<i32>());

/// Recognized control codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCode {
    /// Drive the pin high
    Set,
    /// Drive the pin low
    Clear,
}

impl ControlCode {
    /// Decode a raw request number
    pub fn from_raw(cmd: u32) -> Option<Self> {
        match cmd {
            GPIOCTRL_IOC_SET => Some(Self::Set),
            GPIOCTRL_IOC_CLR => Some(Self::Clear),
            _ => None,
        }
    }

    /// Raw request number
    pub fn raw(self) -> u32 {
        match self {
            Self::Set => GPIOCTRL_IOC_SET,
            Self::Clear => GPIOCTRL_IOC_CLR,
        }
    }

    /// Level the code drives its pin to
    pub fn level(self) -> Level {
        match self {
            Self::Set => Level::High,
            Self::Clear => Level::Low,
        }
    }
}

/// What happened to the line after a successful control call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    /// The line now sits at this level
    Driven(Level),
    /// No hardware handle is bound to the index; nothing changed
    Unbound,
    /// The hardware rejected the level change
    WriteFailed,
}

/// Run one control call against the line table
///
/// The pin index is copied and range-checked before the code is decoded,
/// so a bad index is reported even for an unknown code. Missing or
/// failing lines are logged and reported through [`LineOutcome`] rather
/// than as errors.
pub fn dispatch<L: OutputLine>(
    lines: &mut LineTable<L>,
    cmd: u32,
    arg: &mut impl IoBufferReader,
) -> Result<LineOutcome> {
    let index = arg.read_i32().inspect_err(|_| {
        log::error!("copy of GPIO index from caller failed");
    })?;

    let max = lines.max_index();
    if index < 0 || index as u32 > max {
        log::info!("GPIO Nr {} out of range", index);
        return Err(Error::PinOutOfRange { index, max });
    }

    let code = ControlCode::from_raw(cmd).ok_or(Error::UnknownCommand(cmd))?;
    let level = code.level();

    match lines.set_line(index, level) {
        Ok(()) => {
            log::info!("GPIO {} set {}", index, level);
            Ok(LineOutcome::Driven(level))
        }
        Err(Error::LineUnavailable { .. }) => {
            log::warn!("Error setting GPIO {} {}: no line bound", index, level);
            Ok(LineOutcome::Unbound)
        }
        Err(e) if e.is_soft() => {
            log::warn!("Error setting GPIO {} {}: {}", index, level, e);
            Ok(LineOutcome::WriteFailed)
        }
        Err(e) => Err(e),
    }
}
