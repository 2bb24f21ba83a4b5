//! Error types for gpioctrl-core
//!
//! Every failure an entry point can report maps onto one of a handful of
//! kinds (see [`ErrorKind`]) and onto the errno value a character device
//! would hand back to user space.

use thiserror::Error;

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The access gate is held by another open instance
    Busy,
    /// A copy from or to caller memory could not complete
    Fault,
    /// Malformed request: bad pin index, control code, seek or whence
    InvalidArgument,
    /// A logical pin has no usable hardware binding
    LineUnavailable,
    /// Load-time failure that aborts bringing up the device
    Startup,
}

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Device already opened by someone else
    #[error("device busy")]
    Busy,

    /// Caller memory could not be copied
    #[error("bad address")]
    Fault,

    /// Logical pin index outside `0..=max`
    #[error("GPIO {index} out of range (0..={max})")]
    PinOutOfRange {
        /// Requested index
        index: i32,
        /// Highest valid index
        max: u32,
    },

    /// Control code outside the recognized set
    #[error("unknown control code 0x{0:08x}")]
    UnknownCommand(u32),

    /// Seek result negative, beyond capacity or overflowing
    #[error("seek position out of range")]
    SeekOutOfRange,

    /// Raw whence value not one of SEEK_SET/SEEK_CUR/SEEK_END
    #[error("invalid whence {0}")]
    InvalidWhence(i32),

    /// Logical pin has a null binding
    #[error("GPIO {index} is not bound to a hardware line")]
    LineUnavailable {
        /// Logical index
        index: u32,
    },

    /// Hardware refused to hand out a line at load time
    #[error("failed to request GPIO line at offset {offset}")]
    LineRequestFailed {
        /// Hardware offset
        offset: u32,
    },

    /// Hardware refused a level change
    #[error("failed to drive GPIO line at offset {offset}")]
    LineWriteFailed {
        /// Hardware offset
        offset: u32,
    },

    /// Backend failure that makes the whole line source unusable
    #[error("backend failure: {0}")]
    Backend(String),

    /// Rejected device configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Busy => ErrorKind::Busy,
            Self::Fault => ErrorKind::Fault,
            Self::PinOutOfRange { .. }
            | Self::UnknownCommand(_)
            | Self::SeekOutOfRange
            | Self::InvalidWhence(_) => ErrorKind::InvalidArgument,
            Self::LineUnavailable { .. }
            | Self::LineRequestFailed { .. }
            | Self::LineWriteFailed { .. } => ErrorKind::LineUnavailable,
            Self::Backend(_) | Self::InvalidConfig(_) => ErrorKind::Startup,
        }
    }

    /// Per-line failures never abort the caller or the load sequence
    pub fn is_soft(&self) -> bool {
        self.kind() == ErrorKind::LineUnavailable
    }

    /// The errno a character device returns for this error
    pub fn errno(&self) -> i32 {
        match self.kind() {
            ErrorKind::Busy => libc::EBUSY,
            ErrorKind::Fault => libc::EFAULT,
            ErrorKind::InvalidArgument => libc::EINVAL,
            ErrorKind::LineUnavailable | ErrorKind::Startup => libc::ENODEV,
        }
    }
}

impl From<Error> for std::io::Error {
    fn from(err: Error) -> Self {
        let kind = match err.kind() {
            ErrorKind::Busy => std::io::ErrorKind::WouldBlock,
            ErrorKind::Fault => std::io::ErrorKind::InvalidData,
            ErrorKind::InvalidArgument => std::io::ErrorKind::InvalidInput,
            ErrorKind::LineUnavailable | ErrorKind::Startup => std::io::ErrorKind::NotFound,
        };
        std::io::Error::new(kind, err)
    }
}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
