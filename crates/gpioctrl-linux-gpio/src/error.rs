//! Error types for the Linux GPIO backend

use thiserror::Error;

/// Linux GPIO backend errors
#[derive(Debug, Error)]
pub enum LinuxGpioError {
    /// Failed to open GPIO chip
    #[error("Failed to open GPIO chip '{path}': {source}")]
    ChipOpenFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to read chip information
    #[error("Failed to read info for GPIO chip '{path}': {source}")]
    ChipInfoFailed {
        path: String,
        #[source]
        source: gpiocdev::Error,
    },

    /// Chip node disappeared after it was opened
    #[error("GPIO chip '{0}' is no longer available")]
    ChipGone(String),

    /// Offset beyond the lines the chip provides
    #[error("GPIO line {offset} does not exist on chip with {num_lines} lines")]
    NoSuchLine { offset: u32, num_lines: u32 },

    /// Failed to request a GPIO line
    #[error("Failed to request GPIO line {offset}: {source}")]
    LineRequestFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Failed to set GPIO line value
    #[error("Failed to set GPIO line {offset}: {source}")]
    SetValueFailed {
        offset: u32,
        #[source]
        source: gpiocdev::Error,
    },

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// GPIO chip or device not specified
    #[error("No GPIO chip specified. Use dev=/dev/gpiochipN or gpiochip=N")]
    NoDevice,
}

impl From<LinuxGpioError> for gpioctrl_core::Error {
    fn from(err: LinuxGpioError) -> Self {
        use gpioctrl_core::Error;

        match err {
            LinuxGpioError::NoSuchLine { offset, .. }
            | LinuxGpioError::LineRequestFailed { offset, .. } => {
                Error::LineRequestFailed { offset }
            }
            LinuxGpioError::SetValueFailed { offset, .. } => Error::LineWriteFailed { offset },
            LinuxGpioError::InvalidParameter(_) | LinuxGpioError::NoDevice => {
                Error::InvalidConfig(err.to_string())
            }
            LinuxGpioError::ChipOpenFailed { .. }
            | LinuxGpioError::ChipInfoFailed { .. }
            | LinuxGpioError::ChipGone(_) => Error::Backend(err.to_string()),
        }
    }
}

/// Result type for Linux GPIO backend operations
pub type Result<T> = std::result::Result<T, LinuxGpioError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_errors_are_soft() {
        let err: gpioctrl_core::Error = LinuxGpioError::NoSuchLine {
            offset: 40,
            num_lines: 32,
        }
        .into();
        assert!(err.is_soft());
    }

    #[test]
    fn test_chip_errors_are_fatal() {
        let err: gpioctrl_core::Error = LinuxGpioError::ChipGone("/dev/gpiochip0".into()).into();
        assert_eq!(err.kind(), gpioctrl_core::ErrorKind::Startup);
    }
}
