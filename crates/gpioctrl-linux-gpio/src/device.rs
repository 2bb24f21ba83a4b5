//! Linux GPIO line provider
//!
//! Hands out single-line output requests on a `/dev/gpiochipN` character
//! device through gpiocdev. Each logical pin gets its own request so that
//! one busy or missing line does not take the others down with it.

use std::path::Path;

use crate::error::{LinuxGpioError, Result};

use gpiocdev::chip::Chip;
use gpiocdev::line::{Offset, Value};
use gpiocdev::request::{Config, Request};

use gpioctrl_core::lines::{Level, LineProvider, OutputLine};
use gpioctrl_core::DeviceConfig;

/// Consumer label reported to the kernel for requested lines
pub const DEFAULT_CONSUMER: &str = "gpioctrl";

/// Configuration for opening a Linux GPIO chip
#[derive(Debug, Clone)]
pub struct LinuxGpioConfig {
    /// Device path (e.g., "/dev/gpiochip0")
    pub device: String,
    /// Consumer label for line requests
    pub consumer: String,
    /// Logical pin layout on the chip
    pub layout: DeviceConfig,
}

impl Default for LinuxGpioConfig {
    fn default() -> Self {
        Self {
            device: String::new(),
            consumer: DEFAULT_CONSUMER.to_string(),
            layout: DeviceConfig::default(),
        }
    }
}

impl LinuxGpioConfig {
    /// Create a new configuration for the given chip with the default layout
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            ..Default::default()
        }
    }
}

/// An open GPIO chip acting as line provider
pub struct LinuxGpioChip {
    path: String,
    consumer: String,
    num_lines: u32,
}

impl LinuxGpioChip {
    /// Open the chip named in `config`
    ///
    /// Fails if the chip cannot be opened or queried. Individual lines are
    /// only requested later, while the device loads.
    pub fn open(config: &LinuxGpioConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxGpioError::NoDevice);
        }

        log::debug!("linux_gpio: Opening chip {}", config.device);

        let chip = Chip::from_path(&config.device).map_err(|e| LinuxGpioError::ChipOpenFailed {
            path: config.device.clone(),
            source: e,
        })?;
        let info = chip.info().map_err(|e| LinuxGpioError::ChipInfoFailed {
            path: config.device.clone(),
            source: e,
        })?;

        log::info!(
            "linux_gpio: Opened {} ({}, {} lines)",
            config.device,
            info.label,
            info.num_lines
        );

        Ok(Self {
            path: config.device.clone(),
            consumer: config.consumer.clone(),
            num_lines: info.num_lines,
        })
    }

    fn request_output(&self, offset: Offset) -> Result<LinuxGpioLine> {
        if offset >= self.num_lines {
            return Err(LinuxGpioError::NoSuchLine {
                offset,
                num_lines: self.num_lines,
            });
        }

        let mut cfg = Config::default();
        cfg.with_line(offset).as_output(Value::Inactive);

        let request = Request::from_config(cfg)
            .on_chip(&self.path)
            .with_consumer(self.consumer.as_str())
            .request()
            .map_err(|source| {
                if Path::new(&self.path).exists() {
                    LinuxGpioError::LineRequestFailed { offset, source }
                } else {
                    LinuxGpioError::ChipGone(self.path.clone())
                }
            })?;

        Ok(LinuxGpioLine { request, offset })
    }
}

impl LineProvider for LinuxGpioChip {
    type Line = LinuxGpioLine;

    fn name(&self) -> &str {
        &self.path
    }

    fn acquire_output(&mut self, offset: u32) -> gpioctrl_core::Result<LinuxGpioLine> {
        self.request_output(offset).map_err(|e| {
            log::debug!("linux_gpio: {}", e);
            e.into()
        })
    }
}

/// One requested output line
///
/// The kernel releases the line when the request is dropped.
pub struct LinuxGpioLine {
    request: Request,
    offset: Offset,
}

impl OutputLine for LinuxGpioLine {
    fn set_level(&mut self, level: Level) -> gpioctrl_core::Result<()> {
        let value = match level {
            Level::High => Value::Active,
            Level::Low => Value::Inactive,
        };
        self.request
            .set_value(self.offset, value)
            .map(|_| ())
            .map_err(|source| {
                let err = LinuxGpioError::SetValueFailed {
                    offset: self.offset,
                    source,
                };
                log::error!("{}", err);
                err.into()
            })
    }
}

/// Parse backend options from a list of key-value pairs
///
/// # Supported Options
///
/// - `dev=/dev/gpiochipN` - GPIO chip device path (required, or use gpiochip)
/// - `gpiochip=N` - GPIO chip number (alternative to dev)
/// - `base=N` - chip offset of logical pin 0 (default 0)
/// - `max=N` - highest logical pin index (default 27)
/// - `consumer=NAME` - consumer label for the line requests
pub fn parse_options(options: &[(&str, &str)]) -> Result<LinuxGpioConfig> {
    let mut config = LinuxGpioConfig::default();
    let mut gpiochip: Option<u32> = None;

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "gpiochip" => {
                gpiochip = Some(
                    value
                        .parse()
                        .map_err(|_| invalid(format!("Invalid gpiochip value: {}", value)))?,
                );
            }
            "base" => {
                config.layout.base_offset = value
                    .parse()
                    .map_err(|_| invalid(format!("Invalid base value: {}", value)))?;
            }
            "max" => {
                config.layout.max_index = value
                    .parse()
                    .map_err(|_| invalid(format!("Invalid max value: {}", value)))?;
            }
            "consumer" => {
                if value.is_empty() {
                    return Err(invalid("consumer must not be empty"));
                }
                config.consumer = value.to_string();
            }
            _ => {
                log::warn!("linux_gpio: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        if let Some(n) = gpiochip {
            config.device = format!("/dev/gpiochip{}", n);
        } else {
            return Err(LinuxGpioError::NoDevice);
        }
    } else if gpiochip.is_some() {
        return Err(invalid("Only one of 'dev' or 'gpiochip' can be specified"));
    }

    config.layout.validate().map_err(|e| invalid(e.to_string()))?;

    Ok(config)
}

fn invalid(msg: impl Into<String>) -> LinuxGpioError {
    LinuxGpioError::InvalidParameter(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dev() {
        let config = parse_options(&[("dev", "/dev/gpiochip0")]).unwrap();
        assert_eq!(config.device, "/dev/gpiochip0");
        assert_eq!(config.layout, DeviceConfig::default());
        assert_eq!(config.consumer, DEFAULT_CONSUMER);
    }

    #[test]
    fn test_parse_gpiochip_and_layout() {
        let config =
            parse_options(&[("gpiochip", "1"), ("base", "4"), ("max", "7"), ("consumer", "x")])
                .unwrap();
        assert_eq!(config.device, "/dev/gpiochip1");
        assert_eq!(config.layout.base_offset, 4);
        assert_eq!(config.layout.max_index, 7);
        assert_eq!(config.consumer, "x");
    }

    #[test]
    fn test_parse_requires_chip() {
        assert!(matches!(
            parse_options(&[("max", "3")]),
            Err(LinuxGpioError::NoDevice)
        ));
        assert!(matches!(
            parse_options(&[("dev", "/dev/gpiochip0"), ("gpiochip", "0")]),
            Err(LinuxGpioError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_parse_rejects_bad_values() {
        for opts in [
            &[("dev", "/dev/gpiochip0"), ("max", "many")],
            &[("dev", "/dev/gpiochip0"), ("max", "64")],
            &[("dev", "/dev/gpiochip0"), ("consumer", "")],
        ] {
            match parse_options(opts) {
                Err(err @ LinuxGpioError::InvalidParameter(_)) => {
                    let core: gpioctrl_core::Error = err.into();
                    assert_eq!(core.kind(), gpioctrl_core::ErrorKind::Startup);
                }
                other => panic!("expected InvalidParameter, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_open_without_device() {
        assert!(matches!(
            LinuxGpioChip::open(&LinuxGpioConfig::default()),
            Err(LinuxGpioError::NoDevice)
        ));
    }
}
