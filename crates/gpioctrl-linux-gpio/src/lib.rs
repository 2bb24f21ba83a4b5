//! gpioctrl-linux-gpio - Linux GPIO character device backend
//!
//! This crate provides the hardware lines for gpioctrl using the Linux
//! GPIO character device interface through the gpiocdev crate, the modern
//! replacement for the deprecated sysfs interface.
//!
//! # Example
//!
//! ```no_run
//! use gpioctrl_core::GpioCtrl;
//! use gpioctrl_linux_gpio::{LinuxGpioChip, LinuxGpioConfig};
//!
//! let config = LinuxGpioConfig::new("/dev/gpiochip0");
//! let mut chip = LinuxGpioChip::open(&config)?;
//! let dev = GpioCtrl::load(&mut chip, config.layout.clone())?;
//!
//! let mut file = dev.open()?;
//! file.set(17)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with gpioctrl CLI
//!
//! ```bash
//! # Toggle GPIO 17 on the Raspberry Pi header chip
//! gpioctrl -b linux_gpio:dev=/dev/gpiochip0 toggle 17
//!
//! # Using gpiochip number and a smaller pin range
//! gpioctrl -b linux_gpio:gpiochip=0,max=7 status
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel 4.8+ with GPIO character device support (kernel 5.5+ for v2 API)
//! - Access to `/dev/gpiochipN` devices (may require root or udev rules)

pub mod device;
pub mod error;

// Re-exports
pub use device::{parse_options, LinuxGpioChip, LinuxGpioConfig, LinuxGpioLine};
pub use error::{LinuxGpioError, Result};
