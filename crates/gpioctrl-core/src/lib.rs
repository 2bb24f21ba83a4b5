//! gpioctrl-core - Core of the gpioctrl GPIO control device
//!
//! This crate implements a single-client control device for a fixed range
//! of GPIO output lines. It is hardware-agnostic: backends provide lines
//! through the [`lines::LineProvider`] trait.
//!
//! # Architecture
//!
//! - [`buffer`] - fixed-capacity byte buffer with overwrite-on-write
//! - [`lines`] - logical pin index to hardware line table
//! - [`gate`] - non-blocking single-holder lock held from open to close
//! - [`control`] - SET/CLEAR control codes and their dispatcher
//! - [`device`] - the device context tying it all together
//!
//! # Example
//!
//! ```ignore
//! use gpioctrl_core::{DeviceConfig, GpioCtrl};
//!
//! let dev = GpioCtrl::load(&mut provider, DeviceConfig::default())?;
//! let mut file = dev.open()?;
//! file.set(17)?;
//! file.clear(17)?;
//! file.close();
//! dev.unload();
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod buffer;
pub mod control;
pub mod device;
pub mod error;
pub mod gate;
pub mod io_buffer;
pub mod lines;

pub use buffer::{BUFFER_CAPACITY, SEEK_CUR, SEEK_END, SEEK_SET};
pub use control::{ControlCode, LineOutcome, GPIOCTRL_IOC_CLR, GPIOCTRL_IOC_SET};
pub use device::{DeviceConfig, GpioCtrl, OpenDevice, DEVICE_NAME};
pub use error::{Error, ErrorKind, Result};
pub use lines::{Level, LineProvider, OutputLine};
