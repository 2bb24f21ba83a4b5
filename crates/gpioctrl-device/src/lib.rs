//! Backend-independent device loading
//!
//! This crate opens a GPIO backend by name and loads a gpioctrl device on
//! it. The CLI should only interact with types from this crate and
//! gpioctrl-core, never directly with a backend crate.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       CLI (bin/gpioctrl)                     │
//! │  - Only imports gpioctrl-device and gpioctrl-core            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   gpioctrl-device (this crate)               │
//! │  - DeviceHandle: loaded device with type-erased lines        │
//! │  - Backend registry: opens backends by name                  │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!              ┌───────────────┴───────────────┐
//!              ▼                               ▼
//! ┌──────────────────────────┐   ┌──────────────────────────┐
//! │    gpioctrl-core         │   │  Backend crates          │
//! │  - GpioCtrl / OpenDevice │   │  - dummy, linux-gpio     │
//! │  - LineProvider trait    │   │  - Implement LineProvider│
//! └──────────────────────────┘   └──────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gpioctrl_device::open_device;
//!
//! let handle = open_device("linux_gpio:gpiochip=0")?;
//! let mut file = handle.open()?;
//! file.set(17)?;
//! ```

mod handle;
mod registry;

pub use handle::DeviceHandle;
pub use registry::{
    available_backends, backend_names_short, open_device, parse_backend_params, BackendInfo,
    BackendParams,
};

// Re-export core types that CLI needs
pub use gpioctrl_core::lines::{Binding, DynLine};
pub use gpioctrl_core::{LineOutcome, OpenDevice};
