//! CLI command implementations
//!
//! Every command works on a [`gpioctrl_device::DeviceHandle`], so none of
//! them know which backend provides the lines.
//!
//! ## Line commands
//!
//! `toggle`, `set` and `clear` go through the SET/CLEAR control codes and
//! report the [`gpioctrl_core::LineOutcome`] of each call. An unbound or
//! failing line is printed, not treated as an error.

pub mod line;
mod list;
pub mod loopback;
pub mod status;
pub mod toggle;

pub use list::list_backends;
