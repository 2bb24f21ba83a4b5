//! DeviceHandle - a loaded device plus the backend it runs on

use gpioctrl_core::lines::{Binding, DynLine};
use gpioctrl_core::{DeviceConfig, GpioCtrl, OpenDevice};

/// Loaded gpioctrl device with type-erased lines
///
/// The CLI works only with this type and never needs to know which
/// backend provides the lines. Dropping the handle unloads the device.
pub struct DeviceHandle {
    device: GpioCtrl<DynLine>,
    backend: String,
}

impl DeviceHandle {
    pub(crate) fn new(device: GpioCtrl<DynLine>, backend: impl Into<String>) -> Self {
        Self {
            device,
            backend: backend.into(),
        }
    }

    /// Name of the backend providing the lines
    pub fn backend(&self) -> &str {
        &self.backend
    }

    /// Configuration the device was loaded with
    pub fn config(&self) -> &DeviceConfig {
        self.device.config()
    }

    /// Open the device (fails with `Busy` if already open)
    pub fn open(&self) -> gpioctrl_core::Result<OpenDevice<'_, DynLine>> {
        self.device.open()
    }

    /// Binding table snapshot
    pub fn bindings(&self) -> gpioctrl_core::Result<Vec<Binding>> {
        self.device.bindings()
    }

    /// Unload the device, forcing all lines low
    pub fn unload(self) {
        log::debug!("unloading device on {}", self.backend);
        self.device.unload();
    }
}
