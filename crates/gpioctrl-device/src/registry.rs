//! Backend registry and device loading
//!
//! This module opens backends by name and loads a device on top of them,
//! handing back a [`DeviceHandle`] with type-erased lines.

use crate::handle::DeviceHandle;
#[allow(unused_imports)] // Used in feature-gated code
use gpioctrl_core::lines::{BoxedLines, LineProvider};
#[allow(unused_imports)] // Used in feature-gated code
use gpioctrl_core::{DeviceConfig, GpioCtrl};
use std::collections::HashMap;

/// Parsed backend parameters
pub struct BackendParams {
    /// Backend name (as given)
    pub name: String,
    /// Key-value parameters
    pub params: HashMap<String, String>,
}

impl BackendParams {
    /// Parameters as `(key, value)` pairs for a backend's `parse_options`
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a backend string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```
/// use gpioctrl_device::parse_backend_params;
///
/// let params = parse_backend_params("linux_gpio:gpiochip=0,max=27").unwrap();
/// assert_eq!(params.name, "linux_gpio");
/// assert_eq!(params.params.get("max"), Some(&"27".to_string()));
/// ```
pub fn parse_backend_params(s: &str) -> Result<BackendParams, Box<dyn std::error::Error>> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));

    if name.is_empty() {
        return Err("Empty backend name".into());
    }

    let mut params = HashMap::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.insert(key.to_string(), value.to_string());
            } else {
                return Err(
                    format!("Invalid parameter format: '{}' (expected key=value)", opt).into(),
                );
            }
        }
    }

    Ok(BackendParams {
        name: name.to_string(),
        params,
    })
}

/// Open a backend and load the device on it
///
/// # Arguments
/// * `backend` - Backend specification (e.g., "dummy" or "linux_gpio:dev=/dev/gpiochip0")
///
/// # Example
/// ```ignore
/// let handle = open_device("linux_gpio:gpiochip=0")?;
/// let mut file = handle.open()?;
/// file.set(17)?;
/// ```
pub fn open_device(backend: &str) -> Result<DeviceHandle, Box<dyn std::error::Error>> {
    let params = parse_backend_params(backend)?;

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),

        #[cfg(feature = "linux-gpio")]
        "linux_gpio" | "linux-gpio" | "gpiochip" => open_linux_gpio(&params),

        _ => Err(format!(
            "Unknown backend: {} (available: {})",
            params.name,
            backend_names_short()
        )
        .into()),
    }
}

#[allow(dead_code)]
fn load<P>(provider: P, config: DeviceConfig) -> Result<DeviceHandle, Box<dyn std::error::Error>>
where
    P: LineProvider,
    P::Line: Send + 'static,
{
    let mut provider = BoxedLines(provider);
    let device = GpioCtrl::load(&mut provider, config)?;
    Ok(DeviceHandle::new(device, provider.name()))
}

#[cfg(feature = "dummy")]
fn parse_u32(key: &str, value: &str) -> Result<u32, String> {
    value
        .parse()
        .map_err(|_| format!("Invalid {} value: {}", key, value))
}

/// Options: `lines=N`, `base=N`, `max=N`, `unavailable=A/B/...`
#[cfg(feature = "dummy")]
fn open_dummy(params: &BackendParams) -> Result<DeviceHandle, Box<dyn std::error::Error>> {
    use gpioctrl_dummy::{DummyChip, DummyConfig};

    let mut chip_config = DummyConfig::default();
    let mut config = DeviceConfig::default();

    for (key, value) in params.options() {
        match key {
            "lines" => chip_config.num_lines = parse_u32(key, value)?,
            "base" => config.base_offset = parse_u32(key, value)?,
            "max" => config.max_index = parse_u32(key, value)?,
            "unavailable" => {
                chip_config.unavailable = value
                    .split('/')
                    .map(|v| parse_u32(key, v))
                    .collect::<Result<Vec<u32>, String>>()?;
            }
            _ => log::warn!("dummy: Unknown option: {}={}", key, value),
        }
    }

    log::info!("Using dummy GPIO chip ({} lines)", chip_config.num_lines);
    load(DummyChip::new(chip_config), config)
}

#[cfg(feature = "linux-gpio")]
fn open_linux_gpio(params: &BackendParams) -> Result<DeviceHandle, Box<dyn std::error::Error>> {
    use gpioctrl_linux_gpio::{parse_options, LinuxGpioChip};

    log::info!("Opening Linux GPIO chip...");

    let config = parse_options(&params.options())
        .map_err(|e| format!("Invalid linux_gpio parameters: {}", e))?;

    let chip = LinuxGpioChip::open(&config).map_err(|e| {
        format!(
            "Failed to open GPIO chip: {}\n\
             Make sure the device exists and you have read/write permissions.\n\
             You may need to: sudo usermod -aG gpio $USER",
            e
        )
    })?;

    load(chip, config.layout)
}

/// Information about a backend
pub struct BackendInfo {
    /// Primary name (used for matching)
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Short description
    pub description: &'static str,
}

/// Get information about all available backends (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_backends() -> Vec<BackendInfo> {
    let mut backends = Vec::new();

    #[cfg(feature = "dummy")]
    backends.push(BackendInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory GPIO chip for testing (lines=<n>,unavailable=<a/b>)",
    });

    #[cfg(feature = "linux-gpio")]
    backends.push(BackendInfo {
        name: "linux_gpio",
        aliases: &["linux-gpio", "gpiochip"],
        description: "Linux GPIO character device (dev=/dev/gpiochipN or gpiochip=N)",
    });

    backends
}

/// Generate a short list of backend names for CLI help
pub fn backend_names_short() -> String {
    let backends = available_backends();
    if backends.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = backends.iter().map(|b| b.name).collect();
    names.join(", ")
}
