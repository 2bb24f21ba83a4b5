//! Buffer store loopback

use gpioctrl_core::BUFFER_CAPACITY;
use gpioctrl_device::DeviceHandle;
use std::io::{Read, SeekFrom};

/// Run the loopback command
///
/// Writes `text` into the device buffer, rewinds and reads it back.
/// Input past the buffer capacity is dropped by the device.
pub fn run_loopback(handle: &DeviceHandle, text: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = handle.open()?;

    let mut src = text.as_bytes();
    let written = file.write(&mut src)?;
    if written < text.len() {
        println!(
            "Stored {} of {} bytes (buffer holds {})",
            written,
            text.len(),
            BUFFER_CAPACITY
        );
    } else {
        println!("Stored {} bytes", written);
    }

    file.seek(SeekFrom::Start(0))?;
    let mut readback = Vec::with_capacity(written);
    file.read_to_end(&mut readback)?;

    println!("Read back: {}", String::from_utf8_lossy(&readback));
    file.close();
    Ok(())
}
