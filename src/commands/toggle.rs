//! Periodic GPIO toggling

use super::line::apply;
use gpioctrl_core::{ControlCode, OutputLine};
use gpioctrl_device::{DeviceHandle, OpenDevice};
use std::thread;
use std::time::Duration;

/// Run the toggle command
///
/// Drives `pin` high, waits `interval`, drives it low, waits again.
/// Repeats `count` times, or until the process is killed. A failing
/// control call is reported and the loop keeps going.
pub fn run_toggle(
    handle: &DeviceHandle,
    pin: i32,
    interval: Duration,
    count: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = handle.open()?;

    println!("Toggling GPIO {} every {} ms....", pin, interval.as_millis());

    let mut cycles = 0u64;
    let mut failures = 0u64;
    while count.map_or(true, |n| cycles < n) {
        failures += step(&mut file, ControlCode::Set, pin);
        thread::sleep(interval);
        failures += step(&mut file, ControlCode::Clear, pin);
        thread::sleep(interval);
        cycles += 1;
    }

    log::info!(
        "Completed {} toggle cycles ({} failed calls)",
        cycles,
        failures
    );
    file.close();
    Ok(())
}

/// One control call; returns 1 if it failed
fn step<L: OutputLine>(file: &mut OpenDevice<'_, L>, code: ControlCode, pin: i32) -> u64 {
    match apply(file, code, pin) {
        Ok(_) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}

#[cfg(all(test, feature = "dummy"))]
mod tests {
    use super::*;
    use gpioctrl_device::open_device;

    #[test]
    fn test_toggle_keeps_going_after_errors() {
        let handle = open_device("dummy").unwrap();
        let mut file = handle.open().unwrap();
        assert_eq!(step(&mut file, ControlCode::Set, 28), 1);
        assert_eq!(step(&mut file, ControlCode::Set, 27), 0);
        file.close();

        assert!(run_toggle(&handle, 28, Duration::ZERO, Some(3)).is_ok());
        assert!(run_toggle(&handle, 4, Duration::ZERO, Some(2)).is_ok());
    }
}
