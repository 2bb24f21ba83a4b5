//! Single SET/CLEAR control calls

use gpioctrl_core::{ControlCode, LineOutcome, OutputLine};
use gpioctrl_device::{DeviceHandle, OpenDevice};
use std::thread;
use std::time::Duration;

/// Issue one control call and print what happened to the line
pub fn apply<L: OutputLine>(
    file: &mut OpenDevice<'_, L>,
    code: ControlCode,
    pin: i32,
) -> Result<LineOutcome, Box<dyn std::error::Error>> {
    let outcome = match code {
        ControlCode::Set => file.set(pin)?,
        ControlCode::Clear => file.clear(pin)?,
    };

    match outcome {
        LineOutcome::Driven(level) => println!("GPIO {} set {}", pin, level),
        LineOutcome::Unbound => println!("GPIO {} is not bound to a hardware line", pin),
        LineOutcome::WriteFailed => println!("Error setting GPIO {} {}", pin, code.level()),
    }

    Ok(outcome)
}

/// Run the `set` / `clear` commands
///
/// The level is held for `hold` before the device is unloaded, which
/// drives every line low again.
pub fn run_control(
    handle: &DeviceHandle,
    code: ControlCode,
    pin: i32,
    hold: Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = handle.open()?;
    apply(&mut file, code, pin)?;

    if !hold.is_zero() {
        log::info!("Holding for {} ms", hold.as_millis());
        thread::sleep(hold);
    }

    file.close();
    Ok(())
}
