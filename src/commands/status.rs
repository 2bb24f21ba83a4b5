//! Binding table report

use gpioctrl_device::DeviceHandle;

/// Print the logical-to-hardware mapping of every pin
pub fn run_status(handle: &DeviceHandle) -> Result<(), Box<dyn std::error::Error>> {
    let config = handle.config();
    let bindings = handle.bindings()?;
    let bound = bindings.iter().filter(|b| b.bound).count();

    println!("Backend:     {}", handle.backend());
    println!("Base offset: {}", config.base_offset);
    println!("Pins:        0..={} ({} bound)", config.max_index, bound);
    println!();
    println!("{:>5} {:>8}  {}", "GPIO", "Offset", "State");
    println!("{}", "-".repeat(26));

    for binding in &bindings {
        let state = if binding.bound { "bound" } else { "unavailable" };
        println!("{:>5} {:>8}  {}", binding.index, binding.offset, state);
    }

    Ok(())
}
