//! List commands implementation

use gpioctrl_device::available_backends;

/// List all compiled-in backends
pub fn list_backends() {
    println!("Supported backends:");
    println!();

    for backend in available_backends() {
        let aliases = if backend.aliases.is_empty() {
            String::new()
        } else {
            format!(" (aliases: {})", backend.aliases.join(", "))
        };
        println!("  {:<11} - {}{}", backend.name, backend.description, aliases);
    }
}
