//! gpioctrl - Single-client GPIO output control
//!
//! Loads the gpioctrl device on a GPIO backend, opens it, and drives
//! individual output pins through the SET/CLEAR control codes.
//!
//! # Architecture
//!
//! The binary only ever sees a `DeviceHandle` from gpioctrl-device. The
//! backend (Linux GPIO character device or the in-memory dummy chip) is
//! chosen at runtime with `--backend name:key=value,...`.
//!
//! Unloading the device when the process exits forces every line low, so
//! `set` only holds its level for the `--hold-ms` window.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use gpioctrl_core::ControlCode;
use gpioctrl_device::open_device;
use std::time::Duration;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Toggle {
            pin,
            interval_ms,
            count,
        } => {
            let handle = open_device(&cli.backend)?;
            commands::toggle::run_toggle(&handle, pin, Duration::from_millis(interval_ms), count)
        }
        Commands::Set { pin, hold_ms } => {
            let handle = open_device(&cli.backend)?;
            commands::line::run_control(
                &handle,
                ControlCode::Set,
                pin,
                Duration::from_millis(hold_ms),
            )
        }
        Commands::Clear { pin, hold_ms } => {
            let handle = open_device(&cli.backend)?;
            commands::line::run_control(
                &handle,
                ControlCode::Clear,
                pin,
                Duration::from_millis(hold_ms),
            )
        }
        Commands::Status => {
            let handle = open_device(&cli.backend)?;
            commands::status::run_status(&handle)
        }
        Commands::Loopback { text } => {
            let handle = open_device(&cli.backend)?;
            commands::loopback::run_loopback(&handle, &text)
        }
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
    }
}
