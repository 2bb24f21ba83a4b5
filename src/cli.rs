//! CLI argument parsing

use clap::{Parser, Subcommand};
use gpioctrl_device::backend_names_short;

/// Default GPIO toggle period, matching the classic 2 s blink
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

/// Default time `set`/`clear` keep their level before the device unloads
pub const DEFAULT_HOLD_MS: u64 = 2000;

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Backend providing the GPIO lines [available: {}]",
        backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "gpioctrl")]
#[command(author, version, about = "Single-client GPIO output control device", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(
        short,
        long,
        global = true,
        default_value = "linux_gpio:gpiochip=0",
        help = backend_help()
    )]
    pub backend: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Toggle a GPIO high and low forever (or --count times)
    Toggle {
        /// Logical GPIO number
        #[arg(allow_negative_numbers = true)]
        pin: i32,

        /// Delay between level changes in milliseconds
        #[arg(short, long, default_value_t = DEFAULT_INTERVAL_MS)]
        interval_ms: u64,

        /// Number of high/low cycles (unbounded if omitted)
        #[arg(short, long)]
        count: Option<u64>,
    },

    /// Drive a GPIO high for the hold window (unloading drives it low again)
    Set {
        /// Logical GPIO number
        #[arg(allow_negative_numbers = true)]
        pin: i32,

        /// Keep the level for this many milliseconds before unloading
        #[arg(long, default_value_t = DEFAULT_HOLD_MS)]
        hold_ms: u64,
    },

    /// Drive a GPIO low for the hold window
    Clear {
        /// Logical GPIO number
        #[arg(allow_negative_numbers = true)]
        pin: i32,

        /// Keep the level for this many milliseconds before unloading
        #[arg(long, default_value_t = DEFAULT_HOLD_MS)]
        hold_ms: u64,
    },

    /// Show which logical GPIOs are bound to hardware lines
    Status,

    /// Write text into the device buffer and read it back
    Loopback {
        /// Text to store
        text: String,
    },

    /// List compiled-in backends
    ListBackends,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_holds_by_default() {
        let cli = Cli::try_parse_from(["gpioctrl", "set", "17"]).unwrap();
        match cli.command {
            Commands::Set { pin, hold_ms } => {
                assert_eq!(pin, 17);
                assert_eq!(hold_ms, DEFAULT_HOLD_MS);
                assert!(hold_ms > 0);
            }
            _ => panic!("expected set"),
        }
    }

    #[test]
    fn test_clear_hold_override() {
        let cli =
            Cli::try_parse_from(["gpioctrl", "-b", "dummy", "clear", "3", "--hold-ms", "0"]).unwrap();
        assert_eq!(cli.backend, "dummy");
        assert!(matches!(
            cli.command,
            Commands::Clear { pin: 3, hold_ms: 0 }
        ));
    }
}
