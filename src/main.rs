//! dutyctl - remote PWM duty-cycle controller client
//!
//! dutyctl connects to a duty-cycle controller (for example a motor or
//! LED driver on a microcontroller) over plain TCP and gives the
//! operator a simple poll/display/input loop: the current duty cycle
//! is fetched and shown, and a new value in [-100, 100] can be typed
//! in and forwarded. Quitting resets the controller to zero.
//!
//! # Quick Start
//!
//! ```text
//! dutyctl                      # Connect to the configured controller
//! dutyctl 10.0.0.7             # Connect to a specific host
//! dutyctl -f                   # Fade mode: enter "duty,fade_ms"
//! ```
//!
//! The controller address can also be set in `~/.dutyctl/config.toml`.

mod client;
mod config;
mod protocol;
mod session;
mod ui;

use std::env;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crate::client::Controller;
use crate::config::Config as FileConfig;
use crate::session::{Mode, Session};
use crate::ui::Screen;

/// Command-line configuration
struct CliConfig {
    /// Controller host or IP address
    address: Option<String>,
    /// Controller TCP port
    port: Option<u16>,
    /// Fade control mode
    fade: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            address: None, // Will be set from config.toml or the built-in default
            port: None,
            fade: false,
        }
    }
}

/// Version string from Cargo.toml
const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_version() {
    eprintln!("dutyctl {}", VERSION);
}

fn print_help() {
    eprintln!("dutyctl {} - remote PWM duty-cycle controller client", VERSION);
    eprintln!();
    eprintln!("Usage: dutyctl [OPTIONS] [ADDRESS]");
    eprintln!();
    eprintln!("Connection options:");
    eprintln!("  (default)             From config.toml or {}:{}", config::DEFAULT_ADDRESS, config::DEFAULT_PORT);
    eprintln!("  ADDRESS               Controller host or IP address");
    eprintln!("  -a, --address <HOST>  Controller host or IP address");
    eprintln!("  -p, --port <PORT>     Controller TCP port");
    eprintln!();
    eprintln!("Mode options:");
    eprintln!("  (default)             Direct control: enter a duty cycle");
    eprintln!("  -f, --fade            Fade control: enter \"duty,fade_ms\"");
    eprintln!();
    eprintln!("Other options:");
    eprintln!("  -v, --version         Show version");
    eprintln!("  -h, --help            Show this help");
    eprintln!();
    eprintln!("At the prompt:");
    eprintln!("  -100 to 100           Set a new duty cycle (percent)");
    eprintln!("  q                     Reset the duty cycle to 0 and quit");
    eprintln!();
    eprintln!("Configuration: ~/.dutyctl/config.toml");
}

fn parse_args() -> Result<CliConfig, String> {
    let args: Vec<String> = env::args().collect();
    let mut config = CliConfig::default();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-v" | "--version" => {
                print_version();
                std::process::exit(0);
            }
            "-a" | "--address" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing address argument".to_string());
                }
                config.address = Some(args[i].clone());
            }
            "-p" | "--port" => {
                i += 1;
                if i >= args.len() {
                    return Err("Missing port argument".to_string());
                }
                config.port = Some(
                    args[i]
                        .parse()
                        .map_err(|_| format!("Invalid port: {}", args[i]))?,
                );
            }
            "-f" | "--fade" => {
                config.fade = true;
            }
            arg if !arg.starts_with('-') && config.address.is_none() => {
                config.address = Some(arg.to_string());
            }
            arg => {
                return Err(format!("Unknown argument: {}. Use -h for help.", arg));
            }
        }
        i += 1;
    }

    Ok(config)
}

/// Initialize logging to ~/.dutyctl/dutyctl.log
fn init_logging() {
    let log_path = config::home_dir()
        .map(|h| h.join(".dutyctl").join("dutyctl.log"))
        .unwrap_or_else(|| std::path::PathBuf::from("dutyctl.log"));

    // Create log directory if needed
    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    // Open log file (append mode)
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .ok();

    if let Some(file) = log_file {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(Level::INFO)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = match parse_args() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Use --help for usage information");
            std::process::exit(1);
        }
    };

    init_logging();
    info!("dutyctl starting...");

    // Merge config: command line args override config file
    let file_config = FileConfig::load();
    let (address, port) = config::resolve(cli.address, cli.port, file_config);
    let addr = format!("{}:{}", address, port);

    // Connection failure is fatal: diagnostic, non-zero exit, no retry
    println!("# Connecting to controller, {}", addr);
    let controller = Controller::connect(&addr)?;

    let mode = if cli.fade { Mode::Fade } else { Mode::Direct };
    let screen = Screen::new()?;

    let mut session = Session::new(controller, screen, mode);
    session.run()?;

    info!("dutyctl exiting");
    Ok(())
}
