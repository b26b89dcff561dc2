//! CLI for droidperf: live Android performance telemetry over adb.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "droidperf")]
#[command(about = "droidperf: live FPS, CPU, GPU and battery telemetry from an Android device")]
#[command(version = droidperf_core::VERSION)]
struct Cli {
    /// Path to the adb executable (default: $DROIDPERF_ADB, bundled copy, then PATH)
    #[arg(long, global = true)]
    adb: Option<String>,

    /// Kill any single adb command that runs longer than this many seconds
    #[arg(long, global = true)]
    command_timeout: Option<f64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that adb answers and lists at least one device
    Check,

    /// List attached devices that are ready for commands
    Devices,

    /// Connect and print model, Android version and API level
    Info {
        /// Connect wirelessly to this IP (port 5555) instead of the first USB device
        #[arg(long)]
        ip: Option<String>,
    },

    /// Take a single telemetry frame and print it as JSON
    Sample {
        /// Connect wirelessly to this IP (port 5555)
        #[arg(long)]
        ip: Option<String>,

        /// Seconds between the two CPU snapshots used for load
        #[arg(long, default_value = "1.0")]
        interval: f64,
    },

    /// Stream telemetry frames until Ctrl+C
    Monitor {
        /// Connect wirelessly to this IP (port 5555)
        #[arg(long)]
        ip: Option<String>,

        /// Seconds between frames
        #[arg(long, default_value = "1.0")]
        interval: f64,

        /// Print one JSON object per frame instead of a table row
        #[arg(long)]
        json: bool,

        /// Stop after this many frames
        #[arg(long)]
        count: Option<u64>,
    },

    /// Serve the HTTP control surface for a dashboard
    Server {
        /// Port to listen on
        #[arg(long, default_value = "5000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let bridge = commands::BridgeOptions {
        adb: cli.adb.as_deref(),
        command_timeout: cli.command_timeout,
    };

    match cli.command {
        Commands::Check => commands::check::run(&bridge),
        Commands::Devices => commands::devices::run(&bridge),
        Commands::Info { ip } => commands::info::run(&bridge, ip.as_deref()),
        Commands::Sample { ip, interval } => commands::sample::run(&bridge, ip.as_deref(), interval),
        Commands::Monitor {
            ip,
            interval,
            json,
            count,
        } => commands::monitor::run(&bridge, ip.as_deref(), interval, json, count),
        Commands::Server { port, host } => commands::server::run(&bridge, &host, port),
    }
}
