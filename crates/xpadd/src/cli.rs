use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Validate and decode one captured input report.
    Decode {
        /// Controller family (original-xbox, xbox360-wired, xbox360-wireless, xbox-one)
        #[clap(short, long)]
        family: String,
        /// Report bytes as hex, e.g. "20 00 00 00 10 00"
        report: String,
    },
    /// Encode a rumble command packet.
    Rumble {
        /// Controller family
        #[clap(short, long)]
        family: String,
        /// Low-frequency motor magnitude (0-65535)
        #[clap(long, default_value_t = 0)]
        low: u16,
        /// High-frequency motor magnitude (0-65535)
        #[clap(long, default_value_t = 0)]
        high: u16,
    },
    /// Replay a capture file through the full driver pipeline.
    Replay {
        /// Capture file (YAML)
        capture: PathBuf,
        /// Pace steps in wall-clock time instead of running instantly
        #[clap(long)]
        realtime: bool,
    },
    /// List supported controller families.
    Families,
}

/// Decode Xbox-family gamepad reports and encode rumble commands.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Configuration file (YAML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}
