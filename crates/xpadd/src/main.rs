mod capture;
mod cli;
mod config;
mod hex;
mod inspect;
mod logging;
mod replay;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use crossbeam_channel::{after, bounded, select};
use xpad_protocol::{encode_rumble, ControllerFamily};

use crate::cli::{Cli, Command};
use crate::config::{load_config, Config, LogLevel};
use crate::hex::{format_hex, parse_hex};
use crate::inspect::{decode_report, describe_state};
use crate::replay::ReplayOptions;

fn parse_family(name: &str) -> Option<ControllerFamily> {
    match name.parse() {
        Ok(family) => Some(family),
        Err(e) => {
            print_error!("{e}");
            None
        }
    }
}

fn run_decode(family: &str, report: &str) -> bool {
    let Some(family) = parse_family(family) else {
        return false;
    };
    let data = match parse_hex(report) {
        Ok(data) => data,
        Err(e) => {
            print_error!("bad report: {e}");
            return false;
        }
    };
    let Some(state) = decode_report(family, &data) else {
        print_warning!("invalid report for {family}");
        return false;
    };
    for line in describe_state(&state) {
        print_info!("{line}");
    }
    true
}

fn run_rumble(family: &str, low: u16, high: u16) -> bool {
    let Some(family) = parse_family(family) else {
        return false;
    };
    let packet = encode_rumble(family, low, high);
    print_info!("{}", format_hex(packet.as_bytes()));
    true
}

fn run_families() {
    for family in ControllerFamily::ALL {
        let caps = family.capabilities();
        print_info!(
            "{:<18} tag={:#04x} {} ({} axes, {} buttons, {} hat)",
            family.slug(),
            family.tag(),
            family.product_name(),
            caps.axes,
            caps.buttons,
            caps.hats
        );
    }
}

fn run_replay(config: &Config, path: &std::path::Path, realtime: bool) -> bool {
    let capture = match capture::load_capture(path) {
        Ok(capture) => capture,
        Err(e) => {
            print_error!("failed to load capture: {e}");
            return false;
        }
    };
    let options = ReplayOptions {
        poll_interval_ms: config.poll_interval_ms,
        rumble_duration_ms: config.rumble_duration_ms,
    };

    // Handle Ctrl+C to stop a paced replay cleanly
    let (stop_tx, stop_rx) = bounded::<()>(1);
    if realtime {
        if let Err(e) = ctrlc::set_handler(move || {
            let _ = stop_tx.try_send(());
        }) {
            print_warning!("failed to set Ctrl+C handler: {e}");
        }
    }
    let pace = |ms: u32| {
        if !realtime {
            return true;
        }
        select! {
            recv(stop_rx) -> _ => false,
            recv(after(Duration::from_millis(u64::from(ms)))) -> _ => true,
        }
    };

    print_debug!(
        "replaying {} steps over {} devices",
        capture.steps.len(),
        capture.devices.len()
    );
    let result = replay::run(&capture, &options, pace, &mut |record: &replay::Record| {
        print_info!("{record}");
    });
    match result {
        Ok(summary) => {
            if summary.interrupted {
                print_warning!("replay interrupted");
            }
            print_info!(
                "{} input events, {} packets written",
                summary.inputs,
                summary.packets
            );
            true
        }
        Err(e) => {
            print_error!("failed to start driver: {e}");
            false
        }
    }
}

// The logger is what failed, so stderr is the only place left.
#[allow(clippy::print_stderr)]
fn report_logger_error(e: &log::SetLoggerError) {
    eprintln!("unable to set up logger: {e}");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    let (verbose, no_color) = match &config {
        Ok(config) => (
            cli.verbose || config.log_level == LogLevel::Debug,
            cli.no_color || !config.color,
        ),
        Err(_) => (cli.verbose, cli.no_color),
    };
    if let Err(e) = logging::setup(verbose, no_color) {
        report_logger_error(&e);
        return ExitCode::FAILURE;
    }
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            print_error!("failed to load config: {e}");
            return ExitCode::FAILURE;
        }
    };

    let ok = match cli.command {
        Command::Decode { family, report } => run_decode(&family, &report),
        Command::Rumble { family, low, high } => run_rumble(&family, low, high),
        Command::Replay { capture, realtime } => run_replay(&config, &capture, realtime),
        Command::Families => {
            run_families();
            true
        }
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
