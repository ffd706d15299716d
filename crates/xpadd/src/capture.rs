//! Recorded device sessions replayed through the driver.
//!
//! ```yaml
//! devices:
//!   - id: 1
//!     family: xbox-one
//!     product_id: 0x02ea
//! steps:
//!   - at_ms: 0
//!     report: { device: 1, data: "20 00 00 00 10 00" }
//!   - at_ms: 40
//!     rumble: { device: 1, low: 32768, high: 0, duration_ms: 100 }
//!   - at_ms: 200
//!     disconnect: 1
//! ```

use std::fs;
use std::path::Path;

use ahash::AHashSet;
use serde::Deserialize;
use thiserror::Error;
use xpad_controller::{ControllerFamily, DeviceDescriptor, InstanceId};

use crate::hex::{parse_hex, HexError};

/// Vendor id used when a capture leaves it out.
const MICROSOFT_VENDOR_ID: u16 = 0x045E;

#[derive(Debug, Error)]
pub(crate) enum CaptureError {
    #[error("failed to read capture: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml deserialize error: {0}")]
    YamlDeserializeError(#[from] serde_yaml::Error),
    #[error("device {0}: unknown family '{1}'")]
    UnknownFamily(u32, String),
    #[error("device {0}: exactly one of family or tag is required")]
    AmbiguousFamily(u32),
    #[error("device {0} is declared twice")]
    DuplicateDevice(u32),
    #[error("step {0}: exactly one action is required")]
    InvalidStep(usize),
    #[error("step {0}: at_ms goes backwards")]
    OutOfOrder(usize),
    #[error("step {0}: {1}")]
    InvalidReport(usize, HexError),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDevice {
    id: u32,
    family: Option<String>,
    tag: Option<u8>,
    vendor_id: Option<u16>,
    #[serde(default)]
    product_id: u16,
}

impl RawDevice {
    fn descriptor(&self) -> Result<DeviceDescriptor, CaptureError> {
        let family_tag = match (&self.family, self.tag) {
            (Some(name), None) => name
                .parse::<ControllerFamily>()
                .map_err(|_| CaptureError::UnknownFamily(self.id, name.clone()))?
                .tag(),
            (None, Some(tag)) => tag,
            _ => return Err(CaptureError::AmbiguousFamily(self.id)),
        };
        Ok(DeviceDescriptor {
            instance_id: InstanceId(self.id),
            family_tag,
            vendor_id: self.vendor_id.unwrap_or(MICROSOFT_VENDOR_ID),
            product_id: self.product_id,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawReportStep {
    device: u32,
    data: String,
    #[serde(default)]
    status: i32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRumbleStep {
    device: u32,
    low: u16,
    high: u16,
    duration_ms: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    #[serde(default)]
    at_ms: u32,
    report: Option<RawReportStep>,
    rumble: Option<RawRumbleStep>,
    connect: Option<RawDevice>,
    disconnect: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCapture {
    #[serde(default)]
    devices: Vec<RawDevice>,
    #[serde(default)]
    steps: Vec<RawStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Action {
    /// Completes an IN transfer on the device.
    Report {
        device: InstanceId,
        status: i32,
        data: Vec<u8>,
    },
    Rumble {
        device: InstanceId,
        low: u16,
        high: u16,
        duration_ms: Option<u32>,
    },
    Connect(DeviceDescriptor),
    Disconnect(InstanceId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Step {
    pub at_ms: u32,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct Capture {
    /// Devices plugged in before the first step.
    pub devices: Vec<DeviceDescriptor>,
    pub steps: Vec<Step>,
}

impl RawStep {
    fn into_step(self, index: usize) -> Result<Step, CaptureError> {
        let RawStep {
            at_ms,
            report,
            rumble,
            connect,
            disconnect,
        } = self;
        let action = match (report, rumble, connect, disconnect) {
            (Some(report), None, None, None) => Action::Report {
                device: InstanceId(report.device),
                status: report.status,
                data: parse_hex(&report.data)
                    .map_err(|e| CaptureError::InvalidReport(index, e))?,
            },
            (None, Some(rumble), None, None) => Action::Rumble {
                device: InstanceId(rumble.device),
                low: rumble.low,
                high: rumble.high,
                duration_ms: rumble.duration_ms,
            },
            (None, None, Some(device), None) => Action::Connect(device.descriptor()?),
            (None, None, None, Some(id)) => Action::Disconnect(InstanceId(id)),
            _ => return Err(CaptureError::InvalidStep(index)),
        };
        Ok(Step { at_ms, action })
    }
}

/// Parse yaml capture.
pub(crate) fn parse_capture(input: &str) -> Result<Capture, CaptureError> {
    let raw: RawCapture = serde_yaml::from_str(input)?;

    let mut seen = AHashSet::new();
    let mut devices = Vec::with_capacity(raw.devices.len());
    for device in &raw.devices {
        if !seen.insert(device.id) {
            return Err(CaptureError::DuplicateDevice(device.id));
        }
        devices.push(device.descriptor()?);
    }

    let mut steps = Vec::with_capacity(raw.steps.len());
    let mut last_at = 0;
    for (index, step) in raw.steps.into_iter().enumerate() {
        let step = step.into_step(index)?;
        if step.at_ms < last_at {
            return Err(CaptureError::OutOfOrder(index));
        }
        last_at = step.at_ms;
        steps.push(step);
    }

    Ok(Capture { devices, steps })
}

pub(crate) fn load_capture(path: &Path) -> Result<Capture, CaptureError> {
    parse_capture(&fs::read_to_string(path)?)
}
