//! Report codecs for Xbox-family USB gamepads.
//!
//! Everything here is I/O-free and allocation-free: raw interrupt reports
//! go in, a [`GamepadState`] comes out, and rumble magnitudes go back out as
//! fixed [`RumblePacket`]s. Each controller family has its own hard-coded
//! layout; see [`decode`] and [`encode_rumble`].

mod decode;
mod diff;
mod family;
mod ids;
mod report;
mod rumble;
mod state;

use thiserror::Error;

pub use decode::decode;
pub use diff::{apply, diff, InputEvent, InputEvents, MAX_EVENTS};
pub use family::{Capabilities, ControllerFamily, GAMEPAD_CAPABILITIES};
pub use ids::{JoystickGuid, BUS_TYPE_USB};
pub use report::{validate, RawReport, MAX_REPORT_LEN};
pub use rumble::{encode_rumble, RumblePacket, MAX_RUMBLE_PACKET_LEN};
pub use state::{trigger_to_axis, Axis, Button, Buttons, GamepadState, Hat};

/// Error type for protocol-level conversions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The transport reported a family tag outside the supported set.
    #[error("unsupported controller family tag: {0:#04x}")]
    UnsupportedFamily(u8),
    /// A family name could not be parsed.
    #[error("unknown controller family: {0}")]
    UnknownFamilyName(String),
    /// Report data does not fit into a report buffer.
    #[error("report too long: {len} bytes (max {MAX_REPORT_LEN})")]
    ReportTooLong { len: usize },
}

/// Convenient result alias for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
