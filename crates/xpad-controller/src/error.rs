use thiserror::Error;

use crate::transport::{InstanceId, TransportError};

/// Error type for driver and gamepad operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The device's family tag is outside the supported set.
    #[error("Unsupported controller family: {0:#04x}")]
    UnsupportedFamily(u8),
    /// No recognized gamepad at this index; re-enumerate and retry.
    #[error("Device not found at index {0}")]
    DeviceNotFound(usize),
    /// The physical device already has an open slot.
    #[error("Device {0} is already open")]
    AlreadyOpen(InstanceId),
    /// The transport refused to start or set up the device.
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),
    /// The transport rejected an outbound rumble packet.
    #[error("Rumble write failed: {0}")]
    TransportWrite(#[source] TransportError),
}

/// Convenient result alias for controller operations.
pub type Result<T> = std::result::Result<T, Error>;
