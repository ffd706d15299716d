use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use xpad_protocol::ControllerFamily;

/// Stable per-device identity assigned by the USB host stack.
///
/// Survives a close/reopen of the same physical device, unlike the
/// enumeration index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(pub u32);

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry of the transport's live device list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub instance_id: InstanceId,
    /// Host stack device type; only some tags are gamepads.
    pub family_tag: u8,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl DeviceDescriptor {
    pub fn family(&self) -> Option<ControllerFamily> {
        ControllerFamily::from_tag(self.family_tag)
    }
}

/// Arguments of an interrupt IN completion.
#[derive(Debug, Clone, Copy)]
pub struct ReadCompletion<'a> {
    pub device: InstanceId,
    pub endpoint: u8,
    /// Negative on transfer error.
    pub status: i32,
    pub data: &'a [u8],
}

/// Hotplug signal from the host stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEvent {
    Connected(InstanceId),
    Disconnected(InstanceId),
}

/// Invoked from the transport's completion context for every IN transfer.
pub type ReadHandler = Arc<dyn Fn(ReadCompletion<'_>) + Send + Sync>;

/// Invoked from the transport's hub polling for every hotplug change.
pub type ConnectionHandler = Arc<dyn Fn(ConnectionEvent) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("host stack init failed: {0}")]
    Init(String),
    #[error("device {0} is not attached")]
    NotAttached(InstanceId),
    #[error("transfer rejected with status {0}")]
    Rejected(i32),
}

/// Capability surface of the USB host/HID stack.
///
/// Implementations own enumeration, transfer scheduling and hotplug; the
/// driver only calls through this trait.
pub trait Transport: Send + Sync {
    /// Brings the host stack up. May be called more than once.
    fn init(&self) -> Result<(), TransportError>;

    /// Connected devices in enumeration order.
    fn devices(&self) -> Vec<DeviceDescriptor>;

    /// Services hubs; connection handlers fire from here.
    fn poll_hubs(&self);

    /// Installs or, with `None`, removes the hotplug handler.
    fn set_connection_handler(&self, handler: Option<ConnectionHandler>);

    /// Starts reading the interrupt IN pipe of `device`.
    fn start_read(&self, device: InstanceId, handler: ReadHandler) -> Result<(), TransportError>;

    /// Stops reading; the device stays registered and can be read again.
    fn stop_read(&self, device: InstanceId);

    /// Submits an interrupt OUT transfer. Completion is not awaited.
    fn write(&self, device: InstanceId, packet: &[u8]) -> Result<(), TransportError>;
}
