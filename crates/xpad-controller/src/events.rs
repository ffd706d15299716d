use crossbeam_channel::Receiver;

use crate::transport::InstanceId;

/// Hotplug notifications relayed from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerEvent {
    /// A device finished enumeration. It may not be a gamepad and is not
    /// opened automatically.
    Connected(InstanceId),
    /// A device went away. Any open [`crate::Gamepad`] for it stops receiving
    /// reports and should be closed.
    Disconnected(InstanceId),
}

/// Receiving end for controller events subscription.
pub type EventReceiver = Receiver<ControllerEvent>;
