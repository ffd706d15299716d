mod buffer;
mod clock;
mod driver;
mod error;
mod events;
mod gamepad;
mod info;
pub mod memory;
mod registry;
mod rumble;
mod transport;

pub use crate::buffer::ReportBuffer;
pub use crate::clock::{Clock, ManualClock, MonotonicClock, Ticks};
pub use crate::driver::XpadDriver;
pub use crate::error::{Error, Result};
pub use crate::events::{ControllerEvent, EventReceiver};
pub use crate::gamepad::Gamepad;
pub use crate::info::{device_name, ControllerInfo};
pub use crate::registry::{DeviceRegistry, ResolvedDevice};
pub use crate::rumble::RumbleState;
pub use crate::transport::{
    ConnectionEvent, ConnectionHandler, DeviceDescriptor, InstanceId, ReadCompletion,
    ReadHandler, Transport, TransportError,
};

pub use xpad_protocol::{
    Axis, Button, ControllerFamily, GamepadState, Hat, InputEvent, InputEvents, JoystickGuid,
};
