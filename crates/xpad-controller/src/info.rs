use xpad_protocol::{ControllerFamily, JoystickGuid};

use crate::transport::InstanceId;

/// Host-facing description of a connected gamepad at a given index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerInfo {
    /// Enumeration index at the time of the query; not stable.
    pub index: usize,
    pub instance_id: InstanceId,
    pub family: ControllerFamily,
    pub name: String,
    /// Arrival order, which is not the physical port on console hardware.
    pub player_index: usize,
    pub guid: JoystickGuid,
    pub vendor_id: u16,
    pub product_id: u16,
}

/// Display name for the pad at `index`, numbered from 1.
pub fn device_name(family: Option<ControllerFamily>, index: usize) -> String {
    let product = family.map_or("Unknown Controller", ControllerFamily::product_name);
    format!("{product} #{}", index + 1)
}
