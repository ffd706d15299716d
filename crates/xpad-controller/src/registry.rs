use std::sync::Arc;

use crate::error::{Error, Result};
use crate::transport::{DeviceDescriptor, Transport};

/// A recognized gamepad found at a given enumeration index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDevice {
    pub index: usize,
    pub descriptor: DeviceDescriptor,
}

/// Maps transient device indices onto the transport's live device list.
///
/// Nothing is cached: every call walks the current list, so indices always
/// reflect the latest hotplug state.
#[derive(Clone)]
pub struct DeviceRegistry {
    transport: Arc<dyn Transport>,
}

impl DeviceRegistry {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Recognized gamepads in enumeration order.
    pub fn gamepads(&self) -> Vec<DeviceDescriptor> {
        self.transport
            .devices()
            .into_iter()
            .filter(|d| d.family().is_some())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.transport
            .devices()
            .iter()
            .filter(|d| d.family().is_some())
            .count()
    }

    /// The `index`-th recognized gamepad.
    pub fn resolve(&self, index: usize) -> Result<ResolvedDevice> {
        self.transport
            .devices()
            .into_iter()
            .filter(|d| d.family().is_some())
            .nth(index)
            .map(|descriptor| ResolvedDevice { index, descriptor })
            .ok_or(Error::DeviceNotFound(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryTransport;
    use crate::transport::InstanceId;

    fn pad(id: u32, tag: u8) -> DeviceDescriptor {
        DeviceDescriptor {
            instance_id: InstanceId(id),
            family_tag: tag,
            vendor_id: 0x045E,
            product_id: 0x0202,
        }
    }

    #[test]
    fn skips_unrecognized_devices() {
        let transport = Arc::new(MemoryTransport::new());
        transport.attach(pad(1, 0x01));
        transport.attach(pad(2, 0x40)); // keyboard
        transport.attach(pad(3, 0x04));
        let registry = DeviceRegistry::new(transport);

        assert_eq!(registry.count(), 2);
        assert_eq!(registry.resolve(1).unwrap().descriptor.instance_id, InstanceId(3));
        assert!(matches!(registry.resolve(2), Err(Error::DeviceNotFound(2))));
    }

    #[test]
    fn removal_renumbers_higher_indices() {
        let transport = Arc::new(MemoryTransport::new());
        transport.attach(pad(10, 0x02));
        transport.attach(pad(11, 0x03));
        transport.attach(pad(12, 0x04));
        let registry = DeviceRegistry::new(transport.clone());
        assert_eq!(registry.resolve(2).unwrap().descriptor.instance_id, InstanceId(12));

        transport.detach(InstanceId(11));

        assert_eq!(registry.count(), 2);
        assert_eq!(registry.resolve(1).unwrap().descriptor.instance_id, InstanceId(12));
        assert!(registry.resolve(2).is_err());
    }
}
