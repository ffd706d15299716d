use std::sync::{Arc, Mutex, PoisonError, Weak};

use ahash::AHashSet;
use crossbeam_channel::{unbounded, Sender};
use xpad_protocol::{ControllerFamily, JoystickGuid};

use crate::buffer::ReportBuffer;
use crate::clock::{Clock, MonotonicClock};
use crate::error::{Error, Result};
use crate::events::{ControllerEvent, EventReceiver};
use crate::gamepad::Gamepad;
use crate::info::{device_name, ControllerInfo};
use crate::registry::{DeviceRegistry, ResolvedDevice};
use crate::transport::{
    ConnectionEvent, ConnectionHandler, InstanceId, ReadCompletion, ReadHandler, Transport,
};

/// Shared state used by the driver, gamepad handles and transport callbacks.
pub(crate) struct Inner {
    pub(crate) transport: Arc<dyn Transport>,
    pub(crate) clock: Arc<dyn Clock>,
    subscribers: Mutex<Vec<Sender<ControllerEvent>>>,
    open: Mutex<AHashSet<InstanceId>>,
}

impl Inner {
    fn broadcast(&self, event: ControllerEvent) {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subs.retain(|tx| tx.send(event).is_ok());
    }

    fn claim(&self, id: InstanceId) -> bool {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id)
    }

    pub(crate) fn release(&self, id: InstanceId) {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    fn is_open(&self, id: InstanceId) -> bool {
        self.open
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }
}

/// Gamepad driver bound to one transport.
///
/// Creating it initializes the host stack and installs the hotplug handler;
/// dropping it removes the handler but leaves the stack running, since other
/// parts of the program may share it.
pub struct XpadDriver {
    inner: Arc<Inner>,
    registry: DeviceRegistry,
}

impl XpadDriver {
    pub fn new(transport: Arc<dyn Transport>) -> Result<Self> {
        Self::with_clock(transport, Arc::new(MonotonicClock::new()))
    }

    pub fn with_clock(transport: Arc<dyn Transport>, clock: Arc<dyn Clock>) -> Result<Self> {
        transport.init().map_err(Error::Transport)?;

        let inner = Arc::new(Inner {
            transport: Arc::clone(&transport),
            clock,
            subscribers: Mutex::new(Vec::new()),
            open: Mutex::new(AHashSet::new()),
        });

        let weak: Weak<Inner> = Arc::downgrade(&inner);
        let handler: ConnectionHandler = Arc::new(move |event: ConnectionEvent| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let event = match event {
                ConnectionEvent::Connected(id) => {
                    log::debug!("device {id}: connected");
                    ControllerEvent::Connected(id)
                }
                ConnectionEvent::Disconnected(id) => {
                    log::debug!("device {id}: disconnected");
                    ControllerEvent::Disconnected(id)
                }
            };
            inner.broadcast(event);
        });
        transport.set_connection_handler(Some(handler));

        Ok(Self {
            inner,
            registry: DeviceRegistry::new(transport),
        })
    }

    /// Subscribes to hotplug events. Dropped receivers are cleaned up on the
    /// next broadcast.
    pub fn subscribe(&self) -> EventReceiver {
        let (tx, rx) = unbounded();
        self.inner
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Services the host stack so pending hotplug events get delivered.
    pub fn detect(&self) {
        self.inner.transport.poll_hubs();
    }

    /// Number of connected gamepads of a supported family.
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    pub fn name(&self, index: usize) -> Result<String> {
        let device = self.registry.resolve(index)?;
        Ok(device_name(device.descriptor.family(), index))
    }

    /// Player slot for the pad at `index`.
    ///
    /// This is arrival order, not the physical port the pad is plugged into.
    pub fn player_index(&self, index: usize) -> Result<usize> {
        self.registry.resolve(index).map(|d| d.index)
    }

    pub fn guid(&self, index: usize) -> Result<JoystickGuid> {
        let device = self.registry.resolve(index)?;
        Ok(JoystickGuid::from_ids(
            device.descriptor.vendor_id,
            device.descriptor.product_id,
        ))
    }

    pub fn instance_id(&self, index: usize) -> Result<InstanceId> {
        self.registry
            .resolve(index)
            .map(|d| d.descriptor.instance_id)
    }

    pub fn info(&self, index: usize) -> Result<ControllerInfo> {
        controller_info(self.registry.resolve(index)?)
    }

    /// Snapshot of all connected gamepads.
    pub fn controllers(&self) -> Vec<ControllerInfo> {
        self.registry
            .gamepads()
            .into_iter()
            .enumerate()
            .filter_map(|(index, descriptor)| {
                controller_info(ResolvedDevice { index, descriptor }).ok()
            })
            .collect()
    }

    pub fn is_open(&self, id: InstanceId) -> bool {
        self.inner.is_open(id)
    }

    /// Opens the pad at `index` and starts reading its interrupt pipe.
    pub fn open(&self, index: usize) -> Result<Gamepad> {
        let info = self.info(index)?;
        let id = info.instance_id;
        if !self.inner.claim(id) {
            return Err(Error::AlreadyOpen(id));
        }

        let buffer = Arc::new(ReportBuffer::new(info.family));
        let sink = Arc::downgrade(&buffer);
        let handler: ReadHandler = Arc::new(move |completion: ReadCompletion<'_>| {
            // A closed slot drops its buffer; late completions land nowhere.
            if let Some(buffer) = sink.upgrade() {
                buffer.on_read(&completion);
            }
        });

        if let Err(e) = self.inner.transport.start_read(id, handler) {
            self.inner.release(id);
            return Err(Error::Transport(e));
        }

        log::debug!(
            "device {id}: opened {} (index {}, vid=0x{:04x} pid=0x{:04x})",
            info.name,
            info.index,
            info.vendor_id,
            info.product_id
        );
        Ok(Gamepad::new(info, buffer, Arc::clone(&self.inner)))
    }

    /// Removes the hotplug handler. Same as dropping the driver.
    pub fn shutdown(self) {
        drop(self);
    }
}

impl Drop for XpadDriver {
    fn drop(&mut self) {
        self.inner.transport.set_connection_handler(None);
    }
}

fn controller_info(device: ResolvedDevice) -> Result<ControllerInfo> {
    let ResolvedDevice { index, descriptor } = device;
    let family = ControllerFamily::try_from(descriptor.family_tag)
        .map_err(|_| Error::UnsupportedFamily(descriptor.family_tag))?;
    Ok(ControllerInfo {
        index,
        instance_id: descriptor.instance_id,
        family,
        name: device_name(Some(family), index),
        player_index: index,
        guid: JoystickGuid::from_ids(descriptor.vendor_id, descriptor.product_id),
        vendor_id: descriptor.vendor_id,
        product_id: descriptor.product_id,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use xpad_protocol::{Axis, Button, Hat, InputEvent};

    use super::*;
    use crate::clock::{ManualClock, Ticks};
    use crate::memory::MemoryTransport;
    use crate::transport::DeviceDescriptor;

    const MICROSOFT: u16 = 0x045E;

    fn descriptor(id: u32, family: ControllerFamily) -> DeviceDescriptor {
        DeviceDescriptor {
            instance_id: InstanceId(id),
            family_tag: family.tag(),
            vendor_id: MICROSOFT,
            product_id: 0x02EA,
        }
    }

    fn setup(families: &[ControllerFamily]) -> (Arc<MemoryTransport>, Arc<ManualClock>, XpadDriver) {
        let transport = Arc::new(MemoryTransport::new());
        for (i, family) in families.iter().enumerate() {
            transport.attach(descriptor(i as u32 + 1, *family));
        }
        let clock = Arc::new(ManualClock::new(Ticks(1_000)));
        let driver = XpadDriver::with_clock(transport.clone(), clock.clone()).unwrap();
        (transport, clock, driver)
    }

    fn xbox_one_report(buttons: u16, left_x: i16) -> [u8; 18] {
        let mut bytes = [0u8; 18];
        bytes[0] = 0x20;
        bytes[4..6].copy_from_slice(&buttons.to_le_bytes());
        bytes[10..12].copy_from_slice(&left_x.to_le_bytes());
        // Centered Y after inversion.
        bytes[12..14].copy_from_slice(&(-1i16).to_le_bytes());
        bytes[16..18].copy_from_slice(&(-1i16).to_le_bytes());
        bytes
    }

    #[test]
    fn init_installs_and_drop_removes_hotplug_handler() {
        let (transport, _clock, driver) = setup(&[]);
        assert_eq!(transport.init_calls(), 1);
        assert!(transport.has_connection_handler());
        driver.shutdown();
        assert!(!transport.has_connection_handler());
    }

    #[test]
    fn hotplug_events_reach_subscribers_on_detect() {
        let (transport, _clock, driver) = setup(&[ControllerFamily::XboxOne]);
        let rx = driver.subscribe();
        driver.detect();
        assert_eq!(rx.try_recv(), Ok(ControllerEvent::Connected(InstanceId(1))));

        transport.detach(InstanceId(1));
        assert!(rx.try_recv().is_err());
        driver.detect();
        assert_eq!(rx.try_recv(), Ok(ControllerEvent::Disconnected(InstanceId(1))));
    }

    #[test]
    fn host_queries_follow_enumeration() {
        let (transport, _clock, driver) = setup(&[
            ControllerFamily::OriginalXbox,
            ControllerFamily::Xbox360Wireless,
        ]);
        transport.attach(DeviceDescriptor {
            instance_id: InstanceId(9),
            family_tag: 0x55,
            vendor_id: 0x1234,
            product_id: 0x5678,
        });

        assert_eq!(driver.count(), 2);
        assert_eq!(driver.name(0).unwrap(), "Original Xbox Controller #1");
        assert_eq!(driver.name(1).unwrap(), "Xbox 360 Controller #2");
        assert_eq!(driver.player_index(1).unwrap(), 1);
        assert_eq!(driver.instance_id(1).unwrap(), InstanceId(2));
        assert_eq!(driver.guid(0).unwrap(), JoystickGuid::from_ids(MICROSOFT, 0x02EA));
        assert!(matches!(driver.name(2), Err(Error::DeviceNotFound(2))));
        assert_eq!(driver.controllers().len(), 2);
    }

    #[test]
    fn open_reports_capabilities_and_rejects_bad_index() {
        let (_transport, _clock, driver) = setup(&[ControllerFamily::Xbox360Wired]);
        let pad = driver.open(0).unwrap();
        let caps = pad.family().capabilities();
        assert_eq!((caps.axes, caps.buttons, caps.hats), (6, 10, 1));
        assert!(matches!(driver.open(1), Err(Error::DeviceNotFound(1))));
    }

    #[test]
    fn second_open_of_same_device_fails() {
        let (_transport, _clock, driver) = setup(&[ControllerFamily::XboxOne]);
        let pad = driver.open(0).unwrap();
        assert!(matches!(driver.open(0), Err(Error::AlreadyOpen(InstanceId(1)))));
        pad.close();
        assert!(driver.open(0).is_ok());
    }

    #[test]
    fn update_emits_edges_only() {
        let (transport, _clock, driver) = setup(&[ControllerFamily::XboxOne]);
        let mut pad = driver.open(0).unwrap();

        // Nothing received yet.
        assert!(pad.update().is_empty());

        assert!(transport.deliver(InstanceId(1), &xbox_one_report(0, 0)));
        assert!(pad.update().is_empty());

        // A + dpad up, left stick moved.
        transport.deliver(InstanceId(1), &xbox_one_report(0x0110, 1200));
        assert_eq!(
            pad.update().as_slice(),
            &[
                InputEvent::Hat(Hat::UP),
                InputEvent::Button {
                    button: Button::A,
                    pressed: true
                },
                InputEvent::Axis {
                    axis: Axis::LeftX,
                    value: 1200
                },
            ]
        );
        assert!(pad.update().is_empty());
        assert!(pad.state().is_pressed(Button::A));
    }

    #[test]
    fn invalid_reports_leave_state_alone() {
        let (transport, _clock, driver) = setup(&[ControllerFamily::XboxOne]);
        let mut pad = driver.open(0).unwrap();
        transport.deliver(InstanceId(1), &xbox_one_report(0x0010, 0));
        assert_eq!(pad.update().len(), 1);
        let before = *pad.state();

        let mut keep_alive = xbox_one_report(0, 500);
        keep_alive[0] = 0x03;
        transport.deliver(InstanceId(1), &keep_alive);
        transport.deliver_with_status(InstanceId(1), -71, &xbox_one_report(0, 500));

        assert!(pad.update().is_empty());
        assert_eq!(*pad.state(), before);
    }

    #[test]
    fn rumble_sends_once_and_refreshes_on_repeat() {
        let (transport, clock, driver) = setup(&[ControllerFamily::Xbox360Wired]);
        let mut pad = driver.open(0).unwrap();

        pad.rumble(0x8000, 0x4000, 100).unwrap();
        assert_eq!(
            transport.take_writes(),
            vec![(InstanceId(1), vec![0x00, 0x08, 0x00, 0x80, 0x40, 0x00, 0x00, 0x00])]
        );

        clock.advance(80);
        pad.rumble(0x8000, 0x4000, 100).unwrap();
        assert!(transport.take_writes().is_empty());
        assert_eq!(pad.rumble_state().expiry(), Some(Ticks(1_180)));
    }

    #[test]
    fn rumble_expires_with_single_stop_packet() {
        let (transport, clock, driver) = setup(&[ControllerFamily::OriginalXbox]);
        let mut pad = driver.open(0).unwrap();
        pad.rumble(0x1234, 0xABCD, 200).unwrap();
        transport.take_writes();

        clock.advance(199);
        pad.update();
        assert_eq!(pad.rumble_magnitudes(), (0x1234, 0xABCD));
        assert!(transport.take_writes().is_empty());

        clock.advance(2);
        assert_eq!(pad.rumble_magnitudes(), (0, 0));
        pad.update();
        assert_eq!(pad.rumble_state(), crate::RumbleState::default());
        assert_eq!(
            transport.take_writes(),
            vec![(InstanceId(1), vec![0x00, 0x06, 0x00, 0x00, 0x00, 0x00])]
        );

        clock.advance(500);
        pad.update();
        assert!(transport.take_writes().is_empty());
    }

    #[test]
    fn rumble_write_failure_is_reported_and_not_committed() {
        let (transport, _clock, driver) = setup(&[ControllerFamily::XboxOne]);
        let mut pad = driver.open(0).unwrap();
        transport.set_fail_writes(true);
        assert!(matches!(pad.rumble(1000, 1000, 50), Err(Error::TransportWrite(_))));
        assert_eq!(pad.rumble_state(), crate::RumbleState::default());
    }

    #[test]
    fn close_stops_rumble_and_detaches_reader() {
        let (transport, _clock, driver) = setup(&[ControllerFamily::Xbox360Wireless]);
        let pad = driver.open(0).unwrap();
        assert!(transport.is_reading(InstanceId(1)));
        pad.close();

        assert!(!transport.is_reading(InstanceId(1)));
        assert!(!driver.is_open(InstanceId(1)));
        assert_eq!(
            transport.take_writes(),
            vec![(InstanceId(1), vec![0x00, 0x01, 0x0F, 0xC0, 0x00, 0x00, 0x00, 0x00])]
        );
        // Still enumerated and can be reopened.
        assert_eq!(driver.count(), 1);
        assert!(driver.open(0).is_ok());
    }

    #[test]
    fn close_tolerates_write_failure() {
        let (transport, _clock, driver) = setup(&[ControllerFamily::XboxOne]);
        let pad = driver.open(0).unwrap();
        transport.set_fail_writes(true);
        pad.close();
        assert!(!transport.is_reading(InstanceId(1)));
    }

    #[test]
    fn reopened_slot_starts_from_neutral_state() {
        let (transport, _clock, driver) = setup(&[ControllerFamily::XboxOne]);
        let mut pad = driver.open(0).unwrap();
        transport.deliver(InstanceId(1), &xbox_one_report(0x0010, 0));
        pad.update();
        pad.close();

        let mut pad = driver.open(0).unwrap();
        assert!(pad.update().is_empty());
        assert_eq!(*pad.state(), xpad_protocol::GamepadState::default());
    }

    #[test]
    fn indices_shift_but_open_slots_keep_identity() {
        let (transport, _clock, driver) = setup(&[
            ControllerFamily::XboxOne,
            ControllerFamily::Xbox360Wired,
            ControllerFamily::OriginalXbox,
        ]);
        let pad = driver.open(2).unwrap();
        transport.detach(InstanceId(2));

        assert_eq!(driver.instance_id(1).unwrap(), InstanceId(3));
        assert_eq!(driver.name(1).unwrap(), "Original Xbox Controller #2");
        assert_eq!(pad.instance_id(), InstanceId(3));
    }
}
