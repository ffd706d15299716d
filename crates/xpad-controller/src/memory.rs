//! In-process [`Transport`] backed by plain memory.
//!
//! Devices are attached and detached by hand, input reports are injected with
//! [`MemoryTransport::deliver`], and outbound packets are recorded. Hotplug
//! notifications queue up until the next [`Transport::poll_hubs`], the way a
//! real host stack reports them while servicing hubs.

use std::sync::{Mutex, MutexGuard, PoisonError};

use ahash::AHashMap;

use crate::transport::{
    ConnectionEvent, ConnectionHandler, DeviceDescriptor, InstanceId, ReadCompletion,
    ReadHandler, Transport, TransportError,
};

/// Endpoint address reported with injected IN completions.
pub const INTERRUPT_IN_ENDPOINT: u8 = 0x81;

#[derive(Default)]
struct State {
    devices: Vec<DeviceDescriptor>,
    readers: AHashMap<InstanceId, ReadHandler>,
    connection: Option<ConnectionHandler>,
    pending: Vec<ConnectionEvent>,
    writes: Vec<(InstanceId, Vec<u8>)>,
    fail_writes: bool,
    init_calls: u32,
}

#[derive(Default)]
pub struct MemoryTransport {
    state: Mutex<State>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a device to the end of the enumeration list.
    ///
    /// The connect notification stays queued until the next
    /// [`Transport::poll_hubs`]; long-lived users must poll to keep the
    /// queue from growing.
    pub fn attach(&self, descriptor: DeviceDescriptor) {
        let mut state = self.state();
        state
            .pending
            .push(ConnectionEvent::Connected(descriptor.instance_id));
        state.devices.push(descriptor);
    }

    /// Unplugs a device. Its read pipe dies with it.
    ///
    /// Queues a disconnect notification like [`MemoryTransport::attach`].
    pub fn detach(&self, id: InstanceId) -> bool {
        let mut state = self.state();
        let before = state.devices.len();
        state.devices.retain(|d| d.instance_id != id);
        if state.devices.len() == before {
            return false;
        }
        state.readers.remove(&id);
        state.pending.push(ConnectionEvent::Disconnected(id));
        true
    }

    /// Completes an IN transfer with status 0. Returns `false` when nothing is
    /// reading the device.
    pub fn deliver(&self, id: InstanceId, data: &[u8]) -> bool {
        self.deliver_with_status(id, 0, data)
    }

    pub fn deliver_with_status(&self, id: InstanceId, status: i32, data: &[u8]) -> bool {
        // Handlers run without the lock held, like a completion interrupt.
        let Some(reader) = self.state().readers.get(&id).cloned() else {
            return false;
        };
        reader(ReadCompletion {
            device: id,
            endpoint: INTERRUPT_IN_ENDPOINT,
            status,
            data,
        });
        true
    }

    /// Hotplug notifications waiting for the next hub poll.
    pub fn pending_events(&self) -> usize {
        self.state().pending.len()
    }

    pub fn is_reading(&self, id: InstanceId) -> bool {
        self.state().readers.contains_key(&id)
    }

    /// Makes every following write fail, or succeed again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.state().fail_writes = fail;
    }

    /// Drains the recorded OUT transfers.
    pub fn take_writes(&self) -> Vec<(InstanceId, Vec<u8>)> {
        std::mem::take(&mut self.state().writes)
    }

    pub fn init_calls(&self) -> u32 {
        self.state().init_calls
    }

    pub fn has_connection_handler(&self) -> bool {
        self.state().connection.is_some()
    }
}

impl Transport for MemoryTransport {
    fn init(&self) -> Result<(), TransportError> {
        self.state().init_calls += 1;
        Ok(())
    }

    fn devices(&self) -> Vec<DeviceDescriptor> {
        self.state().devices.clone()
    }

    /// Delivers and drops every queued notification, even with no handler
    /// installed.
    fn poll_hubs(&self) {
        let (handler, pending) = {
            let mut state = self.state();
            (state.connection.clone(), std::mem::take(&mut state.pending))
        };
        if let Some(handler) = handler {
            for event in pending {
                handler(event);
            }
        }
    }

    fn set_connection_handler(&self, handler: Option<ConnectionHandler>) {
        self.state().connection = handler;
    }

    fn start_read(&self, device: InstanceId, handler: ReadHandler) -> Result<(), TransportError> {
        let mut state = self.state();
        if !state.devices.iter().any(|d| d.instance_id == device) {
            return Err(TransportError::NotAttached(device));
        }
        state.readers.insert(device, handler);
        Ok(())
    }

    fn stop_read(&self, device: InstanceId) {
        self.state().readers.remove(&device);
    }

    fn write(&self, device: InstanceId, packet: &[u8]) -> Result<(), TransportError> {
        let mut state = self.state();
        if !state.devices.iter().any(|d| d.instance_id == device) {
            return Err(TransportError::NotAttached(device));
        }
        if state.fail_writes {
            return Err(TransportError::Rejected(-1));
        }
        state.writes.push((device, packet.to_vec()));
        Ok(())
    }
}
