//! BLE peripheral broadcast session.
//!
//! Owns the radio-side state machine:
//!
//! ```text
//! adapter:    Unknown → {Unsupported, Unauthorized, PoweredOff, Resetting, PoweredOn}
//! broadcast:  Idle ⇄ Advertising            (start/stop only while PoweredOn)
//! ```
//!
//! and keeps the broadcast value and the locally sounded note in step with
//! the current pad set.  The platform radio is reached only through
//! [`Transport`]; sound, idle-timer and state-change side effects go to
//! [`Host`].
//!
//! Every entry point takes `&mut self` and completes without blocking.
//! Callers feeding the session from several sources must serialize them
//! through one queue (the firmware uses a single Embassy channel).

mod state;
#[cfg(test)]
mod tests;

pub use state::{AdapterState, Broadcast, BroadcastState, ChannelId};

use crate::config;
use crate::error::{Error, TransportError};
use crate::fingering::{self, Fingering};
use crate::pads::PadSet;

/// GATT characteristic capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CharacteristicProperties {
    pub read: bool,
    pub write: bool,
    pub notify: bool,
}

/// The one primary service the session registers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceDefinition {
    /// 128-bit service UUID, big-endian.
    pub service_uuid: [u8; 16],
    /// 16-bit characteristic UUID.
    pub characteristic_uuid: u16,
    pub properties: CharacteristicProperties,
    /// Characteristic value length in bytes.
    pub value_len: usize,
}

/// What goes on air while advertising.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Advertisement {
    pub local_name: &'static str,
    pub service_uuid: [u8; 16],
}

/// Note service: one read/write/notify characteristic carrying the pitch.
pub const NOTE_SERVICE: ServiceDefinition = ServiceDefinition {
    service_uuid: config::SERVICE_UUID,
    characteristic_uuid: config::NOTE_CHARACTERISTIC_UUID,
    properties: CharacteristicProperties {
        read: true,
        write: true,
        notify: true,
    },
    value_len: config::NOTE_PAYLOAD_LEN,
};

pub const ADVERTISEMENT: Advertisement = Advertisement {
    local_name: config::LOCAL_NAME,
    service_uuid: config::SERVICE_UUID,
};

/// Platform radio operations the session depends on.
///
/// Implementations must not block: queue the request and return.
pub trait Transport {
    /// Add `service` to the attribute table.  Returns the characteristic
    /// handle used for reads and notifications.
    fn register_service(&mut self, service: &ServiceDefinition) -> Result<ChannelId, TransportError>;

    /// Remove every service registered by this session.
    fn unregister_services(&mut self);

    fn start_advertising(&mut self, advertisement: &Advertisement) -> Result<(), TransportError>;

    fn stop_advertising(&mut self);

    /// Answer a pending read on `channel` successfully with `value`.
    fn respond_to_read(&mut self, channel: ChannelId, value: &[u8]);

    /// Push `value` to every subscriber of `channel`.  Zero subscribers is
    /// a success.
    fn notify(&mut self, channel: ChannelId, value: &[u8]) -> Result<(), TransportError>;
}

/// Device-side effects of the session.
pub trait Host {
    /// Sound a note locally (fire-and-forget).
    fn sound_note(&mut self, pitch: u8);

    /// Keep the device awake (`true`) while advertising.
    fn set_idle_timer_suppressed(&mut self, _suppressed: bool) {}

    /// Called after the adapter state or the advertising lifecycle changed.
    fn state_changed(&mut self, _state: &BroadcastState) {}
}

/// Peripheral session broadcasting the current fingering.
pub struct BroadcastSession<T, H> {
    state: BroadcastState,
    pads: PadSet,
    transport: T,
    host: H,
}

impl<T: Transport, H: Host> BroadcastSession<T, H> {
    pub fn new(transport: T, host: H) -> Self {
        Self {
            state: BroadcastState::new(),
            pads: PadSet::EMPTY,
            transport,
            host,
        }
    }

    pub fn state(&self) -> &BroadcastState {
        &self.state
    }

    pub fn adapter_state(&self) -> AdapterState {
        self.state.adapter
    }

    pub fn is_advertising(&self) -> bool {
        self.state.is_advertising()
    }

    /// Registered note characteristic, present only while advertising.
    pub fn channel(&self) -> Option<ChannelId> {
        self.state.channel()
    }

    pub fn pads(&self) -> PadSet {
        self.pads
    }

    pub fn current_fingering(&self) -> Fingering {
        fingering::resolve(self.pads)
    }

    /// Wire payload for the current pads.
    pub fn payload(&self) -> [u8; 1] {
        self.current_fingering().payload()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Platform report of a new adapter state.  Trusted as-is.
    pub fn on_adapter_state_changed(&mut self, adapter: AdapterState) {
        if self.state.adapter == adapter {
            return;
        }
        if self.state.adapter.is_powered_on() && self.state.is_advertising() {
            self.state.needs_restart = true;
        }
        self.state.adapter = adapter;
        self.host.state_changed(&self.state);
    }

    /// Register the note service and start advertising.
    ///
    /// Fails with [`Error::AdapterNotReady`] unless the adapter is powered
    /// on; nothing is registered in that case and the caller may retry on
    /// the next adapter state change.  Starting while already advertising
    /// is a no-op, unless the adapter went down in between: then the
    /// service is registered and advertised again.
    pub fn start_advertising(&mut self) -> Result<(), Error> {
        if !self.state.adapter.is_powered_on() {
            return Err(Error::AdapterNotReady);
        }
        if self.state.is_on_air() {
            return Ok(());
        }
        if self.state.needs_restart {
            self.transport.unregister_services();
        }

        let result = self.register_and_advertise();
        if result.is_err() && self.state.needs_restart {
            // The old registration is gone too.
            self.state.broadcast = Broadcast::Idle;
            self.state.needs_restart = false;
            self.host.set_idle_timer_suppressed(false);
            self.host.state_changed(&self.state);
        }
        result
    }

    fn register_and_advertise(&mut self) -> Result<(), Error> {
        let channel = self.transport.register_service(&NOTE_SERVICE)?;
        if let Err(e) = self.transport.start_advertising(&ADVERTISEMENT) {
            self.transport.unregister_services();
            return Err(e.into());
        }

        self.state.broadcast = Broadcast::Advertising { channel };
        self.state.needs_restart = false;
        self.host.set_idle_timer_suppressed(true);
        self.host.state_changed(&self.state);
        Ok(())
    }

    /// Stop advertising and drop the service.
    ///
    /// A no-op unless the adapter is powered on and advertising is active:
    /// with the radio down there is nothing on air to stop.
    pub fn stop_advertising(&mut self) {
        if !self.state.adapter.is_powered_on() || !self.state.is_advertising() {
            return;
        }

        self.transport.stop_advertising();
        self.transport.unregister_services();

        self.state.broadcast = Broadcast::Idle;
        self.state.needs_restart = false;
        self.host.set_idle_timer_suppressed(false);
        self.host.state_changed(&self.state);
    }

    /// Asynchronous result of a `start_advertising` request.  Surfaced to
    /// the caller for logging; the lifecycle is only driven by start/stop.
    pub fn on_advertising_started(&mut self, result: Result<(), TransportError>) -> Result<(), Error> {
        result.map_err(Error::from)
    }

    /// A subscriber reads `channel`.  Answers with the current wire byte if
    /// it is our characteristic; anything else is not ours and gets no
    /// response.
    pub fn on_subscriber_read_request(&mut self, channel: ChannelId) -> Option<[u8; 1]> {
        if self.state.channel() != Some(channel) {
            return None;
        }
        let payload = self.payload();
        self.transport.respond_to_read(channel, &payload);
        Some(payload)
    }

    /// A subscriber wrote to `channel`.  Writes are accepted and ignored.
    /// Returns `true` if the write targeted our characteristic.
    pub fn on_write_request(&mut self, channel: ChannelId, _data: &[u8]) -> bool {
        self.state.channel() == Some(channel)
    }

    /// The transport has room again: re-send the current wire byte.
    pub fn on_ready_to_push(&mut self) -> Result<(), TransportError> {
        self.push(self.current_fingering())
    }

    /// The pressed pads changed.  Always sounds the resolved pitch (also on
    /// release and for unrecognized fingerings); while advertising also
    /// pushes the new wire byte.
    pub fn on_pad_set_changed(&mut self, pads: PadSet) -> Result<(), TransportError> {
        self.pads = pads;
        let fingering = fingering::resolve(pads);
        self.host.sound_note(fingering.pitch);
        self.push(fingering)
    }

    fn push(&mut self, fingering: Fingering) -> Result<(), TransportError> {
        let Some(channel) = self.state.channel() else {
            return Ok(());
        };
        if !self.state.adapter.is_powered_on() || self.state.needs_restart {
            return Ok(());
        }
        self.transport.notify(channel, &fingering.payload())
    }
}
