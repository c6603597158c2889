//! Unit tests for the broadcast session state machine.
//!
//! These tests run on the host with a recording fake transport and host.

use super::*;
use crate::pads::{Pad, PadEvent, PadTracker};

const HANDLE: ChannelId = ChannelId(0x000E);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    Register(ServiceDefinition),
    Unregister,
    StartAdvertising(Advertisement),
    StopAdvertising,
    Respond(ChannelId, Vec<u8>),
    Notify(ChannelId, Vec<u8>),
}

#[derive(Default)]
struct FakeTransport {
    calls: Vec<Call>,
    registered: usize,
    fail_register: bool,
    fail_advertising: bool,
    notify_full: bool,
}

impl FakeTransport {
    fn notifications(&self) -> Vec<Vec<u8>> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Notify(_, v) => Some(v.clone()),
                _ => None,
            })
            .collect()
    }
}

impl Transport for FakeTransport {
    fn register_service(&mut self, service: &ServiceDefinition) -> Result<ChannelId, TransportError> {
        self.calls.push(Call::Register(*service));
        if self.fail_register {
            return Err(TransportError::ServiceRegistrationFailed);
        }
        self.registered += 1;
        Ok(HANDLE)
    }

    fn unregister_services(&mut self) {
        self.calls.push(Call::Unregister);
        self.registered = 0;
    }

    fn start_advertising(&mut self, advertisement: &Advertisement) -> Result<(), TransportError> {
        self.calls.push(Call::StartAdvertising(*advertisement));
        if self.fail_advertising {
            Err(TransportError::AdvertisingFailed)
        } else {
            Ok(())
        }
    }

    fn stop_advertising(&mut self) {
        self.calls.push(Call::StopAdvertising);
    }

    fn respond_to_read(&mut self, channel: ChannelId, value: &[u8]) {
        self.calls.push(Call::Respond(channel, value.to_vec()));
    }

    fn notify(&mut self, channel: ChannelId, value: &[u8]) -> Result<(), TransportError> {
        self.calls.push(Call::Notify(channel, value.to_vec()));
        if self.notify_full {
            Err(TransportError::NotifyQueueFull)
        } else {
            Ok(())
        }
    }
}

#[derive(Default)]
struct FakeHost {
    notes: Vec<u8>,
    idle_suppressed: Vec<bool>,
    states: Vec<BroadcastState>,
}

impl Host for FakeHost {
    fn sound_note(&mut self, pitch: u8) {
        self.notes.push(pitch);
    }

    fn set_idle_timer_suppressed(&mut self, suppressed: bool) {
        self.idle_suppressed.push(suppressed);
    }

    fn state_changed(&mut self, state: &BroadcastState) {
        self.states.push(*state);
    }
}

type Session = BroadcastSession<FakeTransport, FakeHost>;

fn session() -> Session {
    BroadcastSession::new(FakeTransport::default(), FakeHost::default())
}

fn powered_session() -> Session {
    let mut s = session();
    s.on_adapter_state_changed(AdapterState::PoweredOn);
    s
}

fn advertising_session() -> Session {
    let mut s = powered_session();
    s.start_advertising().unwrap();
    s
}

fn transport_mut(s: &mut Session) -> &mut FakeTransport {
    &mut s.transport
}

// ═══════════════════════════════════════════════════════════════════════════
// Adapter state
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn new_session_is_unknown_and_idle() {
    let s = session();
    assert_eq!(s.adapter_state(), AdapterState::Unknown);
    assert!(!s.is_advertising());
    assert_eq!(s.channel(), None);
    assert_eq!(s.pads(), PadSet::EMPTY);
}

#[test]
fn adapter_state_is_taken_as_reported() {
    let mut s = session();
    for state in [
        AdapterState::Resetting,
        AdapterState::PoweredOn,
        AdapterState::Unauthorized,
        AdapterState::Unsupported,
        AdapterState::PoweredOff,
    ] {
        s.on_adapter_state_changed(state);
        assert_eq!(s.adapter_state(), state);
    }
    assert_eq!(s.host().states.len(), 5);
}

#[test]
fn repeated_adapter_state_does_not_notify() {
    let mut s = powered_session();
    s.on_adapter_state_changed(AdapterState::PoweredOn);
    assert_eq!(s.host().states.len(), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Advertising lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn start_without_power_reports_not_ready() {
    for state in [
        AdapterState::Unknown,
        AdapterState::Resetting,
        AdapterState::Unsupported,
        AdapterState::Unauthorized,
        AdapterState::PoweredOff,
    ] {
        let mut s = session();
        s.on_adapter_state_changed(state);
        assert_eq!(s.start_advertising(), Err(Error::AdapterNotReady));
        assert!(!s.is_advertising());
        assert_eq!(s.channel(), None);
        assert!(s.transport().calls.is_empty());
    }
}

#[test]
fn powered_off_then_start_is_not_ready() {
    let mut s = session();
    s.on_adapter_state_changed(AdapterState::PoweredOff);
    assert_eq!(s.start_advertising(), Err(Error::AdapterNotReady));
    assert!(!s.is_advertising());
    assert!(s.host().idle_suppressed.is_empty());
}

#[test]
fn start_registers_one_channel_and_advertises() {
    let s = advertising_session();
    assert!(s.is_advertising());
    assert_eq!(s.channel(), Some(HANDLE));
    assert_eq!(s.transport().registered, 1);
    assert_eq!(
        s.transport().calls,
        vec![
            Call::Register(NOTE_SERVICE),
            Call::StartAdvertising(ADVERTISEMENT),
        ]
    );
    assert_eq!(s.host().idle_suppressed, vec![true]);
    assert_eq!(
        s.host().states.last().copied(),
        Some(BroadcastState {
            adapter: AdapterState::PoweredOn,
            broadcast: Broadcast::Advertising { channel: HANDLE },
            needs_restart: false,
        })
    );
}

#[test]
fn note_service_uses_fixed_identifiers() {
    assert_eq!(
        NOTE_SERVICE.service_uuid,
        [
            0xE5, 0x6A, 0x08, 0x2E, 0xC4, 0x9B, 0x47, 0xCA, 0xA2, 0xAB, 0x38, 0x91, 0x27, 0xB8,
            0xCB, 0xE3
        ]
    );
    assert_eq!(NOTE_SERVICE.characteristic_uuid, 0xFFF0);
    assert!(NOTE_SERVICE.properties.read);
    assert!(NOTE_SERVICE.properties.write);
    assert!(NOTE_SERVICE.properties.notify);
    assert_eq!(NOTE_SERVICE.value_len, 1);
    assert_eq!(ADVERTISEMENT.local_name, "Saxophone");
    assert_eq!(ADVERTISEMENT.service_uuid, NOTE_SERVICE.service_uuid);
}

#[test]
fn second_start_does_not_register_again() {
    let mut s = advertising_session();
    assert_eq!(s.start_advertising(), Ok(()));
    assert_eq!(s.transport().registered, 1);
    assert_eq!(s.transport().calls.len(), 2);
}

#[test]
fn start_registration_failure_stays_idle() {
    let mut s = powered_session();
    transport_mut(&mut s).fail_register = true;
    assert_eq!(
        s.start_advertising(),
        Err(Error::Transport(TransportError::ServiceRegistrationFailed))
    );
    assert!(!s.is_advertising());
    assert!(s.host().idle_suppressed.is_empty());
}

#[test]
fn start_advertising_failure_unregisters_service() {
    let mut s = powered_session();
    transport_mut(&mut s).fail_advertising = true;
    assert_eq!(
        s.start_advertising(),
        Err(Error::Transport(TransportError::AdvertisingFailed))
    );
    assert!(!s.is_advertising());
    assert_eq!(s.transport().registered, 0);
    assert_eq!(s.transport().calls.last(), Some(&Call::Unregister));
}

#[test]
fn retry_after_power_on_succeeds() {
    let mut s = session();
    assert_eq!(s.start_advertising(), Err(Error::AdapterNotReady));
    s.on_adapter_state_changed(AdapterState::PoweredOn);
    assert_eq!(s.start_advertising(), Ok(()));
    assert!(s.is_advertising());
}

#[test]
fn stop_clears_channel_and_is_idempotent() {
    let mut s = advertising_session();
    s.stop_advertising();
    assert!(!s.is_advertising());
    assert_eq!(s.channel(), None);
    assert_eq!(s.transport().registered, 0);
    assert_eq!(s.host().idle_suppressed, vec![true, false]);

    let calls = s.transport().calls.len();
    s.stop_advertising();
    assert!(!s.is_advertising());
    assert_eq!(s.transport().calls.len(), calls);
    assert_eq!(s.host().idle_suppressed, vec![true, false]);
}

#[test]
fn stop_without_power_is_a_no_op() {
    let mut s = advertising_session();
    s.on_adapter_state_changed(AdapterState::PoweredOff);
    s.stop_advertising();
    // Nothing is on air to stop; the lifecycle only changes on a powered stop.
    assert!(s.is_advertising());
    assert!(!s.transport().calls.contains(&Call::StopAdvertising));

    s.on_adapter_state_changed(AdapterState::PoweredOn);
    s.stop_advertising();
    assert!(!s.is_advertising());
}

#[test]
fn stop_then_start_registers_a_fresh_channel() {
    let mut s = advertising_session();
    s.stop_advertising();
    s.start_advertising().unwrap();
    assert_eq!(s.transport().registered, 1);
    assert_eq!(s.channel(), Some(HANDLE));
}

#[test]
fn start_after_adapter_reset_registers_and_advertises_again() {
    let mut s = advertising_session();
    s.on_adapter_state_changed(AdapterState::Resetting);
    assert!(s.state().needs_restart);
    s.on_adapter_state_changed(AdapterState::PoweredOn);
    transport_mut(&mut s).calls.clear();

    assert_eq!(s.start_advertising(), Ok(()));
    assert_eq!(
        s.transport().calls,
        vec![
            Call::Unregister,
            Call::Register(NOTE_SERVICE),
            Call::StartAdvertising(ADVERTISEMENT),
        ]
    );
    assert_eq!(s.transport().registered, 1);
    assert!(s.state().is_on_air());
    assert_eq!(s.channel(), Some(HANDLE));

    // Live again: a second start is a no-op.
    transport_mut(&mut s).calls.clear();
    s.start_advertising().unwrap();
    assert!(s.transport().calls.is_empty());
}

#[test]
fn stale_registration_is_not_pushed_to() {
    let mut s = advertising_session();
    s.on_adapter_state_changed(AdapterState::PoweredOff);
    s.on_adapter_state_changed(AdapterState::PoweredOn);
    s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex])).unwrap();
    assert!(s.transport().notifications().is_empty());

    s.start_advertising().unwrap();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightMiddle])).unwrap();
    assert_eq!(s.transport().notifications(), vec![vec![71]]);
}

#[test]
fn failed_restart_after_reset_falls_back_to_idle() {
    let mut s = advertising_session();
    s.on_adapter_state_changed(AdapterState::Resetting);
    s.on_adapter_state_changed(AdapterState::PoweredOn);
    transport_mut(&mut s).fail_advertising = true;

    assert_eq!(
        s.start_advertising(),
        Err(Error::Transport(TransportError::AdvertisingFailed))
    );
    assert!(!s.is_advertising());
    assert!(!s.state().needs_restart);
    assert_eq!(s.channel(), None);
    assert_eq!(s.host().idle_suppressed.last(), Some(&false));
}

#[test]
fn advertising_started_report_does_not_change_state() {
    let mut s = advertising_session();
    assert_eq!(
        s.on_advertising_started(Err(TransportError::Raw(0x0D))),
        Err(Error::Transport(TransportError::Raw(0x0D)))
    );
    assert!(s.is_advertising());
    assert_eq!(s.on_advertising_started(Ok(())), Ok(()));
}

// ═══════════════════════════════════════════════════════════════════════════
// Reads, writes, pushes
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn read_on_our_channel_returns_current_wire_byte() {
    let mut s = advertising_session();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex, Pad::RightMiddle]))
        .unwrap();
    assert_eq!(s.on_subscriber_read_request(HANDLE), Some([0x45]));
    assert_eq!(
        s.transport().calls.last(),
        Some(&Call::Respond(HANDLE, vec![0x45]))
    );
}

#[test]
fn read_on_other_channel_is_ignored() {
    let mut s = advertising_session();
    let calls = s.transport().calls.len();
    assert_eq!(s.on_subscriber_read_request(ChannelId(0x0020)), None);
    assert_eq!(s.transport().calls.len(), calls);
}

#[test]
fn read_while_idle_is_ignored() {
    let mut s = powered_session();
    assert_eq!(s.on_subscriber_read_request(HANDLE), None);
    assert!(s.transport().calls.is_empty());
}

#[test]
fn writes_are_accepted_and_ignored() {
    let mut s = advertising_session();
    let before = *s.state();
    assert!(s.on_write_request(HANDLE, &[0x7F]));
    assert!(!s.on_write_request(ChannelId(1), &[0x7F]));
    assert_eq!(*s.state(), before);
    assert_eq!(s.pads(), PadSet::EMPTY);
}

#[test]
fn ready_to_push_resends_current_byte() {
    let mut s = advertising_session();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightMiddle])).unwrap();
    s.on_ready_to_push().unwrap();
    assert_eq!(s.transport().notifications(), vec![vec![0x47], vec![0x47]]);
}

#[test]
fn ready_to_push_without_channel_is_a_no_op() {
    let mut s = powered_session();
    assert_eq!(s.on_ready_to_push(), Ok(()));
    assert!(s.transport().calls.is_empty());

    let mut s = session();
    assert_eq!(s.on_ready_to_push(), Ok(()));
    assert!(s.transport().calls.is_empty());
}

#[test]
fn notify_queue_full_is_surfaced_without_state_change() {
    let mut s = advertising_session();
    transport_mut(&mut s).notify_full = true;
    assert_eq!(
        s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex])),
        Err(TransportError::NotifyQueueFull)
    );
    assert!(s.is_advertising());
    assert_eq!(s.pads(), PadSet::of(&[Pad::RightIndex]));
    assert_eq!(s.host().notes, vec![71]);
}

// ═══════════════════════════════════════════════════════════════════════════
// Pad changes
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn pad_change_always_sounds_the_resolved_pitch() {
    let mut s = session();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex])).unwrap();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex, Pad::LeftPinkyTop]))
        .unwrap();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightMiddle])).unwrap();
    s.on_pad_set_changed(PadSet::EMPTY).unwrap();
    assert_eq!(s.host().notes, vec![71, 60, 71, 60]);
}

#[test]
fn pad_change_while_idle_pushes_nothing() {
    let mut s = powered_session();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex])).unwrap();
    assert!(s.transport().notifications().is_empty());
}

#[test]
fn pad_change_while_advertising_pushes_one_byte() {
    let mut s = advertising_session();
    s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex, Pad::RightMiddle, Pad::RightRing]))
        .unwrap();
    assert_eq!(
        s.transport().calls.last(),
        Some(&Call::Notify(HANDLE, vec![0x43]))
    );
}

#[test]
fn unrecognized_fingering_sounds_and_broadcasts_default() {
    let mut s = advertising_session();
    let odd = PadSet::of(&[Pad::LeftPinkyTop, Pad::LeftIndex]);
    s.on_pad_set_changed(odd).unwrap();
    assert_eq!(s.host().notes, vec![60]);
    assert_eq!(s.transport().notifications(), vec![vec![0x3C]]);
    assert_eq!(s.current_fingering().name, crate::fingering::UNRECOGNIZED_NAME);
}

#[test]
fn no_push_while_adapter_is_down() {
    let mut s = advertising_session();
    s.on_adapter_state_changed(AdapterState::Resetting);
    s.on_pad_set_changed(PadSet::of(&[Pad::RightIndex])).unwrap();
    assert!(s.transport().notifications().is_empty());
    assert_eq!(s.host().notes, vec![71]);
}

#[test]
fn scenario_full_stack_then_release_pinky() {
    let mut s = advertising_session();
    let mut tracker = PadTracker::new();
    for pad in [
        Pad::RightIndex,
        Pad::RightMiddle,
        Pad::RightRing,
        Pad::LeftIndex,
        Pad::LeftMiddle,
        Pad::LeftRing,
        Pad::LeftPinkyBottom,
    ] {
        let pads = tracker.apply(PadEvent::Pressed(pad)).unwrap();
        s.on_pad_set_changed(pads).unwrap();
    }
    let c4 = s.current_fingering();
    assert_eq!((c4.name, c4.pitch, c4.wire_byte), ("C4", 60, 0x3C));
    assert_eq!(s.host().notes.last(), Some(&60));
    assert_eq!(s.transport().notifications().last(), Some(&vec![0x3C]));

    let pads = tracker
        .apply(PadEvent::Released(Pad::LeftPinkyBottom))
        .unwrap();
    s.on_pad_set_changed(pads).unwrap();
    let d4 = s.current_fingering();
    assert_eq!((d4.name, d4.pitch, d4.wire_byte), ("D4", 62, 0x3E));
    assert_eq!(s.host().notes.last(), Some(&62));
    assert_eq!(s.transport().notifications().last(), Some(&vec![0x3E]));
    assert_eq!(s.host().notes.len(), 8);
}
