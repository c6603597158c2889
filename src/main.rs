//! saxpad - saxophone fingering controller firmware for nRF52840.
//!
//! Eight touch pads select a note from the fingering table; the note is
//! sounded on a buzzer and broadcast to BLE centrals through the note
//! characteristic while advertising is on.  SELECT toggles advertising.
//!
//! ## Task layout
//!
//! ```text
//! pad tasks ×8 ──┐
//! select button ─┼─► SESSION_INPUT ─► session task ─► SoftdeviceTransport ─► RADIO_COMMANDS ─► radio task
//! radio task  ───┘                        │                                                      │
//!                                         ├─► NOTE ─► buzzer task                                │
//!                                         └─► STATUS / KEEP_AWAKE ─► display task                ▼
//!                                                                                         SoftDevice S140
//! ```
//!
//! The session task is the only owner of the [`BroadcastSession`]; every
//! input reaches it through one channel, so entry points never overlap.

#![no_std]
#![no_main]

mod ble;
mod buzzer;
mod power;
mod ui;

use core::mem;

use defmt::{debug, error, info, unwrap, warn, Format};
use embassy_executor::Spawner;
use embassy_nrf::gpio::{AnyPin, Pin};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_sync::signal::Signal;
use nrf_softdevice::{raw, Softdevice};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use saxpad::ui::input_logic::select_action;
use saxpad::ui::SessionCommand;
use saxpad::{
    AdapterState, BroadcastSession, BroadcastState, ChannelId, Error, Host, Pad, PadEvent,
    PadTracker, TransportError,
};

use crate::ble::gatt::Server;
use crate::ble::radio::{self, RadioReceiver, SoftdeviceTransport, RADIO_QUEUE};
use crate::ble::RadioCommand;
use crate::ui::UiStatus;

bind_interrupts!(struct Irqs {
    SPI0_TWI0 => twim::InterruptHandler<peripherals::TWISPI0>;
});

/// Depth of the session input queue.
const SESSION_QUEUE: usize = 16;

/// Everything the session task reacts to.
#[derive(Clone, Copy, Format)]
pub enum SessionInput {
    /// Debounced pad edge.
    Pad(PadEvent),
    /// Adapter state reported by the SoftDevice bring-up.
    Adapter(AdapterState),
    /// SELECT button pressed.
    Select,
    /// Result of an advertising start request.
    AdvertisingStarted(Result<(), TransportError>),
    /// A central connected and is about to read the note.
    ReadRequest(ChannelId),
    /// A central wrote the note characteristic.
    Write(ChannelId, u8),
    /// The radio can take another notification.
    ReadyToPush,
}

pub type InputSender = Sender<'static, CriticalSectionRawMutex, SessionInput, SESSION_QUEUE>;
type InputReceiver = Receiver<'static, CriticalSectionRawMutex, SessionInput, SESSION_QUEUE>;

static SESSION_INPUT: Channel<CriticalSectionRawMutex, SessionInput, SESSION_QUEUE> = Channel::new();
static RADIO_COMMANDS: Channel<CriticalSectionRawMutex, RadioCommand, RADIO_QUEUE> = Channel::new();

/// Latest pitch to sound.
static NOTE: Signal<CriticalSectionRawMutex, u8> = Signal::new();
/// Latest session snapshot for the display.
static STATUS: Signal<CriticalSectionRawMutex, UiStatus> = Signal::new();
/// Idle timer suppression (set while advertising).
static KEEP_AWAKE: Signal<CriticalSectionRawMutex, bool> = Signal::new();

static SERVER: StaticCell<Server> = StaticCell::new();

/// Session side effects, routed to the buzzer and display tasks.
struct FirmwareHost;

impl Host for FirmwareHost {
    fn sound_note(&mut self, pitch: u8) {
        NOTE.signal(pitch);
    }

    fn set_idle_timer_suppressed(&mut self, suppressed: bool) {
        KEEP_AWAKE.signal(suppressed);
    }

    fn state_changed(&mut self, state: &BroadcastState) {
        info!("session: {}", state);
    }
}

type Session = BroadcastSession<SoftdeviceTransport, FirmwareHost>;

/// Request advertising, remembering the request if the adapter is not up yet.
fn start(session: &mut Session, pending_start: &mut bool) {
    match session.start_advertising() {
        Ok(()) => *pending_start = false,
        Err(Error::AdapterNotReady) => {
            info!("adapter {} - start deferred", session.adapter_state());
            *pending_start = true;
        }
        Err(e) => {
            *pending_start = false;
            error!("failed to start advertising: {}", e);
        }
    }
}

fn handle(session: &mut Session, tracker: &mut PadTracker, pending_start: &mut bool, input: SessionInput) {
    match input {
        SessionInput::Pad(event) => {
            let Some(pads) = tracker.apply(event) else {
                return;
            };
            if let Err(e) = session.on_pad_set_changed(pads) {
                warn!("note push failed: {}", e);
            }
            debug!("pads {=u16:#x} -> {}", pads.bits(), session.current_fingering().name);
        }
        SessionInput::Adapter(state) => {
            session.on_adapter_state_changed(state);
            // A reset drops the registration; advertise again once it is back.
            if (*pending_start || session.state().needs_restart) && state.is_powered_on() {
                start(session, pending_start);
            }
        }
        SessionInput::Select => match select_action(session.is_advertising() || *pending_start) {
            SessionCommand::StartAdvertising => start(session, pending_start),
            SessionCommand::StopAdvertising => {
                *pending_start = false;
                session.stop_advertising();
            }
        },
        SessionInput::AdvertisingStarted(result) => match session.on_advertising_started(result) {
            Ok(()) => info!("advertising started"),
            Err(e) => error!("advertising failed: {}", e),
        },
        SessionInput::ReadRequest(channel) => {
            if session.on_subscriber_read_request(channel).is_none() {
                debug!("read on {} ignored", channel);
            }
        }
        SessionInput::Write(channel, value) => {
            if !session.on_write_request(channel, &[value]) {
                debug!("write to {} ignored", channel);
            }
        }
        SessionInput::ReadyToPush => {
            if let Err(e) = session.on_ready_to_push() {
                warn!("note push failed: {}", e);
            }
        }
    }
}

#[embassy_executor::task]
async fn session_task(transport: SoftdeviceTransport, rx: InputReceiver) -> ! {
    let mut session = BroadcastSession::new(transport, FirmwareHost);
    let mut tracker = PadTracker::new();
    let mut pending_start = false;

    // Broadcast from power-up; deferred until the adapter is on.
    start(&mut session, &mut pending_start);
    STATUS.signal(UiStatus::of(&session));

    loop {
        let input = rx.receive().await;
        handle(&mut session, &mut tracker, &mut pending_start, input);
        STATUS.signal(UiStatus::of(&session));
    }
}

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn radio_task(sd: &'static Softdevice, server: &'static Server, commands: RadioReceiver) -> ! {
    radio::radio_task(sd, server, commands, SESSION_INPUT.sender()).await
}

#[embassy_executor::task(pool_size = 8)]
async fn pad_task(pin: AnyPin, pad: Pad) -> ! {
    ui::buttons::pad_task(pin, pad, SESSION_INPUT.sender()).await
}

#[embassy_executor::task]
async fn select_task(pin: AnyPin) -> ! {
    ui::buttons::select_button_task(pin, SESSION_INPUT.sender()).await
}

#[embassy_executor::task]
async fn buzzer_task(pwm: buzzer::Buzzer) -> ! {
    buzzer::run(pwm, &NOTE).await
}

#[embassy_executor::task]
async fn display_task(i2c: Twim<'static, peripherals::TWISPI0>) -> ! {
    ui::display::run(i2c, &STATUS, &KEEP_AWAKE).await
}

fn softdevice_config() -> nrf_softdevice::Config {
    nrf_softdevice::Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_RC as u8,
            rc_ctiv: 16,
            rc_temp_ctiv: 2,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_500_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 23 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: saxpad::config::LOCAL_NAME.as_ptr() as _,
            current_len: saxpad::config::LOCAL_NAME.len() as u16,
            max_len: saxpad::config::LOCAL_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("saxpad starting");

    // Priorities 0, 1 and 4 belong to the SoftDevice.
    let mut config = embassy_nrf::config::Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    let p = embassy_nrf::init(config);
    interrupt::SPI0_TWI0.set_priority(Priority::P3);

    let session_rx = SESSION_INPUT.receiver();
    let session_tx = SESSION_INPUT.sender();

    let sd = Softdevice::enable(&softdevice_config());
    let server = match Server::new(sd) {
        Ok(server) => Some(SERVER.init(server)),
        Err(_) => {
            error!("GATT server registration failed");
            None
        }
    };
    let sd: &'static Softdevice = sd;
    unwrap!(spawner.spawn(softdevice_task(sd)));

    // The value handle is only known once the table is built.
    let note_handle = server.as_ref().map_or(0, |s| s.instrument.note_value_handle);
    let transport = SoftdeviceTransport::new(RADIO_COMMANDS.sender(), note_handle);
    unwrap!(spawner.spawn(session_task(transport, session_rx)));

    match server {
        Some(server) => {
            unwrap!(spawner.spawn(radio_task(sd, server, RADIO_COMMANDS.receiver())));
            session_tx.send(SessionInput::Adapter(AdapterState::PoweredOn)).await;
        }
        None => {
            session_tx.send(SessionInput::Adapter(AdapterState::Unsupported)).await;
        }
    }

    let pads: [(AnyPin, Pad); 8] = [
        (p.P0_03.degrade(), Pad::RightIndex),
        (p.P0_04.degrade(), Pad::RightMiddle),
        (p.P0_28.degrade(), Pad::RightRing),
        (p.P0_29.degrade(), Pad::LeftIndex),
        (p.P0_30.degrade(), Pad::LeftMiddle),
        (p.P0_31.degrade(), Pad::LeftRing),
        (p.P1_01.degrade(), Pad::LeftPinkyTop),
        (p.P1_02.degrade(), Pad::LeftPinkyBottom),
    ];
    for (pin, pad) in pads {
        unwrap!(spawner.spawn(pad_task(pin, pad)));
    }
    unwrap!(spawner.spawn(select_task(p.P0_24.degrade())));

    unwrap!(spawner.spawn(buzzer_task(buzzer::Buzzer::new(p.PWM0, p.P0_13))));

    let i2c = Twim::new(p.TWISPI0, Irqs, p.P0_26, p.P0_27, twim::Config::default());
    unwrap!(spawner.spawn(display_task(i2c)));

    info!("saxpad ready");
}
