//! SoftDevice peripheral radio: advertising, connection and notifications.
//!
//! [`SoftdeviceTransport`] is handed to the session task.  Every call is a
//! `try_send` into the radio command queue, so session entry points never
//! wait on the radio.  [`radio_task`] owns the SoftDevice side and feeds
//! platform callbacks (advertising result, reads, CCCD subscriptions,
//! "ready to push") back into the session input channel.

use defmt::{debug, info, warn};
use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Receiver, Sender};
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::gatt_server::{self, NotifyValueError};
use nrf_softdevice::ble::{peripheral, Connection};
use nrf_softdevice::{RawError, Softdevice};

use saxpad::ble::adv_data;
use saxpad::config::{self, BLE_ADV_INTERVAL, NOTIFY_RETRY_MS};
use saxpad::session::{Advertisement, ServiceDefinition, ADVERTISEMENT, NOTE_SERVICE};
use saxpad::{ChannelId, Transport, TransportError};

use crate::ble::gatt::{InstrumentServiceEvent, Server, ServerEvent};
use crate::ble::RadioCommand;
use crate::{InputSender, SessionInput};

/// Depth of the radio command queue.
pub const RADIO_QUEUE: usize = 8;

pub type RadioSender = Sender<'static, CriticalSectionRawMutex, RadioCommand, RADIO_QUEUE>;
pub type RadioReceiver = Receiver<'static, CriticalSectionRawMutex, RadioCommand, RADIO_QUEUE>;

/// [`Transport`] backed by the radio task.
pub struct SoftdeviceTransport {
    commands: RadioSender,
    note_handle: u16,
    registered: bool,
}

impl SoftdeviceTransport {
    pub fn new(commands: RadioSender, note_handle: u16) -> Self {
        Self {
            commands,
            note_handle,
            registered: false,
        }
    }

    fn queue(&self, cmd: RadioCommand, err: TransportError) -> Result<(), TransportError> {
        self.commands.try_send(cmd).map_err(|_| err)
    }

    fn owns(&self, channel: ChannelId) -> bool {
        self.registered && channel == ChannelId(self.note_handle)
    }
}

impl Transport for SoftdeviceTransport {
    fn register_service(&mut self, service: &ServiceDefinition) -> Result<ChannelId, TransportError> {
        // The SoftDevice table is built at boot; only the compiled-in
        // service can be exposed.
        if *service != NOTE_SERVICE {
            return Err(TransportError::ServiceRegistrationFailed);
        }
        self.registered = true;
        Ok(ChannelId(self.note_handle))
    }

    fn unregister_services(&mut self) {
        self.registered = false;
    }

    fn start_advertising(&mut self, advertisement: &Advertisement) -> Result<(), TransportError> {
        if *advertisement != ADVERTISEMENT {
            return Err(TransportError::AdvertisingFailed);
        }
        self.queue(RadioCommand::StartAdvertising, TransportError::NotConnected)
    }

    fn stop_advertising(&mut self) {
        if self.commands.try_send(RadioCommand::StopAdvertising).is_err() {
            warn!("radio queue full - stop request dropped");
        }
    }

    fn respond_to_read(&mut self, channel: ChannelId, value: &[u8]) {
        if !self.owns(channel) {
            return;
        }
        let Some(&v) = value.first() else {
            return;
        };
        if self.commands.try_send(RadioCommand::SetValue(v)).is_err() {
            warn!("radio queue full - read response dropped");
        }
    }

    fn notify(&mut self, channel: ChannelId, value: &[u8]) -> Result<(), TransportError> {
        if !self.owns(channel) {
            return Err(TransportError::NotConnected);
        }
        let Some(&v) = value.first() else {
            return Ok(());
        };
        self.queue(RadioCommand::Notify(v), TransportError::NotifyQueueFull)
    }
}

/// Run the peripheral radio forever.
pub async fn radio_task(
    sd: &'static Softdevice,
    server: &'static Server,
    commands: RadioReceiver,
    session_tx: InputSender,
) -> ! {
    let channel = ChannelId(server.instrument.note_value_handle);

    let (adv, scan) = match (
        adv_data::advertising_data(&ADVERTISEMENT),
        adv_data::scan_response_data(&ADVERTISEMENT),
    ) {
        (Ok(adv), Ok(scan)) => (adv, scan),
        _ => {
            defmt::error!("advertising payload does not fit - radio disabled");
            loop {
                if let RadioCommand::StartAdvertising = commands.receive().await {
                    session_tx
                        .send(SessionInput::AdvertisingStarted(Err(
                            TransportError::AdvertisingFailed,
                        )))
                        .await;
                }
            }
        }
    };

    loop {
        // Idle: keep the attribute value current until asked to advertise.
        match commands.receive().await {
            RadioCommand::StartAdvertising => {}
            RadioCommand::SetValue(v) | RadioCommand::Notify(v) => {
                set_value(server, v);
                continue;
            }
            RadioCommand::StopAdvertising => continue,
        }

        session_tx
            .send(SessionInput::AdvertisingStarted(Ok(())))
            .await;
        info!("advertising as \"{}\"", config::LOCAL_NAME);

        loop {
            let config = peripheral::Config {
                interval: BLE_ADV_INTERVAL,
                ..Default::default()
            };
            let advertisement = peripheral::ConnectableAdvertisement::ScannableUndirected {
                adv_data: adv.as_bytes(),
                scan_data: scan.as_bytes(),
            };

            let conn = match select(
                peripheral::advertise_connectable(sd, advertisement, &config),
                wait_for_stop(server, &commands),
            )
            .await
            {
                Either::First(Ok(conn)) => conn,
                Either::First(Err(_)) => {
                    warn!("advertising ended with error");
                    session_tx
                        .send(SessionInput::AdvertisingStarted(Err(
                            TransportError::AdvertisingFailed,
                        )))
                        .await;
                    break;
                }
                Either::Second(()) => {
                    info!("stopped advertising");
                    break;
                }
            };

            info!("central connected");
            // Seed the attribute with the current note before the central reads.
            session_tx.send(SessionInput::ReadRequest(channel)).await;

            if serve(&conn, server, &commands, &session_tx, channel).await {
                info!("stopped advertising (central dropped)");
                break;
            }
            info!("central disconnected - advertising again");
        }
    }
}

/// Wait for a stop request while advertising, applying value updates.
async fn wait_for_stop(server: &Server, commands: &RadioReceiver) {
    loop {
        match commands.receive().await {
            RadioCommand::StopAdvertising => return,
            RadioCommand::SetValue(v) | RadioCommand::Notify(v) => set_value(server, v),
            RadioCommand::StartAdvertising => {}
        }
    }
}

/// Serve one connection.  Returns `true` if advertising was stopped,
/// `false` if the central went away on its own.
async fn serve(
    conn: &Connection,
    server: &Server,
    commands: &RadioReceiver,
    session_tx: &InputSender,
    channel: ChannelId,
) -> bool {
    let gatt = gatt_server::run(conn, server, |e| match e {
        ServerEvent::Instrument(InstrumentServiceEvent::NoteWrite(v)) => {
            if session_tx.try_send(SessionInput::Write(channel, v)).is_err() {
                warn!("session queue full - write dropped");
            }
        }
        ServerEvent::Instrument(InstrumentServiceEvent::NoteCccdWrite { notifications }) => {
            debug!("note notifications: {}", notifications);
            if notifications && session_tx.try_send(SessionInput::ReadyToPush).is_err() {
                warn!("session queue full - subscribe push dropped");
            }
        }
    });

    let control = async {
        loop {
            match commands.receive().await {
                RadioCommand::StopAdvertising => {
                    if conn.disconnect().is_err() {
                        warn!("failed to disconnect central");
                    }
                    return;
                }
                RadioCommand::SetValue(v) => set_value(server, v),
                RadioCommand::Notify(v) => {
                    set_value(server, v);
                    notify(conn, server, session_tx, v).await;
                }
                RadioCommand::StartAdvertising => {}
            }
        }
    };

    match select(gatt, control).await {
        Either::First(_) => false,
        Either::Second(()) => true,
    }
}

fn set_value(server: &Server, v: u8) {
    if server.instrument.note_set(&v).is_err() {
        warn!("failed to store note value");
    }
}

async fn notify(conn: &Connection, server: &Server, session_tx: &InputSender, v: u8) {
    match server.instrument.note_notify(conn, &v) {
        Ok(()) => {}
        Err(NotifyValueError::Raw(RawError::Resources)) => {
            // SoftDevice TX queue full: ask the session to push again.
            debug!("notify queue full - retrying");
            Timer::after(Duration::from_millis(NOTIFY_RETRY_MS)).await;
            session_tx.send(SessionInput::ReadyToPush).await;
        }
        // No subscriber (CCCD not enabled): nothing to deliver.
        Err(_) => debug!("note {} not notified - no subscriber", v),
    }
}
